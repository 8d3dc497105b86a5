//! Property-based tests for the key ring
//!
//! 1. **Conservation**: bytes out == bytes in, in order
//! 2. **Shape**: every key but the last is exactly `key_size`
//! 3. **Ids**: consecutive, strictly increasing from the first id

use proptest::prelude::*;
use qkd_crypto::{Key, KeyRing};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_push_back_rechunks_without_loss(
        key_size in 1usize..64,
        first_id in any::<u32>(),
        pushes in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..100), 0..20),
    ) {
        let mut ring = KeyRing::with_first_id(key_size, u64::from(first_id));
        for raw in &pushes {
            ring.push_back(raw);
        }

        let appended: Vec<u8> = pushes.concat();
        let buffered: Vec<u8> = ring.iter().flat_map(|key| key.data().to_vec()).collect();

        // PROPERTY: pure re-chunking
        prop_assert_eq!(&buffered, &appended);
        prop_assert_eq!(ring.buffered_bytes(), appended.len());

        // PROPERTY: only the tail may be short, and it is never empty
        let sizes: Vec<usize> = ring.iter().map(Key::len).collect();
        if let Some((last, full)) = sizes.split_last() {
            prop_assert!(full.iter().all(|&size| size == key_size));
            prop_assert!(*last >= 1 && *last <= key_size);
        }
        prop_assert_eq!(sizes.len(), appended.len().div_ceil(key_size));

        // PROPERTY: ids are consecutive from first_id
        for (offset, key) in ring.iter().enumerate() {
            prop_assert_eq!(key.id(), u64::from(first_id) + offset as u64);
        }
    }

    #[test]
    fn prop_zero_key_size_discards(raw in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut ring = KeyRing::new(0);
        ring.push_back(&raw);
        prop_assert!(ring.is_empty());
        prop_assert_eq!(ring.next_id(), 0);
    }
}

#[test]
fn draining_complete_keys_feeds_the_pipeline() {
    let mut ring = KeyRing::new(4);
    ring.push_back(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

    let mut drained = Vec::new();
    while let Some(key) = ring.pop_front() {
        drained.push(key);
    }

    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].data(), &[1, 2, 3, 4]);
    assert_eq!(drained[1].data(), &[5, 6, 7, 8]);
    assert!(drained[0].id() < drained[1].id());

    // The partial tail keeps growing and completes with the next push
    ring.push_back(&[11, 12]);
    let tail = ring.pop_front().unwrap();
    assert_eq!(tail.data(), &[9, 10, 11, 12]);
    assert_eq!(tail.id(), 2);
}
