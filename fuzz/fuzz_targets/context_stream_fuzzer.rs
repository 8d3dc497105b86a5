//! Fuzz target for streaming context input
//!
//! # Strategy
//!
//! - Every supported algorithm with an arbitrary init key
//! - Data split into arbitrary chunks, with saves/restores through scheme text
//! - Arbitrary final keys
//!
//! # Invariants
//!
//! - Chunking never changes the tag
//! - Resuming from saved scheme text never changes an evhash tag
//! - A final key passing `is_valid_final_key` is never rejected

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use qkd_crypto::{engine, Key, Scheme};

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    algorithm: u8,
    init_key: Vec<u8>,
    chunks: Vec<Chunk>,
    final_key: Vec<u8>,
}

#[derive(Debug, Clone, Arbitrary)]
enum Chunk {
    Data(Vec<u8>),
    SaveAndRestore,
}

fuzz_target!(|input: Scenario| {
    let name = engine::ALGORITHMS[usize::from(input.algorithm) % engine::ALGORITHMS.len()];
    let scheme = Scheme::new(name)
        .expect("registered names are valid")
        .with_init_key(Key::from(input.init_key));
    let Ok(mut chunked) = engine::create(&scheme) else {
        return;
    };
    let mut whole = chunked.fresh_clone();

    let mut all = Vec::new();
    for chunk in &input.chunks {
        match chunk {
            Chunk::Data(data) => {
                if chunked.add(data).is_err() {
                    return;
                }
                all.extend_from_slice(data);
            },
            // xor keeps no resumable state
            Chunk::SaveAndRestore if name == "xor" => {},
            Chunk::SaveAndRestore => {
                let saved = Scheme::parse(&chunked.scheme().to_string()).expect("saved scheme parses");
                chunked = engine::create(&saved).expect("saved scheme restores");
            },
        }
    }
    whole.add(&all).expect("whole input accepted when chunks were");

    let final_key = Key::from(input.final_key);
    let valid = whole.is_valid_final_key(&final_key);
    assert_eq!(valid, chunked.is_valid_final_key(&final_key));

    match (chunked.finalize(&final_key), whole.finalize(&final_key)) {
        (Ok(a), Ok(b)) => assert_eq!(a.tag(), b.tag()),
        (Err(_), Err(_)) => assert!(!valid),
        (a, b) => panic!("chunked {a:?} and whole {b:?} disagree"),
    }
});
