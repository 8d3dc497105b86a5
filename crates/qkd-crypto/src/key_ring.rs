//! Re-slicing of arbitrary-length key material into fixed-size keys.
//!
//! Upstream stages produce key material in whatever sizes their algorithms
//! yield. A [`KeyRing`] re-chunks that stream into keys of exactly
//! `key_size` bytes, assigning each new slot the next sequential id.
//!
//! # Invariants
//!
//! - Every key except possibly the last holds exactly `key_size` bytes
//! - Only the last key grows on a subsequent append
//! - Bytes are neither lost nor reordered: the concatenation of all keys
//!   equals the concatenation of all appended material
//! - Ids increase by one per opened slot
//! - `key_size == 0` discards all input

use std::collections::VecDeque;

use crate::key::Key;

/// Ordered buffer of fixed-size keys.
#[derive(Debug, Clone)]
pub struct KeyRing {
    key_size: usize,
    keys: VecDeque<Key>,
    next_id: u64,
}

impl KeyRing {
    /// Create an empty ring whose first slot gets id 0.
    pub fn new(key_size: usize) -> Self {
        Self::with_first_id(key_size, 0)
    }

    /// Create an empty ring whose first slot gets `first_id`.
    pub fn with_first_id(key_size: usize, first_id: u64) -> Self {
        Self { key_size, keys: VecDeque::new(), next_id: first_id }
    }

    /// Target size of every key in the ring.
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    /// Number of keys (including a partially filled tail).
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if the ring holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Id the next opened slot will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Total number of key bytes currently held.
    pub fn buffered_bytes(&self) -> usize {
        self.keys.iter().map(Key::len).sum()
    }

    /// Keys in ring order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    /// Append raw key material to the tail of the ring.
    ///
    /// Fills the current tail up to `key_size`, then opens as many new
    /// slots as needed. No-op for empty input or a ring with `key_size == 0`.
    pub fn push_back(&mut self, raw: &[u8]) {
        if self.key_size == 0 || raw.is_empty() {
            return;
        }

        let mut rest = raw;
        while !rest.is_empty() {
            let room = match self.keys.back() {
                Some(tail) if tail.len() < self.key_size => self.key_size - tail.len(),
                _ => {
                    self.open_slot();
                    continue;
                },
            };

            let (chunk, remainder) = rest.split_at(room.min(rest.len()));
            if let Some(tail) = self.keys.back_mut() {
                tail.extend_from_slice(chunk);
            }
            rest = remainder;
        }

        debug_assert!(self.keys.iter().rev().skip(1).all(|key| key.len() == self.key_size));
    }

    /// Remove and return the oldest key if it is complete.
    pub fn pop_front(&mut self) -> Option<Key> {
        match self.keys.front() {
            Some(front) if front.len() == self.key_size => self.keys.pop_front(),
            _ => None,
        }
    }

    /// Remove and return the oldest key, complete or not.
    ///
    /// Used to flush a partially filled tail when the upstream stage shuts
    /// down.
    pub fn pop_any(&mut self) -> Option<Key> {
        self.keys.pop_front()
    }

    fn open_slot(&mut self) {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.keys.push_back(Key::with_capacity(id, self.key_size));
        tracing::trace!(id, key_size = self.key_size, "opened key ring slot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(ring: &KeyRing) -> Vec<usize> {
        ring.iter().map(Key::len).collect()
    }

    #[test]
    fn ten_bytes_into_four_byte_keys() {
        let mut ring = KeyRing::new(4);
        ring.push_back(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);

        assert_eq!(sizes(&ring), vec![4, 4, 2]);
        let ids: Vec<u64> = ring.iter().map(Key::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn tail_is_extended_before_new_slot_opens() {
        let mut ring = KeyRing::with_first_id(4, 100);
        ring.push_back(&[1, 2, 3]);
        ring.push_back(&[4, 5, 6]);

        assert_eq!(sizes(&ring), vec![4, 2]);
        let keys: Vec<&Key> = ring.iter().collect();
        assert_eq!(keys[0].data(), &[1, 2, 3, 4]);
        assert_eq!(keys[0].id(), 100);
        assert_eq!(keys[1].data(), &[5, 6]);
        assert_eq!(keys[1].id(), 101);
    }

    #[test]
    fn empty_push_is_noop() {
        let mut ring = KeyRing::new(4);
        ring.push_back(&[]);
        assert!(ring.is_empty());
        assert_eq!(ring.next_id(), 0);
    }

    #[test]
    fn zero_key_size_discards_input() {
        let mut ring = KeyRing::new(0);
        ring.push_back(&[1, 2, 3]);
        assert!(ring.is_empty());
        assert_eq!(ring.buffered_bytes(), 0);
    }

    #[test]
    fn exact_multiple_opens_no_extra_slot() {
        let mut ring = KeyRing::new(4);
        ring.push_back(&[0u8; 8]);
        assert_eq!(sizes(&ring), vec![4, 4]);

        ring.push_back(&[1]);
        assert_eq!(sizes(&ring), vec![4, 4, 1]);
        assert_eq!(ring.iter().last().map(Key::id), Some(2));
    }

    #[test]
    fn pop_front_only_yields_complete_keys() {
        let mut ring = KeyRing::new(4);
        ring.push_back(&[0u8; 6]);

        assert_eq!(ring.pop_front().map(|k| k.len()), Some(4));
        assert!(ring.pop_front().is_none());
        assert_eq!(ring.pop_any().map(|k| k.len()), Some(2));
        assert!(ring.is_empty());
    }

    #[test]
    fn ids_continue_after_draining() {
        let mut ring = KeyRing::new(2);
        ring.push_back(&[0u8; 4]);
        while ring.pop_front().is_some() {}

        ring.push_back(&[9]);
        assert_eq!(ring.iter().next().map(Key::id), Some(2));
    }
}
