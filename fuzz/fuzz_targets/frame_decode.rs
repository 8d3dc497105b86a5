//! Fuzz target for Frame::decode
//!
//! Decodes arbitrary byte sequences to find:
//! - Parser crashes or panics
//! - Integer overflows in length calculations
//! - Buffer over-reads
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use qkd_proto::Frame;

fuzz_target!(|data: &[u8]| {
    if let Ok((frame, consumed)) = Frame::decode(data) {
        assert!(consumed <= data.len());
        assert_eq!(consumed, frame.encoded_len());
    }
});
