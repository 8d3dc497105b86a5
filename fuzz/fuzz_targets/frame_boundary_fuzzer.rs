//! Fuzz target for frame length boundary conditions
//!
//! # Strategy
//!
//! - Type code: DATA, KEY_SYNC, unknown
//! - Payload/tag length fields: zero, small, at-max, just-over-max, u32::MAX,
//!   lying about the bytes that follow
//! - Stream cut at an arbitrary point
//!
//! # Invariants
//!
//! - Length above the limit MUST return `PayloadTooLarge` / `TagTooLarge`
//! - Unknown type MUST return `UnknownMessageType`
//! - A cut stream MUST report an incomplete frame, never a wrong one
//! - Decoded frames re-encode to exactly the bytes consumed

#![no_main]

use arbitrary::Arbitrary;
use bytes::BufMut;
use libfuzzer_sys::fuzz_target;
use qkd_proto::{Frame, ProtocolError, MAX_PAYLOAD_SIZE, MAX_TAG_SIZE};

#[derive(Debug, Clone, Arbitrary)]
struct BoundaryFrame {
    id: u32,
    message_type: TypeCode,
    payload_len: LengthField,
    payload: Vec<u8>,
    tag_len: LengthField,
    tag: Vec<u8>,
    cut: Option<u16>,
}

#[derive(Debug, Clone, Arbitrary)]
enum TypeCode {
    Data,
    KeySync,
    Random(u32),
}

#[derive(Debug, Clone, Arbitrary)]
enum LengthField {
    Honest,
    Zero,
    Small(u8),
    AtMax,
    JustOverMax,
    MaxU32,
    Random(u32),
}

impl LengthField {
    fn resolve(&self, actual: usize, max: u32) -> u32 {
        match self {
            Self::Honest => actual as u32,
            Self::Zero => 0,
            Self::Small(n) => u32::from(*n),
            Self::AtMax => max,
            Self::JustOverMax => max + 1,
            Self::MaxU32 => u32::MAX,
            Self::Random(n) => *n,
        }
    }
}

fuzz_target!(|input: BoundaryFrame| {
    let type_code = match input.message_type {
        TypeCode::Data => 0,
        TypeCode::KeySync => 1,
        TypeCode::Random(code) => code,
    };
    let payload_len = input.payload_len.resolve(input.payload.len(), MAX_PAYLOAD_SIZE);
    let tag_len = input.tag_len.resolve(input.tag.len(), MAX_TAG_SIZE);

    let mut wire = Vec::new();
    wire.put_u32(input.id);
    wire.put_u32(type_code);
    wire.put_u32(payload_len);
    wire.put_slice(&input.payload);
    wire.put_u32(tag_len);
    wire.put_slice(&input.tag);

    let wire = match input.cut {
        Some(cut) => &wire[..usize::from(cut).min(wire.len())],
        None => &wire[..],
    };

    match Frame::decode(wire) {
        Ok((frame, consumed)) => {
            assert!(type_code <= 1);
            assert!(payload_len <= MAX_PAYLOAD_SIZE);
            assert!(frame.tag.len() as u32 <= MAX_TAG_SIZE);
            assert_eq!(frame.header.id(), input.id);

            let mut reencoded = Vec::new();
            frame.encode(&mut reencoded).expect("decoded frame must re-encode");
            assert_eq!(&reencoded[..], &wire[..consumed]);
        },
        Err(ProtocolError::UnknownMessageType(code)) => assert_eq!(code, type_code),
        Err(ProtocolError::PayloadTooLarge { size, .. }) => {
            assert!(size > MAX_PAYLOAD_SIZE as usize);
        },
        Err(ProtocolError::TagTooLarge { size, .. }) => assert!(size > MAX_TAG_SIZE as usize),
        Err(err) => assert!(err.is_incomplete(), "unexpected error {err:?}"),
    }
});
