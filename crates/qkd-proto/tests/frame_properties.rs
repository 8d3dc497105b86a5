//! Property-based tests for Frame encoding/decoding
//!
//! These tests verify framing for ALL valid inputs, including streams cut
//! at arbitrary points the way a transport may deliver them.

use bytes::Bytes;
use proptest::prelude::*;
use qkd_proto::{Frame, MessageHeader, MessageType};

fn arbitrary_type() -> impl Strategy<Value = MessageType> {
    prop_oneof![Just(MessageType::Data), Just(MessageType::KeySync)]
}

fn arbitrary_frame() -> impl Strategy<Value = Frame> {
    (
        any::<u32>(),
        arbitrary_type(),
        prop::collection::vec(any::<u8>(), 0..1024), // payload up to 1KB
        prop::collection::vec(any::<u8>(), 0..64),   // tag
    )
        .prop_map(|(id, message_type, payload, tag)| {
            Frame::new(MessageHeader::new(id, message_type), Bytes::from(payload)).with_tag(tag)
        })
}

#[test]
fn prop_frame_encode_decode_roundtrip() {
    proptest!(|(frame in arbitrary_frame())| {
        let mut buf = Vec::new();
        frame.encode(&mut buf).expect("encode should succeed");

        let (decoded, consumed) = Frame::decode(&buf).expect("decode should succeed");

        // PROPERTY: Round-trip must be identity
        prop_assert_eq!(consumed, buf.len());
        prop_assert_eq!(decoded.header, frame.header, "Header mismatch after round-trip");
        prop_assert_eq!(decoded.payload, frame.payload, "Payload content mismatch");
        prop_assert_eq!(decoded.tag, frame.tag, "Tag mismatch");
    });
}

#[test]
fn prop_stream_of_frames_decodes_in_order() {
    proptest!(|(frames in prop::collection::vec(arbitrary_frame(), 1..8))| {
        let mut stream = Vec::new();
        for frame in &frames {
            frame.encode(&mut stream).expect("encode should succeed");
        }

        let mut offset = 0;
        for expected in &frames {
            let (decoded, consumed) = Frame::decode(&stream[offset..]).expect("decode");
            prop_assert_eq!(&decoded, expected);
            offset += consumed;
        }

        // PROPERTY: frames tile the stream exactly
        prop_assert_eq!(offset, stream.len());
    });
}

#[test]
fn prop_truncation_never_yields_a_frame() {
    proptest!(|(frame in arbitrary_frame(), cut in any::<prop::sample::Index>())| {
        let mut buf = Vec::new();
        frame.encode(&mut buf).expect("encode should succeed");
        let cut = cut.index(buf.len());

        // PROPERTY: any proper prefix asks for more bytes
        let err = Frame::decode(&buf[..cut]).expect_err("prefix must not decode");
        prop_assert!(err.is_incomplete());
    });
}

#[test]
fn prop_decode_is_total() {
    proptest!(|(bytes in prop::collection::vec(any::<u8>(), 0..256))| {
        // PROPERTY: arbitrary input never panics
        if let Ok((frame, consumed)) = Frame::decode(&bytes) {
            prop_assert!(consumed <= bytes.len());
            prop_assert_eq!(consumed, frame.encoded_len());
        }
    });
}
