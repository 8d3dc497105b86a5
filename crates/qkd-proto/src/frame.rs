//! Frame type combining header, payload and authentication tag.
//!
//! A `Frame` is the transport-layer unit of the message exchange:
//! - 8-byte raw binary header (Big Endian)
//! - length-prefixed payload
//! - length-prefixed authentication tag
//!
//! This is a pure data holder. For the application view see
//! [`crate::Message::from_frame`].

use bytes::{Buf, BufMut, Bytes};

use crate::{
    MessageHeader,
    errors::{ProtocolError, Result},
};

/// Length of the fixed prefix: header plus payload length
pub const PREFIX_SIZE: usize = MessageHeader::SIZE + 4;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Maximum tag size.
///
/// An `xor` authentication context yields a tag as long as the data it
/// covers, so the limit tracks the largest authenticated input.
pub const MAX_TAG_SIZE: u32 = MAX_PAYLOAD_SIZE + MessageHeader::SIZE as u32;

/// Complete protocol frame (transport layer)
///
/// Layout on the wire:
/// `[header: 8] [payload_len: u32 BE] [payload] [tag_len: u32 BE] [tag]`
///
/// # Invariants
///
/// - Size Limit: `payload.len()` MUST NOT exceed [`MAX_PAYLOAD_SIZE`] and
///   `tag.len()` MUST NOT exceed [`MAX_TAG_SIZE`]. Violations are rejected
///   during encoding and decoding.
///
/// # Security
///
/// Provides structural validity only. The tag is carried, never checked,
/// here; verification against [`Frame::authenticated_data`] belongs to the
/// exchange layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message header (8 bytes)
    pub header: MessageHeader,

    /// Raw payload bytes (possibly ciphertext)
    pub payload: Bytes,

    /// Authentication tag over header and payload
    pub tag: Bytes,
}

impl Frame {
    /// Create an untagged frame
    #[must_use]
    pub fn new(header: MessageHeader, payload: impl Into<Bytes>) -> Self {
        Self { header, payload: payload.into(), tag: Bytes::new() }
    }

    /// Attach the authentication tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<Bytes>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Bytes covered by the authentication tag: header ‖ payload
    #[must_use]
    pub fn authenticated_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(MessageHeader::SIZE + self.payload.len());
        data.extend_from_slice(&self.header.to_bytes());
        data.extend_from_slice(&self.payload);
        data
    }

    /// Length of the encoded frame
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        PREFIX_SIZE + self.payload.len() + 4 + self.tag.len()
    }

    /// Encode frame into buffer
    ///
    /// # Errors
    ///
    /// - `ProtocolError::PayloadTooLarge` if payload exceeds `MAX_PAYLOAD_SIZE`
    /// - `ProtocolError::TagTooLarge` if tag exceeds `MAX_TAG_SIZE`
    ///
    /// # Security
    ///
    /// - Size Limit Enforcement: nothing larger than the limits reaches the
    ///   wire, so a conforming peer never has to buffer an oversized frame.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let payload_len = checked_len(self.payload.len(), MAX_PAYLOAD_SIZE)
            .ok_or(ProtocolError::PayloadTooLarge {
                size: self.payload.len(),
                max: MAX_PAYLOAD_SIZE as usize,
            })?;
        let tag_len = checked_len(self.tag.len(), MAX_TAG_SIZE).ok_or(
            ProtocolError::TagTooLarge { size: self.tag.len(), max: MAX_TAG_SIZE as usize },
        )?;

        dst.put_slice(&self.header.to_bytes());
        dst.put_u32(payload_len);
        dst.put_slice(&self.payload);
        dst.put_u32(tag_len);
        dst.put_slice(&self.tag);

        Ok(())
    }

    /// Decode one frame from the front of `bytes`
    ///
    /// Returns the frame and the number of bytes it occupied; trailing bytes
    /// belong to the next frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FrameTooShort` / `FrameTruncated` if `bytes` ends
    ///   before the frame does ([`ProtocolError::is_incomplete`])
    /// - `ProtocolError::UnknownMessageType` if the type code is unknown
    /// - `ProtocolError::PayloadTooLarge` / `TagTooLarge` if a length field
    ///   exceeds its limit
    ///
    /// # Security
    ///
    /// - Fail Fast: type and length limits are checked before any copy, so a
    ///   hostile length field cannot make the reader allocate or wait for
    ///   more than the limits allow.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let header = *MessageHeader::from_bytes(bytes)?;
        if header.message_type().is_none() {
            tracing::debug!(
                message_id = header.id(),
                message_type = header.message_type_raw(),
                "rejected frame: unknown message type"
            );
            return Err(ProtocolError::UnknownMessageType(header.message_type_raw()));
        }

        let mut cursor = bytes.get(MessageHeader::SIZE..).unwrap_or_default();
        if cursor.remaining() < 4 {
            return Err(ProtocolError::FrameTooShort { expected: PREFIX_SIZE, actual: bytes.len() });
        }

        let payload_len = cursor.get_u32();
        if payload_len > MAX_PAYLOAD_SIZE {
            tracing::debug!(
                message_id = header.id(),
                payload_len,
                "rejected frame: payload too large"
            );
            return Err(ProtocolError::PayloadTooLarge {
                size: payload_len as usize,
                max: MAX_PAYLOAD_SIZE as usize,
            });
        }
        let payload_len = payload_len as usize;

        let through_tag_len = PREFIX_SIZE + payload_len + 4;
        if cursor.remaining() < payload_len + 4 {
            return Err(ProtocolError::FrameTruncated {
                expected: through_tag_len,
                actual: bytes.len(),
            });
        }
        let payload = cursor.copy_to_bytes(payload_len);

        let tag_len = cursor.get_u32();
        if tag_len > MAX_TAG_SIZE {
            tracing::debug!(message_id = header.id(), tag_len, "rejected frame: tag too large");
            return Err(ProtocolError::TagTooLarge {
                size: tag_len as usize,
                max: MAX_TAG_SIZE as usize,
            });
        }
        let tag_len = tag_len as usize;

        let total = through_tag_len + tag_len;
        if cursor.remaining() < tag_len {
            return Err(ProtocolError::FrameTruncated { expected: total, actual: bytes.len() });
        }
        let tag = cursor.copy_to_bytes(tag_len);

        Ok((Self { header, payload, tag }, total))
    }
}

fn checked_len(len: usize, max: u32) -> Option<u32> {
    u32::try_from(len).ok().filter(|&len| len <= max)
}
