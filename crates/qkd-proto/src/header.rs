//! Message header with zero-copy parsing.
//!
//! The `MessageHeader` is a fixed 8-byte structure serialized as raw binary
//! (Big Endian). It is the first thing on the wire for every message and the
//! first thing the authentication context absorbs.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{
    MessageType,
    errors::{ProtocolError, Result},
};

/// Fixed 8-byte message header (Big Endian network byte order)
///
/// Layout: `id: u32 | type: u32`. Fields are stored as raw byte arrays so the
/// struct has alignment 1 and every 8-byte pattern is a valid header.
///
/// # Security
///
/// Parsing never validates the type code; an unknown code is still a
/// structurally valid header. [`crate::Frame::decode`] rejects unknown codes,
/// and the header bytes are covered by the message tag so a peer cannot
/// relabel an authenticated message.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct MessageHeader {
    id: [u8; 4],           // u32 sender-assigned message id
    message_type: [u8; 4], // u32 MessageType code
}

impl MessageHeader {
    /// Size of the serialized header (8 bytes)
    pub const SIZE: usize = 8;

    /// Create a header for a message of the given type.
    #[must_use]
    pub fn new(id: u32, message_type: MessageType) -> Self {
        Self { id: id.to_be_bytes(), message_type: message_type.to_u32().to_be_bytes() }
    }

    /// Parse header from network bytes (zero-copy, safe)
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FrameTooShort` if the buffer holds fewer than 8 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(bytes)
            .map(|(header, _)| header)
            .map_err(|_| ProtocolError::FrameTooShort { expected: Self::SIZE, actual: bytes.len() })
    }

    /// Serialize header to bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(IntoBytes::as_bytes(self));
        arr
    }

    /// Sender-assigned message id.
    #[must_use]
    pub fn id(&self) -> u32 {
        u32::from_be_bytes(self.id)
    }

    /// Message type code as raw u32.
    #[must_use]
    pub fn message_type_raw(&self) -> u32 {
        u32::from_be_bytes(self.message_type)
    }

    /// Message type as enum. `None` if unrecognized.
    #[must_use]
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_u32(self.message_type_raw())
    }
}

// Manual Debug implementation (can't derive due to packed repr)
impl std::fmt::Debug for MessageHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("MessageHeader");
        debug.field("id", &self.id());
        match self.message_type() {
            Some(message_type) => debug.field("message_type", &message_type),
            None => debug.field("message_type", &format!("{:#010x}", self.message_type_raw())),
        };
        debug.finish()
    }
}

// Manual PartialEq implementation (can't derive due to packed repr)
impl PartialEq for MessageHeader {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for MessageHeader {}
