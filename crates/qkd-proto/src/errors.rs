//! Protocol error types

use thiserror::Error;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while framing or parsing messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer shorter than the fixed frame prefix
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Bytes the prefix needs
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Payload or tag extends past the end of the buffer
    #[error("frame truncated: expected {expected} bytes, got {actual}")]
    FrameTruncated {
        /// Total frame length announced by the length fields
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Payload exceeds the frame limit
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Announced payload length
        size: usize,
        /// Limit in force
        max: usize,
    },

    /// Authentication tag exceeds the frame limit
    #[error("tag too large: {size} bytes (max {max})")]
    TagTooLarge {
        /// Announced tag length
        size: usize,
        /// Limit in force
        max: usize,
    },

    /// Header carries a type code this build does not know
    #[error("unknown message type: {0}")]
    UnknownMessageType(u32),
}

impl ProtocolError {
    /// Returns true if more bytes may complete the frame.
    ///
    /// Stream readers keep buffering on these and give up on everything else.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::FrameTooShort { .. } | Self::FrameTruncated { .. })
    }
}
