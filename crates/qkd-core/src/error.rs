//! Error types for the message exchange.
//!
//! Authentication failures are their own variant: a forged or corrupted
//! message is a security event, never a transport hiccup to retry.

use std::{io, time::Duration};

use qkd_crypto::CryptoError;
use qkd_proto::{MessageType, ProtocolError};
use thiserror::Error;

/// Errors raised by a [`crate::Transport`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The peer end is gone
    #[error("transport closed")]
    Closed,

    /// Underlying I/O failure
    #[error("transport I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::UnexpectedEof => Self::Closed,
            _ => Self::Io(err.to_string()),
        }
    }
}

/// Errors raised while sending or receiving a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// Context could not absorb the message or the final key was rejected
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Tag did not verify
    #[error("authentication failed for message {message_id}")]
    Authentication {
        /// Id claimed by the rejected message
        message_id: u32,
    },

    /// Authentic message of the wrong type
    #[error("unexpected message type: expected {expected}, got {actual}")]
    UnexpectedType {
        /// Type the caller asked for
        expected: MessageType,
        /// Type that arrived
        actual: MessageType,
    },

    /// Operation did not complete within its timeout
    #[error("timed out after {elapsed:?}")]
    Timeout {
        /// How long we waited
        elapsed: Duration,
    },

    /// Infinite wait cancelled through an [`crate::Interrupt`]
    #[error("interrupted")]
    Interrupted,

    /// Underlying transport failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Malformed frame on the wire
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ExchangeError {
    /// Returns true if this error is transient and may succeed on retry.
    ///
    /// Authentication and protocol failures are never transient: they
    /// indicate a broken link or a hostile peer.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_and_transport_errors_are_transient() {
        assert!(ExchangeError::Timeout { elapsed: Duration::from_millis(50) }.is_transient());
        assert!(ExchangeError::Transport(TransportError::Closed).is_transient());
    }

    #[test]
    fn security_and_protocol_errors_are_fatal() {
        assert!(!ExchangeError::Authentication { message_id: 3 }.is_transient());
        assert!(
            !ExchangeError::UnexpectedType {
                expected: MessageType::Data,
                actual: MessageType::KeySync,
            }
            .is_transient()
        );
        assert!(!ExchangeError::Interrupted.is_transient());
        assert!(!ExchangeError::Protocol(ProtocolError::UnknownMessageType(7)).is_transient());
        assert!(
            !ExchangeError::Crypto(CryptoError::UnknownAlgorithm { name: "rot13".into() })
                .is_transient()
        );
    }

    #[test]
    fn io_errors_map_to_transport() {
        let closed: TransportError = io::Error::from(io::ErrorKind::BrokenPipe).into();
        assert_eq!(closed, TransportError::Closed);

        let other: TransportError = io::Error::other("disk on fire").into();
        assert_eq!(other, TransportError::Io("disk on fire".into()));
    }
}
