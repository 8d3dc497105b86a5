//! Error types for schemes, contexts and checksums.

use thiserror::Error;

/// Malformed scheme text.
///
/// Raised by [`crate::Scheme::parse`]. Parsing checks syntax only; a
/// well-formed name that no algorithm answers to is reported later, by the
/// engine, as [`CryptoError::UnknownAlgorithm`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Scheme text has no algorithm name before the first `:`.
    #[error("scheme has an empty algorithm name")]
    EmptyName,

    /// Algorithm name or variant contains a character outside `[A-Za-z0-9_]`.
    #[error("invalid character {character:?} at position {position} in scheme name {name:?}")]
    InvalidName {
        /// Offending name section
        name: String,
        /// Offending character
        character: char,
        /// Byte position of the character within the name
        position: usize,
    },

    /// A `-` was given without a variant after it.
    #[error("scheme name {name:?} has an empty variant")]
    EmptyVariant {
        /// Offending name section
        name: String,
    },

    /// A key or state section is not valid hex.
    #[error("invalid hex in {section}: {reason}")]
    InvalidHex {
        /// Section of the scheme text (`init key` or `state`)
        section: &'static str,
        /// Decoder diagnostic
        reason: String,
    },

    /// More than `name:key:state` was given.
    #[error("scheme has {count} ':'-separated sections, at most 3 allowed")]
    TooManySections {
        /// Number of sections found
        count: usize,
    },
}

/// Errors from the crypto context engine, associations and checksums.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Scheme text failed to parse.
    #[error("malformed scheme: {0}")]
    Parse(#[from] ParseError),

    /// No algorithm is registered under this name.
    #[error("unknown algorithm: {name:?}")]
    UnknownAlgorithm {
        /// Requested name
        name: String,
    },

    /// Key failed the algorithm's validity predicate.
    #[error("wrong key for {algorithm}: expected {expected} bytes, got {actual}")]
    WrongKey {
        /// Algorithm that rejected the key
        algorithm: String,
        /// Required length (minimum length for `xor`)
        expected: usize,
        /// Length supplied
        actual: usize,
    },

    /// Operation is not defined for this algorithm.
    #[error("{algorithm} does not support {operation}")]
    Unsupported {
        /// Algorithm name
        algorithm: String,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Keyed algorithm was built without an initial key and cannot process
    /// data.
    #[error("{algorithm} context has no initial key")]
    MissingInitKey {
        /// Algorithm name
        algorithm: String,
    },

    /// Resumable state bytes do not fit the algorithm.
    #[error("invalid state for {algorithm}: {reason}")]
    InvalidState {
        /// Algorithm name
        algorithm: String,
        /// Why the state was rejected
        reason: String,
    },

    /// Serialized key is truncated or oversized.
    #[error("malformed key: {reason}")]
    MalformedKey {
        /// Why decoding failed
        reason: String,
    },
}

impl CryptoError {
    /// Returns true if this error stems from configuration (scheme text,
    /// algorithm name, state) rather than from the key material supplied at
    /// run time.
    ///
    /// Configuration errors must stop a stage from starting; there is no
    /// point retrying them.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Parse(_)
            | Self::UnknownAlgorithm { .. }
            | Self::MissingInitKey { .. }
            | Self::InvalidState { .. }
            | Self::Unsupported { .. } => true,
            Self::WrongKey { .. } | Self::MalformedKey { .. } => false,
        }
    }
}
