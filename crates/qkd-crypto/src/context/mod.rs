//! Stateful authentication and encryption contexts.
//!
//! A [`Context`] is an open accumulator bound to one direction of one
//! pipeline link. Data is added in order; [`Context::finalize`] consumes the
//! context together with a finishing key and yields a [`Finalized`] value
//! carrying the tag (MAC) or ciphertext.
//!
//! Because `finalize` takes the context by value, adding data after
//! finalization cannot be expressed:
//!
//! ```compile_fail
//! use qkd_crypto::{Key, engine};
//!
//! let mut context = engine::create_from_str("xor").unwrap();
//! context.add(b"key bits").unwrap();
//! let finalized = context.finalize(&Key::from(vec![0u8; 8])).unwrap();
//! context.add(b"more");
//! ```
//!
//! Contexts are not synchronized. [`Context::fresh_clone`] and the size
//! queries take `&self` and may run concurrently with each other; `add` and
//! `finalize` need exclusive access.

mod evhash;
pub(crate) mod gf2n;
mod xor;

use std::fmt;

use crate::{
    error::CryptoError,
    key::Key,
    scheme::{NULL_SCHEME, Scheme},
};

pub(crate) use self::{evhash::Evhash, xor::Xor};

/// Names of the built-in context algorithms.
pub const ALGORITHMS: [&str; 7] =
    ["null", "xor", "evhash-32", "evhash-64", "evhash-96", "evhash-128", "evhash-256"];

/// Closed set of algorithm kinds, each with its own accumulator.
pub(crate) enum Algorithm {
    Null,
    Xor(Xor),
    Evhash(Evhash),
}

impl Algorithm {
    fn name(&self) -> &str {
        match self {
            Self::Null => NULL_SCHEME,
            Self::Xor(_) => xor::NAME,
            Self::Evhash(evhash) => evhash.name(),
        }
    }

    fn fresh(&self) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Xor(_) => Self::Xor(Xor::new()),
            Self::Evhash(evhash) => Self::Evhash(evhash.fresh()),
        }
    }
}

/// Open authentication or encryption context.
pub struct Context {
    init_key: Key,
    algorithm: Algorithm,
}

impl Context {
    pub(crate) fn new(init_key: Key, algorithm: Algorithm) -> Self {
        Self { init_key, algorithm }
    }

    /// Full algorithm name (e.g. `evhash-96`).
    pub fn name(&self) -> &str {
        self.algorithm.name()
    }

    /// True for the no-op `null` context.
    pub fn is_null(&self) -> bool {
        matches!(self.algorithm, Algorithm::Null)
    }

    /// Append data to the accumulator.
    pub fn add(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        match &mut self.algorithm {
            Algorithm::Null => Ok(()),
            Algorithm::Xor(xor) => {
                xor.add(data);
                Ok(())
            },
            Algorithm::Evhash(evhash) => evhash.add(data),
        }
    }

    /// Fold another context into this one.
    ///
    /// Only defined for `null`, where it is a no-op. XOR and evaluation-hash
    /// contexts cannot be combined and fail instead of ignoring the call.
    pub fn add_context(&mut self, other: &Context) -> Result<(), CryptoError> {
        match &self.algorithm {
            Algorithm::Null => Ok(()),
            Algorithm::Xor(_) | Algorithm::Evhash(_) => {
                tracing::debug!(
                    algorithm = self.name(),
                    other = other.name(),
                    "rejected context combination"
                );
                Err(CryptoError::Unsupported {
                    algorithm: self.name().to_owned(),
                    operation: "adding another context",
                })
            },
        }
    }

    /// Consume the context and produce its tag or ciphertext.
    ///
    /// Callers on the hot path should check [`Context::is_valid_final_key`]
    /// first; a rejected key drops the context.
    pub fn finalize(self, final_key: &Key) -> Result<Finalized, CryptoError> {
        let scheme = self.scheme();
        let tag = match self.algorithm {
            Algorithm::Null => Vec::new(),
            Algorithm::Xor(xor) => xor.finalize(final_key)?,
            Algorithm::Evhash(evhash) => evhash.finalize(final_key)?,
        };
        Ok(Finalized { scheme, tag })
    }

    /// Scheme describing the current state, suitable for persisting and
    /// resuming the context.
    pub fn scheme(&self) -> Scheme {
        let state = match &self.algorithm {
            Algorithm::Null | Algorithm::Xor(_) => Vec::new(),
            Algorithm::Evhash(evhash) => evhash.state(),
        };
        Scheme::named_unchecked(self.name()).with_init_key(self.init_key.clone()).with_state(state)
    }

    /// New open context with the same algorithm and initial key but an
    /// empty accumulator.
    ///
    /// This is not a snapshot: accumulated data is discarded.
    pub fn fresh_clone(&self) -> Context {
        Self { init_key: self.init_key.clone(), algorithm: self.algorithm.fresh() }
    }

    /// Key bytes consumed when the context is built.
    pub fn init_key_size(&self) -> usize {
        match &self.algorithm {
            Algorithm::Null | Algorithm::Xor(_) => 0,
            Algorithm::Evhash(evhash) => evhash.width(),
        }
    }

    /// Key bytes consumed at finalization.
    ///
    /// For `xor` this is the amount of data accumulated so far.
    pub fn final_key_size(&self) -> usize {
        match &self.algorithm {
            Algorithm::Null => 0,
            Algorithm::Xor(xor) => xor.len(),
            Algorithm::Evhash(evhash) => evhash.width(),
        }
    }

    /// Whether `finalize` would accept this key.
    pub fn is_valid_final_key(&self, key: &Key) -> bool {
        match &self.algorithm {
            Algorithm::Null => true,
            Algorithm::Xor(xor) => xor.is_valid_final_key(key),
            Algorithm::Evhash(evhash) => evhash.is_valid_final_key(key),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name())
            .field("init_key_size", &self.init_key_size())
            .field("final_key_size", &self.final_key_size())
            .finish_non_exhaustive()
    }
}

/// Result of finalizing a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    scheme: Scheme,
    tag: Vec<u8>,
}

impl Finalized {
    /// Tag (authentication) or ciphertext (encryption).
    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    /// Take ownership of the tag.
    pub fn into_tag(self) -> Vec<u8> {
        self.tag
    }

    /// Scheme of the context as it stood when finalization began.
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine;

    #[test]
    fn null_context_is_noop() {
        let mut context = engine::create_from_str("null").unwrap();
        context.add(b"ignored").unwrap();
        let other = engine::create_from_str("null").unwrap();
        context.add_context(&other).unwrap();

        assert!(context.is_valid_final_key(&Key::from(vec![1, 2, 3])));
        assert_eq!(context.init_key_size(), 0);
        assert_eq!(context.final_key_size(), 0);
        assert!(context.finalize(&Key::null()).unwrap().tag().is_empty());
    }

    #[test]
    fn xor_context_encrypts() {
        let mut context = engine::create_from_str("xor").unwrap();
        context.add(&[0x10, 0x20]).unwrap();
        context.add(&[0x30]).unwrap();
        assert_eq!(context.final_key_size(), 3);

        let finalized = context.finalize(&Key::from(vec![0x01, 0x02, 0x03])).unwrap();
        assert_eq!(finalized.tag(), &[0x11, 0x22, 0x33]);
        assert_eq!(finalized.scheme().name(), "xor");
    }

    #[test]
    fn xor_contexts_cannot_be_combined() {
        let mut a = engine::create_from_str("xor").unwrap();
        let b = engine::create_from_str("xor").unwrap();
        assert!(matches!(a.add_context(&b), Err(CryptoError::Unsupported { .. })));
    }

    #[test]
    fn xor_state_is_empty() {
        let mut context = engine::create_from_str("xor").unwrap();
        context.add(b"abc").unwrap();
        assert!(context.scheme().state().is_empty());
    }

    #[test]
    fn fresh_clone_keeps_identity_and_drops_data() {
        let mut context = engine::create_from_str("xor").unwrap();
        context.add(b"abcd").unwrap();

        let clone = context.fresh_clone();
        assert_eq!(clone.name(), "xor");
        assert_eq!(clone.final_key_size(), 0);
        assert_eq!(context.final_key_size(), 4);
    }

    #[test]
    fn evhash_scheme_round_trips_state() {
        let mut context = engine::create_from_str("evhash-32:00010203").unwrap();
        context.add(b"hello").unwrap();

        let scheme = context.scheme();
        assert_eq!(scheme.init_key().data(), &[0, 1, 2, 3]);
        assert!(!scheme.state().is_empty());

        let mut resumed = engine::create(&scheme).unwrap();
        resumed.add(b" world").unwrap();
        context.add(b" world").unwrap();

        let fin = Key::from(vec![9, 9, 9, 9]);
        assert_eq!(resumed.finalize(&fin).unwrap().tag(), context.finalize(&fin).unwrap().tag());
    }

    #[test]
    fn unkeyed_evhash_rejects_every_final_key() {
        let context = engine::create_from_str("evhash-96").unwrap();
        assert_eq!(context.final_key_size(), 12);
        assert!(!context.is_valid_final_key(&Key::from(vec![0u8; 12])));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let context = engine::create_from_str("evhash-32:deadbeef").unwrap();
        let rendered = format!("{context:?}");
        assert!(rendered.contains("evhash-32"));
        assert!(!rendered.contains("deadbeef"));
    }
}
