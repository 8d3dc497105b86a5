//! QKD Pipeline Cryptographic Core
//!
//! Pluggable authentication and encryption for the stages of a quantum key
//! distribution post-processing pipeline, and the key buffering between
//! them.
//!
//! # Structure
//!
//! ```text
//! "evhash-96:<hex key>"          scheme text (configuration, persistence)
//!        │  Scheme::parse
//!        ▼
//!      Scheme ──engine::create──▶ Context  (add … finalize → tag)
//!                                    │
//!          4 × Context ─────────▶ Association (auth/enc × in/out)
//!
//! raw key material ──push_back──▶ KeyRing ──pop_front──▶ Key (fixed size)
//! ```
//!
//! Algorithms are a closed set: `null` (no-op), `xor` (one-time pad),
//! `evhash-N` (Wegman–Carter MAC over GF(2^N), N ∈ {32, 64, 96, 128, 256}).
//! Integrity checksums (`crc32`, `md5`, `sha1`) come from [`checksum`].
//!
//! # Key Consumption
//!
//! Every context consumes `init_key_size` bytes when built and
//! `final_key_size` bytes when finalized. An association's budget per round
//! is the sum over its four contexts; `evhash-96` for authentication and
//! `xor` for encryption costs 48 bytes plus the encrypted data.
//!
//! # Security
//!
//! - Key bytes and accumulators are zeroized on drop
//! - Tags and digests compare in constant time
//! - A context is consumed by `finalize`, so it cannot be reused with a second
//!   final key

#![forbid(unsafe_code)]

pub mod association;
pub mod checksum;
pub mod context;
pub mod engine;
mod error;
pub mod key;
pub mod key_ring;
pub mod scheme;

pub use association::{Association, AssociationDefinition, ContextPair};
pub use checksum::{Checksum, Digest};
pub use context::{Context, Finalized};
pub use error::{CryptoError, ParseError};
pub use key::Key;
pub use key_ring::KeyRing;
pub use scheme::Scheme;
