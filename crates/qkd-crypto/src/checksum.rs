//! Streaming integrity checksums (`crc32`, `md5`, `sha1`).
//!
//! Structurally the sibling of [`crate::Context`] without a finishing key:
//! add data while open, then [`Checksum::finalize`] consumes the algorithm
//! and returns the [`Digest`]. Used wherever an integrity tag is needed
//! rather than a shared-secret MAC.

use std::fmt;

use md5::{Digest as _, Md5};
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

/// Names of the built-in checksum algorithms.
pub const CHECKSUMS: [&str; 3] = ["crc32", "md5", "sha1"];

/// Open checksum algorithm.
#[derive(Clone)]
pub enum Checksum {
    /// CRC-32 (IEEE 802.3), 4-byte big-endian digest
    Crc32(crc32fast::Hasher),
    /// MD5, 16-byte digest
    Md5(Md5),
    /// SHA-1, 20-byte digest
    Sha1(Sha1),
}

/// Create a checksum by name (case-sensitive).
pub fn create(name: &str) -> Result<Checksum, CryptoError> {
    match name {
        "crc32" => Ok(Checksum::Crc32(crc32fast::Hasher::new())),
        "md5" => Ok(Checksum::Md5(Md5::default())),
        "sha1" => Ok(Checksum::Sha1(Sha1::default())),
        _ => Err(CryptoError::UnknownAlgorithm { name: name.to_owned() }),
    }
}

/// One-shot digest of `data`.
pub fn compute(name: &str, data: &[u8]) -> Result<Digest, CryptoError> {
    let mut checksum = create(name)?;
    checksum.add(data);
    Ok(checksum.finalize())
}

impl Checksum {
    /// Algorithm name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Crc32(_) => "crc32",
            Self::Md5(_) => "md5",
            Self::Sha1(_) => "sha1",
        }
    }

    /// Digest length in bytes.
    pub fn digest_size(&self) -> usize {
        match self {
            Self::Crc32(_) => 4,
            Self::Md5(_) => 16,
            Self::Sha1(_) => 20,
        }
    }

    /// Feed data into the checksum.
    pub fn add(&mut self, data: &[u8]) {
        match self {
            Self::Crc32(hasher) => hasher.update(data),
            Self::Md5(hasher) => hasher.update(data),
            Self::Sha1(hasher) => hasher.update(data),
        }
    }

    /// Consume the checksum and return its digest.
    pub fn finalize(self) -> Digest {
        let bytes = match self {
            Self::Crc32(hasher) => hasher.finalize().to_be_bytes().to_vec(),
            Self::Md5(hasher) => hasher.finalize().to_vec(),
            Self::Sha1(hasher) => hasher.finalize().to_vec(),
        };
        Digest(bytes)
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Checksum").field(&self.name()).finish()
    }
}

/// Finished checksum value.
#[derive(Clone)]
pub struct Digest(Vec<u8>);

impl Digest {
    /// Digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lower-case hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl PartialEq for Digest {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.0.ct_eq(&other.0))
    }
}

impl Eq for Digest {}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
