//! Key material with a pipeline-assigned identifier.
//!
//! A [`Key`] is owned by exactly one pipeline stage at a time and moves
//! downstream by value. Key bytes are zeroized when the key is dropped.

use std::fmt;

use bytes::{Buf, BufMut};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Largest key accepted by [`Key::decode`] (16 MB).
pub const MAX_KEY_SIZE: usize = 16 * 1024 * 1024;

/// Secret key bytes plus a monotonically assigned 64-bit id.
///
/// A key of length zero is the null key.
///
/// # Security
///
/// - Bytes are zeroized on drop
/// - `Debug` never prints key bytes
/// - Equality compares bytes in constant time
#[derive(Clone, Default)]
pub struct Key {
    id: u64,
    data: Vec<u8>,
}

impl Key {
    /// Size of the serialized key prefix: `id` (8 bytes) and length (4
    /// bytes).
    pub const PREFIX_SIZE: usize = 12;

    /// Create a key from raw bytes.
    pub fn new(id: u64, data: impl Into<Vec<u8>>) -> Self {
        Self { id, data: data.into() }
    }

    /// The null key (id 0, no bytes).
    pub fn null() -> Self {
        Self::default()
    }

    /// Open an empty key slot with capacity for `size` bytes.
    pub(crate) fn with_capacity(id: u64, size: usize) -> Self {
        Self { id, data: Vec::with_capacity(size) }
    }

    /// Pipeline-assigned identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Key bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of key bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length key.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True for the null key sentinel (zero length).
    pub fn is_null(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Serialized size in bytes.
    pub fn encoded_len(&self) -> usize {
        Self::PREFIX_SIZE + self.data.len()
    }

    /// Write `id (u64 BE) | len (u32 BE) | bytes`.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<(), CryptoError> {
        let len = u32::try_from(self.data.len())
            .ok()
            .filter(|&len| len as usize <= MAX_KEY_SIZE)
            .ok_or_else(|| CryptoError::MalformedKey {
                reason: format!("{} bytes exceeds maximum of {MAX_KEY_SIZE}", self.data.len()),
            })?;

        dst.put_u64(self.id);
        dst.put_u32(len);
        dst.put_slice(&self.data);
        Ok(())
    }

    /// Read a key written by [`Key::encode`], advancing `src` past it.
    pub fn decode(src: &mut impl Buf) -> Result<Self, CryptoError> {
        if src.remaining() < Self::PREFIX_SIZE {
            return Err(CryptoError::MalformedKey {
                reason: format!(
                    "need {} prefix bytes, have {}",
                    Self::PREFIX_SIZE,
                    src.remaining()
                ),
            });
        }

        let id = src.get_u64();
        let len = src.get_u32() as usize;

        if len > MAX_KEY_SIZE {
            return Err(CryptoError::MalformedKey {
                reason: format!("{len} bytes exceeds maximum of {MAX_KEY_SIZE}"),
            });
        }
        if src.remaining() < len {
            return Err(CryptoError::MalformedKey {
                reason: format!("need {len} key bytes, have {}", src.remaining()),
            });
        }

        let mut data = vec![0u8; len];
        src.copy_to_slice(&mut data);
        Ok(Self { id, data })
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && bool::from(self.data.ct_eq(&other.data))
    }
}

impl Eq for Key {}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key").field("id", &self.id).field("len", &self.data.len()).finish()
    }
}

impl From<Vec<u8>> for Key {
    fn from(data: Vec<u8>) -> Self {
        Self::new(0, data)
    }
}

impl From<&[u8]> for Key {
    fn from(data: &[u8]) -> Self {
        Self::new(0, data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_key_is_empty() {
        let key = Key::null();
        assert!(key.is_null());
        assert_eq!(key.id(), 0);
        assert_eq!(key.len(), 0);
    }

    #[test]
    fn encode_layout_is_big_endian() {
        let key = Key::new(0x0102_0304_0506_0708, vec![0xAA, 0xBB]);
        let mut wire = Vec::new();
        key.encode(&mut wire).unwrap();

        assert_eq!(wire.len(), key.encoded_len());
        assert_eq!(&wire[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&wire[8..12], &[0, 0, 0, 2]);
        assert_eq!(&wire[12..], &[0xAA, 0xBB]);

        let decoded = Key::decode(&mut wire.as_slice()).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn decode_leaves_trailing_bytes() {
        let mut wire = Vec::new();
        Key::new(1, vec![1, 2, 3]).encode(&mut wire).unwrap();
        Key::new(2, vec![4]).encode(&mut wire).unwrap();

        let mut src = wire.as_slice();
        assert_eq!(Key::decode(&mut src).unwrap().id(), 1);
        let second = Key::decode(&mut src).unwrap();
        assert_eq!(second.id(), 2);
        assert_eq!(second.data(), &[4]);
        assert!(src.is_empty());
    }

    #[test]
    fn reject_truncated_key() {
        let mut wire = Vec::new();
        Key::new(9, vec![0u8; 16]).encode(&mut wire).unwrap();
        wire.truncate(20);

        assert!(matches!(Key::decode(&mut wire.as_slice()), Err(CryptoError::MalformedKey { .. })));
        assert!(matches!(Key::decode(&mut &wire[..5]), Err(CryptoError::MalformedKey { .. })));
    }

    #[test]
    fn reject_oversized_length_prefix() {
        let mut wire = Vec::new();
        wire.extend_from_slice(&7u64.to_be_bytes());
        wire.extend_from_slice(&u32::MAX.to_be_bytes());

        assert!(matches!(Key::decode(&mut wire.as_slice()), Err(CryptoError::MalformedKey { .. })));
    }

    #[test]
    fn debug_hides_key_bytes() {
        let key = Key::new(3, vec![0xDE, 0xAD]);
        let rendered = format!("{key:?}");
        assert!(rendered.contains("len: 2"));
        assert!(!rendered.contains("222"));
    }
}
