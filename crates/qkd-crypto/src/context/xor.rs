//! One-time-pad style XOR cipher.
//!
//! Accumulates plaintext and XORs it with the finishing key. Consumes as
//! much key as there is data and carries no resumable state.

use zeroize::Zeroizing;

use crate::{error::CryptoError, key::Key};

pub(crate) const NAME: &str = "xor";

const WORD: usize = std::mem::size_of::<u64>();

#[derive(Default)]
pub(crate) struct Xor {
    buffer: Zeroizing<Vec<u8>>,
}

impl Xor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Bytes accumulated so far; the finishing key must be at least this
    /// long.
    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn is_valid_final_key(&self, key: &Key) -> bool {
        key.len() >= self.buffer.len()
    }

    pub(crate) fn finalize(mut self, key: &Key) -> Result<Vec<u8>, CryptoError> {
        if !self.is_valid_final_key(key) {
            return Err(CryptoError::WrongKey {
                algorithm: NAME.to_owned(),
                expected: self.buffer.len(),
                actual: key.len(),
            });
        }

        let pad = &key.data()[..self.buffer.len()];

        // Word-wise over the aligned prefix, byte-wise over the remainder
        let mut data_words = self.buffer.chunks_exact_mut(WORD);
        let mut pad_words = pad.chunks_exact(WORD);
        for (data, pad) in data_words.by_ref().zip(pad_words.by_ref()) {
            let mut word = [0u8; WORD];
            word.copy_from_slice(data);
            let mut other = [0u8; WORD];
            other.copy_from_slice(pad);
            let mixed = u64::from_ne_bytes(word) ^ u64::from_ne_bytes(other);
            data.copy_from_slice(&mixed.to_ne_bytes());
        }
        for (data, pad) in data_words.into_remainder().iter_mut().zip(pad_words.remainder()) {
            *data ^= pad;
        }

        Ok(std::mem::take(&mut *self.buffer))
    }
}
