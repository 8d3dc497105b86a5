//! Evaluation-hash MAC family (`evhash-32` … `evhash-256`).
//!
//! Wegman–Carter authentication: the message is split into N-bit blocks
//! `m_1 .. m_k`, the last zero-padded, and followed by one block carrying
//! the message length in bits. The hash is the polynomial
//! `h = (((m_1)·k ⊕ m_2)·k ⊕ … ⊕ len)·k` over GF(2^N), evaluated at the
//! initial key `k`. The tag is `h ⊕ f`, where `f` is a fresh N-bit final key
//! per message.
//!
//! The initial key may be reused across messages; the final key must not.
//!
//! # State
//!
//! The resumable state is `h || total_len (u64 BE) || pending`, where
//! `pending` is the partial block not yet absorbed (shorter than N bits).

use zeroize::{Zeroize, Zeroizing};

use super::gf2n::{BinaryField, xor_into};
use crate::{error::CryptoError, key::Key};

pub(crate) const ALGORITHM: &str = "evhash";

const LEN_SIZE: usize = std::mem::size_of::<u64>();

pub(crate) struct Evhash {
    name: String,
    field: BinaryField,
    key: Option<Zeroizing<Vec<u8>>>,
    accumulator: Zeroizing<Vec<u8>>,
    total_len: u64,
    pending: Zeroizing<Vec<u8>>,
}

impl Evhash {
    /// Build from a variant string (`"96"`), an initial key and optional
    /// resumable state.
    ///
    /// An empty initial key yields an unkeyed context: it reports its key
    /// sizes but refuses to process data.
    pub(crate) fn new(variant: &str, init_key: &Key, state: &[u8]) -> Result<Self, CryptoError> {
        let name = format!("{ALGORITHM}-{variant}");
        let field = variant
            .parse::<u32>()
            .ok()
            .and_then(BinaryField::for_bits)
            .ok_or_else(|| CryptoError::UnknownAlgorithm { name: name.clone() })?;
        let width = field.width();

        let key = match init_key.len() {
            0 => None,
            len if len == width => Some(Zeroizing::new(init_key.data().to_vec())),
            len => {
                return Err(CryptoError::WrongKey { algorithm: name, expected: width, actual: len });
            },
        };

        let mut evhash = Self {
            name,
            field,
            key,
            accumulator: Zeroizing::new(vec![0u8; width]),
            total_len: 0,
            pending: Zeroizing::new(Vec::with_capacity(width)),
        };

        if !state.is_empty() {
            evhash.restore(state)?;
        }

        Ok(evhash)
    }

    fn restore(&mut self, state: &[u8]) -> Result<(), CryptoError> {
        let width = self.field.width();
        if state.len() < width + LEN_SIZE || state.len() - width - LEN_SIZE >= width {
            return Err(CryptoError::InvalidState {
                algorithm: self.name.clone(),
                reason: format!(
                    "state is {} bytes, expected {} to {}",
                    state.len(),
                    width + LEN_SIZE,
                    2 * width + LEN_SIZE - 1
                ),
            });
        }

        let (accumulator, rest) = state.split_at(width);
        let (total_len, pending) = rest.split_at(LEN_SIZE);

        let mut len_bytes = [0u8; LEN_SIZE];
        len_bytes.copy_from_slice(total_len);
        let total_len = u64::from_be_bytes(len_bytes);

        if total_len % width as u64 != pending.len() as u64 {
            return Err(CryptoError::InvalidState {
                algorithm: self.name.clone(),
                reason: format!(
                    "{} pending bytes inconsistent with message length {total_len}",
                    pending.len()
                ),
            });
        }

        self.accumulator.copy_from_slice(accumulator);
        self.total_len = total_len;
        self.pending.clear();
        self.pending.extend_from_slice(pending);
        Ok(())
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Tag and final key size in bytes.
    pub(crate) fn width(&self) -> usize {
        self.field.width()
    }

    /// Fresh context with the same initial key and a cleared accumulator.
    pub(crate) fn fresh(&self) -> Self {
        let width = self.field.width();
        Self {
            name: self.name.clone(),
            field: self.field,
            key: self.key.clone(),
            accumulator: Zeroizing::new(vec![0u8; width]),
            total_len: 0,
            pending: Zeroizing::new(Vec::with_capacity(width)),
        }
    }

    pub(crate) fn state(&self) -> Vec<u8> {
        let mut state = Vec::with_capacity(self.width() + LEN_SIZE + self.pending.len());
        state.extend_from_slice(&self.accumulator);
        state.extend_from_slice(&self.total_len.to_be_bytes());
        state.extend_from_slice(&self.pending);
        state
    }

    pub(crate) fn add(&mut self, mut data: &[u8]) -> Result<(), CryptoError> {
        let Some(key) = self.key.as_ref() else {
            return Err(CryptoError::MissingInitKey { algorithm: self.name.clone() });
        };
        let width = self.field.width();
        self.total_len = self.total_len.wrapping_add(data.len() as u64);

        // Complete a block left over from a previous add
        if !self.pending.is_empty() {
            let take = (width - self.pending.len()).min(data.len());
            self.pending.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.pending.len() < width {
                return Ok(());
            }
            absorb(self.field, key, &mut self.accumulator, &self.pending);
            self.pending.clear();
        }

        let mut blocks = data.chunks_exact(width);
        for block in blocks.by_ref() {
            absorb(self.field, key, &mut self.accumulator, block);
        }
        self.pending.extend_from_slice(blocks.remainder());

        Ok(())
    }

    /// An unkeyed context accepts no final key at all.
    pub(crate) fn is_valid_final_key(&self, key: &Key) -> bool {
        self.key.is_some() && key.len() == self.field.width()
    }

    pub(crate) fn finalize(mut self, final_key: &Key) -> Result<Vec<u8>, CryptoError> {
        let width = self.field.width();
        let Some(key) = self.key.as_ref() else {
            return Err(CryptoError::MissingInitKey { algorithm: self.name.clone() });
        };
        if !self.is_valid_final_key(final_key) {
            return Err(CryptoError::WrongKey {
                algorithm: self.name.clone(),
                expected: width,
                actual: final_key.len(),
            });
        }

        if !self.pending.is_empty() {
            self.pending.resize(width, 0);
            absorb(self.field, key, &mut self.accumulator, &self.pending);
        }

        // Length block: bit length in the low-order bytes, big-endian
        let bit_len = self.total_len.wrapping_mul(8).to_be_bytes();
        let mut length_block = vec![0u8; width];
        let copied = width.min(LEN_SIZE);
        length_block[width - copied..].copy_from_slice(&bit_len[LEN_SIZE - copied..]);
        absorb(self.field, key, &mut self.accumulator, &length_block);
        length_block.zeroize();

        let mut tag = self.accumulator.to_vec();
        xor_into(&mut tag, final_key.data());
        Ok(tag)
    }
}

/// `acc <- (acc ⊕ block) · key`
fn absorb(field: BinaryField, key: &[u8], accumulator: &mut [u8], block: &[u8]) {
    xor_into(accumulator, block);
    field.mul_assign(accumulator, key);
}
