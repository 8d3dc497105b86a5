//! Arithmetic in GF(2^N) on big-endian byte strings.
//!
//! Elements are N-bit polynomials over GF(2), stored most significant byte
//! first. Multiplication is shift-and-add with reduction by a sparse
//! irreducible polynomial `x^N + r(x)`, where `r` has degree below 32.

use zeroize::Zeroize;

/// A binary extension field of `8 * width` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BinaryField {
    width: usize,
    reduction: u32,
}

impl BinaryField {
    /// x^32 + x^7 + x^3 + x^2 + 1
    pub(crate) const GF2_32: Self = Self { width: 4, reduction: 0x8D };
    /// x^64 + x^4 + x^3 + x + 1
    pub(crate) const GF2_64: Self = Self { width: 8, reduction: 0x1B };
    /// x^96 + x^10 + x^9 + x^6 + 1
    pub(crate) const GF2_96: Self = Self { width: 12, reduction: 0x641 };
    /// x^128 + x^7 + x^2 + x + 1
    pub(crate) const GF2_128: Self = Self { width: 16, reduction: 0x87 };
    /// x^256 + x^10 + x^5 + x^2 + 1
    pub(crate) const GF2_256: Self = Self { width: 32, reduction: 0x425 };

    /// Field for an N-bit evaluation hash, if N is supported.
    pub(crate) fn for_bits(bits: u32) -> Option<Self> {
        match bits {
            32 => Some(Self::GF2_32),
            64 => Some(Self::GF2_64),
            96 => Some(Self::GF2_96),
            128 => Some(Self::GF2_128),
            256 => Some(Self::GF2_256),
            _ => None,
        }
    }

    /// Element size in bytes.
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    /// Multiply `a` by `b` in place (`a <- a * b`).
    ///
    /// Both operands must be `width` bytes long.
    pub(crate) fn mul_assign(&self, a: &mut [u8], b: &[u8]) {
        debug_assert_eq!(a.len(), self.width);
        debug_assert_eq!(b.len(), self.width);

        let mut product = vec![0u8; self.width];

        // Horner over the bits of b, most significant first
        for byte in b {
            for bit in (0..8).rev() {
                self.mul_x(&mut product);
                if (byte >> bit) & 1 == 1 {
                    xor_into(&mut product, a);
                }
            }
        }

        a.copy_from_slice(&product);
        product.zeroize();
    }

    /// Multiply by the polynomial `x` (shift left one bit, then reduce).
    fn mul_x(&self, element: &mut [u8]) {
        let overflow = element[0] & 0x80 != 0;

        let mut carry = 0u8;
        for byte in element.iter_mut().rev() {
            let next_carry = *byte >> 7;
            *byte = (*byte << 1) | carry;
            carry = next_carry;
        }

        if overflow {
            let low = self.width - 4;
            xor_into(&mut element[low..], &self.reduction.to_be_bytes());
        }
    }
}

/// `dst ^= src`, byte-wise over the common length.
pub(crate) fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}
