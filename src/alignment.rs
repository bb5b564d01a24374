//! Byte-alignment math for the wire format.
//!
//! Every buffer in a payload body is padded to an 8-byte boundary, and the
//! total body size must itself be a multiple of 8. These helpers centralize
//! that arithmetic so the encoder's bookkeeping and the sink-level padding
//! can never disagree.

use arrow::util::bit_util;

/// Alignment boundary (in bytes) for every body buffer and the body total.
pub const ALIGNMENT: usize = 8;

/// Round `len` up to the next multiple of [`ALIGNMENT`].
#[inline]
pub fn padded_length(len: i64) -> i64 {
    (len + ALIGNMENT as i64 - 1) & !(ALIGNMENT as i64 - 1)
}

/// Number of zero bytes needed to pad `len` to the next alignment boundary.
#[inline]
pub fn padding_for(len: usize) -> usize {
    (ALIGNMENT - len % ALIGNMENT) % ALIGNMENT
}

/// Whether `len` sits exactly on an alignment boundary.
#[inline]
pub fn is_aligned(len: i64) -> bool {
    len % ALIGNMENT as i64 == 0
}

/// Number of bytes required to hold `bits` bits in a packed bitmap.
#[inline]
pub fn bytes_for_bits(bits: usize) -> usize {
    bit_util::ceil(bits, 8)
}
