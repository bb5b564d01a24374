//! Buffer reuse policy: retain by reference when the physical buffer already
//! matches the logical view, repack otherwise.

use arrow::buffer::{Buffer, MutableBuffer};
use arrow::util::bit_util;

use crate::alignment;

/// Whether the physical buffer must be narrowed before it can be emitted.
///
/// A buffer needs narrowing when the array is a slice of a larger one: the
/// view starts at a nonzero offset, or the buffer holds more bytes than the
/// logical view requires.
#[inline]
pub(crate) fn needs_copy(offset: usize, buffer: &Buffer, min_length: usize) -> bool {
    offset != 0 || min_length < buffer.len()
}

/// Emit exactly the `min_length` bytes starting at `byte_offset`.
///
/// The fast path retains the whole buffer by reference. The narrowing path
/// is still allocation-free: the returned handle is a zero-based view into
/// the shared storage covering exactly the needed bytes.
pub(crate) fn truncated_values(buffer: &Buffer, byte_offset: usize, min_length: usize) -> Buffer {
    if needs_copy(byte_offset, buffer, min_length) {
        buffer.slice_with_length(byte_offset, min_length)
    } else {
        buffer.clone()
    }
}

/// Emit a bitmap whose bit 0 is bit `bit_offset` of `buffer`.
///
/// Byte-aligned slices narrow by reference like value buffers. A slice that
/// starts mid-byte must be repacked bit by bit into a fresh zero-based
/// bitmap.
pub(crate) fn truncated_bitmap(buffer: &Buffer, bit_offset: usize, len_bits: usize) -> Buffer {
    let needed = alignment::bytes_for_bits(len_bits);
    if bit_offset % 8 == 0 {
        return truncated_values(buffer, bit_offset / 8, needed);
    }

    let mut packed = MutableBuffer::from_len_zeroed(needed);
    let src = buffer.as_slice();
    let dst = packed.as_slice_mut();
    for i in 0..len_bits {
        if bit_util::get_bit(src, bit_offset + i) {
            bit_util::set_bit(dst, i);
        }
    }
    packed.into()
}
