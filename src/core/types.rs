/*!
 * Core Types
 * Common types used across the heap
 */

/// Byte offset of a payload, relative to the base of the region
pub type Address = usize;

/// Size type for region and payload lengths
pub type Size = usize;

/// Monotonic counter of heap mutations, stamped into tags
pub type Generation = u64;

/// Common result type for heap operations
pub type HeapResult<T> = Result<T, super::errors::HeapError>;

/// Rounds `value` up to the next multiple of `align` (a power of two)
///
/// Returns `None` if the rounded value does not fit in `usize`.
#[inline]
pub fn align_up(value: Size, align: Size) -> Option<Size> {
    let mask = align.checked_sub(1)?;
    value.checked_add(mask).map(|v| v & !mask)
}

/// Index of the 16-byte granule holding `offset`
#[inline]
pub(crate) fn granule(offset: usize) -> usize {
    offset / super::limits::GRANULE
}
