/*!
 * Error Types
 * Centralized error handling with thiserror and miette support
 */

use super::types::{Address, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Heap errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum HeapError {
    #[error("Backing region of {capacity} bytes could not be reserved")]
    #[diagnostic(
        code(heap::region_unavailable),
        help("The heap cannot operate without its region. Lower the capacity or free host memory.")
    )]
    RegionUnavailable { capacity: Size },

    #[error("Invalid region capacity {capacity}: {reason}")]
    #[diagnostic(
        code(heap::invalid_capacity),
        help("Capacity must be a multiple of 16 between the minimum region and the 32-bit size limit.")
    )]
    InvalidCapacity { capacity: Size, reason: &'static str },

    #[error("Invalid release of 0x{address:x}: {reason}")]
    #[diagnostic(
        code(heap::invalid_release),
        help("Only addresses returned by allocate() and not yet released may be released.")
    )]
    InvalidRelease {
        address: Address,
        reason: ReleaseRejection,
    },

    #[error("Heap corruption detected at offset 0x{offset:x}: {detail}")]
    #[diagnostic(code(heap::corruption))]
    Corruption { offset: usize, detail: &'static str },
}

impl HeapError {
    pub(crate) fn invalid_release(address: Address, reason: ReleaseRejection) -> Self {
        Self::InvalidRelease { address, reason }
    }

    pub(crate) fn corruption(offset: usize, detail: &'static str) -> Self {
        Self::Corruption { offset, detail }
    }

    /// Whether this error is a rejected release (the recoverable "invalid" status)
    pub fn is_invalid_release(&self) -> bool {
        matches!(self, Self::InvalidRelease { .. })
    }
}

/// Why a release request was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseRejection {
    #[error("address lies outside the region")]
    OutOfRegion,
    #[error("address is not granule aligned")]
    Misaligned,
    #[error("address overlaps the free-list header")]
    HeaderStorage,
    #[error("no tag precedes the address")]
    MissingStartTag,
    #[error("preceding tag is not allocated")]
    NotAllocated,
    #[error("preceding tag records a zero size")]
    ZeroSize,
    #[error("address does not start a payload")]
    NotPayloadStart,
    #[error("end tag is missing, free or records a different size")]
    EndTagMismatch,
}
