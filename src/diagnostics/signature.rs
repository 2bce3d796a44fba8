/*!
 * Signature Checker
 *
 * Compares a tag's diagnostic marker against the edge expected at that offset.
 * Mismatches are logged and returned; the allocator never consults the result.
 */

use crate::memory::{Edge, Signature, TagHeap};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// A tag whose marker does not read as the expected edge
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[error("signature check failed at {context}: offset 0x{offset:x}, expected {expected} edge, found {}", describe(.found))]
pub struct SignatureMismatch {
    pub offset: usize,
    pub expected: Edge,
    /// `None` when the granule holds no tag at all
    pub found: Option<Signature>,
    pub context: &'static str,
}

fn describe(found: &Option<Signature>) -> String {
    match found {
        Some(signature) => signature.to_string(),
        None => "no tag".to_string(),
    }
}

/// Check the marker of the tag at `offset`
///
/// Region sentinels pass for the edge they face; retired tags never pass.
pub fn check_signature(
    heap: &TagHeap,
    offset: usize,
    expected: Edge,
    context: &'static str,
) -> Result<(), SignatureMismatch> {
    let found = heap.tag(offset).map(|tag| tag.marker.signature);
    if found.and_then(|signature| signature.live_edge()) == Some(expected) {
        return Ok(());
    }

    let mismatch = SignatureMismatch {
        offset,
        expected,
        found,
        context,
    };
    warn!(
        offset = format_args!("0x{:x}", offset),
        expected = %expected,
        found = %describe(&found),
        context,
        "Tag signature mismatch"
    );
    Err(mismatch)
}
