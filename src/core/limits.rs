/*!
 * Heap Limits and Constants
 *
 * Centralized location for the region layout constants.
 * Every metadata unit (tag, free-list node, header) occupies exactly one granule.
 */

// =============================================================================
// LAYOUT
// =============================================================================

/// Size of one region granule in bytes
/// Tags, link fields and the free-list header each occupy one granule
pub const GRANULE: usize = 16;

/// Payload alignment; every request is rounded up to this
pub const ALIGNMENT: usize = GRANULE;

/// Size of one boundary tag (status, marker, size, padding)
pub const TAG_SIZE: usize = GRANULE;

/// Tag overhead paid by every block (start tag + end tag)
pub const BLOCK_OVERHEAD: usize = 2 * TAG_SIZE;

/// Smallest payload a free block may shrink to
/// Must hold the two free-list link fields
pub const MIN_FREE_PAYLOAD: usize = GRANULE;

/// Fixed overhead of a region: two sentinels, the first block's two tags and the header
pub const REGION_OVERHEAD: usize = 4 * TAG_SIZE + GRANULE;

// =============================================================================
// CAPACITY
// =============================================================================

/// Reference backing store size (1600 usable bytes)
pub const DEFAULT_REGION_CAPACITY: usize = 1680;

/// Smallest region that still holds one minimum free block
pub const MIN_REGION_CAPACITY: usize = REGION_OVERHEAD + MIN_FREE_PAYLOAD;

/// Largest region whose block sizes fit the 4-byte tag size field
pub const MAX_REGION_CAPACITY: usize = u32::MAX as usize - (u32::MAX as usize % GRANULE);

/// Environment variable overriding the configured capacity
pub const CAPACITY_ENV_VAR: &str = "TAGHEAP_CAPACITY";

/// Environment variable switching trace output to JSON
pub const TRACE_JSON_ENV_VAR: &str = "TAGHEAP_TRACE_JSON";
