/*!
 * Heap Configuration
 * Region sizing with environment overrides
 */

use super::errors::HeapError;
use super::limits::{
    CAPACITY_ENV_VAR, DEFAULT_REGION_CAPACITY, GRANULE, MAX_REGION_CAPACITY, MIN_REGION_CAPACITY,
    REGION_OVERHEAD,
};
use super::types::{HeapResult, Size};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Heap configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapConfig {
    /// Total backing store in bytes, including sentinels, tags and header
    pub capacity: Size,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_REGION_CAPACITY,
        }
    }
}

impl HeapConfig {
    pub fn with_capacity(capacity: Size) -> Self {
        Self { capacity }
    }

    /// Build a configuration from `TAGHEAP_CAPACITY`, falling back to the default
    pub fn from_env() -> Self {
        match std::env::var(CAPACITY_ENV_VAR) {
            Ok(raw) => match raw.trim().parse::<Size>() {
                Ok(capacity) => Self::with_capacity(capacity),
                Err(e) => {
                    warn!(value = %raw, error = %e, "Ignoring unparsable {}", CAPACITY_ENV_VAR);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Bytes available to the initial free block
    pub fn usable(&self) -> Size {
        self.capacity.saturating_sub(REGION_OVERHEAD)
    }

    pub fn validate(&self) -> HeapResult<()> {
        let reason = if self.capacity % GRANULE != 0 {
            Some("not a multiple of the granule size")
        } else if self.capacity < MIN_REGION_CAPACITY {
            Some("too small for one minimum free block")
        } else if self.capacity > MAX_REGION_CAPACITY {
            Some("block sizes would overflow the tag size field")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(HeapError::InvalidCapacity {
                capacity: self.capacity,
                reason,
            }),
            None => Ok(()),
        }
    }
}
