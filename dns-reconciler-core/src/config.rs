//! Engine tunables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::validation::MAX_TTL;

/// Reconciler configuration.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconcilerConfig {
    /// TTL applied when a create request omits one.
    pub default_ttl: u32,
    /// Fixed pause between items of a batch zone creation, in milliseconds.
    pub batch_delay_ms: u64,
    /// Zones with more records than this get a warning during zone validation.
    pub large_zone_threshold: u32,
    /// TXT values longer than this get a warning.
    pub txt_warn_length: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            batch_delay_ms: 1000,
            large_zone_threshold: 1000,
            txt_warn_length: 255,
        }
    }
}

impl ReconcilerConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Reject values the services cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.default_ttl > MAX_TTL {
            return Err(CoreError::Config(format!(
                "defaultTtl {} exceeds {MAX_TTL}",
                self.default_ttl
            )));
        }
        if self.txt_warn_length == 0 {
            return Err(CoreError::Config("txtWarnLength must be positive".into()));
        }
        Ok(())
    }
}
