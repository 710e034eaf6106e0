//! Gather pass configuration.
//!
//! Defaults can be overridden from the environment:
//!
//! | variable | field |
//! |---|---|
//! | `IMAGE_ELEMENTS_BUDGET_MS` | `source_rules_budget_ms` |
//! | `IMAGE_ELEMENTS_SUCCESS_MIN` | `success_status.min` |
//! | `IMAGE_ELEMENTS_SUCCESS_MAX` | `success_status.max` |
//! | `IMAGE_ELEMENTS_LARGEST_FIRST` | `largest_first` |

use crate::error::GatherError;
use crate::network::SuccessStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wall-clock budget for stylesheet sizing lookups.
pub const DEFAULT_SOURCE_RULES_BUDGET_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatherConfig {
    /// Budget shared by all stylesheet sizing lookups of one pass.
    pub source_rules_budget_ms: u64,
    /// Status codes that admit a response into the index.
    pub success_status: SuccessStatus,
    /// Enrich the largest displayed images first.
    pub largest_first: bool,
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            source_rules_budget_ms: DEFAULT_SOURCE_RULES_BUDGET_MS,
            success_status: SuccessStatus::default(),
            largest_first: false,
        }
    }
}

impl GatherConfig {
    /// Defaults with environment overrides applied. Unparsable values are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            source_rules_budget_ms: read_env_u64(
                "IMAGE_ELEMENTS_BUDGET_MS",
                defaults.source_rules_budget_ms,
            ),
            success_status: SuccessStatus {
                min: read_env_u16("IMAGE_ELEMENTS_SUCCESS_MIN", defaults.success_status.min),
                max: read_env_u16("IMAGE_ELEMENTS_SUCCESS_MAX", defaults.success_status.max),
            },
            largest_first: read_env_bool("IMAGE_ELEMENTS_LARGEST_FIRST", defaults.largest_first),
        }
    }

    pub fn source_rules_budget(&self) -> Duration {
        Duration::from_millis(self.source_rules_budget_ms)
    }

    pub fn validate(&self) -> Result<(), GatherError> {
        if self.success_status.is_empty() {
            return Err(GatherError::Config(format!(
                "success status range {}..={} is empty",
                self.success_status.min, self.success_status.max
            )));
        }
        Ok(())
    }
}

fn read_env_u64(name: &str, default_value: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default_value)
}

fn read_env_u16(name: &str, default_value: u16) -> u16 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u16>().ok())
        .unwrap_or(default_value)
}

fn read_env_bool(name: &str, default_value: bool) -> bool {
    match std::env::var(name).ok().map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default_value,
    }
}
