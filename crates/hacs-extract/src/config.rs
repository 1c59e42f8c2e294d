//! Configuration for extraction runs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Window sizing policy for the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPolicy {
    /// Maximum window size in characters
    pub max_window_chars: usize,

    /// Characters of overlap between consecutive windows
    pub overlap_chars: usize,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            max_window_chars: 6_000,
            overlap_chars: 200,
        }
    }
}

impl WindowPolicy {
    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.max_window_chars == 0 {
            return Err("max_window_chars must be greater than 0".to_string());
        }
        if self.overlap_chars >= self.max_window_chars {
            return Err("overlap_chars must be smaller than max_window_chars".to_string());
        }
        Ok(())
    }
}

/// Immutable configuration governing one extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Maximum simultaneous in-flight LLM calls across all windows and types
    pub concurrency_limit: usize,

    /// Per-call timeout (seconds)
    pub window_timeout_secs: f64,

    /// Whole-run timeout (seconds)
    pub total_timeout_secs: f64,

    /// Cap on fields surfaced per resource type in a prompt
    pub max_extractable_fields: usize,

    /// Retry budget per failed call (0 = no retries)
    pub max_retries: u32,

    /// Whether to collect and expose run metrics
    pub enable_metrics: bool,

    /// Citation-span overlap fraction above which two equal records of the
    /// same type are considered duplicates
    pub dedupe_overlap: f64,

    /// Window sizing policy
    pub window_policy: WindowPolicy,
}

impl ExtractionConfig {
    /// Per-call timeout as a Duration
    pub fn window_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.window_timeout_secs)
    }

    /// Whole-run timeout as a Duration
    pub fn total_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.total_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency_limit == 0 {
            return Err("concurrency_limit must be greater than 0".to_string());
        }
        if self.window_timeout_secs <= 0.0 {
            return Err("window_timeout_secs must be positive".to_string());
        }
        if self.total_timeout_secs <= 0.0 {
            return Err("total_timeout_secs must be positive".to_string());
        }
        if self.window_timeout_secs > self.total_timeout_secs {
            return Err("window_timeout_secs cannot exceed total_timeout_secs".to_string());
        }
        if self.max_extractable_fields == 0 {
            return Err("max_extractable_fields must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.dedupe_overlap) {
            return Err("dedupe_overlap must be within [0.0, 1.0]".to_string());
        }
        self.window_policy.validate()
    }
}

impl Default for ExtractionConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            concurrency_limit: 4,
            window_timeout_secs: 30.0,
            total_timeout_secs: 300.0,
            max_extractable_fields: 8,
            max_retries: 2,
            enable_metrics: true,
            dedupe_overlap: 0.5,
            window_policy: WindowPolicy::default(),
        }
    }
}

impl ExtractionConfig {
    /// Fast preset: shorter timeouts, smaller prompts, no retries
    pub fn fast() -> Self {
        Self {
            concurrency_limit: 8,
            window_timeout_secs: 10.0,
            total_timeout_secs: 60.0,
            max_extractable_fields: 4,
            max_retries: 0,
            enable_metrics: true,
            dedupe_overlap: 0.5,
            window_policy: WindowPolicy {
                max_window_chars: 3_000,
                overlap_chars: 100,
            },
        }
    }

    /// Thorough preset: longer timeouts, richer prompts, more retries
    pub fn thorough() -> Self {
        Self {
            concurrency_limit: 2,
            window_timeout_secs: 120.0,
            total_timeout_secs: 900.0,
            max_extractable_fields: 12,
            max_retries: 3,
            enable_metrics: true,
            dedupe_overlap: 0.5,
            window_policy: WindowPolicy {
                max_window_chars: 12_000,
                overlap_chars: 400,
            },
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
