//! Functional-option configuration structs (spec §6), each with a `Default`
//! and a validate-on-construct `validate()`, following the teacher's
//! `Domain::new_with_c_r` pattern of checking invariants before the value is
//! trusted elsewhere in the crate.

use std::time::Duration;

/// Errors raised by `validate()` on any of this module's config structs.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be > 0, got {value}")]
    MustBePositive { field: &'static str, value: f64 },
    #[error("{field} must be in (0, 1], got {value}")]
    MustBeUnitInterval { field: &'static str, value: f64 },
    #[error("{field} must be in [0, 1], got {value}")]
    MustBeClosedUnitInterval { field: &'static str, value: f64 },
}

/// Options controlling a single assessment (spec §4.G / §6).
#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    pub enable_equivalents: bool,
    pub enable_estoppel_check: bool,
    pub confidence_threshold: f64,
    pub max_concurrency: usize,
    pub timeout: Duration,
    /// Literal score at or above which equivalents is short-circuited (spec §4.G step 6).
    pub short_circuit_threshold: f64,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            enable_equivalents: true,
            enable_estoppel_check: true,
            confidence_threshold: 0.5,
            max_concurrency: 8,
            timeout: Duration::from_secs(30),
            short_circuit_threshold: 0.90,
        }
    }
}

impl AssessmentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0 < self.confidence_threshold && self.confidence_threshold <= 1.0) {
            return Err(ConfigError::MustBeUnitInterval {
                field: "confidence_threshold",
                value: self.confidence_threshold,
            });
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::MustBePositive {
                field: "max_concurrency",
                value: 0.0,
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::MustBePositive {
                field: "timeout",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Options controlling the inference model (spec §4.D / §6).
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub device_type: String,
    pub batch_size: usize,
    pub cache_size: usize,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub inference_timeout: Duration,
    /// `strict` uses min-aggregation, `relaxed` uses weighted mean (spec §4.D).
    pub strict_aggregation: bool,
    pub embedding_dim: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            device_type: "cpu".to_string(),
            batch_size: 16,
            cache_size: 512,
            max_retries: 2,
            retry_backoff: Duration::from_millis(100),
            inference_timeout: Duration::from_secs(5),
            strict_aggregation: false,
            embedding_dim: 64,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::MustBePositive {
                field: "batch_size",
                value: 0.0,
            });
        }
        if self.cache_size == 0 {
            return Err(ConfigError::MustBePositive {
                field: "cache_size",
                value: 0.0,
            });
        }
        if self.retry_backoff.is_zero() {
            return Err(ConfigError::MustBePositive {
                field: "retry_backoff",
                value: 0.0,
            });
        }
        if self.inference_timeout.is_zero() {
            return Err(ConfigError::MustBePositive {
                field: "inference_timeout",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Options controlling the equivalents (FWR) analyzer (spec §4.E / §6).
#[derive(Debug, Clone)]
pub struct EquivalentsConfig {
    pub function_threshold: f64,
    pub way_threshold: f64,
    pub result_threshold: f64,
    pub scaffold_weight: f64,
}

impl Default for EquivalentsConfig {
    fn default() -> Self {
        Self {
            function_threshold: 0.70,
            way_threshold: 0.60,
            result_threshold: 0.65,
            scaffold_weight: 2.0,
        }
    }
}

impl EquivalentsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("function_threshold", self.function_threshold),
            ("way_threshold", self.way_threshold),
            ("result_threshold", self.result_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::MustBeClosedUnitInterval { field, value });
            }
        }
        if self.scaffold_weight <= 0.0 {
            return Err(ConfigError::MustBePositive {
                field: "scaffold_weight",
                value: self.scaffold_weight,
            });
        }
        Ok(())
    }
}
