//! Crate-wide error taxonomy.
//!
//! Every public operation in this crate ultimately returns (a `Result` wrapping)
//! [`AssessError`]. Submodules define their own, narrower error enums so that
//! unit tests can match on precise variants; [`AssessError`] wraps each of
//! them with `#[from]`, following the same "leaf errors bubble into one
//! taxonomy at the boundary" shape the teacher crate uses for
//! `scheduler::ProveError`/`VerifySchedError`.

use crate::config::ConfigError;
use crate::elements::ElementMapError;
use crate::equivalents::EquivalentsError;
use crate::inference::InferenceError;

/// The taxonomy from the design's error-handling section: invalid input,
/// invalid molecule, parsing failures, missing artifacts, cancellation, and
/// upstream (model/client) failures, each carrying a human-readable cause.
#[derive(Debug, thiserror::Error)]
pub enum AssessError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid molecule: {0}")]
    InvalidMolecule(String),

    #[error("parsing failed: {0}")]
    ParsingFailed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("assessment cancelled")]
    Cancelled,

    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(std::time::Duration),

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ElementMap(#[from] ElementMapError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Equivalents(#[from] EquivalentsError),
}

impl AssessError {
    /// A short, stable kind string for API responses / logging fields —
    /// used by the batch `BatchItemOutcome::Err.kind` and by the HTTP façade
    /// to pick a status code.
    pub fn kind(&self) -> &'static str {
        match self {
            AssessError::InvalidInput(_) => "invalid_input",
            AssessError::InvalidMolecule(_) => "invalid_molecule",
            AssessError::ParsingFailed(_) => "parsing_failed",
            AssessError::NotFound(_) => "not_found",
            AssessError::Cancelled => "cancelled",
            AssessError::DeadlineExceeded(_) => "deadline_exceeded",
            AssessError::Upstream(_) => "upstream",
            AssessError::Config(_) => "invalid_config",
            AssessError::ElementMap(_) => "parsing_failed",
            AssessError::Inference(_) => "upstream",
            AssessError::Equivalents(_) => "upstream",
        }
    }
}

pub type AssessResult<T> = Result<T, AssessError>;
