//! External dependency contracts (spec §6).
//!
//! These traits describe collaborators this crate consumes but does not
//! implement for real: the NLP claim parser, the cheminformatics structure
//! analyzer, the neural equivalents/property models, the metrics sink, and
//! the logger. Only their interfaces are in scope here. Each trait is
//! `#[async_trait]` so it can be held as `Arc<dyn Trait + Send + Sync>` and
//! invoked from the orchestrator's concurrently-spawned sub-tasks —
//! `async-trait` is the idiom `AdaWorldAPI-neo4j-rs` reaches for to keep
//! async methods object-safe.
//!
//! `TracingLogger`/`TracingMetrics`/`NoopMetrics` are the ambient-stack
//! implementations of `Logger`/`IntelligenceMetrics` this crate does ship
//! (logging/metrics are an ambient concern, not a feature the spec's
//! Non-goals scope out).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{AssessmentResult, ElementType, RiskLevel};

/// A raw span the NLP parser identified in claim text, before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawElement {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

/// Errors an NLP parser implementation may surface.
#[derive(Debug, thiserror::Error)]
pub enum NlpError {
    #[error("claim text parsing failed: {0}")]
    ParseFailed(String),
}

/// Decomposes claim text into classified spans (out of scope: internals).
#[async_trait]
pub trait NlpParser: Send + Sync {
    async fn parse_claim_text(&self, text: &str) -> Result<Vec<RawElement>, NlpError>;
    fn classify_element(&self, raw: &RawElement) -> ElementType;
}

/// A structural fragment of a decomposed molecule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralFragment {
    pub smiles: String,
    pub role: String,
    pub position: Option<usize>,
    pub description: String,
    pub weight: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("molecule decomposition failed: {0}")]
    DecompositionFailed(String),
    #[error("fragment similarity computation failed: {0}")]
    SimilarityFailed(String),
}

/// Cheminformatics structure analyzer (out of scope: SMILES decomposition,
/// SMARTS matching, fragment similarity internals).
#[async_trait]
pub trait StructureAnalyzer: Send + Sync {
    async fn decompose_molecule(&self, smiles: &str) -> Result<Vec<StructuralFragment>, StructureError>;
    async fn compute_fragment_similarity(&self, a: &str, b: &str) -> Result<f64, StructureError>;
    async fn match_smarts(&self, smiles: &str, smarts: &str) -> bool;
}

/// Independent SMARTS-matching collaborator used by the local inference
/// model's literal-prediction step 1 (spec §4.D) — kept distinct from
/// `StructureAnalyzer::match_smarts` because the spec lists `SMARTSMatcher`
/// as its own dependency in §6.
#[async_trait]
pub trait SmartsMatcher: Send + Sync {
    async fn matches(&self, smiles: &str, smarts: &str) -> bool;
}

/// Validates SMILES strings before any downstream processing (spec §4.D,
/// Non-goals: chemical validity beyond this pluggable validator).
pub trait MoleculeValidator: Send + Sync {
    fn is_valid(&self, smiles: &str) -> bool;
}

/// The neural equivalents model's three symmetric FWR scorers (spec §4.E /
/// §6). Each scorer compares a query-side description against a claim-side
/// description and returns a score in `[0, 1]`.
#[async_trait]
pub trait EquivalentsModel: Send + Sync {
    async fn function_similarity(&self, query_description: &str, claim_description: &str) -> f64;
    async fn way_similarity(&self, query_description: &str, claim_description: &str) -> f64;
    async fn result_similarity(&self, query_description: &str, claim_description: &str) -> f64;
}

/// Predicts a named physical/electronic property for a given SMILES (spec
/// §4.D property-impact step).
#[async_trait]
pub trait PropertyPredictor: Send + Sync {
    async fn predict(&self, smiles: &str, property: &str) -> f64;
    /// The full set of properties evaluated when the caller's requested list
    /// is empty (spec §4.D: "When the target property list is empty, all
    /// defined properties are evaluated.").
    fn default_properties(&self) -> Vec<String>;
}

/// The external model-serving endpoint the remote inference variant calls
/// through (spec §4.D, §6). Payloads are opaque JSON bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub version: String,
}

#[derive(Debug, thiserror::Error, Clone)]
pub enum ServingError {
    #[error("serving call failed: {0}")]
    CallFailed(String),
    #[error("serving endpoint unhealthy")]
    Unhealthy,
}

#[async_trait]
pub trait ServingClient: Send + Sync {
    async fn predict(&self, model_id: &str, payload: &[u8]) -> Result<Vec<u8>, ServingError>;
    async fn healthy(&self) -> bool;
    fn model_info(&self) -> ModelInfo;
}

/// Structured key-value logging (out of scope: sink internals).
pub trait Logger: Send + Sync {
    fn log(&self, level: &str, message: &str, fields: &[(&str, String)]);
}

/// Counters/durations for risk assessment and inference calls (out of
/// scope: sink internals).
pub trait IntelligenceMetrics: Send + Sync {
    fn record_assessment(&self, risk: RiskLevel, duration: Duration, batch_size: usize);
    fn record_inference_call(&self, model_variant: &str, succeeded: bool, duration: Duration);
    fn record_cache_event(&self, hit: bool);
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store failure: {0}")]
    Failed(String),
}

/// Persists assessment artifacts for later explanation (spec §4.G step 11,
/// Non-goals: persistence beyond this pluggable store).
#[async_trait]
pub trait ExplanationStore: Send + Sync {
    async fn save(&self, result: &AssessmentResult) -> Result<(), StoreError>;
    async fn load(&self, request_id: &str) -> Result<AssessmentResult, StoreError>;
}

/// Renders a natural-language explanation of a prior result.
#[async_trait]
pub trait ExplanationGenerator: Send + Sync {
    async fn explain(&self, result: &AssessmentResult) -> String;
}

// ============================================================================
// Ambient-stack implementations: logging and metrics via `tracing`.
// ============================================================================

/// `Logger` implementation that forwards to `tracing`'s structured macros.
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: &str, message: &str, fields: &[(&str, String)]) {
        let joined: HashMap<&str, String> = fields.iter().cloned().collect();
        match level {
            "error" => tracing::error!(fields = ?joined, "{message}"),
            "warn" => tracing::warn!(fields = ?joined, "{message}"),
            "debug" => tracing::debug!(fields = ?joined, "{message}"),
            _ => tracing::info!(fields = ?joined, "{message}"),
        }
    }
}

/// `IntelligenceMetrics` implementation that emits `tracing` events — this
/// crate does not pull in a dedicated metrics crate, matching the rest of
/// the example pack (none of which does either); metrics stay an ambient
/// logging concern.
pub struct TracingMetrics;

impl IntelligenceMetrics for TracingMetrics {
    fn record_assessment(&self, risk: RiskLevel, duration: Duration, batch_size: usize) {
        tracing::info!(
            risk_level = %risk,
            duration_ms = duration.as_millis() as u64,
            batch_size,
            "assessment completed"
        );
    }

    fn record_inference_call(&self, model_variant: &str, succeeded: bool, duration: Duration) {
        tracing::info!(
            model_variant,
            succeeded,
            duration_ms = duration.as_millis() as u64,
            "inference call"
        );
    }

    fn record_cache_event(&self, hit: bool) {
        tracing::debug!(hit, "cache event");
    }
}

/// `IntelligenceMetrics` implementation that discards everything — useful
/// for tests and CLI one-shots where tracing output would be noise.
pub struct NoopMetrics;

impl IntelligenceMetrics for NoopMetrics {
    fn record_assessment(&self, _risk: RiskLevel, _duration: Duration, _batch_size: usize) {}
    fn record_inference_call(&self, _model_variant: &str, _succeeded: bool, _duration: Duration) {}
    fn record_cache_event(&self, _hit: bool) {}
}
