//! Inference model (spec §4.D): a polymorphic literal-prediction /
//! structural-similarity / property-impact / embedding contract, with a
//! deterministic local implementation and a remote implementation that adds
//! LRU caching, retry-with-backoff, and per-call timeouts around an injected
//! [`ServingClient`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::cache::LruCache;
use crate::config::ModelConfig;
use crate::contracts::{ModelInfo, MoleculeValidator, PropertyPredictor, ServingClient, SmartsMatcher};
use crate::score::{clamp01, cosine, delta_percent, deterministic_embed};
use crate::types::{ClaimElement, LiteralPredictionResult};

#[derive(Debug, thiserror::Error, Clone)]
pub enum InferenceError {
    #[error("invalid molecule: {0}")]
    InvalidMolecule(String),
    #[error("upstream inference failure: {0}")]
    Upstream(String),
    #[error("inference call cancelled")]
    Cancelled,
}

/// `Negligible <1%, Minor <5%, Moderate <20%, Major >=20%` (spec §4.D / §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ImpactClass {
    Negligible,
    Minor,
    Moderate,
    Major,
}

impl ImpactClass {
    pub fn classify(abs_delta_percent: f64) -> ImpactClass {
        if abs_delta_percent < 1.0 {
            ImpactClass::Negligible
        } else if abs_delta_percent < 5.0 {
            ImpactClass::Minor
        } else if abs_delta_percent < 20.0 {
            ImpactClass::Moderate
        } else {
            ImpactClass::Major
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyImpact {
    pub property: String,
    pub original: f64,
    pub modified: f64,
    pub delta_percent: f64,
    pub impact_class: ImpactClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyImpactResult {
    pub impacts: Vec<PropertyImpact>,
    pub overall_similarity: f64,
}

/// Supplies a bit-vector structural fingerprint for the Tanimoto term of
/// [`InferenceModel::compute_structural_similarity`]; not part of spec §6's
/// named contracts (it's an optional refinement mentioned only in §4.D), so
/// it lives here rather than in `contracts.rs`.
pub trait FingerprintSource: Send + Sync {
    fn fingerprint(&self, smiles: &str) -> Vec<bool>;
}

fn tanimoto(a: &[bool], b: &[bool]) -> f64 {
    let n = a.len().min(b.len());
    let mut inter = 0usize;
    let mut union = 0usize;
    for i in 0..n {
        if a[i] || b[i] {
            union += 1;
        }
        if a[i] && b[i] {
            inter += 1;
        }
    }
    for x in &a[n..] {
        if *x {
            union += 1;
        }
    }
    for x in &b[n..] {
        if *x {
            union += 1;
        }
    }
    if union == 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}

/// The shared contract between the local and remote inference variants
/// (spec §4.D).
#[async_trait]
pub trait InferenceModel: Send + Sync {
    async fn predict_literal_infringement(
        &self,
        molecule_smiles: &str,
        claim_elements: &[ClaimElement],
        strict: bool,
    ) -> Result<LiteralPredictionResult, InferenceError>;

    async fn compute_structural_similarity(&self, a: &str, b: &str) -> Result<f64, InferenceError>;

    async fn predict_property_impact(
        &self,
        original_smiles: &str,
        modified_smiles: &str,
        properties: &[String],
    ) -> Result<PropertyImpactResult, InferenceError>;

    async fn embed_structure(&self, smiles: &str) -> Result<Vec<f64>, InferenceError>;

    fn model_info(&self) -> ModelInfo;

    async fn healthy(&self) -> bool;
}

fn stddev(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;
    var.sqrt()
}

// ============================================================================
// Local variant
// ============================================================================

/// Deterministic, local inference — no network calls; used for offline
/// testing and as the CLI binary's default collaborator.
pub struct LocalInferenceModel {
    validator: Arc<dyn MoleculeValidator>,
    smarts_matcher: Arc<dyn SmartsMatcher>,
    property_predictor: Arc<dyn PropertyPredictor>,
    fingerprint_source: Option<Arc<dyn FingerprintSource>>,
    config: ModelConfig,
    healthy: AtomicBool,
}

impl LocalInferenceModel {
    pub fn new(
        validator: Arc<dyn MoleculeValidator>,
        smarts_matcher: Arc<dyn SmartsMatcher>,
        property_predictor: Arc<dyn PropertyPredictor>,
        config: ModelConfig,
    ) -> Self {
        Self {
            validator,
            smarts_matcher,
            property_predictor,
            fingerprint_source: None,
            config,
            healthy: AtomicBool::new(true),
        }
    }

    pub fn with_fingerprint_source(mut self, source: Arc<dyn FingerprintSource>) -> Self {
        self.fingerprint_source = Some(source);
        self
    }

    /// Toggle the health flag without affecting any other operation (spec §4.D).
    pub fn set_healthy(&self, value: bool) {
        self.healthy.store(value, Ordering::SeqCst);
    }
}

#[async_trait]
impl InferenceModel for LocalInferenceModel {
    async fn predict_literal_infringement(
        &self,
        molecule_smiles: &str,
        claim_elements: &[ClaimElement],
        strict: bool,
    ) -> Result<LiteralPredictionResult, InferenceError> {
        if !self.validator.is_valid(molecule_smiles) {
            return Err(InferenceError::InvalidMolecule(molecule_smiles.to_string()));
        }

        let start = std::time::Instant::now();
        let mol_vec = deterministic_embed(molecule_smiles, self.config.embedding_dim);

        let mut element_scores = std::collections::HashMap::new();
        let mut scores = Vec::with_capacity(claim_elements.len());
        let mut weights = Vec::with_capacity(claim_elements.len());

        for ce in claim_elements {
            let score = if let Some(smarts) = &ce.structural_constraint {
                if self.smarts_matcher.matches(molecule_smiles, smarts).await {
                    1.0
                } else if let Some(vec) = &ce.feature_vector {
                    if vec.len() == mol_vec.len() {
                        clamp01(cosine(&mol_vec, vec))
                    } else {
                        0.0
                    }
                } else {
                    0.0
                }
            } else if let Some(vec) = &ce.feature_vector {
                if vec.len() == mol_vec.len() {
                    clamp01(cosine(&mol_vec, vec))
                } else {
                    0.0
                }
            } else {
                0.0
            };
            element_scores.insert(ce.id.clone(), score);
            scores.push(score);
            weights.push(ce.weight_or_default());
        }

        let overall_score = if scores.is_empty() {
            0.0
        } else if strict {
            scores.iter().cloned().fold(f64::INFINITY, f64::min)
        } else {
            let total_weight: f64 = weights.iter().sum();
            if total_weight == 0.0 {
                0.0
            } else {
                scores
                    .iter()
                    .zip(weights.iter())
                    .map(|(s, w)| s * w)
                    .sum::<f64>()
                    / total_weight
            }
        };

        let matched_elements: Vec<String> = claim_elements
            .iter()
            .zip(scores.iter())
            .filter(|(_, &s)| s >= 0.5)
            .map(|(ce, _)| ce.id.clone())
            .collect();
        let unmatched_elements: Vec<String> = claim_elements
            .iter()
            .zip(scores.iter())
            .filter(|(_, &s)| s < 0.5)
            .map(|(ce, _)| ce.id.clone())
            .collect();

        let confidence = if scores.is_empty() {
            0.0
        } else {
            clamp01(1.0 - stddev(&scores))
        };

        Ok(LiteralPredictionResult {
            overall_score: clamp01(overall_score),
            element_scores,
            matched_elements,
            unmatched_elements,
            confidence,
            inference_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn compute_structural_similarity(&self, a: &str, b: &str) -> Result<f64, InferenceError> {
        if !self.validator.is_valid(a) {
            return Err(InferenceError::InvalidMolecule(a.to_string()));
        }
        if !self.validator.is_valid(b) {
            return Err(InferenceError::InvalidMolecule(b.to_string()));
        }
        let va = deterministic_embed(a, self.config.embedding_dim);
        let vb = deterministic_embed(b, self.config.embedding_dim);
        let cos = cosine(&va, &vb);
        let tan = match &self.fingerprint_source {
            Some(src) => tanimoto(&src.fingerprint(a), &src.fingerprint(b)),
            None => cos,
        };
        Ok(clamp01(0.7 * cos + 0.3 * tan))
    }

    async fn predict_property_impact(
        &self,
        original_smiles: &str,
        modified_smiles: &str,
        properties: &[String],
    ) -> Result<PropertyImpactResult, InferenceError> {
        let props: Vec<String> = if properties.is_empty() {
            self.property_predictor.default_properties()
        } else {
            properties.to_vec()
        };

        let mut impacts = Vec::with_capacity(props.len());
        let mut abs_deltas = Vec::with_capacity(props.len());
        for prop in &props {
            let original = self.property_predictor.predict(original_smiles, prop).await;
            let modified = self.property_predictor.predict(modified_smiles, prop).await;
            let delta = delta_percent(original, modified);
            abs_deltas.push(delta.abs());
            impacts.push(PropertyImpact {
                property: prop.clone(),
                original,
                modified,
                delta_percent: delta,
                impact_class: ImpactClass::classify(delta.abs()),
            });
        }

        let overall_similarity = if abs_deltas.is_empty() {
            1.0
        } else {
            clamp01(1.0 - (abs_deltas.iter().sum::<f64>() / abs_deltas.len() as f64) / 100.0)
        };

        Ok(PropertyImpactResult {
            impacts,
            overall_similarity,
        })
    }

    async fn embed_structure(&self, smiles: &str) -> Result<Vec<f64>, InferenceError> {
        if !self.validator.is_valid(smiles) {
            return Err(InferenceError::InvalidMolecule(smiles.to_string()));
        }
        Ok(deterministic_embed(smiles, self.config.embedding_dim))
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_id: "local-deterministic".to_string(),
            version: "1.0.0".to_string(),
        }
    }

    async fn healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Remote variant
// ============================================================================

#[derive(Serialize, Deserialize)]
struct SimilarityPayload<'a> {
    a: &'a str,
    b: &'a str,
}

#[derive(Serialize, Deserialize)]
struct EmbedPayload<'a> {
    smiles: &'a str,
    dim: usize,
}

#[derive(Serialize, Deserialize)]
struct LiteralPayload<'a> {
    molecule_smiles: &'a str,
    claim_elements: &'a [ClaimElement],
    strict: bool,
}

#[derive(Serialize, Deserialize)]
struct PropertyImpactPayload<'a> {
    original_smiles: &'a str,
    modified_smiles: &'a str,
    properties: &'a [String],
}

/// Delegates the [`InferenceModel`] contract to an injected [`ServingClient`],
/// wrapping every call in `callWithRetry` (per-attempt timeout, exponential
/// backoff, cooperative cancellation) and memoizing similarity/embedding
/// calls in an LRU cache (spec §4.D).
pub struct RemoteInferenceModel {
    client: Arc<dyn ServingClient>,
    config: ModelConfig,
    similarity_cache: LruCache<String, f64>,
    embedding_cache: LruCache<String, Vec<f64>>,
}

impl RemoteInferenceModel {
    pub fn new(client: Arc<dyn ServingClient>, config: ModelConfig) -> Self {
        let cache_size = config.cache_size;
        Self {
            client,
            config,
            similarity_cache: LruCache::new(cache_size),
            embedding_cache: LruCache::new(cache_size),
        }
    }

    /// `callWithRetry` (spec §4.D): bound each attempt by `inference_timeout`,
    /// back off `retry_backoff * 2^attempt` between attempts up to
    /// `max_retries` additional tries, and abort immediately if `cancel` fires
    /// while waiting out a backoff. Returns the last error, wrapped with the
    /// attempt count, if every attempt fails.
    async fn call_with_retry<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut attempt_fn: F,
    ) -> Result<T, InferenceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, crate::contracts::ServingError>>,
    {
        let mut last_err: Option<String> = None;
        for attempt in 0..=self.config.max_retries {
            let outcome = tokio::time::timeout(self.config.inference_timeout, attempt_fn()).await;
            match outcome {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => last_err = Some(e.to_string()),
                Err(_elapsed) => last_err = Some("inference call timed out".to_string()),
            }

            if attempt == self.config.max_retries {
                break;
            }

            let wait = self.config.retry_backoff * 2u32.pow(attempt);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = cancel.cancelled() => return Err(InferenceError::Cancelled),
            }
        }
        Err(InferenceError::Upstream(format!(
            "failed after {} attempt(s): {}",
            self.config.max_retries + 1,
            last_err.unwrap_or_default()
        )))
    }

    /// Same as [`Self::call_with_retry`] but with no outer cancellation
    /// token (used by trait methods that don't take one) — an always-pending
    /// token never fires, so backoff waits simply run to completion.
    async fn call_with_retry_uncancellable<T, F, Fut>(&self, attempt_fn: F) -> Result<T, InferenceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, crate::contracts::ServingError>>,
    {
        self.call_with_retry(&CancellationToken::new(), attempt_fn).await
    }
}

#[async_trait]
impl InferenceModel for RemoteInferenceModel {
    async fn predict_literal_infringement(
        &self,
        molecule_smiles: &str,
        claim_elements: &[ClaimElement],
        strict: bool,
    ) -> Result<LiteralPredictionResult, InferenceError> {
        let payload = serde_json::to_vec(&LiteralPayload {
            molecule_smiles,
            claim_elements,
            strict,
        })
        .map_err(|e| InferenceError::Upstream(e.to_string()))?;

        let bytes = self
            .call_with_retry_uncancellable(|| {
                let client = Arc::clone(&self.client);
                let payload = payload.clone();
                async move { client.predict("literal", &payload).await }
            })
            .await?;

        serde_json::from_slice(&bytes).map_err(|e| InferenceError::Upstream(e.to_string()))
    }

    async fn compute_structural_similarity(&self, a: &str, b: &str) -> Result<f64, InferenceError> {
        let key = format!("sim:{a}|{b}");
        if let Some(hit) = self.similarity_cache.get(&key) {
            return Ok(hit);
        }

        let payload = serde_json::to_vec(&SimilarityPayload { a, b })
            .map_err(|e| InferenceError::Upstream(e.to_string()))?;
        let bytes = self
            .call_with_retry_uncancellable(|| {
                let client = Arc::clone(&self.client);
                let payload = payload.clone();
                async move { client.predict("similarity", &payload).await }
            })
            .await?;
        let value: f64 = serde_json::from_slice(&bytes).map_err(|e| InferenceError::Upstream(e.to_string()))?;
        let value = clamp01(value);
        self.similarity_cache.put(key, value);
        Ok(value)
    }

    async fn predict_property_impact(
        &self,
        original_smiles: &str,
        modified_smiles: &str,
        properties: &[String],
    ) -> Result<PropertyImpactResult, InferenceError> {
        let payload = serde_json::to_vec(&PropertyImpactPayload {
            original_smiles,
            modified_smiles,
            properties,
        })
        .map_err(|e| InferenceError::Upstream(e.to_string()))?;

        let bytes = self
            .call_with_retry_uncancellable(|| {
                let client = Arc::clone(&self.client);
                let payload = payload.clone();
                async move { client.predict("property_impact", &payload).await }
            })
            .await?;

        serde_json::from_slice(&bytes).map_err(|e| InferenceError::Upstream(e.to_string()))
    }

    async fn embed_structure(&self, smiles: &str) -> Result<Vec<f64>, InferenceError> {
        let key = format!("emb:{smiles}");
        if let Some(hit) = self.embedding_cache.get(&key) {
            return Ok(hit);
        }

        let payload = serde_json::to_vec(&EmbedPayload {
            smiles,
            dim: self.config.embedding_dim,
        })
        .map_err(|e| InferenceError::Upstream(e.to_string()))?;
        let bytes = self
            .call_with_retry_uncancellable(|| {
                let client = Arc::clone(&self.client);
                let payload = payload.clone();
                async move { client.predict("embedding", &payload).await }
            })
            .await?;
        let value: Vec<f64> = serde_json::from_slice(&bytes).map_err(|e| InferenceError::Upstream(e.to_string()))?;
        self.embedding_cache.put(key, value.clone());
        Ok(value)
    }

    fn model_info(&self) -> ModelInfo {
        self.client.model_info()
    }

    async fn healthy(&self) -> bool {
        self.client.healthy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ServingError;
    use std::sync::atomic::{AtomicU32, Ordering as AtOrd};

    struct AlwaysValid;
    impl MoleculeValidator for AlwaysValid {
        fn is_valid(&self, smiles: &str) -> bool {
            !smiles.trim().is_empty()
        }
    }

    struct NoSmarts;
    #[async_trait]
    impl SmartsMatcher for NoSmarts {
        async fn matches(&self, _smiles: &str, _smarts: &str) -> bool {
            false
        }
    }

    struct AlwaysSmarts;
    #[async_trait]
    impl SmartsMatcher for AlwaysSmarts {
        async fn matches(&self, _smiles: &str, _smarts: &str) -> bool {
            true
        }
    }

    struct StubPredictor;
    #[async_trait]
    impl PropertyPredictor for StubPredictor {
        async fn predict(&self, smiles: &str, property: &str) -> f64 {
            (smiles.len() + property.len()) as f64
        }
        fn default_properties(&self) -> Vec<String> {
            vec!["homo".to_string(), "lumo".to_string()]
        }
    }

    fn local_model() -> LocalInferenceModel {
        LocalInferenceModel::new(
            Arc::new(AlwaysValid),
            Arc::new(NoSmarts),
            Arc::new(StubPredictor),
            ModelConfig::default(),
        )
    }

    fn claim_element(id: &str, smarts: Option<&str>, feature_vector: Option<Vec<f64>>, weight: Option<f64>) -> ClaimElement {
        ClaimElement {
            id: id.to_string(),
            element_type: crate::types::ElementType::CoreScaffold,
            description: "an element".to_string(),
            structural_constraint: smarts.map(|s| s.to_string()),
            is_essential: true,
            source: "claim-1".to_string(),
            feature_vector,
            weight,
        }
    }

    #[tokio::test]
    async fn invalid_molecule_is_a_typed_error() {
        let model = local_model();
        let err = model
            .predict_literal_infringement("", &[], false)
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::InvalidMolecule(_)));
    }

    #[tokio::test]
    async fn smarts_match_scores_one() {
        let model = LocalInferenceModel::new(
            Arc::new(AlwaysValid),
            Arc::new(AlwaysSmarts),
            Arc::new(StubPredictor),
            ModelConfig::default(),
        );
        let elements = vec![claim_element("e1", Some("c1ccccc1"), None, None)];
        let result = model
            .predict_literal_infringement("CCO", &elements, false)
            .await
            .unwrap();
        assert_eq!(result.element_scores["e1"], 1.0);
    }

    #[tokio::test]
    async fn strict_aggregation_is_minimum() {
        let model = local_model();
        let elements = vec![
            claim_element("e1", None, Some(vec![1.0, 0.0]), None),
            claim_element("e2", None, None, None), // always scores 0
        ];
        let result = model
            .predict_literal_infringement("CCO", &elements, true)
            .await
            .unwrap();
        assert_eq!(result.overall_score, 0.0);
    }

    #[tokio::test]
    async fn empty_elements_yield_zero_confidence() {
        let model = local_model();
        let result = model
            .predict_literal_infringement("CCO", &[], false)
            .await
            .unwrap();
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.overall_score, 0.0);
    }

    #[tokio::test]
    async fn set_healthy_only_affects_healthy_not_other_ops() {
        let model = local_model();
        model.set_healthy(false);
        assert!(!model.healthy().await);
        // Other operations are unaffected.
        assert!(model.embed_structure("CCO").await.is_ok());
    }

    struct FlakyClient {
        fail_times: AtomicU32,
        healthy_val: AtomicBool,
    }

    #[async_trait]
    impl ServingClient for FlakyClient {
        async fn predict(&self, _model_id: &str, _payload: &[u8]) -> Result<Vec<u8>, ServingError> {
            let remaining = self.fail_times.load(AtOrd::SeqCst);
            if remaining > 0 {
                self.fail_times.fetch_sub(1, AtOrd::SeqCst);
                return Err(ServingError::CallFailed("simulated".to_string()));
            }
            Ok(serde_json::to_vec(&0.75f64).unwrap())
        }
        async fn healthy(&self) -> bool {
            self.healthy_val.load(AtOrd::SeqCst)
        }
        fn model_info(&self) -> ModelInfo {
            ModelInfo {
                model_id: "flaky".to_string(),
                version: "0".to_string(),
            }
        }
    }

    struct CountingClient {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ServingClient for CountingClient {
        async fn predict(&self, _model_id: &str, _payload: &[u8]) -> Result<Vec<u8>, ServingError> {
            self.calls.fetch_add(1, AtOrd::SeqCst);
            Ok(serde_json::to_vec(&0.42f64).unwrap())
        }
        async fn healthy(&self) -> bool {
            true
        }
        fn model_info(&self) -> ModelInfo {
            ModelInfo {
                model_id: "counting".to_string(),
                version: "0".to_string(),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_is_max_retries_plus_one_attempts() {
        let client = Arc::new(FlakyClient {
            fail_times: AtomicU32::new(99),
            healthy_val: AtomicBool::new(true),
        });
        let mut config = ModelConfig::default();
        config.max_retries = 3;
        config.retry_backoff = Duration::from_millis(10);
        let model = RemoteInferenceModel::new(client.clone(), config);

        let err = model.compute_structural_similarity("CCO", "CCN").await.unwrap_err();
        assert!(matches!(err, InferenceError::Upstream(_)));
        // 99 - 4 attempts still leaves failures queued; exactly 4 attempts were made.
        assert_eq!(client.fail_times.load(AtOrd::SeqCst), 95);
    }

    #[tokio::test(start_paused = true)]
    async fn eventual_success_within_retry_budget_returns_ok() {
        let client = Arc::new(FlakyClient {
            fail_times: AtomicU32::new(2),
            healthy_val: AtomicBool::new(true),
        });
        let mut config = ModelConfig::default();
        config.max_retries = 3;
        config.retry_backoff = Duration::from_millis(5);
        let model = RemoteInferenceModel::new(client, config);

        let value = model.compute_structural_similarity("CCO", "CCN").await.unwrap();
        assert!((value - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn similarity_cache_hit_does_not_call_client() {
        let client = Arc::new(CountingClient {
            calls: AtomicU32::new(0),
        });
        let model = RemoteInferenceModel::new(client.clone(), ModelConfig::default());

        let _ = model.compute_structural_similarity("CCO", "CCN").await.unwrap();
        assert_eq!(client.calls.load(AtOrd::SeqCst), 1);
        let _ = model.compute_structural_similarity("CCO", "CCN").await.unwrap();
        assert_eq!(client.calls.load(AtOrd::SeqCst), 1, "cache hit must not call the client");
    }

    #[tokio::test]
    async fn eviction_re_triggers_a_remote_call_for_the_least_recent_key() {
        let client = Arc::new(CountingClient {
            calls: AtomicU32::new(0),
        });
        let mut config = ModelConfig::default();
        config.cache_size = 2;
        let model = RemoteInferenceModel::new(client.clone(), config);

        let _ = model.compute_structural_similarity("A", "B").await.unwrap(); // key1
        let _ = model.compute_structural_similarity("C", "D").await.unwrap(); // key2
        let _ = model.compute_structural_similarity("E", "F").await.unwrap(); // key3, evicts key1
        assert_eq!(client.calls.load(AtOrd::SeqCst), 3);

        let _ = model.compute_structural_similarity("A", "B").await.unwrap(); // evicted -> recompute
        assert_eq!(client.calls.load(AtOrd::SeqCst), 4);
    }

    #[test]
    fn impact_classification_law() {
        assert_eq!(ImpactClass::classify(0.0), ImpactClass::Negligible);
        assert_eq!(ImpactClass::classify(0.99), ImpactClass::Negligible);
        assert_eq!(ImpactClass::classify(1.0), ImpactClass::Minor);
        assert_eq!(ImpactClass::classify(4.99), ImpactClass::Minor);
        assert_eq!(ImpactClass::classify(5.0), ImpactClass::Moderate);
        assert_eq!(ImpactClass::classify(19.99), ImpactClass::Moderate);
        assert_eq!(ImpactClass::classify(20.0), ImpactClass::Major);
        assert_eq!(ImpactClass::classify(1000.0), ImpactClass::Major);
    }
}
