//! Assessment orchestrator (spec §4.G): wires the element mapper, inference
//! model, and equivalents analyzer into a single-request pipeline, plus
//! bounded-concurrency batch and portfolio pipelines built on top of it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::config::{AssessmentConfig, EquivalentsConfig, ModelConfig};
use crate::contracts::{
    ExplanationGenerator, ExplanationStore, IntelligenceMetrics, Logger, NlpParser, StoreError, StructureAnalyzer,
};
use crate::elements;
use crate::equivalents;
use crate::error::{AssessError, AssessResult};
use crate::inference::InferenceModel;
use crate::types::{
    AssessmentResult, ClaimInput, ClaimMatchResult, EquivalentsResult, EstoppelResult, LiteralPredictionResult,
    MoleculeInput, ProsecutionHistory, RiskLevel, StructuralElement,
};

/// The wire-level assessment request (spec §9 Open Question, resolved to a
/// flat-claims shape: one molecule, its claims inline, optional prosecution
/// history and per-request option overrides — no extra nesting layer, so it
/// composes directly into `assess_batch`/`assess_portfolio`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(default)]
    pub request_id: Option<String>,
    pub molecule: MoleculeInput,
    pub claims: Vec<ClaimInput>,
    #[serde(default)]
    pub prosecution_history: Option<ProsecutionHistory>,
    #[serde(default)]
    pub patent_id: Option<String>,
    #[serde(default)]
    pub options: Option<AssessmentRequestOptions>,
}

/// Per-request overrides of the assessor's default [`AssessmentConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentRequestOptions {
    pub enable_equivalents: Option<bool>,
    pub enable_estoppel_check: Option<bool>,
    pub confidence_threshold: Option<f64>,
    pub timeout_ms: Option<u64>,
}

fn effective_config(base: &AssessmentConfig, overrides: &Option<AssessmentRequestOptions>) -> AssessmentConfig {
    let mut cfg = base.clone();
    if let Some(opts) = overrides {
        if let Some(v) = opts.enable_equivalents {
            cfg.enable_equivalents = v;
        }
        if let Some(v) = opts.enable_estoppel_check {
            cfg.enable_estoppel_check = v;
        }
        if let Some(v) = opts.confidence_threshold {
            cfg.confidence_threshold = v;
        }
        if let Some(ms) = opts.timeout_ms {
            cfg.timeout = Duration::from_millis(ms);
        }
    }
    cfg
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

struct PerClaimOutcome {
    matched: ClaimMatchResult,
    literal: LiteralPredictionResult,
    equivalents: EquivalentsResult,
    estoppel: EstoppelResult,
    risk: RiskLevel,
    degraded: bool,
    degraded_reason: Option<String>,
}

/// The wired collaborators and tunables for a single assessor instance.
pub struct Assessor {
    nlp: Arc<dyn NlpParser>,
    structure: Arc<dyn StructureAnalyzer>,
    inference: Arc<dyn InferenceModel>,
    equivalents_model: Arc<dyn crate::contracts::EquivalentsModel>,
    logger: Arc<dyn Logger>,
    metrics: Arc<dyn IntelligenceMetrics>,
    store: Option<Arc<dyn ExplanationStore>>,
    explainer: Option<Arc<dyn ExplanationGenerator>>,
    config: AssessmentConfig,
    model_config: ModelConfig,
    equivalents_config: EquivalentsConfig,
}

impl Assessor {
    pub fn new(
        nlp: Arc<dyn NlpParser>,
        structure: Arc<dyn StructureAnalyzer>,
        inference: Arc<dyn InferenceModel>,
        equivalents_model: Arc<dyn crate::contracts::EquivalentsModel>,
        logger: Arc<dyn Logger>,
        metrics: Arc<dyn IntelligenceMetrics>,
        config: AssessmentConfig,
        model_config: ModelConfig,
        equivalents_config: EquivalentsConfig,
    ) -> Self {
        Self {
            nlp,
            structure,
            inference,
            equivalents_model,
            logger,
            metrics,
            store: None,
            explainer: None,
            config,
            model_config,
            equivalents_config,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ExplanationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_explainer(mut self, explainer: Arc<dyn ExplanationGenerator>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    /// Run a single assessment end to end (spec §4.G).
    pub async fn assess(&self, request: AssessmentRequest) -> AssessResult<AssessmentResult> {
        let config = effective_config(&self.config, &request.options);
        config.validate()?;

        if request.molecule.smiles.trim().is_empty() {
            return Err(AssessError::InvalidInput("molecule.smiles must not be empty".to_string()));
        }
        if request.claims.is_empty() {
            return Err(AssessError::InvalidInput("claims must not be empty".to_string()));
        }

        match tokio::time::timeout(config.timeout, self.assess_inner(&request, &config)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(AssessError::DeadlineExceeded(config.timeout)),
        }
    }

    async fn assess_inner(
        &self,
        request: &AssessmentRequest,
        config: &AssessmentConfig,
    ) -> AssessResult<AssessmentResult> {
        let start = Instant::now();
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| format!("req-{}", request.molecule.id));

        let mapped_claims = elements::map_elements(&request.claims, self.nlp.as_ref()).await?;
        let molecule_elements = elements::map_molecule_to_elements(&request.molecule, self.structure.as_ref()).await?;

        let semaphore = Arc::new(Semaphore::new(config.max_concurrency));
        let mut handles = Vec::with_capacity(mapped_claims.len());
        for mapped_claim in mapped_claims {
            let semaphore = Arc::clone(&semaphore);
            let molecule_elements = molecule_elements.clone();
            let molecule_smiles = request.molecule.smiles.clone();
            let history = request.prosecution_history.clone();
            let config = config.clone();
            let equivalents_config = self.equivalents_config.clone();
            let strict_aggregation = self.model_config.strict_aggregation;
            let inference = Arc::clone(&self.inference);
            let equivalents_model = Arc::clone(&self.equivalents_model);
            let structure = Arc::clone(&self.structure);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                assess_one_claim(
                    &molecule_elements,
                    &molecule_smiles,
                    &mapped_claim.claim_id,
                    &mapped_claim.elements,
                    &mapped_claim.dependency_chain,
                    history.as_ref(),
                    inference.as_ref(),
                    equivalents_model.as_ref(),
                    structure.as_ref(),
                    &config,
                    &equivalents_config,
                    strict_aggregation,
                )
                .await
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = handle
                .await
                .map_err(|e| AssessError::Upstream(format!("claim assessment task panicked: {e}")))??;
            outcomes.push(outcome);
        }

        outcomes.sort_by(|a, b| b.matched.combined_score.partial_cmp(&a.matched.combined_score).unwrap());

        let top = outcomes
            .first()
            .ok_or_else(|| AssessError::InvalidInput("no claims produced a result".to_string()))?;

        let overall_score = round4(top.matched.combined_score);
        let overall_risk_level = top.risk;
        let degraded = outcomes.iter().any(|o| o.degraded);
        let degraded_reason = outcomes.iter().find_map(|o| o.degraded_reason.clone());

        let confidence = if top.equivalents.skipped.is_none() && top.equivalents.total_element_count > 0 {
            let coverage = top.equivalents.equivalent_element_count as f64 / top.equivalents.total_element_count as f64;
            round4((top.literal.confidence + coverage) / 2.0)
        } else {
            round4(top.literal.confidence)
        };

        let model_info = self.inference.model_info();
        let mut model_versions = HashMap::new();
        model_versions.insert("inference".to_string(), format!("{}@{}", model_info.model_id, model_info.version));

        let result = AssessmentResult {
            request_id,
            overall_risk_level,
            overall_score,
            literal_analysis: top.literal.clone(),
            equivalents_analysis: top.equivalents.clone(),
            estoppel_check: top.estoppel.clone(),
            matched_claims: outcomes.iter().map(|o| o.matched.clone()).collect(),
            confidence,
            degraded,
            degraded_reason,
            processing_time_ms: start.elapsed().as_millis() as u64,
            model_versions,
        };

        self.metrics.record_assessment(overall_risk_level, start.elapsed(), 1);
        self.logger.log(
            "info",
            "assessment completed",
            &[
                ("request_id", result.request_id.clone()),
                ("risk_level", overall_risk_level.to_string()),
            ],
        );

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&result).await {
                self.logger.log(
                    "warn",
                    "failed to persist assessment result",
                    &[("request_id", result.request_id.clone()), ("error", e.to_string())],
                );
            }
        }

        Ok(result)
    }

    /// Bounded-concurrency batch pipeline: each item is assessed on its own
    /// `tokio::spawn`ed task gated by a shared `Semaphore`, with per-item
    /// failures captured as `BatchItemOutcome::Err` rather than aborting the
    /// batch, and output order matching input order (spec §9 Open Question,
    /// resolved to an embedded-error shape rather than a parallel
    /// index/error list). Takes `Arc<Self>` so each spawned task can hold
    /// its own owning handle to the assessor.
    pub async fn assess_batch(self: &Arc<Self>, requests: Vec<AssessmentRequest>) -> Vec<BatchItemOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut handles = Vec::with_capacity(requests.len());
        for request in requests {
            let this = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let request_id = request.request_id.clone();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                match this.assess(request).await {
                    Ok(result) => BatchItemOutcome::Ok(result),
                    Err(e) => BatchItemOutcome::Err {
                        request_id,
                        message: e.to_string(),
                        kind: e.kind().to_string(),
                    },
                }
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await.unwrap_or_else(|e| BatchItemOutcome::Err {
                request_id: None,
                message: format!("batch item task panicked: {e}"),
                kind: "upstream".to_string(),
            }));
        }
        outcomes
    }

    /// Group requests by `patent_id` (an "UNSPECIFIED" bucket for requests
    /// that don't carry one), dispatch the whole set through
    /// [`Self::assess_batch`], and summarize the results (spec §4.G).
    pub async fn assess_portfolio(self: &Arc<Self>, requests: Vec<AssessmentRequest>) -> PortfolioResult {
        const UNSPECIFIED: &str = "UNSPECIFIED";
        let patent_ids: Vec<String> = requests
            .iter()
            .map(|r| r.patent_id.clone().unwrap_or_else(|| UNSPECIFIED.to_string()))
            .collect();

        let outcomes = self.assess_batch(requests).await;

        let mut results_by_patent: HashMap<String, Vec<BatchItemOutcome>> = HashMap::new();
        let mut risk_histogram: HashMap<String, usize> = HashMap::new();
        let mut scored: Vec<AssessmentResult> = Vec::new();

        for (patent_id, outcome) in patent_ids.into_iter().zip(outcomes.into_iter()) {
            if let BatchItemOutcome::Ok(result) = &outcome {
                *risk_histogram.entry(result.overall_risk_level.to_string()).or_insert(0) += 1;
                scored.push(result.clone());
            }
            results_by_patent.entry(patent_id).or_default().push(outcome);
        }

        scored.sort_by(|a, b| b.overall_score.partial_cmp(&a.overall_score).unwrap());
        scored.truncate(10);

        PortfolioResult {
            results_by_patent,
            risk_histogram,
            top_matches: scored,
        }
    }

    /// Retrieve a previously persisted result and render its explanation
    /// (spec §4.G step 11).
    pub async fn explain(&self, request_id: &str) -> AssessResult<String> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| AssessError::NotFound(request_id.to_string()))?;
        let result = store.load(request_id).await.map_err(|e| match e {
            StoreError::NotFound(id) => AssessError::NotFound(id),
            StoreError::Failed(msg) => AssessError::Upstream(msg),
        })?;
        match &self.explainer {
            Some(explainer) => Ok(explainer.explain(&result).await),
            None => Ok(format!(
                "risk={} score={} confidence={}",
                result.overall_risk_level, result.overall_score, result.confidence
            )),
        }
    }
}

/// One batch item's outcome (spec §9 Open Question: embeds the error inline
/// rather than a separate parallel error array, so a consumer only needs
/// this one list to reconstruct which request failed and why).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchItemOutcome {
    Ok(AssessmentResult),
    Err {
        request_id: Option<String>,
        message: String,
        kind: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioResult {
    pub results_by_patent: HashMap<String, Vec<BatchItemOutcome>>,
    pub risk_histogram: HashMap<String, usize>,
    pub top_matches: Vec<AssessmentResult>,
}

#[allow(clippy::too_many_arguments)]
async fn assess_one_claim(
    molecule_elements: &[StructuralElement],
    molecule_smiles: &str,
    claim_id: &str,
    own_elements: &[crate::types::ClaimElement],
    dependency_chain: &[crate::types::ClaimElement],
    history: Option<&ProsecutionHistory>,
    inference: &dyn InferenceModel,
    equivalents_model: &dyn crate::contracts::EquivalentsModel,
    structure: &dyn StructureAnalyzer,
    config: &AssessmentConfig,
    equivalents_config: &EquivalentsConfig,
    strict_aggregation: bool,
) -> AssessResult<PerClaimOutcome> {
    let mut full_elements = own_elements.to_vec();
    full_elements.extend(dependency_chain.iter().cloned());

    let alignment = elements::align_elements(molecule_elements, &full_elements, structure).await?;

    let cancel = CancellationToken::new();

    let literal_fut = inference.predict_literal_infringement(molecule_smiles, &full_elements, strict_aggregation);

    // A clone dedicated to the equivalents leg: `literal_fut` already holds a
    // borrow of `full_elements` for the duration of the `tokio::join!` below,
    // so the concurrently-running equivalents leg needs its own copy rather
    // than sharing that borrow.
    let equivalents_claim_elements = full_elements.clone();
    let equivalents_fut = {
        let cancel = cancel.clone();
        async move {
            if !config.enable_equivalents {
                return Ok(EquivalentsResult::skipped("disabled by configuration"));
            }
            tokio::select! {
                _ = cancel.cancelled() => Ok(EquivalentsResult::skipped("short-circuited by literal score")),
                r = equivalents::analyze_equivalents(molecule_elements, &equivalents_claim_elements, history, equivalents_model, equivalents_config) => {
                    r.map_err(AssessError::from)
                }
            }
        }
    };

    let (literal_result, equivalents_result) = tokio::join!(literal_fut, equivalents_fut);
    let literal = literal_result.map_err(AssessError::from)?;

    if literal.overall_score >= config.short_circuit_threshold && config.enable_equivalents {
        cancel.cancel();
    }

    let mut degraded = false;
    let mut degraded_reason = None;
    let equivalents = match equivalents_result {
        Ok(r) => r,
        Err(e) => {
            degraded = true;
            degraded_reason = Some(format!("equivalents analysis failed: {e}"));
            EquivalentsResult::skipped("equivalents analysis failed")
        }
    };

    let estoppel = if config.enable_estoppel_check {
        match history {
            Some(h) => elements::check_estoppel(&alignment, h),
            None => EstoppelResult::default(),
        }
    } else {
        EstoppelResult::default()
    };

    let short_circuited = literal.overall_score >= config.short_circuit_threshold && config.enable_equivalents;

    let mut fused = crate::score::clamp01(
        0.5 * literal.overall_score + 0.35 * equivalents.overall_equivalence_score - 0.15 * estoppel.estoppel_penalty,
    );
    if short_circuited {
        fused = fused.max(0.85);
    }
    let risk = if short_circuited {
        RiskLevel::Critical
    } else {
        RiskLevel::classify(fused)
    };

    let matched = ClaimMatchResult {
        claim_id: claim_id.to_string(),
        literal_score: round4(literal.overall_score),
        equivalents_score: round4(equivalents.overall_equivalence_score),
        estoppel_penalty: round4(estoppel.estoppel_penalty),
        combined_score: round4(fused),
        matched_elements: literal.matched_elements.clone(),
        missed_elements: literal.unmatched_elements.clone(),
    };

    Ok(PerClaimOutcome {
        matched,
        literal,
        equivalents,
        estoppel,
        risk,
        degraded,
        degraded_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{
        EquivalentsModel, ModelInfo, NlpError, RawElement, ServingError, StructuralFragment, StructureError,
    };
    use crate::inference::InferenceError;
    use crate::types::{ClaimType, ElementType, LiteralPredictionResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubParser;
    #[async_trait]
    impl NlpParser for StubParser {
        async fn parse_claim_text(&self, text: &str) -> Result<Vec<RawElement>, NlpError> {
            Ok(text
                .split(';')
                .filter(|s| !s.trim().is_empty())
                .map(|s| RawElement {
                    text: s.trim().to_string(),
                    start: 0,
                    end: s.len(),
                    confidence: 1.0,
                })
                .collect())
        }
        fn classify_element(&self, _raw: &RawElement) -> ElementType {
            ElementType::FunctionalGroup
        }
    }

    struct StubAnalyzer;
    #[async_trait]
    impl StructureAnalyzer for StubAnalyzer {
        async fn decompose_molecule(&self, smiles: &str) -> Result<Vec<StructuralFragment>, StructureError> {
            Ok(vec![StructuralFragment {
                smiles: smiles.to_string(),
                role: "scaffold".to_string(),
                position: Some(0),
                description: "the core scaffold".to_string(),
                weight: None,
            }])
        }
        async fn compute_fragment_similarity(&self, a: &str, b: &str) -> Result<f64, StructureError> {
            Ok(if a == b { 1.0 } else { 0.9 })
        }
        async fn match_smarts(&self, _smiles: &str, _smarts: &str) -> bool {
            false
        }
    }

    struct StubInference;
    #[async_trait]
    impl InferenceModel for StubInference {
        async fn predict_literal_infringement(
            &self,
            _molecule_smiles: &str,
            claim_elements: &[crate::types::ClaimElement],
            _strict: bool,
        ) -> Result<LiteralPredictionResult, InferenceError> {
            Ok(LiteralPredictionResult {
                overall_score: 0.95,
                element_scores: claim_elements.iter().map(|e| (e.id.clone(), 0.95)).collect(),
                matched_elements: claim_elements.iter().map(|e| e.id.clone()).collect(),
                unmatched_elements: Vec::new(),
                confidence: 0.9,
                inference_time_ms: 1,
            })
        }
        async fn compute_structural_similarity(&self, _a: &str, _b: &str) -> Result<f64, InferenceError> {
            Ok(0.8)
        }
        async fn predict_property_impact(
            &self,
            _o: &str,
            _m: &str,
            _p: &[String],
        ) -> Result<crate::inference::PropertyImpactResult, InferenceError> {
            Ok(crate::inference::PropertyImpactResult {
                impacts: Vec::new(),
                overall_similarity: 1.0,
            })
        }
        async fn embed_structure(&self, _s: &str) -> Result<Vec<f64>, InferenceError> {
            Ok(vec![1.0, 0.0])
        }
        fn model_info(&self) -> ModelInfo {
            ModelInfo {
                model_id: "stub".to_string(),
                version: "0".to_string(),
            }
        }
        async fn healthy(&self) -> bool {
            true
        }
    }

    struct StubEquivalentsModel;
    #[async_trait]
    impl EquivalentsModel for StubEquivalentsModel {
        async fn function_similarity(&self, _q: &str, _c: &str) -> f64 {
            0.9
        }
        async fn way_similarity(&self, _q: &str, _c: &str) -> f64 {
            0.9
        }
        async fn result_similarity(&self, _q: &str, _c: &str) -> f64 {
            0.9
        }
    }

    struct NullLogger;
    impl Logger for NullLogger {
        fn log(&self, _level: &str, _message: &str, _fields: &[(&str, String)]) {}
    }

    struct NullMetrics;
    impl IntelligenceMetrics for NullMetrics {
        fn record_assessment(&self, _risk: RiskLevel, _duration: Duration, _batch_size: usize) {}
        fn record_inference_call(&self, _model_variant: &str, _succeeded: bool, _duration: Duration) {}
        fn record_cache_event(&self, _hit: bool) {}
    }

    #[derive(Default)]
    struct InMemoryStore {
        saved: Mutex<HashMap<String, AssessmentResult>>,
    }
    #[async_trait]
    impl ExplanationStore for InMemoryStore {
        async fn save(&self, result: &AssessmentResult) -> Result<(), StoreError> {
            self.saved.lock().unwrap().insert(result.request_id.clone(), result.clone());
            Ok(())
        }
        async fn load(&self, request_id: &str) -> Result<AssessmentResult, StoreError> {
            self.saved
                .lock()
                .unwrap()
                .get(request_id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(request_id.to_string()))
        }
    }

    fn assessor() -> Assessor {
        Assessor::new(
            Arc::new(StubParser),
            Arc::new(StubAnalyzer),
            Arc::new(StubInference),
            Arc::new(StubEquivalentsModel),
            Arc::new(NullLogger),
            Arc::new(NullMetrics),
            AssessmentConfig::default(),
            ModelConfig::default(),
            EquivalentsConfig::default(),
        )
    }

    fn request() -> AssessmentRequest {
        AssessmentRequest {
            request_id: Some("r1".to_string()),
            molecule: MoleculeInput {
                id: "m1".to_string(),
                smiles: "CCO".to_string(),
                name: None,
            },
            claims: vec![ClaimInput {
                claim_id: "c1".to_string(),
                claim_type: ClaimType::Independent,
                parent_claim_id: None,
                text: "a core scaffold".to_string(),
            }],
            prosecution_history: None,
            patent_id: None,
            options: None,
        }
    }

    #[tokio::test]
    async fn assess_produces_a_risk_classified_result() {
        let result = assessor().assess(request()).await.unwrap();
        assert_eq!(result.matched_claims.len(), 1);
        assert!(result.overall_score > 0.0);
    }

    #[tokio::test]
    async fn empty_claims_is_invalid_input() {
        let mut req = request();
        req.claims.clear();
        let err = assessor().assess(req).await.unwrap_err();
        assert!(matches!(err, AssessError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn empty_molecule_smiles_is_invalid_input() {
        let mut req = request();
        req.molecule.smiles = "".to_string();
        let err = assessor().assess(req).await.unwrap_err();
        assert!(matches!(err, AssessError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn batch_preserves_order_and_embeds_per_item_errors() {
        let good = request();
        let mut bad = request();
        bad.request_id = Some("bad".to_string());
        bad.claims.clear();

        let outcomes = Arc::new(assessor()).assess_batch(vec![good, bad]).await;
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], BatchItemOutcome::Ok(_)));
        assert!(matches!(outcomes[1], BatchItemOutcome::Err { .. }));
    }

    #[tokio::test]
    async fn portfolio_groups_by_patent_id_with_unspecified_sentinel() {
        let mut req = request();
        req.patent_id = Some("US123".to_string());
        let portfolio = Arc::new(assessor()).assess_portfolio(vec![req]).await;
        assert!(portfolio.results_by_patent.contains_key("US123"));
        assert_eq!(portfolio.top_matches.len(), 1);
    }

    #[tokio::test]
    async fn explain_without_a_store_configured_is_not_found() {
        let err = assessor().explain("nope").await.unwrap_err();
        assert!(matches!(err, AssessError::NotFound(_)));
    }

    #[tokio::test]
    async fn explain_after_persistence_returns_a_summary() {
        let store = Arc::new(InMemoryStore::default());
        let a = assessor().with_store(store.clone());
        let result = a.assess(request()).await.unwrap();
        let explanation = a.explain(&result.request_id).await.unwrap();
        assert!(explanation.contains("risk="));
    }
}
