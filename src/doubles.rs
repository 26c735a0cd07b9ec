//! Deterministic stub implementations of every `contracts.rs` collaborator
//! (spec §6, Non-goals: real NLP/cheminformatics/neural-model internals).
//!
//! These exist so the CLI and HTTP binaries can run end to end without a
//! real NLP service, cheminformatics toolkit, or model-serving endpoint
//! wired in — the same role the teacher's `dev-srs` in-memory SRS fallback
//! plays for `prover.rs`/`verifier.rs` when no production setup is
//! available. None of this is meant to produce chemically meaningful
//! output; it exists to exercise the pipeline's control flow.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::contracts::{
    EquivalentsModel, ExplanationGenerator, ExplanationStore, ModelInfo, MoleculeValidator, NlpError, NlpParser,
    PropertyPredictor, RawElement, ServingClient, ServingError, SmartsMatcher, StoreError, StructuralFragment,
    StructureAnalyzer, StructureError,
};
use crate::inference::FingerprintSource;
use crate::score::{clamp01, cosine, deterministic_embed};
use crate::text::jaccard_similarity;
use crate::types::{AssessmentResult, ElementType};

/// Splits claim text on `;` into spans and classifies each by keyword.
pub struct StubNlpParser;

#[async_trait]
impl NlpParser for StubNlpParser {
    async fn parse_claim_text(&self, text: &str) -> Result<Vec<RawElement>, NlpError> {
        if text.trim().is_empty() {
            return Err(NlpError::ParseFailed("claim text is empty".to_string()));
        }
        let mut elements = Vec::new();
        let mut cursor = 0usize;
        for part in text.split(';') {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                elements.push(RawElement {
                    text: trimmed.to_string(),
                    start: cursor,
                    end: cursor + trimmed.len(),
                    confidence: 0.8,
                });
            }
            cursor += part.len() + 1;
        }
        Ok(elements)
    }

    fn classify_element(&self, raw: &RawElement) -> ElementType {
        let lower = raw.text.to_lowercase();
        if lower.contains("scaffold") || lower.contains("core") {
            ElementType::CoreScaffold
        } else if lower.contains("substituent") {
            ElementType::Substituent
        } else if lower.contains("linker") || lower.contains("bridge") {
            ElementType::Linker
        } else if lower.contains("backbone") || lower.contains("chain") {
            ElementType::Backbone
        } else if lower.contains("electron") || lower.contains("homo") || lower.contains("lumo") {
            ElementType::ElectronicProperty
        } else if lower.contains("group") || lower.contains("amine") || lower.contains("carbonyl") {
            ElementType::FunctionalGroup
        } else {
            ElementType::Unknown
        }
    }
}

/// Treats the whole SMILES string as a single scaffold fragment; similarity
/// is the cosine of each fragment's deterministic embedding.
pub struct StubStructureAnalyzer;

#[async_trait]
impl StructureAnalyzer for StubStructureAnalyzer {
    async fn decompose_molecule(&self, smiles: &str) -> Result<Vec<StructuralFragment>, StructureError> {
        if smiles.trim().is_empty() {
            return Err(StructureError::DecompositionFailed("empty SMILES".to_string()));
        }
        let fragments: Vec<&str> = smiles.split('.').filter(|s| !s.is_empty()).collect();
        Ok(fragments
            .iter()
            .enumerate()
            .map(|(i, frag)| StructuralFragment {
                smiles: frag.to_string(),
                role: if i == 0 { "scaffold".to_string() } else { "substituent".to_string() },
                position: Some(i),
                description: format!("fragment derived from {frag}"),
                weight: None,
            })
            .collect())
    }

    async fn compute_fragment_similarity(&self, a: &str, b: &str) -> Result<f64, StructureError> {
        if a.is_empty() || b.is_empty() {
            return Ok(jaccard_similarity(a, b));
        }
        let va = deterministic_embed(a, 32);
        let vb = deterministic_embed(b, 32);
        Ok(clamp01(cosine(&va, &vb)))
    }

    async fn match_smarts(&self, smiles: &str, smarts: &str) -> bool {
        !smarts.is_empty() && smiles.contains(smarts)
    }
}

/// Independent SMARTS matcher with the same substring heuristic as
/// `StubStructureAnalyzer::match_smarts` (spec §6 lists them separately).
pub struct StubSmartsMatcher;

#[async_trait]
impl SmartsMatcher for StubSmartsMatcher {
    async fn matches(&self, smiles: &str, smarts: &str) -> bool {
        !smarts.is_empty() && smiles.contains(smarts)
    }
}

/// Accepts any non-empty string drawn from a conservative SMILES alphabet.
pub struct StubMoleculeValidator;

impl MoleculeValidator for StubMoleculeValidator {
    fn is_valid(&self, smiles: &str) -> bool {
        !smiles.trim().is_empty()
            && smiles
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "()[]=#+-@./\\%*".contains(c))
    }
}

/// Function/way/result similarity via `text::jaccard_similarity` of the two
/// descriptions, with a small symmetric bump for "way" to keep it
/// independent of "function" on the demo inputs.
pub struct StubEquivalentsModel;

#[async_trait]
impl EquivalentsModel for StubEquivalentsModel {
    async fn function_similarity(&self, query_description: &str, claim_description: &str) -> f64 {
        jaccard_similarity(query_description, claim_description)
    }

    async fn way_similarity(&self, query_description: &str, claim_description: &str) -> f64 {
        clamp01(jaccard_similarity(query_description, claim_description) * 0.95 + 0.05)
    }

    async fn result_similarity(&self, query_description: &str, claim_description: &str) -> f64 {
        jaccard_similarity(query_description, claim_description)
    }
}

/// Deterministic pseudo-property predictor: derives a scalar from the
/// embedding of `smiles + property` so the same pair always predicts the
/// same value, and different molecules predict different values.
pub struct StubPropertyPredictor;

#[async_trait]
impl PropertyPredictor for StubPropertyPredictor {
    async fn predict(&self, smiles: &str, property: &str) -> f64 {
        let key = format!("{smiles}:{property}");
        let v = deterministic_embed(&key, 1);
        v.first().copied().unwrap_or(0.0).abs() * 10.0
    }

    fn default_properties(&self) -> Vec<String> {
        vec!["logP".to_string(), "homo".to_string(), "lumo".to_string()]
    }
}

/// A bit-vector fingerprint derived from the deterministic embedding's sign
/// bits, for `RemoteInferenceModel`'s Tanimoto term.
pub struct StubFingerprintSource;

impl FingerprintSource for StubFingerprintSource {
    fn fingerprint(&self, smiles: &str) -> Vec<bool> {
        deterministic_embed(smiles, 128).into_iter().map(|x| x >= 0.0).collect()
    }
}

/// A model-serving endpoint that answers every `RemoteInferenceModel` call
/// locally using the same deterministic building blocks as
/// `LocalInferenceModel`, for exercising the remote code path without a real
/// network service.
pub struct StubServingClient;

#[async_trait]
impl ServingClient for StubServingClient {
    async fn predict(&self, model_id: &str, payload: &[u8]) -> Result<Vec<u8>, ServingError> {
        match model_id {
            "similarity" => {
                #[derive(serde::Deserialize)]
                struct P {
                    a: String,
                    b: String,
                }
                let p: P = serde_json::from_slice(payload).map_err(|e| ServingError::CallFailed(e.to_string()))?;
                let va = deterministic_embed(&p.a, 64);
                let vb = deterministic_embed(&p.b, 64);
                let sim = clamp01(cosine(&va, &vb));
                serde_json::to_vec(&sim).map_err(|e| ServingError::CallFailed(e.to_string()))
            }
            "embedding" => {
                #[derive(serde::Deserialize)]
                struct P {
                    smiles: String,
                    dim: usize,
                }
                let p: P = serde_json::from_slice(payload).map_err(|e| ServingError::CallFailed(e.to_string()))?;
                let v = deterministic_embed(&p.smiles, p.dim);
                serde_json::to_vec(&v).map_err(|e| ServingError::CallFailed(e.to_string()))
            }
            other => Err(ServingError::CallFailed(format!("unsupported model_id: {other}"))),
        }
    }

    async fn healthy(&self) -> bool {
        true
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_id: "demo-remote".to_string(),
            version: "0.1.0".to_string(),
        }
    }
}

/// In-memory `ExplanationStore`, for the CLI and tests.
#[derive(Default)]
pub struct InMemoryExplanationStore {
    results: Mutex<HashMap<String, AssessmentResult>>,
}

#[async_trait]
impl ExplanationStore for InMemoryExplanationStore {
    async fn save(&self, result: &AssessmentResult) -> Result<(), StoreError> {
        self.results
            .lock()
            .map_err(|_| StoreError::Failed("store lock poisoned".to_string()))?
            .insert(result.request_id.clone(), result.clone());
        Ok(())
    }

    async fn load(&self, request_id: &str) -> Result<AssessmentResult, StoreError> {
        self.results
            .lock()
            .map_err(|_| StoreError::Failed("store lock poisoned".to_string()))?
            .get(request_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(request_id.to_string()))
    }
}

/// Renders a plain-English summary of an `AssessmentResult`.
pub struct TemplateExplanationGenerator;

#[async_trait]
impl ExplanationGenerator for TemplateExplanationGenerator {
    async fn explain(&self, result: &AssessmentResult) -> String {
        let mut lines = vec![format!(
            "Overall risk: {} (score {:.4}, confidence {:.4}).",
            result.overall_risk_level, result.overall_score, result.confidence
        )];
        if result.degraded {
            lines.push(format!(
                "Degraded: {}",
                result.degraded_reason.as_deref().unwrap_or("unspecified reason")
            ));
        }
        for claim in &result.matched_claims {
            lines.push(format!(
                "Claim {}: combined {:.4} (literal {:.4}, equivalents {:.4}, estoppel penalty {:.4})",
                claim.claim_id, claim.combined_score, claim.literal_score, claim.equivalents_score, claim.estoppel_penalty
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nlp_parser_splits_on_semicolons_and_classifies() {
        let parser = StubNlpParser;
        let raws = parser.parse_claim_text("a core scaffold; an amine group").await.unwrap();
        assert_eq!(raws.len(), 2);
        assert_eq!(parser.classify_element(&raws[0]), ElementType::CoreScaffold);
        assert_eq!(parser.classify_element(&raws[1]), ElementType::FunctionalGroup);
    }

    #[tokio::test]
    async fn nlp_parser_rejects_empty_text() {
        let parser = StubNlpParser;
        assert!(parser.parse_claim_text("   ").await.is_err());
    }

    #[tokio::test]
    async fn structure_analyzer_rejects_empty_smiles() {
        let analyzer = StubStructureAnalyzer;
        assert!(analyzer.decompose_molecule("").await.is_err());
    }

    #[tokio::test]
    async fn structure_analyzer_similarity_is_symmetric_identity() {
        let analyzer = StubStructureAnalyzer;
        let s = analyzer.compute_fragment_similarity("CCO", "CCO").await.unwrap();
        assert!((s - 1.0).abs() < 1e-6);
    }

    #[test]
    fn molecule_validator_rejects_disallowed_characters() {
        let validator = StubMoleculeValidator;
        assert!(validator.is_valid("CC(=O)Oc1ccccc1C(=O)O"));
        assert!(!validator.is_valid("not valid smiles!!"));
        assert!(!validator.is_valid(""));
    }

    #[tokio::test]
    async fn serving_client_similarity_round_trips() {
        let client = StubServingClient;
        let payload = serde_json::to_vec(&serde_json::json!({"a": "CCO", "b": "CCO"})).unwrap();
        let bytes = client.predict("similarity", &payload).await.unwrap();
        let sim: f64 = serde_json::from_slice(&bytes).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn store_round_trips_and_reports_not_found() {
        let store = InMemoryExplanationStore::default();
        let err = store.load("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
