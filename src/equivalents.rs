//! Doctrine-of-equivalents analysis: Function-Way-Result (FWR) testing over
//! a type-bucketed greedy alignment, gated by a per-pair prosecution-history
//! estoppel pre-check (spec §4.E).

use crate::config::{ConfigError, EquivalentsConfig};
use crate::contracts::EquivalentsModel;
use crate::text::jaccard_similarity;
use crate::types::{
    AmendmentType, ClaimElement, ElementEquivalence, ElementType, EquivalentsResult, FailedStep,
    NonEquivalentElement, ProsecutionHistory, StructuralElement,
};

#[derive(Debug, thiserror::Error)]
pub enum EquivalentsError {
    #[error("invalid equivalents configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Non-scaffold type weight used by the per-type-weighted overall score
/// (spec §4.E); scaffold weight is the only one that's operator-tunable
/// (`EquivalentsConfig::scaffold_weight`) since it's the dominant term.
const SUBSTITUENT_WEIGHT: f64 = 0.8;

fn type_weight(element_type: ElementType, config: &EquivalentsConfig) -> f64 {
    match element_type {
        ElementType::CoreScaffold => config.scaffold_weight,
        ElementType::Substituent => SUBSTITUENT_WEIGHT,
        _ => 1.0,
    }
}

/// Greedily align molecule elements to claim elements: first pass restricts
/// candidates to matching `ElementType` buckets (highest Jaccard similarity
/// of description text first); any claim element left unmatched falls back
/// to the best still-unused molecule element regardless of type.
fn greedy_align(molecule_elements: &[StructuralElement], claim_elements: &[ClaimElement]) -> Vec<(usize, usize)> {
    let mut mol_used = vec![false; molecule_elements.len()];
    let mut claim_used = vec![false; claim_elements.len()];
    let mut pairs = Vec::new();

    let mut same_type: Vec<(f64, usize, usize)> = Vec::new();
    for (ci, ce) in claim_elements.iter().enumerate() {
        for (mi, me) in molecule_elements.iter().enumerate() {
            if me.element_type == ce.element_type {
                same_type.push((jaccard_similarity(&me.description, &ce.description), mi, ci));
            }
        }
    }
    same_type.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
    for (_, mi, ci) in same_type {
        if !mol_used[mi] && !claim_used[ci] {
            mol_used[mi] = true;
            claim_used[ci] = true;
            pairs.push((mi, ci));
        }
    }

    let mut fallback: Vec<(f64, usize, usize)> = Vec::new();
    for (ci, ce) in claim_elements.iter().enumerate() {
        if claim_used[ci] {
            continue;
        }
        for (mi, me) in molecule_elements.iter().enumerate() {
            if mol_used[mi] {
                continue;
            }
            fallback.push((jaccard_similarity(&me.description, &ce.description), mi, ci));
        }
    }
    fallback.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
    for (_, mi, ci) in fallback {
        if !mol_used[mi] && !claim_used[ci] {
            mol_used[mi] = true;
            claim_used[ci] = true;
            pairs.push((mi, ci));
        }
    }

    pairs.sort_by_key(|&(_, ci)| ci);
    pairs
}

/// A narrowing amendment estops a pair's equivalence when it names the claim
/// element and its abandoned scope overlaps the pair's molecule or claim
/// description — checked before any FWR model call is made, so a blocked
/// pair never reaches the neural model.
fn estoppel_blocks(
    mol_element: &StructuralElement,
    claim_element: &ClaimElement,
    history: Option<&ProsecutionHistory>,
) -> Option<String> {
    let history = history?;
    for amendment in &history.amendments {
        if amendment.amendment_type != AmendmentType::Narrowing {
            continue;
        }
        if !amendment
            .affected_elements
            .iter()
            .any(|id| id == &claim_element.id)
        {
            continue;
        }
        let type_match = amendment.abandoned_type == Some(mol_element.element_type);
        let scope_match = amendment
            .abandoned_scope_text
            .as_deref()
            .is_some_and(|scope| claim_element.description.contains(scope) || mol_element.description.contains(scope));
        let smiles_match = amendment.abandoned_smiles.as_deref().is_some_and(|smiles| {
            mol_element
                .smiles_fragment
                .as_deref()
                .map(|frag| frag.contains(smiles))
                .unwrap_or(false)
        });
        if type_match && (scope_match || smiles_match) {
            return Some(amendment.date.clone());
        }
    }
    None
}

async fn evaluate_pair(
    mol_element: &StructuralElement,
    claim_element: &ClaimElement,
    history: Option<&ProsecutionHistory>,
    model: &dyn EquivalentsModel,
    config: &EquivalentsConfig,
) -> ElementEquivalence {
    if let Some(amendment_date) = estoppel_blocks(mol_element, claim_element, history) {
        return ElementEquivalence {
            query_element_id: mol_element.id.clone(),
            claim_element_id: claim_element.id.clone(),
            function_score: None,
            way_score: None,
            result_score: None,
            overall_score: 0.0,
            is_equivalent: false,
            failed_step: Some(FailedStep::Estoppel),
            reasoning: format!(
                "blocked by prosecution-history estoppel (narrowing amendment {amendment_date})"
            ),
        };
    }

    let function_score = model
        .function_similarity(&mol_element.description, &claim_element.description)
        .await;
    if function_score < config.function_threshold {
        return ElementEquivalence {
            query_element_id: mol_element.id.clone(),
            claim_element_id: claim_element.id.clone(),
            function_score: Some(function_score),
            way_score: None,
            result_score: None,
            overall_score: function_score,
            is_equivalent: false,
            failed_step: Some(FailedStep::Function),
            reasoning: format!(
                "function similarity {function_score:.3} below threshold {:.3}",
                config.function_threshold
            ),
        };
    }

    let way_score = model
        .way_similarity(&mol_element.description, &claim_element.description)
        .await;
    if way_score < config.way_threshold {
        let overall = (function_score * 0.40 + way_score * 0.30) / 0.70;
        return ElementEquivalence {
            query_element_id: mol_element.id.clone(),
            claim_element_id: claim_element.id.clone(),
            function_score: Some(function_score),
            way_score: Some(way_score),
            result_score: None,
            overall_score: overall,
            is_equivalent: false,
            failed_step: Some(FailedStep::Way),
            reasoning: format!(
                "function similarity {function_score:.3} passed; way similarity {way_score:.3} below threshold {:.3}",
                config.way_threshold
            ),
        };
    }

    let result_score = model
        .result_similarity(&mol_element.description, &claim_element.description)
        .await;
    let overall = function_score * 0.40 + way_score * 0.30 + result_score * 0.30;
    let is_equivalent = result_score >= config.result_threshold;
    ElementEquivalence {
        query_element_id: mol_element.id.clone(),
        claim_element_id: claim_element.id.clone(),
        function_score: Some(function_score),
        way_score: Some(way_score),
        result_score: Some(result_score),
        overall_score: overall,
        is_equivalent,
        failed_step: if is_equivalent { None } else { Some(FailedStep::Result) },
        reasoning: if is_equivalent {
            format!(
                "function {function_score:.3}, way {way_score:.3}, result {result_score:.3} all passed thresholds"
            )
        } else {
            format!(
                "function {function_score:.3} and way {way_score:.3} passed; result {result_score:.3} below threshold {:.3}",
                config.result_threshold
            )
        },
    }
}

/// Run the doctrine-of-equivalents analysis over an aligned set of molecule
/// and claim elements (spec §4.E).
pub async fn analyze_equivalents(
    molecule_elements: &[StructuralElement],
    claim_elements: &[ClaimElement],
    history: Option<&ProsecutionHistory>,
    model: &dyn EquivalentsModel,
    config: &EquivalentsConfig,
) -> Result<EquivalentsResult, EquivalentsError> {
    config.validate()?;

    if claim_elements.is_empty() {
        return Ok(EquivalentsResult {
            overall_equivalence_score: 0.0,
            element_results: Vec::new(),
            equivalent_element_count: 0,
            total_element_count: 0,
            non_equivalent_elements: Vec::new(),
            skipped: None,
        });
    }

    let pairs = greedy_align(molecule_elements, claim_elements);
    let mut element_results = Vec::with_capacity(pairs.len());
    for &(mi, ci) in &pairs {
        let verdict = evaluate_pair(&molecule_elements[mi], &claim_elements[ci], history, model, config).await;
        element_results.push(verdict);
    }

    let paired_claim_ids: std::collections::HashSet<&str> =
        pairs.iter().map(|&(_, ci)| claim_elements[ci].id.as_str()).collect();
    let mut non_equivalent_elements: Vec<NonEquivalentElement> = element_results
        .iter()
        .zip(pairs.iter())
        .filter(|(r, _)| !r.is_equivalent)
        .map(|(r, &(mi, _))| NonEquivalentElement {
            query_element: molecule_elements[mi].id.clone(),
            claim_element: r.claim_element_id.clone(),
            failed_step: r.failed_step.unwrap_or(FailedStep::Result),
            reason: r.reasoning.clone(),
        })
        .collect();

    for ce in claim_elements {
        if !paired_claim_ids.contains(ce.id.as_str()) {
            non_equivalent_elements.push(NonEquivalentElement {
                query_element: String::new(),
                claim_element: ce.id.clone(),
                failed_step: FailedStep::Function,
                reason: "no molecule element could be aligned to this claim element".to_string(),
            });
        }
    }

    let equivalent_element_count = element_results.iter().filter(|r| r.is_equivalent).count();
    let total_element_count = claim_elements.len();

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (r, &(_, ci)) in element_results.iter().zip(pairs.iter()) {
        let w = type_weight(claim_elements[ci].element_type, config);
        weighted_sum += w * r.overall_score;
        weight_total += w;
    }
    let overall_equivalence_score = if weight_total > 0.0 {
        crate::score::clamp01(weighted_sum / weight_total)
    } else {
        0.0
    };

    Ok(EquivalentsResult {
        overall_equivalence_score,
        element_results,
        equivalent_element_count,
        total_element_count,
        non_equivalent_elements,
        skipped: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mol_element(id: &str, etype: ElementType, description: &str) -> StructuralElement {
        StructuralElement {
            id: id.to_string(),
            element_type: etype,
            description: description.to_string(),
            smiles_fragment: Some("CCO".to_string()),
            role: None,
            position: None,
            weight: None,
            feature_vector: None,
        }
    }

    fn claim_element(id: &str, etype: ElementType, description: &str) -> ClaimElement {
        ClaimElement {
            id: id.to_string(),
            element_type: etype,
            description: description.to_string(),
            structural_constraint: None,
            is_essential: true,
            source: "c1".to_string(),
            feature_vector: None,
            weight: None,
        }
    }

    struct CountingModel {
        function_calls: AtomicUsize,
        way_calls: AtomicUsize,
        result_calls: AtomicUsize,
        function_value: f64,
        way_value: f64,
        result_value: f64,
    }

    impl CountingModel {
        fn new(function_value: f64, way_value: f64, result_value: f64) -> Self {
            Self {
                function_calls: AtomicUsize::new(0),
                way_calls: AtomicUsize::new(0),
                result_calls: AtomicUsize::new(0),
                function_value,
                way_value,
                result_value,
            }
        }
    }

    #[async_trait]
    impl EquivalentsModel for CountingModel {
        async fn function_similarity(&self, _q: &str, _c: &str) -> f64 {
            self.function_calls.fetch_add(1, Ordering::SeqCst);
            self.function_value
        }
        async fn way_similarity(&self, _q: &str, _c: &str) -> f64 {
            self.way_calls.fetch_add(1, Ordering::SeqCst);
            self.way_value
        }
        async fn result_similarity(&self, _q: &str, _c: &str) -> f64 {
            self.result_calls.fetch_add(1, Ordering::SeqCst);
            self.result_value
        }
    }

    #[tokio::test]
    async fn function_failure_short_circuits_way_and_result() {
        let model = CountingModel::new(0.1, 0.99, 0.99);
        let mol = vec![mol_element("m1", ElementType::FunctionalGroup, "an amine group")];
        let claim = vec![claim_element("c1-E1", ElementType::FunctionalGroup, "an amine group")];
        let config = EquivalentsConfig::default();

        let result = analyze_equivalents(&mol, &claim, None, &model, &config).await.unwrap();
        assert_eq!(model.function_calls.load(Ordering::SeqCst), 1);
        assert_eq!(model.way_calls.load(Ordering::SeqCst), 0);
        assert_eq!(model.result_calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.element_results[0].failed_step, Some(FailedStep::Function));
    }

    #[tokio::test]
    async fn way_failure_short_circuits_result() {
        let model = CountingModel::new(0.9, 0.1, 0.99);
        let mol = vec![mol_element("m1", ElementType::FunctionalGroup, "an amine group")];
        let claim = vec![claim_element("c1-E1", ElementType::FunctionalGroup, "an amine group")];
        let config = EquivalentsConfig::default();

        let result = analyze_equivalents(&mol, &claim, None, &model, &config).await.unwrap();
        assert_eq!(model.function_calls.load(Ordering::SeqCst), 1);
        assert_eq!(model.way_calls.load(Ordering::SeqCst), 1);
        assert_eq!(model.result_calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.element_results[0].failed_step, Some(FailedStep::Way));
    }

    #[tokio::test]
    async fn all_steps_pass_marks_equivalent() {
        let model = CountingModel::new(0.9, 0.9, 0.9);
        let mol = vec![mol_element("m1", ElementType::FunctionalGroup, "an amine group")];
        let claim = vec![claim_element("c1-E1", ElementType::FunctionalGroup, "an amine group")];
        let config = EquivalentsConfig::default();

        let result = analyze_equivalents(&mol, &claim, None, &model, &config).await.unwrap();
        assert!(result.element_results[0].is_equivalent);
        assert_eq!(result.equivalent_element_count, 1);
    }

    #[tokio::test]
    async fn scaffold_dominance_weighting_matches_the_worked_example() {
        // One equivalent CoreScaffold pair (weight 2.0) and one non-equivalent
        // Substituent pair (weight 0.8): 2.0 / 2.8 = 0.714..., 0.8 / 2.8 = 0.286...
        struct TypedModel;
        #[async_trait]
        impl EquivalentsModel for TypedModel {
            async fn function_similarity(&self, _q: &str, c: &str) -> f64 {
                if c.contains("scaffold") {
                    1.0
                } else {
                    0.0
                }
            }
            async fn way_similarity(&self, _q: &str, _c: &str) -> f64 {
                1.0
            }
            async fn result_similarity(&self, _q: &str, _c: &str) -> f64 {
                1.0
            }
        }

        let mol = vec![
            mol_element("m1", ElementType::CoreScaffold, "scaffold"),
            mol_element("m2", ElementType::Substituent, "substituent"),
        ];
        let claim = vec![
            claim_element("c1-E1", ElementType::CoreScaffold, "scaffold"),
            claim_element("c1-E2", ElementType::Substituent, "substituent"),
        ];
        let config = EquivalentsConfig::default();

        let result = analyze_equivalents(&mol, &claim, None, &TypedModel, &config).await.unwrap();
        assert!(result.element_results.iter().any(|r| r.is_equivalent));
        assert!(result.element_results.iter().any(|r| !r.is_equivalent));
        assert!((result.overall_equivalence_score - (2.0 / 2.8)).abs() < 1e-6);
    }

    #[tokio::test]
    async fn estoppel_blocks_before_any_model_call() {
        let model = CountingModel::new(0.99, 0.99, 0.99);
        let mol = vec![mol_element("m1", ElementType::FunctionalGroup, "an amine group")];
        let claim = vec![claim_element("c1-E1", ElementType::FunctionalGroup, "an amine group")];
        let history = ProsecutionHistory {
            patent_id: "US123".to_string(),
            amendments: vec![crate::types::Amendment {
                date: "2020-01-01".to_string(),
                original_text: "amine".to_string(),
                amended_text: "narrower".to_string(),
                amendment_type: AmendmentType::Narrowing,
                affected_elements: vec!["c1-E1".to_string()],
                abandoned_type: Some(ElementType::FunctionalGroup),
                abandoned_scope_text: Some("amine".to_string()),
                abandoned_smiles: None,
            }],
            arguments: Vec::new(),
            rejection_responses: Vec::new(),
        };

        let result = analyze_equivalents(&mol, &claim, Some(&history), &model, &EquivalentsConfig::default())
            .await
            .unwrap();
        assert_eq!(model.function_calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.element_results[0].failed_step, Some(FailedStep::Estoppel));
    }

    #[tokio::test]
    async fn estoppel_requires_type_match_and_scope_overlap() {
        let model = CountingModel::new(0.99, 0.99, 0.99);
        let mol = vec![mol_element("m1", ElementType::FunctionalGroup, "an amine group")];
        let claim = vec![claim_element("c1-E1", ElementType::FunctionalGroup, "an amine group")];
        let history = ProsecutionHistory {
            patent_id: "US123".to_string(),
            amendments: vec![crate::types::Amendment {
                date: "2020-01-01".to_string(),
                original_text: "amine".to_string(),
                amended_text: "narrower".to_string(),
                amendment_type: AmendmentType::Narrowing,
                affected_elements: vec!["c1-E1".to_string()],
                abandoned_type: Some(ElementType::FunctionalGroup),
                abandoned_scope_text: None,
                abandoned_smiles: None,
            }],
            arguments: Vec::new(),
            rejection_responses: Vec::new(),
        };

        let result = analyze_equivalents(&mol, &claim, Some(&history), &model, &EquivalentsConfig::default())
            .await
            .unwrap();
        assert!(model.function_calls.load(Ordering::SeqCst) > 0);
        assert_ne!(result.element_results[0].failed_step, Some(FailedStep::Estoppel));
    }

    #[tokio::test]
    async fn unmatched_claim_element_is_reported_as_non_equivalent() {
        let model = CountingModel::new(0.9, 0.9, 0.9);
        let mol: Vec<StructuralElement> = Vec::new();
        let claim = vec![claim_element("c1-E1", ElementType::FunctionalGroup, "an amine group")];
        let result = analyze_equivalents(&mol, &claim, None, &model, &EquivalentsConfig::default())
            .await
            .unwrap();
        assert_eq!(result.non_equivalent_elements.len(), 1);
        assert_eq!(result.equivalent_element_count, 0);
    }
}
