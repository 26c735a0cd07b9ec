//! Data model (spec §3): request-scoped, immutable-once-returned value types
//! shared across the aligner, inference, equivalents, and orchestrator
//! modules.
//!
//! All types derive `serde::{Serialize, Deserialize}` since every one of
//! them crosses the wire somewhere (remote inference payloads, the HTTP
//! façade, or the explanation store).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The kind of fragment a [`StructuralElement`] or [`ClaimElement`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ElementType {
    CoreScaffold,
    Substituent,
    FunctionalGroup,
    Linker,
    Backbone,
    ElectronicProperty,
    Unknown,
}

impl Default for ElementType {
    fn default() -> Self {
        ElementType::Unknown
    }
}

/// A decomposed fragment of the query molecule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralElement {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smiles_fragment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Optional feature vector (used by literal-prediction step 2).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_vector: Option<Vec<f64>>,
}

impl StructuralElement {
    pub fn weight_or_default(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

/// A decomposed piece of a patent claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimElement {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural_constraint: Option<String>,
    pub is_essential: bool,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_vector: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl ClaimElement {
    pub fn weight_or_default(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

/// Independent or dependent claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Independent,
    Dependent,
}

/// A claim decomposed into its own elements plus its full dependency chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedClaim {
    pub claim_id: String,
    pub claim_type: ClaimType,
    pub elements: Vec<ClaimElement>,
    pub dependency_chain: Vec<ClaimElement>,
}

/// How strongly a molecule element and a claim element matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Similar,
    Partial,
    None,
}

impl MatchType {
    /// Classification law from spec §3 / §8: `Exact >= 0.95, Similar >= 0.80,
    /// Partial >= 0.60, else None`.
    pub fn classify(score: f64) -> MatchType {
        if score >= 0.95 {
            MatchType::Exact
        } else if score >= 0.80 {
            MatchType::Similar
        } else if score >= 0.60 {
            MatchType::Partial
        } else {
            MatchType::None
        }
    }
}

/// One molecule-element <-> claim-element pairing produced by the aligner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignedPair {
    pub molecule_element: StructuralElement,
    pub claim_element: ClaimElement,
    pub similarity_score: f64,
    pub match_type: MatchType,
}

/// The full output of the element aligner (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ElementAlignment {
    pub pairs: Vec<AlignedPair>,
    pub unmatched_molecule_elements: Vec<StructuralElement>,
    pub unmatched_claim_elements: Vec<ClaimElement>,
    pub alignment_score: f64,
    pub coverage_ratio: f64,
}

/// The kind of a prosecution-history amendment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmendmentType {
    Narrowing,
    Broadening,
    Clarifying,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Amendment {
    pub date: String,
    pub original_text: String,
    pub amended_text: String,
    #[serde(rename = "type")]
    pub amendment_type: AmendmentType,
    pub affected_elements: Vec<String>,
    /// The element type the amendment narrowed away from, when known — used
    /// by the FWR estoppel gate in `equivalents.rs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abandoned_type: Option<ElementType>,
    /// Substring of the surrendered claim scope (text form).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abandoned_scope_text: Option<String>,
    /// Substring of the surrendered SMILES fragment, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abandoned_smiles: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantArgument {
    pub date: String,
    pub text: String,
    pub distinguished_features: Vec<String>,
    pub surrender_scope: String,
}

/// A patent's prosecution record: amendments, arguments, rejection responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProsecutionHistory {
    pub patent_id: String,
    pub amendments: Vec<Amendment>,
    pub arguments: Vec<ApplicantArgument>,
    #[serde(default)]
    pub rejection_responses: Vec<String>,
}

/// Which FWR step blocked or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedStep {
    Function,
    Way,
    Result,
    Estoppel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstoppelDetail {
    pub affected_element_id: String,
    pub amendment_ref: String,
    pub surrender_description: String,
    pub blocked_equivalent_type: ElementType,
}

/// Result of the prosecution-history estoppel check (spec §3, §4.F).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EstoppelResult {
    pub has_estoppel: bool,
    pub estoppel_penalty: f64,
    pub blocked_equivalences: Vec<String>,
    pub estoppel_details: Vec<EstoppelDetail>,
}

/// Result of the literal-infringement predictor (spec §3, §4.D).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralPredictionResult {
    pub overall_score: f64,
    pub element_scores: HashMap<String, f64>,
    pub matched_elements: Vec<String>,
    pub unmatched_elements: Vec<String>,
    pub confidence: f64,
    pub inference_time_ms: u64,
}

/// Per-pair FWR verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementEquivalence {
    pub query_element_id: String,
    pub claim_element_id: String,
    pub function_score: Option<f64>,
    pub way_score: Option<f64>,
    pub result_score: Option<f64>,
    pub overall_score: f64,
    pub is_equivalent: bool,
    pub failed_step: Option<FailedStep>,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonEquivalentElement {
    pub query_element: String,
    pub claim_element: String,
    pub failed_step: FailedStep,
    pub reason: String,
}

/// Result of the doctrine-of-equivalents analyzer (spec §3, §4.E).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquivalentsResult {
    pub overall_equivalence_score: f64,
    pub element_results: Vec<ElementEquivalence>,
    pub equivalent_element_count: usize,
    pub total_element_count: usize,
    pub non_equivalent_elements: Vec<NonEquivalentElement>,
    /// Set when the orchestrator short-circuited this analysis (spec §4.G step 6).
    #[serde(default)]
    pub skipped: Option<String>,
}

impl EquivalentsResult {
    pub fn skipped(reason: &str) -> Self {
        Self {
            overall_equivalence_score: 0.0,
            element_results: Vec::new(),
            equivalent_element_count: 0,
            total_element_count: 0,
            non_equivalent_elements: Vec::new(),
            skipped: Some(reason.to_string()),
        }
    }
}

/// Five-level risk classification, both ordered and string-stable.
///
/// Resolves the REDESIGN FLAG in spec §9: the integer ordering comes from
/// derive order (`None < Low < Medium < High < Critical`), and the stable
/// string form comes from `Display`/serde rename, so both "shapes" the
/// source carried are available from the one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Classification law from spec §4.G / §8: monotone in `overallScore`
    /// with thresholds {0.30, 0.50, 0.70, 0.85}.
    pub fn classify(overall_score: f64) -> RiskLevel {
        if overall_score >= 0.85 {
            RiskLevel::Critical
        } else if overall_score >= 0.70 {
            RiskLevel::High
        } else if overall_score >= 0.50 {
            RiskLevel::Medium
        } else if overall_score >= 0.30 {
            RiskLevel::Low
        } else {
            RiskLevel::None
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::None => "None",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        };
        f.write_str(s)
    }
}

/// Per-claim match summary built by the orchestrator (spec §4.G step 10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimMatchResult {
    pub claim_id: String,
    pub literal_score: f64,
    pub equivalents_score: f64,
    pub estoppel_penalty: f64,
    pub combined_score: f64,
    pub matched_elements: Vec<String>,
    pub missed_elements: Vec<String>,
}

/// The final synthesized result of one assessment (spec §3, §4.G).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub request_id: String,
    pub overall_risk_level: RiskLevel,
    pub overall_score: f64,
    pub literal_analysis: LiteralPredictionResult,
    pub equivalents_analysis: EquivalentsResult,
    pub estoppel_check: EstoppelResult,
    pub matched_claims: Vec<ClaimMatchResult>,
    pub confidence: f64,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
    pub processing_time_ms: u64,
    pub model_versions: HashMap<String, String>,
}

/// Molecule input: a query compound, named only for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoleculeInput {
    pub id: String,
    pub smiles: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One claim as submitted by the caller, before decomposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimInput {
    pub claim_id: String,
    pub claim_type: ClaimType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_claim_id: Option<String>,
    pub text: String,
}
