//! Claim/molecule decomposition, element alignment, and prosecution-history
//! estoppel (spec §4.F).
//!
//! Three largely independent pieces share this module because they all
//! operate over the same `StructuralElement`/`ClaimElement` vocabulary:
//! mapping raw inputs into elements, aligning a molecule's elements against a
//! claim's elements via the Hungarian matcher, and checking whether a prior
//! prosecution-history amendment estops a given alignment.

use std::collections::{HashMap, HashSet};

use crate::contracts::{NlpParser, StructureAnalyzer};
use crate::matcher::{self, UNASSIGNED};
use crate::text;
use crate::types::{
    AlignedPair, AmendmentType, ApplicantArgument, ClaimElement, ClaimInput, ClaimType, ElementAlignment,
    ElementType, EstoppelDetail, EstoppelResult, MappedClaim, MatchType, MoleculeInput, ProsecutionHistory,
    StructuralElement,
};

#[derive(Debug, thiserror::Error)]
pub enum ElementMapError {
    #[error("claim dependency cycle detected: {0}")]
    CyclicDependency(String),
    #[error("parent claim not found: {0}")]
    ParentNotFound(String),
    #[error("molecule decomposition produced zero fragments")]
    EmptyMolecule,
    #[error("nlp parsing failed: {0}")]
    NlpFailed(String),
    #[error("structure analysis failed: {0}")]
    StructureFailed(String),
    #[error("prosecution history parsing failed: {0}")]
    HistoryParseFailed(String),
    #[error("prosecution history is missing a patentId")]
    MissingPatentId,
}

impl From<crate::contracts::NlpError> for ElementMapError {
    fn from(e: crate::contracts::NlpError) -> Self {
        ElementMapError::NlpFailed(e.to_string())
    }
}

impl From<crate::contracts::StructureError> for ElementMapError {
    fn from(e: crate::contracts::StructureError) -> Self {
        ElementMapError::StructureFailed(e.to_string())
    }
}

/// Decompose claim text into classified elements, tagging each independent
/// claim's elements as essential and resolving each dependent claim's full
/// dependency chain back to its root (spec §4.F).
pub async fn map_elements(
    claims: &[ClaimInput],
    parser: &dyn NlpParser,
) -> Result<Vec<MappedClaim>, ElementMapError> {
    let mut by_id: HashMap<&str, &ClaimInput> = HashMap::new();
    for c in claims {
        by_id.insert(c.claim_id.as_str(), c);
    }

    let mut own_elements: HashMap<String, Vec<ClaimElement>> = HashMap::new();
    for claim in claims {
        let raws = parser
            .parse_claim_text(&claim.text)
            .await
            .map_err(ElementMapError::from)?;
        let mut elements = Vec::with_capacity(raws.len());
        for (seq, raw) in raws.iter().enumerate() {
            let element_type = parser.classify_element(raw);
            elements.push(ClaimElement {
                id: format!("{}-E{}", claim.claim_id, seq + 1),
                element_type,
                description: raw.text.clone(),
                structural_constraint: None,
                is_essential: claim.claim_type == ClaimType::Independent,
                source: claim.claim_id.clone(),
                feature_vector: None,
                weight: None,
            });
        }
        own_elements.insert(claim.claim_id.clone(), elements);
    }

    let mut mapped = Vec::with_capacity(claims.len());
    for claim in claims {
        let chain = resolve_dependency_chain(claim, &by_id, &own_elements)?;
        mapped.push(MappedClaim {
            claim_id: claim.claim_id.clone(),
            claim_type: claim.claim_type,
            elements: own_elements.get(&claim.claim_id).cloned().unwrap_or_default(),
            dependency_chain: chain,
        });
    }
    Ok(mapped)
}

fn resolve_dependency_chain(
    claim: &ClaimInput,
    by_id: &HashMap<&str, &ClaimInput>,
    own_elements: &HashMap<String, Vec<ClaimElement>>,
) -> Result<Vec<ClaimElement>, ElementMapError> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = claim;
    visited.insert(current.claim_id.clone());

    while let Some(parent_id) = &current.parent_claim_id {
        let parent = by_id
            .get(parent_id.as_str())
            .ok_or_else(|| ElementMapError::ParentNotFound(parent_id.clone()))?;
        if !visited.insert(parent.claim_id.clone()) {
            return Err(ElementMapError::CyclicDependency(parent.claim_id.clone()));
        }
        if let Some(elements) = own_elements.get(&parent.claim_id) {
            chain.extend(elements.iter().cloned());
        }
        current = parent;
    }
    Ok(chain)
}

/// Decompose a query molecule's SMILES into structural elements (spec §4.F).
pub async fn map_molecule_to_elements(
    molecule: &MoleculeInput,
    analyzer: &dyn StructureAnalyzer,
) -> Result<Vec<StructuralElement>, ElementMapError> {
    let fragments = analyzer
        .decompose_molecule(&molecule.smiles)
        .await
        .map_err(ElementMapError::from)?;
    if fragments.is_empty() {
        return Err(ElementMapError::EmptyMolecule);
    }
    Ok(fragments
        .into_iter()
        .enumerate()
        .map(|(seq, frag)| StructuralElement {
            id: format!("MOL-{}-F{}", molecule.id, seq + 1),
            element_type: classify_role(&frag.role),
            description: frag.description,
            smiles_fragment: Some(frag.smiles),
            role: Some(frag.role),
            position: frag.position,
            weight: frag.weight,
            feature_vector: None,
        })
        .collect())
}

fn classify_role(role: &str) -> ElementType {
    match role.to_lowercase().as_str() {
        "scaffold" | "core" | "core_scaffold" => ElementType::CoreScaffold,
        "substituent" => ElementType::Substituent,
        "functional_group" | "functionalgroup" => ElementType::FunctionalGroup,
        "linker" => ElementType::Linker,
        "backbone" => ElementType::Backbone,
        "electronic_property" | "electronicproperty" => ElementType::ElectronicProperty,
        _ => ElementType::Unknown,
    }
}

/// Similarity between one molecule element and one claim element (spec §4.F):
/// a SMARTS constraint that matches scores near 1; a SMARTS constraint that's
/// declared but doesn't match still falls back to fragment similarity (it
/// must not collapse to 0 — a non-matching constraint is informative, not
/// disqualifying, until the aligner's own threshold drops the pair); absent
/// any constraint, fragment similarity alone governs. A small same-type bonus
/// nudges otherwise-tied pairs toward matching element kinds.
async fn compute_element_similarity(
    mol_element: &StructuralElement,
    claim_element: &ClaimElement,
    analyzer: &dyn StructureAnalyzer,
) -> Result<f64, ElementMapError> {
    let type_bonus = if mol_element.element_type == claim_element.element_type {
        0.15
    } else {
        0.0
    };

    let mol_smiles = mol_element.smiles_fragment.as_deref().unwrap_or("");

    if let Some(smarts) = &claim_element.structural_constraint {
        if analyzer.match_smarts(mol_smiles, smarts).await {
            return Ok((0.9 + type_bonus).min(1.0));
        }
        let frag_sim = analyzer
            .compute_fragment_similarity(mol_smiles, &claim_element.description)
            .await
            .map_err(ElementMapError::from)?;
        return Ok((frag_sim + type_bonus).min(1.0).max(0.0));
    }

    let frag_sim = analyzer
        .compute_fragment_similarity(mol_smiles, &claim_element.description)
        .await
        .map_err(ElementMapError::from)?;
    Ok((frag_sim * 0.85 + type_bonus).min(1.0).max(0.0))
}

/// Bipartite-align a molecule's elements against a claim's elements via the
/// Hungarian matcher, then drop pairs below the `None` threshold (spec
/// §4.C/§4.F).
pub async fn align_elements(
    molecule_elements: &[StructuralElement],
    claim_elements: &[ClaimElement],
    analyzer: &dyn StructureAnalyzer,
) -> Result<ElementAlignment, ElementMapError> {
    if molecule_elements.is_empty() || claim_elements.is_empty() {
        return Ok(ElementAlignment {
            pairs: Vec::new(),
            unmatched_molecule_elements: molecule_elements.to_vec(),
            unmatched_claim_elements: claim_elements.to_vec(),
            alignment_score: 0.0,
            coverage_ratio: 0.0,
        });
    }

    let mut sim = vec![vec![0.0; claim_elements.len()]; molecule_elements.len()];
    for (i, me) in molecule_elements.iter().enumerate() {
        for (j, ce) in claim_elements.iter().enumerate() {
            sim[i][j] = compute_element_similarity(me, ce, analyzer).await?;
        }
    }

    let (assignment, _) = matcher::max_weight_assignment(&sim);

    let mut pairs = Vec::new();
    let mut matched_mol = HashSet::new();
    let mut matched_claim = HashSet::new();
    for (i, &j) in assignment.iter().enumerate() {
        if j == UNASSIGNED {
            continue;
        }
        let score = sim[i][j];
        let match_type = MatchType::classify(score);
        if match_type == MatchType::None {
            continue;
        }
        matched_mol.insert(i);
        matched_claim.insert(j);
        pairs.push(AlignedPair {
            molecule_element: molecule_elements[i].clone(),
            claim_element: claim_elements[j].clone(),
            similarity_score: score,
            match_type,
        });
    }

    let unmatched_molecule_elements: Vec<StructuralElement> = molecule_elements
        .iter()
        .enumerate()
        .filter(|(i, _)| !matched_mol.contains(i))
        .map(|(_, e)| e.clone())
        .collect();
    let unmatched_claim_elements: Vec<ClaimElement> = claim_elements
        .iter()
        .enumerate()
        .filter(|(j, _)| !matched_claim.contains(j))
        .map(|(_, e)| e.clone())
        .collect();

    let coverage_ratio = matched_claim.len() as f64 / claim_elements.len() as f64;
    let alignment_score = if pairs.is_empty() {
        0.0
    } else {
        pairs.iter().map(|p| p.similarity_score).sum::<f64>() / pairs.len() as f64
    };

    Ok(ElementAlignment {
        pairs,
        unmatched_molecule_elements,
        unmatched_claim_elements,
        alignment_score,
        coverage_ratio,
    })
}

/// Prosecution-history estoppel check (spec §4.F): a narrowing amendment
/// whose surrendered scope keyword-overlaps (>= 0.5 Jaccard-style ratio) an
/// aligned pair's claim-element description blocks that pair's equivalence,
/// weighted 1.5x when the claim element is essential.
pub fn check_estoppel(alignment: &ElementAlignment, history: &ProsecutionHistory) -> EstoppelResult {
    let mut blocked_equivalences = Vec::new();
    let mut estoppel_details = Vec::new();
    let mut blocked_count = 0u32;
    let mut essential_blocked_count = 0u32;
    let mut equivalent_count = 0u32;

    let equivalence_pairs = alignment
        .pairs
        .iter()
        .filter(|pair| matches!(pair.match_type, MatchType::Similar | MatchType::Partial));

    for pair in equivalence_pairs {
        equivalent_count += 1;

        if let Some((amendment_ref, surrender_description)) = blocking_amendment(pair, history) {
            blocked_count += 1;
            if pair.claim_element.is_essential {
                essential_blocked_count += 1;
            }
            blocked_equivalences.push(pair.claim_element.id.clone());
            estoppel_details.push(EstoppelDetail {
                affected_element_id: pair.claim_element.id.clone(),
                amendment_ref,
                surrender_description,
                blocked_equivalent_type: pair.claim_element.element_type,
            });
            continue;
        }

        if let Some((argument_ref, surrender_description)) = blocking_argument(pair, history) {
            blocked_count += 1;
            if pair.claim_element.is_essential {
                essential_blocked_count += 1;
            }
            blocked_equivalences.push(pair.claim_element.id.clone());
            estoppel_details.push(EstoppelDetail {
                affected_element_id: pair.claim_element.id.clone(),
                amendment_ref: argument_ref,
                surrender_description,
                blocked_equivalent_type: pair.claim_element.element_type,
            });
        }
    }

    if blocked_equivalences.is_empty() {
        return EstoppelResult::default();
    }

    let essential_blocked_ratio = essential_blocked_count as f64 / blocked_count as f64;
    let raw_ratio = blocked_count as f64 / equivalent_count as f64;
    let penalty = crate::score::clamp01(raw_ratio * (1.0 + 0.5 * essential_blocked_ratio));

    EstoppelResult {
        has_estoppel: true,
        estoppel_penalty: penalty,
        blocked_equivalences,
        estoppel_details,
    }
}

/// Narrowing-amendment affected-element membership, keyword-overlap gated.
fn blocking_amendment(pair: &AlignedPair, history: &ProsecutionHistory) -> Option<(String, String)> {
    history
        .amendments
        .iter()
        .filter(|amendment| amendment.amendment_type == AmendmentType::Narrowing)
        .find(|amendment| {
            amendment
                .affected_elements
                .iter()
                .any(|id| id == &pair.claim_element.id)
                && text::keyword_overlap_ratio(&amendment.original_text, &pair.claim_element.description) >= 0.5
        })
        .map(|amendment| (amendment.date.clone(), amendment.original_text.clone()))
}

/// Applicant surrender-scope keyword overlap against the claim/molecule description.
fn blocking_argument(pair: &AlignedPair, history: &ProsecutionHistory) -> Option<(String, String)> {
    history
        .arguments
        .iter()
        .find(|argument| {
            text::keyword_overlap_ratio(&argument.surrender_scope, &pair.claim_element.description) >= 0.5
                || text::keyword_overlap_ratio(&argument.surrender_scope, &pair.molecule_element.description) >= 0.5
        })
        .map(|argument| (argument.date.clone(), argument.surrender_scope.clone()))
}

/// Parse a prosecution history document, auto-detecting JSON vs. XML by the
/// first non-whitespace byte (spec §4.F). No XML parsing crate appears
/// anywhere in this codebase's lineage, so the XML branch is a typed
/// rejection rather than a hand-rolled parser standing in for one.
pub fn parse_prosecution_history(bytes: &[u8]) -> Result<ProsecutionHistory, ElementMapError> {
    let first_non_ws = bytes.iter().find(|b| !b.is_ascii_whitespace());
    match first_non_ws {
        None => Err(ElementMapError::HistoryParseFailed("empty input".to_string())),
        Some(b'<') => Err(ElementMapError::HistoryParseFailed(
            "XML prosecution history documents are not supported".to_string(),
        )),
        Some(_) => {
            let history: ProsecutionHistory =
                serde_json::from_slice(bytes).map_err(|e| ElementMapError::HistoryParseFailed(e.to_string()))?;
            if history.patent_id.trim().is_empty() {
                return Err(ElementMapError::MissingPatentId);
            }
            Ok(history)
        }
    }
}
