//! Crate root: public surface and root-level re-exports.
//!
//! This crate assesses whether a query molecule literally infringes, or is
//! equivalent under the doctrine of equivalents to, a set of patent claims,
//! subject to prosecution-history estoppel. The pipeline is:
//!
//! 1. [`elements`] decomposes claim text and a query molecule's SMILES into
//!    classified [`types::ClaimElement`]/[`types::StructuralElement`] sets and
//!    aligns them.
//! 2. [`inference`] predicts literal infringement per claim element.
//! 3. [`equivalents`] runs the Function-Way-Result test over the alignment,
//!    gated by prosecution-history estoppel.
//! 4. [`elements::check_estoppel`] computes the estoppel penalty applied to
//!    the literal/equivalents fusion.
//! 5. [`assessor`] orchestrates all of the above per claim, fuses scores, and
//!    exposes single-request, batch, and portfolio entry points.
//!
//! [`doubles`] supplies deterministic stand-ins for every external
//! collaborator in [`contracts`], so the CLI and HTTP binaries in `src/bin`
//! run end to end without a real NLP service, cheminformatics toolkit, or
//! model-serving endpoint wired in.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

/// Crate-wide error taxonomy.
pub mod error;
/// Request-scoped data model shared across every module.
pub mod types;
/// Functional-option configuration structs.
pub mod config;
/// External collaborator traits (NLP, cheminformatics, models, logging).
pub mod contracts;
/// Deterministic stand-ins for every `contracts` trait.
pub mod doubles;

/// Scoring primitives: cosine similarity, clamping, deterministic embeddings.
pub mod score;
/// A generic LRU cache used by the remote inference model.
pub mod cache;
/// Maximum-weight bipartite assignment (Hungarian algorithm).
pub mod matcher;
/// Tokenization and keyword-overlap helpers shared by the aligner and estoppel check.
pub mod text;

/// Literal-infringement prediction, structural similarity, and property impact.
pub mod inference;
/// Claim/molecule decomposition, element alignment, and estoppel.
pub mod elements;
/// Doctrine-of-equivalents (Function-Way-Result) analysis.
pub mod equivalents;
/// The assessment orchestrator: single-request, batch, and portfolio pipelines.
pub mod assessor;

pub use assessor::{
    AssessmentRequest, AssessmentRequestOptions, Assessor, BatchItemOutcome, PortfolioResult,
};
pub use error::{AssessError, AssessResult};
pub use types::{AssessmentResult, ClaimInput, MoleculeInput, RiskLevel};
