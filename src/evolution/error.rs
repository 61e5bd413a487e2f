//! Engine error type.

use crate::schema::{CandidateId, CandidateStatus, ConfigError, PayloadError};

use super::oracle::OracleError;

/// Errors surfaced by the evolution engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Seed oracle failed: {0}")]
    Oracle(#[from] OracleError),
    /// A freshly minted identifier already exists. Always a defect.
    #[error("Identifier {0} was issued twice")]
    DuplicateId(CandidateId),
    #[error("Candidate identifiers exhausted")]
    IdSpaceExhausted,
    #[error("Candidate {id} has non-finite score {score}")]
    NonFiniteScore { id: CandidateId, score: f64 },
    #[error("No live candidate with id {0}")]
    UnknownCandidate(CandidateId),
    #[error("Candidate {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: CandidateId,
        from: CandidateStatus,
        to: CandidateStatus,
    },
    #[error("Malformed payload for candidate {id}: {source}")]
    Payload {
        id: CandidateId,
        #[source]
        source: PayloadError,
    },
    #[error("Lineage export failed: {0}")]
    Io(#[from] std::io::Error),
}
