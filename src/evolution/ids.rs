//! Identifier issuance.

use crate::schema::CandidateId;

use super::error::EngineError;

/// Issues candidate identifiers that are never reused within one engine.
///
/// `CandidateId::MAX` is never issued; it only serves as the exhaustion mark.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: CandidateId,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Generator whose first id is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue a fresh identifier.
    pub fn next_id(&mut self) -> Result<CandidateId, EngineError> {
        let id = self.next;
        self.next = id.checked_add(1).ok_or(EngineError::IdSpaceExhausted)?;
        Ok(id)
    }

    /// Make sure an externally assigned id is never issued later.
    pub fn reserve(&mut self, id: CandidateId) -> Result<(), EngineError> {
        if id >= self.next {
            self.next = id.checked_add(1).ok_or(EngineError::IdSpaceExhausted)?;
        }
        Ok(())
    }

    /// The id the next call to [`next_id`](Self::next_id) returns.
    pub fn peek(&self) -> CandidateId {
        self.next
    }
}
