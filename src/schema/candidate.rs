//! Candidate data model: the evolvable payload and its evaluation state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Unique identifier of a candidate within one engine instance.
pub type CandidateId = u64;

/// Lifecycle status of a candidate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    /// Created, not yet executed.
    #[default]
    Pending,
    /// Being executed by the external evaluator.
    Running,
    /// Executed successfully.
    Completed,
    /// Executed unsuccessfully, or eliminated by a cut.
    Failed,
    /// Self-terminated. Sink state.
    Lysed,
}

impl CandidateStatus {
    /// Whether a status write from `self` to `next` is a legal move.
    ///
    /// Rewriting the same status is always allowed, `Lysed` is reachable from
    /// every state and the rest only move forward along
    /// `Pending -> Running -> {Completed, Failed}`.
    pub fn can_transition_to(self, next: CandidateStatus) -> bool {
        use CandidateStatus::*;

        if self == next || next == Lysed {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Completed)
                | (Pending, Failed)
                | (Running, Completed)
                | (Running, Failed)
        )
    }

    /// Whether the candidate is still waiting for an evaluation.
    pub fn awaits_evaluation(self) -> bool {
        matches!(self, CandidateStatus::Pending | CandidateStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CandidateStatus::Pending => "pending",
            CandidateStatus::Running => "running",
            CandidateStatus::Completed => "completed",
            CandidateStatus::Failed => "failed",
            CandidateStatus::Lysed => "lysed",
        }
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a candidate self-terminated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LysisReason {
    Timeout,
    ExcessiveResourceUsage,
    HallucinationDetected,
    ParentParametersViolated,
    ExternalRequest,
    FatalInternalError,
}

impl std::fmt::Display for LysisReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LysisReason::Timeout => "timeout",
            LysisReason::ExcessiveResourceUsage => "excessive resource usage",
            LysisReason::HallucinationDetected => "hallucination detected",
            LysisReason::ParentParametersViolated => "parent parameters violated",
            LysisReason::ExternalRequest => "external request",
            LysisReason::FatalInternalError => "fatal internal error",
        };
        f.write_str(name)
    }
}

/// References into the external resource catalogue.
///
/// Entries are opaque strings; the engine never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ResourceRefs {
    #[serde(default)]
    pub tools: BTreeSet<String>,
    #[serde(default)]
    pub algorithms: BTreeSet<String>,
    #[serde(default)]
    pub resources: BTreeSet<String>,
    /// Prompt templates.
    #[serde(default)]
    pub prompts: BTreeSet<String>,
}

impl ResourceRefs {
    /// Category-wise set union.
    pub fn union(&self, other: &ResourceRefs) -> ResourceRefs {
        ResourceRefs {
            tools: self.tools.union(&other.tools).cloned().collect(),
            algorithms: self.algorithms.union(&other.algorithms).cloned().collect(),
            resources: self.resources.union(&other.resources).cloned().collect(),
            prompts: self.prompts.union(&other.prompts).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
            && self.algorithms.is_empty()
            && self.resources.is_empty()
            && self.prompts.is_empty()
    }

    /// Total number of references across all categories.
    pub fn len(&self) -> usize {
        self.tools.len() + self.algorithms.len() + self.resources.len() + self.prompts.len()
    }
}

/// Token usage counters. Informational only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

impl TokenUsage {
    /// Pairwise average, rounded down.
    pub fn average(&self, other: &TokenUsage) -> TokenUsage {
        TokenUsage {
            input: self.input / 2 + other.input / 2 + (self.input % 2 + other.input % 2) / 2,
            output: self.output / 2 + other.output / 2 + (self.output % 2 + other.output % 2) / 2,
        }
    }

    pub fn total(&self) -> u64 {
        self.input.saturating_add(self.output)
    }
}

/// The evolvable content of a candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    /// Persona and constraints for the model.
    pub system_prompt: String,
    /// The task instruction.
    pub prompt: String,
    #[serde(default)]
    pub resources: ResourceRefs,
    #[serde(default)]
    pub tokens: TokenUsage,
    /// Zero, one or two parents.
    #[serde(default)]
    pub parent_ids: Vec<CandidateId>,
}

impl Payload {
    /// Root payload with no resources and no parents.
    pub fn new(system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_resources(mut self, resources: ResourceRefs) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_parents(mut self, parent_ids: Vec<CandidateId>) -> Self {
        self.parent_ids = parent_ids;
        self
    }

    /// Check structural constraints on the payload.
    pub fn validate(&self) -> Result<(), PayloadError> {
        match self.parent_ids.as_slice() {
            [] | [_] => Ok(()),
            [a, b] if a == b => Err(PayloadError::RepeatedParent(*a)),
            [_, _] => Ok(()),
            more => Err(PayloadError::TooManyParents(more.len())),
        }
    }
}

/// Payload validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("A payload has at most 2 parents, got {0}")]
    TooManyParents(usize),
    #[error("Parent {0} listed twice")]
    RepeatedParent(CandidateId),
}

/// One member of the population.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Unique identifier, assigned once.
    pub id: CandidateId,
    /// Fitness, conventionally in [0, 100]. Written by the external evaluator.
    pub score: f64,
    pub status: CandidateStatus,
    pub payload: Payload,
    /// Generation this candidate was born in.
    #[serde(default)]
    pub generation: usize,
    /// Opaque execution output from the evaluator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Failure or lysis explanation from the evaluator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl Candidate {
    /// Fresh candidate: pending, score 0, no evaluation output.
    pub fn new(id: CandidateId, payload: Payload, generation: usize) -> Self {
        Self {
            id,
            score: 0.0,
            status: CandidateStatus::Pending,
            payload,
            generation,
            result: None,
            failure_reason: None,
        }
    }

    pub fn parent_ids(&self) -> &[CandidateId] {
        &self.payload.parent_ids
    }
}

/// What the external evaluator reports for one candidate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluationOutcome {
    pub score: f64,
    pub status: CandidateStatus,
    pub result: Option<serde_json::Value>,
    pub failure_reason: Option<String>,
}

impl EvaluationOutcome {
    pub fn completed(score: f64) -> Self {
        Self {
            score,
            status: CandidateStatus::Completed,
            ..Default::default()
        }
    }

    pub fn failed(score: f64, reason: impl Into<String>) -> Self {
        Self {
            score,
            status: CandidateStatus::Failed,
            failure_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Self-termination. The score is kept as reported.
    pub fn lysed(score: f64, reason: LysisReason) -> Self {
        Self {
            score,
            status: CandidateStatus::Lysed,
            failure_reason: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.result = Some(result);
        self
    }
}

/// A `{systemPrompt, prompt}` pair produced by the oracle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeedVariant {
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub prompt: String,
}

impl SeedVariant {
    pub fn new(system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
        }
    }

    /// Both fields blank.
    pub fn is_blank(&self) -> bool {
        self.system_prompt.trim().is_empty() && self.prompt.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(tools: &[&str], prompts: &[&str]) -> ResourceRefs {
        ResourceRefs {
            tools: tools.iter().map(|s| s.to_string()).collect(),
            prompts: prompts.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_transitions() {
        use CandidateStatus::*;

        assert!(Pending.can_transition_to(Running));
        assert!(Pending.can_transition_to(Completed));
        assert!(Running.can_transition_to(Failed));
        assert!(Completed.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Lysed));
        assert!(Failed.can_transition_to(Lysed));

        assert!(!Completed.can_transition_to(Pending));
        assert!(!Failed.can_transition_to(Running));
        assert!(!Lysed.can_transition_to(Pending));
        assert!(!Lysed.can_transition_to(Completed));
    }

    #[test]
    fn test_resource_union_dedups() {
        let a = refs(&["toolA", "toolB"], &["p1"]);
        let b = refs(&["toolB", "toolC"], &[]);

        let merged = a.union(&b);
        assert_eq!(merged.tools.len(), 3);
        assert_eq!(merged.prompts.len(), 1);
        assert!(merged.algorithms.is_empty());
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_token_average() {
        let a = TokenUsage { input: 10, output: 3 };
        let b = TokenUsage { input: 21, output: 4 };
        assert_eq!(a.average(&b), TokenUsage { input: 15, output: 3 });

        let big = TokenUsage {
            input: u64::MAX,
            output: u64::MAX,
        };
        assert_eq!(big.average(&big), big);
    }

    #[test]
    fn test_payload_validation() {
        assert!(Payload::new("s", "p").validate().is_ok());
        assert!(Payload::new("s", "p").with_parents(vec![1, 2]).validate().is_ok());
        assert_eq!(
            Payload::new("s", "p").with_parents(vec![3, 3]).validate(),
            Err(PayloadError::RepeatedParent(3))
        );
        assert_eq!(
            Payload::new("s", "p").with_parents(vec![1, 2, 3]).validate(),
            Err(PayloadError::TooManyParents(3))
        );
    }

    #[test]
    fn test_new_candidate_is_pending() {
        let c = Candidate::new(7, Payload::new("s", "p"), 2);
        assert_eq!(c.status, CandidateStatus::Pending);
        assert_eq!(c.score, 0.0);
        assert_eq!(c.generation, 2);
        assert!(c.result.is_none());
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = Payload::new("sys", "do it").with_parents(vec![4]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["systemPrompt"], "sys");
        assert_eq!(json["parentIds"][0], 4);
    }

    #[test]
    fn test_lysed_outcome_records_reason() {
        let outcome = EvaluationOutcome::lysed(12.0, LysisReason::Timeout);
        assert_eq!(outcome.status, CandidateStatus::Lysed);
        assert_eq!(outcome.failure_reason.as_deref(), Some("timeout"));
    }
}
