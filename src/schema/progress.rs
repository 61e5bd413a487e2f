//! Engine state and per-generation progress reporting.

use serde::{Deserialize, Serialize};

use super::CandidateId;

/// Orchestrator state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EngineState {
    /// Nothing seeded yet.
    #[default]
    Idle,
    /// Population present, run ongoing.
    Evolving,
    /// Some candidate reached the optimum.
    Converged,
    /// Population is empty and cannot be reseeded.
    Extinct,
    /// Generation cap reached.
    MaxGenerationsReached,
}

impl EngineState {
    pub fn is_terminal(self) -> bool {
        self.stop_reason().is_some()
    }

    pub fn stop_reason(self) -> Option<StopReason> {
        match self {
            EngineState::Converged => Some(StopReason::Converged),
            EngineState::Extinct => Some(StopReason::Extinct),
            EngineState::MaxGenerationsReached => Some(StopReason::MaxGenerations),
            EngineState::Idle | EngineState::Evolving => None,
        }
    }
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// Best score reached the optimum.
    Converged,
    /// No candidates left.
    Extinct,
    /// Reached maximum generations.
    MaxGenerations,
}

impl From<StopReason> for EngineState {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Converged => EngineState::Converged,
            StopReason::Extinct => EngineState::Extinct,
            StopReason::MaxGenerations => EngineState::MaxGenerationsReached,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Converged => f.write_str("converged"),
            StopReason::Extinct => f.write_str("extinct"),
            StopReason::MaxGenerations => f.write_str("max generations reached"),
        }
    }
}

/// Outcome of one call to the generation-advance operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The initial population was produced; it must be evaluated before the next cycle.
    Seeded { population: usize },
    /// One selection and reproduction cycle ran.
    Advanced(GenerationStats),
    /// The run is over; nothing changed.
    Stopped(StopReason),
}

impl Advance {
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Advance::Stopped(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Statistics of one completed cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationStats {
    /// Generation number after the cycle.
    pub generation: usize,
    /// Population size before the cut.
    pub evaluated: usize,
    pub survivors: usize,
    /// Ids removed by the cut.
    pub eliminated: Vec<CandidateId>,
    /// Size of the new population.
    pub population: usize,
    /// Best score before the cut.
    pub best_score: f64,
    /// Mean score before the cut.
    pub mean_score: f64,
}
