//! Threshold selection ("cut").

use crate::schema::{Candidate, CandidateStatus};

use super::lineage::LineageTracker;

/// Result of a cut: two disjoint lists, original order preserved.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub survivors: Vec<Candidate>,
    pub eliminated: Vec<Candidate>,
}

/// Whether a cut at `threshold` removes this candidate.
///
/// A score equal to the threshold survives. Lysed candidates are never
/// counted as eliminated by the cut.
pub fn is_eliminated(candidate: &Candidate, threshold: f64) -> bool {
    candidate.score < threshold && candidate.status != CandidateStatus::Lysed
}

/// Partition the population by score and record the outcome in the lineage.
///
/// Eliminated nodes are marked failed; survivor nodes are refreshed with
/// their current score.
pub fn cut(population: Vec<Candidate>, threshold: f64, lineage: &mut LineageTracker) -> Selection {
    let (eliminated, survivors): (Vec<_>, Vec<_>) = population
        .into_iter()
        .partition(|c| is_eliminated(c, threshold));

    for candidate in &eliminated {
        lineage.mark_eliminated(candidate);
    }
    for candidate in &survivors {
        lineage.register_or_update(candidate);
    }

    log::info!(
        "Cut at {threshold}: {} eliminated, {} survivors",
        eliminated.len(),
        survivors.len()
    );

    Selection {
        survivors,
        eliminated,
    }
}
