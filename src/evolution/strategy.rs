//! Weighted choice of a reproduction strategy.

use crate::schema::{EngineConfig, Strategy};

/// Pick the operator for one offspring.
///
/// `roll` is a uniform draw in [0, 1). Cutoffs are cumulative, and an
/// operator whose precondition fails hands the roll to the next band:
/// a clone roll on a sub-optimal parent becomes a mutation, and a crossover
/// roll with a single survivor becomes random generation.
pub fn choose_strategy(
    roll: f64,
    parent_score: f64,
    survivor_count: usize,
    config: &EngineConfig,
) -> Strategy {
    let rates = &config.reproduction;

    if roll < rates.clone_cutoff && parent_score >= config.optimum {
        Strategy::Clone
    } else if roll < rates.mutate_cutoff {
        if parent_score >= config.light_mutation_floor() {
            Strategy::MutateLight
        } else {
            Strategy::MutateDrastic
        }
    } else if roll < rates.crossover_cutoff && survivor_count > 1 {
        Strategy::Crossover
    } else {
        Strategy::RandomGenerate
    }
}
