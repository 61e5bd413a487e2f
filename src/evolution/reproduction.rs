//! Next-generation production from survivors.

use crate::schema::{Candidate, EngineConfig, Strategy};

use super::error::EngineError;
use super::ids::IdGenerator;
use super::lineage::LineageTracker;
use super::operators::OperatorRng;
use super::strategy::choose_strategy;

/// Builds the next generation. Borrows the engine-owned state it writes to.
pub struct Reproducer<'a> {
    config: &'a EngineConfig,
    ids: &'a mut IdGenerator,
    lineage: &'a mut LineageTracker,
    rng: &'a mut OperatorRng,
}

impl<'a> Reproducer<'a> {
    pub fn new(
        config: &'a EngineConfig,
        ids: &'a mut IdGenerator,
        lineage: &'a mut LineageTracker,
        rng: &'a mut OperatorRng,
    ) -> Self {
        Self {
            config,
            ids,
            lineage,
            rng,
        }
    }

    /// Number of survivors carried over verbatim.
    pub fn elite_count(&self, survivors: usize) -> usize {
        let fraction = (survivors as f64 * self.config.reproduction.elite_fraction).floor() as usize;
        fraction
            .max(1)
            .min(survivors)
            .min(self.config.target_population_size)
    }

    /// Produce up to `target_population_size` candidates born in `generation`.
    ///
    /// Elites are copied without a new identity or lineage edge. Every other
    /// slot gets a fresh id, a lineage node and one edge per parent. An empty
    /// survivor list yields an empty generation.
    pub fn reproduce(
        &mut self,
        survivors: &[Candidate],
        generation: usize,
    ) -> Result<Vec<Candidate>, EngineError> {
        if survivors.is_empty() {
            log::warn!("No survivors to reproduce from; the population is extinct");
            return Ok(Vec::new());
        }

        let target = self.config.target_population_size;
        let mut next_gen = Vec::with_capacity(target);

        // Stable sort keeps the original order among equal scores; NaN ranks last
        let mut ranked: Vec<&Candidate> = survivors.iter().collect();
        ranked.sort_by(|a, b| {
            a.score
                .is_nan()
                .cmp(&b.score.is_nan())
                .then_with(|| b.score.total_cmp(&a.score))
        });

        let elites = self.elite_count(ranked.len());
        next_gen.extend(ranked[..elites].iter().map(|c| (*c).clone()));

        self.fill(&mut next_gen, |r| r.offspring(survivors, generation))?;

        log::info!(
            "Generation {generation}: {} candidates ({elites} elites)",
            next_gen.len()
        );
        Ok(next_gen)
    }

    /// Call `produce` until `next_gen` reaches the target size.
    ///
    /// Gives up after twice the target in attempts. The built-in operators
    /// always yield a child for a parent list of the right arity, so only a
    /// misbehaving operator can trip this.
    fn fill<F>(
        &mut self,
        next_gen: &mut Vec<Candidate>,
        mut produce: F,
    ) -> Result<(), EngineError>
    where
        F: FnMut(&mut Self) -> Result<Option<Candidate>, EngineError>,
    {
        let target = self.config.target_population_size;
        let mut attempts = 0;
        while next_gen.len() < target {
            attempts += 1;
            if attempts > 2 * target {
                log::error!(
                    "Reproduction gave up after {} attempts with {}/{} candidates",
                    attempts - 1,
                    next_gen.len(),
                    target
                );
                break;
            }

            if let Some(child) = produce(self)? {
                next_gen.push(child);
            }
        }
        Ok(())
    }

    /// Draw parents and a strategy, then build and register one child.
    fn offspring(
        &mut self,
        survivors: &[Candidate],
        generation: usize,
    ) -> Result<Option<Candidate>, EngineError> {
        let first_idx = self.rng.index(survivors.len());
        let first = &survivors[first_idx];

        let strategy = choose_strategy(self.rng.roll(), first.score, survivors.len(), self.config);
        let parents: Vec<&Candidate> = match strategy.arity() {
            0 => Vec::new(),
            1 => vec![first],
            _ => {
                let second_idx = self.rng.index_except(survivors.len(), first_idx);
                vec![first, &survivors[second_idx]]
            }
        };

        let Some(payload) = self.rng.apply(strategy, &parents, self.config) else {
            log::warn!("Operator {strategy} produced no child");
            return Ok(None);
        };

        let child = Candidate::new(self.ids.next_id()?, payload, generation);
        self.register(&child, strategy)?;

        log::debug!("{strategy}: {:?} -> {}", child.parent_ids(), child.id);
        Ok(Some(child))
    }

    /// Add the child's node and one edge per parent.
    fn register(&mut self, child: &Candidate, strategy: Strategy) -> Result<(), EngineError> {
        if self.lineage.contains(child.id) {
            return Err(EngineError::DuplicateId(child.id));
        }
        child
            .payload
            .validate()
            .map_err(|source| EngineError::Payload {
                id: child.id,
                source,
            })?;

        self.lineage.register_or_update(child);
        for &parent in child.parent_ids() {
            self.lineage.add_edge(parent, child.id, strategy);
        }
        Ok(())
    }
}
