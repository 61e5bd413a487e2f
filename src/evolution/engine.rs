//! Generation-advance state machine.

use std::path::Path;

use rayon::prelude::*;

use crate::schema::{
    Advance, Candidate, CandidateId, EngineConfig, EngineState, EvaluationOutcome,
    GenerationStats, LineageSnapshot, StopReason,
};

use super::error::EngineError;
use super::ids::IdGenerator;
use super::lineage::LineageTracker;
use super::operators::OperatorRng;
use super::oracle::Oracle;
use super::reproduction::Reproducer;
use super::seeder::Seeder;
use super::selection::cut;

/// Scores one candidate. Called from worker threads.
pub trait Evaluator: Sync {
    fn evaluate(&self, candidate: &Candidate) -> EvaluationOutcome;
}

impl<F> Evaluator for F
where
    F: Fn(&Candidate) -> EvaluationOutcome + Sync,
{
    fn evaluate(&self, candidate: &Candidate) -> EvaluationOutcome {
        self(candidate)
    }
}

/// Evolution engine owning the population, the lineage graph and the
/// identifier generator of one run.
///
/// Not reentrant. After a fatal error (oracle failure, duplicate id) the
/// engine should be discarded.
pub struct EvolutionEngine {
    config: EngineConfig,
    ids: IdGenerator,
    lineage: LineageTracker,
    rng: OperatorRng,
    population: Vec<Candidate>,
    generation: usize,
    state: EngineState,
    seeded: bool,
    history: Vec<GenerationStats>,
    oracle: Box<dyn Oracle>,
    task: String,
}

impl EvolutionEngine {
    /// Create an engine that seeds from `oracle` for `task`.
    ///
    /// Fails without building anything when the configuration is invalid.
    pub fn new(
        config: EngineConfig,
        oracle: impl Oracle + 'static,
        task: impl Into<String>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);

        Ok(Self {
            config,
            ids: IdGenerator::new(),
            lineage: LineageTracker::new(),
            rng: OperatorRng::new(seed),
            population: Vec::new(),
            generation: 0,
            state: EngineState::Idle,
            seeded: false,
            history: Vec::new(),
            oracle: Box::new(oracle),
            task: task.into(),
        })
    }

    /// Start from a caller-built population instead of asking the oracle.
    ///
    /// Colliding ids are reassigned with a warning.
    pub fn with_initial_population(
        mut self,
        population: Vec<Candidate>,
    ) -> Result<Self, EngineError> {
        let adopted = Seeder::new(&mut self.ids, &mut self.lineage).adopt(population)?;
        self.population.extend(adopted);
        self.seeded = true;
        self.state = if self.population.is_empty() {
            EngineState::Extinct
        } else {
            EngineState::Evolving
        };
        Ok(self)
    }

    /// Run the seeder once. Later calls return the current population size.
    pub fn seed(&mut self) -> Result<usize, EngineError> {
        if self.seeded {
            log::warn!("Engine already seeded; ignoring");
            return Ok(self.population.len());
        }

        let population = Seeder::new(&mut self.ids, &mut self.lineage)
            .from_oracle(self.oracle.as_ref(), &self.task)?;
        self.seeded = true;
        self.population = population;

        if self.population.is_empty() {
            self.stop(StopReason::Extinct);
        } else {
            self.state = EngineState::Evolving;
        }
        Ok(self.population.len())
    }

    /// Advance one generation, assuming every candidate has been evaluated.
    ///
    /// Seeds on the first call with an empty population and returns
    /// [`Advance::Seeded`] without cutting. Terminal states are sticky.
    pub fn advance_generation(&mut self) -> Result<Advance, EngineError> {
        if let Some(reason) = self.check_stop() {
            return Ok(self.stop(reason));
        }

        if self.population.is_empty() {
            if self.seeded {
                return Ok(self.stop(StopReason::Extinct));
            }
            let population = self.seed()?;
            if population == 0 {
                return Ok(self.stop(StopReason::Extinct));
            }
            return Ok(Advance::Seeded { population });
        }

        let stats = self.step_generation()?;
        Ok(Advance::Advanced(stats))
    }

    /// Seed if needed, evaluate every pending or running candidate, then advance.
    pub fn advance_with<E>(&mut self, evaluator: &E) -> Result<Advance, EngineError>
    where
        E: Evaluator + ?Sized,
    {
        if let Some(reason) = self.check_stop() {
            return Ok(self.stop(reason));
        }
        if !self.seeded {
            self.seed()?;
        }
        self.evaluate(evaluator)?;
        self.advance_generation()
    }

    /// Evaluate candidates awaiting a score in parallel, then record the
    /// outcomes in population order. Returns the number evaluated.
    pub fn evaluate<E>(&mut self, evaluator: &E) -> Result<usize, EngineError>
    where
        E: Evaluator + ?Sized,
    {
        let outcomes: Vec<(CandidateId, EvaluationOutcome)> = self
            .population
            .par_iter()
            .filter(|c| c.status.awaits_evaluation())
            .map(|c| (c.id, evaluator.evaluate(c)))
            .collect();

        let count = outcomes.len();
        for (id, outcome) in outcomes {
            self.record_evaluation(id, outcome)?;
        }
        Ok(count)
    }

    /// Store an evaluator's verdict on a live candidate and refresh its lineage node.
    pub fn record_evaluation(
        &mut self,
        id: CandidateId,
        outcome: EvaluationOutcome,
    ) -> Result<(), EngineError> {
        let Some(candidate) = self.population.iter_mut().find(|c| c.id == id) else {
            log::warn!("Evaluation for unknown candidate {id}");
            return Err(EngineError::UnknownCandidate(id));
        };

        if !outcome.score.is_finite() {
            log::warn!("Evaluation for candidate {id} has non-finite score {}", outcome.score);
            return Err(EngineError::NonFiniteScore {
                id,
                score: outcome.score,
            });
        }
        if !candidate.status.can_transition_to(outcome.status) {
            return Err(EngineError::InvalidTransition {
                id,
                from: candidate.status,
                to: outcome.status,
            });
        }

        candidate.score = outcome.score;
        candidate.status = outcome.status;
        candidate.result = outcome.result;
        candidate.failure_reason = outcome.failure_reason;
        self.lineage.register_or_update(candidate);
        Ok(())
    }

    /// Cut, reproduce and swap in the next generation.
    fn step_generation(&mut self) -> Result<GenerationStats, EngineError> {
        let evaluated = self.population.len();
        let best_score = self
            .population
            .iter()
            .map(|c| c.score)
            .fold(f64::NEG_INFINITY, f64::max);
        let mean_score =
            self.population.iter().map(|c| c.score).sum::<f64>() / evaluated.max(1) as f64;

        let population = std::mem::take(&mut self.population);
        let selection = cut(population, self.config.threshold, &mut self.lineage);

        let next_generation = self.generation + 1;
        let next = Reproducer::new(
            &self.config,
            &mut self.ids,
            &mut self.lineage,
            &mut self.rng,
        )
        .reproduce(&selection.survivors, next_generation)?;

        self.population = next;
        self.generation = next_generation;
        self.state = EngineState::Evolving;

        let stats = GenerationStats {
            generation: self.generation,
            evaluated,
            survivors: selection.survivors.len(),
            eliminated: selection.eliminated.iter().map(|c| c.id).collect(),
            population: self.population.len(),
            best_score,
            mean_score,
        };
        self.history.push(stats.clone());

        log::info!(
            "Generation {}: best={:.1} mean={:.1} survivors={}/{} next={}",
            stats.generation,
            stats.best_score,
            stats.mean_score,
            stats.survivors,
            stats.evaluated,
            stats.population
        );
        if self.population.is_empty() {
            log::warn!("Generation {} is empty", self.generation);
        }

        Ok(stats)
    }

    /// Check if evolution should stop.
    fn check_stop(&self) -> Option<StopReason> {
        if let Some(reason) = self.state.stop_reason() {
            return Some(reason);
        }

        if self.generation >= self.config.max_generations {
            return Some(StopReason::MaxGenerations);
        }

        if let Some(best) = self.best()
            && best.score >= self.config.optimum
        {
            return Some(StopReason::Converged);
        }

        None
    }

    fn stop(&mut self, reason: StopReason) -> Advance {
        let state = EngineState::from(reason);
        if self.state != state {
            log::info!("Evolution stopped at generation {}: {reason}", self.generation);
            self.state = state;
        }
        Advance::Stopped(reason)
    }

    /// Highest-scoring live candidate. NaN scores never win.
    pub fn best(&self) -> Option<&Candidate> {
        self.population
            .iter()
            .filter(|c| !c.score.is_nan())
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }

    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.population.iter().find(|c| c.id == id)
    }

    /// Number of completed reproduction cycles.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn lineage(&self) -> &LineageTracker {
        &self.lineage
    }

    /// Export copy of the lineage graph, `None` before anything was registered.
    pub fn snapshot(&self) -> Option<LineageSnapshot> {
        self.lineage.snapshot()
    }

    /// Write the lineage export to `path`. Returns `false` when there is nothing to write.
    pub fn save_lineage<P: AsRef<Path>>(&self, path: P) -> Result<bool, EngineError> {
        match self.snapshot() {
            Some(snapshot) => {
                snapshot.save_json(path)?;
                Ok(true)
            }
            None => {
                log::warn!("No lineage recorded yet; nothing saved");
                Ok(false)
            }
        }
    }

    /// Per-generation statistics, oldest first.
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }
}
