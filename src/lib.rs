//! Hope Evolve - Evolutionary search over prompt-driven agent configurations.
//!
//! This crate evolves a population of candidates ("hope-levels"). Each
//! candidate carries a system prompt, a task prompt and references into an
//! external resource catalogue. An external evaluator scores candidates;
//! the engine cuts everything below a threshold, refills the population from
//! the survivors and keeps a full genealogy of every candidate it produced.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, candidate, lineage export and progress types
//! - `evolution`: Engine, selection, reproduction operators, oracle, lineage tracking
//!
//! # Example
//!
//! ```rust,no_run
//! use hope_evolve::{
//!     evolution::{EvolutionEngine, StaticOracle},
//!     schema::{Advance, EngineConfig, EvaluationOutcome, SeedVariant},
//! };
//!
//! let oracle = StaticOracle::new(vec![
//!     SeedVariant::new("You are a careful analyst.", "Summarise the report."),
//!     SeedVariant::new("You are a terse editor.", "Summarise the report in one line."),
//! ]);
//! let mut engine =
//!     EvolutionEngine::new(EngineConfig::new(50.0, 95.0), oracle, "Summarise the report").unwrap();
//!
//! // Seed, then score the seeds by hand
//! engine.seed().unwrap();
//! let ids: Vec<u64> = engine.population().iter().map(|c| c.id).collect();
//! for id in ids {
//!     engine.record_evaluation(id, EvaluationOutcome::completed(60.0)).unwrap();
//! }
//!
//! if let Advance::Advanced(stats) = engine.advance_generation().unwrap() {
//!     println!("{} survivors, next generation has {}", stats.survivors, stats.population);
//! }
//!
//! if let Some(lineage) = engine.snapshot() {
//!     println!("{}", lineage.to_mermaid());
//! }
//! ```

pub mod evolution;
pub mod schema;

// Re-export commonly used types
pub use evolution::{EngineError, Evaluator, EvolutionEngine, Oracle, StaticOracle};
pub use schema::{Advance, Candidate, EngineConfig, EvaluationOutcome, Payload, SeedVariant};
