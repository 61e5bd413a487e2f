//! Evolution module for growing a population of prompt-driven candidates.
//!
//! # Overview
//!
//! One run is owned by an [`EvolutionEngine`], which is made of:
//!
//! - **Identifiers** (`ids`): fresh ids, never reused within a run
//! - **Lineage** (`lineage`): append-only genealogy of every candidate
//! - **Selection** (`selection`): the threshold cut
//! - **Strategy** (`strategy`): weighted choice of a reproduction operator
//! - **Operators** (`operators`): clone, light/drastic mutation, crossover, random generation
//! - **Reproduction** (`reproduction`): elitism plus slot filling up to the target size
//! - **Oracle** (`oracle`): the external planner that proposes seed variants
//! - **Seeder** (`seeder`): builds generation 0
//!
//! Fitness evaluation is external. Either record outcomes with
//! [`EvolutionEngine::record_evaluation`] between calls to
//! [`EvolutionEngine::advance_generation`], or hand an [`Evaluator`] to
//! [`EvolutionEngine::advance_with`].
//!
//! # Example
//!
//! ```rust,no_run
//! use hope_evolve::evolution::{EvolutionEngine, StaticOracle};
//! use hope_evolve::schema::{Advance, Candidate, EngineConfig, EvaluationOutcome, SeedVariant};
//!
//! let oracle = StaticOracle::new(vec![
//!     SeedVariant::new("You are a poet.", "Describe the sky."),
//!     SeedVariant::new("You are a physicist.", "Explain why the sky is blue."),
//! ]);
//! let config = EngineConfig::new(50.0, 95.0).with_seed(7);
//! let mut engine = EvolutionEngine::new(config, oracle, "What colour is the sky?").unwrap();
//!
//! let evaluator = |c: &Candidate| EvaluationOutcome::completed(c.payload.prompt.len() as f64);
//! loop {
//!     match engine.advance_with(&evaluator).unwrap() {
//!         Advance::Advanced(stats) => println!("generation {}: best {:.1}", stats.generation, stats.best_score),
//!         Advance::Stopped(reason) => {
//!             println!("stopped: {reason}");
//!             break;
//!         }
//!         Advance::Seeded { .. } => {}
//!     }
//! }
//! ```

mod engine;
mod error;
mod ids;
mod lineage;
mod operators;
mod oracle;
mod reproduction;
mod seeder;
mod selection;
mod strategy;

pub use engine::{Evaluator, EvolutionEngine};
pub use error::EngineError;
pub use ids::IdGenerator;
pub use lineage::LineageTracker;
pub use operators::OperatorRng;
pub use oracle::{
    CompletionOracle, META_INSTRUCTION, Oracle, OracleError, StaticOracle, extract_seed_variants,
};
pub use reproduction::Reproducer;
pub use seeder::Seeder;
pub use selection::{Selection, cut, is_eliminated};
pub use strategy::choose_strategy;
