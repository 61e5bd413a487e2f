//! Hope Evolve CLI - Run an evolution from a JSON run file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use hope_evolve::{
    evolution::{EngineError, EvolutionEngine, StaticOracle},
    schema::{Advance, Candidate, EngineConfig, EvaluationOutcome, SeedVariant},
};

/// Contents of a run file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RunConfig {
    engine: EngineConfig,
    /// Task description handed to the oracle.
    task: String,
    /// Seed variants served in place of a live oracle.
    seeds: Vec<SeedVariant>,
    /// Where to write the lineage graph.
    #[serde(default)]
    lineage_output: Option<PathBuf>,
    /// Print the lineage as a Mermaid diagram at the end.
    #[serde(default)]
    mermaid: bool,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <run.json>", args[0]);
        eprintln!();
        eprintln!("Evolve a population of prompt candidates with a simulated evaluator.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  run.json   Path to the run file");
        eprintln!();
        eprintln!("An example run file is printed with the --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let run_path = PathBuf::from(&args[1]);
    let run_str = fs::read_to_string(&run_path).unwrap_or_else(|e| {
        eprintln!("Error reading run file: {}", e);
        std::process::exit(1);
    });
    let run: RunConfig = serde_json::from_str(&run_str).unwrap_or_else(|e| {
        eprintln!("Error parsing run file: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = run_evolution(run) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_evolution(run: RunConfig) -> Result<(), EngineError> {
    let config = run.engine;
    let salt = config.random_seed.unwrap_or(0);
    let threshold = config.threshold;

    println!("Hope Evolve");
    println!("===========");
    println!("Task: {}", run.task);
    println!(
        "Threshold: {}  Optimum: {}  Population: {}  Max generations: {}",
        config.threshold, config.optimum, config.target_population_size, config.max_generations
    );
    println!("Seed variants: {}", run.seeds.len());
    println!();

    let mut engine = EvolutionEngine::new(config, StaticOracle::new(run.seeds), run.task)?;
    let evaluator = |c: &Candidate| simulated_outcome(c, salt, threshold);

    let start = Instant::now();
    let reason = loop {
        match engine.advance_with(&evaluator)? {
            Advance::Advanced(stats) => println!(
                "  Generation {}: best={:.1} mean={:.1} survivors={}/{} next={}",
                stats.generation,
                stats.best_score,
                stats.mean_score,
                stats.survivors,
                stats.evaluated,
                stats.population
            ),
            Advance::Stopped(reason) => break reason,
            Advance::Seeded { population } => println!("  Seeded {} candidates", population),
        }
    };

    println!();
    println!("Stopped: {} after {} generations", reason, engine.generation());
    println!("Time: {:.2}s", start.elapsed().as_secs_f32());

    if let Some(best) = engine.best() {
        println!();
        println!("Best candidate #{} (score {:.1}, {})", best.id, best.score, best.status);
        println!("  System prompt: {}", best.payload.system_prompt);
        println!("  Prompt: {}", best.payload.prompt);
        let ancestry = engine.lineage().ancestry(best.id);
        if !ancestry.is_empty() {
            println!("  Ancestry: {:?}", ancestry);
        }
    }

    println!();
    println!(
        "Lineage: {} nodes, {} edges",
        engine.lineage().node_count(),
        engine.lineage().edge_count()
    );

    if let Some(path) = &run.lineage_output
        && engine.save_lineage(path)?
    {
        println!("Lineage written to {}", path.display());
    }

    if run.mermaid
        && let Some(snapshot) = engine.snapshot()
    {
        println!();
        println!("{}", snapshot.to_mermaid());
    }

    Ok(())
}

/// Deterministic stand-in for a real evaluator: a score in [0, 110) derived
/// from the candidate id and the run seed.
fn simulated_outcome(candidate: &Candidate, salt: u64, threshold: f64) -> EvaluationOutcome {
    let mut x = candidate.id ^ salt.rotate_left(32);
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;

    let score = (x % 1100) as f64 / 10.0;
    if score >= threshold {
        EvaluationOutcome::completed(score)
    } else {
        EvaluationOutcome::failed(score, "below threshold in simulation")
    }
}

fn print_example_config() {
    let run = RunConfig {
        engine: EngineConfig::new(50.0, 95.0).with_seed(42),
        task: "What colour is the sky?".to_string(),
        seeds: vec![
            SeedVariant::new(
                "You are a poet who answers in vivid imagery.",
                "Describe the colour of the sky in three lines.",
            ),
            SeedVariant::new(
                "You are a physicist who explains with precision.",
                "Explain why the daytime sky looks blue.",
            ),
            SeedVariant::new(
                "You are a patient teacher for young children.",
                "Tell a child what colour the sky is and why.",
            ),
        ],
        lineage_output: Some(PathBuf::from("lineage.json")),
        mermaid: false,
    };

    println!("Example run file (run.json):");
    match serde_json::to_string_pretty(&run) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
}
