//! Property-based tests for the evolution engine.

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;

use hope_evolve::{
    evolution::{EvolutionEngine, LineageTracker, OperatorRng, StaticOracle, cut},
    schema::{
        Advance, Candidate, CandidateId, CandidateStatus, EngineConfig, EvaluationOutcome,
        Payload, ResourceRefs, SeedVariant, Strategy as Operator, TokenUsage,
    },
};

const POOL: [&str; 6] = ["toolA", "toolB", "toolC", "algX", "resource1", "prompt_template_Z"];

prop_compose! {
    fn arb_status()(idx in 0..5usize) -> CandidateStatus {
        match idx {
            0 => CandidateStatus::Pending,
            1 => CandidateStatus::Running,
            2 => CandidateStatus::Completed,
            3 => CandidateStatus::Failed,
            _ => CandidateStatus::Lysed,
        }
    }
}

fn arb_refs() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(prop::sample::select(POOL.to_vec()), 0..4)
        .prop_map(|set| set.into_iter().map(str::to_string).collect())
}

prop_compose! {
    fn arb_payload()(
        system_prompt in "[a-z ]{0,24}",
        prompt in "[a-z ]{0,40}",
        tools in arb_refs(),
        algorithms in arb_refs(),
        resources in arb_refs(),
        prompts in arb_refs(),
        input in 0..10_000u64,
        output in 0..10_000u64,
    ) -> Payload {
        Payload {
            system_prompt,
            prompt,
            resources: ResourceRefs { tools, algorithms, resources, prompts },
            tokens: TokenUsage { input, output },
            parent_ids: Vec::new(),
        }
    }
}

prop_compose! {
    fn arb_population()(
        entries in prop::collection::vec((0.0..100.0f64, arb_status(), arb_payload()), 0..30)
    ) -> Vec<Candidate> {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (score, status, payload))| {
                let mut c = Candidate::new(i as CandidateId + 1, payload, 0);
                c.score = score;
                c.status = status;
                c
            })
            .collect()
    }
}

fn seed_oracle(count: usize) -> StaticOracle {
    StaticOracle::new(
        (0..count)
            .map(|i| SeedVariant::new(format!("persona {i}"), format!("variant {i} of the task")))
            .collect(),
    )
}

fn hashed_score(id: CandidateId, salt: u64) -> f64 {
    let x = (id ^ salt).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    ((x >> 33) % 1000) as f64 / 10.0
}

proptest! {
    #[test]
    fn selector_partitions_by_threshold(
        population in arb_population(),
        threshold in 0.0..100.0f64,
    ) {
        let mut lineage = LineageTracker::new();
        let selection = cut(population.clone(), threshold, &mut lineage);

        prop_assert_eq!(
            selection.survivors.len() + selection.eliminated.len(),
            population.len()
        );
        for c in &selection.eliminated {
            prop_assert!(c.score < threshold && c.status != CandidateStatus::Lysed);
        }
        for c in &selection.survivors {
            prop_assert!(c.score >= threshold || c.status == CandidateStatus::Lysed);
        }

        // Survivors keep identity and order
        let expected: Vec<&Candidate> = population
            .iter()
            .filter(|c| c.score >= threshold || c.status == CandidateStatus::Lysed)
            .collect();
        let survivors: Vec<&Candidate> = selection.survivors.iter().collect();
        prop_assert_eq!(survivors, expected);
    }

    #[test]
    fn crossover_unions_resource_sets(
        a in arb_payload(),
        b in arb_payload(),
        seed in any::<u64>(),
    ) {
        let first = Candidate::new(1, a, 0);
        let second = Candidate::new(2, b, 0);
        let child = OperatorRng::new(seed).crossover(&first, &second);

        let union = |x: &BTreeSet<String>, y: &BTreeSet<String>| -> BTreeSet<String> {
            x.union(y).cloned().collect()
        };
        let (ra, rb) = (&first.payload.resources, &second.payload.resources);
        prop_assert_eq!(&child.resources.tools, &union(&ra.tools, &rb.tools));
        prop_assert_eq!(&child.resources.algorithms, &union(&ra.algorithms, &rb.algorithms));
        prop_assert_eq!(&child.resources.resources, &union(&ra.resources, &rb.resources));
        prop_assert_eq!(&child.resources.prompts, &union(&ra.prompts, &rb.prompts));
        prop_assert_eq!(child.parent_ids, vec![1, 2]);
    }

    #[test]
    fn clone_copies_payload(payload in arb_payload(), seed in any::<u64>()) {
        let mut parent = Candidate::new(11, payload, 3);
        parent.score = 97.0;
        parent.status = CandidateStatus::Completed;

        let copy = OperatorRng::new(seed).clone_payload(&parent);
        prop_assert_eq!(&copy.parent_ids, &vec![11]);
        prop_assert_eq!(copy.with_parents(Vec::new()), parent.payload);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn ids_unique_and_lineage_complete(
        seeds in 1..8usize,
        size in 2..16usize,
        rng_seed in any::<u64>(),
        threshold in 10.0..60.0f64,
    ) {
        let config = EngineConfig::new(threshold, 99.95)
            .with_population_size(size)
            .with_max_generations(6)
            .with_seed(rng_seed);
        let mut engine = EvolutionEngine::new(config, seed_oracle(seeds), "task").unwrap();
        let evaluator = move |c: &Candidate| {
            let score = hashed_score(c.id, rng_seed);
            if score >= threshold {
                EvaluationOutcome::completed(score)
            } else {
                EvaluationOutcome::failed(score, "low")
            }
        };

        prop_assert_eq!(engine.seed().unwrap(), seeds);
        let mut everyone: Vec<Candidate> = engine.population().to_vec();
        let mut previous: HashSet<CandidateId> = everyone.iter().map(|c| c.id).collect();
        let mut seen = previous.clone();
        prop_assert_eq!(seen.len(), seeds);

        loop {
            let advance = engine.advance_with(&evaluator).unwrap();

            let current: Vec<CandidateId> = engine.population().iter().map(|c| c.id).collect();
            let distinct: HashSet<CandidateId> = current.iter().copied().collect();
            prop_assert_eq!(distinct.len(), current.len());

            for c in engine.population() {
                if !previous.contains(&c.id) {
                    prop_assert!(seen.insert(c.id), "id {} issued twice", c.id);
                    everyone.push(c.clone());
                }
            }
            previous = distinct;

            if matches!(advance, Advance::Stopped(_)) {
                break;
            }
        }

        // Every child has one edge per parent, labelled by an operator whose
        // precondition held for the first parent's score
        let config = engine.config();
        let floor = config.light_mutation_floor();
        let lineage = engine.lineage();
        for c in &everyone {
            prop_assert!(lineage.contains(c.id));
            let edges: Vec<_> = lineage.edges_into(c.id).collect();
            let sources: Vec<CandidateId> = edges.iter().map(|e| e.source).collect();
            prop_assert_eq!(sources.as_slice(), c.parent_ids());
            for edge in &edges {
                prop_assert_eq!(edge.label.arity(), c.parent_ids().len());
                let parent_score = hashed_score(c.parent_ids()[0], rng_seed);
                match edge.label {
                    Operator::Clone => prop_assert!(parent_score >= config.optimum),
                    Operator::MutateLight => prop_assert!(parent_score >= floor),
                    Operator::MutateDrastic => prop_assert!(parent_score < floor),
                    Operator::Crossover => {
                        prop_assert_ne!(c.parent_ids()[0], c.parent_ids()[1]);
                    }
                    Operator::RandomGenerate => prop_assert!(false, "random child has a parent"),
                }
            }
        }
    }
}
