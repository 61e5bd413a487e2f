//! Payload operators: clone, light/drastic mutation, crossover, random generation.

use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::schema::{
    Candidate, CatalogueCategory, EngineConfig, Payload, ResourceCatalogue, ResourceRefs, Strategy,
    TokenUsage,
};

/// Phrases a light mutation may append to a prompt.
const REFINEMENTS: &[&str] = &[
    "Be concise.",
    "Explain your reasoning step by step.",
    "Double-check the answer before replying.",
    "Use a concrete example.",
    "Answer in plain language.",
    "State any assumptions explicitly.",
];

/// System prompts used when a mutation throws the old persona away.
const EXPLORATORY_PERSONAS: &[&str] = &[
    "Try a completely different approach.",
    "You are a skeptical reviewer who questions every premise.",
    "You are a creative generalist who favours unusual angles.",
    "You are a meticulous specialist who works from first principles.",
];

const RANDOM_PERSONA: &str = "You are a brand-new agent exploring the task from scratch.";

/// Random number generator wrapper for payload operations.
pub struct OperatorRng {
    rng: StdRng,
}

impl OperatorRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in [0, 1).
    pub fn roll(&mut self) -> f64 {
        self.rng.r#gen()
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Uniform index in `0..len` other than `exclude`. `len` must be at least 2.
    pub fn index_except(&mut self, len: usize, exclude: usize) -> usize {
        let idx = self.rng.gen_range(0..len - 1);
        if idx >= exclude { idx + 1 } else { idx }
    }

    /// Run the operator for `strategy` on `parents`.
    ///
    /// Returns `None` when fewer parents than the operator needs are given.
    pub fn apply(
        &mut self,
        strategy: Strategy,
        parents: &[&Candidate],
        config: &EngineConfig,
    ) -> Option<Payload> {
        let rates = &config.reproduction;
        match (strategy, parents) {
            (Strategy::Clone, [parent, ..]) => Some(self.clone_payload(parent)),
            (Strategy::MutateLight, [parent, ..]) => {
                Some(self.mutate_light(parent, rates.light_token_bump))
            }
            (Strategy::MutateDrastic, [parent, ..]) => {
                Some(self.mutate_drastic(parent, rates.drastic_token_bump))
            }
            (Strategy::Crossover, [first, second, ..]) => Some(self.crossover(first, second)),
            (Strategy::RandomGenerate, _) => Some(self.random_payload(&config.catalogue)),
            _ => None,
        }
    }

    /// Exact payload copy with the parent recorded.
    pub fn clone_payload(&mut self, parent: &Candidate) -> Payload {
        parent.payload.clone().with_parents(vec![parent.id])
    }

    /// Small perturbation of the prompt and a small token increment.
    pub fn mutate_light(&mut self, parent: &Candidate, token_bump: f64) -> Payload {
        let mut payload = parent.payload.clone().with_parents(vec![parent.id]);

        let original = payload.prompt.clone();
        if self.rng.gen_bool(0.5) {
            payload.prompt = self.swap_adjacent_words(&original);
        }
        if payload.prompt == original {
            payload.prompt = self.append_refinement(&original);
        }

        payload.tokens.input = payload
            .tokens
            .input
            .saturating_add(self.token_bump(token_bump));
        payload
    }

    /// Replace both prompts with exploratory text and add a large token increment.
    pub fn mutate_drastic(&mut self, parent: &Candidate, token_bump: f64) -> Payload {
        let mut payload = parent.payload.clone().with_parents(vec![parent.id]);

        payload.system_prompt = EXPLORATORY_PERSONAS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(EXPLORATORY_PERSONAS[0])
            .to_string();
        payload.prompt = format!(
            "Take a radically different route to the original task (variant {:.3}).",
            self.rng.r#gen::<f64>()
        );

        let bump = self.token_bump(token_bump);
        payload.tokens.input = payload.tokens.input.saturating_add(bump);
        payload.tokens.output = payload.tokens.output.saturating_add(bump);
        payload
    }

    /// System prompt from `first`, prompt from `second`, unioned resources,
    /// averaged token counters.
    pub fn crossover(&mut self, first: &Candidate, second: &Candidate) -> Payload {
        Payload {
            system_prompt: first.payload.system_prompt.clone(),
            prompt: second.payload.prompt.clone(),
            resources: first.payload.resources.union(&second.payload.resources),
            tokens: first.payload.tokens.average(&second.payload.tokens),
            parent_ids: vec![first.id, second.id],
        }
    }

    /// Parentless payload with randomized resource references.
    pub fn random_payload(&mut self, catalogue: &ResourceCatalogue) -> Payload {
        let resources = ResourceRefs {
            tools: self.draw(&catalogue.tools).into_iter().collect(),
            algorithms: self.draw(&catalogue.algorithms).into_iter().collect(),
            resources: self.draw(&catalogue.resources).into_iter().collect(),
            prompts: self.draw(&catalogue.prompts).into_iter().collect(),
        };

        Payload {
            system_prompt: RANDOM_PERSONA.to_string(),
            prompt: format!("Randomly generated task {:08x}.", self.rng.r#gen::<u32>()),
            resources,
            tokens: TokenUsage::default(),
            parent_ids: Vec::new(),
        }
    }

    /// At most one entry from a category, drawn with the category's inclusion probability.
    fn draw(&mut self, category: &CatalogueCategory) -> Option<String> {
        if category.entries.is_empty() || !self.rng.gen_bool(category.inclusion) {
            return None;
        }
        category.entries.choose(&mut self.rng).cloned()
    }

    fn swap_adjacent_words(&mut self, text: &str) -> String {
        let mut words: Vec<&str> = text.split_whitespace().collect();
        if words.len() < 2 {
            return text.to_string();
        }
        let i = self.rng.gen_range(0..words.len() - 1);
        words.swap(i, i + 1);
        words.join(" ")
    }

    fn append_refinement(&mut self, text: &str) -> String {
        let phrase = REFINEMENTS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(REFINEMENTS[0]);
        if text.trim().is_empty() {
            phrase.to_string()
        } else {
            format!("{} {}", text.trim_end(), phrase)
        }
    }

    /// Positive token increment around `mean`.
    fn token_bump(&mut self, mean: f64) -> u64 {
        let noise: f64 = self.rng.sample(StandardNormal);
        (mean + noise * mean * 0.25).round().max(1.0) as u64
    }
}
