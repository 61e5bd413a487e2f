//! Engine configuration and its validation.

use serde::{Deserialize, Serialize};

/// Top-level configuration for an evolution run.
///
/// Immutable once an engine is built from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum score required to survive a cut.
    pub threshold: f64,
    /// Score that signals convergence.
    pub optimum: f64,
    /// Size the reproducer fills each generation up to.
    #[serde(default = "default_population_size")]
    pub target_population_size: usize,
    /// Number of reproduction cycles before the run stops.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Operator probabilities and mutation strengths.
    #[serde(default)]
    pub reproduction: ReproductionConfig,
    /// Catalogue that random generation draws resource references from.
    #[serde(default)]
    pub catalogue: ResourceCatalogue,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl EngineConfig {
    /// Config with default population size, generation cap and operators.
    pub fn new(threshold: f64, optimum: f64) -> Self {
        Self {
            threshold,
            optimum,
            target_population_size: default_population_size(),
            max_generations: default_max_generations(),
            reproduction: ReproductionConfig::default(),
            catalogue: ResourceCatalogue::default(),
            random_seed: None,
        }
    }

    pub fn with_population_size(mut self, size: usize) -> Self {
        self.target_population_size = size;
        self
    }

    pub fn with_max_generations(mut self, max_generations: usize) -> Self {
        self.max_generations = max_generations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Score at or above which a parent gets a light rather than drastic mutation.
    pub fn light_mutation_floor(&self) -> f64 {
        (self.threshold + self.optimum) / 2.0
    }
}

fn default_population_size() -> usize {
    10
}
fn default_max_generations() -> usize {
    50
}

/// Reproduction operator probabilities.
///
/// The strategy roll is a uniform draw in [0, 1) compared against cumulative
/// cutoffs: below `clone_cutoff` clones (only for parents at the optimum),
/// below `mutate_cutoff` mutates, below `crossover_cutoff` crosses over (only
/// with two or more survivors), otherwise generates at random.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReproductionConfig {
    /// Fraction of survivors copied verbatim (at least one).
    #[serde(default = "default_elite_fraction")]
    pub elite_fraction: f64,
    #[serde(default = "default_clone_cutoff")]
    pub clone_cutoff: f64,
    #[serde(default = "default_mutate_cutoff")]
    pub mutate_cutoff: f64,
    #[serde(default = "default_crossover_cutoff")]
    pub crossover_cutoff: f64,
    /// Mean token increment applied by a light mutation.
    #[serde(default = "default_light_token_bump")]
    pub light_token_bump: f64,
    /// Mean token increment applied by a drastic mutation.
    #[serde(default = "default_drastic_token_bump")]
    pub drastic_token_bump: f64,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            elite_fraction: default_elite_fraction(),
            clone_cutoff: default_clone_cutoff(),
            mutate_cutoff: default_mutate_cutoff(),
            crossover_cutoff: default_crossover_cutoff(),
            light_token_bump: default_light_token_bump(),
            drastic_token_bump: default_drastic_token_bump(),
        }
    }
}

fn default_elite_fraction() -> f64 {
    0.1
}
fn default_clone_cutoff() -> f64 {
    0.1
}
fn default_mutate_cutoff() -> f64 {
    0.7
}
fn default_crossover_cutoff() -> f64 {
    0.9
}
fn default_light_token_bump() -> f64 {
    8.0
}
fn default_drastic_token_bump() -> f64 {
    64.0
}

/// External catalogue of resource identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCatalogue {
    #[serde(default)]
    pub tools: CatalogueCategory,
    #[serde(default)]
    pub algorithms: CatalogueCategory,
    #[serde(default)]
    pub resources: CatalogueCategory,
    #[serde(default)]
    pub prompts: CatalogueCategory,
}

impl Default for ResourceCatalogue {
    fn default() -> Self {
        Self {
            tools: CatalogueCategory::new(&["toolA", "toolB", "toolC"], 0.5),
            algorithms: CatalogueCategory::new(&["algX", "algY"], 0.5),
            resources: CatalogueCategory::new(&["resource1"], 0.3),
            prompts: CatalogueCategory::new(&["prompt_template_Z"], 0.2),
        }
    }
}

impl ResourceCatalogue {
    /// Catalogue with nothing in it; random generation yields no references.
    pub fn empty() -> Self {
        Self {
            tools: CatalogueCategory::default(),
            algorithms: CatalogueCategory::default(),
            resources: CatalogueCategory::default(),
            prompts: CatalogueCategory::default(),
        }
    }

    fn categories(&self) -> [(&'static str, &CatalogueCategory); 4] {
        [
            ("tools", &self.tools),
            ("algorithms", &self.algorithms),
            ("resources", &self.resources),
            ("prompts", &self.prompts),
        ]
    }
}

/// One category of the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogueCategory {
    /// Available identifiers.
    #[serde(default)]
    pub entries: Vec<String>,
    /// Probability that a random payload draws one entry from this category.
    #[serde(default)]
    pub inclusion: f64,
}

impl CatalogueCategory {
    pub fn new(entries: &[&str], inclusion: f64) -> Self {
        Self {
            entries: entries.iter().map(|e| e.to_string()).collect(),
            inclusion,
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Engine configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Threshold must be a finite non-negative number, got {0}")]
    InvalidThreshold(f64),
    #[error("Optimum must be positive, got {0}")]
    NonPositiveOptimum(f64),
    #[error("Threshold {threshold} exceeds optimum {optimum}")]
    ThresholdAboveOptimum { threshold: f64, optimum: f64 },
    #[error("Target population size must be at least 1")]
    EmptyPopulation,
    #[error("Elite fraction must be within [0, 1], got {0}")]
    InvalidEliteFraction(f64),
    #[error("Strategy cutoffs must satisfy 0 <= clone <= mutate <= crossover <= 1: {0}")]
    InvalidCutoffs(String),
    #[error("Token bump means must be positive: {0}")]
    InvalidTokenBump(String),
    #[error("Catalogue category {0} has an inclusion probability outside [0, 1]")]
    InvalidInclusion(&'static str),
}

impl EngineConfig {
    /// Validate engine configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if !self.optimum.is_finite() || self.optimum <= 0.0 {
            return Err(ConfigError::NonPositiveOptimum(self.optimum));
        }
        if self.threshold > self.optimum {
            return Err(ConfigError::ThresholdAboveOptimum {
                threshold: self.threshold,
                optimum: self.optimum,
            });
        }
        if self.target_population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }

        self.reproduction.validate()?;

        for (name, category) in self.catalogue.categories() {
            if !(0.0..=1.0).contains(&category.inclusion) {
                return Err(ConfigError::InvalidInclusion(name));
            }
        }

        Ok(())
    }
}

impl ReproductionConfig {
    /// Validate operator probabilities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.elite_fraction) {
            return Err(ConfigError::InvalidEliteFraction(self.elite_fraction));
        }

        let cutoffs = [self.clone_cutoff, self.mutate_cutoff, self.crossover_cutoff];
        let in_range = cutoffs.iter().all(|c| (0.0..=1.0).contains(c));
        let ordered = cutoffs.windows(2).all(|w| w[0] <= w[1]);
        if !in_range || !ordered {
            return Err(ConfigError::InvalidCutoffs(format!(
                "clone={} mutate={} crossover={}",
                self.clone_cutoff, self.mutate_cutoff, self.crossover_cutoff
            )));
        }

        // NaN fails both comparisons
        if !(self.light_token_bump > 0.0 && self.drastic_token_bump > 0.0) {
            return Err(ConfigError::InvalidTokenBump(format!(
                "light={} drastic={}",
                self.light_token_bump, self.drastic_token_bump
            )));
        }

        Ok(())
    }
}
