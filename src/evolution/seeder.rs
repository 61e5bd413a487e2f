//! Initial population: from the oracle or from a caller-supplied list.

use crate::schema::{Candidate, Payload};

use super::error::EngineError;
use super::ids::IdGenerator;
use super::lineage::LineageTracker;
use super::oracle::{META_INSTRUCTION, Oracle};

/// Builds generation 0 and registers its root nodes.
pub struct Seeder<'a> {
    ids: &'a mut IdGenerator,
    lineage: &'a mut LineageTracker,
}

impl<'a> Seeder<'a> {
    pub fn new(ids: &'a mut IdGenerator, lineage: &'a mut LineageTracker) -> Self {
        Self { ids, lineage }
    }

    /// Ask the oracle for variants of `task` and turn each into a pending root candidate.
    ///
    /// An oracle error is returned as is. Zero usable variants gives an empty
    /// population, which the engine treats as extinction.
    pub fn from_oracle(
        &mut self,
        oracle: &dyn Oracle,
        task: &str,
    ) -> Result<Vec<Candidate>, EngineError> {
        let variants = oracle.generate_seed_variants(META_INSTRUCTION, task)?;
        if variants.is_empty() {
            log::warn!("Oracle produced no seed variants");
            return Ok(Vec::new());
        }

        let mut population = Vec::with_capacity(variants.len());
        for (i, variant) in variants.into_iter().enumerate() {
            if variant.is_blank() {
                log::warn!("Skipping blank seed variant #{i}");
                continue;
            }

            let id = self.ids.next_id()?;
            if self.lineage.contains(id) {
                return Err(EngineError::DuplicateId(id));
            }
            let candidate = Candidate::new(
                id,
                Payload::new(variant.system_prompt, variant.prompt),
                0,
            );
            self.lineage.register_or_update(&candidate);
            population.push(candidate);
        }

        log::info!("Seeded {} candidates", population.len());
        Ok(population)
    }

    /// Take over a caller-built population.
    ///
    /// An id already known to the lineage (or repeated in the list) is
    /// replaced with a fresh one and reported; existing nodes are never
    /// overwritten. Other ids are kept and reserved. Non-finite scores are
    /// rejected before anything is registered.
    pub fn adopt(&mut self, supplied: Vec<Candidate>) -> Result<Vec<Candidate>, EngineError> {
        if let Some(bad) = supplied.iter().find(|c| !c.score.is_finite()) {
            return Err(EngineError::NonFiniteScore {
                id: bad.id,
                score: bad.score,
            });
        }

        let mut population = Vec::with_capacity(supplied.len());
        for mut candidate in supplied {
            candidate
                .payload
                .validate()
                .map_err(|source| EngineError::Payload {
                    id: candidate.id,
                    source,
                })?;

            if self.lineage.contains(candidate.id) {
                let fresh = self.ids.next_id()?;
                if self.lineage.contains(fresh) {
                    return Err(EngineError::DuplicateId(fresh));
                }
                log::warn!(
                    "Supplied candidate id {} already exists; reassigned to {fresh}",
                    candidate.id
                );
                candidate.id = fresh;
            } else {
                self.ids.reserve(candidate.id)?;
            }

            self.lineage.register_or_update(&candidate);
            population.push(candidate);
        }

        log::info!("Adopted {} supplied candidates", population.len());
        Ok(population)
    }
}
