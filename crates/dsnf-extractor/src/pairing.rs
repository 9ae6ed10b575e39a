//! Entity pair generation
//!
//! Every two entities of a sentence form a pair unless they share a lemma
//! or too many other entities sit between them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use dsnf_core::{PairingConfig, SentenceUnit, WordUnit};

use crate::EntityDetector;

/// Two entities of one sentence, `entity1` always before `entity2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityPair<'s> {
    pub entity1: &'s WordUnit,
    pub entity2: &'s WordUnit,
}

impl<'s> EntityPair<'s> {
    /// Order the two words by position
    pub fn new(a: &'s WordUnit, b: &'s WordUnit) -> Self {
        if a.id <= b.id {
            Self {
                entity1: a,
                entity2: b,
            }
        } else {
            Self {
                entity1: b,
                entity2: a,
            }
        }
    }
}

/// Counts of pairs considered and excluded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingStats {
    pub candidates: usize,
    pub accepted: usize,
    pub same_lemma: usize,
    pub too_far: usize,
}

impl PairingStats {
    pub fn merge(&mut self, other: &PairingStats) {
        self.candidates += other.candidates;
        self.accepted += other.accepted;
        self.same_lemma += other.same_lemma;
        self.too_far += other.too_far;
    }
}

/// Forms the entity pairs eligible for rule matching
#[derive(Debug, Clone)]
pub struct EntityPairGenerator {
    max_entities_between: usize,
}

impl EntityPairGenerator {
    pub fn new(max_entities_between: usize) -> Self {
        Self {
            max_entities_between,
        }
    }

    pub fn from_config(config: &PairingConfig) -> Self {
        Self::new(config.max_entities_between)
    }

    pub fn max_entities_between(&self) -> usize {
        self.max_entities_between
    }

    /// Eligible pairs, ordered by the positions of both entities in the list
    pub fn get_entity_pairs<'s>(
        &self,
        entities: &[&'s WordUnit],
        sentence: &'s SentenceUnit,
        detector: &EntityDetector,
    ) -> Vec<EntityPair<'s>> {
        self.pair_with_stats(entities, sentence, detector).0
    }

    /// Eligible pairs together with the reasons other pairs were dropped
    pub fn pair_with_stats<'s>(
        &self,
        entities: &[&'s WordUnit],
        sentence: &'s SentenceUnit,
        detector: &EntityDetector,
    ) -> (Vec<EntityPair<'s>>, PairingStats) {
        let mut pairs = Vec::new();
        let mut stats = PairingStats::default();

        for (i, &first) in entities.iter().enumerate() {
            for &second in &entities[i + 1..] {
                stats.candidates += 1;

                if first.lemma == second.lemma {
                    stats.same_lemma += 1;
                    debug!(
                        entity1 = first.id,
                        entity2 = second.id,
                        lemma = %first.lemma,
                        "pair excluded: same_lemma"
                    );
                    continue;
                }

                let between = entity_count_between(first, second, sentence, detector);
                if between > self.max_entities_between {
                    stats.too_far += 1;
                    debug!(
                        entity1 = first.id,
                        entity2 = second.id,
                        between,
                        max = self.max_entities_between,
                        "pair excluded: too_far"
                    );
                    continue;
                }

                stats.accepted += 1;
                pairs.push(EntityPair::new(first, second));
            }
        }

        (pairs, stats)
    }
}

impl Default for EntityPairGenerator {
    fn default() -> Self {
        Self::from_config(&PairingConfig::default())
    }
}

/// Number of entity words strictly between two words of the sentence
pub fn entity_count_between(
    a: &WordUnit,
    b: &WordUnit,
    sentence: &SentenceUnit,
    detector: &EntityDetector,
) -> usize {
    let (from, to) = if a.id <= b.id { (a.id, b.id) } else { (b.id, a.id) };
    sentence
        .words_between(from, to)
        .iter()
        .filter(|w| detector.is_entity(w))
        .count()
}
