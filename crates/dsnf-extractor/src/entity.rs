//! Entity candidate detection
//!
//! A word is an entity candidate when its postag is a proper-noun-like tag
//! or its lemma is one of the domain class nouns. Nothing else about the
//! word, in particular its position in the tree, is consulted.

use std::collections::HashSet;

use dsnf_core::{EntityConfig, Result, SentenceUnit, WordUnit};

/// Classifies words as entity candidates
#[derive(Debug, Clone)]
pub struct EntityDetector {
    /// Postags marking an entity
    entity_postags: HashSet<String>,
    /// Domain vocabulary override
    vocabulary: HashSet<String>,
    /// Noun-like postags
    noun_postags: HashSet<String>,
    /// Full tagset the tagger is expected to emit
    tagset: HashSet<String>,
}

impl EntityDetector {
    /// Create a detector with the LTP tagset and maritime vocabulary
    pub fn new() -> Self {
        Self::build(&EntityConfig::default())
    }

    /// Create a detector from configuration, validating the tags first
    pub fn from_config(config: &EntityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &EntityConfig) -> Self {
        Self {
            entity_postags: config.entity_postags.iter().cloned().collect(),
            vocabulary: config.vocabulary.iter().cloned().collect(),
            noun_postags: config.noun_postags.iter().cloned().collect(),
            tagset: config.tagset.iter().cloned().collect(),
        }
    }

    /// Whether the word is an entity candidate
    pub fn is_entity(&self, word: &WordUnit) -> bool {
        self.entity_postags.contains(&word.postag) || self.vocabulary.contains(&word.lemma)
    }

    /// Whether the word is a noun of any kind
    pub fn like_noun(&self, word: &WordUnit) -> bool {
        self.noun_postags.contains(&word.postag)
    }

    /// All entity candidates of the sentence, in position order
    pub fn get_entities<'s>(&self, sentence: &'s SentenceUnit) -> Vec<&'s WordUnit> {
        sentence.words.iter().filter(|w| self.is_entity(w)).collect()
    }

    /// Distinct postags of the sentence that are outside the tagset schema
    pub fn unknown_postags<'s>(&self, sentence: &'s SentenceUnit) -> Vec<&'s str> {
        let mut unknown: Vec<&str> = sentence
            .words
            .iter()
            .map(|w| w.postag.as_str())
            .filter(|tag| !self.tagset.contains(*tag))
            .collect();
        unknown.sort_unstable();
        unknown.dedup();
        unknown
    }
}

impl Default for EntityDetector {
    fn default() -> Self {
        Self::new()
    }
}
