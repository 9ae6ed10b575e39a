//! DSNF Extractor - Dependency-pattern triple extraction
//!
//! Finds candidate entities in a parsed sentence, pairs them up and runs an
//! ordered battery of dependency-tree pattern rules over every pair to emit
//! subject-predicate-object triples.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use dsnf_core::{Result, SentenceUnit, WordUnit};

pub mod collector;
pub mod conll;
pub mod entity;
pub mod extractor;
pub mod pairing;
pub mod rules;
pub mod sink;

pub use collector::{ExtractionContext, TripleCollector};
pub use conll::{split_conll_document, ConllParser};
pub use entity::EntityDetector;
pub use extractor::{DocumentReport, ExtractionStats, Extractor, SentenceExtraction};
pub use pairing::{EntityPair, EntityPairGenerator, PairingStats};
pub use rules::{MatchContext, RuleSet};
pub use sink::{JsonlSink, MemorySink, TripleRecord};

// ============================================================================
// Rule identity
// ============================================================================

/// Which pattern rule produced a triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Subject and object of the same verb
    SbvVob,
    /// Subject of a verb whose complement takes a prepositional object
    SbvCmpPob,
    /// Subject, fronted object or pivot plus an adverbial prepositional chain
    SubjectPobChain,
    /// Entities joined by a noun-compound attribute
    CompoundNoun,
    /// Roles propagated across coordinated entities
    Coordination,
    /// Possessive phrase built with the "的" particle
    AttributiveDe,
}

impl RuleKind {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SbvVob => "sbv_vob",
            Self::SbvCmpPob => "sbv_cmp_pob",
            Self::SubjectPobChain => "subject_pob_chain",
            Self::CompoundNoun => "compound_noun",
            Self::Coordination => "coordination",
            Self::AttributiveDe => "attributive_de",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Triples
// ============================================================================

/// Predicate of a triple
///
/// Lexical predicates are built from one or more governing words of the
/// sentence. Structural predicates (e.g. "is") carry no words.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    /// Positions of the words the predicate is made of
    pub words: Vec<usize>,
    /// Concatenated text
    pub text: String,
}

impl Predicate {
    /// Join the lemmas of `words` in the given order
    pub fn from_words(words: &[&WordUnit]) -> Self {
        Self {
            words: words.iter().map(|w| w.id).collect(),
            text: words.iter().map(|w| w.lemma.as_str()).collect(),
        }
    }

    /// A predicate implied by tree structure rather than by a word
    pub fn structural(text: impl Into<String>) -> Self {
        Self {
            words: Vec::new(),
            text: text.into(),
        }
    }

    pub fn is_structural(&self) -> bool {
        self.words.is_empty()
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// An unnumbered rule match, borrowing from the sentence it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripleDraft<'s> {
    pub subject: &'s WordUnit,
    pub predicate: Predicate,
    pub object: &'s WordUnit,
    pub rule: RuleKind,
}

impl<'s> TripleDraft<'s> {
    pub fn new(
        subject: &'s WordUnit,
        predicate: Predicate,
        object: &'s WordUnit,
        rule: RuleKind,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            rule,
        }
    }
}

/// A numbered extraction result
#[derive(Debug, Clone)]
pub struct Triple {
    /// Document-wide sequence number, starting at 1
    pub sequence_id: u64,
    pub subject: WordUnit,
    pub predicate: Predicate,
    pub object: WordUnit,
    pub rule: RuleKind,
    /// Sentence the triple was extracted from, shared by all its triples
    pub source: Arc<SentenceUnit>,
}

impl Triple {
    /// Text of the source sentence
    pub fn sentence_text(&self) -> &str {
        &self.source.text
    }

    /// Subject, predicate and object text
    pub fn as_tuple(&self) -> (&str, &str, &str) {
        (&self.subject.lemma, &self.predicate.text, &self.object.lemma)
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] ({}, {}, {})",
            self.sequence_id, self.subject.lemma, self.predicate, self.object.lemma
        )
    }
}

// ============================================================================
// Collaborator traits
// ============================================================================

/// Linguistic pipeline turning raw sentence text into a dependency tree
pub trait DependencyParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<SentenceUnit>;
}

/// One dependency-tree configuration connecting two entities
pub trait PatternRule: Send + Sync {
    fn kind(&self) -> RuleKind;

    /// Match the pair against the sentence tree, returning zero or more drafts
    fn apply<'s>(&self, pair: &EntityPair<'s>, ctx: &MatchContext<'s>) -> Vec<TripleDraft<'s>>;
}

/// Append-only destination for numbered triples
pub trait TripleSink {
    fn write(&mut self, triple: &Triple) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
