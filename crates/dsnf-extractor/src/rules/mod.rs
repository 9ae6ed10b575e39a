//! DSNF pattern rules
//!
//! Each rule recognizes one dependency-tree configuration linking the two
//! entities of a pair. A [`RuleSet`] runs its rules in a fixed order; rules
//! never see each other's output, so one pair may yield overlapping triples
//! from several rules.

use dsnf_core::{Relation, SentenceUnit, WordUnit};

use crate::{EntityDetector, EntityPair, PatternRule, RuleKind, TripleDraft};

mod coordination;
mod nominal;
mod verbal;

pub use coordination::CoordinationRule;
pub use nominal::{AttributiveDeRule, CompoundNounRule};
pub use verbal::{SbvCmpPobRule, SbvVobRule, SubjectPobChainRule};

/// Read-only inputs shared by every rule for one sentence
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'s> {
    pub sentence: &'s SentenceUnit,
    pub detector: &'s EntityDetector,
}

impl<'s> MatchContext<'s> {
    pub fn new(sentence: &'s SentenceUnit, detector: &'s EntityDetector) -> Self {
        Self { sentence, detector }
    }
}

// ============================================================================
// Rule set
// ============================================================================

/// Ordered list of pattern rules
pub struct RuleSet {
    rules: Vec<Box<dyn PatternRule>>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The six DSNF rules in their evaluation order
    pub fn dsnf() -> Self {
        Self::new()
            .with_rule(SbvVobRule)
            .with_rule(SbvCmpPobRule)
            .with_rule(SubjectPobChainRule)
            .with_rule(CompoundNounRule)
            .with_rule(CoordinationRule)
            .with_rule(AttributiveDeRule)
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: impl PatternRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Drop every rule of the given kind
    pub fn without(mut self, kind: RuleKind) -> Self {
        self.rules.retain(|r| r.kind() != kind);
        self
    }

    pub fn kinds(&self) -> Vec<RuleKind> {
        self.rules.iter().map(|r| r.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule on the pair, concatenating drafts in rule order
    pub fn apply<'s>(&self, pair: &EntityPair<'s>, ctx: &MatchContext<'s>) -> Vec<TripleDraft<'s>> {
        self.rules
            .iter()
            .flat_map(|rule| rule.apply(pair, ctx))
            .collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::dsnf()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

// ============================================================================
// Tree helpers shared by rules
// ============================================================================

/// Lemmas of the "DE" possessive particle
const DE_PARTICLES: [&str; 2] = ["的", "之"];

/// Climb from a prepositional object to the outermost preposition of its chain
///
/// `target` must hang off a preposition with `POB`. Nested prepositional
/// phrases (a preposition that is itself a `POB` dependent) are followed
/// upwards. Returns the outermost preposition, whose own relation tells how
/// the phrase attaches to its governor.
pub(crate) fn pob_chain_top<'s>(
    target: &'s WordUnit,
    sentence: &'s SentenceUnit,
) -> Option<&'s WordUnit> {
    let mut current = sentence.head_via(target, &Relation::Pob)?;
    let mut steps = 0;
    while current.relation == Relation::Pob {
        steps += 1;
        if steps > sentence.len() {
            return None;
        }
        current = sentence.head_of(current)?;
    }
    Some(current)
}

/// Follow `COO` links up to the first conjunct of a coordination
pub(crate) fn first_conjunct<'s>(word: &'s WordUnit, sentence: &'s SentenceUnit) -> &'s WordUnit {
    let mut current = word;
    let mut steps = 0;
    while let Some(head) = sentence.head_via(current, &Relation::Coo) {
        steps += 1;
        if steps > sentence.len() {
            break;
        }
        current = head;
    }
    current
}

/// Whether `word` carries a "DE" particle as right adjunct
pub(crate) fn has_de_particle(word: &WordUnit, sentence: &SentenceUnit) -> bool {
    sentence.children_of(word).any(|c| {
        DE_PARTICLES.contains(&c.lemma.as_str()) && (c.relation == Relation::Rad || c.postag == "u")
    })
}
