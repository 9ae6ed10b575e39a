//! Verb-centred rules
//!
//! The predicate of these rules is the verb both entities hang off, possibly
//! extended with its complement or its own object.
//!
//! Roles are read in pair order: the earlier entity must be the subject side
//! and the later one the object side. A prepositional phrase fronted before
//! the subject ("在 上海 海事局 检查") therefore yields no triple.

use dsnf_core::{Relation, SentenceUnit, WordUnit};

use super::{pob_chain_top, MatchContext};
use crate::{EntityPair, PatternRule, Predicate, RuleKind, TripleDraft};

// ============================================================================
// Matchers
// ============================================================================

/// `subject --SBV--> V <--VOB-- object`
pub(crate) fn match_sbv_vob(
    subject: &WordUnit,
    object: &WordUnit,
    sentence: &SentenceUnit,
) -> Option<Predicate> {
    let verb = sentence.head_via(subject, &Relation::Sbv)?;
    if !object.depends_on(verb, &Relation::Vob) {
        return None;
    }
    Some(Predicate::from_words(&[verb]))
}

/// `subject --SBV--> V <--CMP-- C`, with `object` reached from `C` by `POB`
pub(crate) fn match_sbv_cmp_pob(
    subject: &WordUnit,
    object: &WordUnit,
    sentence: &SentenceUnit,
) -> Option<Predicate> {
    let verb = sentence.head_via(subject, &Relation::Sbv)?;
    let complement = pob_chain_top(object, sentence)?;
    if !complement.depends_on(verb, &Relation::Cmp) {
        return None;
    }
    Some(Predicate::from_words(&[verb, complement]))
}

/// Subject, fronted object or pivot of V, with `object` inside an adverbial
/// prepositional phrase of V
///
/// For a pivot, the prepositional phrase may instead modify the verb V takes
/// as object ("A 要求 B 在 C 停靠"); that verb then becomes the predicate.
/// The governing verb's own object is appended when present.
pub(crate) fn match_subject_pob_chain(
    subject: &WordUnit,
    object: &WordUnit,
    sentence: &SentenceUnit,
) -> Option<Predicate> {
    if !matches!(
        subject.relation,
        Relation::Sbv | Relation::Fob | Relation::Dbl
    ) {
        return None;
    }
    let verb = sentence.head_of(subject)?;
    let preposition = pob_chain_top(object, sentence)?;
    if preposition.relation != Relation::Adv {
        return None;
    }
    let governor = sentence.head_of(preposition)?;

    let through_pivot = subject.relation == Relation::Dbl && governor.depends_on(verb, &Relation::Vob);
    if governor.id != verb.id && !through_pivot {
        return None;
    }

    let verb_object = sentence
        .children_with(governor, &Relation::Vob)
        .find(|w| w.id != subject.id && w.id != object.id);

    Some(match verb_object {
        Some(verb_object) => Predicate::from_words(&[governor, verb_object]),
        None => Predicate::from_words(&[governor]),
    })
}

// ============================================================================
// Rules
// ============================================================================

/// Rule 1: entity1 is the subject and entity2 the object of the same verb
#[derive(Debug, Clone, Copy, Default)]
pub struct SbvVobRule;

impl PatternRule for SbvVobRule {
    fn kind(&self) -> RuleKind {
        RuleKind::SbvVob
    }

    fn apply<'s>(&self, pair: &EntityPair<'s>, ctx: &MatchContext<'s>) -> Vec<TripleDraft<'s>> {
        match_sbv_vob(pair.entity1, pair.entity2, ctx.sentence)
            .map(|p| TripleDraft::new(pair.entity1, p, pair.entity2, self.kind()))
            .into_iter()
            .collect()
    }
}

/// Rule 2: entity1 is the subject of a verb whose complement introduces entity2
#[derive(Debug, Clone, Copy, Default)]
pub struct SbvCmpPobRule;

impl PatternRule for SbvCmpPobRule {
    fn kind(&self) -> RuleKind {
        RuleKind::SbvCmpPob
    }

    fn apply<'s>(&self, pair: &EntityPair<'s>, ctx: &MatchContext<'s>) -> Vec<TripleDraft<'s>> {
        match_sbv_cmp_pob(pair.entity1, pair.entity2, ctx.sentence)
            .map(|p| TripleDraft::new(pair.entity1, p, pair.entity2, self.kind()))
            .into_iter()
            .collect()
    }
}

/// Rule 3: entity1 is subject, fronted object or pivot; entity2 sits in an
/// adverbial prepositional phrase of the same predicate
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectPobChainRule;

impl PatternRule for SubjectPobChainRule {
    fn kind(&self) -> RuleKind {
        RuleKind::SubjectPobChain
    }

    fn apply<'s>(&self, pair: &EntityPair<'s>, ctx: &MatchContext<'s>) -> Vec<TripleDraft<'s>> {
        match_subject_pob_chain(pair.entity1, pair.entity2, ctx.sentence)
            .map(|p| TripleDraft::new(pair.entity1, p, pair.entity2, self.kind()))
            .into_iter()
            .collect()
    }
}
