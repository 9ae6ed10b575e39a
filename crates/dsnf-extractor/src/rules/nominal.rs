//! Noun-phrase rules
//!
//! Both rules look at attribute (`ATT`) links between the two entities,
//! optionally through one common noun that names the relation. They split
//! on whether the modifying entity carries a "的" particle.

use dsnf_core::{Relation, WordUnit};

use super::{has_de_particle, MatchContext};
use crate::{EntityPair, PatternRule, Predicate, RuleKind, TripleDraft};

/// Predicate of a bare compound such as "中国 海事局"
pub const NAMING_PREDICATE: &str = "is";

/// Predicate of a bare possessive such as "海事局 的 船舶"
pub const POSSESSION_PREDICATE: &str = "has";

/// How `modifier` attaches to `head` through attributes
enum AttributePath<'s> {
    /// `modifier --ATT--> head`
    Direct,
    /// `modifier --ATT--> noun --ATT--> head`
    ThroughNoun(&'s WordUnit),
}

fn attribute_path<'s>(
    modifier: &'s WordUnit,
    head: &'s WordUnit,
    ctx: &MatchContext<'s>,
) -> Option<AttributePath<'s>> {
    let governor = ctx.sentence.head_via(modifier, &Relation::Att)?;
    if governor.id == head.id {
        return Some(AttributePath::Direct);
    }
    let is_naming_noun = ctx.detector.like_noun(governor) && !ctx.detector.is_entity(governor);
    if is_naming_noun && governor.depends_on(head, &Relation::Att) {
        return Some(AttributePath::ThroughNoun(governor));
    }
    None
}

/// Try both orientations of the pair, modifier first
fn match_attributes<'s>(
    pair: &EntityPair<'s>,
    ctx: &MatchContext<'s>,
    with_de: bool,
    bare_predicate: &str,
    kind: RuleKind,
) -> Vec<TripleDraft<'s>> {
    let mut drafts = Vec::new();
    for (modifier, head) in [
        (pair.entity1, pair.entity2),
        (pair.entity2, pair.entity1),
    ] {
        if has_de_particle(modifier, ctx.sentence) != with_de {
            continue;
        }
        let predicate = match attribute_path(modifier, head, ctx) {
            Some(AttributePath::Direct) => Predicate::structural(bare_predicate),
            Some(AttributePath::ThroughNoun(noun)) => Predicate::from_words(&[noun]),
            None => continue,
        };
        drafts.push(TripleDraft::new(modifier, predicate, head, kind));
    }
    drafts
}

/// Rule 4: entities joined by a noun compound, e.g. "美国 总统 奥巴马"
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundNounRule;

impl PatternRule for CompoundNounRule {
    fn kind(&self) -> RuleKind {
        RuleKind::CompoundNoun
    }

    fn apply<'s>(&self, pair: &EntityPair<'s>, ctx: &MatchContext<'s>) -> Vec<TripleDraft<'s>> {
        match_attributes(pair, ctx, false, NAMING_PREDICATE, self.kind())
    }
}

/// Rule 6: entities joined by a "的" phrase, e.g. "奥巴马 的 妻子 米歇尔"
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributiveDeRule;

impl PatternRule for AttributiveDeRule {
    fn kind(&self) -> RuleKind {
        RuleKind::AttributiveDe
    }

    fn apply<'s>(&self, pair: &EntityPair<'s>, ctx: &MatchContext<'s>) -> Vec<TripleDraft<'s>> {
        match_attributes(pair, ctx, true, POSSESSION_PREDICATE, self.kind())
    }
}
