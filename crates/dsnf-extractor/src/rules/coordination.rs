//! Coordination rule
//!
//! A coordinated entity ("A 和 B ...") shares the grammatical role of its
//! first conjunct, which is the only one the parser attaches to the verb.
//! This rule substitutes first conjuncts for coordinated entities, reruns the
//! verb-centred matchers and reports matches with the original entities.

use dsnf_core::{SentenceUnit, WordUnit};

use super::verbal::{match_sbv_cmp_pob, match_sbv_vob, match_subject_pob_chain};
use super::{first_conjunct, MatchContext};
use crate::{EntityPair, PatternRule, Predicate, RuleKind, TripleDraft};

type Matcher = fn(&WordUnit, &WordUnit, &SentenceUnit) -> Option<Predicate>;

/// Verb-centred matchers rerun on first conjuncts, in rule order
const MATCHERS: [Matcher; 3] = [match_sbv_vob, match_sbv_cmp_pob, match_subject_pob_chain];

/// Rule 5: propagate subject/object roles across coordination
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinationRule;

impl PatternRule for CoordinationRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Coordination
    }

    fn apply<'s>(&self, pair: &EntityPair<'s>, ctx: &MatchContext<'s>) -> Vec<TripleDraft<'s>> {
        let sentence = ctx.sentence;
        let (e1, e2) = (pair.entity1, pair.entity2);
        let r1 = first_conjunct(e1, sentence);
        let r2 = first_conjunct(e2, sentence);

        // Nothing coordinated, or the two entities are conjuncts of each other
        if (r1.id == e1.id && r2.id == e2.id) || r1.id == r2.id {
            return Vec::new();
        }

        let mut drafts = Vec::new();
        for ((subject, resolved_subject), (object, resolved_object)) in
            [((e1, r1), (e2, r2)), ((e2, r2), (e1, r1))]
        {
            for matcher in MATCHERS {
                if let Some(predicate) = matcher(resolved_subject, resolved_object, sentence) {
                    drafts.push(TripleDraft::new(subject, predicate, object, self.kind()));
                }
            }
        }
        drafts
    }
}
