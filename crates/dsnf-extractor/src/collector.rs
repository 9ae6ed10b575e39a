//! Triple collection and sequence numbering
//!
//! The sequence counter is carried in an [`ExtractionContext`] value that is
//! handed in with each sentence and handed back advanced, so numbering
//! continues across sentences without shared mutable state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use dsnf_core::SentenceUnit;

use crate::{Triple, TripleDraft};

/// Position of the sequence counter between two sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionContext {
    next_sequence: u64,
}

impl ExtractionContext {
    /// A fresh document, numbering from 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Resume numbering at `next_sequence`
    pub fn starting_at(next_sequence: u64) -> Self {
        Self { next_sequence }
    }

    /// Sequence number the next triple will receive
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Number of triples numbered since a fresh context
    pub fn issued(&self) -> u64 {
        self.next_sequence.saturating_sub(1)
    }
}

impl Default for ExtractionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates the drafts of one sentence in production order
#[derive(Debug, Default)]
pub struct TripleCollector<'s> {
    drafts: Vec<TripleDraft<'s>>,
}

impl<'s> TripleCollector<'s> {
    pub fn new() -> Self {
        Self { drafts: Vec::new() }
    }

    pub fn extend(&mut self, drafts: impl IntoIterator<Item = TripleDraft<'s>>) {
        self.drafts.extend(drafts);
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn drafts(&self) -> &[TripleDraft<'s>] {
        &self.drafts
    }

    /// Number every draft and return the advanced context
    pub fn finish(
        self,
        source: &Arc<SentenceUnit>,
        context: ExtractionContext,
    ) -> (Vec<Triple>, ExtractionContext) {
        let mut next = context.next_sequence;
        let triples = self
            .drafts
            .into_iter()
            .map(|draft| {
                let triple = Triple {
                    sequence_id: next,
                    subject: draft.subject.clone(),
                    predicate: draft.predicate,
                    object: draft.object.clone(),
                    rule: draft.rule,
                    source: Arc::clone(source),
                };
                next += 1;
                triple
            })
            .collect();

        (triples, ExtractionContext::starting_at(next))
    }
}
