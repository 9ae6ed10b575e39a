//! Extraction orchestrator
//!
//! Runs the per-sentence pipeline: parse, validate, detect entities, pair
//! them, apply the rule set to every pair and number the resulting triples.
//! All per-sentence state lives inside one call; only the sequence counter
//! crosses sentence boundaries, carried by [`ExtractionContext`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use dsnf_core::{AppConfig, DsnfError, Result, SentenceUnit};

use crate::{
    DependencyParser, EntityDetector, EntityPairGenerator, ExtractionContext, MatchContext,
    PairingStats, RuleKind, RuleSet, Triple, TripleCollector, TripleSink,
};

// ============================================================================
// Statistics
// ============================================================================

/// Counters accumulated over one or more sentences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub sentences: usize,
    pub entities: usize,
    pub pairs: PairingStats,
    pub triples: usize,
    /// Triples per producing rule
    pub by_rule: BTreeMap<RuleKind, usize>,
    /// Entity-less sentences tagged outside the configured tagset
    pub foreign_tagset: usize,
}

impl ExtractionStats {
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.sentences += other.sentences;
        self.entities += other.entities;
        self.pairs.merge(&other.pairs);
        self.triples += other.triples;
        self.foreign_tagset += other.foreign_tagset;
        for (rule, count) in &other.by_rule {
            *self.by_rule.entry(*rule).or_insert(0) += count;
        }
    }
}

/// Result of extracting one sentence
#[derive(Debug, Clone)]
pub struct SentenceExtraction {
    pub triples: Vec<Triple>,
    /// Context to hand in with the next sentence
    pub context: ExtractionContext,
    pub stats: ExtractionStats,
}

/// Summary of a batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentReport {
    pub stats: ExtractionStats,
    /// Sentences rejected by the parser or by tree validation
    pub skipped: usize,
    pub written: usize,
}

// ============================================================================
// Extractor
// ============================================================================

/// Sentence-at-a-time triple extractor
pub struct Extractor {
    parser: Box<dyn DependencyParser>,
    detector: EntityDetector,
    pairing: EntityPairGenerator,
    rules: RuleSet,
    /// Counter used by the stateful [`Extractor::extract`] entry point
    context: ExtractionContext,
}

impl Extractor {
    /// Create an extractor with default detection, pairing and the DSNF rules
    pub fn new(parser: Box<dyn DependencyParser>) -> Self {
        Self {
            parser,
            detector: EntityDetector::new(),
            pairing: EntityPairGenerator::default(),
            rules: RuleSet::dsnf(),
            context: ExtractionContext::new(),
        }
    }

    /// Create an extractor from configuration, validating it first
    pub fn from_config(parser: Box<dyn DependencyParser>, config: &AppConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser,
            detector: EntityDetector::from_config(&config.entity)?,
            pairing: EntityPairGenerator::from_config(&config.pairing),
            rules: RuleSet::dsnf(),
            context: ExtractionContext::new(),
        })
    }

    /// Replace the rule set
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Continue numbering from an existing context
    pub fn with_context(mut self, context: ExtractionContext) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> ExtractionContext {
        self.context
    }

    pub fn detector(&self) -> &EntityDetector {
        &self.detector
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Parse and validate one sentence
    pub fn parse(&self, text: &str) -> Result<SentenceUnit> {
        let sentence = self.parser.parse(text)?;
        sentence.validate()?;
        Ok(sentence)
    }

    /// Extract triples from one sentence, numbering them after every triple
    /// previously returned by this extractor
    pub fn extract(&mut self, text: &str) -> Result<Vec<Triple>> {
        let (triples, context) = self.extract_with_context(text, self.context)?;
        self.context = context;
        Ok(triples)
    }

    /// Extract triples from one sentence with an explicitly threaded counter
    pub fn extract_with_context(
        &self,
        text: &str,
        context: ExtractionContext,
    ) -> Result<(Vec<Triple>, ExtractionContext)> {
        let sentence = self.parse(text)?;
        let extraction = self.extract_parsed(sentence, context);
        Ok((extraction.triples, extraction.context))
    }

    /// Run detection, pairing and the rule set over an already parsed sentence
    ///
    /// The sentence is assumed to satisfy [`SentenceUnit::validate`].
    pub fn extract_parsed(
        &self,
        sentence: SentenceUnit,
        context: ExtractionContext,
    ) -> SentenceExtraction {
        let source = Arc::new(sentence);
        let sentence: &SentenceUnit = &source;

        let entities = self.detector.get_entities(sentence);
        let mut foreign_tagset = false;
        if entities.is_empty() && !sentence.is_empty() {
            let unknown = self.detector.unknown_postags(sentence);
            if !unknown.is_empty() {
                foreign_tagset = true;
                warn!(
                    sentence = %sentence.text,
                    unknown_postags = ?unknown,
                    "no entities found and the sentence uses postags outside the configured tagset"
                );
            }
        }

        let (pairs, pair_stats) = self.pairing.pair_with_stats(&entities, sentence, &self.detector);
        let ctx = MatchContext::new(sentence, &self.detector);

        let mut collector = TripleCollector::new();
        for pair in &pairs {
            collector.extend(self.rules.apply(pair, &ctx));
        }

        let mut stats = ExtractionStats {
            sentences: 1,
            entities: entities.len(),
            pairs: pair_stats,
            triples: collector.len(),
            by_rule: BTreeMap::new(),
            foreign_tagset: usize::from(foreign_tagset),
        };
        for draft in collector.drafts() {
            *stats.by_rule.entry(draft.rule).or_insert(0) += 1;
        }

        debug!(
            root = ?sentence.root().map(|w| w.lemma.as_str()),
            entities = stats.entities,
            pairs = pairs.len(),
            triples = stats.triples,
            "sentence extracted"
        );

        let (triples, context) = collector.finish(&source, context);
        SentenceExtraction {
            triples,
            context,
            stats,
        }
    }

    /// Extract a batch of sentences into a sink
    ///
    /// Sentences the parser rejects or whose tree is malformed are logged and
    /// skipped. Sink failures abort the batch.
    pub fn extract_document<I, S>(
        &mut self,
        sentences: I,
        sink: &mut dyn TripleSink,
    ) -> Result<DocumentReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = DocumentReport::default();

        for (index, text) in sentences.into_iter().enumerate() {
            let sentence = match self.parse(text.as_ref()) {
                Ok(sentence) => sentence,
                Err(e @ (DsnfError::Structural(_) | DsnfError::Parse(_))) => {
                    warn!(sentence = index, error = %e, "skipping sentence");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            // Numbers are consumed even if the sink rejects a triple
            let extraction = self.extract_parsed(sentence, self.context);
            self.context = extraction.context;
            report.stats.merge(&extraction.stats);
            for triple in &extraction.triples {
                sink.write(triple)?;
                report.written += 1;
            }
        }

        sink.flush()?;

        info!(
            sentences = report.stats.sentences,
            skipped = report.skipped,
            triples = report.written,
            excluded_too_far = report.stats.pairs.too_far,
            foreign_tagset = report.stats.foreign_tagset,
            "document extracted"
        );

        Ok(report)
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("detector", &self.detector)
            .field("pairing", &self.pairing)
            .field("rules", &self.rules)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsnf_core::{Relation, WordUnit};

    /// Returns a fixed parse whatever the text
    struct FixedParser(SentenceUnit);

    impl DependencyParser for FixedParser {
        fn parse(&self, _text: &str) -> Result<SentenceUnit> {
            Ok(self.0.clone())
        }
    }

    fn svo() -> SentenceUnit {
        SentenceUnit::new(
            "海事局检查船舶",
            vec![
                WordUnit::new(0, "海事局", "ni").with_head(1, Relation::Sbv),
                WordUnit::new(1, "检查", "v"),
                WordUnit::new(2, "船舶", "n").with_head(1, Relation::Vob),
            ],
        )
    }

    #[test]
    fn test_extract_numbers_from_one() {
        let mut extractor = Extractor::new(Box::new(FixedParser(svo())));
        let triples = extractor.extract("海事局检查船舶").unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].sequence_id, 1);
        assert_eq!(triples[0].as_tuple(), ("海事局", "检查", "船舶"));
        assert_eq!(extractor.context().next_sequence(), 2);
    }

    #[test]
    fn test_extract_with_context_does_not_touch_instance() {
        let extractor = Extractor::new(Box::new(FixedParser(svo())));
        let ctx = ExtractionContext::starting_at(41);
        let (triples, next) = extractor.extract_with_context("", ctx).unwrap();
        assert_eq!(triples[0].sequence_id, 41);
        assert_eq!(next.next_sequence(), 42);
        assert_eq!(extractor.context().next_sequence(), 1);
    }

    #[test]
    fn test_malformed_tree_is_rejected() {
        let mut broken = svo();
        broken.words[1].head_id = Some(0);
        let mut extractor = Extractor::new(Box::new(FixedParser(broken)));
        let err = extractor.extract("").unwrap_err();
        assert!(matches!(err, DsnfError::Structural(_)));
        // A failed sentence consumes no sequence numbers
        assert_eq!(extractor.context().next_sequence(), 1);
    }

    #[test]
    fn test_stats_count_rules() {
        let extractor = Extractor::new(Box::new(FixedParser(svo())));
        let extraction = extractor.extract_parsed(svo(), ExtractionContext::new());
        assert_eq!(extraction.stats.entities, 2);
        assert_eq!(extraction.stats.pairs.accepted, 1);
        assert_eq!(extraction.stats.by_rule.get(&RuleKind::SbvVob), Some(&1));
    }

    #[test]
    fn test_custom_rule_set() {
        let extractor = Extractor::new(Box::new(FixedParser(svo())))
            .with_rules(RuleSet::dsnf().without(RuleKind::SbvVob));
        let (triples, _) = extractor
            .extract_with_context("", ExtractionContext::new())
            .unwrap();
        assert!(triples.is_empty());
        assert_eq!(extractor.rules().len(), 5);
    }

    #[test]
    fn test_from_config_rejects_unknown_tags() {
        let mut config = AppConfig::default();
        config.entity.entity_postags = vec!["nr".to_string()];
        let result = Extractor::from_config(Box::new(FixedParser(svo())), &config);
        assert!(matches!(result, Err(DsnfError::Config(_))));
    }

    #[test]
    fn test_foreign_tagset_yields_nothing_and_is_counted() {
        // HanLP-style tags: nr person, nto organization
        let foreign = SentenceUnit::new(
            "张三管理公司",
            vec![
                WordUnit::new(0, "张三", "nr").with_head(1, Relation::Sbv),
                WordUnit::new(1, "管理", "v"),
                WordUnit::new(2, "公司", "nto").with_head(1, Relation::Vob),
            ],
        );
        let extractor = Extractor::new(Box::new(FixedParser(svo())));
        let extraction = extractor.extract_parsed(foreign, ExtractionContext::new());
        assert!(extraction.triples.is_empty());
        assert_eq!(extraction.stats.foreign_tagset, 1);
        assert_eq!(extraction.context.next_sequence(), 1);

        // A known tagset without entities is not flagged
        let plain = SentenceUnit::new("检查", vec![WordUnit::new(0, "检查", "v")]);
        let extraction = extractor.extract_parsed(plain, ExtractionContext::new());
        assert_eq!(extraction.stats.foreign_tagset, 0);
    }

    #[test]
    fn test_stats_merge() {
        let mut total = ExtractionStats::default();
        let mut one = ExtractionStats {
            sentences: 1,
            triples: 2,
            foreign_tagset: 1,
            ..Default::default()
        };
        one.by_rule.insert(RuleKind::Coordination, 2);
        total.merge(&one);
        total.merge(&one);
        assert_eq!(total.sentences, 2);
        assert_eq!(total.by_rule[&RuleKind::Coordination], 4);
        assert_eq!(total.foreign_tagset, 2);
    }
}
