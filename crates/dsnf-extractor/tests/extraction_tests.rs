//! End-to-end extraction tests
//!
//! Sentences are supplied through a lookup parser so every case spells out
//! its dependency tree explicitly.

use std::collections::HashMap;

use dsnf_core::{DsnfError, Relation, Result, SentenceUnit, WordUnit};
use dsnf_extractor::{
    split_conll_document, ConllParser, DependencyParser, EntityDetector, EntityPair,
    ExtractionContext, Extractor, MatchContext, MemorySink, RuleKind, RuleSet, Triple,
    TripleSink,
};
use proptest::prelude::*;

/// Parser test double returning prepared trees by sentence text
#[derive(Default)]
struct LookupParser {
    sentences: HashMap<String, SentenceUnit>,
}

impl LookupParser {
    fn with(mut self, sentence: SentenceUnit) -> Self {
        self.sentences.insert(sentence.text.clone(), sentence);
        self
    }
}

impl DependencyParser for LookupParser {
    fn parse(&self, text: &str) -> Result<SentenceUnit> {
        self.sentences
            .get(text)
            .cloned()
            .ok_or_else(|| DsnfError::Parse(format!("no parse for {text:?}")))
    }
}

fn word(id: usize, lemma: &str, postag: &str, head: Option<usize>, relation: Relation) -> WordUnit {
    match head {
        Some(h) => WordUnit::new(id, lemma, postag).with_head(h, relation),
        None => WordUnit::new(id, lemma, postag),
    }
}

fn tuples(triples: &[Triple]) -> Vec<(u64, String, String, String, RuleKind)> {
    triples
        .iter()
        .map(|t| {
            (
                t.sequence_id,
                t.subject.lemma.clone(),
                t.predicate.text.clone(),
                t.object.lemma.clone(),
                t.rule,
            )
        })
        .collect()
}

/// W0 --SBV--> W1 <--VOB-- W2
fn svo(text: &str, subject: &str, verb: &str, object: &str) -> SentenceUnit {
    SentenceUnit::new(
        text,
        vec![
            word(0, subject, "ni", Some(1), Relation::Sbv),
            word(1, verb, "v", None, Relation::Hed),
            word(2, object, "ns", Some(1), Relation::Vob),
        ],
    )
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_subject_verb_object() {
    let parser = LookupParser::default().with(svo("s1", "海事局", "检查", "上海"));
    let mut extractor = Extractor::new(Box::new(parser));

    let triples = extractor.extract("s1").unwrap();
    assert_eq!(
        tuples(&triples),
        vec![(1, "海事局".into(), "检查".into(), "上海".into(), RuleKind::SbvVob)]
    );
    assert_eq!(triples[0].sentence_text(), "s1");
}

#[test]
fn test_too_many_entities_between() {
    // Five entities hang off the verb as independent structures between subject and object
    let mut words = vec![
        word(0, "海事局", "ni", Some(1), Relation::Sbv),
        word(1, "检查", "v", None, Relation::Hed),
    ];
    for (k, lemma) in ["甲", "乙", "丙", "丁", "戊"].iter().enumerate() {
        words.push(word(2 + k, lemma, "ns", Some(1), Relation::Is));
    }
    words.push(word(7, "上海", "ns", Some(1), Relation::Vob));
    let parser = LookupParser::default().with(SentenceUnit::new("s2", words));
    let mut extractor = Extractor::new(Box::new(parser));

    assert!(extractor.extract("s2").unwrap().is_empty());
    assert_eq!(extractor.context().next_sequence(), 1);
}

#[test]
fn test_same_lemma_entities() {
    let parser = LookupParser::default().with(svo("s3", "上海", "连接", "上海"));
    let mut extractor = Extractor::new(Box::new(parser));
    assert!(extractor.extract("s3").unwrap().is_empty());
}

#[test]
fn test_coordination_adds_second_triple() {
    let parser = LookupParser::default().with(SentenceUnit::new(
        "s4",
        vec![
            word(0, "海事局", "ni", Some(1), Relation::Sbv),
            word(1, "检查", "v", None, Relation::Hed),
            word(2, "上海", "ns", Some(1), Relation::Vob),
            word(3, "港务局", "ni", Some(0), Relation::Coo),
        ],
    ));
    let mut extractor = Extractor::new(Box::new(parser));

    let triples = extractor.extract("s4").unwrap();
    assert_eq!(
        tuples(&triples),
        vec![
            (1, "海事局".into(), "检查".into(), "上海".into(), RuleKind::SbvVob),
            (2, "港务局".into(), "检查".into(), "上海".into(), RuleKind::Coordination),
        ]
    );
}

#[test]
fn test_counter_spans_sentences() {
    let parser = LookupParser::default()
        .with(svo("first", "海事局", "检查", "上海"))
        .with(svo("second", "港务局", "管理", "天津"));
    let mut extractor = Extractor::new(Box::new(parser));

    let first = extractor.extract("first").unwrap();
    let second = extractor.extract("second").unwrap();
    assert_eq!(first[0].sequence_id, 1);
    assert_eq!(second[0].sequence_id, 2);
}

#[test]
fn test_independent_extractors_do_not_share_counters() {
    let parser = || Box::new(LookupParser::default().with(svo("s", "海事局", "检查", "上海")));
    let mut a = Extractor::new(parser());
    let mut b = Extractor::new(parser());

    a.extract("s").unwrap();
    a.extract("s").unwrap();
    assert_eq!(b.extract("s").unwrap()[0].sequence_id, 1);
    assert_eq!(a.context().next_sequence(), 3);
}

#[test]
fn test_overlapping_rules_are_kept() {
    // 海事局 对 船舶 进行 检查, with 船舶 also coordinated: rule 3 and rule 5 both fire
    let parser = LookupParser::default().with(SentenceUnit::new(
        "s",
        vec![
            word(0, "海事局", "ni", Some(3), Relation::Sbv),
            word(1, "对", "p", Some(3), Relation::Adv),
            word(2, "帆船", "n", Some(1), Relation::Pob),
            word(3, "进行", "v", None, Relation::Hed),
            word(4, "检查", "v", Some(3), Relation::Vob),
            word(5, "和", "c", Some(6), Relation::Lad),
            word(6, "机动船", "n", Some(2), Relation::Coo),
        ],
    ));
    let mut extractor = Extractor::new(Box::new(parser));
    let triples = extractor.extract("s").unwrap();

    let rules: Vec<RuleKind> = triples.iter().map(|t| t.rule).collect();
    assert_eq!(rules, vec![RuleKind::SubjectPobChain, RuleKind::Coordination]);
    assert_eq!(triples[1].object.lemma, "机动船");
    assert_eq!(triples[1].predicate.text, "进行检查");
}

// =============================================================================
// Document processing
// =============================================================================

const DOCUMENT: &str = "# text = 海事局检查船舶\n\
1\t海事局\t海事局\tni\tni\t_\t2\tSBV\t_\t_\n\
2\t检查\t检查\tv\tv\t_\t0\tHED\t_\t_\n\
3\t船舶\t船舶\tn\tn\t_\t2\tVOB\t_\t_\n\
\n\
# text = 坏句子\n\
1\t甲\t甲\tns\tns\t_\t2\tSBV\t_\t_\n\
2\t乙\t乙\tns\tns\t_\t1\tVOB\t_\t_\n\
\n\
# text = 帆船驶向上海\n\
1\t帆船\t帆船\tn\tn\t_\t2\tSBV\t_\t_\n\
2\t驶\t驶\tv\tv\t_\t0\tHED\t_\t_\n\
3\t向\t向\tp\tp\t_\t2\tCMP\t_\t_\n\
4\t上海\t上海\tns\tns\t_\t3\tPOB\t_\t_\n";

#[test]
fn test_document_skips_malformed_sentences() {
    let blocks = split_conll_document(DOCUMENT);
    assert_eq!(blocks.len(), 3);

    let mut extractor = Extractor::new(Box::new(ConllParser::new()));
    let mut sink = MemorySink::new();
    let report = extractor.extract_document(&blocks, &mut sink).unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.written, 2);
    assert_eq!(report.stats.sentences, 2);
    assert_eq!(report.stats.by_rule.get(&RuleKind::SbvCmpPob), Some(&1));

    let records: Vec<(u64, &str, &str, &str)> = sink
        .records
        .iter()
        .map(|r| {
            (
                r.sequence_id,
                r.subject.as_str(),
                r.predicate.as_str(),
                r.object.as_str(),
            )
        })
        .collect();
    assert_eq!(
        records,
        vec![(1, "海事局", "检查", "船舶"), (2, "帆船", "驶向", "上海")]
    );
    assert_eq!(sink.records[1].sentence, "帆船驶向上海");
    assert_eq!(extractor.context().next_sequence(), 3);
}

#[test]
fn test_document_resumes_from_context() {
    let blocks = split_conll_document(DOCUMENT);
    let mut extractor =
        Extractor::new(Box::new(ConllParser::new())).with_context(ExtractionContext::starting_at(100));
    let mut sink = MemorySink::new();
    extractor.extract_document(&blocks, &mut sink).unwrap();
    assert_eq!(sink.records[0].sequence_id, 100);
    assert_eq!(sink.records[1].sequence_id, 101);
}

/// Sink that accepts a fixed number of triples, then fails
struct FailingSink {
    capacity: usize,
    persisted: Vec<u64>,
}

impl TripleSink for FailingSink {
    fn write(&mut self, triple: &Triple) -> Result<()> {
        if self.persisted.len() == self.capacity {
            return Err(DsnfError::Sink("disk full".to_string()));
        }
        self.persisted.push(triple.sequence_id);
        Ok(())
    }
}

const COORDINATED_SUBJECT: &str = "# text = 海事局港务局检查上海\n\
1\t海事局\t海事局\tni\tni\t_\t2\tSBV\t_\t_\n\
2\t检查\t检查\tv\tv\t_\t0\tHED\t_\t_\n\
3\t上海\t上海\tns\tns\t_\t2\tVOB\t_\t_\n\
4\t港务局\t港务局\tni\tni\t_\t1\tCOO\t_\t_\n";

#[test]
fn test_sink_failure_aborts_without_reusing_numbers() {
    let mut extractor = Extractor::new(Box::new(ConllParser::new()));
    let mut sink = FailingSink {
        capacity: 1,
        persisted: Vec::new(),
    };

    let blocks = [COORDINATED_SUBJECT, COORDINATED_SUBJECT];
    let err = extractor.extract_document(blocks, &mut sink).unwrap_err();
    assert!(matches!(err, DsnfError::Sink(_)));
    // The second sentence is never reached
    assert_eq!(sink.persisted, vec![1]);
    assert_eq!(extractor.context().next_sequence(), 3);

    let next = extractor.extract(COORDINATED_SUBJECT).unwrap();
    let ids: Vec<u64> = next.iter().map(|t| t.sequence_id).collect();
    assert_eq!(ids, vec![3, 4]);
    assert!(ids.iter().all(|id| !sink.persisted.contains(id)));
}

#[test]
fn test_foreign_tagset_document_writes_nothing() {
    let document = "# text = 张三管理公司\n\
1\t张三\t张三\tnr\tnr\t_\t2\tSBV\t_\t_\n\
2\t管理\t管理\tv\tv\t_\t0\tHED\t_\t_\n\
3\t公司\t公司\tnto\tnto\t_\t2\tVOB\t_\t_\n";
    let mut extractor = Extractor::new(Box::new(ConllParser::new()));
    let mut sink = MemorySink::new();
    let report = extractor
        .extract_document(split_conll_document(document), &mut sink)
        .unwrap();

    assert!(sink.records.is_empty());
    assert_eq!(report.skipped, 0);
    assert_eq!(report.stats.sentences, 1);
    assert_eq!(report.stats.foreign_tagset, 1);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_sequence_numbers_strictly_increase(picks in proptest::collection::vec(0usize..3, 1..12)) {
        let parser = LookupParser::default()
            .with(svo("a", "海事局", "检查", "上海"))
            .with(SentenceUnit::new(
                "b",
                vec![
                    word(0, "海事局", "ni", Some(1), Relation::Sbv),
                    word(1, "检查", "v", None, Relation::Hed),
                    word(2, "上海", "ns", Some(1), Relation::Vob),
                    word(3, "港务局", "ni", Some(0), Relation::Coo),
                ],
            ))
            .with(SentenceUnit::new("c", vec![word(0, "检查", "v", None, Relation::Hed)]));
        let mut extractor = Extractor::new(Box::new(parser));

        let mut last_seen = 0u64;
        for pick in picks {
            let text = ["a", "b", "c"][pick];
            let triples = extractor.extract(text).unwrap();
            for triple in &triples {
                prop_assert!(triple.sequence_id > last_seen);
                prop_assert_eq!(triple.sequence_id, last_seen + 1);
                last_seen = triple.sequence_id;
            }
        }
        prop_assert_eq!(extractor.context().next_sequence(), last_seen + 1);
    }
}

#[test]
fn test_rule_order_is_deterministic() {
    let sentence = SentenceUnit::new(
        "s",
        vec![
            word(0, "海事局", "ni", Some(1), Relation::Sbv),
            word(1, "检查", "v", None, Relation::Hed),
            word(2, "上海", "ns", Some(1), Relation::Vob),
            word(3, "港务局", "ni", Some(0), Relation::Coo),
        ],
    );
    let detector = EntityDetector::new();
    let ctx = MatchContext::new(&sentence, &detector);
    let rules = RuleSet::dsnf();
    let pair = EntityPair::new(&sentence.words[2], &sentence.words[3]);

    let first = rules.apply(&pair, &ctx);
    for _ in 0..5 {
        assert_eq!(rules.apply(&pair, &ctx), first);
    }
}

#[test]
fn test_entity_detection_is_idempotent() {
    let sentence = svo("s", "海事局", "检查", "上海");
    let detector = EntityDetector::new();
    let first: Vec<usize> = detector.get_entities(&sentence).iter().map(|w| w.id).collect();
    let second: Vec<usize> = detector.get_entities(&sentence).iter().map(|w| w.id).collect();
    assert_eq!(first, second);
    assert_eq!(first, vec![0, 2]);
}
