//! CoNLL parser adapter
//!
//! Reads sentences already processed by an external segmenter, tagger and
//! dependency parser, serialized one word per line in CoNLL-U / CoNLL-X
//! column order:
//!
//! ```text
//! # text = 海事局检查船舶
//! 1	海事局	海事局	ni	ni	NE=S-Ni	2	SBV	_	_
//! 2	检查	检查	v	v	_	0	HED	_	_
//! 3	船舶	船舶	n	n	_	2	VOB	_	_
//! ```
//!
//! IDs are 1-based and `HEAD` 0 marks the root. Multiword-token and empty-node
//! lines (`1-2`, `1.1`) are skipped.

use dsnf_core::{DsnfError, Relation, Result, SentenceUnit, WordUnit};

use crate::DependencyParser;

const MIN_COLUMNS: usize = 8;

/// Parses one CoNLL sentence block into a [`SentenceUnit`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConllParser;

impl ConllParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_line(&self, line_no: usize, line: &str, expected_id: usize) -> Result<Option<WordUnit>> {
        let columns: Vec<&str> = if line.contains('\t') {
            line.split('\t').collect()
        } else {
            line.split_whitespace().collect()
        };

        if columns.len() < MIN_COLUMNS {
            return Err(parse_error(
                line_no,
                format!("expected at least {MIN_COLUMNS} columns, found {}", columns.len()),
            ));
        }

        let raw_id = columns[0];
        if raw_id.contains('-') || raw_id.contains('.') {
            return Ok(None);
        }

        let id: usize = raw_id
            .parse()
            .map_err(|_| parse_error(line_no, format!("invalid word id {raw_id:?}")))?;
        if id != expected_id + 1 {
            return Err(parse_error(
                line_no,
                format!("word id {id} out of sequence, expected {}", expected_id + 1),
            ));
        }

        let form = columns[1];
        let lemma = non_empty(columns[2]).unwrap_or(form);
        let postag = non_empty(columns[4])
            .or_else(|| non_empty(columns[3]))
            .ok_or_else(|| parse_error(line_no, "missing postag".to_string()))?;
        let netag = named_entity_tag(columns[5]).unwrap_or("O");

        let head: usize = columns[6]
            .parse()
            .map_err(|_| parse_error(line_no, format!("invalid head {:?}", columns[6])))?;

        let mut word = WordUnit::new(id - 1, lemma, postag).with_netag(netag);
        word.relation = Relation::parse(columns[7]);
        word.head_id = head.checked_sub(1);

        Ok(Some(word))
    }
}

impl DependencyParser for ConllParser {
    fn parse(&self, text: &str) -> Result<SentenceUnit> {
        let mut words = Vec::new();
        let mut sentence_text = None;

        for (index, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                if let Some(value) = comment.trim_start().strip_prefix("text =") {
                    sentence_text = Some(value.trim().to_string());
                }
                continue;
            }
            if let Some(word) = self.parse_line(index + 1, line, words.len())? {
                words.push(word);
            }
        }

        if words.is_empty() {
            return Err(DsnfError::Parse("sentence block contains no words".to_string()));
        }

        let text = sentence_text
            .unwrap_or_else(|| words.iter().map(|w: &WordUnit| w.lemma.as_str()).collect());
        Ok(SentenceUnit::new(text, words))
    }
}

/// Split a CoNLL document into sentence blocks separated by blank lines
pub fn split_conll_document(document: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in document.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn non_empty(column: &str) -> Option<&str> {
    match column.trim() {
        "" | "_" => None,
        value => Some(value),
    }
}

/// `NE=` entry of the FEATS column
fn named_entity_tag(feats: &str) -> Option<&str> {
    feats
        .split('|')
        .find_map(|feat| feat.trim().strip_prefix("NE="))
        .filter(|tag| !tag.is_empty())
}

fn parse_error(line_no: usize, message: String) -> DsnfError {
    DsnfError::Parse(format!("line {line_no}: {message}"))
}
