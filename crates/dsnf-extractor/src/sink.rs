//! Output sinks
//!
//! Triples are persisted one record at a time, append-only. The record shape
//! is flat so downstream loaders need nothing from this crate to read it.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dsnf_core::{DsnfError, Result};

use crate::{RuleKind, Triple, TripleSink};

/// One persisted triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripleRecord {
    pub sequence_id: u64,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    /// Predicate implied by tree structure ("is", "has") rather than a word
    #[serde(default)]
    pub structural: bool,
    pub rule: RuleKind,
    /// Source sentence text
    pub sentence: String,
    pub extracted_at: DateTime<Utc>,
}

impl From<&Triple> for TripleRecord {
    fn from(triple: &Triple) -> Self {
        Self {
            sequence_id: triple.sequence_id,
            subject: triple.subject.lemma.clone(),
            predicate: triple.predicate.text.clone(),
            object: triple.object.lemma.clone(),
            structural: triple.predicate.is_structural(),
            rule: triple.rule,
            sentence: triple.sentence_text().to_string(),
            extracted_at: Utc::now(),
        }
    }
}

// ============================================================================
// JSON Lines
// ============================================================================

/// Writes one JSON object per line
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl JsonlSink<BufWriter<File>> {
    /// Open `path` for appending, creating it if needed
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> TripleSink for JsonlSink<W> {
    fn write(&mut self, triple: &Triple) -> Result<()> {
        let record = TripleRecord::from(triple);
        serde_json::to_writer(&mut self.writer, &record)
            .map_err(|e| DsnfError::Sink(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<TripleRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TripleSink for MemorySink {
    fn write(&mut self, triple: &Triple) -> Result<()> {
        self.records.push(TripleRecord::from(triple));
        Ok(())
    }
}
