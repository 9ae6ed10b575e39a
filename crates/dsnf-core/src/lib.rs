//! DSNF Core - Sentence models, error types and configuration
//!
//! This crate defines the shared abstractions used by the extraction crates:
//! - Parsed sentence models (words, dependency relations, sentence trees)
//! - Tree well-formedness validation
//! - Common error types
//! - Configuration management

pub mod config;
pub mod sentence;

pub use config::{AppConfig, ConfigError, EntityConfig, LoggingConfig, OutputConfig, PairingConfig};
pub use sentence::{Relation, SentenceUnit, WordUnit};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for DSNF operations
#[derive(Error, Debug)]
pub enum DsnfError {
    #[error("Malformed sentence tree: {0}")]
    Structural(#[from] StructuralError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output sink error: {0}")]
    Sink(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DsnfError>;

/// Well-formedness violations of a dependency tree
///
/// A sentence failing any of these checks is skipped by the extractor
/// rather than matched, since rule traversal assumes a rooted tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("sentence has no words")]
    Empty,

    #[error("word at position {position} carries id {id}")]
    IdMismatch { position: usize, id: usize },

    #[error("no root word")]
    NoRoot,

    #[error("multiple root words: {0:?}")]
    MultipleRoots(Vec<usize>),

    #[error("word {id} points at head {head} outside a sentence of {len} words")]
    HeadOutOfRange { id: usize, head: usize, len: usize },

    #[error("word {0} is its own head")]
    SelfHead(usize),

    #[error("head chain starting at word {0} contains a cycle")]
    Cycle(usize),
}
