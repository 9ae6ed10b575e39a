//! Parsed sentence models
//!
//! A [`SentenceUnit`] is the output contract of the linguistic pipeline:
//! an ordered list of [`WordUnit`]s whose head links form one rooted tree.
//! Extraction only reads these structures.

use serde::{Deserialize, Serialize};

use crate::StructuralError;

// ============================================================================
// Dependency Relations
// ============================================================================

/// Dependency relation labels (LTP scheme)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Relation {
    /// Subject-verb
    Sbv,
    /// Verb-object
    Vob,
    /// Indirect object
    Iob,
    /// Fronted object
    Fob,
    /// Pivot (double) construction
    Dbl,
    /// Attribute
    Att,
    /// Adverbial
    Adv,
    /// Complement
    Cmp,
    /// Coordination
    Coo,
    /// Preposition-object
    Pob,
    /// Left adjunct
    Lad,
    /// Right adjunct
    Rad,
    /// Independent structure
    Is,
    /// Punctuation
    Wp,
    /// Sentence head
    Hed,
    /// Any label outside the LTP set, kept verbatim
    Other(String),
}

impl Relation {
    /// Get the label as written by the parser
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sbv => "SBV",
            Self::Vob => "VOB",
            Self::Iob => "IOB",
            Self::Fob => "FOB",
            Self::Dbl => "DBL",
            Self::Att => "ATT",
            Self::Adv => "ADV",
            Self::Cmp => "CMP",
            Self::Coo => "COO",
            Self::Pob => "POB",
            Self::Lad => "LAD",
            Self::Rad => "RAD",
            Self::Is => "IS",
            Self::Wp => "WP",
            Self::Hed => "HED",
            Self::Other(label) => label,
        }
    }

    /// Parse a label; unknown labels are preserved as [`Relation::Other`]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "SBV" => Self::Sbv,
            "VOB" => Self::Vob,
            "IOB" => Self::Iob,
            "FOB" => Self::Fob,
            "DBL" => Self::Dbl,
            "ATT" => Self::Att,
            "ADV" => Self::Adv,
            "CMP" => Self::Cmp,
            "COO" => Self::Coo,
            "POB" => Self::Pob,
            "LAD" => Self::Lad,
            "RAD" => Self::Rad,
            "IS" => Self::Is,
            "WP" => Self::Wp,
            "HED" => Self::Hed,
            _ => Self::Other(label.trim().to_string()),
        }
    }
}

impl From<String> for Relation {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<Relation> for String {
    fn from(relation: Relation) -> Self {
        relation.as_str().to_string()
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Words
// ============================================================================

/// One token of a parsed sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordUnit {
    /// 0-based position in the sentence
    pub id: usize,

    /// Surface or base form
    pub lemma: String,

    /// Part-of-speech tag
    pub postag: String,

    /// Named-entity tag
    pub netag: String,

    /// Dependency label towards the head
    pub relation: Relation,

    /// Position of the governing word, `None` for the root
    pub head_id: Option<usize>,
}

impl WordUnit {
    /// Create a root word with no named-entity tag
    pub fn new(id: usize, lemma: impl Into<String>, postag: impl Into<String>) -> Self {
        Self {
            id,
            lemma: lemma.into(),
            postag: postag.into(),
            netag: "O".to_string(),
            relation: Relation::Hed,
            head_id: None,
        }
    }

    /// Attach this word to a head with the given relation
    pub fn with_head(mut self, head_id: usize, relation: Relation) -> Self {
        self.head_id = Some(head_id);
        self.relation = relation;
        self
    }

    /// Set the named-entity tag
    pub fn with_netag(mut self, netag: impl Into<String>) -> Self {
        self.netag = netag.into();
        self
    }

    pub fn is_root(&self) -> bool {
        self.head_id.is_none()
    }

    /// Whether this word hangs off `head` with `relation`
    pub fn depends_on(&self, head: &WordUnit, relation: &Relation) -> bool {
        self.head_id == Some(head.id) && &self.relation == relation
    }
}

impl std::fmt::Display for WordUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.lemma, self.postag)
    }
}

// ============================================================================
// Sentences
// ============================================================================

/// A parsed sentence: ordered words forming one dependency tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceUnit {
    /// Original sentence text
    pub text: String,

    /// Words in position order
    pub words: Vec<WordUnit>,
}

impl SentenceUnit {
    pub fn new(text: impl Into<String>, words: Vec<WordUnit>) -> Self {
        Self {
            text: text.into(),
            words,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Look up a word by position
    pub fn word(&self, id: usize) -> Option<&WordUnit> {
        self.words.get(id)
    }

    /// The root word, if the tree has one
    pub fn root(&self) -> Option<&WordUnit> {
        self.words.iter().find(|w| w.is_root())
    }

    /// Governing word of `word`
    pub fn head_of(&self, word: &WordUnit) -> Option<&WordUnit> {
        word.head_id.and_then(|id| self.word(id))
    }

    /// Governing word of `word`, only if attached with `relation`
    pub fn head_via(&self, word: &WordUnit, relation: &Relation) -> Option<&WordUnit> {
        if &word.relation == relation {
            self.head_of(word)
        } else {
            None
        }
    }

    /// Direct dependents of `word`, in position order
    pub fn children_of<'a>(&'a self, word: &WordUnit) -> impl Iterator<Item = &'a WordUnit> + 'a {
        let id = word.id;
        self.words.iter().filter(move |w| w.head_id == Some(id))
    }

    /// Direct dependents of `word` attached with `relation`
    pub fn children_with<'a>(
        &'a self,
        word: &WordUnit,
        relation: &'a Relation,
    ) -> impl Iterator<Item = &'a WordUnit> + 'a {
        self.children_of(word).filter(move |w| &w.relation == relation)
    }

    /// Words strictly between positions `from` and `to`
    pub fn words_between(&self, from: usize, to: usize) -> &[WordUnit] {
        let start = (from + 1).min(self.words.len());
        let end = to.min(self.words.len()).max(start);
        &self.words[start..end]
    }

    /// Check the tree invariants the extraction rules rely on
    pub fn validate(&self) -> Result<(), StructuralError> {
        if self.words.is_empty() {
            return Err(StructuralError::Empty);
        }

        let len = self.words.len();
        let mut roots = Vec::new();

        for (position, word) in self.words.iter().enumerate() {
            if word.id != position {
                return Err(StructuralError::IdMismatch {
                    position,
                    id: word.id,
                });
            }
            match word.head_id {
                None => roots.push(word.id),
                Some(head) if head >= len => {
                    return Err(StructuralError::HeadOutOfRange {
                        id: word.id,
                        head,
                        len,
                    })
                }
                Some(head) if head == word.id => return Err(StructuralError::SelfHead(word.id)),
                Some(_) => {}
            }
        }

        match roots.len() {
            0 => return Err(StructuralError::NoRoot),
            1 => {}
            _ => return Err(StructuralError::MultipleRoots(roots)),
        }

        // With a single root, every head chain reaches it in fewer than `len` steps
        for word in &self.words {
            let mut current = word;
            let mut steps = 0;
            while let Some(head) = current.head_id {
                steps += 1;
                if steps > len {
                    return Err(StructuralError::Cycle(word.id));
                }
                current = &self.words[head];
            }
        }

        Ok(())
    }
}
