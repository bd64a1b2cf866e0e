//! Core domain types for the wortschatz vocabulary dataset.

use serde::{Deserialize, Serialize};

use crate::error::WortschatzError;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// A proficiency tier. Each level owns one record store file (`<level>.json`)
/// and one base lemma file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Level {
    /// All six levels, lowest first.
    pub const ALL: [Level; 6] = [
        Level::A1,
        Level::A2,
        Level::B1,
        Level::B2,
        Level::C1,
        Level::C2,
    ];

    /// The level tag as it appears in file names (`A1` .. `C2`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
            Level::C1 => "C1",
            Level::C2 => "C2",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = WortschatzError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A1" => Ok(Level::A1),
            "A2" => Ok(Level::A2),
            "B1" => Ok(Level::B1),
            "B2" => Ok(Level::B2),
            "C1" => Ok(Level::C1),
            "C2" => Ok(Level::C2),
            other => Err(WortschatzError::validation(format!(
                "unknown level tag '{other}' (expected one of A1, A2, B1, B2, C1, C2)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// TextPair
// ---------------------------------------------------------------------------

/// A translatable sub-entry: German source text paired with its English
/// translation. Examples and synonyms are both stored in this shape.
///
/// There is no "translated" flag. A pair is done iff `english` is non-empty
/// and not textually identical to `german` — the sentinel predicate must be
/// re-derivable from the record alone, because the record is the only thing
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TextPairRepr")]
pub struct TextPair {
    pub german: String,
    pub english: String,
}

impl TextPair {
    /// A pair whose translation has not been produced yet.
    pub fn untranslated(german: impl Into<String>) -> Self {
        let german = german.into();
        Self {
            english: german.clone(),
            german,
        }
    }

    /// The sentinel "needs work" predicate for sub-entries.
    pub fn needs_translation(&self) -> bool {
        self.english.is_empty() || self.english == self.german
    }
}

/// Accepted on-disk shapes for a [`TextPair`]. Early dataset revisions stored
/// synonyms as bare strings; those normalize to an untranslated pair at load
/// time instead of being special-cased at every access site.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextPairRepr {
    Pair {
        #[serde(default)]
        german: String,
        #[serde(default)]
        english: String,
    },
    Plain(String),
}

impl From<TextPairRepr> for TextPair {
    fn from(repr: TextPairRepr) -> Self {
        match repr {
            TextPairRepr::Pair { german, english } => TextPair { german, english },
            TextPairRepr::Plain(german) => TextPair {
                german,
                english: String::new(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// LexicalRecord
// ---------------------------------------------------------------------------

/// One vocabulary entry in a level's record store file.
///
/// Identity is the source `word` and never changes after creation. The
/// translation pipeline mutates `english`, `synonyms[i].english`, and
/// `examples[i].english`; the composition pipeline owns `composition` and
/// `decomposition_meaning`; everything else is written once at extraction.
///
/// Field names and ordering mirror the dataset files consumed by the app, so
/// serialization stays byte-stable across runs that change nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalRecord {
    pub word: String,

    #[serde(rename = "partOfSpeech", default = "default_part_of_speech")]
    pub part_of_speech: String,

    #[serde(default)]
    pub english: String,

    #[serde(default)]
    pub composition: Vec<String>,

    #[serde(rename = "decompositionMeaning", default)]
    pub decomposition_meaning: Vec<String>,

    #[serde(default)]
    pub frequency: Option<String>,

    #[serde(default)]
    pub connected_words: Vec<String>,

    #[serde(default)]
    pub synonyms: Vec<TextPair>,

    #[serde(default)]
    pub examples: Vec<TextPair>,

    #[serde(default)]
    pub etymology: Option<String>,

    #[serde(default)]
    pub compounds: Vec<String>,

    #[serde(default)]
    pub source_url: Option<String>,
}

fn default_part_of_speech() -> String {
    "unknown".into()
}

impl LexicalRecord {
    /// A minimal record carrying only its identity, with every optional field
    /// at its defined default.
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            part_of_speech: default_part_of_speech(),
            english: String::new(),
            composition: Vec::new(),
            decomposition_meaning: Vec::new(),
            frequency: None,
            connected_words: Vec::new(),
            synonyms: Vec::new(),
            examples: Vec::new(),
            etymology: None,
            compounds: Vec::new(),
            source_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// BaseEntry
// ---------------------------------------------------------------------------

/// One row of the classified lemma database — the input to bulk extraction.
/// Base files carry extra columns (article date, article type, frequency
/// class) that the pipeline does not consume; serde ignores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseEntry {
    pub lemma: String,

    #[serde(rename = "wortklasse", default)]
    pub word_class: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub level: Option<String>,
}

impl BaseEntry {
    /// Whether the lemma is a real word rather than an affix or symbol entry
    /// (`-ade`, `$`, …). Extraction only attempts real words.
    pub fn is_word(&self) -> bool {
        self.lemma.chars().next().is_some_and(|c| c.is_alphabetic())
    }
}
