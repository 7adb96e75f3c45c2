use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::PhonoError;
use crate::phonetics::rules::tokenize;
use crate::phonetics::token::{render, Token};

/// Notation a raw pronunciation is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Source {
    /// Merriam-Webster respelling
    #[serde(rename = "mw")]
    MerriamWebster,
    /// Oxford English Dictionary pseudo-IPA
    #[default]
    #[serde(rename = "oed")]
    Oxford,
    /// Canonical notation entered by hand
    #[serde(rename = "internal")]
    Internal,
}

impl Source {
    pub fn is_external(self) -> bool {
        !matches!(self, Source::Internal)
    }

    pub fn name(self) -> &'static str {
        match self {
            Source::MerriamWebster => "Merriam-Webster",
            Source::Oxford => "Oxford English Dictionary",
            Source::Internal => "Internal",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::MerriamWebster => "mw",
            Source::Oxford => "oed",
            Source::Internal => "internal",
        })
    }
}

impl FromStr for Source {
    type Err = PhonoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mw" | "merriam-webster" => Ok(Source::MerriamWebster),
            "oed" | "oxford" => Ok(Source::Oxford),
            "internal" | "user" => Ok(Source::Internal),
            _ => Err(PhonoError::UnknownSource(s.to_string())),
        }
    }
}

/// Tokenized pronunciation with its flattened canonical text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronunciation {
    pub tokens: Vec<Token>,
    pub text: String,
}

impl Pronunciation {
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let text = render(&tokens);
        Pronunciation { tokens, text }
    }
}

/// A dictionary entry as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub spelling: String,
    pub pronunciation: Option<Pronunciation>,
    /// Part of speech
    pub part: String,
    pub definitions: Vec<String>,
    /// Audio reference, empty if none
    pub audio: String,
    pub source: Source,
}

impl Entry {
    /// Tokenize `raw` and build an entry. An empty pronunciation yields an
    /// entry without one.
    pub fn new(spelling: &str, raw: &str, source: Source) -> Self {
        let tokens = tokenize(spelling, raw, source);
        Entry {
            spelling: spelling.to_string(),
            pronunciation: if tokens.is_empty() {
                None
            } else {
                Some(Pronunciation::from_tokens(tokens))
            },
            part: String::new(),
            definitions: Vec::new(),
            audio: String::new(),
            source,
        }
    }

    pub fn from_record(record: &EntryRecord) -> Self {
        let mut entry = Entry::new(
            &record.word,
            record.pronunciation.as_deref().unwrap_or(""),
            record.source,
        );
        entry.part = record.part.clone().unwrap_or_default();
        entry.definitions = record
            .definitions
            .iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        entry.audio = record.audio.clone().unwrap_or_default();
        entry
    }

    pub fn tokens(&self) -> &[Token] {
        self.pronunciation.as_ref().map(|p| p.tokens.as_slice()).unwrap_or(&[])
    }

    pub fn has_pronunciation(&self) -> bool {
        !self.tokens().is_empty()
    }
}

/// Untokenized entry as supplied by a dictionary collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub word: String,
    #[serde(default)]
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub part: Option<String>,
    #[serde(default)]
    pub definitions: Vec<String>,
    #[serde(default)]
    pub audio: Option<String>,
}

/// Tokenize many records in parallel. Output order follows input order.
pub fn tokenize_batch(records: &[EntryRecord]) -> Vec<Entry> {
    records.par_iter().map(Entry::from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(word: &str, pron: &str, source: Source) -> EntryRecord {
        EntryRecord {
            word: word.to_string(),
            pronunciation: Some(pron.to_string()),
            source,
            part: None,
            definitions: vec![],
            audio: None,
        }
    }

    #[test]
    fn test_source_parse() {
        assert_eq!("mw".parse::<Source>(), Ok(Source::MerriamWebster));
        assert_eq!("OED".parse::<Source>(), Ok(Source::Oxford));
        assert_eq!(" user ".parse::<Source>(), Ok(Source::Internal));
        assert_eq!(
            "ipa".parse::<Source>(),
            Err(PhonoError::UnknownSource("ipa".to_string()))
        );
    }

    #[test]
    fn test_source_display_roundtrip() {
        for s in [Source::MerriamWebster, Source::Oxford, Source::Internal] {
            assert_eq!(s.to_string().parse::<Source>(), Ok(s));
        }
        assert!(Source::Oxford.is_external());
        assert_eq!(Source::MerriamWebster.name(), "Merriam-Webster");
        assert!(!Source::Internal.is_external());
    }

    #[test]
    fn test_source_serde_names() {
        assert_eq!(serde_json::to_string(&Source::MerriamWebster).unwrap(), "\"mw\"");
        let s: Source = serde_json::from_str("\"internal\"").unwrap();
        assert_eq!(s, Source::Internal);
    }

    #[test]
    fn test_entry_new_tokenizes() {
        let e = Entry::new("cat", "ˈkæt", Source::Internal);
        let p = e.pronunciation.as_ref().unwrap();
        assert_eq!(p.text, "ˈkæt");
        assert_eq!(p.tokens.len(), 4);
        assert!(e.has_pronunciation());
    }

    #[test]
    fn test_entry_without_pronunciation() {
        let e = Entry::new("hmm", "", Source::Oxford);
        assert!(e.pronunciation.is_none());
        assert!(e.tokens().is_empty());
    }

    #[test]
    fn test_entry_from_record() {
        let mut r = record("cat", "ˈkat", Source::Oxford);
        r.part = Some("noun".into());
        r.definitions = vec!["  a small feline ".into(), "   ".into()];
        let e = Entry::from_record(&r);
        assert_eq!(e.part, "noun");
        assert_eq!(e.definitions, vec!["a small feline".to_string()]);
        assert_eq!(e.source, Source::Oxford);
    }

    #[test]
    fn test_record_defaults_from_json() {
        let r: EntryRecord = serde_json::from_str(r#"{"word": "ox"}"#).unwrap();
        assert_eq!(r.source, Source::Oxford);
        assert!(r.pronunciation.is_none());
        assert!(r.definitions.is_empty());
    }

    #[test]
    fn test_tokenize_batch_preserves_order() {
        let records: Vec<EntryRecord> = ["bat", "cat", "mat", "sat"]
            .iter()
            .map(|w| record(w, &format!("ˈ{}æt", &w[..1]), Source::Internal))
            .collect();
        let entries = tokenize_batch(&records);
        let words: Vec<&str> = entries.iter().map(|e| e.spelling.as_str()).collect();
        assert_eq!(words, vec!["bat", "cat", "mat", "sat"]);
        assert_eq!(entries[3].pronunciation.as_ref().unwrap().text, "ˈsæt");
    }

    #[test]
    fn test_entry_serde_roundtrip() {
        let e = Entry::new("cat", "ˈkæt", Source::Internal);
        let json = serde_json::to_string(&e).unwrap();
        let e2: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(e, e2);
    }
}
