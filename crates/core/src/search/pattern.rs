//! Phoneme patterns and how they match a primary-stressed run.
//!
//! A pattern `[e1, e2, ..]` reads as `* e1 * e2 ..` where each `*` skips any
//! number of consonants but no vowel. The whole run must be consumed when the
//! pattern ends. A trailing [`PatternElement::Undefined`] instead swallows the
//! rest of the run as long as it holds at most one vowel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PhonoError;
use crate::phonetics::known::find_known;
use crate::phonetics::token::{get_primary_stressed, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternElement {
    /// A known vowel or consonant, by id
    Phoneme(String),
    /// Matches nothing; after the last vowel it means "no trailing consonant"
    Empty,
    /// Any consonants and at most one vowel, up to the end of the run
    Undefined,
}

impl FromStr for PatternElement {
    type Err = PhonoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "*" => Ok(PatternElement::Undefined),
            "" | "-" | "none" => Ok(PatternElement::Empty),
            text => find_known(text)
                .filter(|t| matches!(t.kind, TokenKind::Vowel | TokenKind::Consonant))
                .map(|t| PatternElement::Phoneme(t.id.clone()))
                .ok_or_else(|| PhonoError::UnknownPhoneme(text.to_string())),
        }
    }
}

impl fmt::Display for PatternElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternElement::Phoneme(id) => f.write_str(id),
            PatternElement::Empty => f.write_str("-"),
            PatternElement::Undefined => f.write_str("*"),
        }
    }
}

#[derive(Debug, Clone)]
enum Compiled {
    Phoneme(Token),
    Empty,
    Undefined,
}

/// A pattern with its phoneme ids resolved against the known-token table.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    elements: Vec<Compiled>,
}

impl CompiledPattern {
    pub fn new(pattern: &[PatternElement]) -> Self {
        if let Some(pos) = pattern.iter().position(|e| *e == PatternElement::Undefined) {
            if pos != pattern.len() - 1 {
                log::warn!(
                    "Pattern {} has a non-terminating undefined element",
                    format_pattern(pattern)
                );
            }
        }

        let elements = pattern
            .iter()
            .map(|e| match e {
                PatternElement::Phoneme(id) => match find_known(id) {
                    Some(known) => Compiled::Phoneme(known.clone()),
                    None => {
                        log::warn!("Pattern element {} has no matching known token", id);
                        Compiled::Phoneme(Token::new(&[id.as_str()], TokenKind::Unknown, false, false))
                    }
                },
                PatternElement::Empty => Compiled::Empty,
                PatternElement::Undefined => Compiled::Undefined,
            })
            .collect();
        CompiledPattern { elements }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Match against a primary-stressed run (stress marks already removed).
    pub fn matches(&self, primary: &[Token]) -> bool {
        let mut cursor = 0;

        for element in &self.elements {
            match element {
                Compiled::Undefined => {
                    let vowels = primary[cursor..].iter().filter(|t| t.is_vowel()).count();
                    return vowels <= 1;
                }
                Compiled::Empty => {}
                Compiled::Phoneme(target) => loop {
                    let Some(t) = primary.get(cursor) else {
                        return false;
                    };
                    cursor += 1;
                    if t.equals_token(target) {
                        break;
                    }
                    if t.is_vowel() {
                        return false;
                    }
                },
            }
        }

        cursor == primary.len()
    }
}

/// Build a query that finds words sounding like `tokens`: the vowels of the
/// primary run, then its last consonant or the empty marker. Unclassified
/// tokens after the last vowel or consonant (a length mark, say) end the
/// query with an undefined element so the source still matches itself.
pub fn pattern_from_tokens(tokens: &[Token]) -> Vec<PatternElement> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let primary = get_primary_stressed(tokens);
    let mut pattern: Vec<PatternElement> = primary
        .iter()
        .filter(|t| t.is_vowel())
        .map(|t| PatternElement::Phoneme(t.id.clone()))
        .collect();

    let last = primary.iter().rposition(|t| t.is_vowel() || t.is_consonant());
    let trailing_unknown = last.map_or(!primary.is_empty(), |i| i + 1 < primary.len());
    match last.map(|i| &primary[i]) {
        Some(t) if t.is_consonant() => {
            pattern.push(PatternElement::Phoneme(t.id.clone()));
            if trailing_unknown {
                pattern.push(PatternElement::Undefined);
            }
        }
        _ if trailing_unknown => pattern.push(PatternElement::Undefined),
        _ => pattern.push(PatternElement::Empty),
    }
    pattern
}

/// Render a pattern the way it is typed: `* e1 * e2`.
pub fn format_pattern(pattern: &[PatternElement]) -> String {
    pattern
        .iter()
        .map(|e| match e {
            PatternElement::Undefined => "*".to_string(),
            PatternElement::Empty => "-".to_string(),
            other => format!("* {}", other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonetics::rules::tokenize;
    use crate::types::Source;

    fn primary(pron: &str) -> Vec<Token> {
        get_primary_stressed(&tokenize("", pron, Source::Internal))
    }

    fn pattern(items: &[&str]) -> CompiledPattern {
        let elements: Vec<PatternElement> = items.iter().map(|s| s.parse().unwrap()).collect();
        CompiledPattern::new(&elements)
    }

    #[test]
    fn test_parse_elements() {
        assert_eq!("*".parse::<PatternElement>(), Ok(PatternElement::Undefined));
        assert_eq!("-".parse::<PatternElement>(), Ok(PatternElement::Empty));
        assert_eq!("none".parse::<PatternElement>(), Ok(PatternElement::Empty));
        assert_eq!("æ".parse::<PatternElement>(), Ok(PatternElement::Phoneme("æ".into())));
        assert_eq!("str".parse::<PatternElement>(), Ok(PatternElement::Phoneme("s".into())));
        assert_eq!(
            "q".parse::<PatternElement>(),
            Err(PhonoError::UnknownPhoneme("q".into()))
        );
        assert!("ˈ".parse::<PatternElement>().is_err());
    }

    #[test]
    fn test_single_vowel_is_anchored() {
        let p = pattern(&["i"]);
        assert!(p.matches(&primary("ˈbi")));
        assert!(p.matches(&primary("ˈi")));
        assert!(p.matches(&primary("əˈbi")));
        assert!(!p.matches(&primary("ˈbit")));
        assert!(!p.matches(&primary("ˈbiə")));
        assert!(!p.matches(&primary("ˈbæ")));
    }

    #[test]
    fn test_consonants_are_skipped_vowels_are_not() {
        let p = pattern(&["æ", "t"]);
        assert!(p.matches(&primary("ˈkæt")));
        assert!(p.matches(&primary("ˈkænt")));
        assert!(!p.matches(&primary("ˈkæp")));
        assert!(!p.matches(&primary("ˈkæət")));
    }

    #[test]
    fn test_cluster_matches_its_class() {
        let p = pattern(&["k", "æ", "-"]);
        assert!(p.matches(&primary("ˈklæ")));
    }

    #[test]
    fn test_empty_marker_means_no_tail() {
        let p = pattern(&["æ", "-"]);
        assert!(p.matches(&primary("ˈkæ")));
        assert!(!p.matches(&primary("ˈkæt")));
    }

    #[test]
    fn test_trailing_undefined_allows_one_vowel() {
        let p = pattern(&["æ", "*"]);
        assert!(p.matches(&primary("ˈkæ")));
        assert!(p.matches(&primary("ˈkætəl")));
        assert!(!p.matches(&primary("ˈkætələ")));
    }

    #[test]
    fn test_pattern_from_tokens() {
        let tokens = tokenize("cattle", "ˈkætəl", Source::Internal);
        let p = pattern_from_tokens(&tokens);
        assert_eq!(
            p,
            vec![
                PatternElement::Phoneme("æ".into()),
                PatternElement::Phoneme("ə".into()),
                PatternElement::Phoneme("l".into()),
            ]
        );
        assert!(CompiledPattern::new(&p).matches(&get_primary_stressed(&tokens)));

        let tokens = tokenize("bee", "ˈbi", Source::Internal);
        assert_eq!(pattern_from_tokens(&tokens).last(), Some(&PatternElement::Empty));
        assert!(pattern_from_tokens(&[]).is_empty());
    }

    #[test]
    fn test_pattern_from_tokens_with_length_mark() {
        let tokens = tokenize("bee", "ˈbiː", Source::Oxford);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Unknown));
        let p = pattern_from_tokens(&tokens);
        assert_eq!(
            p,
            vec![PatternElement::Phoneme("i".into()), PatternElement::Undefined]
        );
        assert!(CompiledPattern::new(&p).matches(&get_primary_stressed(&tokens)));

        let tokens = tokenize("beat", "ˈbiːtː", Source::Oxford);
        let p = pattern_from_tokens(&tokens);
        assert_eq!(
            p,
            vec![
                PatternElement::Phoneme("i".into()),
                PatternElement::Phoneme("t".into()),
                PatternElement::Undefined,
            ]
        );
        assert!(CompiledPattern::new(&p).matches(&get_primary_stressed(&tokens)));
    }

    #[test]
    fn test_unknown_id_falls_back_to_text() {
        let p = CompiledPattern::new(&[PatternElement::Phoneme("ɑ".into())]);
        assert!(p.matches(&primary("ˈɑ")));
    }

    #[test]
    fn test_format_pattern() {
        let p = vec![
            PatternElement::Phoneme("æ".into()),
            PatternElement::Undefined,
        ];
        assert_eq!(format_pattern(&p), "* æ *");
    }
}
