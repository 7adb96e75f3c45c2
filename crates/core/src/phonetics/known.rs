//! The known-token table: every recognized vowel, consonant and stress mark.
//!
//! The first spelling of each entry is its id. Consonant entries list the
//! cluster spellings that coalesce into them (a /k/ entry also owns "kl" and
//! "kr"). No spelling may belong to two entries; duplicates are reported when
//! the table is first built.

use std::collections::{HashMap, HashSet};

use super::token::{Token, TokenKind, PRIMARY_MARK, SECONDARY_MARK};

const VOWELS: &[&str] = &[
    "i", "ɪ", "e", "ɛ", "æ", "ə", "əː", "ʌ", "u", "yu", "ʊ", "o", "ɔ", "ɔr", "a", "ar", "aɪ",
    "ɔɪ", "au", "iɚ", "ɛɚ", "ʊɚ",
];

const CONSONANTS: &[&[&str]] = &[
    &["m"],
    &["p", "pl", "pr"],
    &["b", "bl", "br"],
    &["n", "ŋ"],
    &["t", "tr"],
    &["d", "dr"],
    // "x" is translated to "ks" upstream
    &["k", "ks", "kl", "kr"],
    &["kw"],
    &["g", "gl", "gr"],
    &["f", "fl", "fr"],
    &["v"],
    &["l"],
    &["ntl", "n(t)l"],
    &["r"],
    &["s", "sm", "sp", "spl", "spr", "sn", "st", "str", "sk", "sl", "sw"],
    &["z"],
    &["ʃ"],
    &["tʃ"],
    &["θ", "θr"],
    &["ð"],
    &["ʒ"],
    &["dʒ"],
    &["h"],
    &["w"],
    &["wh"],
    &["y"],
];

lazy_static::lazy_static! {
    static ref KNOWN_TOKENS: Vec<Token> = build_table();

    static ref SPELLING_INDEX: HashMap<&'static str, usize> = {
        let mut index = HashMap::new();
        for (i, token) in KNOWN_TOKENS.iter().enumerate() {
            for spelling in &token.equivalents {
                index.entry(spelling.as_str()).or_insert(i);
            }
        }
        index
    };
}

fn build_table() -> Vec<Token> {
    let mut table: Vec<Token> = VOWELS
        .iter()
        .map(|v| Token::known(&[*v], TokenKind::Vowel))
        .collect();
    table.extend(CONSONANTS.iter().map(|c| Token::known(c, TokenKind::Consonant)));
    table.push(Token::known(&[PRIMARY_MARK], TokenKind::PrimaryStress));
    table.push(Token::known(&[SECONDARY_MARK], TokenKind::SecondaryStress));

    for dup in duplicate_spellings_in(&table) {
        log::warn!("Known tokens has duplicate spelling {}", dup);
    }
    table
}

fn duplicate_spellings_in(table: &[Token]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for spelling in table.iter().flat_map(|t| t.equivalents.iter()) {
        if !seen.insert(spelling.as_str()) {
            dups.push(spelling.clone());
        }
    }
    dups
}

/// All known tokens, vowels first, then consonants, then the two stress marks.
pub fn known_tokens() -> &'static [Token] {
    &KNOWN_TOKENS
}

/// Spellings claimed by more than one known token.
pub fn duplicate_spellings() -> Vec<String> {
    duplicate_spellings_in(&KNOWN_TOKENS)
}

/// Look up the known token owning `spelling`.
pub fn find_known(spelling: &str) -> Option<&'static Token> {
    SPELLING_INDEX.get(spelling).map(|&i| &KNOWN_TOKENS[i])
}

/// Look up the known token sharing any spelling with `token`.
pub fn find_known_token(token: &Token) -> Option<&'static Token> {
    token.equivalents.iter().find_map(|e| find_known(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_spellings() {
        assert!(duplicate_spellings().is_empty());
    }

    #[test]
    fn test_duplicate_detection() {
        let table = vec![
            Token::known(&["k", "ks"], TokenKind::Consonant),
            Token::known(&["ks"], TokenKind::Consonant),
        ];
        assert_eq!(duplicate_spellings_in(&table), vec!["ks".to_string()]);
    }

    #[test]
    fn test_table_partitions() {
        let table = known_tokens();
        assert_eq!(table.iter().filter(|t| t.is_vowel()).count(), VOWELS.len());
        assert_eq!(table.iter().filter(|t| t.is_consonant()).count(), CONSONANTS.len());
        assert_eq!(table.iter().filter(|t| t.kind.is_stress_mark()).count(), 2);
        assert!(table.iter().all(|t| t.known && !t.replace_canonical));
    }

    #[test]
    fn test_find_known_by_cluster_spelling() {
        let k = find_known("kr").unwrap();
        assert_eq!(k.id, "k");
        assert_eq!(k.kind, TokenKind::Consonant);
        assert_eq!(find_known("ˈ").unwrap().kind, TokenKind::PrimaryStress);
        assert!(find_known("q").is_none());
    }

    #[test]
    fn test_find_known_token() {
        let literal = Token::literal('ŋ');
        assert_eq!(find_known_token(&literal).unwrap().id, "n");
    }
}
