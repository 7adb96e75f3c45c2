//! Fixed phonological ordering used to rank search results.

use std::collections::HashMap;

use crate::phonetics::token::Token;

/// Rank of an absent leading consonant; sorts before every consonant.
pub const NO_LEADING_CONSONANT: i32 = -1;
/// Rank of an absent trailing consonant; sorts after every consonant.
pub const NO_TRAILING_CONSONANT: i32 = 100;
/// Rank of a vowel missing from the table.
pub const UNRANKED_VOWEL: i32 = 99;

// front to back, then r-coloured and diphthongs
const VOWEL_ORDER: &[&str] = &[
    "i", "ɪ", "e", "ɛ", "æ", "ə", "ʌ", "əː", "u", "yu", "ʊ", "o", "ɔ", "ɔr", "a", "ar", "aɪ",
    "ɔɪ", "au", "iɚ", "ɛɚ", "ʊɚ",
];

const CONSONANT_ORDER: &[&str] = &[
    "m", "p", "b", "n", "t", "d", "k", "kw", "g", "f", "v", "l", "ntl", "r", "s", "z", "ʃ", "tʃ",
    "θ", "ð", "ʒ", "dʒ", "h", "w", "wh", "y",
];

lazy_static::lazy_static! {
    static ref VOWEL_RANK: HashMap<&'static str, i32> = VOWEL_ORDER
        .iter()
        .enumerate()
        .map(|(i, v)| (*v, i as i32))
        .collect();
    static ref CONSONANT_RANK: HashMap<&'static str, i32> = CONSONANT_ORDER
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, i as i32))
        .collect();
}

pub fn vowel_rank(token: &Token) -> i32 {
    VOWEL_RANK.get(token.id.as_str()).copied().unwrap_or(UNRANKED_VOWEL)
}

/// Rank of a consonant token by its id, `None` for anything else.
pub fn consonant_rank(token: &Token) -> Option<i32> {
    if !token.is_consonant() {
        return None;
    }
    CONSONANT_RANK.get(token.id.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonetics::known::{find_known, known_tokens};

    #[test]
    fn test_every_known_vowel_is_ranked() {
        for t in known_tokens().iter().filter(|t| t.is_vowel()) {
            assert_ne!(vowel_rank(t), UNRANKED_VOWEL, "{} unranked", t.id);
        }
    }

    #[test]
    fn test_every_known_consonant_is_ranked() {
        for t in known_tokens().iter().filter(|t| t.is_consonant()) {
            assert!(consonant_rank(t).is_some(), "{} unranked", t.id);
        }
    }

    #[test]
    fn test_cluster_ranks_as_its_class() {
        let mut cluster = find_known("kl").unwrap().clone();
        cluster.instance.canonical = "kl".to_string();
        assert_eq!(consonant_rank(&cluster), consonant_rank(find_known("k").unwrap()));
    }

    #[test]
    fn test_vowels_are_not_consonant_ranked() {
        assert_eq!(consonant_rank(find_known("i").unwrap()), None);
        assert!(vowel_rank(find_known("i").unwrap()) < vowel_rank(find_known("æ").unwrap()));
    }
}
