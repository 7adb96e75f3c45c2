pub mod ordering;
pub mod pattern;

use std::cmp::Ordering;

use crate::phonetics::token::{get_primary_stressed, Stress, Token};
use crate::types::Entry;

use self::ordering::{consonant_rank, vowel_rank, NO_LEADING_CONSONANT, NO_TRAILING_CONSONANT};
pub use self::pattern::{format_pattern, pattern_from_tokens, CompiledPattern, PatternElement};

/// Default cap on returned entries.
pub const MAX_RESULTS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub max_results: usize,
    /// Spelling that is always returned first when present in the corpus.
    pub exact: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_results: MAX_RESULTS,
            exact: None,
        }
    }
}

/// Sort key of a match. Field order is comparison order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    vowels: Vec<i32>,
    leading: i32,
    trailing: i32,
}

impl RankKey {
    fn new(primary: &[Token]) -> Self {
        RankKey {
            vowels: primary
                .iter()
                .filter(|t| t.is_vowel())
                .map(vowel_rank)
                .collect(),
            leading: primary
                .first()
                .and_then(consonant_rank)
                .unwrap_or(NO_LEADING_CONSONANT),
            trailing: primary
                .last()
                .and_then(consonant_rank)
                .unwrap_or(NO_TRAILING_CONSONANT),
        }
    }
}

/// Find corpus entries whose primary-stressed run matches `pattern`, ranked
/// by vowel then leading then trailing consonant.
///
/// An empty pattern selects entries without a pronunciation. Entries with a
/// pronunciation but no primary stress are skipped.
pub fn search<'a>(
    pattern: &[PatternElement],
    corpus: &'a [Entry],
    options: &SearchOptions,
) -> Vec<&'a Entry> {
    let compiled = CompiledPattern::new(pattern);
    let exact = options.exact.as_deref().map(str::to_lowercase);

    let mut hits: Vec<(bool, RankKey, &Entry)> = Vec::new();
    for entry in corpus {
        let is_exact = exact
            .as_deref()
            .is_some_and(|e| entry.spelling.to_lowercase() == e);
        let tokens = entry.tokens();

        let primary = if tokens.is_empty() {
            Vec::new()
        } else if !tokens.iter().any(|t| t.stress().contains(Stress::PRIMARY)) {
            log::warn!("{} has no primary stress, skipping", entry.spelling);
            if is_exact {
                hits.push((true, RankKey::new(&[]), entry));
            }
            continue;
        } else {
            get_primary_stressed(tokens)
        };

        let matched = if compiled.is_empty() {
            tokens.is_empty()
        } else {
            !tokens.is_empty() && compiled.matches(&primary)
        };
        if matched || is_exact {
            hits.push((is_exact, RankKey::new(&primary), entry));
        }
    }

    hits.sort_by(|a, b| match (a.0, b.0) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.1.cmp(&b.1),
    });

    log::debug!(
        "Pattern {} matched {} of {} entries",
        format_pattern(pattern),
        hits.len(),
        corpus.len()
    );

    hits.into_iter()
        .take(options.max_results)
        .map(|(_, _, entry)| entry)
        .collect()
}

/// Search for entries that sound like an existing entry's stressed syllables.
pub fn search_like<'a>(
    entry: &Entry,
    corpus: &'a [Entry],
    options: &SearchOptions,
) -> Vec<&'a Entry> {
    let pattern = pattern_from_tokens(entry.tokens());
    search(&pattern, corpus, options)
}
