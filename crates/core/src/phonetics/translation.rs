//! Substring translation tables for the external pseudo-IPA notations.
//!
//! Each table maps a source substring to either a literal replacement or a
//! list of candidates guarded by the physical spelling of the word. Lookup is
//! longest-match-first, non-overlapping, left to right: keys are sorted by
//! descending length once at construction and the first key matching at a
//! position wins.

use unicode_normalization::UnicodeNormalization;

use super::token::Token;

/// One guarded replacement candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub to: &'static str,
    /// Skip this candidate if the spelling contains any of these.
    pub unless: &'static [&'static str],
    /// If non-empty, the spelling must contain at least one of these.
    pub requires: &'static [&'static str],
}

impl Candidate {
    pub fn applies(&self, word: &str) -> bool {
        if self.unless.iter().any(|p| word.contains(p)) {
            return false;
        }
        self.requires.is_empty() || self.requires.iter().any(|p| word.contains(p))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    Literal(&'static str),
    Conditional(Vec<Candidate>),
}

impl Replacement {
    /// Replacement text for a match of `key` in a word spelled `word`. A
    /// conditional with no applicable candidate leaves the key untouched.
    pub fn resolve<'a>(&'a self, key: &'a str, word: &str) -> &'a str {
        match self {
            Replacement::Literal(to) => *to,
            Replacement::Conditional(candidates) => candidates
                .iter()
                .find(|c| c.applies(word))
                .map(|c| c.to)
                .unwrap_or(key),
        }
    }
}

fn unless(to: &'static str, patterns: &'static [&'static str]) -> Replacement {
    Replacement::Conditional(vec![Candidate { to, unless: patterns, requires: &[] }])
}

fn requires(to: &'static str, patterns: &'static [&'static str]) -> Candidate {
    Candidate { to, unless: &[], requires: patterns }
}

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    chars: Vec<char>,
    replacement: Replacement,
}

/// A translation table with keys ordered for longest-match lookup.
#[derive(Debug, Clone)]
pub struct TranslationTable {
    entries: Vec<Entry>,
}

impl TranslationTable {
    pub fn new<K: AsRef<str>>(pairs: Vec<(K, Replacement)>) -> Self {
        let mut entries: Vec<Entry> = pairs
            .into_iter()
            .map(|(k, replacement)| {
                let key: String = k.as_ref().nfc().collect();
                let chars = key.chars().collect();
                Entry { key, chars, replacement }
            })
            .filter(|e| !e.chars.is_empty())
            .collect();
        // Stable: equal-length keys keep declaration order.
        entries.sort_by(|a, b| b.chars.len().cmp(&a.chars.len()));
        TranslationTable { entries }
    }

    /// Longest key matching `text` at `pos`, with its replacement.
    fn match_at(&self, text: &[char], pos: usize) -> Option<&Entry> {
        let rest = &text[pos..];
        self.entries.iter().find(|e| rest.starts_with(&e.chars))
    }
}

/// Apply `table` to a run of single-character tokens.
///
/// Untouched tokens are moved through as-is. Each replacement is split into
/// one unclassified token per character, all carrying the stress of the token
/// at the start of the match. Input containing a token whose text is not a
/// single character is returned unchanged.
pub fn translate(tokens: Vec<Token>, word: &str, table: &TranslationTable) -> Vec<Token> {
    if !tokens.iter().all(|t| t.instance.canonical.chars().count() == 1) {
        log::warn!("Attempting to translate tokens that are not single characters");
        return tokens;
    }

    let text: Vec<char> = tokens
        .iter()
        .filter_map(|t| t.instance.canonical.chars().next())
        .collect();

    let mut out = Vec::with_capacity(tokens.len());
    let mut input = tokens.into_iter().enumerate().peekable();

    while let Some(&(pos, _)) = input.peek() {
        let Some(entry) = table.match_at(&text, pos) else {
            if let Some((_, token)) = input.next() {
                out.push(token);
            }
            continue;
        };

        let matched: Vec<Token> = input.by_ref().take(entry.chars.len()).map(|(_, t)| t).collect();
        let stress = matched[0].stress();
        let value = entry.replacement.resolve(&entry.key, word);

        for c in value.chars() {
            let mut t = Token::literal(c);
            t.instance.stress = stress;
            out.push(t);
        }
    }

    out
}

lazy_static::lazy_static! {
    /// Merriam-Webster syllable delimiters and superscript schwa.
    pub static ref MW_STRIP: TranslationTable = TranslationTable::new(vec![
        ("ᵊ", Replacement::Literal("")),
        ("-", Replacement::Literal("")),
    ]);

    pub static ref MW: TranslationTable = TranslationTable::new(vec![
        ("ē", Replacement::Literal("i")),
        ("i", Replacement::Literal("ɪ")),
        ("ā", Replacement::Literal("e")),
        ("e", Replacement::Literal("ɛ")),
        ("a", Replacement::Literal("æ")),
        ("ər", Replacement::Literal("əː")),
        ("ü", Replacement::Literal("u")),
        ("yü", Replacement::Literal("yu")),
        ("u\u{307}", Replacement::Literal("ʊ")),
        ("ō", Replacement::Literal("o")),
        ("ȯ", Replacement::Literal("ɔ")),
        ("ȯr", Replacement::Literal("ɔr")),
        ("ä", Replacement::Literal("a")),
        ("är", Replacement::Literal("ar")),
        ("ī", Replacement::Literal("aɪ")),
        ("oi", Replacement::Literal("ɔɪ")),
        ("au\u{307}", Replacement::Literal("au")),
        ("ir", Replacement::Literal("iɚ")),
        ("er", Replacement::Literal("ɛɚ")),
        ("u\u{307}r", Replacement::Literal("ʊɚ")),
        ("oe", Replacement::Literal("eu\u{307}")),
        ("ue", Replacement::Literal("iu\u{307}")),
        // ē before ə is the iɚ of "deer", not a long e
        ("(ē)ə", unless("iɚ", &["ger", "jer"])),
        ("ēə", unless("iɚ", &["ger", "jer"])),
        ("k\u{320}", Replacement::Literal("k")),
        ("x", Replacement::Literal("ks")),
        ("sh", Replacement::Literal("ʃ")),
        ("ch", Replacement::Literal("tʃ")),
        ("t\u{35f}h", Replacement::Literal("θ")),
        ("th", Replacement::Literal("ð")),
        ("zh", Replacement::Literal("ʒ")),
        ("j", Replacement::Literal("dʒ")),
        ("hw", Replacement::Literal("wh")),
        ("(h)w", Replacement::Literal("wh")),
        ("ʸ", Replacement::Literal("y")),
    ]);

    pub static ref OED: TranslationTable = TranslationTable::new(vec![
        ("ᵻ", Replacement::Literal("ɪ")),
        ("eɪ", Replacement::Literal("e")),
        ("ər", Replacement::Literal("əː")),
        ("ʌː", Replacement::Literal("əː")),
        ("ü", Replacement::Literal("u")),
        ("jü", Replacement::Literal("yu")),
        ("uː", Replacement::Literal("ʊ")),
        ("oʊ", Replacement::Literal("o")),
        ("əu", Replacement::Literal("o")),
        ("əʊ", Replacement::Literal("o")),
        ("œ", Replacement::Literal("o")),
        ("ɑ", Replacement::Literal("a")),
        ("ɒ", Replacement::Literal("a")),
        ("ɑr", Replacement::Literal("ar")),
        ("ɑɪ", Replacement::Literal("aɪ")),
        ("ʌɪ", Replacement::Literal("aɪ")),
        ("ɔɪ", Replacement::Literal("ɔɪ")),
        ("ɑʊ", Replacement::Literal("au")),
        ("ɪ(ə)r", Replacement::Literal("iɚ")),
        ("ɛ(ə)r", Replacement::Literal("ɛɚ")),
        ("ʊ(ə)r", Replacement::Literal("ʊɚ")),
        ("ɔː", Replacement::Literal("ɔr")),
        ("aː", Replacement::Literal("a")),
        ("ɜr", Replacement::Literal("əː")),
        ("x", Replacement::Literal("ks")),
        ("(h)w", Replacement::Literal("wh")),
        ("(t)ʃ", Replacement::Literal("tʃ")),
        ("\u{261}", Replacement::Literal("g")),
        // OED writes both the "j" of "jam" and the "y" of "yes" as j
        ("j", Replacement::Conditional(vec![requires("dʒ", &["j"]), requires("y", &["y"])])),
    ]);

    /// Applied to both external notations after their own table.
    pub static ref EXTERNAL: TranslationTable = TranslationTable::new(vec![
        ("(j)u", unless("yu", &["ju"])),
        ("ju", unless("yu", &["ju"])),
        ("jʊ", unless("yu", &["ju"])),
        ("(j)ʊ", unless("yu", &["ju"])),
        ("yʊ", unless("yu", &["ju"])),
        ("ɪ(ə)", unless("iɚ", &["ger", "jer"])),
        ("i(ə)", unless("iɚ", &["ger", "jer"])),
        ("j(ə)", unless("iɚ", &["ger", "jer"])),
        ("ɪə", unless("iɚ", &["ger", "jer"])),
        ("iə", unless("iɚ", &["ger", "jer"])),
        ("jə", unless("iɚ", &["ger", "jer"])),
        ("ɛ(ə)", Replacement::Literal("ɛɚ")),
        ("ɛə", Replacement::Literal("ɛɚ")),
        ("ɛrə", Replacement::Literal("ɛɚ")),
        ("ʊ(ə)", Replacement::Literal("ʊɚ")),
        ("ʊə", Replacement::Literal("ʊɚ")),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonetics::token::{render, Stress};

    fn seed(text: &str) -> Vec<Token> {
        text.chars().map(Token::literal).collect()
    }

    #[test]
    fn test_longest_match_wins() {
        let table = TranslationTable::new(vec![
            ("k", Replacement::Literal("K")),
            ("kl", Replacement::Literal("Q")),
        ]);
        assert_eq!(render(&translate(seed("kl"), "", &table)), "Q");
        assert_eq!(render(&translate(seed("ka"), "", &table)), "Ka");
    }

    #[test]
    fn test_translations_do_not_stack() {
        let table = TranslationTable::new(vec![
            ("e", Replacement::Literal("ɛ")),
            ("es", Replacement::Literal("e")),
        ]);
        assert_eq!(render(&translate(seed("tes"), "", &table)), "te");
    }

    #[test]
    fn test_replacement_split_per_character() {
        let out = translate(seed("x"), "axe", &MW);
        assert_eq!(out.len(), 2);
        assert_eq!(render(&out), "ks");
        assert!(out.iter().all(|t| !t.known));
    }

    #[test]
    fn test_replacement_inherits_match_stress() {
        let mut tokens = seed("ab");
        tokens[0].instance.stress = Stress::PRIMARY;
        let table = TranslationTable::new(vec![("ab", Replacement::Literal("xyz"))]);
        let out = translate(tokens, "", &table);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|t| t.stress() == Stress::PRIMARY));
    }

    #[test]
    fn test_empty_replacement_removes_tokens() {
        let out = translate(seed("ˈbe-ᵊt"), "", &MW_STRIP);
        assert_eq!(render(&out), "ˈbet");
    }

    #[test]
    fn test_conditional_exception() {
        let out = translate(seed("iə"), "pier", &EXTERNAL);
        assert_eq!(render(&out), "iɚ");
        let out = translate(seed("iə"), "finger", &EXTERNAL);
        assert_eq!(render(&out), "iə");
    }

    #[test]
    fn test_conditional_requires_spelling() {
        assert_eq!(render(&translate(seed("j"), "jam", &OED)), "dʒ");
        assert_eq!(render(&translate(seed("j"), "yes", &OED)), "y");
        assert_eq!(render(&translate(seed("j"), "hallelujah", &OED)), "dʒ");
        assert_eq!(render(&translate(seed("j"), "unit", &OED)), "j");
    }

    #[test]
    fn test_combining_keys() {
        let out = translate(seed("fu\u{307}t"), "foot", &MW);
        assert_eq!(render(&out), "fʊt");
        let out = translate(seed("t\u{35f}hin"), "thin", &MW);
        assert_eq!(render(&out), "θɪn");
    }

    #[test]
    fn test_rejects_multi_character_tokens() {
        let mut tokens = seed("ab");
        tokens[0].instance.canonical = "aa".to_string();
        let out = translate(tokens.clone(), "", &MW);
        assert_eq!(out, tokens);
    }

    #[test]
    fn test_keys_sorted_longest_first() {
        let lens: Vec<usize> = OED.entries.iter().map(|e| e.chars.len()).collect();
        assert!(lens.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(OED.entries[0].key, "ɪ(ə)r");
    }
}
