//! The tokenization pipeline.
//!
//! A raw pronunciation is seeded as one unclassified token per character and
//! threaded through an ordered list of rules. Each rule takes the token buffer
//! by value and returns the new buffer; a rule only runs for the sources its
//! [`Applicability`] names. Rules never fail: configuration defects and odd
//! input are logged and the buffer passes through as best it can.

use unicode_normalization::UnicodeNormalization;

use super::known::{find_known, find_known_token, known_tokens};
use super::token::{render, Stress, Token, TokenInstance, TokenKind, PRIMARY_MARK, SECONDARY_MARK};
use super::translation::{translate, EXTERNAL, MW, MW_STRIP, OED};
use crate::types::Source;

/// Which sources a rule runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    All,
    /// Both external notations
    External,
    Only(Source),
}

impl Applicability {
    pub fn applies_to(self, source: Source) -> bool {
        match self {
            Applicability::All => true,
            Applicability::External => source.is_external(),
            Applicability::Only(s) => s == source,
        }
    }
}

pub type RuleFn = fn(Vec<Token>, &str) -> Vec<Token>;

pub struct Rule {
    pub applicability: Applicability,
    pub description: &'static str,
    pub apply: RuleFn,
}

/// Rules in application order. Later rules see the output of earlier ones.
pub static PIPELINE: &[Rule] = &[
    Rule {
        applicability: Applicability::All,
        description: "Apply Stress",
        apply: propagate_stress,
    },
    Rule {
        applicability: Applicability::Only(Source::MerriamWebster),
        description: "Remove Syllable Delimiters",
        apply: |t, w| translate(t, w, &MW_STRIP),
    },
    Rule {
        applicability: Applicability::Only(Source::MerriamWebster),
        description: "Apply Local Translation Table",
        apply: |t, w| translate(t, w, &MW),
    },
    Rule {
        applicability: Applicability::Only(Source::Oxford),
        description: "Apply Local Translation Table",
        apply: |t, w| translate(t, w, &OED),
    },
    Rule {
        applicability: Applicability::External,
        description: "Apply Global Translation Table",
        apply: |t, w| translate(t, w, &EXTERNAL),
    },
    Rule {
        applicability: Applicability::All,
        description: "Coalesce Tokens",
        apply: coalesce,
    },
    Rule {
        applicability: Applicability::All,
        description: "Detect Tokens",
        apply: classify,
    },
    Rule {
        applicability: Applicability::Only(Source::Oxford),
        description: "ʌ to ə when unstressed",
        // ʌ before iɚ is left for the false iɚ detector
        apply: |t, _| leading_vowel_rule(t, "ʌ", Some("ʌ"), Some("ə"), &["iɚ"]),
    },
    Rule {
        applicability: Applicability::External,
        description: "ə to ʌ when stressed",
        apply: |t, _| leading_vowel_rule(t, "ə", Some("ʌ"), None, &[]),
    },
    Rule {
        applicability: Applicability::External,
        description: "False iɚ detector",
        apply: |t, _| FALSE_IR.iter().fold(t, replace_window),
    },
    Rule {
        applicability: Applicability::External,
        description: "False ɛɚ detector",
        apply: |t, _| FALSE_ER.iter().fold(t, replace_window),
    },
    Rule {
        applicability: Applicability::External,
        description: "False ʊɚ detector",
        apply: |t, _| FALSE_UR.iter().fold(t, replace_window),
    },
    Rule {
        applicability: Applicability::External,
        description: "Duplicate Stressed Consonant",
        apply: duplicate_stressed_consonant,
    },
];

/// Convert a raw pronunciation into canonical tokens.
///
/// Spelling and pronunciation are NFC-normalized first. An empty
/// pronunciation yields no tokens.
pub fn tokenize(word: &str, pronunciation: &str, source: Source) -> Vec<Token> {
    run(word, pronunciation, source, |_, _| {})
}

/// One recorded pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    pub description: &'static str,
    pub tokens: Vec<Token>,
}

/// Every intermediate buffer of a tokenization, starting with the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub source: Source,
    pub steps: Vec<TraceStep>,
}

impl Trace {
    pub fn output(&self) -> &[Token] {
        self.steps.last().map(|s| s.tokens.as_slice()).unwrap_or(&[])
    }

    /// The seed plus each step that changed the buffer's length, rendering,
    /// or token kinds relative to the last kept step.
    pub fn changed_steps(&self) -> Vec<&TraceStep> {
        let mut kept: Vec<&TraceStep> = Vec::new();
        for step in &self.steps {
            let changed = match kept.last() {
                None => true,
                Some(prev) => {
                    prev.tokens.len() != step.tokens.len()
                        || render(&prev.tokens) != render(&step.tokens)
                        || prev.tokens.iter().zip(&step.tokens).any(|(a, b)| a.kind != b.kind)
                }
            };
            if changed {
                kept.push(step);
            }
        }
        kept
    }
}

/// Tokenize, keeping a snapshot after every applied rule.
pub fn tokenize_traced(word: &str, pronunciation: &str, source: Source) -> Trace {
    let mut steps = Vec::new();
    run(word, pronunciation, source, |description, tokens| {
        steps.push(TraceStep {
            description,
            tokens: tokens.to_vec(),
        });
    });
    Trace { source, steps }
}

fn run<F>(word: &str, pronunciation: &str, source: Source, mut on_step: F) -> Vec<Token>
where
    F: FnMut(&'static str, &[Token]),
{
    if pronunciation.is_empty() {
        return Vec::new();
    }

    let word: String = word.nfc().collect();
    let mut tokens: Vec<Token> = pronunciation.nfc().map(Token::literal).collect();
    on_step("Base", &tokens);

    for rule in PIPELINE.iter().filter(|r| r.applicability.applies_to(source)) {
        tokens = (rule.apply)(tokens, &word);
        log::debug!("{}: {}", rule.description, render(&tokens));
        on_step(rule.description, &tokens);
    }

    tokens
}

/// Each token inherits its predecessor's stress and ORs in its own mark.
/// Without any stress mark the whole pronunciation is primary.
fn propagate_stress(mut tokens: Vec<Token>, _word: &str) -> Vec<Token> {
    let mut prev = Stress::NONE;
    for (i, t) in tokens.iter_mut().enumerate() {
        if i != 0 {
            t.instance.stress = prev;
        }
        if t.id == PRIMARY_MARK {
            t.instance.stress |= Stress::PRIMARY;
        } else if t.id == SECONDARY_MARK {
            t.instance.stress |= Stress::SECONDARY;
        }
        prev = t.instance.stress;
    }

    // stress only accumulates, so the last token has seen every mark
    if tokens.last().is_some_and(|t| t.stress().is_none()) {
        for t in tokens.iter_mut() {
            t.instance.stress = Stress::PRIMARY;
        }
    }
    tokens
}

/// Merge runs of tokens whose joined text is a multi-character known
/// spelling, preferring the match that consumes the most tokens.
fn coalesce(tokens: Vec<Token>, _word: &str) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let base_len = tokens[i].instance.canonical.chars().count();
        let mut best: Option<(usize, &Token, String)> = None;

        for known in known_tokens() {
            for spelling in &known.equivalents {
                let target_len = spelling.chars().count();
                if target_len <= base_len {
                    continue;
                }

                let mut joined = String::new();
                let mut len = 0;
                let mut count = 0;
                for t in &tokens[i..] {
                    joined.push_str(&t.instance.canonical);
                    len += t.instance.canonical.chars().count();
                    count += 1;
                    if len >= target_len {
                        break;
                    }
                }

                if joined != *spelling {
                    continue;
                }
                if best.as_ref().map_or(true, |(n, _, _)| count > *n) {
                    best = Some((count, known, joined));
                }
            }
        }

        match best {
            Some((count, known, joined)) => {
                let mut merged = known.copy(None);
                merged.instance = TokenInstance {
                    canonical: joined,
                    stress: tokens[i].stress(),
                };
                out.push(merged);
                i += count;
            }
            None => {
                out.push(tokens[i].clone());
                i += 1;
            }
        }
    }

    out
}

/// Replace each unclassified token that has a known spelling with a copy of
/// the known token carrying the original instance.
fn classify(tokens: Vec<Token>, _word: &str) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|mut t| {
            if t.kind != TokenKind::Unknown {
                return t;
            }
            match find_known_token(&t) {
                Some(known) => known.copy(Some(&t)),
                None => {
                    t.known = false;
                    t
                }
            }
        })
        .collect()
}

/// Rewrite the vowel `from` depending on whether it is the first vowel after
/// a stress mark. A pronunciation starting stressed starts out leading. An
/// occurrence directly followed by one of `unless_before` is kept.
fn leading_vowel_rule(
    mut tokens: Vec<Token>,
    from: &str,
    when_leading: Option<&str>,
    otherwise: Option<&str>,
    unless_before: &[&str],
) -> Vec<Token> {
    let Some(first) = tokens.first() else {
        return tokens;
    };

    let resolve = |spelling: Option<&str>| -> Result<Option<&'static Token>, ()> {
        match spelling {
            None => Ok(None),
            Some(s) => match find_known(s) {
                Some(t) => Ok(Some(t)),
                None => {
                    log::warn!("{} is not a known token", s);
                    Err(())
                }
            },
        }
    };
    let (Ok(leading_to), Ok(other_to)) = (resolve(when_leading), resolve(otherwise)) else {
        return tokens;
    };

    let mut leading = first.stress().intersects(Stress::BOTH);
    for i in 0..tokens.len() {
        if tokens[i].kind.is_stress_mark() {
            leading = true;
        } else if tokens[i].is_vowel() {
            let target = if leading { leading_to } else { other_to };
            let blocked = tokens
                .get(i + 1)
                .is_some_and(|next| unless_before.iter().any(|s| next.equals(s)));
            if let Some(target) = target.filter(|_| tokens[i].equals(from) && !blocked) {
                let mut replaced = target.copy(None);
                replaced.instance.stress = tokens[i].stress();
                tokens[i] = replaced;
            }
            leading = false;
        }
    }
    tokens
}

/// A condition on one token of a replacement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Text(&'static str),
    Kind(TokenKind),
}

impl Cond {
    fn matches(self, token: &Token) -> bool {
        match self {
            Cond::Text(s) => token.equals(s),
            Cond::Kind(k) => token.kind == k,
        }
    }
}

/// Replace `matched` with the known tokens spelled `replacement` wherever it
/// sits between `preceding` and `succeeding`.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub preceding: &'static [Cond],
    pub matched: &'static [&'static str],
    pub succeeding: &'static [Cond],
    pub replacement: &'static [&'static str],
}

const VOWEL: Cond = Cond::Kind(TokenKind::Vowel);

const FALSE_IR: &[Window] = &[
    Window { preceding: &[], matched: &["a", "iɚ"], succeeding: &[], replacement: &["aɪ", "ə"] },
    Window { preceding: &[], matched: &["ʌ", "iɚ"], succeeding: &[], replacement: &["aɪ", "ə"] },
    Window { preceding: &[VOWEL], matched: &["iɚ"], succeeding: &[], replacement: &["ɪ", "ə"] },
];

const FALSE_ER: &[Window] = &[
    Window { preceding: &[], matched: &["ɛɚ"], succeeding: &[VOWEL], replacement: &["ɛ", "r"] },
];

const FALSE_UR: &[Window] = &[
    // yu + ɚ
    Window { preceding: &[Cond::Text("yu")], matched: &["ɚ"], succeeding: &[], replacement: &["ə"] },
    Window { preceding: &[], matched: &["ʊɚ"], succeeding: &[VOWEL], replacement: &["yu", "r"] },
    Window { preceding: &[Cond::Text("y")], matched: &["ʊɚ"], succeeding: &[], replacement: &["u", "ə"] },
];

/// Apply one replacement window left to right. Preceding conditions are
/// checked against the output so far, so they see earlier replacements.
fn replace_window(tokens: Vec<Token>, window: &Window) -> Vec<Token> {
    let replacement: Option<Vec<&'static Token>> =
        window.replacement.iter().map(|s| find_known(s)).collect();
    let Some(replacement) = replacement else {
        log::warn!(
            "Could not find replacement tokens {:?} for conditional rule",
            window.replacement
        );
        return tokens;
    };

    let m = window.matched.len();
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let fits = m > 0
            && out.len() >= window.preceding.len()
            && i + m + window.succeeding.len() <= tokens.len();
        let hit = fits
            && out[out.len() - window.preceding.len()..]
                .iter()
                .zip(window.preceding)
                .all(|(t, c)| c.matches(t))
            && tokens[i..i + m].iter().zip(window.matched).all(|(t, s)| t.equals(s))
            && tokens[i + m..]
                .iter()
                .zip(window.succeeding)
                .all(|(t, c)| c.matches(t));

        if hit {
            let stress = tokens[i].stress();
            out.extend(replacement.iter().map(|known| {
                let mut t = known.copy(None);
                t.instance.stress = stress;
                t
            }));
            i += m;
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }

    out
}

/// If the primary mark is followed by a non-consonant and preceded by a
/// consonant, repeat that consonant after the mark. A preceding "r" becomes a
/// vowel instead (adenoma vs. angioma).
fn duplicate_stressed_consonant(mut tokens: Vec<Token>, _word: &str) -> Vec<Token> {
    let Some(index) = tokens.iter().position(|t| t.kind == TokenKind::PrimaryStress) else {
        return tokens;
    };
    if index == 0 || index == tokens.len() - 1 {
        return tokens;
    }
    if tokens[index + 1].is_consonant() || !tokens[index - 1].is_consonant() {
        return tokens;
    }

    if tokens[index - 1].equals("r") {
        tokens[index - 1].kind = TokenKind::Vowel;
    } else {
        let mut dup = tokens[index - 1].copy(None);
        dup.instance.stress |= Stress::PRIMARY;
        tokens.insert(index + 1, dup);
    }
    tokens
}
