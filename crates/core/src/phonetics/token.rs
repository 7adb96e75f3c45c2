//! Token model: the atomic unit of a canonical pronunciation.
//!
//! A token pairs an immutable identity (id, spellings, kind) with a
//! per-occurrence instance (the text actually observed and the stress it
//! carries).

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Primary stress mark.
pub const PRIMARY_MARK: &str = "ˈ";
/// Secondary stress mark.
pub const SECONDARY_MARK: &str = "ˌ";

/// Stress bitmask. Anything after a primary mark is primary-stressed; a
/// secondary mark seen afterwards makes the stress `BOTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Stress(u8);

impl Stress {
    pub const NONE: Stress = Stress(0);
    pub const PRIMARY: Stress = Stress(0b01);
    pub const SECONDARY: Stress = Stress(0b10);
    pub const BOTH: Stress = Stress(0b11);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set in `self`.
    pub fn contains(self, other: Stress) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set in `self`.
    pub fn intersects(self, other: Stress) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Stress {
    type Output = Stress;

    fn bitor(self, rhs: Stress) -> Stress {
        Stress(self.0 | rhs.0)
    }
}

impl BitOrAssign for Stress {
    fn bitor_assign(&mut self, rhs: Stress) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Stress {
    type Output = Stress;

    fn bitand(self, rhs: Stress) -> Stress {
        Stress(self.0 & rhs.0)
    }
}

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    #[default]
    Unknown,
    Vowel,
    Consonant,
    PrimaryStress,
    SecondaryStress,
}

impl TokenKind {
    /// Either of the two stress marks.
    pub fn is_stress_mark(self) -> bool {
        matches!(self, TokenKind::PrimaryStress | TokenKind::SecondaryStress)
    }

    /// The stress bit a mark of this kind contributes.
    pub fn stress_bit(self) -> Stress {
        match self {
            TokenKind::PrimaryStress => Stress::PRIMARY,
            TokenKind::SecondaryStress => Stress::SECONDARY,
            _ => Stress::NONE,
        }
    }
}

/// Per-occurrence state of a token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenInstance {
    /// Text actually observed or assigned for this occurrence.
    pub canonical: String,
    pub stress: Stress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Identifier of the phoneme class (the first spelling).
    pub id: String,
    /// Spellings that all denote this token. Never empty.
    pub equivalents: Vec<String>,
    pub kind: TokenKind,
    /// Whether this token came from the known-token table.
    pub known: bool,
    /// Render the first equivalent instead of the observed text.
    pub replace_canonical: bool,
    pub instance: TokenInstance,
}

impl Token {
    /// Build a token from its spellings. The first spelling is the id and the
    /// initial canonical text.
    pub fn new(spellings: &[&str], kind: TokenKind, known: bool, replace_canonical: bool) -> Self {
        let equivalents: Vec<String> = if spellings.is_empty() {
            vec![String::new()]
        } else {
            spellings.iter().map(|s| s.to_string()).collect()
        };
        let id = equivalents[0].clone();
        Token {
            instance: TokenInstance {
                canonical: id.clone(),
                stress: Stress::NONE,
            },
            id,
            equivalents,
            kind,
            known,
            replace_canonical,
        }
    }

    /// An unclassified single-character token, as seeded from raw text.
    pub fn literal(c: char) -> Self {
        let text = c.to_string();
        Token::new(&[text.as_str()], TokenKind::Unknown, false, false)
    }

    /// A table entry: known, rendering its observed text.
    pub fn known(spellings: &[&str], kind: TokenKind) -> Self {
        Token::new(spellings, kind, true, false)
    }

    /// Independent copy keeping this token's identity. With a reference, the
    /// copy adopts the reference's instance; otherwise it clones its own.
    pub fn copy(&self, reference: Option<&Token>) -> Token {
        let mut t = self.clone();
        if let Some(r) = reference {
            t.instance = r.instance.clone();
        }
        t
    }

    pub fn stress(&self) -> Stress {
        self.instance.stress
    }

    pub fn is_vowel(&self) -> bool {
        self.kind == TokenKind::Vowel
    }

    pub fn is_consonant(&self) -> bool {
        self.kind == TokenKind::Consonant
    }

    /// True if `text` is one of this token's spellings.
    pub fn equals(&self, text: &str) -> bool {
        self.equivalents.iter().any(|e| e == text)
    }

    /// True if any spelling of `other` is one of this token's spellings.
    pub fn equals_token(&self, other: &Token) -> bool {
        self.equivalents.iter().any(|e| other.equals(e))
    }

    /// Text to emit for this token, NFC-normalized.
    pub fn render(&self) -> String {
        let text = if self.replace_canonical {
            &self.equivalents[0]
        } else {
            &self.instance.canonical
        };
        text.nfc().collect()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Concatenate the rendered text of every token.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(Token::render).collect()
}

/// Tokens carrying primary stress, skipping the stress marks themselves.
pub fn get_primary_stressed(tokens: &[Token]) -> Vec<Token> {
    tokens
        .iter()
        .filter(|t| t.stress().contains(Stress::PRIMARY) && !t.kind.is_stress_mark())
        .cloned()
        .collect()
}
