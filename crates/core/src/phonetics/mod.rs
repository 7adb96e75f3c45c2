//! Pronunciation tokenization: token model, known-token table, translation
//! tables and the rule pipeline that ties them together.

pub mod known;
pub mod rules;
pub mod token;
pub mod translation;

pub use rules::{tokenize, tokenize_traced, Trace, TraceStep};
pub use token::{get_primary_stressed, render, Stress, Token, TokenKind};
