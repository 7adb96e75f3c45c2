use thiserror::Error;

/// Errors from parsing user-supplied text into engine types.
///
/// The engine itself never fails: tokenization and search degrade and log.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhonoError {
    #[error("unknown pronunciation source '{0}' (expected mw, oed or internal)")]
    UnknownSource(String),

    #[error("'{0}' is not a known phoneme")]
    UnknownPhoneme(String),
}
