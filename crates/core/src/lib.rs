pub mod error;
pub mod phonetics;
pub mod search;
pub mod types;

pub use error::PhonoError;
pub use phonetics::{get_primary_stressed, render, tokenize, tokenize_traced};
pub use search::{search, PatternElement, SearchOptions};
pub use types::{tokenize_batch, Entry, EntryRecord, Source};
