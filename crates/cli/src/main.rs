//! Phonodex CLI: tokenize dictionary pronunciations and search by sound.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use phonodex_core::phonetics::{render, tokenize_traced};
use phonodex_core::search::{
    format_pattern, pattern_from_tokens, search, search_like, PatternElement, SearchOptions,
    MAX_RESULTS,
};
use phonodex_core::types::{tokenize_batch, Entry, EntryRecord, Source};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "phonodex",
    about = "Phonetic tokenizer and rhyme-style dictionary search",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tokenize a raw dictionary pronunciation
    Tokenize(TokenizeArgs),
    /// Search a corpus by primary-stressed phonemes
    Search(SearchArgs),
}

// ─── Tokenize ────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct TokenizeArgs {
    /// Spelling of the word
    word: String,

    /// Raw pronunciation as printed by the source
    pronunciation: String,

    /// Notation of the pronunciation: mw, oed or internal
    #[arg(long, default_value = "oed")]
    source: String,

    /// Print every rule that changed the tokens
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Search ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct SearchArgs {
    /// JSON file holding an array of entry records
    #[arg(long)]
    corpus: PathBuf,

    /// Pattern elements: phoneme ids, "-" for none, "*" for anything
    elements: Vec<String>,

    /// Search for words sounding like this corpus entry instead
    #[arg(long, conflicts_with = "elements")]
    like: Option<String>,

    /// Spelling to always return first
    #[arg(long)]
    exact: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = MAX_RESULTS)]
    limit: usize,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Init logging
    let log_level = match &cli.command {
        Command::Tokenize(a) if a.verbose => "debug",
        Command::Search(a) if a.verbose => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Tokenize(args) => run_tokenize(args),
        Command::Search(args) => run_search(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Read a JSON array of entry records and tokenize them.
fn load_corpus(path: &Path) -> Result<Vec<Entry>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus {}", path.display()))?;
    let records: Vec<EntryRecord> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid corpus JSON in {}", path.display()))?;
    let entries = tokenize_batch(&records);
    log::info!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

fn parse_pattern(elements: &[String]) -> Result<Vec<PatternElement>> {
    elements
        .iter()
        .map(|e| e.parse::<PatternElement>().map_err(anyhow::Error::from))
        .collect()
}

// ─── Runners ─────────────────────────────────────────────────────

fn run_tokenize(args: TokenizeArgs) -> Result<()> {
    let source: Source = args.source.parse()?;
    let trace = tokenize_traced(&args.word, &args.pronunciation, source);

    if args.trace {
        for step in trace.changed_steps() {
            println!("{:<40} {}", step.description, render(&step.tokens));
        }
    }

    let tokens = trace.output();
    println!("{}", render(tokens));
    if args.verbose {
        println!("  source: {}", source.name());
        for t in tokens {
            let kind = format!("{:?}", t.kind);
            println!("  {:<6} {:<16} {:?}", t.render(), kind, t.stress());
        }
    }
    Ok(())
}

fn run_search(args: SearchArgs) -> Result<()> {
    let corpus = load_corpus(&args.corpus)?;
    let mut options = SearchOptions {
        max_results: args.limit,
        exact: args.exact.clone(),
    };

    let hits = match &args.like {
        Some(word) => {
            let entry = corpus
                .iter()
                .find(|e| e.spelling.eq_ignore_ascii_case(word))
                .with_context(|| format!("'{}' is not in the corpus", word))?;
            if !entry.has_pronunciation() {
                bail!("'{}' has no pronunciation to search by", word);
            }
            log::info!("Searching for {}", format_pattern(&pattern_from_tokens(entry.tokens())));
            options.exact.get_or_insert_with(|| entry.spelling.clone());
            search_like(entry, &corpus, &options)
        }
        None => {
            let pattern = parse_pattern(&args.elements)?;
            log::info!("Searching for {}", format_pattern(&pattern));
            search(&pattern, &corpus, &options)
        }
    };

    for entry in &hits {
        let pron = entry
            .pronunciation
            .as_ref()
            .map(|p| p.text.as_str())
            .unwrap_or("");
        println!("{}\t{}\t{}", entry.spelling, pron, entry.source);
    }
    log::info!("{} result(s)", hits.len());
    Ok(())
}
