//! Command-line front end: read a text file, hash it with bcrypt and print the
//! encoded hash. With `--verify` the file is checked against an existing hash
//! instead.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use paragraph_hash::config::{load_config, HasherConfig};
use paragraph_hash::crypto::{LongInputPolicy, PasswordHasher};
use paragraph_hash::input::read_input;
use tracing_subscriber::EnvFilter;

/// Hash the contents of a text file with bcrypt
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Text file whose contents are hashed
    file: PathBuf,

    /// bcrypt cost factor (4..=31); overrides the config file
    #[arg(long, env = "PARAGRAPH_HASH_COST")]
    cost: Option<u32>,

    /// JSON file with `cost`, `version` and `longInput` settings
    #[arg(long, env = "PARAGRAPH_HASH_CONFIG")]
    config: Option<PathBuf>,

    /// Fail instead of truncating input longer than 72 bytes
    #[arg(long)]
    reject_long_input: bool,

    /// Check the file against this encoded hash instead of hashing it
    #[arg(long, value_name = "HASH", conflicts_with = "verify_file")]
    verify: Option<String>,

    /// Like --verify, reading the encoded hash from a file
    #[arg(long, value_name = "PATH")]
    verify_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    // stdout carries the hash, so diagnostics go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("paragraph_hash=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let hasher = build_hasher(args)?;
    let input = read_input(&args.file)?;

    match expected_hash(args)? {
        Some(encoded) => {
            let matches = hasher
                .verify(input.as_bytes(), &encoded)
                .context("verification failed")?;
            println!("{}", if matches { "match" } else { "no-match" });
            Ok(if matches {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        None => {
            let hash = hasher.hash(input.as_bytes()).context("hashing failed")?;
            println!("{hash}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_hasher(args: &Args) -> anyhow::Result<PasswordHasher> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => HasherConfig::default(),
    };
    if let Some(cost) = args.cost {
        config = config.with_cost(cost);
    }
    if args.reject_long_input {
        config = config.with_long_input(LongInputPolicy::Reject);
    }
    tracing::debug!(?config, "effective hasher configuration");
    Ok(config.build_hasher()?)
}

fn expected_hash(args: &Args) -> anyhow::Result<Option<String>> {
    if let Some(hash) = &args.verify {
        return Ok(Some(hash.trim().to_string()));
    }
    match &args.verify_file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("unable to read hash from {}", path.display()))?;
            Ok(Some(content.trim().to_string()))
        }
        None => Ok(None),
    }
}
