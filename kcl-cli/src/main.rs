//! kcl - retrieval-augmented answering of Korean criminal-law questions.
//!
//! # Usage
//!
//! ```bash
//! # Embed the training questions into outputs/
//! kcl index
//!
//! # Answer the first 20 test questions and write outputs/dev_eval.csv
//! kcl evaluate --subset 20
//!
//! # Score a naive baseline
//! kcl baseline --mode majority
//!
//! # Inspect retrieval
//! kcl query "정당방위의 요건은?" --top-k 3
//! ```
//!
//! Reads `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `KCL_DATA_DIR`, and
//! `KCL_OUT_DIR` from the environment or `.env`. Log verbosity follows
//! `RUST_LOG` (default `info`).

mod commands;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use kcl_eval::BaselineMode;
use kcl_rag::RagConfig;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "kcl", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the question index from the training table
    Index {
        /// Neighbor count stored in the fitted index
        #[arg(long)]
        neighbors: Option<usize>,
    },
    /// Answer the test questions with retrieved context and report accuracy
    Evaluate {
        /// Only evaluate the first N rows (0 = all)
        #[arg(long)]
        subset: Option<usize>,

        /// Documents retrieved per question (0 disables retrieval)
        #[arg(long)]
        top_k: Option<usize>,

        /// Questions answered concurrently
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Score a naive baseline on the test table
    Baseline {
        #[arg(long, value_enum)]
        mode: Mode,

        /// Seed for the random baseline
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the nearest training questions for a query
    Query {
        text: String,

        #[arg(long, default_value = "5")]
        top_k: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Random,
    Majority,
}

impl From<Mode> for BaselineMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Random => BaselineMode::Random,
            Mode::Majority => BaselineMode::Majority,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let settings = Settings::from_env();

    match cli.command {
        Command::Index { neighbors } => {
            let mut builder = RagConfig::builder();
            if let Some(neighbors) = neighbors {
                builder = builder.build_neighbors(neighbors);
            }
            commands::index(&settings, &builder.build()?).await
        }
        Command::Evaluate { subset, top_k, concurrency } => {
            let mut builder = RagConfig::builder();
            if let Some(top_k) = top_k {
                builder = builder.top_k(top_k);
            }
            if let Some(concurrency) = concurrency {
                builder = builder.concurrency(concurrency);
            }
            commands::evaluate(&settings, &builder.build()?, subset).await
        }
        Command::Baseline { mode, seed } => commands::baseline(&settings, mode.into(), seed),
        Command::Query { text, top_k } => {
            commands::query(&settings, &RagConfig::default(), &text, top_k).await
        }
    }
}
