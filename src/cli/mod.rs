//! CLI implementation using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Recommender - content-based recommendations and search over an innovation catalog.
#[derive(Parser)]
#[command(name = "recommender")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON catalog file (overrides store.catalog_path)
    #[arg(long, env = "RECOMMENDER_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Recommend records similar to a record id
    #[command(alias = "rec")]
    Recommend(RecommendArgs),

    /// Search the catalog by free text
    #[command(alias = "s")]
    Search(SearchArgs),

    /// Show model statistics
    Stats,

    /// Force a model rebuild
    Refresh,

    /// Print the normalized form of a text
    Normalize(NormalizeArgs),

    /// Print the default configuration file
    InitConfig,

    /// Print the effective configuration after file and environment overrides
    ShowConfig,
}

#[derive(Args)]
pub struct RecommendArgs {
    /// Record id to find similar records for
    pub id: String,

    /// Maximum number of recommendations
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Minimum similarity score (0.0-1.0)
    #[arg(long)]
    pub min_similarity: Option<f64>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Free-text query
    pub query: String,

    /// Maximum number of results
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,
}

#[derive(Args)]
pub struct NormalizeArgs {
    /// Text to normalize
    pub text: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
