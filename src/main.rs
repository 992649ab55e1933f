//! Recommender CLI - content-based recommendations over an innovation catalog.

use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use recommender::cli::{Cli, Command, OutputFormat};
use recommender::config::Config;
use recommender::engine::RecommendationEngine;
use recommender::output::Format;
use recommender::store::JsonFileStore;
use recommender::text::Normalizer;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("recommender=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default(".")?,
    };

    let format = match cli.format {
        OutputFormat::Json => Format::Json,
        OutputFormat::Markdown => Format::Markdown,
        OutputFormat::Text => Format::Text,
    };

    match cli.command {
        Command::InitConfig => {
            print!("{}", Config::default_toml());
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
        Command::Normalize(args) => {
            let normalizer = Normalizer::new(&config.text);
            let normalized = normalizer.normalize(&args.text);
            format.format_value(
                &json!({
                    "input": args.text,
                    "normalized": normalized,
                    "language": config.text.language,
                    "stopwords": normalizer.stopwords().len(),
                }),
                &mut stdout(),
            )?;
        }
        Command::Recommend(args) => {
            let engine = engine(&config, cli.catalog)?;
            let top_n = args.top_n.unwrap_or(config.retrieval.top_n);
            let min_similarity = args
                .min_similarity
                .unwrap_or(config.retrieval.min_similarity);
            let results = engine.recommend(&args.id, top_n, min_similarity);
            format.format(&results, &mut stdout())?;
        }
        Command::Search(args) => {
            let engine = engine(&config, cli.catalog)?;
            engine.initialize();
            let top_n = args.top_n.unwrap_or(config.retrieval.search_top_n);
            let results = engine.search(&args.query, top_n);
            format.format(&results, &mut stdout())?;
        }
        Command::Stats => {
            let engine = engine(&config, cli.catalog)?;
            engine.initialize();
            format.format(&engine.model_stats(), &mut stdout())?;
        }
        Command::Refresh => {
            let engine = engine(&config, cli.catalog)?;
            let refreshed = engine.force_refresh();
            format.format_value(
                &json!({ "refreshed": refreshed, "stats": engine.model_stats() }),
                &mut stdout(),
            )?;
            if !refreshed {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn engine(config: &Config, catalog: Option<PathBuf>) -> Result<RecommendationEngine> {
    let path = catalog
        .or_else(|| config.store.catalog_path.clone())
        .context("no catalog configured; pass --catalog or set store.catalog_path")?;
    let store = Arc::new(JsonFileStore::new(path));
    Ok(RecommendationEngine::new(config.clone(), store))
}
