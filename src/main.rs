use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use linksan::utils::logger::init_logger;
use linksan::{process_batch, AppConfig, BatchSummary, ProcessingResult, RuleSource, Sanitizer};

/// Remove tracking parameters from URLs
#[derive(Debug, Parser)]
#[command(name = "linksan", version, about)]
struct Cli {
    /// Rule document to use instead of the bundled rules
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Configuration file (defaults to ./linksan.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sanitize a single URL
    Url { url: String },
    /// Find the first URL in some text and sanitize it
    Text {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List the URL candidates found in some text
    Extract {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Sanitize every URL found in a file, one entry per line
    Batch { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(rules) = cli.rules.clone() {
        config.rules_path = Some(rules);
    }
    init_logger(config.log_dir.as_deref())?;

    let source = match config.rules_path.as_deref() {
        Some(path) => RuleSource::Path(path),
        None => RuleSource::Bundled,
    };
    let sanitizer = Sanitizer::from_source(source)
        .context("Failed to load sanitization rules")?
        .with_options(config.engine_options());

    match cli.command {
        Command::Url { url } => {
            let result = sanitizer.process_url(&url);
            report(&sanitizer, &result, cli.json)
        }
        Command::Text { text } => {
            let result = sanitizer.process_text(&text.join(" "));
            if result.has_multiple_candidates() && !cli.json {
                eprintln!("Found {} URLs, sanitized the first one", result.candidate_count);
            }
            report(&sanitizer, &result, cli.json)
        }
        Command::Extract { text } => {
            let urls = sanitizer.extract_urls(&text.join(" "));
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&urls)?);
            } else {
                for url in &urls {
                    println!("{}", url);
                }
            }
            Ok(if urls.is_empty() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        Command::Batch { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let urls: Vec<String> = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .flat_map(|line| sanitizer.extract_urls(line))
                .collect();
            info!("Batch file {} yielded {} URLs", file.display(), urls.len());

            let results = process_batch(Arc::new(sanitizer), urls, config.batch_concurrency).await;
            let summary = BatchSummary::from_results(&results);
            if cli.json {
                let output = serde_json::json!({ "results": results, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for result in &results {
                    if let Some(url) = result.fallback_url() {
                        println!("{}", url);
                    }
                }
                eprintln!("{}", summary.message());
            }
            Ok(if summary.failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}

fn report(sanitizer: &Sanitizer, result: &ProcessingResult, json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        if let Some(url) = result.fallback_url() {
            println!("{}", url);
        }
        eprintln!("{}", result.status_message());
        for name in &result.removed_params {
            match sanitizer.rules().category_of(name) {
                Some(category) => eprintln!("  - {} ({})", name, category),
                None => eprintln!("  - {}", name),
            }
        }
    }
    Ok(if result.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
