//! Batch command - extract many statements of one bank.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use statex_core::StatementResult;

use super::extract::format_statement;
use super::{load_config, OutputFormat, Registries};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Bank identifier shared by all statements
    #[arg(short, long)]
    bank: String,

    /// Password shared by all statements
    #[arg(short, long)]
    password: Option<String>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of extracting a single file.
struct FileResult {
    path: PathBuf,
    outcome: Result<StatementResult, String>,
    processing_time_ms: u64,
}

/// One row of the batch summary CSV.
#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'a str,
    account_number: &'a str,
    transactions: String,
    opening_balance: String,
    closing_balance: String,
    total_credits: String,
    total_debits: String,
    reconciled: String,
    processing_time_ms: u64,
    error: &'a str,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let registries = Arc::new(Registries::new(&config));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.iter().cloned().enumerate() {
        let registries = Arc::clone(&registries);
        let semaphore = Arc::clone(&semaphore);
        let bank = args.bank.clone();
        let password = args.password.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let file_start = Instant::now();
            let job_path = path.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                registries
                    .extract(&bank, &job_path, password.as_deref())
                    .map_err(|e| e.to_string())
            })
            .await
            .unwrap_or_else(|e| Err(format!("worker failed: {}", e)));

            let result = FileResult {
                path,
                outcome,
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            };
            (index, result)
        });
    }

    let mut results: Vec<(usize, FileResult)> = Vec::with_capacity(files.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        overall_pb.inc(1);

        if let Err(message) = &result.outcome {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), message);
            } else {
                error!("Failed to process {}: {}", result.path.display(), message);
                tasks.abort_all();
                overall_pb.abandon();
                anyhow::bail!("Processing {} failed: {}", result.path.display(), message);
            }
        }
        results.push((index, result));
    }
    overall_pb.finish_and_clear();

    // Report in input order
    results.sort_by_key(|(index, _)| *index);
    let results: Vec<FileResult> = results.into_iter().map(|(_, r)| r).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Ok(statement) = &result.outcome {
                let output_name = result.path.file_stem().and_then(|s| s.to_str()).unwrap_or("statement");
                let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));
                fs::write(&output_path, format_statement(statement, args.format, false)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!("{} Summary written to {}", style("✓").green(), summary_path.display());
    }

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.outcome.is_err()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(message) = &result.outcome {
                println!("  - {}: {}", result.path.display(), message);
            }
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        let row = match &result.outcome {
            Ok(statement) => {
                let summary = &statement.financial_summary;
                SummaryRow {
                    filename,
                    status: "success",
                    account_number: statement.statement_metadata.account_number.as_deref().unwrap_or(""),
                    transactions: statement.total_transactions.to_string(),
                    opening_balance: summary.opening_balance.to_string(),
                    closing_balance: summary.closing_balance.to_string(),
                    total_credits: summary.total_credits.to_string(),
                    total_debits: summary.total_debits.to_string(),
                    reconciled: summary.is_reconciled().to_string(),
                    processing_time_ms: result.processing_time_ms,
                    error: "",
                }
            }
            Err(message) => SummaryRow {
                filename,
                status: "error",
                account_number: "",
                transactions: String::new(),
                opening_balance: String::new(),
                closing_balance: String::new(),
                total_credits: String::new(),
                total_debits: String::new(),
                reconciled: String::new(),
                processing_time_ms: result.processing_time_ms,
                error: message,
            },
        };
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}
