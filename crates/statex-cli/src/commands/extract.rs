//! Extract command - extract one bank statement.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use statex_core::statement::rules::format_amount;
use statex_core::StatementResult;

use super::{load_config, OutputFormat, Registries};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Statement file (PDF, or pdftotext output saved as .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Bank identifier (e.g. UNION, CANARA, APGVB)
    #[arg(short, long)]
    bank: String,

    /// Password of an encrypted statement
    #[arg(short, long)]
    password: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Extracting {} statement {}", args.bank, args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Reading {} statement...", args.bank));

    let registries = Registries::new(&config);
    let result = registries.extract(&args.bank, &args.input, args.password.as_deref());
    pb.finish_and_clear();
    let result = result?;

    if !result.financial_summary.is_reconciled() {
        eprintln!(
            "{} Balances do not reconcile (off by {})",
            style("⚠").yellow(),
            result.financial_summary.discrepancy()
        );
    }

    let output = format_statement(&result, args.format, args.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} transactions written to {}",
            style("✓").green(),
            result.total_transactions,
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render a statement in the requested format.
pub fn format_statement(result: &StatementResult, format: OutputFormat, pretty: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &StatementResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Headers come from the transaction wire keys
    for transaction in &result.transactions {
        wtr.serialize(transaction)?;
    }
    if result.transactions.is_empty() {
        wtr.write_record([
            "S.No",
            "Date",
            "Transaction_ID",
            "Remarks",
            "Debit",
            "Credit",
            "Balance",
            "Transaction_Type",
            "Page_Number",
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &StatementResult) -> String {
    let metadata = &result.statement_metadata;
    let summary = &result.financial_summary;
    let mut output = String::new();

    output.push_str(&format!("Bank: {}\n", metadata.bank_name));
    if let Some(account) = &metadata.account_number {
        output.push_str(&format!("Account: {}\n", account));
    }
    if let Some(name) = &metadata.customer_name {
        output.push_str(&format!("Customer: {}\n", name));
    }
    if let Some(period) = &metadata.statement_period {
        output.push_str(&format!("Period: {} to {}\n", period.from_date, period.to_date));
    }
    output.push('\n');

    output.push_str(&format!("Transactions: {}\n", result.total_transactions));
    for t in &result.transactions {
        output.push_str(&format!(
            "  {:>4}  {:<11} {:<6} {:>14} {:>14}  {}\n",
            t.serial,
            t.date,
            t.transaction_type.as_str(),
            format_amount(t.amount()),
            format_amount(t.balance),
            t.remarks
        ));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Opening balance: {} {}\n", format_amount(summary.opening_balance), metadata.currency));
    output.push_str(&format!("  Total credits:   {} {}\n", format_amount(summary.total_credits), metadata.currency));
    output.push_str(&format!("  Total debits:    {} {}\n", format_amount(summary.total_debits), metadata.currency));
    output.push_str(&format!("  Closing balance: {} {}\n", format_amount(summary.closing_balance), metadata.currency));
    if let (Some(from), Some(to)) = (&summary.date_range.from_date, &summary.date_range.to_date) {
        output.push_str(&format!("  Dates:           {} to {}\n", from, to));
    }

    output.push_str(&format!(
        "\nExtracted by {} v{} at {}\n",
        result.extractor_metadata.bank_name,
        result.extractor_metadata.version,
        result.processed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    ));

    output
}
