//! Banks command - list supported banks.

use clap::Args;
use console::style;

use super::{load_config, Registries};

/// Arguments for the banks command.
#[derive(Args)]
pub struct BanksArgs {
    /// Print the bank list as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: BanksArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registries = Registries::new(&config);
    let banks = registries.pdf().list_banks();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&banks)?);
        return Ok(());
    }

    if banks.is_empty() {
        println!("{} No banks configured", style("ℹ").blue());
        return Ok(());
    }

    println!("{}", style("Supported banks:").bold());
    for bank in &banks {
        let capabilities: Vec<&str> = bank.capabilities.iter().map(|c| c.as_str()).collect();
        println!(
            "  {:<8} {} (v{}, up to {} MB)",
            style(&bank.bank_id).cyan(),
            bank.bank_name,
            bank.version,
            bank.max_file_size_mb
        );
        println!("           {}", style(capabilities.join(", ")).dim());
    }

    Ok(())
}
