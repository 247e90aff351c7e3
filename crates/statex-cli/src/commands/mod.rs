//! CLI subcommands and the helpers they share.

pub mod banks;
pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use statex_core::{
    ExtractorRegistry, MemoryConfigStore, PdfLoader, StatementResult, StatementSource, StatexConfig, TextLoader,
};

/// Output format for extracted statements.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV of the transactions
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("statex")
        .join("config.json")
}

/// Load the configuration from `--config`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StatexConfig> {
    let config = match config_path {
        Some(path) => StatexConfig::from_file(Path::new(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Using configuration from {}", default_path.display());
                StatexConfig::from_file(&default_path)?
            } else {
                StatexConfig::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Whether a statement file is `pdftotext` output rather than a PDF.
pub fn is_text_statement(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

/// Registries for PDF and plain-text statements over one configuration.
pub struct Registries {
    pdf: ExtractorRegistry,
    text: ExtractorRegistry,
}

impl Registries {
    pub fn new(config: &StatexConfig) -> Self {
        let store = Arc::new(MemoryConfigStore::from_config(config));
        Self {
            pdf: ExtractorRegistry::new(store.clone(), Arc::new(PdfLoader::new()), config.limits.clone()),
            text: ExtractorRegistry::new(store, Arc::new(TextLoader::new()), config.limits.clone()),
        }
    }

    /// Registry used for listing banks.
    pub fn pdf(&self) -> &ExtractorRegistry {
        &self.pdf
    }

    pub fn extract(&self, bank_id: &str, path: &Path, password: Option<&str>) -> statex_core::Result<StatementResult> {
        let registry = if is_text_statement(path) { &self.text } else { &self.pdf };
        registry.extract(bank_id, &StatementSource::Path(path.to_path_buf()), password)
    }
}
