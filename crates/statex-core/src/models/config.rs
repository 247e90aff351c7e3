//! Configuration structures for the extraction engine.

use serde::{Deserialize, Serialize};

use super::statement::Capability;
use crate::error::ExtractError;

/// Main configuration for statex.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatexConfig {
    /// Document preconditions checked before parsing.
    pub limits: LimitsConfig,

    /// Bank descriptors, one per supported bank identifier.
    pub banks: Vec<BankConfig>,
}

impl Default for StatexConfig {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            banks: default_banks(),
        }
    }
}

/// Resource caps applied to every statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted source document, in megabytes.
    pub max_file_size_mb: u64,

    /// Most pages a statement may have.
    pub max_pages: u32,

    /// Minimum characters of text on the first page before it is trusted.
    pub min_text_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 25,
            max_pages: 200,
            min_text_length: 10,
        }
    }
}

/// Read-only capability descriptor for one bank identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Opaque identifier callers select the bank with (e.g. "UNION").
    pub bank_id: String,

    /// Display name; must match the extractor's bank name.
    pub bank_name: String,

    /// Implementation reference resolved by the registry (e.g. "union_bank").
    pub extractor: String,

    /// Largest accepted source document for this bank, in megabytes.
    pub max_file_size_mb: u64,

    /// Capabilities the deployment relies on for this bank.
    pub capabilities: Vec<Capability>,

    /// Lowercase phrases expected on the first page of a genuine statement.
    pub identifiers: Vec<String>,

    /// Inactive banks are reported as unsupported.
    pub active: bool,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            bank_id: String::new(),
            bank_name: String::new(),
            extractor: String::new(),
            max_file_size_mb: 50,
            capabilities: Vec::new(),
            identifiers: Vec::new(),
            active: true,
        }
    }
}

impl BankConfig {
    /// Whether a file of this size is accepted for this bank.
    pub fn accepts_size(&self, file_size_mb: f64) -> bool {
        file_size_mb <= self.max_file_size_mb as f64
    }
}

fn default_banks() -> Vec<BankConfig> {
    use Capability::*;

    vec![
        BankConfig {
            bank_id: "UNION".to_string(),
            bank_name: "Union Bank of India".to_string(),
            extractor: "union_bank".to_string(),
            capabilities: vec![PasswordProtected, MultiPage, Transactions, AccountMetadata, StatementPeriod],
            identifiers: vec!["union bank".to_string()],
            ..BankConfig::default()
        },
        BankConfig {
            bank_id: "CANARA".to_string(),
            bank_name: "Canara Bank".to_string(),
            extractor: "canara_bank".to_string(),
            capabilities: vec![
                PasswordProtected,
                MultiPage,
                Transactions,
                FinancialSummary,
                AccountMetadata,
                StatementPeriod,
            ],
            identifiers: vec!["canara".to_string()],
            ..BankConfig::default()
        },
        BankConfig {
            bank_id: "APGVB".to_string(),
            bank_name: "Andhra Pradesh Grameena Bank".to_string(),
            extractor: "apgvb".to_string(),
            capabilities: vec![
                MultiPage,
                Transactions,
                FinancialSummary,
                AccountMetadata,
                StatementPeriod,
                BalanceCalculation,
                TransactionTypes,
            ],
            identifiers: vec![
                "andhra pradesh grameena".to_string(),
                "a.p. grameena".to_string(),
                "ap grameena".to_string(),
                "apgvb".to_string(),
            ],
            ..BankConfig::default()
        },
    ]
}

impl StatexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Descriptor for a bank identifier, active or not.
    pub fn bank(&self, bank_id: &str) -> Option<&BankConfig> {
        self.banks.iter().find(|b| b.bank_id == bank_id)
    }

    /// Reject configurations the registry cannot serve unambiguously.
    pub fn validate(&self) -> crate::Result<()> {
        if self.limits.max_pages == 0 {
            return Err(ExtractError::Config("limits.max_pages must be at least 1".to_string()));
        }

        let mut seen = std::collections::HashSet::new();
        for bank in &self.banks {
            if bank.bank_id.trim().is_empty() {
                return Err(ExtractError::Config("bank descriptor without a bank_id".to_string()));
            }
            if bank.extractor.trim().is_empty() {
                return Err(ExtractError::Config(format!("bank {} names no extractor", bank.bank_id)));
            }
            if !seen.insert(bank.bank_id.as_str()) {
                return Err(ExtractError::Config(format!("bank {} is configured twice", bank.bank_id)));
            }
        }
        Ok(())
    }
}
