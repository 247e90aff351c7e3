//! Core library for bank statement extraction.
//!
//! This crate provides:
//! - Page text extraction from (optionally encrypted) PDF statements
//! - A shared pipeline that segments pages into transactions and
//!   summarizes them
//! - Parsers for Union Bank of India, Canara Bank and APGVB statements
//! - A registry resolving bank identifiers to validated, cached extractors

pub mod banks;
pub mod error;
pub mod extractor;
pub mod models;
pub mod pdf;
pub mod registry;
pub mod statement;

pub use error::{ExtractError, PdfError, Result};
pub use extractor::{BankExtractor, BankParser, StatementExtractor, StatementSource};
pub use models::config::{BankConfig, LimitsConfig, StatexConfig};
pub use models::statement::{
    Capability, DateRange, ExtractorIdentity, FinancialSummary, StatementMetadata, StatementPeriod,
    StatementResult, Transaction, TransactionType,
};
pub use pdf::{DocumentLoader, PageText, PdfLoader, TextLoader, TextPages};
pub use registry::{ConfigStore, ExtractorRegistry, MemoryConfigStore, ResolvedExtractor};
