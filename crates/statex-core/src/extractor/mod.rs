//! The extractor contract every bank implementation satisfies.

mod engine;

pub use engine::{parse_page, BankExtractor, ParseState};

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use crate::error::Result;
use crate::models::statement::{Capability, ExtractorIdentity, StatementMetadata, StatementResult, Transaction};
use crate::statement::{BalanceTracker, Block, BlockLayout};

/// Where a statement document comes from.
#[derive(Debug, Clone)]
pub enum StatementSource {
    /// A file on disk.
    Path(PathBuf),
    /// Document bytes already in memory.
    Bytes(Vec<u8>),
}

impl StatementSource {
    /// Read the document bytes.
    pub fn read(&self) -> std::io::Result<Cow<'_, [u8]>> {
        match self {
            Self::Path(path) => std::fs::read(path).map(Cow::Owned),
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }

    /// Document size in bytes.
    pub fn size_bytes(&self) -> std::io::Result<u64> {
        match self {
            Self::Path(path) => std::fs::metadata(path).map(|m| m.len()),
            Self::Bytes(bytes) => Ok(bytes.len() as u64),
        }
    }
}

impl fmt::Display for StatementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for StatementSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for StatementSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// A bank statement extractor.
///
/// Implementations are stateless between calls: extracting the same
/// document twice gives the same result apart from `processed_at`.
pub trait StatementExtractor: Send + Sync {
    /// Bank name, semantic version and declared capabilities.
    fn identity(&self) -> &ExtractorIdentity;

    /// Whether the extractor declares `capability`.
    fn supports_capability(&self, capability: Capability) -> bool {
        self.identity().supports(capability)
    }

    /// Extract metadata, transactions and summary from a statement.
    fn extract_complete_statement(&self, source: &StatementSource, password: Option<&str>) -> Result<StatementResult>;
}

/// Bank-specific layout knowledge plugged into [`BankExtractor`].
///
/// The block layout decides how lines group into transactions; the parser
/// turns header text into metadata and complete blocks into transactions.
pub trait BankParser: BlockLayout + Send + Sync {
    /// Bank name, semantic version and declared capabilities.
    fn identity(&self) -> ExtractorIdentity;

    /// Leading pages that carry account header fields.
    fn header_pages(&self) -> u32 {
        1
    }

    /// Recover header fields from the text of the header pages.
    fn extract_metadata(&self, header_text: &str) -> StatementMetadata;

    /// Parse one complete block, numbered `serial`.
    ///
    /// `balance` holds the running balance for banks that classify by
    /// balance movement; parsers with explicit markers leave it alone.
    /// Returns `None` when the block does not hold a valid transaction.
    fn parse_block(&self, block: &Block, serial: u32, balance: &mut BalanceTracker) -> Option<Transaction>;
}
