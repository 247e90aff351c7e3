//! Error types for the statex-core library.

use thiserror::Error;

/// Document-level failures of a statement extraction.
///
/// Every bank-scoped variant names the bank identifier the caller asked for
/// and a human-readable reason. Password values never appear in any message.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The bank identifier is unknown or inactive.
    #[error("unsupported bank '{bank_id}': {reason}")]
    UnsupportedBank { bank_id: String, reason: String },

    /// The statement is encrypted and no usable password was supplied.
    #[error("cannot decrypt {bank_id} statement: {reason}")]
    Decryption { bank_id: String, reason: String },

    /// The document is unreadable, corrupt, or has no page text.
    #[error("malformed {bank_id} statement: {reason}")]
    MalformedDocument { bank_id: String, reason: String },

    /// A resolved extractor does not satisfy the extractor contract.
    #[error("extractor for '{bank_id}' violates the extractor contract: {reason}")]
    ContractViolation { bank_id: String, reason: String },

    /// A precondition on document size or page count failed.
    #[error("{bank_id} statement rejected: {reason}")]
    ResourceLimit { bank_id: String, reason: String },

    /// I/O error while reading the source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ExtractError {
    /// Attach a bank identifier to a text-extraction failure.
    pub fn from_pdf(bank_id: &str, err: PdfError) -> Self {
        let bank_id = bank_id.to_string();
        match err {
            PdfError::PasswordRequired => ExtractError::Decryption {
                bank_id,
                reason: "statement is encrypted but no password was provided".to_string(),
            },
            PdfError::WrongPassword { length } => ExtractError::Decryption {
                bank_id,
                reason: format!(
                    "provided password (length {length}) does not open the statement; passwords are case-sensitive"
                ),
            },
            other => ExtractError::MalformedDocument {
                bank_id,
                reason: other.to_string(),
            },
        }
    }

    /// Whether retrying the same request can succeed.
    ///
    /// Only failures reading the source qualify; every document-level
    /// failure needs new input or a configuration fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExtractError::Io(_))
    }
}

/// Errors reported by the text-extraction collaborator.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from a page.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and no password was given.
    #[error("PDF is encrypted")]
    PasswordRequired,

    /// The given password did not decrypt the PDF.
    #[error("wrong password (length {length})")]
    WrongPassword { length: usize },

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Result type for the statex library.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_password_maps_to_decryption() {
        let err = ExtractError::from_pdf("UNION", PdfError::WrongPassword { length: 8 });
        assert!(matches!(err, ExtractError::Decryption { .. }));
        let message = err.to_string();
        assert!(message.contains("UNION"));
        assert!(message.contains("length 8"));
    }

    #[test]
    fn test_no_pages_maps_to_malformed() {
        let err = ExtractError::from_pdf("CANARA", PdfError::NoPages);
        assert!(matches!(err, ExtractError::MalformedDocument { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_io_failure_is_retryable() {
        let err = ExtractError::from(std::io::Error::from(std::io::ErrorKind::TimedOut));
        assert!(err.is_retryable());
        assert!(!ExtractError::Config("duplicate bank".to_string()).is_retryable());
    }
}
