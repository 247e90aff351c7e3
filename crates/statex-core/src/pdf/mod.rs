//! Page text extraction: the collaborator every extractor reads documents through.

mod extractor;

pub use extractor::{PdfDocument, PdfLoader};

use tracing::{debug, info};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Form feed, the page separator `pdftotext` writes between pages.
pub const PAGE_BREAK: char = '\u{000C}';

/// An opened document that yields plain text per page.
pub trait PageText {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Plain text of one page (1-indexed).
    fn page_text(&self, page: u32) -> Result<String>;
}

/// Opens raw document bytes.
pub trait DocumentLoader: Send + Sync {
    /// Open a document, decrypting it with `password` when it is encrypted.
    ///
    /// Fails with [`PdfError::PasswordRequired`] when the document is
    /// encrypted and no password is given, and [`PdfError::WrongPassword`]
    /// when the given password does not open it.
    fn open(&self, data: &[u8], password: Option<&str>) -> Result<Box<dyn PageText>>;
}

/// Open a document, retrying a rejected password with surrounding
/// whitespace trimmed.
pub fn open_document(
    loader: &dyn DocumentLoader,
    data: &[u8],
    password: Option<&str>,
) -> Result<Box<dyn PageText>> {
    match loader.open(data, password) {
        Err(PdfError::WrongPassword { length }) => {
            let Some(given) = password else {
                return Err(PdfError::WrongPassword { length });
            };
            let trimmed = given.trim();
            if trimmed == given {
                return Err(PdfError::WrongPassword { length });
            }
            info!("Password rejected, retrying with surrounding whitespace removed");
            match loader.open(data, Some(trimmed)) {
                Ok(doc) => {
                    info!("Document decrypted with trimmed password");
                    Ok(doc)
                }
                // Report the length the caller typed, not the trimmed one.
                Err(PdfError::WrongPassword { .. }) => Err(PdfError::WrongPassword { length }),
                Err(e) => Err(e),
            }
        }
        other => other,
    }
}

/// Pre-rendered page text held in memory.
#[derive(Debug, Clone, Default)]
pub struct TextPages {
    pages: Vec<String>,
}

impl TextPages {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Split `pdftotext`-style output on form feeds.
    ///
    /// A trailing form feed does not produce an extra page.
    pub fn from_form_feeds(text: &str) -> Self {
        let mut pages: Vec<String> = text.split(PAGE_BREAK).map(str::to_string).collect();
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        if pages.len() == 1 && pages[0].is_empty() {
            pages.clear();
        }
        Self { pages }
    }
}

impl PageText for TextPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .cloned()
            .ok_or(PdfError::InvalidPage(page))
    }
}

/// Loader for plain-text statements, optionally behind a password.
///
/// The bytes are UTF-8 text with pages separated by form feeds. Useful for
/// `pdftotext` output and for exercising extractors without PDF fixtures.
#[derive(Debug, Clone, Default)]
pub struct TextLoader {
    password: Option<String>,
}

impl TextLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `password` to open any document.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl DocumentLoader for TextLoader {
    fn open(&self, data: &[u8], password: Option<&str>) -> Result<Box<dyn PageText>> {
        if let Some(expected) = &self.password {
            match password {
                None => return Err(PdfError::PasswordRequired),
                Some(given) if given != expected => {
                    return Err(PdfError::WrongPassword { length: given.len() });
                }
                Some(_) => {}
            }
        }

        let text = std::str::from_utf8(data).map_err(|e| PdfError::Parse(e.to_string()))?;
        let pages = TextPages::from_form_feeds(text);
        if pages.page_count() == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded text document with {} pages", pages.page_count());
        Ok(Box::new(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_feed_split() {
        let pages = TextPages::from_form_feeds("page one\u{000C}page two\u{000C}");
        assert_eq!(pages.page_count(), 2);
        assert_eq!(pages.page_text(2).unwrap(), "page two");
        assert!(matches!(pages.page_text(3), Err(PdfError::InvalidPage(3))));
        assert!(matches!(pages.page_text(0), Err(PdfError::InvalidPage(0))));
    }

    #[test]
    fn test_empty_text_has_no_pages() {
        let loader = TextLoader::new();
        assert!(matches!(loader.open(b"", None), Err(PdfError::NoPages)));
    }

    #[test]
    fn test_trimmed_password_retry() {
        let loader = TextLoader::new().with_password("s3cret");
        let doc = open_document(&loader, b"hello", Some("  s3cret\n")).unwrap();
        assert_eq!(doc.page_text(1).unwrap(), "hello");
    }

    #[test]
    fn test_wrong_password_keeps_given_length() {
        let loader = TextLoader::new().with_password("s3cret");
        let err = open_document(&loader, b"hello", Some(" nope ")).err().unwrap();
        assert!(matches!(err, PdfError::WrongPassword { length: 6 }));
    }

    #[test]
    fn test_missing_password() {
        let loader = TextLoader::new().with_password("s3cret");
        let err = open_document(&loader, b"hello", None).err().unwrap();
        assert!(matches!(err, PdfError::PasswordRequired));
    }

    #[test]
    fn test_case_is_not_retried() {
        let loader = TextLoader::new().with_password("s3cret");
        assert!(open_document(&loader, b"hello", Some("S3CRET")).is_err());
    }
}
