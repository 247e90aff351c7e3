//! PDF page text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace};

use super::{DocumentLoader, PageText, Result};
use crate::error::PdfError;

/// Magic bytes every PDF file starts with.
const PDF_MAGIC: &[u8] = b"%PDF";

/// Opens PDF bytes with lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for PdfLoader {
    fn open(&self, data: &[u8], password: Option<&str>) -> Result<Box<dyn PageText>> {
        let document = PdfDocument::load(data, password)?;
        Ok(Box::new(document))
    }
}

/// A loaded, decrypted PDF document.
pub struct PdfDocument {
    document: Document,
    /// Page texts rendered by pdf-extract, when it could handle the file.
    rendered: Option<Vec<String>>,
}

impl PdfDocument {
    /// Parse and, if needed, decrypt a PDF.
    pub fn load(data: &[u8], password: Option<&str>) -> Result<Self> {
        if !data.starts_with(PDF_MAGIC) {
            return Err(PdfError::Parse("not a PDF document".to_string()));
        }

        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let plain = if document.is_encrypted() {
            let Some(password) = password else {
                return Err(PdfError::PasswordRequired);
            };
            if document.decrypt(password).is_err() {
                return Err(PdfError::WrongPassword { length: password.len() });
            }
            debug!("Decrypted PDF with {}-character password", password.len());

            // pdf-extract reads bytes, so hand it the decrypted document
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let rendered = match pdf_extract::extract_text_from_mem_by_pages(&plain) {
            Ok(pages) if pages.len() == page_count => Some(pages),
            Ok(pages) => {
                debug!(
                    "pdf-extract returned {} pages for a {}-page document, using lopdf text",
                    pages.len(),
                    page_count
                );
                None
            }
            Err(e) => {
                debug!("pdf-extract failed ({}), using lopdf text", e);
                None
            }
        };

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self { document, rendered })
    }
}

impl PageText for PdfDocument {
    fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }

        if let Some(text) = self
            .rendered
            .as_ref()
            .and_then(|pages| pages.get((page - 1) as usize))
        {
            return Ok(text.clone());
        }

        trace!("Extracting page {} with lopdf", page);
        self.document
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let err = PdfLoader::new().open(b"Statement for A/c 123", None).err().unwrap();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(matches!(PdfDocument::load(b"", None), Err(PdfError::Parse(_))));
    }
}
