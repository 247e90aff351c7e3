//! The extraction pipeline shared by every bank.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::{BankParser, StatementExtractor, StatementSource};
use crate::error::{ExtractError, Result};
use crate::models::config::LimitsConfig;
use crate::models::statement::{ExtractorIdentity, StatementResult, Transaction};
use crate::pdf::{open_document, DocumentLoader, PageText};
use crate::statement::{calculate_summary, BalanceTracker, Segmenter};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Per-extraction parse state.
///
/// Created fresh for every document so nothing carries over between
/// extractions. Within one document it carries the open block, the
/// running balance and the next serial number across pages.
#[derive(Debug)]
pub struct ParseState {
    pub segmenter: Segmenter,
    pub balance: BalanceTracker,
    next_serial: u32,
}

impl ParseState {
    pub fn new(opening_balance: Option<Decimal>) -> Self {
        Self {
            segmenter: Segmenter::new(),
            balance: BalanceTracker::new(opening_balance.unwrap_or_default()),
            next_serial: 1,
        }
    }

    /// Serial number the next parsed transaction will get.
    pub fn next_serial(&self) -> u32 {
        self.next_serial
    }

    /// End of document.
    pub fn finish(&mut self) {
        self.segmenter.finish();
    }
}

/// Parse the transactions completed on one page.
///
/// Serial numbers are only consumed by blocks that parse, so they stay
/// contiguous when rows are skipped.
pub fn parse_page<P: BankParser + ?Sized>(
    parser: &P,
    page: u32,
    text: &str,
    state: &mut ParseState,
) -> Vec<Transaction> {
    let blocks = state.segmenter.feed_page(parser, page, text);
    let mut transactions = Vec::with_capacity(blocks.len());

    for block in blocks {
        match parser.parse_block(&block, state.next_serial, &mut state.balance) {
            Some(transaction) => {
                state.next_serial += 1;
                transactions.push(transaction);
            }
            None => warn!("Page {}: skipping unparseable transaction: {}", block.page, block.preview()),
        }
    }

    transactions
}

/// Statement extractor for one bank: a [`BankParser`] driven through the
/// shared pipeline.
pub struct BankExtractor<P> {
    bank_id: String,
    parser: P,
    identity: ExtractorIdentity,
    loader: Arc<dyn DocumentLoader>,
    limits: LimitsConfig,
    identifiers: Vec<String>,
}

impl<P: BankParser> BankExtractor<P> {
    /// Create an extractor reporting failures under `bank_id`.
    pub fn new(bank_id: impl Into<String>, parser: P, loader: Arc<dyn DocumentLoader>) -> Self {
        let identity = parser.identity();
        Self {
            bank_id: bank_id.into(),
            parser,
            identity,
            loader,
            limits: LimitsConfig::default(),
            identifiers: Vec::new(),
        }
    }

    /// Set the document size and page limits.
    pub fn with_limits(mut self, limits: LimitsConfig) -> Self {
        self.limits = limits;
        self
    }

    /// Set the phrases expected on the first page of a genuine statement.
    pub fn with_identifiers(mut self, identifiers: Vec<String>) -> Self {
        self.identifiers = identifiers.into_iter().map(|i| i.to_lowercase()).collect();
        self
    }

    /// Bank identifier failures are reported under.
    pub fn bank_id(&self) -> &str {
        &self.bank_id
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Run the pipeline over an opened document.
    pub fn extract_from_document(&self, document: &dyn PageText) -> Result<StatementResult> {
        let start = Instant::now();
        let page_count = document.page_count();

        if page_count == 0 {
            return Err(self.malformed("document has no pages"));
        }
        if page_count > self.limits.max_pages {
            return Err(ExtractError::ResourceLimit {
                bank_id: self.bank_id.clone(),
                reason: format!("{} pages exceeds the limit of {}", page_count, self.limits.max_pages),
            });
        }

        let pages: Vec<(u32, String)> = (1..=page_count)
            .filter_map(|page| match document.page_text(page) {
                Ok(text) => Some((page, text)),
                Err(e) => {
                    warn!("Skipping page {}: {}", page, e);
                    None
                }
            })
            .collect();

        if pages.iter().all(|(_, text)| text.trim().is_empty()) {
            return Err(self.malformed("no text could be extracted from any page"));
        }
        self.check_first_page(&pages);

        let header_text = pages
            .iter()
            .filter(|(page, _)| *page <= self.parser.header_pages())
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let metadata = self.parser.extract_metadata(&header_text);
        debug!("Statement metadata: {:?}", metadata);

        let mut state = ParseState::new(metadata.opening_balance);
        let mut transactions = Vec::new();
        for (page, text) in &pages {
            let found = parse_page(&self.parser, *page, text, &mut state);
            debug!("Page {}: {} transactions", page, found.len());
            transactions.extend(found);
        }
        state.finish();
        if state.segmenter.dropped() > 0 {
            warn!("Dropped {} incomplete transactions", state.segmenter.dropped());
        }

        let financial_summary = calculate_summary(&transactions, metadata.opening_balance);

        info!(
            "Extracted {} {} transactions from {} pages in {}ms",
            transactions.len(),
            self.bank_id,
            page_count,
            start.elapsed().as_millis()
        );

        Ok(StatementResult {
            total_transactions: transactions.len(),
            processed_at: Utc::now(),
            statement_metadata: metadata,
            financial_summary,
            transactions,
            extractor_metadata: self.identity.clone(),
        })
    }

    fn check_first_page(&self, pages: &[(u32, String)]) {
        let Some((_, first)) = pages.iter().find(|(page, _)| *page == 1) else {
            warn!("First page has no text");
            return;
        };

        if first.trim().len() < self.limits.min_text_length {
            warn!("First page has only {} characters of text", first.trim().len());
        }

        if !self.identifiers.is_empty() {
            let lower = first.to_lowercase();
            if !self.identifiers.iter().any(|id| lower.contains(id.as_str())) {
                warn!(
                    "First page does not look like a {} statement",
                    self.identity.bank_name
                );
            }
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> ExtractError {
        ExtractError::MalformedDocument {
            bank_id: self.bank_id.clone(),
            reason: reason.into(),
        }
    }
}

impl<P: BankParser> StatementExtractor for BankExtractor<P> {
    fn identity(&self) -> &ExtractorIdentity {
        &self.identity
    }

    fn extract_complete_statement(&self, source: &StatementSource, password: Option<&str>) -> Result<StatementResult> {
        info!("Extracting {} statement from {}", self.bank_id, source);

        let data = source.read()?;

        let max_bytes = self.limits.max_file_size_mb * BYTES_PER_MB;
        if data.len() as u64 > max_bytes {
            return Err(ExtractError::ResourceLimit {
                bank_id: self.bank_id.clone(),
                reason: format!(
                    "file is {:.1} MB, the limit is {} MB",
                    data.len() as f64 / BYTES_PER_MB as f64,
                    self.limits.max_file_size_mb
                ),
            });
        }

        let document = open_document(self.loader.as_ref(), &data, password)
            .map_err(|e| ExtractError::from_pdf(&self.bank_id, e))?;

        self.extract_from_document(document.as_ref())
    }
}
