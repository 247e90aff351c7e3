//! Andhra Pradesh Grameena Vikas Bank (APGVB) statements.
//!
//! Ledger rows carry no debit/credit marker: each row prints the amount and
//! the running balance (`2,000.00Cr`), and the direction is recovered from
//! how the balance moved since the previous row.

use rust_decimal::Decimal;
use tracing::trace;

use crate::extractor::BankParser;
use crate::models::statement::{Capability, ExtractorIdentity, MetadataField, StatementMetadata, Transaction};
use crate::statement::rules::patterns::{
    APGVB_ACCOUNT_NUMBER, APGVB_ACCOUNT_TYPE, APGVB_BALANCE, APGVB_CUSTOMER_NAME, APGVB_OPENING_BALANCE,
    APGVB_ROW, APGVB_SERVICE_OUTLET, EMBEDDED_AMOUNT,
};
use crate::statement::rules::{capture, parse_amount, parse_period, scan_metadata, FieldRule};
use crate::statement::{BalanceMove, BalanceTracker, Block, BlockLayout};

pub const BANK_NAME: &str = "Andhra Pradesh Grameena Bank";
pub const VERSION: &str = "1.0.0";

const HEADER_KEYWORDS: &[&str] = &[
    "GL.",
    "Date",
    "Value",
    "Instrmnt",
    "Particulars",
    "Transaction",
    "Debit Amount",
    "Credit Amount",
    "Balance",
    "Entry",
    "Verified",
    "User Id",
    "Order by GL. Date",
    "Page Total",
    "B/F Balance",
];

/// Parser for APGVB customer ledger statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApgvbParser;

impl ApgvbParser {
    pub fn new() -> Self {
        Self
    }
}

/// Amount and balance found on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Amounts {
    amount: Decimal,
    balance: Decimal,
}

/// Find the balance (the rightmost `1,234.00Cr` token) and the amount token
/// right before it.
fn locate_amounts(line: &str) -> Option<Amounts> {
    let caps = APGVB_BALANCE.captures_iter(line).last()?;
    let mut balance = parse_amount(&caps[1])?;
    if &caps[2] == "Dr" {
        balance = -balance;
    }

    let before = &line[..caps.get(0)?.start()];
    let amount = parse_amount(before.split_whitespace().last()?)?;
    Some(Amounts { amount, balance })
}

/// Description text ahead of the first amount on the line.
fn clean_description(text: &str) -> String {
    let cut = EMBEDDED_AMOUNT
        .find(text)
        .map(|m| m.start())
        .or_else(|| APGVB_BALANCE.find_iter(text).last().map(|m| m.start()))
        .unwrap_or(text.len());
    text[..cut].split_whitespace().collect::<Vec<_>>().join(" ")
}

impl BlockLayout for ApgvbParser {
    fn is_noise(&self, line: &str) -> bool {
        line.starts_with("---") || line.contains("Page") || HEADER_KEYWORDS.iter().any(|k| line.contains(k))
    }

    fn is_anchor(&self, line: &str) -> bool {
        APGVB_ROW.is_match(line)
    }

    fn is_complete(&self, lines: &[String]) -> bool {
        lines.iter().any(|l| locate_amounts(l).is_some())
    }
}

impl BankParser for ApgvbParser {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity::new(
            BANK_NAME,
            VERSION,
            [
                Capability::MultiPage,
                Capability::Transactions,
                Capability::FinancialSummary,
                Capability::AccountMetadata,
                Capability::StatementPeriod,
                Capability::BalanceCalculation,
                Capability::TransactionTypes,
            ],
        )
    }

    fn header_pages(&self) -> u32 {
        2
    }

    fn extract_metadata(&self, header_text: &str) -> StatementMetadata {
        const RULES: &[FieldRule] = &[
            account_number,
            customer_name,
            account_type,
            service_outlet,
            statement_period,
            opening_balance,
        ];
        scan_metadata(header_text, RULES, StatementMetadata::new(BANK_NAME, "INR"))
    }

    fn parse_block(&self, block: &Block, serial: u32, balance: &mut BalanceTracker) -> Option<Transaction> {
        let row = APGVB_ROW.captures(block.anchor())?;
        let date = row[1].to_string();

        // First line within the block that carries amount and balance
        let (found_at, amounts) = block
            .lines
            .iter()
            .enumerate()
            .find_map(|(i, line)| locate_amounts(line).map(|a| (i, a)))?;

        let mut description = vec![row[3].to_string()];
        description.extend(block.lines[1..=found_at].iter().cloned());
        let remarks = clean_description(&description.join(" "));

        let classified = balance.classify(amounts.balance);
        if classified.movement == BalanceMove::Unchanged {
            trace!("Row {} on {} left the balance unchanged", serial, date);
        }
        if classified.delta.abs() != amounts.amount {
            trace!(
                "Row {}: amount {} differs from balance movement {}",
                serial,
                amounts.amount,
                classified.delta
            );
        }

        Some(Transaction::new(
            serial,
            date,
            "",
            remarks,
            classified.transaction_type,
            amounts.amount,
            amounts.balance,
            block.page,
        ))
    }
}

fn account_number(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&APGVB_ACCOUNT_NUMBER, lines[index]).map(MetadataField::AccountNumber)
}

fn customer_name(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&APGVB_CUSTOMER_NAME, lines[index]).map(MetadataField::CustomerName)
}

fn account_type(lines: &[&str], index: usize) -> Option<MetadataField> {
    let line = lines[index];
    if !(line.contains("CURRENT DEPOSITS") || line.contains("SAVINGS")) {
        return None;
    }
    capture(&APGVB_ACCOUNT_TYPE, line).map(MetadataField::AccountType)
}

fn service_outlet(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&APGVB_SERVICE_OUTLET, lines[index]).map(MetadataField::HomeBranch)
}

fn statement_period(lines: &[&str], index: usize) -> Option<MetadataField> {
    let line = lines[index];
    if !(line.contains("Period") || line.contains("from")) {
        return None;
    }
    parse_period(lines, index).map(MetadataField::Period)
}

fn opening_balance(lines: &[&str], index: usize) -> Option<MetadataField> {
    let raw = capture(&APGVB_OPENING_BALANCE, lines[index])?;
    parse_amount(&raw).map(MetadataField::OpeningBalance)
}
