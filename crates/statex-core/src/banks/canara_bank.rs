//! Canara Bank statements.
//!
//! A row opens with its date, wraps the particulars over several lines,
//! closes the particulars with a `Chq:` line, and prints the amount and
//! balance on the line after that.

use crate::extractor::BankParser;
use crate::models::statement::{
    Capability, ExtractorIdentity, MetadataField, StatementMetadata, StatementPeriod, Transaction,
    TransactionType,
};
use crate::statement::rules::patterns::{
    ACCOUNT_TYPE, CANARA_ACCOUNT, CANARA_BRANCH_CODE, CANARA_BRANCH_NAME, CANARA_CUSTOMER_ID, CANARA_NAME,
    CANARA_OPENING_BALANCE, CANARA_PERIOD, CANARA_PHONE, CANARA_ROW_START, IFSC,
};
use crate::statement::rules::{capture, collect_lines, decimal_tokens, parse_amount, scan_metadata, FieldRule};
use crate::statement::{BalanceTracker, Block, BlockLayout};

pub const BANK_NAME: &str = "Canara Bank";
pub const VERSION: &str = "1.0.0";

const CHEQUE_MARKER: &str = "Chq:";
const DEBIT_MARKER: &str = "/DR/";

const COLUMN_HEADERS: &[&str] = &["Date", "Particulars", "Deposits", "Withdrawals", "Balance"];
const ADDRESS_STOP_WORDS: &[&str] = &["Branch Code", "Branch Name", "IFSC", "Date"];

/// Parser for Canara Bank statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanaraBankParser;

impl CanaraBankParser {
    pub fn new() -> Self {
        Self
    }
}

fn cheque_line(lines: &[String]) -> Option<usize> {
    lines.iter().position(|l| l.starts_with(CHEQUE_MARKER))
}

impl BlockLayout for CanaraBankParser {
    fn is_noise(&self, line: &str) -> bool {
        COLUMN_HEADERS.iter().any(|h| line.contains(h)) || line.starts_with("Page ")
    }

    /// Particulars may mention a column name; only a repeated header row
    /// or a page footer interrupts a wrapped row.
    fn is_noise_in_block(&self, line: &str) -> bool {
        COLUMN_HEADERS.iter().filter(|h| line.contains(*h)).count() >= 3 || line.starts_with("Page ")
    }

    fn is_anchor(&self, line: &str) -> bool {
        CANARA_ROW_START.is_match(line)
    }

    fn is_complete(&self, lines: &[String]) -> bool {
        cheque_line(lines).is_some_and(|chq| lines.len() > chq + 1)
    }
}

impl BankParser for CanaraBankParser {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity::new(
            BANK_NAME,
            VERSION,
            [
                Capability::PasswordProtected,
                Capability::MultiPage,
                Capability::Transactions,
                Capability::FinancialSummary,
                Capability::AccountMetadata,
                Capability::StatementPeriod,
                Capability::TransactionTypes,
            ],
        )
    }

    fn extract_metadata(&self, header_text: &str) -> StatementMetadata {
        const RULES: &[FieldRule] = &[
            account_number,
            statement_period,
            customer_id,
            customer_name,
            phone,
            address,
            branch_code,
            branch_name,
            ifsc_code,
            account_type,
            opening_balance,
        ];
        scan_metadata(header_text, RULES, StatementMetadata::new(BANK_NAME, "INR"))
    }

    fn parse_block(&self, block: &Block, serial: u32, _balance: &mut BalanceTracker) -> Option<Transaction> {
        let date = CANARA_ROW_START.captures(block.anchor())?[1].to_string();
        let chq = cheque_line(&block.lines)?;
        let amounts = decimal_tokens(block.lines.get(chq + 1)?);
        let (amount, balance) = match amounts.as_slice() {
            [amount, balance, ..] => (*amount, *balance),
            _ => return None,
        };

        let particulars = block.lines[..=chq].join(" ");
        let transaction_type = if particulars.contains(DEBIT_MARKER) {
            TransactionType::Debit
        } else {
            TransactionType::Credit
        };

        let remarks = particulars[date.len()..]
            .split_whitespace()
            .filter(|w| *w != CHEQUE_MARKER)
            .collect::<Vec<_>>()
            .join(" ");

        Some(Transaction::new(
            serial,
            date,
            "",
            remarks,
            transaction_type,
            amount,
            balance,
            block.page,
        ))
    }
}

fn account_number(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&CANARA_ACCOUNT, lines[index]).map(MetadataField::AccountNumber)
}

fn statement_period(lines: &[&str], index: usize) -> Option<MetadataField> {
    let caps = CANARA_PERIOD.captures(lines[index])?;
    Some(MetadataField::Period(StatementPeriod {
        from_date: caps[1].to_string(),
        to_date: caps[2].to_string(),
    }))
}

fn customer_id(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&CANARA_CUSTOMER_ID, lines[index]).map(MetadataField::CustomerId)
}

fn customer_name(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&CANARA_NAME, lines[index]).map(MetadataField::CustomerName)
}

fn phone(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&CANARA_PHONE, lines[index]).map(MetadataField::MobileNumber)
}

fn address(lines: &[&str], index: usize) -> Option<MetadataField> {
    if !lines[index].starts_with("Address") {
        return None;
    }
    collect_lines(lines, index, "Address", ADDRESS_STOP_WORDS, 4, " ").map(MetadataField::Address)
}

fn branch_code(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&CANARA_BRANCH_CODE, lines[index]).map(MetadataField::BranchCode)
}

fn branch_name(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&CANARA_BRANCH_NAME, lines[index]).map(MetadataField::HomeBranch)
}

fn ifsc_code(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&IFSC, lines[index]).map(MetadataField::IfscCode)
}

fn account_type(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&ACCOUNT_TYPE, lines[index]).map(MetadataField::AccountType)
}

fn opening_balance(lines: &[&str], index: usize) -> Option<MetadataField> {
    let raw = capture(&CANARA_OPENING_BALANCE, lines[index])?;
    parse_amount(&raw).map(MetadataField::OpeningBalance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{parse_page, ParseState};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_metadata() {
        let header = "\
Canara Bank
Statement for A/c 4477101002157 between 01-Apr-2024 and 31-Mar-2025
Customer Id 998877665
Name SITA DEVI
Phone +919876543210
Address 4-56 TEMPLE STREET
VIJAYAWADA
KRISHNA DT
Branch Code 4477
Branch Name VIJAYAWADA MAIN
IFSC Code CNRB0004477
Opening Balance 9,374.06
";
        let metadata = CanaraBankParser.extract_metadata(header);

        assert_eq!(metadata.account_number.as_deref(), Some("4477101002157"));
        assert_eq!(
            metadata.statement_period,
            Some(StatementPeriod {
                from_date: "01-Apr-2024".to_string(),
                to_date: "31-Mar-2025".to_string(),
            })
        );
        assert_eq!(metadata.customer_cif_id.as_deref(), Some("998877665"));
        assert_eq!(metadata.customer_name.as_deref(), Some("SITA DEVI"));
        assert_eq!(metadata.mobile_number.as_deref(), Some("+919876543210"));
        assert_eq!(
            metadata.address.as_deref(),
            Some("4-56 TEMPLE STREET VIJAYAWADA KRISHNA DT")
        );
        assert_eq!(metadata.branch_code.as_deref(), Some("4477"));
        assert_eq!(metadata.home_branch.as_deref(), Some("VIJAYAWADA MAIN"));
        assert_eq!(metadata.ifsc_code.as_deref(), Some("CNRB0004477"));
        assert_eq!(metadata.opening_balance, Some(dec("9374.06")));
    }

    #[test]
    fn test_rows() {
        let page = "\
Date Particulars Deposits Withdrawals Balance
Opening Balance 9,374.06
01-04-2024 UPI/DR/409100/GROCERY
STORE/YESB
Chq:
500.00 8,874.06
02-04-2024 NEFT/CR/SALARY
Chq: 000123
25,000.00 33,874.06
";
        let mut state = ParseState::new(None);
        let transactions = parse_page(&CanaraBankParser, 1, page, &mut state);

        assert_eq!(transactions.len(), 2);
        let first = &transactions[0];
        assert_eq!(first.date, "01-04-2024");
        assert_eq!(first.transaction_type, TransactionType::Debit);
        assert_eq!(first.debit, Some(dec("500.00")));
        assert_eq!(first.balance, dec("8874.06"));
        assert_eq!(first.remarks, "UPI/DR/409100/GROCERY STORE/YESB");
        assert_eq!(first.transaction_id, "");

        let second = &transactions[1];
        assert_eq!(second.serial, 2);
        assert_eq!(second.transaction_type, TransactionType::Credit);
        assert_eq!(second.credit, Some(dec("25000.00")));
        assert_eq!(second.remarks, "NEFT/CR/SALARY 000123");
    }

    #[test]
    fn test_next_date_interrupts_row() {
        let page = "\
01-04-2024 UPI/DR/1/SHOP
02-04-2024 UPI/CR/2/REFUND
Chq:
10.00 20.00
";
        let mut state = ParseState::new(None);
        let transactions = parse_page(&CanaraBankParser, 1, page, &mut state);

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].date, "02-04-2024");
        assert_eq!(transactions[0].serial, 1);
    }

    #[test]
    fn test_column_words_inside_particulars() {
        let page = "\
01-04-2024 NEFT/CR/ARREARS
Balance transfer Date 31-03
Chq:
100.00 200.00
";
        let mut state = ParseState::new(None);
        let transactions = parse_page(&CanaraBankParser, 1, page, &mut state);

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].remarks, "NEFT/CR/ARREARS Balance transfer Date 31-03");
    }

    #[test]
    fn test_header_row_inside_wrapped_row_is_skipped() {
        let page_one = "01-04-2024 UPI/DR/1/SHOP\nPage 1 of 2";
        let page_two = "Date Particulars Deposits Withdrawals Balance\nChq:\n10.00 20.00";
        let mut state = ParseState::new(None);

        assert!(parse_page(&CanaraBankParser, 1, page_one, &mut state).is_empty());
        let transactions = parse_page(&CanaraBankParser, 2, page_two, &mut state);

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].remarks, "UPI/DR/1/SHOP");
        assert_eq!(transactions[0].page_number, 1);
    }

    #[test]
    fn test_single_amount_is_rejected() {
        let page = "\
01-04-2024 UPI/DR/1/SHOP
Chq:
10.00
";
        let mut state = ParseState::new(None);
        assert!(parse_page(&CanaraBankParser, 1, page, &mut state).is_empty());
    }
}
