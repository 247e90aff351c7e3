//! Union Bank of India statements.
//!
//! Rows read `S.No  Date  Transaction Id  Remarks  Amount (Dr|Cr)  Balance (Dr|Cr)`
//! and may wrap over several lines. The first tagged amount is the
//! transaction, the last is the balance.

use tracing::trace;

use crate::extractor::BankParser;
use crate::models::statement::{
    Capability, ExtractorIdentity, MetadataField, StatementMetadata, Transaction, TransactionType,
};
use crate::statement::rules::patterns::{
    ACCOUNT_TYPE, IFSC, TAGGED_AMOUNT, UNION_ACCOUNT_NUMBER, UNION_ANCHOR, UNION_CIF, UNION_HOME_BRANCH,
    UNION_MOBILE, UNION_NAME, UNION_ROW_START, UNION_STATEMENT_DATE,
};
use crate::statement::rules::{capture, collect_lines, parse_amount, parse_period, scan_metadata, FieldRule};
use crate::statement::{BalanceTracker, Block, BlockLayout};

pub const BANK_NAME: &str = "Union Bank of India";
pub const VERSION: &str = "1.0.0";

const ADDRESS_STOP_WORDS: &[&str] = &[
    "Customer/CIF",
    "Account Number",
    "Account Type",
    "IFSC",
    "Statement",
    "Mobile",
    "Home branch",
];

/// Parser for Union Bank of India statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionBankParser;

impl UnionBankParser {
    pub fn new() -> Self {
        Self
    }
}

impl BlockLayout for UnionBankParser {
    fn is_noise(&self, line: &str) -> bool {
        (line.contains("S.No") && line.contains("Date") && line.contains("Transaction Id"))
            || line.starts_with("Page No")
            || line.contains("computer generated")
    }

    fn is_anchor(&self, line: &str) -> bool {
        UNION_ROW_START.is_match(line)
    }

    fn is_complete(&self, lines: &[String]) -> bool {
        TAGGED_AMOUNT.find_iter(&lines.join(" ")).count() >= 2
    }
}

impl BankParser for UnionBankParser {
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
            customer_name,
            customer_id,
            account_number,
            account_type,
            ifsc_code,
            statement_date,
            statement_period,
            mobile_number,
            home_branch,
            address,
        ];
        scan_metadata(header_text, RULES, StatementMetadata::new(BANK_NAME, "INR"))
    }

    fn parse_block(&self, block: &Block, serial: u32, _balance: &mut BalanceTracker) -> Option<Transaction> {
        let text = block.text();
        let row = UNION_ANCHOR.captures(&text)?;
        let date = row[2].to_string();
        let transaction_id = row[3].to_string();
        let id_end = row.get(3)?.end();

        let tagged: Vec<_> = TAGGED_AMOUNT.captures_iter(&text).collect();
        let (first, last) = match tagged.as_slice() {
            [first, .., last] => (first, last),
            _ => return None,
        };

        let amount = parse_amount(&first[1])?;
        let transaction_type = match &first[2] {
            "Dr" => TransactionType::Debit,
            _ => TransactionType::Credit,
        };

        let mut balance = parse_amount(&last[1])?;
        if &last[2] == "Dr" {
            balance = -balance;
        }

        let amount_start = first.get(0)?.start();
        let remarks = text
            .get(id_end..amount_start)
            .map(|r| r.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        trace!("Union row {}: {} {} {}", serial, date, transaction_type.as_str(), amount);
        Some(Transaction::new(
            serial,
            date,
            transaction_id,
            remarks,
            transaction_type,
            amount,
            balance,
            block.page,
        ))
    }
}

fn customer_name(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&UNION_NAME, lines[index]).map(MetadataField::CustomerName)
}

fn customer_id(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&UNION_CIF, lines[index]).map(MetadataField::CustomerId)
}

fn account_number(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&UNION_ACCOUNT_NUMBER, lines[index]).map(MetadataField::AccountNumber)
}

fn account_type(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&ACCOUNT_TYPE, lines[index]).map(MetadataField::AccountType)
}

fn ifsc_code(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&IFSC, lines[index]).map(MetadataField::IfscCode)
}

fn statement_date(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&UNION_STATEMENT_DATE, lines[index]).map(MetadataField::StatementDate)
}

fn statement_period(lines: &[&str], index: usize) -> Option<MetadataField> {
    if !lines[index].contains("Statement Period") {
        return None;
    }
    parse_period(lines, index).map(MetadataField::Period)
}

fn mobile_number(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&UNION_MOBILE, lines[index]).map(MetadataField::MobileNumber)
}

fn home_branch(lines: &[&str], index: usize) -> Option<MetadataField> {
    capture(&UNION_HOME_BRANCH, lines[index]).map(MetadataField::HomeBranch)
}

fn address(lines: &[&str], index: usize) -> Option<MetadataField> {
    if !lines[index].starts_with("Address") {
        return None;
    }
    collect_lines(lines, index, "Address", ADDRESS_STOP_WORDS, 3, ", ").map(MetadataField::Address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{parse_page, ParseState};
    use crate::models::statement::StatementPeriod;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const HEADER: &str = "\
Union Bank of India
Name RAVI KUMAR Customer/CIF ID 123456789
Address 12-3 MAIN ROAD
GUNTUR ANDHRA PRADESH
522001
Account Number 520101234567890
Account Type SAVINGS ACCOUNT
IFSC UBIN0812345
Statement Date 15/04/2025
Statement Period 01/04/2024 To 31/03
Mobile No 9876543210
2025
Home branch GUNTUR MAIN
";

    #[test]
    fn test_metadata() {
        let metadata = UnionBankParser.extract_metadata(HEADER);

        assert_eq!(metadata.bank_name, "Union Bank of India");
        assert_eq!(metadata.currency, "INR");
        assert_eq!(metadata.customer_name.as_deref(), Some("RAVI KUMAR"));
        assert_eq!(metadata.customer_cif_id.as_deref(), Some("123456789"));
        assert_eq!(metadata.account_number.as_deref(), Some("520101234567890"));
        assert_eq!(metadata.account_type.as_deref(), Some("SAVINGS ACCOUNT"));
        assert_eq!(metadata.ifsc_code.as_deref(), Some("UBIN0812345"));
        assert_eq!(metadata.statement_date.as_deref(), Some("15/04/2025"));
        assert_eq!(metadata.mobile_number.as_deref(), Some("9876543210"));
        assert_eq!(metadata.home_branch.as_deref(), Some("GUNTUR MAIN"));
        assert_eq!(
            metadata.address.as_deref(),
            Some("12-3 MAIN ROAD, GUNTUR ANDHRA PRADESH, 522001")
        );
        assert_eq!(
            metadata.statement_period,
            Some(StatementPeriod {
                from_date: "01/04/2024".to_string(),
                to_date: "31/03/2025".to_string(),
            })
        );
    }

    #[test]
    fn test_single_line_rows() {
        let page = "\
S.No Date Transaction Id Remarks Amount(Rs.) Balance(Rs.)
1 01/04/2024 S12345 UPI/CR/409112/RAVI 500.00 (Cr) 1,500.00 (Cr)
2 02/04/2024 S12346 ATM WDL GUNTUR 300.00 (Dr) 1,200.00 (Cr)
";
        let mut state = ParseState::new(None);
        let transactions = parse_page(&UnionBankParser, 1, page, &mut state);

        assert_eq!(transactions.len(), 2);
        let first = &transactions[0];
        assert_eq!(first.serial, 1);
        assert_eq!(first.date, "01/04/2024");
        assert_eq!(first.transaction_id, "S12345");
        assert_eq!(first.remarks, "UPI/CR/409112/RAVI");
        assert_eq!(first.credit, Some(dec("500.00")));
        assert_eq!(first.balance, dec("1500.00"));

        let second = &transactions[1];
        assert_eq!(second.serial, 2);
        assert_eq!(second.transaction_type, TransactionType::Debit);
        assert_eq!(second.debit, Some(dec("300.00")));
        assert_eq!(second.credit, None);
    }

    #[test]
    fn test_wrapped_row() {
        let page = "\
7 05/04/2024 S99887 NEFT/HDFC/
SALARY APRIL
25,000.00 (Cr)
26,200.00 (Cr)
";
        let mut state = ParseState::new(None);
        let transactions = parse_page(&UnionBankParser, 3, page, &mut state);

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].remarks, "NEFT/HDFC/ SALARY APRIL");
        assert_eq!(transactions[0].credit, Some(dec("25000.00")));
        assert_eq!(transactions[0].balance, dec("26200.00"));
        assert_eq!(transactions[0].page_number, 3);
    }

    #[test]
    fn test_overdrawn_balance_is_negative() {
        let page = "3 03/04/2024 S55555 CHARGES 50.00 (Dr) 20.00 (Dr)";
        let mut state = ParseState::new(None);
        let transactions = parse_page(&UnionBankParser, 1, page, &mut state);
        assert_eq!(transactions[0].balance, dec("-20.00"));
    }

    #[test]
    fn test_row_without_balance_is_dropped() {
        let page = "\
1 01/04/2024 S1 ONLY AMOUNT 10.00 (Cr)
2 02/04/2024 S2 OK 5.00 (Cr) 15.00 (Cr)
";
        let mut state = ParseState::new(None);
        let transactions = parse_page(&UnionBankParser, 1, page, &mut state);

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].serial, 1);
        assert_eq!(transactions[0].transaction_id, "S2");
    }
}
