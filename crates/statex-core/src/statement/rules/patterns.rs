//! Common regex patterns for bank statement extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amount tokens (Indian grouping: 1,23,456.78)
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        r"^\d[\d,]*(?:\.\d+)?$"
    ).unwrap();

    pub static ref DECIMAL_TOKEN: Regex = Regex::new(
        r"^\d[\d,]*\.\d+$"
    ).unwrap();

    // First decimal amount inside a description line
    pub static ref EMBEDDED_AMOUNT: Regex = Regex::new(
        r"(?:^|\s)\d[\d,]*\.\d{1,2}(?:\s|Cr\b|Dr\b|$)"
    ).unwrap();

    // Statement period: both dates complete
    pub static ref FULL_PERIOD: Regex = Regex::new(
        r"(\d{1,2}[/\-]\d{1,2}[/\-]\d{4})\s+(?i:to)\s+(\d{1,2}[/\-]\d{1,2}[/\-]\d{4})"
    ).unwrap();

    // Statement period: second date missing its year ("01/04/2024 To 31/03")
    pub static ref PARTIAL_PERIOD: Regex = Regex::new(
        r"(\d{1,2}([/\-])\d{1,2}[/\-](\d{4}))\s+(?i:to)\s+(\d{1,2}[/\-]\d{1,2})"
    ).unwrap();

    pub static ref YEAR: Regex = Regex::new(
        r"\b((?:19|20)\d{2})\b"
    ).unwrap();

    pub static ref IFSC: Regex = Regex::new(
        r"IFSC(?:\s+Code)?\s*:?\s*([A-Z]{4}0[A-Z0-9]{6})"
    ).unwrap();

    // Union Bank: "12 05/04/2024 S81234567 UPI/DR/... 500.00 (Dr) 1500.00 (Cr)"
    pub static ref UNION_ANCHOR: Regex = Regex::new(
        r"^(\d+)\s+(\d{1,2}/\d{1,2}/\d{4})\s+([A-Z0-9]+)"
    ).unwrap();

    pub static ref UNION_ROW_START: Regex = Regex::new(
        r"^\d+\s+\d{1,2}/\d{1,2}/\d{4}"
    ).unwrap();

    pub static ref TAGGED_AMOUNT: Regex = Regex::new(
        r"(\d[\d,]*(?:\.\d+)?)\s*\((Dr|Cr)\)"
    ).unwrap();

    pub static ref UNION_NAME: Regex = Regex::new(
        r"Name\s+([A-Z][A-Z\s.]*?)\s+Customer/CIF"
    ).unwrap();

    pub static ref UNION_CIF: Regex = Regex::new(
        r"Customer/CIF ID\s+(\d+)"
    ).unwrap();

    pub static ref UNION_ACCOUNT_NUMBER: Regex = Regex::new(
        r"Account Number\s+(\d+)"
    ).unwrap();

    pub static ref ACCOUNT_TYPE: Regex = Regex::new(
        r"Account Type\s*:?\s*([A-Za-z][A-Za-z\-]*(?: [A-Za-z\-]+)*)"
    ).unwrap();

    pub static ref UNION_STATEMENT_DATE: Regex = Regex::new(
        r"Statement Date\s+(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref UNION_MOBILE: Regex = Regex::new(
        r"Mobile No\s+(\d+)"
    ).unwrap();

    pub static ref UNION_HOME_BRANCH: Regex = Regex::new(
        r"(?i:home branch)\s+([A-Z][A-Z\s]*)"
    ).unwrap();

    // Canara Bank: "Statement for A/c 4477101002157 between 01-Apr-2024 and 31-Mar-2025"
    pub static ref CANARA_ROW_START: Regex = Regex::new(
        r"^(\d{2}-\d{2}-\d{4})\b"
    ).unwrap();

    pub static ref CANARA_ACCOUNT: Regex = Regex::new(
        r"Statement for A/c\s+(\d+)"
    ).unwrap();

    pub static ref CANARA_PERIOD: Regex = Regex::new(
        r"between\s+(\d{2}-[A-Za-z]{3}-\d{4})\s+and\s+(\d{2}-[A-Za-z]{3}-\d{4})"
    ).unwrap();

    pub static ref CANARA_CUSTOMER_ID: Regex = Regex::new(
        r"^Customer Id\s+(\d+)"
    ).unwrap();

    pub static ref CANARA_NAME: Regex = Regex::new(
        r"^Name\s+(.+)"
    ).unwrap();

    pub static ref CANARA_PHONE: Regex = Regex::new(
        r"^Phone\s+(\+?\d+)"
    ).unwrap();

    pub static ref CANARA_BRANCH_CODE: Regex = Regex::new(
        r"Branch Code\s+(\d+)"
    ).unwrap();

    pub static ref CANARA_BRANCH_NAME: Regex = Regex::new(
        r"Branch Name\s+(.+)"
    ).unwrap();

    pub static ref CANARA_OPENING_BALANCE: Regex = Regex::new(
        r"^Opening Balance\s+(\d[\d,]*(?:\.\d+)?)"
    ).unwrap();

    // APGVB: "02-04-2024 02-04-2024 BY CASH   2,000.00   2,000.00Cr USER1 USER2"
    pub static ref APGVB_ROW: Regex = Regex::new(
        r"^(\d{2}-\d{2}-\d{4})\s+(\d{2}-\d{2}-\d{4})\s+(.+)"
    ).unwrap();

    pub static ref APGVB_BALANCE: Regex = Regex::new(
        r"(\d[\d,]*(?:\.\d+)?)(Cr|Dr)(?:\s|$)"
    ).unwrap();

    pub static ref APGVB_ACCOUNT_NUMBER: Regex = Regex::new(
        r"Account No\s*:\s*(\d+)"
    ).unwrap();

    pub static ref APGVB_CUSTOMER_NAME: Regex = Regex::new(
        r"Account No\s*:\s*\d+\s+INR\s+(.+)"
    ).unwrap();

    pub static ref APGVB_ACCOUNT_TYPE: Regex = Regex::new(
        r"\d+\s+(.+)"
    ).unwrap();

    pub static ref APGVB_SERVICE_OUTLET: Regex = Regex::new(
        r"Service OutLet\s*:\s*\d+\s+(.+)"
    ).unwrap();

    pub static ref APGVB_OPENING_BALANCE: Regex = Regex::new(
        r"^Opening Balance\s*:\s*(\d[\d,]*(?:\.\d+)?)"
    ).unwrap();
}
