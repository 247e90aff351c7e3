//! Statement data models: the wire contract consumed by export and display.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Complete output of one statement extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementResult {
    /// Number of transactions in `transactions`.
    pub total_transactions: usize,

    /// When the extraction finished.
    pub processed_at: DateTime<Utc>,

    /// Header fields recovered from the first pages.
    pub statement_metadata: StatementMetadata,

    /// Totals derived from `transactions`.
    pub financial_summary: FinancialSummary,

    /// Transactions in document order.
    pub transactions: Vec<Transaction>,

    /// Identity of the extractor that produced this result.
    pub extractor_metadata: ExtractorIdentity,
}

/// Account and statement header information.
///
/// Every field except the bank name and currency is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementMetadata {
    /// Display name of the bank.
    pub bank_name: String,

    /// Currency code, fixed per bank.
    pub currency: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    /// Customer or CIF identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_cif_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifsc_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Date the statement was generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_period: Option<StatementPeriod>,

    /// Balance before the first transaction of the period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<Decimal>,
}

/// Statement date range, in the bank's native date format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub from_date: String,
    pub to_date: String,
}

/// One header field recovered by a field rule.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataField {
    AccountNumber(String),
    CustomerName(String),
    CustomerId(String),
    AccountType(String),
    HomeBranch(String),
    BranchCode(String),
    IfscCode(String),
    MobileNumber(String),
    Address(String),
    StatementDate(String),
    Period(StatementPeriod),
    OpeningBalance(Decimal),
}

impl StatementMetadata {
    /// Create metadata carrying only the fixed bank fields.
    pub fn new(bank_name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            bank_name: bank_name.into(),
            currency: currency.into(),
            ..Self::default()
        }
    }

    /// Store a recovered field. A later match replaces an earlier one.
    pub fn merge(&mut self, field: MetadataField) {
        match field {
            MetadataField::AccountNumber(v) => self.account_number = Some(v),
            MetadataField::CustomerName(v) => self.customer_name = Some(v),
            MetadataField::CustomerId(v) => self.customer_cif_id = Some(v),
            MetadataField::AccountType(v) => self.account_type = Some(v),
            MetadataField::HomeBranch(v) => self.home_branch = Some(v),
            MetadataField::BranchCode(v) => self.branch_code = Some(v),
            MetadataField::IfscCode(v) => self.ifsc_code = Some(v),
            MetadataField::MobileNumber(v) => self.mobile_number = Some(v),
            MetadataField::Address(v) => self.address = Some(v),
            MetadataField::StatementDate(v) => self.statement_date = Some(v),
            MetadataField::Period(v) => self.statement_period = Some(v),
            MetadataField::OpeningBalance(v) => self.opening_balance = Some(v),
        }
    }
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "Debit",
            Self::Credit => "Credit",
        }
    }
}

/// A single normalized transaction.
///
/// Exactly one of `debit` and `credit` is set, matching `transaction_type`.
/// Build through [`Transaction::new`] to keep that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// 1-based position in the statement, contiguous across pages.
    #[serde(rename = "S.No")]
    pub serial: u32,

    /// Transaction date in the bank's native format.
    #[serde(rename = "Date")]
    pub date: String,

    /// Bank transaction identifier, empty when the bank prints none.
    #[serde(rename = "Transaction_ID")]
    pub transaction_id: String,

    /// Description with amount and balance tokens removed.
    #[serde(rename = "Remarks")]
    pub remarks: String,

    #[serde(rename = "Debit", with = "blank_amount")]
    pub debit: Option<Decimal>,

    #[serde(rename = "Credit", with = "blank_amount")]
    pub credit: Option<Decimal>,

    /// Running balance after this transaction.
    #[serde(rename = "Balance")]
    pub balance: Decimal,

    #[serde(rename = "Transaction_Type")]
    pub transaction_type: TransactionType,

    /// Page on which the transaction starts.
    #[serde(rename = "Page_Number")]
    pub page_number: u32,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        serial: u32,
        date: impl Into<String>,
        transaction_id: impl Into<String>,
        remarks: impl Into<String>,
        transaction_type: TransactionType,
        amount: Decimal,
        balance: Decimal,
        page_number: u32,
    ) -> Self {
        let (debit, credit) = match transaction_type {
            TransactionType::Debit => (Some(amount), None),
            TransactionType::Credit => (None, Some(amount)),
        };
        Self {
            serial,
            date: date.into(),
            transaction_id: transaction_id.into(),
            remarks: remarks.into(),
            debit,
            credit,
            balance,
            transaction_type,
            page_number,
        }
    }

    /// Transaction magnitude, whichever side it is on.
    pub fn amount(&self) -> Decimal {
        self.debit.or(self.credit).unwrap_or_default()
    }

    /// Signed effect on the balance: credits positive, debits negative.
    pub fn signed_amount(&self) -> Decimal {
        self.credit.unwrap_or_default() - self.debit.unwrap_or_default()
    }

    /// Whether exactly one side is set and it agrees with the type.
    pub fn is_consistent(&self) -> bool {
        match (self.debit, self.credit, self.transaction_type) {
            (Some(_), None, TransactionType::Debit) => true,
            (None, Some(_), TransactionType::Credit) => true,
            _ => false,
        }
    }
}

/// Totals over a statement's transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    /// `total_credits - total_debits`.
    pub net_change: Decimal,
    pub transaction_count: usize,
    pub date_range: DateRange,
}

impl FinancialSummary {
    /// How far the balances disagree with the net change.
    pub fn discrepancy(&self) -> Decimal {
        (self.closing_balance - self.opening_balance) - self.net_change
    }

    /// Whether `closing - opening == net_change`.
    pub fn is_reconciled(&self) -> bool {
        self.discrepancy().is_zero()
    }
}

/// Earliest and latest transaction dates, as printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// A named feature an extractor declares support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Opens encrypted statements given a password.
    PasswordProtected,
    /// Follows transactions across page boundaries.
    MultiPage,
    /// Extracts transaction rows.
    Transactions,
    /// Produces a financial summary.
    FinancialSummary,
    /// Extracts account header fields.
    AccountMetadata,
    /// Recovers the statement period.
    StatementPeriod,
    /// Derives transaction direction from the running balance.
    BalanceCalculation,
    /// Classifies transactions as debit or credit.
    TransactionTypes,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::PasswordProtected,
        Capability::MultiPage,
        Capability::Transactions,
        Capability::FinancialSummary,
        Capability::AccountMetadata,
        Capability::StatementPeriod,
        Capability::BalanceCalculation,
        Capability::TransactionTypes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PasswordProtected => "password_protected",
            Self::MultiPage => "multi_page",
            Self::Transactions => "transactions",
            Self::FinancialSummary => "financial_summary",
            Self::AccountMetadata => "account_metadata",
            Self::StatementPeriod => "statement_period",
            Self::BalanceCalculation => "balance_calculation",
            Self::TransactionTypes => "transaction_types",
        }
    }

    /// Parse a capability tag such as `"multi_page"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == tag.trim())
    }
}

/// Who produced a result: bank, extractor version, declared capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorIdentity {
    pub bank_name: String,
    pub version: String,
    pub capabilities: Vec<Capability>,
}

impl ExtractorIdentity {
    pub fn new(
        bank_name: impl Into<String>,
        version: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            bank_name: bank_name.into(),
            version: version.into(),
            capabilities: capabilities.into_iter().collect(),
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Serializes an optional amount as a decimal string, blank when absent.
mod blank_amount {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(amount) => serializer.serialize_str(&amount.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        Decimal::from_str(raw).map(Some).map_err(serde::de::Error::custom)
    }
}
