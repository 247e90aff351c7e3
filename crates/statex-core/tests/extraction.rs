//! End-to-end extraction through the registry, using text documents.

use std::str::FromStr;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use statex_core::{
    BankConfig, Capability, ConfigStore, ExtractError, ExtractorIdentity, ExtractorRegistry, LimitsConfig, MemoryConfigStore,
    StatementExtractor, StatementResult, StatementSource, StatexConfig, TextLoader, TransactionType,
};

const PASSWORD: &str = "RAVI1504";

const UNION_PAGE_1: &str = "\
Union Bank of India
Name RAVI KUMAR Customer/CIF ID 123456789
Account Number 520101234567890
Statement Period 01/04/2024 To 30/04/2024
S.No Date Transaction Id Remarks Amount(Rs.) Balance(Rs.)
1 01/04/2024 S100 UPI/CR/1/RAVI 1,000.00 (Cr) 6,000.00 (Cr)
2 02/04/2024 S101 ATM WDL 500.00 (Dr) 5,500.00 (Cr)
3 03/04/2024 S102 NEFT/HDFC/
SALARY
";

const UNION_PAGE_2: &str = "\
Page No 2
20,000.00 (Cr) 25,500.00 (Cr)
4 04/04/2024 S103 CHARGES 50.00 (Dr) 25,450.00 (Cr)
";

const APGVB_STATEMENT: &str = "\
ANDHRA PRADESH GRAMEENA VIKAS BANK
Customer Account Ledger Report from 01-04-2024 to 30-04-2024
Account No : 62012345678 INR LAKSHMI NARAYANA
Opening Balance : 1,000.00
GL. Date Value Date Particulars Debit Amount Credit Amount Balance
01-04-2024 01-04-2024 BY CASH 500.00 1,500.00Cr U1 U2
02-04-2024 02-04-2024 ATM WDL 300.00 1,200.00Cr U1 U2
03-04-2024 03-04-2024 NEFT SALARY 600.00 1,800.00Cr U1 U2
";

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn document(pages: &[&str]) -> StatementSource {
    StatementSource::Bytes(pages.join("\u{000C}").into_bytes())
}

fn registry_with(store: Arc<MemoryConfigStore>, limits: LimitsConfig) -> ExtractorRegistry {
    ExtractorRegistry::new(store, Arc::new(TextLoader::new().with_password(PASSWORD)), limits)
}

fn registry() -> ExtractorRegistry {
    registry_with(
        Arc::new(MemoryConfigStore::from_config(&StatexConfig::default())),
        LimitsConfig::default(),
    )
}

fn extract_union(registry: &ExtractorRegistry) -> StatementResult {
    registry
        .extract("UNION", &document(&[UNION_PAGE_1, UNION_PAGE_2]), Some(PASSWORD))
        .unwrap()
}

#[test]
fn test_union_statement_across_pages() {
    let result = extract_union(&registry());

    assert_eq!(result.total_transactions, 4);
    assert_eq!(result.transactions.len(), 4);

    let serials: Vec<u32> = result.transactions.iter().map(|t| t.serial).collect();
    assert_eq!(serials, vec![1, 2, 3, 4]);
    for transaction in &result.transactions {
        assert!(transaction.is_consistent(), "{:?}", transaction);
    }

    let wrapped = &result.transactions[2];
    assert_eq!(wrapped.page_number, 1);
    assert_eq!(wrapped.remarks, "NEFT/HDFC/ SALARY");
    assert_eq!(wrapped.credit, Some(dec("20000.00")));
    assert_eq!(result.transactions[3].page_number, 2);

    let metadata = &result.statement_metadata;
    assert_eq!(metadata.account_number.as_deref(), Some("520101234567890"));
    assert_eq!(metadata.customer_name.as_deref(), Some("RAVI KUMAR"));

    let summary = &result.financial_summary;
    assert_eq!(summary.opening_balance, dec("5000.00"));
    assert_eq!(summary.closing_balance, dec("25450.00"));
    assert_eq!(summary.total_credits, dec("21000.00"));
    assert_eq!(summary.total_debits, dec("550.00"));
    assert_eq!(summary.transaction_count, 4);
    assert!(summary.is_reconciled());

    assert_eq!(result.extractor_metadata.bank_name, "Union Bank of India");
}

#[test]
fn test_extraction_is_repeatable() {
    let registry = registry();
    let first = extract_union(&registry);
    let second = extract_union(&registry);

    assert_eq!(first.transactions, second.transactions);
    assert_eq!(first.statement_metadata, second.statement_metadata);
    assert_eq!(first.financial_summary, second.financial_summary);
}

#[test]
fn test_password_with_whitespace_is_trimmed() {
    let result = registry()
        .extract("UNION", &document(&[UNION_PAGE_1, UNION_PAGE_2]), Some(" RAVI1504\n"))
        .unwrap();
    assert_eq!(result.total_transactions, 4);
}

#[test]
fn test_wrong_password() {
    let err = registry()
        .extract("UNION", &document(&[UNION_PAGE_1]), Some("ravi1504"))
        .unwrap_err();

    assert!(matches!(err, ExtractError::Decryption { .. }));
    let message = err.to_string();
    assert!(message.contains("UNION"));
    assert!(message.contains("length 8"));
    assert!(!message.contains("ravi1504"));
}

#[test]
fn test_missing_password() {
    let err = registry()
        .extract("UNION", &document(&[UNION_PAGE_1]), None)
        .unwrap_err();
    assert!(matches!(err, ExtractError::Decryption { .. }));
}

#[test]
fn test_balance_delta_statement() {
    let result = registry()
        .extract("APGVB", &document(&[APGVB_STATEMENT]), Some(PASSWORD))
        .unwrap();

    let types: Vec<TransactionType> = result.transactions.iter().map(|t| t.transaction_type).collect();
    assert_eq!(
        types,
        vec![TransactionType::Credit, TransactionType::Debit, TransactionType::Credit]
    );
    assert_eq!(result.statement_metadata.opening_balance, Some(dec("1000.00")));

    let summary = &result.financial_summary;
    assert_eq!(summary.opening_balance, dec("1000.00"));
    assert_eq!(summary.closing_balance, dec("1800.00"));
    assert_eq!(summary.net_change, dec("800.00"));
    assert!(summary.is_reconciled());
    assert_eq!(summary.date_range.from_date.as_deref(), Some("01-04-2024"));
    assert_eq!(summary.date_range.to_date.as_deref(), Some("03-04-2024"));
}

#[test]
fn test_statement_without_transactions() {
    let header = "Union Bank of India\nAccount Number 520101234567890\n";
    let result = registry()
        .extract("UNION", &document(&[header]), Some(PASSWORD))
        .unwrap();

    assert_eq!(result.total_transactions, 0);
    assert_eq!(result.financial_summary.opening_balance, Decimal::ZERO);
    assert_eq!(result.financial_summary.closing_balance, Decimal::ZERO);
    assert_eq!(result.financial_summary.transaction_count, 0);
    assert_eq!(
        result.statement_metadata.account_number.as_deref(),
        Some("520101234567890")
    );
}

#[test]
fn test_blank_document_is_malformed() {
    let err = registry()
        .extract("CANARA", &document(&["  ", "\n"]), Some(PASSWORD))
        .unwrap_err();
    assert!(matches!(err, ExtractError::MalformedDocument { .. }));

    let err = registry()
        .extract("CANARA", &StatementSource::Bytes(Vec::new()), Some(PASSWORD))
        .unwrap_err();
    assert!(matches!(err, ExtractError::MalformedDocument { .. }));
}

#[test]
fn test_page_limit() {
    let limits = LimitsConfig {
        max_pages: 1,
        ..LimitsConfig::default()
    };
    let registry = registry_with(
        Arc::new(MemoryConfigStore::from_config(&StatexConfig::default())),
        limits,
    );

    let err = registry
        .extract("UNION", &document(&[UNION_PAGE_1, UNION_PAGE_2]), Some(PASSWORD))
        .unwrap_err();
    assert!(matches!(err, ExtractError::ResourceLimit { .. }));
}

#[test]
fn test_unsupported_bank() {
    let err = registry()
        .extract("SBI", &document(&[UNION_PAGE_1]), Some(PASSWORD))
        .unwrap_err();
    assert!(matches!(err, ExtractError::UnsupportedBank { .. }));
    assert!(err.to_string().contains("SBI"));
}

#[test]
fn test_reload_picks_up_new_configuration() {
    let store = Arc::new(MemoryConfigStore::from_config(&StatexConfig::default()));
    let registry = registry_with(Arc::clone(&store), LimitsConfig::default());
    extract_union(&registry);

    let mut union = store.banks().into_iter().find(|b| b.bank_id == "UNION").unwrap();
    union.max_file_size_mb = 0;
    store.upsert(union);

    // Cached descriptor still applies until reloaded
    extract_union(&registry);

    registry.reload("UNION").unwrap();
    let err = registry
        .extract("UNION", &document(&[UNION_PAGE_1, UNION_PAGE_2]), Some(PASSWORD))
        .unwrap_err();
    assert!(matches!(err, ExtractError::ResourceLimit { .. }));
}

struct UnversionedExtractor {
    identity: ExtractorIdentity,
}

impl StatementExtractor for UnversionedExtractor {
    fn identity(&self) -> &ExtractorIdentity {
        &self.identity
    }

    fn extract_complete_statement(
        &self,
        _source: &StatementSource,
        _password: Option<&str>,
    ) -> statex_core::Result<StatementResult> {
        Err(ExtractError::Config("unreachable".to_string()))
    }
}

fn unversioned(
    _config: &BankConfig,
    _loader: Arc<dyn statex_core::DocumentLoader>,
    _limits: &LimitsConfig,
) -> Arc<dyn StatementExtractor> {
    Arc::new(UnversionedExtractor {
        identity: ExtractorIdentity::new("Test Bank", "latest", [Capability::Transactions]),
    })
}

#[test]
fn test_contract_violation_is_reported() {
    let store = Arc::new(MemoryConfigStore::new(vec![BankConfig {
        bank_id: "TEST".to_string(),
        bank_name: "Test Bank".to_string(),
        extractor: "unversioned".to_string(),
        ..BankConfig::default()
    }]));
    let mut registry = registry_with(store, LimitsConfig::default());
    registry.register("unversioned", unversioned);

    let err = registry
        .extract("TEST", &document(&[UNION_PAGE_1]), None)
        .unwrap_err();
    assert!(matches!(err, ExtractError::ContractViolation { .. }));
    assert!(registry.cache_stats().cached_banks.is_empty());
}

#[test]
fn test_unreadable_source_is_io() {
    let source = StatementSource::Path("/nonexistent/statement.pdf".into());
    let err = registry().extract("UNION", &source, Some(PASSWORD)).unwrap_err();

    assert!(matches!(err, ExtractError::Io(_)));
    assert!(err.is_retryable());
}
