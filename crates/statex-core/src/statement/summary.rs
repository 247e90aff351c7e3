//! Financial summary over a statement's transactions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::rules::parse_statement_date;
use crate::models::statement::{DateRange, FinancialSummary, Transaction};

/// Compute opening/closing balances, totals and the date range.
///
/// Balances follow chronological order: the closing balance is that of the
/// latest transaction, whatever order the document lists them in. When the
/// opening balance is not known from the header it is derived by undoing
/// the earliest transaction. An empty statement yields an all-zero summary.
pub fn calculate_summary(transactions: &[Transaction], opening_balance: Option<Decimal>) -> FinancialSummary {
    let ordered = chronological(transactions);
    let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
        return FinancialSummary::default();
    };

    let opening_balance = opening_balance.unwrap_or_else(|| first.balance - first.signed_amount());
    let closing_balance = last.balance;

    let total_debits: Decimal = transactions.iter().filter_map(|t| t.debit).sum();
    let total_credits: Decimal = transactions.iter().filter_map(|t| t.credit).sum();

    let summary = FinancialSummary {
        opening_balance,
        closing_balance,
        total_debits,
        total_credits,
        net_change: total_credits - total_debits,
        transaction_count: transactions.len(),
        date_range: date_range(transactions),
    };

    if !summary.is_reconciled() {
        warn!(
            "Balances do not reconcile: opening {} + net {} != closing {} (off by {})",
            summary.opening_balance,
            summary.net_change,
            summary.closing_balance,
            summary.discrepancy()
        );
    }

    summary
}

/// Transactions oldest first.
///
/// Newest-first documents are reversed; same-day transactions keep their
/// relative order. If any date fails to parse, document order is kept.
fn chronological(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();

    let dates: Option<Vec<NaiveDate>> = ordered.iter().map(|t| parse_statement_date(&t.date)).collect();
    let Some(dates) = dates else {
        debug!("Unparseable transaction dates, keeping document order");
        return ordered;
    };

    if dates.first() > dates.last() {
        debug!("Statement lists newest transactions first");
        ordered.reverse();
    }
    ordered.sort_by_key(|t| parse_statement_date(&t.date));
    ordered
}

/// Earliest and latest dates, compared as dates where they parse.
fn date_range(transactions: &[Transaction]) -> DateRange {
    let parsed: Vec<(NaiveDate, &str)> = transactions
        .iter()
        .filter_map(|t| parse_statement_date(&t.date).map(|d| (d, t.date.as_str())))
        .collect();

    let (from, to) = if parsed.is_empty() {
        let dates = transactions.iter().map(|t| t.date.as_str());
        (dates.clone().min(), dates.max())
    } else {
        (
            parsed.iter().min_by_key(|(d, _)| *d).map(|(_, s)| *s),
            parsed.iter().max_by_key(|(d, _)| *d).map(|(_, s)| *s),
        )
    };

    DateRange {
        from_date: from.map(str::to_string),
        to_date: to.map(str::to_string),
    }
}
