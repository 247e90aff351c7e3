//! Debit/credit classification from running-balance movement.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::statement::TransactionType;

/// How the balance moved from one transaction to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceMove {
    Increase,
    Decrease,
    Unchanged,
}

/// Result of classifying one balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub transaction_type: TransactionType,
    pub movement: BalanceMove,
    /// `current - previous`.
    pub delta: Decimal,
}

/// Running-balance accumulator for banks without per-row debit/credit
/// markers.
///
/// Starts at the opening balance (zero when unknown) and advances with
/// every classified transaction, across page boundaries.
#[derive(Debug, Clone, Default)]
pub struct BalanceTracker {
    previous: Decimal,
}

impl BalanceTracker {
    pub fn new(opening_balance: Decimal) -> Self {
        Self {
            previous: opening_balance,
        }
    }

    /// Balance after the last classified transaction.
    pub fn previous(&self) -> Decimal {
        self.previous
    }

    /// Classify a transaction by its resulting balance and advance.
    ///
    /// Higher than before is a credit, lower is a debit. An unchanged
    /// balance is recorded as a credit and logged, since the movement
    /// carries no direction.
    pub fn classify(&mut self, balance: Decimal) -> Classification {
        let delta = balance - self.previous;
        let movement = match balance.cmp(&self.previous) {
            Ordering::Greater => BalanceMove::Increase,
            Ordering::Less => BalanceMove::Decrease,
            Ordering::Equal => BalanceMove::Unchanged,
        };

        if movement == BalanceMove::Unchanged {
            warn!("Balance unchanged at {}, recording transaction as credit", balance);
        }

        self.previous = balance;
        Classification {
            transaction_type: match movement {
                BalanceMove::Decrease => TransactionType::Debit,
                BalanceMove::Increase | BalanceMove::Unchanged => TransactionType::Credit,
            },
            movement,
            delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_balance_sequence() {
        let mut tracker = BalanceTracker::new(dec("1000"));
        let kinds: Vec<_> = ["1500", "1200", "1800"]
            .iter()
            .map(|b| tracker.classify(dec(b)))
            .map(|c| (c.transaction_type, c.delta))
            .collect();

        assert_eq!(
            kinds,
            vec![
                (TransactionType::Credit, dec("500")),
                (TransactionType::Debit, dec("-300")),
                (TransactionType::Credit, dec("600")),
            ]
        );
        assert_eq!(tracker.previous(), dec("1800"));
    }

    #[test]
    fn test_unchanged_balance_is_credit() {
        let mut tracker = BalanceTracker::new(dec("250.00"));
        let c = tracker.classify(dec("250"));
        assert_eq!(c.movement, BalanceMove::Unchanged);
        assert_eq!(c.transaction_type, TransactionType::Credit);
    }

    #[test]
    fn test_unknown_opening_starts_at_zero() {
        let mut tracker = BalanceTracker::default();
        assert_eq!(tracker.classify(dec("100")).transaction_type, TransactionType::Credit);
        assert_eq!(tracker.classify(dec("-20")).transaction_type, TransactionType::Debit);
    }
}
