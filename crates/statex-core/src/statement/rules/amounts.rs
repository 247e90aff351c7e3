//! Amount parsing for Indian bank statements.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT_TOKEN, DECIMAL_TOKEN};

/// Parse an amount with Indian digit grouping ("1,23,456.78").
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if !AMOUNT_TOKEN.is_match(text) {
        return None;
    }
    Decimal::from_str(&text.replace(',', "")).ok()
}

/// Whether a whitespace-delimited token is an amount with a decimal point.
pub fn is_decimal_token(token: &str) -> bool {
    DECIMAL_TOKEN.is_match(token)
}

/// Decimal amount tokens of a line, in order.
pub fn decimal_tokens(line: &str) -> Vec<Decimal> {
    line.split_whitespace()
        .filter(|t| is_decimal_token(t))
        .filter_map(parse_amount)
        .collect()
}

/// Format an amount with Indian grouping and two decimal places.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    // Last three digits, then groups of two
    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::new();
    let head_len = digits.len().saturating_sub(3);
    for (i, c) in digits[..head_len].iter().enumerate() {
        if i > 0 && (head_len - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    if head_len > 0 {
        grouped.push(',');
    }
    grouped.extend(&digits[head_len..]);

    format!("{}{}.{}", sign, grouped, fraction)
}
