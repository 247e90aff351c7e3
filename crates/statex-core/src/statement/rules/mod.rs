//! Rule-based field parsing shared by the bank parsers.

pub mod amounts;
pub mod dates;
pub mod metadata;
pub mod patterns;

pub use amounts::{decimal_tokens, format_amount, is_decimal_token, parse_amount};
pub use dates::{parse_period, parse_statement_date};
pub use metadata::{capture, collect_lines, scan_metadata, FieldRule};
