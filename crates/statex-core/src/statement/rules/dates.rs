//! Date and statement period parsing.

use chrono::NaiveDate;
use tracing::debug;

use super::patterns::{FULL_PERIOD, PARTIAL_PERIOD, YEAR};
use crate::models::statement::StatementPeriod;

/// Date formats printed by supported banks.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d-%b-%Y", "%d.%m.%Y"];

/// Lines searched after a split period for the missing year.
const YEAR_LOOKAHEAD: usize = 3;

/// Parse a statement date in any supported bank format.
pub fn parse_statement_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Parse a "DATE to DATE" statement period starting on `lines[index]`.
///
/// Handles the split layout where the second date lost its year to a line
/// wrap ("01/04/2024 To 31/03" followed by "2025" further down). The year
/// is taken from the rest of the line or from the next three lines, and
/// must differ from the first date's year. Without one, no period is
/// reported.
pub fn parse_period(lines: &[&str], index: usize) -> Option<StatementPeriod> {
    let line: &str = lines.get(index)?;

    if let Some(caps) = FULL_PERIOD.captures(line) {
        return Some(StatementPeriod {
            from_date: caps[1].to_string(),
            to_date: caps[2].to_string(),
        });
    }

    let caps = PARTIAL_PERIOD.captures(line)?;
    let from_date = caps[1].to_string();
    let separator = &caps[2];
    let from_year = &caps[3];
    let partial = &caps[4];
    let rest = caps.get(0).map(|m| &line[m.end()..]).unwrap_or_default();

    let distinct_year = |text: &str| {
        YEAR.captures_iter(text)
            .map(|c| c[1].to_string())
            .find(|year| year != from_year)
    };

    let year = distinct_year(rest).or_else(|| {
        lines
            .iter()
            .skip(index + 1)
            .take(YEAR_LOOKAHEAD)
            .find_map(|l| distinct_year(l))
    });

    match year {
        Some(year) => Some(StatementPeriod {
            from_date,
            to_date: format!("{}{}{}", partial, separator, year),
        }),
        None => {
            debug!("Statement period end '{}' has no recoverable year", partial);
            None
        }
    }
}
