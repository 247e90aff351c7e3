//! Header field rules and the scan that merges their matches.

use regex::Regex;
use tracing::trace;

use crate::models::statement::{MetadataField, StatementMetadata};

/// A header field rule: inspects `lines[index]` (and, for multi-line
/// fields, the lines after it) and returns the field it recognises there.
pub type FieldRule = fn(&[&str], usize) -> Option<MetadataField>;

/// Run every rule against every line of `text`, merging matches into `base`.
///
/// Rules are independent. When a field matches on several lines the last
/// match wins.
pub fn scan_metadata(text: &str, rules: &[FieldRule], base: StatementMetadata) -> StatementMetadata {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut metadata = base;

    for index in 0..lines.len() {
        for rule in rules {
            if let Some(field) = rule(lines.as_slice(), index) {
                trace!("Header line {}: {:?}", index + 1, field);
                metadata.merge(field);
            }
        }
    }

    metadata
}

/// First capture group of `pattern` on `line`, trimmed, if non-empty.
pub fn capture(pattern: &Regex, line: &str) -> Option<String> {
    let caps = pattern.captures(line)?;
    let value = caps.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Gather a multi-line value that starts after `label` on `lines[index]`.
///
/// Continuation lines are taken until one contains a stop word, at most
/// `max_parts` pieces in total.
pub fn collect_lines(
    lines: &[&str],
    index: usize,
    label: &str,
    stop_words: &[&str],
    max_parts: usize,
    separator: &str,
) -> Option<String> {
    let first = lines.get(index)?;
    let (_, after) = first.split_once(label)?;

    let mut parts = Vec::new();
    let head = after.trim().trim_start_matches(':').trim();
    if !head.is_empty() {
        parts.push(head);
    }

    for &line in lines.iter().skip(index + 1) {
        if parts.len() >= max_parts || stop_words.iter().any(|w| line.contains(w)) {
            break;
        }
        if !line.is_empty() {
            parts.push(line);
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(separator))
    }
}
