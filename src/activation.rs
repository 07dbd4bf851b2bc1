//! Alert-log filtering, field extraction, the per-date summary and the
//! month-completeness sanity check.
//!
//! Log lines are semi-structured free text with a leading `YYYY-MM-DD`
//! date. Extraction rules are deliberately small and independent so each
//! one can be tested on its own:
//! - protected object: text after a case-insensitive "protected object"
//!   marker, up to the next period;
//! - attack id: a `[A-Za-z0-9._:-]+` token after "Attack Id", with exactly
//!   one trailing period stripped when present (the log terminates the id
//!   with a sentence-ending period that is not part of the id).

use crate::calendar::CalendarMonth;
use regex::Regex;

/// Fields parsed from one matching log line. Optional fields stay `None`
/// when their marker is absent; that only costs the one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRecord {
    /// `YYYY-MM-DD`, taken from the first 10 characters of the line.
    pub date: String,
    pub protected_object: Option<String>,
    pub attack_id: Option<String>,
}

/// Compiled extraction rules for activation lines.
pub struct LineParser {
    date_re: Regex,
    protected_object_re: Regex,
    attack_id_re: Regex,
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            date_re: Regex::new(r"^(\d{4}-\d{2}-\d{2})").unwrap(),
            protected_object_re: Regex::new(r"(?i)protected object\s+([^.]+)\.").unwrap(),
            attack_id_re: Regex::new(r"Attack Id\s+([A-Za-z0-9._:\-]+)").unwrap(),
        }
    }

    /// Parse one line. Returns `None` when the line has no leading date
    /// (such lines can never have passed the month filter either).
    pub fn parse(&self, line: &str) -> Option<ActivationRecord> {
        let date = self.date_re.captures(line)?.get(1)?.as_str().to_string();

        let protected_object = self
            .protected_object_re
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string());

        let attack_id = self
            .attack_id_re
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| strip_one_trailing_period(m.as_str()).to_string());

        Some(ActivationRecord {
            date,
            protected_object,
            attack_id,
        })
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// The log terminates attack ids with a sentence-ending period; strip
/// exactly one if present, never more.
fn strip_one_trailing_period(token: &str) -> &str {
    token.strip_suffix('.').unwrap_or(token)
}

/// Keep lines in the target month that contain the activation marker.
///
/// Month membership is a plain prefix test on `YYYY-MM-`; the marker is a
/// plain substring test, not a regex.
pub fn filter_lines<'a>(
    lines: &'a [String],
    month: CalendarMonth,
    marker: &str,
) -> Vec<&'a str> {
    let prefix = format!("{}-", month.iso_prefix());
    lines
        .iter()
        .filter(|line| line.starts_with(&prefix) && line.contains(marker))
        .map(String::as_str)
        .collect()
}

/// One row of the per-date summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCount {
    pub date: String,
    pub count: u64,
}

/// Group records by date, count per group, ascending by the literal date
/// string (correct for fixed-width `YYYY-MM-DD`). Empty input yields an
/// empty but validly-shaped summary.
pub fn summarize_by_date(dates: impl Iterator<Item = impl AsRef<str>>) -> Vec<DateCount> {
    let mut counts = std::collections::BTreeMap::new();
    for date in dates {
        *counts.entry(date.as_ref().to_string()).or_insert(0u64) += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| DateCount { date, count })
        .collect()
}

/// Completeness check on the full unfiltered line set: which of the months
/// adjacent to the target have zero lines anywhere in the raw source. A
/// non-empty result usually means a truncated log export. Advisory only.
pub fn missing_adjacent_months(lines: &[String], target: CalendarMonth) -> Vec<CalendarMonth> {
    let mut missing = Vec::new();
    for month in [target.prev(), target.next()] {
        let prefix = format!("{}-", month.iso_prefix());
        if !lines.iter().any(|line| line.starts_with(&prefix)) {
            missing.push(month);
        }
    }
    missing
}
