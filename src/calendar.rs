//! Calendar month arithmetic for report windows.
//!
//! Months are plain (year, month) pairs. Both pipelines only ever need to
//! step whole months and format two fixed labels, so there is no day or
//! timezone handling here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One calendar month, e.g. 2025-08.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    /// 1-12. Out-of-range months are a caller contract violation.
    pub month: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month), "month out of range: {month}");
        Self { year, month }
    }

    /// The month immediately before this one, rolling over the year boundary.
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// The month immediately after this one, rolling over the year boundary.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// The `n` months immediately preceding this one (this month excluded),
    /// oldest first.
    pub fn window_before(self, n: usize) -> Vec<CalendarMonth> {
        let mut months = Vec::with_capacity(n);
        let mut cur = self;
        for _ in 0..n {
            cur = cur.prev();
            months.push(cur);
        }
        months.reverse();
        months
    }

    /// `YYYY-MM`, the prefix format used by log lines.
    pub fn iso_prefix(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// `MM_YYYY`, the label used in CSV filenames and workbook columns.
    pub fn file_label(&self) -> String {
        format!("{:02}_{}", self.month, self.year)
    }

    /// Parse `MM-YYYY` or `YYYY-MM` (both occur in operator configs).
    pub fn parse(s: &str) -> Option<Self> {
        let (a, b) = s.trim().split_once('-')?;
        let (year, month) = if a.len() == 4 {
            (a.parse().ok()?, b.parse().ok()?)
        } else {
            (b.parse().ok()?, a.parse().ok()?)
        };
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iso_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prev_rolls_over_year() {
        assert_eq!(CalendarMonth::new(2025, 1).prev(), CalendarMonth::new(2024, 12));
        assert_eq!(CalendarMonth::new(2025, 8).prev(), CalendarMonth::new(2025, 7));
    }

    #[test]
    fn test_next_rolls_over_year() {
        assert_eq!(CalendarMonth::new(2024, 12).next(), CalendarMonth::new(2025, 1));
        assert_eq!(CalendarMonth::new(2025, 8).next(), CalendarMonth::new(2025, 9));
    }

    #[test]
    fn test_window_before_is_chronological() {
        let window = CalendarMonth::new(2025, 1).window_before(6);
        assert_eq!(window.len(), 6);
        assert_eq!(window[0], CalendarMonth::new(2024, 7));
        assert_eq!(window[5], CalendarMonth::new(2024, 12));
        for pair in window.windows(2) {
            assert!(pair[0] < pair[1], "window must be strictly chronological");
        }
    }

    #[test]
    fn test_window_spanning_two_rollovers() {
        let window = CalendarMonth::new(2025, 3).window_before(15);
        assert_eq!(window[0], CalendarMonth::new(2023, 12));
        assert_eq!(window[14], CalendarMonth::new(2025, 2));
    }

    #[test]
    fn test_parse_both_orders() {
        assert_eq!(CalendarMonth::parse("08-2025"), Some(CalendarMonth::new(2025, 8)));
        assert_eq!(CalendarMonth::parse("2025-08"), Some(CalendarMonth::new(2025, 8)));
        assert_eq!(CalendarMonth::parse("2025-13"), None);
        assert_eq!(CalendarMonth::parse("garbage"), None);
    }

    #[test]
    fn test_labels() {
        let m = CalendarMonth::new(2025, 3);
        assert_eq!(m.iso_prefix(), "2025-03");
        assert_eq!(m.file_label(), "03_2025");
    }
}
