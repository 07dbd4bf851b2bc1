//! Per-month CSV loading, per-device counting and the month-by-month merge.
//!
//! Every failure below the "file for this month" level is non-fatal: a
//! missing or unreadable month contributes an empty count set and the run
//! continues with the remaining months.

use crate::calendar::CalendarMonth;
use crate::config::ReportConfig;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const DEVICE_COLUMN: &str = "Device Name";
pub const ATTACK_NAME_COLUMN: &str = "Attack Name";

/// Counts for one month: rows per device, total and with excluded attack
/// names removed. Both maps are empty when the month had no usable data.
#[derive(Debug, Clone)]
pub struct MonthlyCounts {
    pub month: CalendarMonth,
    pub total: BTreeMap<String, u64>,
    pub filtered: BTreeMap<String, u64>,
}

impl MonthlyCounts {
    pub fn empty(month: CalendarMonth) -> Self {
        Self {
            month,
            total: BTreeMap::new(),
            filtered: BTreeMap::new(),
        }
    }
}

/// Load one month's CSV and count rows per device.
///
/// The filtered count drops rows whose attack name matches (case-sensitive)
/// any entry in `config.excluded_attack_names`. If the attack-name column is
/// absent the filtered count falls back to the unfiltered one with a warning.
pub fn load_month(config: &ReportConfig, input_dir: &Path, month: CalendarMonth) -> MonthlyCounts {
    let csv_name = config.monthly_csv_name(month);
    let csv_path = input_dir.join(&csv_name);

    if !csv_path.exists() {
        tracing::warn!(file = %csv_name, month = %month, "CSV file not found; month will be empty");
        return MonthlyCounts::empty(month);
    }

    let mut reader = match csv::Reader::from_path(&csv_path) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(file = %csv_name, error = %e, "Failed to open CSV; month will be empty");
            return MonthlyCounts::empty(month);
        }
    };

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            tracing::warn!(file = %csv_name, error = %e, "Failed to read CSV headers; month will be empty");
            return MonthlyCounts::empty(month);
        }
    };

    let device_idx = headers.iter().position(|h| h == DEVICE_COLUMN);
    let attack_idx = headers.iter().position(|h| h == ATTACK_NAME_COLUMN);

    let Some(device_idx) = device_idx else {
        tracing::warn!(
            file = %csv_name,
            column = DEVICE_COLUMN,
            "Expected column not found; month will be empty"
        );
        return MonthlyCounts::empty(month);
    };

    if attack_idx.is_none() {
        tracing::warn!(
            file = %csv_name,
            column = ATTACK_NAME_COLUMN,
            "Expected column not found; filtered count falls back to total"
        );
    }

    let mut counts = MonthlyCounts::empty(month);
    let mut rows = 0u64;
    let mut bad_rows = 0u64;

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => {
                bad_rows += 1;
                continue;
            }
        };
        let Some(device) = record.get(device_idx) else {
            bad_rows += 1;
            continue;
        };
        rows += 1;
        *counts.total.entry(device.to_string()).or_insert(0) += 1;

        let excluded = attack_idx
            .and_then(|i| record.get(i))
            .map(|name| config.excluded_attack_names.iter().any(|ex| ex == name))
            .unwrap_or(false);
        if !excluded {
            *counts.filtered.entry(device.to_string()).or_insert(0) += 1;
        }
    }

    if bad_rows > 0 {
        tracing::warn!(file = %csv_name, bad_rows, "Skipped unparseable CSV rows");
    }
    tracing::info!(file = %csv_name, rows, "Loaded monthly CSV");

    counts
}

/// Device x month count matrix: union of devices as rows (sorted by
/// identifier), one column per month in the supplied order, zero-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCountMatrix {
    pub months: Vec<CalendarMonth>,
    /// (device identifier, one count per month).
    pub rows: Vec<(String, Vec<u64>)>,
}

impl DeviceCountMatrix {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn devices(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(d, _)| d.as_str())
    }

    /// The same matrix with device identifiers replaced by their configured
    /// friendly names. Row order is unchanged (still sorted by identifier),
    /// so output stays deterministic even after renaming.
    pub fn with_display_names(&self, config: &ReportConfig) -> DeviceCountMatrix {
        DeviceCountMatrix {
            months: self.months.clone(),
            rows: self
                .rows
                .iter()
                .map(|(device, counts)| {
                    (config.display_name(device).to_string(), counts.clone())
                })
                .collect(),
        }
    }
}

/// Outer-merge ordered per-month count maps into one matrix. A device absent
/// from a month gets an explicit 0 for that column.
pub fn merge_counts(per_month: &[(CalendarMonth, &BTreeMap<String, u64>)]) -> DeviceCountMatrix {
    let devices: BTreeSet<&str> = per_month
        .iter()
        .flat_map(|(_, counts)| counts.keys().map(String::as_str))
        .collect();

    let rows = devices
        .into_iter()
        .map(|device| {
            let counts = per_month
                .iter()
                .map(|(_, m)| m.get(device).copied().unwrap_or(0))
                .collect();
            (device.to_string(), counts)
        })
        .collect();

    DeviceCountMatrix {
        months: per_month.iter().map(|(m, _)| *m).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn month(m: u32) -> CalendarMonth {
        CalendarMonth::new(2025, m)
    }

    fn counts(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs
            .iter()
            .map(|(d, c)| (d.to_string(), *c))
            .collect()
    }

    fn test_config(input_dir: &Path) -> ReportConfig {
        let mut config: ReportConfig =
            serde_json::from_str(r#"{ "current_month": "08-2025" }"#).unwrap();
        config.input_dir = input_dir.to_path_buf();
        config.excluded_attack_names = vec!["Port Scan".to_string()];
        config
    }

    #[test]
    fn test_merge_zero_fills_missing_months() {
        let m1 = counts(&[("fw-a", 3)]);
        let m2 = counts(&[]);
        let m3 = counts(&[("fw-a", 1), ("fw-b", 7)]);
        let matrix = merge_counts(&[(month(1), &m1), (month(2), &m2), (month(3), &m3)]);

        assert_eq!(matrix.months, vec![month(1), month(2), month(3)]);
        assert_eq!(
            matrix.rows,
            vec![
                ("fw-a".to_string(), vec![3, 0, 1]),
                ("fw-b".to_string(), vec![0, 0, 7]),
            ]
        );
    }

    #[test]
    fn test_merge_row_set_is_order_independent() {
        let m1 = counts(&[("fw-a", 3)]);
        let m2 = counts(&[("fw-b", 2)]);
        let forward = merge_counts(&[(month(1), &m1), (month(2), &m2)]);
        let reversed = merge_counts(&[(month(2), &m2), (month(1), &m1)]);

        let devices: Vec<_> = forward.devices().collect();
        let devices_rev: Vec<_> = reversed.devices().collect();
        assert_eq!(devices, devices_rev);
    }

    #[test]
    fn test_load_month_counts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let mut f =
            std::fs::File::create(dir.path().join("database_EA_07_2025.csv")).unwrap();
        writeln!(f, "Device Name,Attack Name").unwrap();
        writeln!(f, "fw-a,SYN Flood").unwrap();
        writeln!(f, "fw-a,Port Scan").unwrap();
        writeln!(f, "fw-b,Port Scan").unwrap();
        drop(f);

        let counts = load_month(&config, dir.path(), month(7));
        assert_eq!(counts.total["fw-a"], 2);
        assert_eq!(counts.total["fw-b"], 1);
        assert_eq!(counts.filtered["fw-a"], 1);
        assert!(!counts.filtered.contains_key("fw-b"));

        // Filtered is always <= total, per device.
        for (device, filtered) in &counts.filtered {
            assert!(filtered <= &counts.total[device]);
        }
    }

    #[test]
    fn test_load_month_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let counts = load_month(&config, dir.path(), month(1));
        assert!(counts.total.is_empty());
        assert!(counts.filtered.is_empty());
    }

    #[test]
    fn test_load_month_without_attack_column_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let mut f =
            std::fs::File::create(dir.path().join("database_EA_06_2025.csv")).unwrap();
        writeln!(f, "Device Name").unwrap();
        writeln!(f, "fw-a").unwrap();
        writeln!(f, "fw-a").unwrap();
        drop(f);

        let counts = load_month(&config, dir.path(), month(6));
        assert_eq!(counts.total, counts.filtered);
        assert_eq!(counts.total["fw-a"], 2);
    }

    #[test]
    fn test_display_names_keep_row_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config
            .device_names
            .insert("fw-a".to_string(), "Zurich Edge".to_string());

        let m1 = counts(&[("fw-a", 1), ("fw-b", 2)]);
        let matrix = merge_counts(&[(month(1), &m1)]);
        let named = matrix.with_display_names(&config);

        assert_eq!(named.rows[0].0, "Zurich Edge");
        assert_eq!(named.rows[1].0, "fw-b");
    }
}
