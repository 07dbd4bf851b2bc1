//! Enrichment of parsed activation records from an auxiliary CSV, joined
//! left-outer by attack id. Running without enrichment is a supported,
//! degraded mode, not an error.

use crate::activation::ActivationRecord;
use crate::calendar::CalendarMonth;
use crate::config::ReportConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Join key plus the descriptive columns we carry into the Detail sheet.
/// Column names are matched case-insensitively against the CSV header;
/// columns not found under any case are simply absent from the output.
pub const JOIN_KEY: &str = "attackIpsId";
pub const ENRICHMENT_COLUMNS: [&str; 5] = [
    "Attack Name",
    "packetCount",
    "category",
    "maxAttackPacketRatePps",
    "maxAttackRateBps",
];

/// Auxiliary table keyed by attack id, deduplicated on load (first
/// occurrence of a key wins, source order).
#[derive(Debug, Clone)]
pub struct EnrichmentTable {
    /// Canonical names of the columns actually present, in
    /// `ENRICHMENT_COLUMNS` order.
    pub columns: Vec<String>,
    rows: HashMap<String, Vec<Option<String>>>,
}

impl EnrichmentTable {
    pub fn lookup(&self, attack_id: &str) -> Option<&[Option<String>]> {
        self.rows.get(attack_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pick the enrichment CSV: prefer the file matching the target month's
/// naming convention, otherwise the lexicographically-first `*.csv` in the
/// input directory.
fn select_csv(config: &ReportConfig, input_dir: &Path, month: CalendarMonth) -> Option<PathBuf> {
    let preferred = input_dir.join(config.monthly_csv_name(month));
    if preferred.is_file() {
        return Some(preferred);
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(input_dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Load the enrichment table, or `None` when no usable CSV exists. All
/// failure modes degrade to "no enrichment" with a logged notice.
pub fn load_enrichment(
    config: &ReportConfig,
    input_dir: &Path,
    month: CalendarMonth,
) -> Option<EnrichmentTable> {
    let Some(path) = select_csv(config, input_dir, month) else {
        tracing::info!("No enrichment CSV found; proceeding without enrichment");
        return None;
    };

    let mut reader = match csv::Reader::from_path(&path) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "Failed to read enrichment CSV; proceeding without enrichment");
            return None;
        }
    };
    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "Failed to read enrichment headers; proceeding without enrichment");
            return None;
        }
    };
    tracing::info!(file = %path.display(), "Using enrichment CSV");

    let find_column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    };

    let Some(key_idx) = find_column(JOIN_KEY) else {
        tracing::warn!(
            file = %path.display(),
            column = JOIN_KEY,
            "Join key column missing; proceeding without enrichment"
        );
        return None;
    };

    let mut columns = Vec::new();
    let mut column_indices = Vec::new();
    let mut missing = Vec::new();
    for name in ENRICHMENT_COLUMNS {
        match find_column(name) {
            Some(idx) => {
                columns.push(name.to_string());
                column_indices.push(idx);
            }
            None => missing.push(name),
        }
    }
    if !missing.is_empty() {
        tracing::warn!(
            file = %path.display(),
            ?missing,
            "Enrichment CSV missing expected columns; merge will include available columns only"
        );
    }

    let mut rows: HashMap<String, Vec<Option<String>>> = HashMap::new();
    let mut bad_rows = 0u64;
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => {
                bad_rows += 1;
                continue;
            }
        };
        let Some(key) = record.get(key_idx) else {
            bad_rows += 1;
            continue;
        };
        // First occurrence of a key wins.
        rows.entry(key.to_string()).or_insert_with(|| {
            column_indices
                .iter()
                .map(|&idx| record.get(idx).map(str::to_string))
                .collect()
        });
    }
    if bad_rows > 0 {
        tracing::warn!(file = %path.display(), bad_rows, "Skipped unparseable enrichment rows");
    }

    Some(EnrichmentTable { columns, rows })
}

/// An activation record plus its enrichment values, aligned with the
/// table's `columns`. Unmatched records keep every value `None`.
#[derive(Debug, Clone)]
pub struct EnrichedRecord {
    pub record: ActivationRecord,
    pub values: Vec<Option<String>>,
}

/// Left-outer join: every input record is preserved exactly once, so the
/// joined row count always equals the input row count.
pub fn join_records(
    records: Vec<ActivationRecord>,
    table: Option<&EnrichmentTable>,
) -> Vec<EnrichedRecord> {
    let width = table.map(|t| t.columns.len()).unwrap_or(0);
    records
        .into_iter()
        .map(|record| {
            let values = record
                .attack_id
                .as_deref()
                .and_then(|id| table.and_then(|t| t.lookup(id)))
                .map(|v| v.to_vec())
                .unwrap_or_else(|| vec![None; width]);
            EnrichedRecord { record, values }
        })
        .collect()
}
