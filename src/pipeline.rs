//! The two report pipelines: monthly counts and activation log.
//!
//! Both are single-pass batch jobs: load everything, transform, write
//! output, return. Only startup-level conditions (missing config values,
//! missing primary input, output write failures) abort a run.

use crate::activation::{self, LineParser};
use crate::chart_page;
use crate::config::{self, ReportConfig};
use crate::enrichment;
use crate::error::{ReportError, Result};
use crate::monthly_counts::{self, MonthlyCounts};
use crate::workbook;
use std::path::Path;

/// Months aggregated per counts report, ending just before the reference
/// month.
pub const MONTHS_IN_WINDOW: usize = 6;

fn ensure_output_dir(config: &ReportConfig) -> Result<()> {
    std::fs::create_dir_all(&config.output_dir).map_err(|source| ReportError::Io {
        path: config.output_dir.clone(),
        source,
    })
}

/// Monthly-count pipeline: six per-month CSVs -> device x month matrices ->
/// counts workbook + chart page. `config_path` is needed to persist newly
/// discovered devices back into the config file.
pub fn run_counts(config: &ReportConfig, config_path: &Path) -> Result<()> {
    let reference = config.target_month()?;
    let months = reference.window_before(MONTHS_IN_WINDOW);
    tracing::info!(
        window = %format!("{} .. {}", months[0], months[months.len() - 1]),
        "Processing monthly counts"
    );
    ensure_output_dir(config)?;

    let per_month: Vec<MonthlyCounts> = months
        .iter()
        .map(|&month| monthly_counts::load_month(config, &config.input_dir, month))
        .collect();
    let months_with_data = per_month.iter().filter(|m| !m.total.is_empty()).count();

    let totals: Vec<_> = per_month.iter().map(|m| (m.month, &m.total)).collect();
    let filtered: Vec<_> = per_month.iter().map(|m| (m.month, &m.filtered)).collect();
    let total_matrix = monthly_counts::merge_counts(&totals);
    let filtered_matrix = monthly_counts::merge_counts(&filtered);

    if total_matrix.is_empty() {
        tracing::warn!("No data was processed; check that CSV files exist and have the expected format");
    } else {
        let devices: Vec<String> = total_matrix.devices().map(str::to_string).collect();
        let added = config::persist_new_devices(config_path, &devices)?;
        if !added.is_empty() {
            tracing::info!(devices = ?added, "Discovered new devices");
        }
    }

    let total_named = total_matrix.with_display_names(config);
    let filtered_named = filtered_matrix.with_display_names(config);

    // Output is named after the most recent month in the window.
    let newest = months[months.len() - 1];
    let xlsx_path = config
        .output_dir
        .join(format!("attacks_count_pd_{}.xlsx", newest.file_label()));
    workbook::write_counts_workbook(&xlsx_path, &total_named, &filtered_named)?;
    tracing::info!(file = %xlsx_path.display(), "Counts workbook written");

    if !total_named.is_empty() {
        let html_path = xlsx_path.with_extension("html");
        let page = chart_page::render_counts_page(
            &total_named,
            &filtered_named,
            &config.excluded_attack_names,
        );
        match std::fs::write(&html_path, page) {
            Ok(()) => tracing::info!(file = %html_path.display(), "Chart page written"),
            Err(e) => tracing::warn!(error = %e, "Failed to write chart page"),
        }
    }

    tracing::info!(
        devices = total_named.rows.len(),
        months_with_data,
        months = MONTHS_IN_WINDOW,
        "Counts report complete"
    );
    Ok(())
}

/// Activation-log pipeline: filter the alert log to the target month and
/// marker, parse fields, enrich, summarize per date, and write the filtered
/// log copy plus the activations workbook.
pub fn run_activations(config: &ReportConfig) -> Result<()> {
    let target = config.target_month()?;
    if config.activation_marker.is_empty() {
        return Err(ReportError::MissingSetting("activation_marker"));
    }

    let log_path = config.input_dir.join("alert.txt");
    if !log_path.exists() {
        return Err(ReportError::InputMissing(log_path));
    }
    ensure_output_dir(config)?;

    let raw = std::fs::read_to_string(&log_path).map_err(|source| ReportError::Io {
        path: log_path.clone(),
        source,
    })?;
    let lines: Vec<String> = raw.lines().map(str::to_string).collect();

    let kept = activation::filter_lines(&lines, target, &config.activation_marker);
    tracing::info!(
        total_lines = lines.len(),
        kept = kept.len(),
        month = %target,
        "Filtered alert log"
    );

    let filtered_path = config
        .output_dir
        .join(format!("alert-filtered-{}.txt", target.iso_prefix()));
    let mut body = kept.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    std::fs::write(&filtered_path, body).map_err(|source| ReportError::Io {
        path: filtered_path.clone(),
        source,
    })?;

    // Completeness check runs on the unfiltered line set.
    for month in activation::missing_adjacent_months(&lines, target) {
        tracing::warn!(month = %month, "No log lines found for adjacent month; the export may be truncated");
    }

    let parser = LineParser::new();
    let records: Vec<_> = kept.iter().filter_map(|line| parser.parse(line)).collect();
    if records.is_empty() {
        tracing::warn!("No activation records matched the target month and marker");
    }

    let table = enrichment::load_enrichment(config, &config.input_dir, target);
    let columns = table
        .as_ref()
        .map(|t| t.columns.clone())
        .unwrap_or_default();
    let enriched = enrichment::join_records(records, table.as_ref());

    let summary =
        activation::summarize_by_date(enriched.iter().map(|r| r.record.date.as_str()));

    let xlsx_path = config
        .output_dir
        .join(format!("activations_report-{}.xlsx", target.iso_prefix()));
    workbook::write_activations_workbook(&xlsx_path, &columns, &enriched, &summary)?;

    tracing::info!(
        records = enriched.len(),
        dates = summary.len(),
        filtered_log = %filtered_path.display(),
        workbook = %xlsx_path.display(),
        "Activations report complete"
    );
    Ok(())
}
