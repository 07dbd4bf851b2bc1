// End-to-end tests for the monthly-count pipeline.

use attack_report_compiler::config::ReportConfig;
use attack_report_compiler::monthly_counts::{load_month, merge_counts};
use attack_report_compiler::{pipeline, CalendarMonth};
use std::io::Write;
use std::path::{Path, PathBuf};

struct Fixture {
    _dir: tempfile::TempDir,
    config_path: PathBuf,
    input_dir: PathBuf,
    output_dir: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("input");
    let output_dir = dir.path().join("output");
    std::fs::create_dir_all(&input_dir).unwrap();

    let config_path = dir.path().join("report-config.json");
    let config = serde_json::json!({
        "current_month": "01-2025",
        "excluded_attack_names": ["Port Scan"],
        "input_dir": &input_dir,
        "output_dir": &output_dir,
        "device_names": { "fw-a": "Edge A" }
    });
    std::fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    Fixture {
        _dir: dir,
        config_path,
        input_dir,
        output_dir,
    }
}

fn write_month_csv(input_dir: &Path, label: &str, rows: &[(&str, &str)]) {
    let path = input_dir.join(format!("database_EA_{label}.csv"));
    let mut f = std::fs::File::create(path).unwrap();
    writeln!(f, "Device Name,Attack Name").unwrap();
    for (device, attack) in rows {
        writeln!(f, "{device},{attack}").unwrap();
    }
}

#[test]
fn test_counts_end_to_end_with_missing_months() {
    let fx = fixture();

    // Three devices spread across three of the six window months
    // (2024-07 .. 2024-12); the other three month files do not exist.
    write_month_csv(
        &fx.input_dir,
        "08_2024",
        &[("fw-a", "SYN Flood"), ("fw-b", "Port Scan"), ("fw-a", "Port Scan")],
    );
    write_month_csv(&fx.input_dir, "10_2024", &[("fw-c", "SYN Flood")]);
    write_month_csv(&fx.input_dir, "12_2024", &[("fw-a", "SYN Flood")]);

    let config = ReportConfig::load(&fx.config_path).unwrap();
    pipeline::run_counts(&config, &fx.config_path).unwrap();

    // Outputs are named after the newest month in the window.
    let xlsx = fx.output_dir.join("attacks_count_pd_12_2024.xlsx");
    let html = fx.output_dir.join("attacks_count_pd_12_2024.html");
    assert!(xlsx.is_file(), "counts workbook missing");
    assert!(html.is_file(), "chart page missing");

    // Matrix shape: 3 devices, 6 columns, zero-filled, alphabetical rows.
    let months = CalendarMonth::new(2025, 1).window_before(6);
    let per_month: Vec<_> = months
        .iter()
        .map(|&m| load_month(&config, &fx.input_dir, m))
        .collect();
    let totals: Vec<_> = per_month.iter().map(|m| (m.month, &m.total)).collect();
    let matrix = merge_counts(&totals);

    assert_eq!(matrix.months.len(), 6);
    assert_eq!(
        matrix.rows,
        vec![
            ("fw-a".to_string(), vec![0, 2, 0, 0, 0, 1]),
            ("fw-b".to_string(), vec![0, 1, 0, 0, 0, 0]),
            ("fw-c".to_string(), vec![0, 0, 0, 1, 0, 0]),
        ]
    );

    // Filtered counts never exceed totals.
    let filtered: Vec<_> = per_month.iter().map(|m| (m.month, &m.filtered)).collect();
    let filtered_matrix = merge_counts(&filtered);
    for (row, (device, counts)) in matrix.rows.iter().enumerate() {
        for (col, total) in counts.iter().enumerate() {
            let filtered_count = filtered_matrix
                .rows
                .get(row)
                .filter(|(d, _)| d == device)
                .map(|(_, c)| c[col])
                .unwrap_or(0);
            assert!(filtered_count <= *total);
        }
    }
}

#[test]
fn test_counts_run_discovers_new_devices() {
    let fx = fixture();
    write_month_csv(&fx.input_dir, "09_2024", &[("fw-new", "SYN Flood")]);

    let config = ReportConfig::load(&fx.config_path).unwrap();
    pipeline::run_counts(&config, &fx.config_path).unwrap();

    let updated = ReportConfig::load(&fx.config_path).unwrap();
    // Discovered device appended with identity mapping; manual entry kept.
    assert_eq!(updated.device_names["fw-new"], "fw-new");
    assert_eq!(updated.device_names["fw-a"], "Edge A");
}

#[test]
fn test_counts_run_with_no_data_still_writes_workbook() {
    let fx = fixture();
    let config = ReportConfig::load(&fx.config_path).unwrap();
    pipeline::run_counts(&config, &fx.config_path).unwrap();

    assert!(fx.output_dir.join("attacks_count_pd_12_2024.xlsx").is_file());
    // No devices, so the chart page is skipped and no mapping is added.
    assert!(!fx.output_dir.join("attacks_count_pd_12_2024.html").exists());
    let updated = ReportConfig::load(&fx.config_path).unwrap();
    assert_eq!(updated.device_names.len(), 1);
}
