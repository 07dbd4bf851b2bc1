//! Report configuration, loaded once at startup and passed into the
//! pipelines by value. The same file also persists the device-name mapping
//! discovered across runs; that store is append-only and never overwrites
//! an entry the operator has edited by hand.

use crate::calendar::CalendarMonth;
use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

fn default_csv_prefix() -> String {
    "database_EA_".to_string()
}

fn default_csv_suffix() -> String {
    ".csv".to_string()
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("./input")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Reference/target month, `MM-YYYY` or `YYYY-MM`.
    pub current_month: String,

    /// Attack names excluded from the filtered counts (case-sensitive).
    #[serde(default)]
    pub excluded_attack_names: Vec<String>,

    /// Substring identifying activation lines in the alert log.
    #[serde(default)]
    pub activation_marker: String,

    #[serde(default = "default_csv_prefix")]
    pub csv_file_prefix: String,

    #[serde(default = "default_csv_suffix")]
    pub csv_file_suffix: String,

    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Device identifier -> friendly display name.
    #[serde(default)]
    pub device_names: BTreeMap<String, String>,
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReportError::ConfigMissing(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ReportError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ReportError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The configured reference month.
    pub fn target_month(&self) -> Result<CalendarMonth> {
        CalendarMonth::parse(&self.current_month)
            .ok_or_else(|| ReportError::InvalidMonth(self.current_month.clone()))
    }

    /// CSV filename for one month, e.g. `database_EA_07_2025.csv`.
    pub fn monthly_csv_name(&self, month: CalendarMonth) -> String {
        format!(
            "{}{}{}",
            self.csv_file_prefix,
            month.file_label(),
            self.csv_file_suffix
        )
    }

    /// Friendly name for a device, falling back to the raw identifier.
    pub fn display_name<'a>(&'a self, device: &'a str) -> &'a str {
        self.device_names
            .get(device)
            .map(String::as_str)
            .unwrap_or(device)
    }
}

/// Add-if-absent persistence for discovered devices.
///
/// Re-reads the config file so that edits made while the run was in flight
/// are kept, inserts an identity mapping for every identifier not already
/// present, and rewrites the file only when something was added. Returns the
/// identifiers that were added.
pub fn persist_new_devices(config_path: &Path, devices: &[String]) -> Result<Vec<String>> {
    let mut config = ReportConfig::load(config_path)?;

    let mut added = Vec::new();
    for device in devices {
        if !config.device_names.contains_key(device) {
            config
                .device_names
                .insert(device.clone(), device.clone());
            added.push(device.clone());
        }
    }

    if !added.is_empty() {
        let raw = serde_json::to_string_pretty(&config).map_err(|source| {
            ReportError::ConfigParse {
                path: config_path.to_path_buf(),
                source,
            }
        })?;
        std::fs::write(config_path, raw).map_err(|source| ReportError::Io {
            path: config_path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            count = added.len(),
            "New devices added to config; edit device_names to customize display names"
        );
    }

    Ok(added)
}
