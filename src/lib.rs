//! Report compiler for security-device alert data.
//!
//! Two batch pipelines over fully-buffered in-memory tables:
//! - `pipeline::run_counts`: per-month CSV exports -> device x month
//!   attack-count matrices (total and filtered) -> Excel workbook and a
//!   static chart page;
//! - `pipeline::run_activations`: a flat alert log -> month/marker filter
//!   -> parsed activation records -> enrichment join -> per-date summary
//!   -> filtered log copy and Excel workbook.

pub mod activation;
pub mod calendar;
pub mod chart_page;
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod logging;
pub mod monthly_counts;
pub mod pipeline;
pub mod workbook;

pub use calendar::CalendarMonth;
pub use config::ReportConfig;
pub use error::{ReportError, Result};
