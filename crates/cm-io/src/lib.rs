//! cm-io: file adapters around the analysis engine.
//!
//! - log: CSV controller logs in, annotated CSV out
//! - config_file: YAML `MonitorConfig` files
//! - report: JSON run reports keyed by a content hash

pub mod config_file;
pub mod log;
pub mod report;

use std::path::PathBuf;

use cm_core::MonitorError;

pub use config_file::{config_to_yaml, load_config, save_config};
pub use log::{ControllerLog, load_log, parse_log, render_annotated, write_annotated};
pub use report::{RunReport, build_report, compute_run_id, load_report, save_report};

pub type IoResult<T> = Result<T, IoError>;

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Log has no header line")]
    MissingHeader,

    #[error("Line {line}: expected 6 fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("Line {line}: {field} field '{value}' is not a number")]
    Parse {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Line {line}: {source}")]
    Series { line: usize, source: MonitorError },

    #[error("Expected {expected} data rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("Fault flags cover {found} samples but the log has {expected}")]
    FlagCount { expected: usize, found: usize },

    #[error("Invalid configuration: {0}")]
    Config(#[from] MonitorError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
