//! cm-core: stable foundation for the cruise-control monitor.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)
//! - config (pipeline-wide constants, validated once)
//! - series (Sample, SampleSeries)
//! - response (finite or infinite rise/settling times)

pub mod config;
pub mod error;
pub mod numeric;
pub mod response;
pub mod series;

// Re-exports
pub use config::MonitorConfig;
pub use error::{MonitorError, MonitorResult};
pub use numeric::*;
pub use response::ResponseTime;
pub use series::{Sample, SampleSeries};
