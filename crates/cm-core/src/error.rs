use thiserror::Error;

pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("Non-finite numeric value for {what} at sample {index}: {value}")]
    NonFinite {
        what: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Invalid sample series: {what} (sample {index})")]
    InvalidSeries { what: &'static str, index: usize },

    #[error("Insufficient data for {what}: need more than {needed} samples, got {len}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        len: usize,
    },

    #[error("Zero setpoint at sample {index}; relative error is undefined")]
    ZeroSetpoint { index: usize },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Analysis invariant violated: {what}")]
    InvariantViolation { what: String },
}

impl MonitorError {
    /// True for failures caused by the shape of the data rather than a bug.
    pub fn is_degenerate_input(&self) -> bool {
        matches!(
            self,
            MonitorError::InsufficientData { .. } | MonitorError::ZeroSetpoint { .. }
        )
    }
}
