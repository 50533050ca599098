//! Pipeline-wide constants.
//!
//! A `MonitorConfig` is built once (defaults, YAML file, or CLI overrides),
//! validated, and then passed by reference into every analysis stage.

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};
use crate::numeric::{Real, Tolerances, nearly_equal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Expected number of logged rows. `None` accepts any length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<usize>,
    /// Period at which the setpoint changes (s). Used to derive acceleration.
    pub sampling_rate_s: Real,
    /// Period at which rows are logged (s).
    pub step_interval_s: Real,
    /// Measurement must rise 10%→90% within this time (s).
    pub rise_time_threshold_s: Real,
    /// Half-width of the settling band as a fraction of setpoint.
    pub settling_error_fraction: Real,
    /// Consecutive in-band samples required to call a response settled.
    pub settling_consecutive: usize,
    /// Settling time upper limit (s).
    pub settling_time_threshold_s: Real,
    /// Max |setpoint - measurement| / setpoint before a sample is faulty.
    pub raw_error_threshold: Real,
    /// Value written in place of an infinite rise or settling time.
    pub infinite_sentinel: Real,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_count: None,
            sampling_rate_s: 0.5,
            step_interval_s: 0.1,
            rise_time_threshold_s: 20.0,
            settling_error_fraction: 0.05,
            settling_consecutive: 50,
            settling_time_threshold_s: 15.0,
            raw_error_threshold: 0.1,
            infinite_sentinel: -999.0,
        }
    }
}

impl MonitorConfig {
    /// Number of logged rows spanned by one setpoint sampling period.
    pub fn accel_window(&self) -> usize {
        (self.sampling_rate_s / self.step_interval_s).round() as usize
    }

    pub fn validate(&self) -> MonitorResult<()> {
        positive(self.sampling_rate_s, "sampling_rate_s")?;
        positive(self.step_interval_s, "step_interval_s")?;
        positive(self.rise_time_threshold_s, "rise_time_threshold_s")?;
        positive(self.settling_error_fraction, "settling_error_fraction")?;
        positive(self.settling_time_threshold_s, "settling_time_threshold_s")?;
        positive(self.raw_error_threshold, "raw_error_threshold")?;

        if !self.infinite_sentinel.is_finite() {
            return Err(invalid("infinite_sentinel must be finite"));
        }
        if self.settling_consecutive == 0 {
            return Err(invalid("settling_consecutive must be at least 1"));
        }
        if self.sample_count == Some(0) {
            return Err(invalid("sample_count must be at least 1"));
        }

        let ratio = self.sampling_rate_s / self.step_interval_s;
        let tol = Tolerances {
            abs: 1e-9,
            rel: 1e-6,
        };
        if ratio < 1.0 || !nearly_equal(ratio, ratio.round(), tol) {
            return Err(invalid(format!(
                "sampling_rate_s ({}) must be a whole multiple of step_interval_s ({})",
                self.sampling_rate_s, self.step_interval_s
            )));
        }
        Ok(())
    }
}

fn positive(value: Real, name: &str) -> MonitorResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive (got {value})")))
    }
}

fn invalid(what: impl Into<String>) -> MonitorError {
    MonitorError::InvalidConfig { what: what.into() }
}
