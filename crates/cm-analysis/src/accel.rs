//! Setpoint acceleration derived over one setpoint sampling period.
//!
//! The setpoint only changes every `sampling_rate_s`, so the slope is taken
//! across `w = sampling_rate_s / step_interval_s` rows rather than between
//! neighbours. The signal is therefore `w` samples shorter than the series.

use cm_core::{MonitorConfig, MonitorError, MonitorResult, Real, SampleSeries};

#[derive(Debug, Clone, PartialEq)]
pub struct AccelSignal {
    values: Vec<Real>,
    window: usize,
}

impl AccelSignal {
    #[cfg(test)]
    pub(crate) fn from_values(values: Vec<Real>, window: usize) -> Self {
        Self { values, window }
    }

    pub fn values(&self) -> &[Real] {
        &self.values
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub fn derive_acceleration(
    series: &SampleSeries,
    config: &MonitorConfig,
) -> MonitorResult<AccelSignal> {
    let window = config.accel_window();
    let n = series.len();
    if n <= window {
        return Err(MonitorError::InsufficientData {
            what: "acceleration window",
            needed: window,
            len: n,
        });
    }

    let values = (0..n - window)
        .map(|i| (series.setpoint(i + window) - series.setpoint(i)) / config.sampling_rate_s)
        .collect();
    Ok(AccelSignal { values, window })
}
