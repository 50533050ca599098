//! Per-sample tracking error, independent of segmentation.

use cm_core::{MonitorConfig, MonitorError, MonitorResult, Real, SampleSeries};

use crate::ledger::{FaultCategory, FaultLedger};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawErrorAnalysis {
    /// `setpoint - measurement` for every sample.
    pub errors: Vec<Real>,
    /// Samples whose relative error exceeded the threshold, whether or not
    /// another category had already flagged them.
    pub exceedances: usize,
}

/// Flag samples whose relative error `|sp - pv| / |sp|` is above the threshold.
///
/// A zero setpoint anywhere in the series fails the whole stage before any
/// sample is flagged.
pub fn analyze_raw_error(
    series: &SampleSeries,
    config: &MonitorConfig,
    ledger: &mut FaultLedger,
) -> MonitorResult<RawErrorAnalysis> {
    if let Some(zero) = series.iter().find(|s| s.setpoint == 0.0) {
        return Err(MonitorError::ZeroSetpoint { index: zero.index });
    }

    let mut analysis = RawErrorAnalysis {
        errors: Vec::with_capacity(series.len()),
        exceedances: 0,
    };
    for (i, sample) in series.iter().enumerate() {
        let error = sample.setpoint - sample.measurement;
        analysis.errors.push(error);
        if (error / sample.setpoint).abs() > config.raw_error_threshold {
            analysis.exceedances += 1;
            ledger.trigger(i, i + 1, FaultCategory::RawError)?;
        }
    }

    tracing::debug!(
        exceedances = analysis.exceedances,
        "analyzed raw tracking error"
    );
    Ok(analysis)
}
