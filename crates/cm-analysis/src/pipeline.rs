//! Orchestration of the analysis stages.

use cm_core::{MonitorConfig, MonitorError, MonitorResult, SampleSeries};

use crate::accel::{AccelSignal, derive_acceleration};
use crate::elevation::{ElevationInterval, check_elevation_tiling, extract_elevation_intervals};
use crate::hills::{HillInterval, map_hill_intervals};
use crate::ledger::{FaultBreakdown, FaultLedger};
use crate::periods::{Segmentation, segment_periods};
use crate::raw_error::{RawErrorAnalysis, analyze_raw_error};
use crate::rise_time::{RiseTimeAnalysis, analyze_rise_times};
use crate::settling::{SettlingRecord, analyze_settling};

/// Analysis pipeline bound to one validated configuration.
///
/// Holds no state between runs; `analyze` can be called on any number of
/// series.
#[derive(Debug, Clone)]
pub struct Monitor {
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> MonitorResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run every stage in dependency order.
    ///
    /// Rise-time faults are recorded first, then settling-time, then raw
    /// error, so a sample is attributed to the earliest criterion it fails.
    pub fn analyze(&self, series: &SampleSeries) -> MonitorResult<MonitorReport> {
        let config = &self.config;
        let n = series.len();
        if let Some(expected) = config.sample_count
            && expected != n
        {
            return Err(MonitorError::InvalidConfig {
                what: format!("sample_count is {expected} but the series has {n} samples"),
            });
        }

        let accel = derive_acceleration(series, config)?;
        let segmentation = segment_periods(&accel, n);
        segmentation.check_tiling(n)?;

        let elevation = extract_elevation_intervals(series, config);
        check_elevation_tiling(&elevation, n)?;

        let hills = map_hill_intervals(series, &segmentation, &elevation);

        let mut ledger = FaultLedger::new(n);
        let rise = analyze_rise_times(series, &segmentation, config, &mut ledger)?;
        let settling = analyze_settling(series, &hills, config, &mut ledger)?;
        let raw_error = analyze_raw_error(series, config, &mut ledger)?;

        let report = MonitorReport {
            config: config.clone(),
            accel,
            segmentation,
            elevation,
            hills,
            rise,
            settling,
            raw_error,
            ledger,
        };
        let summary = report.breakdown();
        tracing::info!(
            samples = n,
            total_faults = summary.total_faults,
            rise_time = summary.rise_time_faults,
            settling_time = summary.settling_time_faults,
            raw_error = summary.raw_error_faults,
            "controller analysis complete"
        );
        Ok(report)
    }
}

/// Everything one pipeline run derived from a series.
#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub config: MonitorConfig,
    pub accel: AccelSignal,
    pub segmentation: Segmentation,
    pub elevation: Vec<ElevationInterval>,
    pub hills: Vec<HillInterval>,
    pub rise: RiseTimeAnalysis,
    pub settling: Vec<SettlingRecord>,
    pub raw_error: RawErrorAnalysis,
    pub ledger: FaultLedger,
}

impl MonitorReport {
    pub fn fault_flags(&self) -> &[bool] {
        self.ledger.flags()
    }

    pub fn breakdown(&self) -> FaultBreakdown {
        self.ledger.breakdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_core::Real;

    use crate::periods::{Period, SteadyStatePeriod};

    fn constant_series(n: usize) -> SampleSeries {
        SampleSeries::from_rows((0..n).map(|i| [i as Real * 0.1, 10.0, 10.0, i as Real, 0.0, 200.0]))
            .unwrap()
    }

    #[test]
    fn constant_run_has_no_faults() {
        let monitor = Monitor::new(MonitorConfig::default()).unwrap();
        let report = monitor.analyze(&constant_series(200)).unwrap();

        assert_eq!(report.breakdown().total_faults, 0);
        assert!(report.fault_flags().iter().all(|&f| !f));
        assert_eq!(
            report.segmentation.periods(),
            &[Period::SteadyState(SteadyStatePeriod {
                start: 0,
                end: 199,
                setpoint_index: 194
            })]
        );
        // A flat road is one interval, checked for settling like any other.
        assert_eq!(report.hills.len(), 1);
        assert_eq!(report.settling[0].settling_time, cm_core::ResponseTime::Finite(0.0));
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = MonitorConfig {
            step_interval_s: 0.0,
            ..MonitorConfig::default()
        };
        assert!(matches!(
            Monitor::new(config),
            Err(MonitorError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn sample_count_mismatch() {
        let monitor = Monitor::new(MonitorConfig {
            sample_count: Some(6000),
            ..MonitorConfig::default()
        })
        .unwrap();
        let err = monitor.analyze(&constant_series(100)).unwrap_err();
        assert!(format!("{err}").contains("6000"));
    }

    #[test]
    fn short_series_is_degenerate() {
        let monitor = Monitor::new(MonitorConfig::default()).unwrap();
        let err = monitor.analyze(&constant_series(3)).unwrap_err();
        assert!(err.is_degenerate_input());
    }
}
