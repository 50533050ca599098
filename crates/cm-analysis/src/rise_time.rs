//! Relative rise time of each transient, and steady-state error when the
//! measurement never completes its rise.

use serde::{Deserialize, Serialize};

use cm_core::{MonitorConfig, MonitorResult, Real, ResponseTime, SampleSeries, mean};

use crate::ledger::{FaultCategory, FaultLedger};
use crate::periods::{Segmentation, TransientPeriod};

/// 10%–90% band of a relative setpoint step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiseBand {
    pub v_initial: Real,
    pub v_final: Real,
    /// 10% point of the step.
    pub lower: Real,
    /// 90% point of the step.
    pub upper: Real,
}

impl RiseBand {
    pub fn new(v_initial: Real, v_final: Real) -> Self {
        let step = v_final - v_initial;
        Self {
            v_initial,
            v_final,
            lower: v_initial + 0.1 * step,
            upper: v_initial + 0.9 * step,
        }
    }

    fn rising(&self) -> bool {
        self.v_final >= self.v_initial
    }

    /// Past the 10% point, in the direction of the step.
    fn past_lower(&self, v: Real) -> bool {
        if self.rising() {
            v >= self.lower
        } else {
            v <= self.lower
        }
    }

    /// At or past the 90% point, in the direction of the step.
    fn reached_upper(&self, v: Real) -> bool {
        if self.rising() {
            v >= self.upper
        } else {
            v <= self.upper
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiseTimeRecord {
    pub transient: TransientPeriod,
    /// Position among the steady-state periods of the period this transient
    /// drives into. `None` when the log ends mid-transient.
    pub steady_index: Option<usize>,
    pub band: RiseBand,
    pub rise_time: ResponseTime,
    pub faulty: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RiseTimeAnalysis {
    pub records: Vec<RiseTimeRecord>,
    /// One entry per steady-state period, in order. Zero unless the
    /// transient driving into the period never reached its 90% point.
    pub steady_state_errors: Vec<Real>,
}

/// Measure rise time for every transient and flag slow or incomplete rises.
pub fn analyze_rise_times(
    series: &SampleSeries,
    segmentation: &Segmentation,
    config: &MonitorConfig,
    ledger: &mut FaultLedger,
) -> MonitorResult<RiseTimeAnalysis> {
    let periods = segmentation.periods();
    let mut analysis = RiseTimeAnalysis {
        records: Vec::new(),
        steady_state_errors: vec![0.0; segmentation.steady_states().count()],
    };
    let mut steady_seen = 0;

    for (p, period) in periods.iter().enumerate() {
        let Some(transient) = period.as_transient() else {
            steady_seen += 1;
            continue;
        };

        let previous = p.checked_sub(1).and_then(|q| periods[q].as_steady());
        let next = periods.get(p + 1).and_then(|q| q.as_steady());

        let v_initial = previous.map_or(series.setpoint(0), |s| series.setpoint(s.setpoint_index));
        let v_final = next.map_or(series.setpoint(series.last_index()), |s| {
            series.setpoint(s.setpoint_index)
        });
        let band = RiseBand::new(v_initial, v_final);
        let rise_time = measure_rise(series, transient, &band, config.step_interval_s);

        let faulty = rise_time.exceeds(config.rise_time_threshold_s);
        if faulty {
            ledger.trigger(transient.start, transient.end, FaultCategory::RiseTime)?;
        }

        if rise_time.is_infinite() {
            tracing::warn!(
                start = transient.start,
                end = transient.end,
                target = v_final,
                "measurement never reached 90% of setpoint step"
            );
            if let Some(steady) = next {
                let average = mean((steady.start..=steady.end).map(|k| series.measurement(k)))
                    .unwrap_or(v_final);
                analysis.steady_state_errors[steady_seen] = v_final - average;
            }
        }

        analysis.records.push(RiseTimeRecord {
            transient: *transient,
            steady_index: next.map(|_| steady_seen),
            band,
            rise_time,
            faulty,
        });
    }

    tracing::debug!(
        transients = analysis.records.len(),
        faulty = analysis.records.iter().filter(|r| r.faulty).count(),
        "analyzed rise times"
    );
    Ok(analysis)
}

/// Count samples between the 10% and 90% points, including the one that
/// crosses 90%. A zero-height step has nothing to rise through.
fn measure_rise(
    series: &SampleSeries,
    transient: &TransientPeriod,
    band: &RiseBand,
    step_interval_s: Real,
) -> ResponseTime {
    if band.v_final == band.v_initial {
        return ResponseTime::Finite(0.0);
    }

    let mut count = 0usize;
    for j in transient.start..transient.end {
        let v = series.measurement(j);
        if band.reached_upper(v) {
            count += 1;
            return ResponseTime::Finite(step_interval_s * count as Real);
        }
        if band.past_lower(v) {
            count += 1;
        }
    }
    ResponseTime::Infinite
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::derive_acceleration;
    use crate::periods::segment_periods;

    /// Setpoint climbs 1 m/s every 0.5 s from 0 to 10, then holds.
    fn ramp_setpoint(i: usize) -> Real {
        (i / 5).min(10) as Real
    }

    fn run(
        measurement: impl Fn(usize) -> Real,
        config: &MonitorConfig,
    ) -> (RiseTimeAnalysis, FaultLedger) {
        let series = SampleSeries::from_rows(
            (0..120).map(|i| [i as Real * 0.1, ramp_setpoint(i), measurement(i), 0.0, 0.0, 0.0]),
        )
        .unwrap();
        let accel = derive_acceleration(&series, config).unwrap();
        let seg = segment_periods(&accel, series.len());
        let mut ledger = FaultLedger::new(series.len());
        let analysis = analyze_rise_times(&series, &seg, config, &mut ledger).unwrap();
        (analysis, ledger)
    }

    #[test]
    fn linear_ramp_rise_time() {
        // Measurement reaches 10 m/s at t = 5 s.
        let (analysis, ledger) = run(|i| (i as Real / 5.0).min(10.0), &MonitorConfig::default());

        assert_eq!(analysis.records.len(), 1);
        let record = &analysis.records[0];
        assert_eq!((record.transient.start, record.transient.end), (0, 50));
        assert_eq!(record.band.v_initial, 0.0);
        assert_eq!(record.band.v_final, 10.0);
        // Samples 5..=44 sit in the band; sample 45 crosses 9 m/s.
        let rise = record.rise_time.seconds().unwrap();
        assert!((rise - 4.1).abs() < 1e-9, "rise time {rise}");
        assert!(!record.faulty);
        assert_eq!(ledger.total_faults(), 0);
        assert_eq!(analysis.steady_state_errors, vec![0.0]);
    }

    #[test]
    fn slow_rise_flags_whole_transient() {
        let config = MonitorConfig {
            rise_time_threshold_s: 3.0,
            ..MonitorConfig::default()
        };
        let (analysis, ledger) = run(|i| (i as Real / 5.0).min(10.0), &config);

        assert!(analysis.records[0].faulty);
        assert_eq!(ledger.count(FaultCategory::RiseTime), 50);
        assert!(ledger.flags()[..50].iter().all(|&f| f));
        assert!(!ledger.is_flagged(50));
    }

    #[test]
    fn never_reaching_ninety_percent_is_infinite() {
        // Measurement stalls at 8 m/s.
        let (analysis, ledger) = run(|i| (i as Real / 5.0).min(8.0), &MonitorConfig::default());

        let record = &analysis.records[0];
        assert_eq!(record.rise_time, ResponseTime::Infinite);
        assert!(record.faulty);
        assert_eq!(record.steady_index, Some(0));
        assert_eq!(ledger.count(FaultCategory::RiseTime), 50);
        // Held 8 m/s against a 10 m/s target over the following steady period.
        assert!((analysis.steady_state_errors[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn falling_step_is_measured_downward() {
        let series = SampleSeries::from_rows((0..60).map(|i| {
            let sp = if i < 10 { 20.0 } else { 10.0 };
            let pv = if i < 10 { 20.0 } else { 10.0 };
            [i as Real * 0.1, sp, pv, 0.0, 0.0, 0.0]
        }))
        .unwrap();
        let config = MonitorConfig::default();
        let accel = derive_acceleration(&series, &config).unwrap();
        let seg = segment_periods(&accel, series.len());
        let mut ledger = FaultLedger::new(series.len());
        let analysis = analyze_rise_times(&series, &seg, &config, &mut ledger).unwrap();

        let record = &analysis.records[0];
        assert_eq!(record.band.v_initial, 20.0);
        assert_eq!(record.band.v_final, 10.0);
        // Transient covers samples 5..10 at 20 m/s, then drops; none of those
        // reach the 11 m/s point, so the rise is incomplete within the window.
        assert_eq!((record.transient.start, record.transient.end), (5, 10));
        assert_eq!(record.rise_time, ResponseTime::Infinite);
        assert_eq!(analysis.steady_state_errors.len(), 2);
        assert!((analysis.steady_state_errors[1] - 0.0).abs() < 1e-9);
    }

    #[test]
    fn band_orientation() {
        let up = RiseBand::new(0.0, 10.0);
        assert!(up.past_lower(1.0) && !up.past_lower(0.5));
        assert!(up.reached_upper(9.0));

        let down = RiseBand::new(20.0, 10.0);
        assert_eq!(down.lower, 19.0);
        assert_eq!(down.upper, 11.0);
        assert!(down.past_lower(18.0) && !down.past_lower(19.5));
        assert!(down.reached_upper(11.0) && !down.reached_upper(12.0));
    }
}
