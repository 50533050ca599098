//! Transient / steady-state segmentation of the setpoint acceleration.

use serde::{Deserialize, Serialize};

use cm_core::{MonitorError, MonitorResult, Real};

use crate::accel::AccelSignal;

/// A run of nonzero setpoint acceleration. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransientPeriod {
    pub start: usize,
    pub end: usize,
    pub average_accel: Real,
}

impl TransientPeriod {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A run of zero setpoint acceleration. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteadyStatePeriod {
    pub start: usize,
    pub end: usize,
    /// Sample whose setpoint is the target held during this period.
    pub setpoint_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    Transient(TransientPeriod),
    SteadyState(SteadyStatePeriod),
}

impl Period {
    pub fn start(&self) -> usize {
        match self {
            Period::Transient(t) => t.start,
            Period::SteadyState(s) => s.start,
        }
    }

    /// One past the last sample covered.
    pub fn end_exclusive(&self) -> usize {
        match self {
            Period::Transient(t) => t.end,
            Period::SteadyState(s) => s.end + 1,
        }
    }

    pub fn as_transient(&self) -> Option<&TransientPeriod> {
        match self {
            Period::Transient(t) => Some(t),
            Period::SteadyState(_) => None,
        }
    }

    pub fn as_steady(&self) -> Option<&SteadyStatePeriod> {
        match self {
            Period::SteadyState(s) => Some(s),
            Period::Transient(_) => None,
        }
    }

    fn is_transient(&self) -> bool {
        matches!(self, Period::Transient(_))
    }
}

/// Periods in time order, alternating in kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segmentation {
    periods: Vec<Period>,
}

impl Segmentation {
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn transients(&self) -> impl Iterator<Item = &TransientPeriod> {
        self.periods.iter().filter_map(Period::as_transient)
    }

    pub fn steady_states(&self) -> impl Iterator<Item = &SteadyStatePeriod> {
        self.periods.iter().filter_map(Period::as_steady)
    }

    /// Verify the periods alternate and cover `[0, sample_count)` exactly once.
    pub fn check_tiling(&self, sample_count: usize) -> MonitorResult<()> {
        let mut cursor = 0;
        for (k, period) in self.periods.iter().enumerate() {
            if period.start() != cursor {
                return Err(violation(format!(
                    "period {k} starts at {} but previous coverage ends at {cursor}",
                    period.start()
                )));
            }
            if period.end_exclusive() <= period.start() {
                return Err(violation(format!("period {k} is empty")));
            }
            if k > 0 && self.periods[k - 1].is_transient() == period.is_transient() {
                return Err(violation(format!("periods {} and {k} do not alternate", k - 1)));
            }
            cursor = period.end_exclusive();
        }
        if cursor != sample_count {
            return Err(violation(format!(
                "periods cover [0, {cursor}) but the series has {sample_count} samples"
            )));
        }
        Ok(())
    }
}

fn violation(what: String) -> MonitorError {
    MonitorError::InvariantViolation { what }
}

/// Split the acceleration signal into alternating periods.
///
/// The trailing steady-state period is stretched to the last *sample* of
/// the series: the derivative window truncates the signal, but the final
/// setpoint is held to the end of the log. A run still accelerating when
/// the signal ends is closed at `sample_count` for the same reason.
pub fn segment_periods(accel: &AccelSignal, sample_count: usize) -> Segmentation {
    let values = accel.values();
    let last = values.len().saturating_sub(1);
    let mut periods = Vec::new();

    let mut sum = 0.0;
    let mut count = 0usize;
    let mut zero_run = 0usize;

    for (i, &a) in values.iter().enumerate() {
        if a != 0.0 {
            sum += a;
            count += 1;
            if zero_run > 0 {
                periods.push(Period::SteadyState(SteadyStatePeriod {
                    start: i - zero_run,
                    end: i - 1,
                    setpoint_index: i - 1,
                }));
                zero_run = 0;
            }
        } else {
            if count > 0 {
                periods.push(Period::Transient(TransientPeriod {
                    start: i - count,
                    end: i,
                    average_accel: sum / count as Real,
                }));
                sum = 0.0;
                count = 0;
            }
            zero_run += 1;
            if i == last {
                periods.push(Period::SteadyState(SteadyStatePeriod {
                    start: i + 1 - zero_run,
                    end: sample_count - 1,
                    setpoint_index: i,
                }));
            }
        }
    }

    if count > 0 {
        periods.push(Period::Transient(TransientPeriod {
            start: values.len() - count,
            end: sample_count,
            average_accel: sum / count as Real,
        }));
    }

    tracing::debug!(
        periods = periods.len(),
        transients = periods.iter().filter(|p| p.is_transient()).count(),
        "segmented setpoint acceleration"
    );
    Segmentation { periods }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use cm_core::{MonitorConfig, SampleSeries};
    use proptest::prelude::*;

    use crate::accel::derive_acceleration;

    proptest! {
        #[test]
        fn periods_tile_the_series(steps in prop::collection::vec(0u8..3, 6..120)) {
            // Setpoint changes only at multiples of the window, like a logged run.
            let setpoints: Vec<Real> = steps
                .iter()
                .enumerate()
                .map(|(i, _)| 10.0 + steps[..=(i / 5) * 5].iter().map(|&s| Real::from(s)).sum::<Real>())
                .collect();
            let series = SampleSeries::from_rows(
                setpoints.iter().enumerate().map(|(i, &sp)| [i as Real * 0.1, sp, sp, 0.0, 0.0, 0.0]),
            ).unwrap();
            let accel = derive_acceleration(&series, &MonitorConfig::default()).unwrap();
            let seg = segment_periods(&accel, series.len());

            prop_assert!(seg.check_tiling(series.len()).is_ok());
        }

        #[test]
        fn arbitrary_signal_tiles(signal in prop::collection::vec(prop_oneof![Just(0.0), -3.0..3.0_f64], 1..200)) {
            let series = SampleSeries::from_rows(
                (0..signal.len() + 5).map(|i| [i as Real * 0.1, 1.0, 1.0, 0.0, 0.0, 0.0]),
            ).unwrap();
            let accel = AccelSignal::from_values(signal, 5);
            let seg = segment_periods(&accel, series.len());

            prop_assert!(seg.check_tiling(series.len()).is_ok());
        }
    }
}
