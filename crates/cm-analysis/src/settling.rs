//! Settling time after elevation-induced disturbances.

use serde::{Deserialize, Serialize};

use cm_core::{MonitorConfig, MonitorResult, Real, ResponseTime, SampleSeries};

use crate::hills::HillInterval;
use crate::ledger::{FaultCategory, FaultLedger};

/// Inclusive band around a held setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettlingBand {
    pub setpoint: Real,
    pub lower: Real,
    pub upper: Real,
}

impl SettlingBand {
    pub fn new(setpoint: Real, error_fraction: Real) -> Self {
        let half_width = (setpoint * error_fraction).abs();
        Self {
            setpoint,
            lower: setpoint - half_width,
            upper: setpoint + half_width,
        }
    }

    pub fn contains(&self, v: Real) -> bool {
        v >= self.lower && v <= self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettlingRecord {
    pub hill: HillInterval,
    pub band: SettlingBand,
    /// First sample of the qualifying in-band run.
    pub settled_at: Option<usize>,
    pub settling_time: ResponseTime,
    pub faulty: bool,
}

/// Measure settling time for each hill and flag hills that settle too late
/// or not at all. A faulty hill is flagged over its whole span.
pub fn analyze_settling(
    series: &SampleSeries,
    hills: &[HillInterval],
    config: &MonitorConfig,
    ledger: &mut FaultLedger,
) -> MonitorResult<Vec<SettlingRecord>> {
    let mut records = Vec::with_capacity(hills.len());

    for hill in hills {
        // Setpoint is held across a hill; take it from the first sample.
        let band = SettlingBand::new(series.setpoint(hill.start), config.settling_error_fraction);
        let settled_at = (hill.start..=hill.end)
            .find(|&j| settles_at(series, j, &band, config.settling_consecutive));

        let settling_time = match settled_at {
            Some(j) => ResponseTime::Finite(series.time(j) - series.time(hill.start)),
            None => {
                tracing::warn!(
                    start = hill.start,
                    end = hill.end,
                    "measurement never settled after elevation change"
                );
                ResponseTime::Infinite
            }
        };

        let faulty = settling_time.exceeds(config.settling_time_threshold_s);
        if faulty {
            ledger.trigger(hill.start, hill.end + 1, FaultCategory::SettlingTime)?;
        }

        records.push(SettlingRecord {
            hill: *hill,
            band,
            settled_at,
            settling_time,
            faulty,
        });
    }

    tracing::debug!(
        hills = records.len(),
        faulty = records.iter().filter(|r| r.faulty).count(),
        "analyzed settling times"
    );
    Ok(records)
}

/// True when `consecutive` samples starting at `j` exist and are all in band.
fn settles_at(series: &SampleSeries, j: usize, band: &SettlingBand, consecutive: usize) -> bool {
    j + consecutive <= series.len()
        && (j..j + consecutive).all(|k| band.contains(series.measurement(k)))
}
