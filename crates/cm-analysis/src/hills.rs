//! Elevation changes that disturb a held setpoint.

use serde::{Deserialize, Serialize};

use cm_core::SampleSeries;

use crate::elevation::ElevationInterval;
use crate::periods::Segmentation;

/// An elevation-change window inside a steady-state period. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HillInterval {
    pub start: usize,
    pub end: usize,
    /// Position of the enclosing period among the steady-state periods.
    pub steady_index: usize,
}

impl HillInterval {
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Intersect elevation intervals, flat and changing alike, with steady-state
/// periods.
///
/// An interval belongs to a steady period when it begins at or after the
/// period's start time; it is clipped to the period's last sample. Intervals
/// that begin after the period has ended would clip to an empty span and are
/// skipped.
pub fn map_hill_intervals(
    series: &SampleSeries,
    segmentation: &Segmentation,
    elevation: &[ElevationInterval],
) -> Vec<HillInterval> {
    let mut hills = Vec::new();
    for (steady_index, steady) in segmentation.steady_states().enumerate() {
        let t_min = series.time(steady.start);
        for interval in elevation {
            if series.time(interval.start) < t_min {
                continue;
            }
            let start = interval.start;
            let end = interval.end.min(steady.end);
            if start <= end {
                hills.push(HillInterval {
                    start,
                    end,
                    steady_index,
                });
            }
        }
    }
    tracing::debug!(hills = hills.len(), "mapped hill intervals");
    hills
}
