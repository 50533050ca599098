//! Flat / changing elevation intervals.

use serde::{Deserialize, Serialize};

use cm_core::{MonitorConfig, MonitorError, MonitorResult, SampleSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationKind {
    Flat,
    Changing,
}

/// A run of flat or changing elevation. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevationInterval {
    pub start: usize,
    pub end: usize,
    pub kind: ElevationKind,
}

impl ElevationInterval {
    pub fn is_changing(&self) -> bool {
        self.kind == ElevationKind::Changing
    }
}

/// Partition the series into alternating flat and changing intervals.
///
/// A boundary is placed where the forward elevation slope switches between
/// zero and nonzero. The log is taken to start flat unless its very first
/// slope is already nonzero; the last interval runs to the final sample.
pub fn extract_elevation_intervals(
    series: &SampleSeries,
    config: &MonitorConfig,
) -> Vec<ElevationInterval> {
    let n = series.len();
    let slope = |i: usize| (series.elevation(i + 1) - series.elevation(i)) / config.step_interval_s;

    let mut intervals = Vec::new();
    let mut kind = if n >= 2 && slope(0) != 0.0 {
        ElevationKind::Changing
    } else {
        ElevationKind::Flat
    };
    let mut start = 0;

    for i in 0..n.saturating_sub(2) {
        let (d1, d2) = (slope(i), slope(i + 1));
        let next = match kind {
            ElevationKind::Changing if d1 != 0.0 && d2 == 0.0 => Some(ElevationKind::Flat),
            ElevationKind::Flat if d1 == 0.0 && d2 != 0.0 => Some(ElevationKind::Changing),
            _ => None,
        };
        if let Some(next) = next {
            intervals.push(ElevationInterval {
                start,
                end: i,
                kind,
            });
            start = i + 1;
            kind = next;
        }
    }
    intervals.push(ElevationInterval {
        start,
        end: n - 1,
        kind,
    });

    tracing::debug!(
        intervals = intervals.len(),
        changing = intervals.iter().filter(|e| e.is_changing()).count(),
        "extracted elevation intervals"
    );
    intervals
}

/// Verify intervals alternate in kind and cover `[0, sample_count)` exactly once.
pub fn check_elevation_tiling(
    intervals: &[ElevationInterval],
    sample_count: usize,
) -> MonitorResult<()> {
    let mut cursor = 0;
    for (k, interval) in intervals.iter().enumerate() {
        if interval.start != cursor || interval.end < interval.start {
            return Err(MonitorError::InvariantViolation {
                what: format!(
                    "elevation interval {k} spans [{}, {}] but coverage ends at {cursor}",
                    interval.start, interval.end
                ),
            });
        }
        if k > 0 && intervals[k - 1].kind == interval.kind {
            return Err(MonitorError::InvariantViolation {
                what: format!("elevation intervals {} and {k} do not alternate", k - 1),
            });
        }
        cursor = interval.end + 1;
    }
    if cursor != sample_count {
        return Err(MonitorError::InvariantViolation {
            what: format!(
                "elevation intervals cover [0, {cursor}) but the series has {sample_count} samples"
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_core::Real;

    fn series(elevations: &[Real]) -> SampleSeries {
        SampleSeries::from_rows(
            elevations
                .iter()
                .enumerate()
                .map(|(i, &e)| [i as Real * 0.1, 10.0, 10.0, 0.0, e, 0.0]),
        )
        .unwrap()
    }

    fn spans(intervals: &[ElevationInterval]) -> Vec<(usize, usize, ElevationKind)> {
        intervals.iter().map(|e| (e.start, e.end, e.kind)).collect()
    }

    #[test]
    fn flat_road_is_one_interval() {
        let s = series(&[3.0; 10]);
        let intervals = extract_elevation_intervals(&s, &MonitorConfig::default());
        assert_eq!(spans(&intervals), vec![(0, 9, ElevationKind::Flat)]);
    }

    #[test]
    fn single_hill() {
        use ElevationKind::*;
        let e = [0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0];
        let s = series(&e);
        let intervals = extract_elevation_intervals(&s, &MonitorConfig::default());

        assert_eq!(
            spans(&intervals),
            vec![(0, 1, Flat), (2, 4, Changing), (5, 8, Flat)]
        );
        check_elevation_tiling(&intervals, s.len()).unwrap();
    }

    #[test]
    fn starts_on_a_slope() {
        use ElevationKind::*;
        let e = [0.0, 1.0, 2.0, 2.0, 2.0];
        let intervals = extract_elevation_intervals(&series(&e), &MonitorConfig::default());
        assert_eq!(spans(&intervals), vec![(0, 1, Changing), (2, 4, Flat)]);
    }

    #[test]
    fn ends_on_a_slope() {
        use ElevationKind::*;
        let e = [0.0, 0.0, 0.0, 1.0, 2.0];
        let intervals = extract_elevation_intervals(&series(&e), &MonitorConfig::default());
        assert_eq!(spans(&intervals), vec![(0, 1, Flat), (2, 4, Changing)]);
    }

    #[test]
    fn single_sample() {
        let intervals = extract_elevation_intervals(&series(&[1.0]), &MonitorConfig::default());
        assert_eq!(spans(&intervals), vec![(0, 0, ElevationKind::Flat)]);
    }

    #[test]
    fn tiling_check_rejects_overlap() {
        let intervals = [
            ElevationInterval {
                start: 0,
                end: 4,
                kind: ElevationKind::Flat,
            },
            ElevationInterval {
                start: 4,
                end: 9,
                kind: ElevationKind::Changing,
            },
        ];
        assert!(check_elevation_tiling(&intervals, 10).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use cm_core::Real;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn intervals_tile_and_alternate(deltas in prop::collection::vec(prop_oneof![Just(0i8), -2i8..3], 1..150)) {
            let mut elevation = 0.0;
            let rows: Vec<[Real; 6]> = deltas
                .iter()
                .enumerate()
                .map(|(i, &d)| {
                    elevation += Real::from(d);
                    [i as Real * 0.1, 10.0, 10.0, 0.0, elevation, 0.0]
                })
                .collect();
            let series = SampleSeries::from_rows(rows).unwrap();
            let intervals = extract_elevation_intervals(&series, &MonitorConfig::default());

            prop_assert!(check_elevation_tiling(&intervals, series.len()).is_ok());
        }
    }
}
