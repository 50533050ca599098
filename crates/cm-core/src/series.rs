//! Logged controller samples.

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};
use crate::numeric::{Real, ensure_finite};

/// One logged row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub index: usize,
    /// [s]
    pub time_s: Real,
    /// [m/s]
    pub setpoint: Real,
    /// [m/s]
    pub measurement: Real,
    /// Longitudinal position [m]
    pub position: Real,
    /// [m]
    pub elevation: Real,
    /// [N]
    pub controller_output: Real,
}

impl Sample {
    /// Build a sample from the six logged columns in file order.
    pub fn from_columns(index: usize, columns: [Real; 6]) -> Self {
        let [time_s, setpoint, measurement, position, elevation, controller_output] = columns;
        Self {
            index,
            time_s,
            setpoint,
            measurement,
            position,
            elevation,
            controller_output,
        }
    }

    pub fn columns(&self) -> [Real; 6] {
        [
            self.time_s,
            self.setpoint,
            self.measurement,
            self.position,
            self.elevation,
            self.controller_output,
        ]
    }

    fn ensure_finite(&self) -> MonitorResult<()> {
        const NAMES: [&str; 6] = [
            "time",
            "setpoint",
            "measurement",
            "position",
            "elevation",
            "controller output",
        ];
        for (name, value) in NAMES.iter().zip(self.columns()) {
            ensure_finite(value, name, self.index)?;
        }
        Ok(())
    }
}

/// Immutable, validated log. Shared read-only by every analysis stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    samples: Vec<Sample>,
}

impl SampleSeries {
    /// Validate and wrap samples.
    ///
    /// Rejects an empty series, non-finite fields, indices that do not
    /// strictly increase, and time running backwards.
    pub fn new(samples: Vec<Sample>) -> MonitorResult<Self> {
        if samples.is_empty() {
            return Err(MonitorError::InvalidSeries {
                what: "series is empty",
                index: 0,
            });
        }
        for sample in &samples {
            sample.ensure_finite()?;
        }
        for pair in samples.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.index <= prev.index {
                return Err(MonitorError::InvalidSeries {
                    what: "sample index must strictly increase",
                    index: next.index,
                });
            }
            if next.time_s < prev.time_s {
                return Err(MonitorError::InvalidSeries {
                    what: "time must be non-decreasing",
                    index: next.index,
                });
            }
        }
        Ok(Self { samples })
    }

    /// Build from column rows, numbering samples from zero.
    pub fn from_rows(rows: impl IntoIterator<Item = [Real; 6]>) -> MonitorResult<Self> {
        let samples = rows
            .into_iter()
            .enumerate()
            .map(|(i, columns)| Sample::from_columns(i, columns))
            .collect();
        Self::new(samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.samples.len() - 1
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn time(&self, i: usize) -> Real {
        self.samples[i].time_s
    }

    pub fn setpoint(&self, i: usize) -> Real {
        self.samples[i].setpoint
    }

    pub fn measurement(&self, i: usize) -> Real {
        self.samples[i].measurement
    }

    pub fn elevation(&self, i: usize) -> Real {
        self.samples[i].elevation
    }
}

impl<'a> IntoIterator for &'a SampleSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
