//! Segmentation and fault detection for logged cruise-control runs.
//!
//! The engine is a linear pipeline. Each stage takes the immutable results
//! of the stages before it and returns new values:
//!
//! 1. [`accel`]: coarse setpoint acceleration
//! 2. [`periods`]: transient / steady-state segmentation
//! 3. [`elevation`]: flat / changing elevation intervals
//! 4. [`hills`]: elevation changes inside steady-state periods
//! 5. [`rise_time`], [`settling`], [`raw_error`]: fault criteria
//!
//! All three criteria write into a single [`FaultLedger`], which guarantees a
//! sample is counted at most once across categories.

pub mod accel;
pub mod elevation;
pub mod hills;
pub mod ledger;
pub mod periods;
pub mod pipeline;
pub mod raw_error;
pub mod rise_time;
pub mod settling;

pub use accel::{AccelSignal, derive_acceleration};
pub use elevation::{
    ElevationInterval, ElevationKind, check_elevation_tiling, extract_elevation_intervals,
};
pub use hills::{HillInterval, map_hill_intervals};
pub use ledger::{FaultBreakdown, FaultCategory, FaultLedger};
pub use periods::{Period, Segmentation, SteadyStatePeriod, TransientPeriod, segment_periods};
pub use pipeline::{Monitor, MonitorReport};
pub use raw_error::{RawErrorAnalysis, analyze_raw_error};
pub use rise_time::{RiseBand, RiseTimeAnalysis, RiseTimeRecord, analyze_rise_times};
pub use settling::{SettlingBand, SettlingRecord, analyze_settling};
