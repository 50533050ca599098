//! Per-sample fault flags and per-category bookkeeping.

use serde::{Deserialize, Serialize};

use cm_core::{MonitorError, MonitorResult, Real};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCategory {
    RiseTime,
    SettlingTime,
    RawError,
}

impl FaultCategory {
    pub const ALL: [FaultCategory; 3] = [
        FaultCategory::RiseTime,
        FaultCategory::SettlingTime,
        FaultCategory::RawError,
    ];

    fn slot(self) -> usize {
        match self {
            FaultCategory::RiseTime => 0,
            FaultCategory::SettlingTime => 1,
            FaultCategory::RawError => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FaultCategory::RiseTime => "rise time",
            FaultCategory::SettlingTime => "settling time",
            FaultCategory::RawError => "raw error",
        }
    }
}

/// Fault state for one pipeline run.
///
/// The first category to flag a sample owns it; later triggers over the same
/// sample neither re-flag nor re-count it.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultLedger {
    flags: Vec<bool>,
    counts: [usize; 3],
    total: usize,
    degenerate: usize,
}

impl FaultLedger {
    pub fn new(sample_count: usize) -> Self {
        Self {
            flags: vec![false; sample_count],
            counts: [0; 3],
            total: 0,
            degenerate: 0,
        }
    }

    /// Flag every sample in `[start, end)` not flagged yet.
    ///
    /// `start == end` records a single interval-level fault without flagging
    /// any sample. Returns the number of faults added.
    pub fn trigger(
        &mut self,
        start: usize,
        end: usize,
        category: FaultCategory,
    ) -> MonitorResult<usize> {
        if end > self.flags.len() {
            return Err(MonitorError::IndexOutOfBounds {
                what: "fault range end",
                index: end,
                len: self.flags.len(),
            });
        }
        if start > end {
            return Err(MonitorError::IndexOutOfBounds {
                what: "fault range start past end",
                index: start,
                len: end,
            });
        }

        if start == end {
            self.degenerate += 1;
            self.record(category, 1);
            return Ok(1);
        }

        let mut added = 0;
        for flag in &mut self.flags[start..end] {
            if !*flag {
                *flag = true;
                added += 1;
            }
        }
        self.record(category, added);
        Ok(added)
    }

    fn record(&mut self, category: FaultCategory, added: usize) {
        self.counts[category.slot()] += added;
        self.total += added;
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn sample_count(&self) -> usize {
        self.flags.len()
    }

    pub fn total_faults(&self) -> usize {
        self.total
    }

    pub fn count(&self, category: FaultCategory) -> usize {
        self.counts[category.slot()]
    }

    pub fn flagged_samples(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    pub fn degenerate_triggers(&self) -> usize {
        self.degenerate
    }

    pub fn breakdown(&self) -> FaultBreakdown {
        let n = self.flags.len().max(1) as Real;
        FaultBreakdown {
            sample_count: self.flags.len(),
            total_faults: self.total,
            total_fraction: self.total as Real / n,
            rise_time_faults: self.count(FaultCategory::RiseTime),
            rise_time_fraction: self.count(FaultCategory::RiseTime) as Real / n,
            settling_time_faults: self.count(FaultCategory::SettlingTime),
            settling_time_fraction: self.count(FaultCategory::SettlingTime) as Real / n,
            raw_error_faults: self.count(FaultCategory::RawError),
            raw_error_fraction: self.count(FaultCategory::RawError) as Real / n,
        }
    }
}

/// Fault totals and their share of the sample count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultBreakdown {
    pub sample_count: usize,
    pub total_faults: usize,
    pub total_fraction: Real,
    pub rise_time_faults: usize,
    pub rise_time_fraction: Real,
    pub settling_time_faults: usize,
    pub settling_time_fraction: Real,
    pub raw_error_faults: usize,
    pub raw_error_fraction: Real,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_flags_range() {
        let mut ledger = FaultLedger::new(10);
        assert_eq!(ledger.trigger(2, 5, FaultCategory::RiseTime).unwrap(), 3);

        assert!(ledger.is_flagged(2) && ledger.is_flagged(4));
        assert!(!ledger.is_flagged(5));
        assert_eq!(ledger.total_faults(), 3);
        assert_eq!(ledger.count(FaultCategory::RiseTime), 3);
    }

    #[test]
    fn overlapping_categories_are_not_double_counted() {
        let mut ledger = FaultLedger::new(10);
        ledger.trigger(0, 6, FaultCategory::RiseTime).unwrap();
        let added = ledger.trigger(4, 10, FaultCategory::SettlingTime).unwrap();

        assert_eq!(added, 4);
        assert_eq!(ledger.count(FaultCategory::RiseTime), 6);
        assert_eq!(ledger.count(FaultCategory::SettlingTime), 4);
        assert_eq!(ledger.total_faults(), 10);
        assert_eq!(ledger.flagged_samples(), 10);
    }

    #[test]
    fn degenerate_trigger_counts_without_flagging() {
        let mut ledger = FaultLedger::new(4);
        ledger.trigger(2, 2, FaultCategory::SettlingTime).unwrap();

        assert_eq!(ledger.total_faults(), 1);
        assert_eq!(ledger.count(FaultCategory::SettlingTime), 1);
        assert_eq!(ledger.flagged_samples(), 0);
        assert_eq!(ledger.degenerate_triggers(), 1);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut ledger = FaultLedger::new(4);
        assert!(ledger.trigger(0, 5, FaultCategory::RawError).is_err());
        assert!(ledger.trigger(3, 2, FaultCategory::RawError).is_err());
        assert_eq!(ledger.total_faults(), 0);
    }

    #[test]
    fn breakdown_fractions() {
        let mut ledger = FaultLedger::new(20);
        ledger.trigger(0, 5, FaultCategory::RawError).unwrap();
        let b = ledger.breakdown();
        assert_eq!(b.total_faults, 5);
        assert!((b.raw_error_fraction - 0.25).abs() < 1e-12);
        assert_eq!(b.rise_time_fraction, 0.0);
    }
}
