//! JSON run reports.
//!
//! Infinite response times are written as the configured sentinel so the
//! report stays plain numeric JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use cm_analysis::{ElevationKind, FaultBreakdown, MonitorReport};
use cm_core::{MonitorConfig, Real, SampleSeries};

use crate::{IoError, IoResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub config: MonitorConfig,
    pub summary: FaultBreakdown,
    pub degenerate_triggers: usize,
    pub transients: Vec<TransientEntry>,
    pub steady_states: Vec<SteadyStateEntry>,
    pub hills: Vec<HillEntry>,
    pub elevation: Vec<ElevationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransientEntry {
    pub start_index: usize,
    pub end_index: usize,
    pub start_time_s: Real,
    pub end_time_s: Real,
    pub average_accel: Real,
    pub v_initial: Real,
    pub v_final: Real,
    pub rise_time_s: Real,
    pub faulty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteadyStateEntry {
    pub start_index: usize,
    pub end_index: usize,
    pub start_time_s: Real,
    pub end_time_s: Real,
    pub setpoint: Real,
    pub steady_state_error: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HillEntry {
    pub start_index: usize,
    pub end_index: usize,
    pub start_time_s: Real,
    pub end_time_s: Real,
    pub settling_time_s: Real,
    pub faulty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationEntry {
    pub kind: ElevationKind,
    pub start_index: usize,
    pub end_index: usize,
    pub start_time_s: Real,
    pub end_time_s: Real,
}

/// Hash of the configuration and every logged value. Identical inputs
/// analyzed under identical settings share a run id.
pub fn compute_run_id(config: &MonitorConfig, series: &SampleSeries) -> String {
    let mut hasher = Sha256::new();

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());

    for sample in series {
        for value in sample.columns() {
            hasher.update(value.to_le_bytes());
        }
    }

    let result = hasher.finalize();
    format!("{:x}", result)
}

pub fn build_report(
    report: &MonitorReport,
    series: &SampleSeries,
    source: Option<&Path>,
) -> RunReport {
    let sentinel = report.config.infinite_sentinel;
    let time = |i: usize| series.time(i);

    let transients = report
        .rise
        .records
        .iter()
        .map(|r| {
            let last = r.transient.end.saturating_sub(1).max(r.transient.start);
            TransientEntry {
                start_index: r.transient.start,
                end_index: last,
                start_time_s: time(r.transient.start),
                end_time_s: time(last),
                average_accel: r.transient.average_accel,
                v_initial: r.band.v_initial,
                v_final: r.band.v_final,
                rise_time_s: r.rise_time.or_sentinel(sentinel),
                faulty: r.faulty,
            }
        })
        .collect();

    let steady_states = report
        .segmentation
        .steady_states()
        .zip(&report.rise.steady_state_errors)
        .map(|(s, &error)| SteadyStateEntry {
            start_index: s.start,
            end_index: s.end,
            start_time_s: time(s.start),
            end_time_s: time(s.end),
            setpoint: series.setpoint(s.setpoint_index),
            steady_state_error: error,
        })
        .collect();

    let hills = report
        .settling
        .iter()
        .map(|r| HillEntry {
            start_index: r.hill.start,
            end_index: r.hill.end,
            start_time_s: time(r.hill.start),
            end_time_s: time(r.hill.end),
            settling_time_s: r.settling_time.or_sentinel(sentinel),
            faulty: r.faulty,
        })
        .collect();

    let elevation = report
        .elevation
        .iter()
        .map(|e| ElevationEntry {
            kind: e.kind,
            start_index: e.start,
            end_index: e.end,
            start_time_s: time(e.start),
            end_time_s: time(e.end),
        })
        .collect();

    RunReport {
        run_id: compute_run_id(&report.config, series),
        timestamp: chrono::Utc::now().to_rfc3339(),
        source: source.map(|p| p.display().to_string()),
        config: report.config.clone(),
        summary: report.breakdown(),
        degenerate_triggers: report.ledger.degenerate_triggers(),
        transients,
        steady_states,
        hills,
        elevation,
    }
}

pub fn save_report(path: &Path, report: &RunReport) -> IoResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), run_id = %report.run_id, "saved run report");
    Ok(())
}

pub fn load_report(path: &Path) -> IoResult<RunReport> {
    let content = fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
