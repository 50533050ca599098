use std::fmt::Write as _;
use std::path::PathBuf;

use cm_analysis::{ElevationKind, Monitor};
use cm_core::MonitorConfig;
use cm_io::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cm_io_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// 10 m/s cruise with a short climb at samples 100..150 during which the
/// measurement drops well below the setpoint.
fn write_log(path: &std::path::Path, n: usize) {
    let mut text = String::from(
        "Time [s], Setpoint [m/s], Speed [m/s], Position [m], Elevation [m], Force [N]\n",
    );
    for i in 0..n {
        let elevation = (i.clamp(100, 150) - 100) as f64 * 0.2;
        let speed = if (100..150).contains(&i) { 8.0 } else { 10.0 };
        let _ = writeln!(
            text,
            "{:.1}, 10.0, {speed:.1}, {}, {elevation:.1}, 250",
            i as f64 * 0.1,
            i
        );
    }
    std::fs::write(path, text).unwrap();
}

#[test]
fn analyze_log_end_to_end() {
    let dir = scratch_dir("end_to_end");
    let input = dir.join("run.csv");
    write_log(&input, 400);

    let config = MonitorConfig {
        sample_count: Some(400),
        ..MonitorConfig::default()
    };
    let log = load_log(&input, config.sample_count).unwrap();
    let report = Monitor::new(config).unwrap().analyze(&log.series).unwrap();

    // 20% below setpoint on the climb.
    let flags = report.fault_flags();
    assert!((100..150).all(|k| flags[k]));
    assert!(!flags[0] && !flags[399]);

    let output = dir.join("run.annotated.csv");
    write_annotated(&output, &log, flags).unwrap();
    let annotated = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = annotated.lines().collect();
    assert_eq!(lines.len(), 401);
    assert!(lines[0].ends_with(", FaultStatus [0/1]"));
    assert!(lines[1].ends_with(", 0"));
    assert!(lines[120].ends_with(", 1"));

    let run = build_report(&report, &log.series, Some(&input));
    assert_eq!(run.summary.sample_count, 400);
    assert_eq!(run.summary.total_faults, report.ledger.flagged_samples());
    assert!(run.elevation.iter().any(|e| e.kind == ElevationKind::Changing));
    assert_eq!(run.steady_states.len(), 1);

    let report_path = dir.join("run.report.json");
    save_report(&report_path, &run).unwrap();
    let loaded = load_report(&report_path).unwrap();
    assert_eq!(loaded.run_id, run.run_id);
    assert_eq!(loaded.summary.total_faults, run.summary.total_faults);
    assert_eq!(loaded.hills.len(), run.hills.len());
    assert_eq!(loaded.config, run.config);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn config_file_round_trip() {
    let dir = scratch_dir("config");
    let path = dir.join("monitor.yaml");

    let config = MonitorConfig {
        sample_count: Some(6000),
        settling_time_threshold_s: 10.0,
        ..MonitorConfig::default()
    };
    save_config(&path, &config).unwrap();
    assert_eq!(load_config(&path).unwrap(), config);

    std::fs::write(&path, "sampling_rate_s: 0.25\nstep_interval_s: 0.1\n").unwrap();
    assert!(matches!(load_config(&path), Err(IoError::Config(_))));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_file_names_path() {
    let path = std::env::temp_dir().join("cm_io_does_not_exist.csv");
    let err = load_log(&path, None).unwrap_err();
    assert!(matches!(err, IoError::Read { .. }));
    assert!(err.to_string().contains("cm_io_does_not_exist.csv"));
}
