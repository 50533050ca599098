use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use cm_analysis::{Monitor, MonitorReport};
use cm_core::{MonitorConfig, MonitorError, Real, ResponseTime, SampleSeries};
use cm_io::{ControllerLog, IoError};

#[derive(Parser)]
#[command(name = "cm-cli")]
#[command(about = "Cruise-control monitor - flags faulty samples in controller logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a controller log and write it back annotated with fault flags
    Analyze {
        /// Path to the controller log CSV
        input: PathBuf,
        /// YAML configuration file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Annotated CSV path (defaults to <input>.annotated.csv)
        #[arg(short, long, conflicts_with = "in_place")]
        output: Option<PathBuf>,
        /// Overwrite the input file with the annotated log
        #[arg(long)]
        in_place: bool,
        /// Write a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,
        /// Expected number of data rows, overriding the configuration
        #[arg(long)]
        samples: Option<usize>,
        /// Print period, hill and elevation listings
        #[arg(long)]
        details: bool,
    },
    /// Print the effective configuration as YAML
    Config {
        /// YAML configuration file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] MonitorError),
}

struct AnalyzeArgs {
    input: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    in_place: bool,
    report: Option<PathBuf>,
    samples: Option<usize>,
    details: bool,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            config,
            output,
            in_place,
            report,
            samples,
            details,
        } => cmd_analyze(AnalyzeArgs {
            input,
            config,
            output,
            in_place,
            report,
            samples,
            details,
        }),
        Commands::Config { config } => cmd_config(config.as_deref()),
    }
}

fn load_effective_config(path: Option<&Path>) -> CliResult<MonitorConfig> {
    match path {
        Some(path) => Ok(cm_io::load_config(path)?),
        None => Ok(MonitorConfig::default()),
    }
}

fn cmd_config(path: Option<&Path>) -> CliResult<()> {
    let config = load_effective_config(path)?;
    print!("{}", cm_io::config_to_yaml(&config)?);
    Ok(())
}

fn cmd_analyze(args: AnalyzeArgs) -> CliResult<()> {
    let mut config = load_effective_config(args.config.as_deref())?;
    if args.samples.is_some() {
        config.sample_count = args.samples;
    }
    let monitor = Monitor::new(config)?;

    println!("Analyzing controller log: {}", args.input.display());
    let log = cm_io::load_log(&args.input, monitor.config().sample_count)?;
    let report = monitor.analyze(&log.series)?;

    print_constants(monitor.config());
    print_summary(&report);
    if args.details {
        print_details(&report, &log.series);
    }

    let output = if args.in_place {
        args.input.clone()
    } else {
        args.output
            .clone()
            .unwrap_or_else(|| args.input.with_extension("annotated.csv"))
    };
    write_outputs(&log, &report, &args, &output)?;
    tracing::info!(
        input = %args.input.display(),
        output = %output.display(),
        faults = report.breakdown().total_faults,
        "analysis written"
    );
    Ok(())
}

fn write_outputs(
    log: &ControllerLog,
    report: &MonitorReport,
    args: &AnalyzeArgs,
    output: &Path,
) -> CliResult<()> {
    cm_io::write_annotated(output, log, report.fault_flags())?;
    println!("\n✓ Annotated log written: {}", output.display());

    if let Some(path) = &args.report {
        let run = cm_io::build_report(report, &log.series, Some(&args.input));
        cm_io::save_report(path, &run)?;
        println!("✓ Run report written: {} ({})", path.display(), run.run_id);
    }
    Ok(())
}

fn print_constants(config: &MonitorConfig) {
    println!("\nConstants:");
    match config.sample_count {
        Some(n) => println!("  Sample count:             {}", n),
        None => println!("  Sample count:             any"),
    }
    println!("  Sampling rate:            {:.3} s", config.sampling_rate_s);
    println!("  Step interval:            {:.3} s", config.step_interval_s);
    println!(
        "  Rise time threshold:      {:.3} s",
        config.rise_time_threshold_s
    );
    println!(
        "  Settling error fraction:  {:.3}",
        config.settling_error_fraction
    );
    println!(
        "  Settling consecutive:     {}",
        config.settling_consecutive
    );
    println!(
        "  Settling time threshold:  {:.3} s",
        config.settling_time_threshold_s
    );
    println!(
        "  Raw error threshold:      {:.3}",
        config.raw_error_threshold
    );
}

fn print_summary(report: &MonitorReport) {
    let b = report.breakdown();
    println!(
        "\nTotal faults: {} of {} samples ({:.2}%)",
        b.total_faults,
        b.sample_count,
        100.0 * b.total_fraction
    );
    println!("\nError breakdown:");
    println!(
        "  Rise time:     {:>6} ({:.2}%)",
        b.rise_time_faults,
        100.0 * b.rise_time_fraction
    );
    println!(
        "  Settling time: {:>6} ({:.2}%)",
        b.settling_time_faults,
        100.0 * b.settling_time_fraction
    );
    println!(
        "  Raw error:     {:>6} ({:.2}%)",
        b.raw_error_faults,
        100.0 * b.raw_error_fraction
    );
    if report.ledger.degenerate_triggers() > 0 {
        println!(
            "  Degenerate triggers: {}",
            report.ledger.degenerate_triggers()
        );
    }
}

fn print_details(report: &MonitorReport, series: &SampleSeries) {
    let sentinel = report.config.infinite_sentinel;
    let t = |i: usize| series.time(i);

    println!("\nTransient periods:");
    for r in &report.rise.records {
        let last = r.transient.end.saturating_sub(1).max(r.transient.start);
        println!(
            "  [{:>5}, {:>5}]  t={:.1}-{:.1}s  accel={:+.3}  {:.2} -> {:.2} m/s  rise={}{}",
            r.transient.start,
            last,
            t(r.transient.start),
            t(last),
            r.transient.average_accel,
            r.band.v_initial,
            r.band.v_final,
            format_response(r.rise_time, sentinel),
            fault_marker(r.faulty)
        );
    }

    println!("\nSteady-state periods:");
    for (s, error) in report
        .segmentation
        .steady_states()
        .zip(&report.rise.steady_state_errors)
    {
        println!(
            "  [{:>5}, {:>5}]  t={:.1}-{:.1}s  setpoint={:.2} m/s  sse={:.3}",
            s.start,
            s.end,
            t(s.start),
            t(s.end),
            series.setpoint(s.setpoint_index),
            error
        );
    }

    println!("\nHill settling times:");
    for r in &report.settling {
        println!(
            "  [{:>5}, {:>5}]  t={:.1}-{:.1}s  settling={}{}",
            r.hill.start,
            r.hill.end,
            t(r.hill.start),
            t(r.hill.end),
            format_response(r.settling_time, sentinel),
            fault_marker(r.faulty)
        );
    }

    println!("\nElevation intervals:");
    for e in &report.elevation {
        println!(
            "  [{:>5}, {:>5}]  t={:.1}-{:.1}s  {:?}",
            e.start,
            e.end,
            t(e.start),
            t(e.end),
            e.kind
        );
    }
}

fn format_response(response: ResponseTime, sentinel: Real) -> String {
    match response {
        ResponseTime::Finite(seconds) => format!("{:.3}s", seconds),
        ResponseTime::Infinite => format!("{} (never)", sentinel),
    }
}

fn fault_marker(faulty: bool) -> &'static str {
    if faulty { "  FAULT" } else { "" }
}
