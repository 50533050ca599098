//! Controller log CSV: six numeric columns under a free-form header.

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use cm_core::{MonitorError, Real, SampleSeries};

use crate::{IoError, IoResult};

const FIELDS: [&str; 6] = [
    "time",
    "setpoint",
    "measurement",
    "position",
    "elevation",
    "controller output",
];

const FAULT_COLUMN: &str = "FaultStatus [0/1]";

/// A parsed log, keeping the header so it can be echoed on output.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerLog {
    pub header: String,
    pub series: SampleSeries,
}

pub fn load_log(path: &Path, expected_rows: Option<usize>) -> IoResult<ControllerLog> {
    let content = fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let log = parse_log(&content, expected_rows)?;
    tracing::debug!(
        path = %path.display(),
        rows = log.series.len(),
        "loaded controller log"
    );
    Ok(log)
}

/// Parse log text. Line numbers in errors are 1-based and count the header.
pub fn parse_log(content: &str, expected_rows: Option<usize>) -> IoResult<ControllerLog> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?;
    if headers.iter().all(str::is_empty) {
        return Err(IoError::MissingHeader);
    }
    let header = headers.iter().collect::<Vec<_>>().join(", ");

    let mut rows = Vec::new();
    let mut line_numbers = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record
            .position()
            .map_or(rows.len() + 2, |p| p.line() as usize);
        rows.push(parse_record(&record, line)?);
        line_numbers.push(line);
    }

    if let Some(expected) = expected_rows
        && expected != rows.len()
    {
        return Err(IoError::RowCount {
            expected,
            found: rows.len(),
        });
    }

    let series = SampleSeries::from_rows(rows).map_err(|source| {
        let index = match source {
            MonitorError::NonFinite { index, .. } | MonitorError::InvalidSeries { index, .. } => {
                index
            }
            _ => 0,
        };
        IoError::Series {
            line: line_numbers.get(index).copied().unwrap_or(1),
            source,
        }
    })?;

    Ok(ControllerLog { header, series })
}

fn parse_record(record: &StringRecord, line: usize) -> IoResult<[Real; 6]> {
    if record.len() != FIELDS.len() {
        return Err(IoError::FieldCount {
            line,
            found: record.len(),
        });
    }

    let mut row = [0.0; 6];
    for ((slot, value), name) in row.iter_mut().zip(record.iter()).zip(FIELDS) {
        *slot = value.parse().map_err(|_| IoError::Parse {
            line,
            field: name,
            value: value.to_string(),
        })?;
    }
    Ok(row)
}

/// Render the log with one fault flag appended to every row.
pub fn render_annotated(log: &ControllerLog, flags: &[bool]) -> IoResult<String> {
    if flags.len() != log.series.len() {
        return Err(IoError::FlagCount {
            expected: log.series.len(),
            found: flags.len(),
        });
    }

    let mut out = format!("{}, {}\n", log.header, FAULT_COLUMN);
    for (sample, &flag) in log.series.iter().zip(flags) {
        for value in sample.columns() {
            out.push_str(&format!("{}, ", value));
        }
        out.push_str(&format!("{}\n", u8::from(flag)));
    }
    Ok(out)
}

pub fn write_annotated(path: &Path, log: &ControllerLog, flags: &[bool]) -> IoResult<()> {
    let content = render_annotated(log, flags)?;
    fs::write(path, content).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "wrote annotated log");
    Ok(())
}
