//! JSON-lines progress log.
//!
//! [`JsonLogger`] is an [`Observer`] that appends one JSON object per
//! registered evaluation:
//!
//! ```text
//! {"target":-3.2,"params":{"x":2.5,"y":0.1},"datetime":{"datetime":"2024-05-01 12:00:00","elapsed":0.41,"delta":0.02}}
//! ```
//!
//! [`load_logs`] reads such files back into a [`ParameterSpace`], so a run
//! can be resumed or warm-started from earlier results.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::{Event, EventPayload, Observer, ObserverResult};
use crate::space::{ParamMap, ParameterSpace, Params};

/// One line of the log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Objective value.
    pub target: f64,
    /// Evaluated parameters by name.
    pub params: ParamMap,
    /// Wall-clock information; absent in hand-written logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<LogTime>,
}

/// Timing block of a [`LogRecord`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogTime {
    /// Local time of the write, `YYYY-MM-DD HH:MM:SS`.
    pub datetime: String,
    /// Seconds since the logger's first event.
    pub elapsed: f64,
    /// Seconds since the previous record.
    pub delta: f64,
}

/// Observer writing every step event to a JSON-lines file.
///
/// Subscribe it to [`Event::OptimizationStep`]; other events only start the
/// clock. A logger built with [`new`](Self::new) truncates the file on the
/// first event it receives, which is the start event when it is subscribed to
/// one. Each write takes an exclusive file lock, so several processes may
/// share one log.
///
/// # Examples
///
/// ```no_run
/// use bayes_opt::prelude::*;
/// use bayes_opt::JsonLogger;
///
/// let objective = |p: &ParamMap| -> Result<f64, Error> { Ok(-p["x"] * p["x"]) };
/// let mut optimizer =
///     BayesianOptimization::builder(objective, Bounds::from([("x", (-1.0, 1.0))])).build()?;
/// optimizer.subscribe(Event::OptimizationStep, JsonLogger::new("logs.jsonl"));
/// optimizer.maximize(2, 3)?;
/// # Ok::<_, Error>(())
/// ```
#[derive(Debug)]
pub struct JsonLogger {
    path: PathBuf,
    truncate: bool,
    start: Option<Instant>,
    previous: Option<Instant>,
}

impl JsonLogger {
    /// Logger that truncates any existing file on the first event it receives.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_mode(path, true)
    }

    /// Logger that appends to an existing file.
    #[must_use]
    pub fn append(path: impl AsRef<Path>) -> Self {
        Self::with_mode(path, false)
    }

    fn with_mode(path: impl AsRef<Path>, truncate: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            truncate,
            start: None,
            previous: None,
        }
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Empties the file once, on the first event.
    fn reset(&mut self) -> Result<()> {
        if !self.truncate {
            return Ok(());
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(storage)?;
        file.lock_exclusive().map_err(storage)?;
        file.unlock().map_err(storage)?;
        self.truncate = false;
        Ok(())
    }

    fn write(&self, record: &LogRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(storage)?;
        file.lock_exclusive().map_err(storage)?;

        let line = serde_json::to_string(record).map_err(storage)?;
        writeln!(file, "{line}").map_err(storage)?;
        file.flush().map_err(storage)?;

        file.unlock().map_err(storage)?;
        Ok(())
    }
}

impl Observer for JsonLogger {
    fn update(&mut self, payload: &EventPayload) -> ObserverResult {
        let now = Instant::now();
        let start = *self.start.get_or_insert(now);
        self.reset()?;
        if payload.event != Event::OptimizationStep {
            return Ok(());
        }
        let Some(latest) = &payload.latest else {
            return Ok(());
        };

        let previous = self.previous.replace(now).unwrap_or(start);
        let record = LogRecord {
            target: latest.target,
            params: latest.params.clone(),
            datetime: Some(LogTime {
                datetime: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                elapsed: now.duration_since(start).as_secs_f64(),
                delta: now.duration_since(previous).as_secs_f64(),
            }),
        };
        self.write(&record)?;
        Ok(())
    }
}

/// Registers every record of the given JSON-lines files into `space`.
///
/// Records are applied in file order, so a point logged twice keeps the
/// later target. Blank lines are skipped. Returns the number of records read.
///
/// Loading stops at the first bad file or record; records registered before
/// it stay in `space`.
///
/// # Errors
///
/// Returns [`Error::Storage`] if a file cannot be opened or a line is not a
/// valid record, and the registration error if a record does not match the
/// space's keys or has a non-finite value.
pub fn load_logs<P: AsRef<Path>>(
    space: &mut ParameterSpace,
    paths: impl IntoIterator<Item = P>,
) -> Result<usize> {
    let mut count = 0;
    for path in paths {
        for record in read_records(path.as_ref())? {
            space.register(Params::Named(record.params), record.target)?;
            count += 1;
        }
    }
    trace_info!(records = count, "loaded observations from logs");
    Ok(count)
}

/// Reads all records of one file under a shared lock.
///
/// # Errors
///
/// Returns [`Error::Storage`] if the file cannot be opened or read, or a
/// non-blank line does not parse as a [`LogRecord`].
pub fn read_records(path: &Path) -> Result<Vec<LogRecord>> {
    let file = File::open(path)
        .map_err(|e| Error::Storage(format!("{}: {e}", path.display())))?;
    file.lock_shared().map_err(storage)?;

    let mut records = Vec::new();
    for (lineno, line) in BufReader::new(&file).lines().enumerate() {
        let line = line.map_err(storage)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: LogRecord = serde_json::from_str(line)
            .map_err(|e| Error::Storage(format!("{}:{}: {e}", path.display(), lineno + 1)))?;
        records.push(record);
    }

    file.unlock().map_err(storage)?;
    Ok(records)
}

fn storage(e: impl core::fmt::Display) -> Error {
    Error::Storage(e.to_string())
}
