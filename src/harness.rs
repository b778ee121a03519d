//! Timed trial runner and the repeat-and-aggregate controller.
//!
//! Everything here is strictly sequential: concurrent trials would contend
//! for CPU and disk and corrupt the very wall-clock numbers being measured.

use crate::adapters::Format;
use crate::dataset;
use crate::{
    BenchError, BenchResult, ErrorKind, FormatAdapter, ResultSet, TrialFailure, TrialRecord,
};
use arrow::record_batch::RecordBatch;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Per-run configuration, passed explicitly to [`run`] rather than living in
/// process-wide state.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Repetitions per format; each repetition is an independent trial, not
    /// a retry.
    pub repeats: usize,
    /// Directory under which per-trial scratch directories are created.
    /// Defaults to the system temp dir.
    pub work_dir: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            repeats: 3,
            work_dir: None,
        }
    }
}

/// Raw measurements of one trial; the controller adds format name and trial
/// index when it records them.
#[derive(Debug, Clone, Copy)]
pub struct TrialMeasurement {
    pub write_time: Duration,
    pub read_time: Duration,
    pub file_size: u64,
}

/// Execute one write + read round trip for one adapter.
///
/// The scratch directory is acquired before any timer starts, so temp-file
/// setup never leaks into the timed windows, and it is reclaimed on every
/// exit path by its `Drop`. The size is taken from `fs::metadata` after the
/// adapter has flushed, and the batch returned by `read` is discarded —
/// equality checking is a correctness-test concern, not a timing concern.
pub fn run_trial(
    adapter: &dyn FormatAdapter,
    batch: &RecordBatch,
    work_dir: &Path,
) -> BenchResult<TrialMeasurement> {
    let scope = TempDir::with_prefix_in("trial-", work_dir)?;
    let artifact = scope.path().join(format!("data.{}", adapter.extension()));

    let started = Instant::now();
    adapter.write(batch, &artifact)?;
    let write_time = started.elapsed();

    let file_size = fs::metadata(&artifact)?.len();

    let started = Instant::now();
    let restored = adapter.read(&artifact)?;
    let read_time = started.elapsed();
    drop(restored);

    Ok(TrialMeasurement {
        write_time,
        read_time,
        file_size,
    })
}

/// Run `config.repeats` trials for each format, in the given order, and
/// collect every raw measurement into a [`ResultSet`].
///
/// Per-trial errors never abort the run: they are recorded as
/// [`TrialFailure`] entries and the remaining trials proceed, so one broken
/// codec still yields every other format's data. Only configuration errors
/// (and failure to set up the working directory) are returned as `Err`.
pub fn run(batch: &RecordBatch, formats: &[Format], config: &BenchConfig) -> BenchResult<ResultSet> {
    let mut seen = HashSet::new();
    for format in formats {
        if !seen.insert(*format) {
            return Err(BenchError::Config(format!(
                "duplicate format '{}' in selection",
                format
            )));
        }
    }
    let adapters: Vec<Box<dyn FormatAdapter>> = formats.iter().map(|f| f.adapter()).collect();
    run_with_adapters(batch, &adapters, config)
}

/// [`run`] over caller-supplied adapters. Useful for benchmarking a custom
/// adapter against the built-in set, and for fault-injection in tests.
pub fn run_with_adapters(
    batch: &RecordBatch,
    adapters: &[Box<dyn FormatAdapter>],
    config: &BenchConfig,
) -> BenchResult<ResultSet> {
    if config.repeats == 0 {
        return Err(BenchError::Config("repeats must be at least 1".into()));
    }
    if adapters.is_empty() {
        return Err(BenchError::Config(
            "no formats selected (check --skip flags)".into(),
        ));
    }

    let work_dir = match &config.work_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            WorkDir::Caller(dir.clone())
        }
        None => WorkDir::Owned(TempDir::new()?),
    };

    let mut results = ResultSet {
        memory_usage_bytes: dataset::memory_footprint(batch),
        records: Vec::new(),
        failures: Vec::new(),
    };

    for adapter in adapters {
        for trial_index in 0..config.repeats {
            match run_trial(adapter.as_ref(), batch, work_dir.path()) {
                Ok(m) => results.records.push(TrialRecord {
                    format: adapter.name().to_string(),
                    trial_index,
                    write_time_secs: m.write_time.as_secs_f64(),
                    read_time_secs: m.read_time.as_secs_f64(),
                    file_size_bytes: m.file_size,
                }),
                Err(e) => {
                    let kind = e.kind();
                    results.failures.push(TrialFailure {
                        format: adapter.name().to_string(),
                        trial_index,
                        kind,
                        message: e.to_string(),
                    });
                    // A missing backend fails every repetition identically;
                    // record it once per adapter and move on.
                    if kind == ErrorKind::Unavailable {
                        break;
                    }
                }
            }
        }
    }

    Ok(results)
}

enum WorkDir {
    Caller(PathBuf),
    Owned(TempDir),
}

impl WorkDir {
    fn path(&self) -> &Path {
        match self {
            WorkDir::Caller(p) => p,
            WorkDir::Owned(t) => t.path(),
        }
    }
}
