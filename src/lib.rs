//! Shared types for tabbench: error taxonomy, the format adapter contract,
//! and the result model collected by the harness.

pub mod adapters;
pub mod dataset;
pub mod harness;
pub mod report;

use arrow::record_batch::RecordBatch;
use serde::Serialize;
use std::path::Path;

// ────────────────────────────────────────────────────────────────────────────────
// Error type
// ────────────────────────────────────────────────────────────────────────────────

pub type BenchResult<T> = std::result::Result<T, BenchError>;

#[derive(Debug)]
pub enum BenchError {
    /// The format's backend cannot be used in this build or environment,
    /// e.g. an optional codec compiled out.
    Unavailable(String),
    /// The adapter rejected the dataset's content, or an artifact could not
    /// be decoded.
    Serialization(String),
    /// Underlying storage failure during write, read or size measurement.
    Io(std::io::Error),
    /// Invalid benchmark configuration (unknown format name, zero repeats).
    Config(String),
}

impl std::fmt::Display for BenchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchError::Unavailable(s) => write!(f, "backend unavailable: {}", s),
            BenchError::Serialization(s) => write!(f, "serialization error: {}", s),
            BenchError::Io(e) => write!(f, "IO error: {}", e),
            BenchError::Config(s) => write!(f, "config error: {}", s),
        }
    }
}

impl std::error::Error for BenchError {}

impl From<std::io::Error> for BenchError {
    fn from(e: std::io::Error) -> Self {
        BenchError::Io(e)
    }
}

impl BenchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BenchError::Unavailable(_) => ErrorKind::Unavailable,
            BenchError::Serialization(_) => ErrorKind::Serialization,
            BenchError::Io(_) => ErrorKind::Io,
            BenchError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Coarse error classification recorded with each trial failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Unavailable,
    Serialization,
    Io,
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Unavailable => write!(f, "unavailable"),
            ErrorKind::Serialization => write!(f, "serialization"),
            ErrorKind::Io => write!(f, "io"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// FormatAdapter trait — every format backend implements this
// ────────────────────────────────────────────────────────────────────────────────

/// Write/read contract for one serialization format.
///
/// Adapters are stateless and reusable across trials. `write` must flush all
/// userspace buffers before returning, so that a subsequent `read` of the
/// same path by the same adapter reconstructs an equivalent batch (same
/// column names, same row count, values equal up to the format's documented
/// fidelity limits) and so that the artifact's size on disk is final when
/// the harness measures it.
pub trait FormatAdapter {
    fn name(&self) -> &'static str;

    /// File extension for the temporary artifact, without the dot.
    fn extension(&self) -> &'static str;

    fn write(&self, batch: &RecordBatch, path: &Path) -> BenchResult<()>;

    fn read(&self, path: &Path) -> BenchResult<RecordBatch>;
}

// ────────────────────────────────────────────────────────────────────────────────
// Result model
// ────────────────────────────────────────────────────────────────────────────────

/// One timed write + read + size measurement for one format.
#[derive(Debug, Clone, Serialize)]
pub struct TrialRecord {
    pub format: String,
    pub trial_index: usize,
    pub write_time_secs: f64,
    pub read_time_secs: f64,
    pub file_size_bytes: u64,
}

/// A trial that did not produce a measurement.
#[derive(Debug, Clone, Serialize)]
pub struct TrialFailure {
    pub format: String,
    pub trial_index: usize,
    pub kind: ErrorKind,
    pub message: String,
}

/// Everything a benchmark run collects: the in-memory baseline, every
/// successful trial in (format order × trial order), and every recorded
/// failure. Append-only while the controller owns it, read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet {
    pub memory_usage_bytes: usize,
    pub records: Vec<TrialRecord>,
    pub failures: Vec<TrialFailure>,
}

impl ResultSet {
    pub fn records_for<'a>(&'a self, format: &'a str) -> impl Iterator<Item = &'a TrialRecord> {
        self.records.iter().filter(move |r| r.format == format)
    }

    /// Distinct format names touched by the run, in first-seen order.
    pub fn formats(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for name in self
            .records
            .iter()
            .map(|r| r.format.as_str())
            .chain(self.failures.iter().map(|f| f.format.as_str()))
        {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        }
        out
    }

    /// Formats that hit at least one storage-level failure. When this covers
    /// every format in the run, the environment (not a codec) is the likely
    /// culprit and callers should surface that prominently.
    pub fn io_failure_formats(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for f in self.failures.iter().filter(|f| f.kind == ErrorKind::Io) {
            if !out.iter().any(|n| n == &f.format) {
                out.push(f.format.clone());
            }
        }
        out
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// System info
// ────────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpus: usize,
    pub timestamp: String,
}

impl SystemInfo {
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpus: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
            timestamp: epoch_timestamp(),
        }
    }
}

fn epoch_timestamp() -> String {
    // epoch-seconds stamp, avoids a chrono dependency
    let d = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}s-since-epoch", d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_match_variants() {
        assert_eq!(
            BenchError::Unavailable("x".into()).kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(
            BenchError::Serialization("x".into()).kind(),
            ErrorKind::Serialization
        );
        assert_eq!(
            BenchError::Io(std::io::Error::other("x")).kind(),
            ErrorKind::Io
        );
        assert_eq!(BenchError::Config("x".into()).kind(), ErrorKind::Config);
    }

    #[test]
    fn io_failure_formats_deduplicates() {
        let results = ResultSet {
            memory_usage_bytes: 0,
            records: vec![],
            failures: vec![
                TrialFailure {
                    format: "csv".into(),
                    trial_index: 0,
                    kind: ErrorKind::Io,
                    message: "disk full".into(),
                },
                TrialFailure {
                    format: "csv".into(),
                    trial_index: 1,
                    kind: ErrorKind::Io,
                    message: "disk full".into(),
                },
                TrialFailure {
                    format: "xml".into(),
                    trial_index: 0,
                    kind: ErrorKind::Serialization,
                    message: "bad column".into(),
                },
            ],
        };
        assert_eq!(results.io_failure_formats(), vec!["csv".to_string()]);
        assert_eq!(results.formats(), vec!["csv".to_string(), "xml".to_string()]);
    }
}
