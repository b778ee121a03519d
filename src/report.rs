//! Pretty-print benchmark results with a comparison table, CSV and JSON
//! export. Statistical reduction (min/mean shown in the table) happens here,
//! on the consumer side — the harness itself only hands over raw trials.

use crate::{ErrorKind, ResultSet, SystemInfo, TrialRecord};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;
use std::path::Path;

/// A full run ready for export: collected results plus the machine they came
/// from.
#[derive(Debug, Clone, Serialize)]
pub struct BenchSuite {
    pub system_info: SystemInfo,
    pub results: ResultSet,
}

// ────────────────────────────────────────────────────────────────────────────────
// Terminal output
// ────────────────────────────────────────────────────────────────────────────────

struct FormatSummary {
    format: String,
    trials: usize,
    write_min: f64,
    write_mean: f64,
    read_min: f64,
    read_mean: f64,
    file_size: u64,
}

fn summarize(results: &ResultSet) -> Vec<FormatSummary> {
    results
        .formats()
        .into_iter()
        .filter_map(|format| {
            let records: Vec<&TrialRecord> = results.records_for(&format).collect();
            if records.is_empty() {
                return None;
            }
            let trials = records.len();
            let file_size = records[0].file_size_bytes;
            let writes: Vec<f64> = records.iter().map(|r| r.write_time_secs).collect();
            let reads: Vec<f64> = records.iter().map(|r| r.read_time_secs).collect();
            Some(FormatSummary {
                format,
                trials,
                write_min: min_of(&writes),
                write_mean: mean_of(&writes),
                read_min: min_of(&reads),
                read_mean: mean_of(&reads),
                file_size,
            })
        })
        .collect()
}

/// Print the comparison table plus failure notes for one run.
pub fn print_suite(suite: &BenchSuite) {
    let results = &suite.results;

    println!(
        "  OS: {}  Arch: {}  CPUs: {}  Time: {}",
        suite.system_info.os, suite.system_info.arch, suite.system_info.cpus, suite.system_info.timestamp
    );
    println!(
        "  In-memory dataset: {}",
        format_bytes(results.memory_usage_bytes as u64)
    );

    let summaries = summarize(results);
    if !summaries.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS);
        table.set_header(vec![
            "Format",
            "Trials",
            "Write min (s)",
            "Write mean (s)",
            "Read min (s)",
            "Read mean (s)",
            "File size",
            "vs memory",
        ]);

        // Highlight the fastest round trip and the smallest artifact.
        let best_time = summaries
            .iter()
            .map(|s| s.write_min + s.read_min)
            .fold(f64::INFINITY, f64::min);
        let best_size = summaries.iter().map(|s| s.file_size).min().unwrap_or(0);

        for s in &summaries {
            let is_fastest = (s.write_min + s.read_min - best_time).abs() < f64::EPSILON;
            let name_cell = if is_fastest {
                Cell::new(format!("★ {}", s.format)).fg(Color::Green)
            } else {
                Cell::new(&s.format)
            };
            let size_cell = if s.file_size == best_size {
                Cell::new(format_bytes(s.file_size)).fg(Color::Green)
            } else {
                Cell::new(format_bytes(s.file_size))
            };
            let ratio = s.file_size as f64 / results.memory_usage_bytes.max(1) as f64;

            table.add_row(vec![
                name_cell,
                Cell::new(s.trials),
                Cell::new(format!("{:.4}", s.write_min)),
                Cell::new(format!("{:.4}", s.write_mean)),
                Cell::new(format!("{:.4}", s.read_min)),
                Cell::new(format!("{:.4}", s.read_mean)),
                size_cell,
                Cell::new(format!("{:.2}x", ratio)),
            ]);
        }
        println!("{table}");
    }

    if !results.failures.is_empty() {
        println!("\n{}", "── Failures ──".bold().yellow());
        for f in &results.failures {
            let line = format!(
                "  {} trial {}: [{}] {}",
                f.format, f.trial_index, f.kind, f.message
            );
            match f.kind {
                ErrorKind::Unavailable => println!("{}", line.dimmed()),
                _ => println!("{}", line.yellow()),
            }
        }
    }

    // Storage failures on every format point at the environment, not at any
    // one codec.
    let io_formats = results.io_failure_formats();
    if !io_formats.is_empty() && io_formats.len() == results.formats().len() {
        println!(
            "\n{}",
            "⚠ every format hit I/O errors — the working directory or disk is likely the problem"
                .bold()
                .red()
        );
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// CSV export
// ────────────────────────────────────────────────────────────────────────────────

pub fn export_csv(results: &ResultSet, path: &Path) -> std::io::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "format",
        "trial_index",
        "write_time_secs",
        "read_time_secs",
        "file_size_bytes",
        "memory_usage_bytes",
    ])?;

    for r in &results.records {
        wtr.write_record([
            &r.format,
            &r.trial_index.to_string(),
            &format!("{:.6}", r.write_time_secs),
            &format!("{:.6}", r.read_time_secs),
            &r.file_size_bytes.to_string(),
            &results.memory_usage_bytes.to_string(),
        ])?;
    }

    wtr.flush()?;
    println!("  CSV exported to {}", path.display());
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────────
// JSON export
// ────────────────────────────────────────────────────────────────────────────────

pub fn export_json(suite: &BenchSuite, path: &Path) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(suite).map_err(std::io::Error::other)?;
    std::fs::write(path, json)?;
    println!("  JSON exported to {}", path.display());
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────────
// Formatting helpers
// ────────────────────────────────────────────────────────────────────────────────

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn format_bytes(b: u64) -> String {
    if b >= 1_073_741_824 {
        format!("{:.1} GB", b as f64 / 1_073_741_824.0)
    } else if b >= 1_048_576 {
        format!("{:.1} MB", b as f64 / 1_048_576.0)
    } else if b >= 1_024 {
        format!("{:.1} KB", b as f64 / 1_024.0)
    } else {
        format!("{} B", b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrialFailure;

    fn record(format: &str, trial: usize, write: f64, read: f64, size: u64) -> TrialRecord {
        TrialRecord {
            format: format.into(),
            trial_index: trial,
            write_time_secs: write,
            read_time_secs: read,
            file_size_bytes: size,
        }
    }

    #[test]
    fn summaries_reduce_over_trials() {
        let results = ResultSet {
            memory_usage_bytes: 1_000,
            records: vec![
                record("csv", 0, 0.2, 0.4, 500),
                record("csv", 1, 0.1, 0.6, 500),
            ],
            failures: vec![],
        };
        let summaries = summarize(&results);
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.trials, 2);
        assert!((s.write_min - 0.1).abs() < 1e-12);
        assert!((s.write_mean - 0.15).abs() < 1e-12);
        assert!((s.read_min - 0.4).abs() < 1e-12);
        assert!((s.read_mean - 0.5).abs() < 1e-12);
    }

    #[test]
    fn all_failed_formats_are_skipped_in_summaries() {
        let results = ResultSet {
            memory_usage_bytes: 1_000,
            records: vec![record("csv", 0, 0.2, 0.4, 500)],
            failures: vec![TrialFailure {
                format: "xml".into(),
                trial_index: 0,
                kind: ErrorKind::Serialization,
                message: "boom".into(),
            }],
        };
        let summaries = summarize(&results);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].format, "csv");
    }

    #[test]
    fn byte_formatting_scales() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2_048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1_048_576), "5.0 MB");
    }
}
