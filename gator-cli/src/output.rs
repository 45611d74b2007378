//! Report writers: JSON lines or flat CSV.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use gator_core::engine::{BarReport, ReportRow};
use gator_core::fingerprint::RunSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per bar with full diagnostics.
    #[default]
    Jsonl,
    /// Flat table, one row per bar.
    Csv,
}

pub fn write_reports<W: Write>(
    writer: W,
    reports: &[BarReport],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Jsonl => write_jsonl(writer, reports),
        OutputFormat::Csv => write_csv(writer, reports),
    }
}

fn write_jsonl<W: Write>(mut writer: W, reports: &[BarReport]) -> Result<()> {
    for report in reports {
        serde_json::to_writer(&mut writer, report).context("failed to serialize bar report")?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn write_csv<W: Write>(writer: W, reports: &[BarReport]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for report in reports {
        wtr.serialize(ReportRow::from(report))?;
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

/// Write to `path` when given, stdout otherwise.
pub fn emit(path: Option<&Path>, reports: &[BarReport], format: OutputFormat) -> Result<()> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create output file: {}", path.display()))?;
            write_reports(std::io::BufWriter::new(file), reports, format)
        }
        None => {
            let stdout = std::io::stdout();
            write_reports(stdout.lock(), reports, format)
        }
    }
}

pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "Bars:            {}\n\
         Buys:            {}\n\
         Sells:           {}\n\
         Config hash:     {}\n\
         Decision digest: {}",
        summary.bars, summary.buys, summary.sells, summary.config_hash, summary.decision_digest
    )
}
