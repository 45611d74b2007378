//! CSV bar loading.
//!
//! Expected header: `date,open,high,low,close`. Extra columns such as
//! `volume` are ignored.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use gator_core::domain::{validate_sequence, Bar};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BarRecord {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl From<BarRecord> for Bar {
    fn from(r: BarRecord) -> Self {
        Bar {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
        }
    }
}

/// Parse bars from any CSV reader and check sanity and date ordering.
pub fn read_bars<R: std::io::Read>(reader: R) -> Result<Vec<Bar>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, record) in rdr.deserialize::<BarRecord>().enumerate() {
        let record = record.with_context(|| format!("malformed bar on data row {}", i + 1))?;
        bars.push(Bar::from(record));
    }

    validate_sequence(&bars)?;
    Ok(bars)
}

pub fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open bars file: {}", path.display()))?;
    read_bars(file).with_context(|| format!("failed to load bars from {}", path.display()))
}
