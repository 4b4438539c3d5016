use crate::data::bar::Bar;
use crate::data::series::Series;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "datetime", alias = "date")]
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default)]
    symbol: Option<String>,
}

//accepts rfc3339, "yyyy-mm-dd hh:mm:ss" and plain dates
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

//loads bars from a csv file
//rows for other symbols are skipped when the file carries a symbol column
pub fn load_csv<P: AsRef<Path>>(path: P, symbol: &str) -> Result<Series> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut bars = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        if let Some(row_symbol) = &record.symbol {
            if row_symbol != symbol {
                continue;
            }
        }

        let timestamp = parse_timestamp(&record.timestamp).with_context(|| {
            format!(
                "Failed to parse timestamp '{}' at line {}",
                record.timestamp,
                index + 2
            )
        })?;

        let volume = record.volume.unwrap_or(0.0).max(0.0).round() as u64;

        let bar = Bar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            volume,
        )
        .context(format!("Invalid bar at line {}", index + 2))?;

        bars.push(bar);
    }

    //providers often deliver newest first
    bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    tracing::debug!(symbol, bars = bars.len(), path = ?path, "loaded csv");

    Series::new(symbol, bars).context(format!("Invalid series in {:?}", path))
}
