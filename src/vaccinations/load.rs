use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::error::PipelineError;

use super::record::{Record, VaccinationTable};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One CSV row exactly as it appears in the source table.
#[derive(Clone, Debug, Deserialize)]
pub struct RawRecord {
    pub location: String,
    pub date: String,
    pub vaccine: String,
    pub total_vaccinations: String,
}

pub fn read_raw_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, PipelineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in csv_reader.deserialize::<RawRecord>() {
        rows.push(row?);
    }
    Ok(rows)
}

pub fn parse_records(
    rows: impl IntoIterator<Item = RawRecord>,
) -> Result<Vec<Record>, PipelineError> {
    rows.into_iter()
        .enumerate()
        .map(|(row, raw)| parse_record(row, raw))
        .collect()
}

fn parse_record(row: usize, raw: RawRecord) -> Result<Record, PipelineError> {
    let date = NaiveDate::parse_from_str(&raw.date, DATE_FORMAT).map_err(|_| {
        PipelineError::DataFormat {
            row,
            field: "date",
            value: raw.date.clone(),
        }
    })?;

    let total_vaccinations =
        parse_total(&raw.total_vaccinations).ok_or_else(|| PipelineError::DataFormat {
            row,
            field: "total_vaccinations",
            value: raw.total_vaccinations.clone(),
        })?;

    Ok(Record {
        location: raw.location,
        date,
        vaccine: raw.vaccine,
        total_vaccinations,
    })
}

fn parse_total(value: &str) -> Option<u64> {
    if let Ok(total) = value.parse::<u64>() {
        return Some(total);
    }

    let total = value.parse::<f64>().ok()?;
    if total.is_finite() && total >= 0.0 && total <= u64::MAX as f64 {
        Some(total.round() as u64)
    } else {
        None
    }
}

pub fn load_table(path: &Path) -> Result<VaccinationTable, PipelineError> {
    let file = File::open(path)?;
    let rows = read_raw_records(file)?;
    let records = parse_records(rows)?;
    let table = VaccinationTable::new(records);
    debug!(
        path = %path.display(),
        records = table.records.len(),
        locations = table.locations.len(),
        vaccines = table.vaccines.len(),
        "loaded vaccination table"
    );
    Ok(table)
}
