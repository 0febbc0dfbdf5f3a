use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::models::CollisionRecord;

/// Canonical name of the merged date/time column.
pub const TIMESTAMP_COLUMN: &str = "crash_datetime";

const REQUIRED_COLUMNS: [&str; 4] = ["crash_date", "crash_time", "latitude", "longitude"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("collision data unavailable at {}: {source}", path.display())]
    DataUnavailable { path: PathBuf, source: csv::Error },
    #[error("collision data is missing required column '{0}'")]
    MissingColumn(&'static str),
}

#[derive(Debug, Deserialize)]
struct RawCollisionRow {
    #[serde(default)]
    crash_date: String,
    #[serde(default)]
    crash_time: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    injured_persons: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    injured_pedestrians: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    injured_cyclists: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    injured_motorists: Option<u32>,
    #[serde(default)]
    on_street_name: Option<String>,
}

// Integral floats such as `2.0` count; anything else reads as absent.
fn lenient_count<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = csv::invalid_option(de)?;
    Ok(value
        .filter(|count| count.is_finite() && count.fract() == 0.0)
        .filter(|count| (0.0..=u32::MAX as f64).contains(count))
        .map(|count| count as u32))
}

impl RawCollisionRow {
    fn into_record(self) -> Option<CollisionRecord> {
        let crash_datetime = format!("{} {}", self.crash_date, self.crash_time);
        let latitude = self.latitude.filter(|value| value.is_finite())?;
        let longitude = self.longitude.filter(|value| value.is_finite())?;

        Some(CollisionRecord {
            crash_datetime,
            latitude,
            longitude,
            injured_persons: self.injured_persons.unwrap_or(0),
            injured_pedestrians: self.injured_pedestrians.unwrap_or(0),
            injured_cyclists: self.injured_cyclists.unwrap_or(0),
            injured_motorists: self.injured_motorists.unwrap_or(0),
            on_street_name: self.on_street_name.filter(|name| !name.is_empty()),
        })
    }
}

/// Reads at most `max_rows` data rows from the CSV at `path`.
///
/// Rows without usable coordinates are dropped, rows that cannot be decoded
/// at all are skipped with a warning. Column names are matched in lowercase.
pub fn load_collisions(
    path: impl AsRef<Path>,
    max_rows: usize,
) -> Result<Vec<CollisionRecord>, LoadError> {
    let path = path.as_ref();
    let unavailable = |source: csv::Error| LoadError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(unavailable)?;
    let headers = lowercase_headers(reader.headers().map_err(unavailable)?);

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let mut records = Vec::new();
    let mut rows_read = 0usize;

    for (index, result) in reader.records().take(max_rows).enumerate() {
        rows_read += 1;
        let row = match result.and_then(|raw| raw.deserialize::<RawCollisionRow>(Some(&headers))) {
            Ok(row) => row,
            Err(err) => {
                log::warn!("skipping row {} of {}: {err}", index + 1, path.display());
                continue;
            }
        };

        if let Some(record) = row.into_record() {
            records.push(record);
        }
    }

    log::info!(
        "loaded {} of {} rows from {} ({} dropped without coordinates)",
        records.len(),
        rows_read,
        path.display(),
        rows_read - records.len()
    );

    Ok(records)
}

fn lowercase_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .map(str::to_lowercase)
        .collect()
}
