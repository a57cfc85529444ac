// src/source/ingest.rs
use tracing::debug;

use crate::domain::record::{LATITUDE, LONGITUDE};
use crate::domain::Record;
use crate::source::sheet::Table;
use crate::source::SourceError;

/// Rows that survived ingestion, plus how many were dropped.
#[derive(Debug)]
pub struct Ingested {
    pub records: Vec<Record>,
    pub rejected: usize,
}

/// Turns sheet rows into records, dropping any row whose `Latitude` or
/// `Longitude` is blank or not a number. Dropped rows are only counted.
pub fn ingest(table: Table) -> Result<Ingested, SourceError> {
    for required in [LATITUDE, LONGITUDE] {
        if !table.headers.iter().any(|h| h == required) {
            return Err(SourceError::MissingColumn(required.to_string()));
        }
    }

    let Table { headers, rows } = table;
    let mut records = Vec::with_capacity(rows.len());
    let mut rejected = 0;

    for row in rows {
        let record = Record::from_pairs(headers.iter().cloned().zip(row));
        if record.coordinates().is_some() {
            records.push(record);
        } else {
            rejected += 1;
        }
    }

    debug!(kept = records.len(), rejected, "sheet ingested");

    Ok(Ingested {
        records,
        rejected,
    })
}
