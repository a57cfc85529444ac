// src/domain/dataset.rs

use std::sync::Arc;

use crate::domain::record::Record;

/// One immutable load of the listing sheet, already normalized. Records are
/// shared with every group built from them.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Loader generation that produced this dataset.
    pub generation: u64,
    pub records: Vec<Arc<Record>>,
    /// Rows dropped at ingestion for missing or unparseable coordinates.
    pub rejected: usize,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
