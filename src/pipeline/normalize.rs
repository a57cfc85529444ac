// src/pipeline/normalize.rs

use std::collections::HashMap;

use crate::domain::Record;

/// Repairs merged-cell exports: a blank cell takes the last non-blank value
/// seen in that column above it (or stays `""`). Non-blank cells are trimmed.
pub fn normalize(rows: &[Record]) -> Vec<Record> {
    let mut last_seen: HashMap<&str, &str> = HashMap::new();
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let mut filled = Record::new();
        for (field, value) in row.fields() {
            let value = value.trim();
            if value.is_empty() {
                filled.set(field, last_seen.get(field).copied().unwrap_or(""));
            } else {
                last_seen.insert(field, value);
                filled.set(field, value);
            }
        }
        out.push(filled);
    }

    out
}
