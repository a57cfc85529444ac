// src/pipeline/grouping.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::domain::record::parse_coordinate;
use crate::domain::Record;

/// Exact raw `Latitude`/`Longitude` strings. Two listings share a pin iff
/// these match byte for byte; numeric rounding never merges or splits pins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateKey {
    lat: String,
    lng: String,
}

impl CoordinateKey {
    pub fn of(record: &Record) -> Option<Self> {
        let (lat, lng) = record.raw_coordinates()?;
        Some(Self {
            lat: lat.to_string(),
            lng: lng.to_string(),
        })
    }
}

// `_` never appears in a parseable coordinate, so the joined form is unambiguous.
impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.lat, self.lng)
    }
}

impl Serialize for CoordinateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub key: CoordinateKey,
    pub lat: f64,
    pub lng: f64,
    /// Never empty. Shared with the dataset, not copied.
    pub members: Vec<Arc<Record>>,
}

/// Buckets listings by coordinate key, groups in first-encountered order.
/// Listings whose coordinates do not parse cannot be placed and are skipped;
/// ingestion already drops them.
pub fn group<'a, I>(rows: I) -> Vec<Group>
where
    I: IntoIterator<Item = &'a Arc<Record>>,
{
    let mut index: HashMap<CoordinateKey, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for record in rows {
        let Some(key) = CoordinateKey::of(record) else {
            tracing::debug!("listing without coordinates reached grouping, skipped");
            continue;
        };

        if let Some(&i) = index.get(&key) {
            groups[i].members.push(Arc::clone(record));
            continue;
        }

        let (Some(lat), Some(lng)) = (parse_coordinate(&key.lat), parse_coordinate(&key.lng))
        else {
            tracing::debug!(%key, "unparseable coordinates reached grouping, skipped");
            continue;
        };

        index.insert(key.clone(), groups.len());
        groups.push(Group {
            key,
            lat,
            lng,
            members: vec![Arc::clone(record)],
        });
    }

    groups
}
