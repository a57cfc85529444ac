// src/domain/record.rs

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";
pub const POSSESSION: &str = "Possession";
pub const PROJECT_NAME: &str = "Project Name";
pub const DEFAULT_PRICE_COLUMN: &str = "Price (₹)";

/// One row of the listing sheet: field name -> cell text, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.set(k, v);
        }
        record
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrites an existing field in place, otherwise appends it.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Raw (untrimmed, unparsed) coordinate strings.
    pub fn raw_coordinates(&self) -> Option<(&str, &str)> {
        Some((self.get(LATITUDE)?, self.get(LONGITUDE)?))
    }

    /// Parsed coordinates; `None` if either is missing, blank or not a finite number.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let (lat, lng) = self.raw_coordinates()?;
        Some((parse_coordinate(lat)?, parse_coordinate(lng)?))
    }

    /// Every field except the two position fields, for detail rendering.
    pub fn detail_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields()
            .filter(|(k, _)| *k != LATITUDE && *k != LONGITUDE)
    }
}

pub fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
