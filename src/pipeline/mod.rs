// src/pipeline/mod.rs
//
// normalize -> extract facets (once per load) -> filter + group (per apply)

pub mod facets;
pub mod filter;
pub mod grouping;
pub mod normalize;
pub mod session;

use std::borrow::Borrow;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::record::{
    DEFAULT_PRICE_COLUMN, LATITUDE, LONGITUDE, POSSESSION, PROJECT_NAME,
};
use crate::domain::{Price, PriceGrammar, PriceRange, Record};

pub use facets::{FacetDefinition, FacetError, FacetMode, FacetSet, Selection};
pub use grouping::Group;
pub use session::{AppliedView, MapSession};

/// Whether the possession-date axis takes part in filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCutoff {
    Disabled,
    Enabled,
}

/// Resolved once per deployment; the engine never branches on anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub facet_mode: FacetMode,
    pub price_grammar: PriceGrammar,
    pub date_cutoff: DateCutoff,
    /// Multiplier applied to the observed max price when initializing bounds.
    pub price_margin: Option<f64>,
    pub price_column: String,
    /// Extra fields kept out of the facet set besides position and price.
    pub extra_reserved: Vec<String>,
}

impl PipelineConfig {
    /// The original map: multi-select facets, scalar prices, no date axis.
    pub fn basic() -> Self {
        Self {
            facet_mode: FacetMode::Multi,
            price_grammar: PriceGrammar::Scalar,
            date_cutoff: DateCutoff::Disabled,
            price_margin: None,
            price_column: DEFAULT_PRICE_COLUMN.to_string(),
            extra_reserved: Vec::new(),
        }
    }

    /// Range prices, possession cutoff, 10% headroom on the max price.
    pub fn extended() -> Self {
        Self {
            facet_mode: FacetMode::Multi,
            price_grammar: PriceGrammar::RangeCapable,
            date_cutoff: DateCutoff::Enabled,
            price_margin: Some(1.1),
            price_column: DEFAULT_PRICE_COLUMN.to_string(),
            extra_reserved: vec![PROJECT_NAME.to_string()],
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::basic()
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    cfg: PipelineConfig,
    reserved: Vec<String>,
}

impl Pipeline {
    pub fn new(cfg: PipelineConfig) -> Self {
        let mut reserved = vec![
            LATITUDE.to_string(),
            LONGITUDE.to_string(),
            cfg.price_column.clone(),
        ];
        for field in &cfg.extra_reserved {
            if !reserved.contains(field) {
                reserved.push(field.clone());
            }
        }
        Self { cfg, reserved }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    pub fn is_reserved(&self, field: &str) -> bool {
        self.reserved.iter().any(|r| r == field)
    }

    pub fn normalize(&self, rows: &[Record]) -> Vec<Record> {
        normalize::normalize(rows)
    }

    pub fn extract_facets<R: Borrow<Record>>(&self, rows: &[R]) -> FacetSet {
        facets::extract_facets(rows, self.cfg.facet_mode, |f| self.is_reserved(f))
    }

    pub fn price_of(&self, record: &Record) -> Option<Price> {
        record
            .get(&self.cfg.price_column)
            .and_then(|raw| Price::parse(raw, self.cfg.price_grammar))
    }

    /// Draft bounds for a fresh dataset.
    pub fn initial_price_range<R: Borrow<Record>>(&self, rows: &[R]) -> PriceRange {
        let observed =
            PriceRange::observed(rows.iter().filter_map(|r| self.price_of(r.borrow())));
        match self.cfg.price_margin {
            Some(m) => observed.with_margin(m),
            None => observed,
        }
    }

    pub fn filter<'a, R: Borrow<Record>>(
        &self,
        rows: &'a [R],
        facets: &FacetSet,
        price_range: &PriceRange,
        cutoff: Option<NaiveDate>,
    ) -> Vec<&'a R> {
        let cutoff = match self.cfg.date_cutoff {
            DateCutoff::Enabled => cutoff,
            DateCutoff::Disabled => None,
        };
        filter::filter(rows, facets, price_range, cutoff, |r| self.price_of(r), POSSESSION)
    }

    pub fn group(&self, rows: &[&Arc<Record>]) -> Vec<Group> {
        grouping::group(rows.iter().copied())
    }
}
