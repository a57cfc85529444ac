// src/pipeline/session.rs

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{Dataset, PriceRange};
use crate::pipeline::facets::{FacetError, FacetSet};
use crate::pipeline::grouping::Group;
use crate::pipeline::Pipeline;

/// A dataset with its once-per-load derived state.
#[derive(Debug)]
pub struct PreparedDataset {
    pub dataset: Dataset,
    /// Facet template; every session starts from a copy.
    pub facets: FacetSet,
    pub price_range: PriceRange,
}

impl Pipeline {
    pub fn prepare(&self, dataset: Dataset) -> PreparedDataset {
        let facets = self.extract_facets(&dataset.records);
        let price_range = self.initial_price_range(&dataset.records);
        PreparedDataset {
            dataset,
            facets,
            price_range,
        }
    }
}

/// Output of one `apply`; replaced wholesale, never patched.
#[derive(Debug)]
pub struct AppliedView {
    pub version: u64,
    pub filtered: usize,
    pub groups: Vec<Group>,
}

/// One user's map: draft filters plus the last applied groups.
/// Edits to the draft are invisible until `apply`.
pub struct MapSession {
    pipeline: Arc<Pipeline>,
    prepared: Arc<PreparedDataset>,
    facets: FacetSet,
    price_range: PriceRange,
    cutoff: Option<NaiveDate>,
    applied: Arc<AppliedView>,
}

impl MapSession {
    /// Starts with unconstrained facets and the observed price range, and
    /// applies once so the map is populated on first view.
    pub fn new(pipeline: Arc<Pipeline>, prepared: Arc<PreparedDataset>) -> Self {
        let facets = prepared.facets.clone();
        let price_range = prepared.price_range;
        let mut session = Self {
            pipeline,
            prepared,
            facets,
            price_range,
            cutoff: None,
            applied: Arc::new(AppliedView {
                version: 0,
                filtered: 0,
                groups: Vec::new(),
            }),
        };
        session.apply();
        session
    }

    pub fn generation(&self) -> u64 {
        self.prepared.dataset.generation
    }

    pub fn dataset(&self) -> &Dataset {
        &self.prepared.dataset
    }

    pub fn facets(&self) -> &FacetSet {
        &self.facets
    }

    pub fn price_range(&self) -> PriceRange {
        self.price_range
    }

    pub fn date_cutoff(&self) -> Option<NaiveDate> {
        self.cutoff
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn applied(&self) -> Arc<AppliedView> {
        Arc::clone(&self.applied)
    }

    pub fn toggle_option(&mut self, field: &str, option: &str) -> Result<(), FacetError> {
        self.facets.toggle_option(field, option)
    }

    pub fn select_all(&mut self, field: &str) -> Result<(), FacetError> {
        self.facets.select_all(field)
    }

    pub fn clear_all(&mut self, field: &str) -> Result<(), FacetError> {
        self.facets.clear_all(field)
    }

    pub fn set_selected(&mut self, field: &str, option: Option<&str>) -> Result<(), FacetError> {
        self.facets.set_selected(field, option)
    }

    pub fn set_price_bounds(&mut self, lo: f64, hi: f64) {
        self.price_range = PriceRange::new(lo, hi);
    }

    pub fn set_date_cutoff(&mut self, cutoff: Option<NaiveDate>) {
        self.cutoff = cutoff;
    }

    /// The only transition that changes what the map shows.
    pub fn apply(&mut self) -> Arc<AppliedView> {
        let records = &self.prepared.dataset.records;
        let filtered = self
            .pipeline
            .filter(records, &self.facets, &self.price_range, self.cutoff);
        let groups = self.pipeline.group(&filtered);

        let view = Arc::new(AppliedView {
            version: self.applied.version + 1,
            filtered: filtered.len(),
            groups,
        });

        info!(
            version = view.version,
            filtered = view.filtered,
            groups = view.groups.len(),
            "filters applied"
        );

        self.applied = Arc::clone(&view);
        view
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.applied.groups.get(index)
    }
}
