// src/source/loader.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{error, info, warn};

use crate::domain::Dataset;
use crate::pipeline::session::PreparedDataset;
use crate::pipeline::Pipeline;
use crate::source::ingest::ingest;
use crate::source::{SourceError, TableSource};

/// What the map can currently show.
#[derive(Clone, Default)]
pub struct LoadStatus {
    /// Last successfully installed dataset; kept across failed reloads.
    pub dataset: Option<Arc<PreparedDataset>>,
    /// Message of the most recent failed load, cleared by the next success.
    pub error: Option<String>,
    /// Generation of a load that has started but not finished.
    pub in_flight: Option<u64>,
}

/// Loads the listing sheet in the background. Every load is tagged with a
/// generation; a completion whose generation is no longer current is dropped.
pub struct DatasetLoader {
    source: Box<dyn TableSource>,
    pipeline: Arc<Pipeline>,
    generation: AtomicU64,
    status: RwLock<LoadStatus>,
}

impl DatasetLoader {
    pub fn new(source: Box<dyn TableSource>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            source,
            pipeline,
            generation: AtomicU64::new(0),
            status: RwLock::new(LoadStatus::default()),
        }
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    pub fn status(&self) -> LoadStatus {
        self.status
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Starts a new generation, superseding any load still in flight.
    pub fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.status
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .in_flight = Some(generation);
        info!(generation, source = %self.source.describe(), "dataset load started");
        generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Fetch, parse, ingest, normalize and prepare. Touches no shared state.
    pub fn fetch(&self, generation: u64) -> Result<PreparedDataset, SourceError> {
        let table = self.source.fetch_table()?;
        let ingested = ingest(table)?;
        let records = self
            .pipeline
            .normalize(&ingested.records)
            .into_iter()
            .map(Arc::new)
            .collect();

        Ok(self.pipeline.prepare(Dataset {
            generation,
            records,
            rejected: ingested.rejected,
        }))
    }

    /// Installs the outcome of `generation`. Returns `false`, changing
    /// nothing, if a newer load has started since.
    pub fn complete(
        &self,
        generation: u64,
        result: Result<PreparedDataset, SourceError>,
    ) -> bool {
        let mut status = self
            .status
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Checked under the write lock so a concurrent `begin` cannot slip in between.
        if !self.is_current(generation) {
            warn!(
                generation,
                current = self.generation.load(Ordering::SeqCst),
                "stale dataset load discarded"
            );
            return false;
        }

        status.in_flight = None;
        match result {
            Ok(prepared) => {
                info!(
                    generation,
                    records = prepared.dataset.len(),
                    rejected = prepared.dataset.rejected,
                    facets = prepared.facets.len(),
                    "dataset installed"
                );
                status.dataset = Some(Arc::new(prepared));
                status.error = None;
            }
            Err(e) => {
                error!(generation, error = %e, "dataset load failed");
                status.error = Some(e.to_string());
            }
        }
        true
    }

    /// Loads on the calling thread.
    pub fn load_blocking(&self) -> bool {
        let generation = self.begin();
        let result = self.fetch(generation);
        self.complete(generation, result)
    }

    /// Loads on a background thread and returns its generation immediately.
    pub fn reload(self: &Arc<Self>) -> u64 {
        let generation = self.begin();
        let loader = Arc::clone(self);
        std::thread::spawn(move || {
            let result = loader.fetch(generation);
            loader.complete(generation, result);
        });
        generation
    }
}
