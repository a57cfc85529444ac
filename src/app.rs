// src/app.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::auth::CredentialStore;
use crate::config::AppConfig;
use crate::db::Database;
use crate::errors::ServerError;
use crate::pipeline::session::PreparedDataset;
use crate::pipeline::{MapSession, Pipeline};
use crate::source::{source_for, DatasetLoader};

/// Everything a request handler can reach.
pub struct AppState {
    pub db: Database,
    pub loader: Arc<DatasetLoader>,
    pub credentials: CredentialStore,
    pub session_ttl_secs: i64,
    pub map_center: (f64, f64),
    /// Map state per login, keyed by the raw session token.
    maps: Mutex<HashMap<String, MapEntry>>,
}

struct MapEntry {
    map: MapSession,
    last_used: Instant,
}

impl AppState {
    pub fn new(
        db: Database,
        loader: Arc<DatasetLoader>,
        credentials: CredentialStore,
        session_ttl_secs: i64,
        map_center: (f64, f64),
    ) -> Self {
        Self {
            db,
            loader,
            credentials,
            session_ttl_secs,
            map_center,
            maps: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, ServerError> {
        let pipeline = Arc::new(Pipeline::new(cfg.pipeline.clone()));
        let listings = source_for(&cfg.listings_location)?;
        let credentials = source_for(&cfg.credentials_location)?;

        Ok(Self::new(
            Database::new(cfg.db_path.clone()),
            Arc::new(DatasetLoader::new(listings, pipeline)),
            CredentialStore::new(credentials),
            cfg.session_ttl_secs,
            cfg.map_center,
        ))
    }

    /// The installed dataset, or `Unavailable` explaining why there is none.
    pub fn prepared(&self) -> Result<Arc<PreparedDataset>, ServerError> {
        let status = self.loader.status();
        match (status.dataset, status.error) {
            (Some(prepared), _) => Ok(prepared),
            (None, Some(e)) => Err(ServerError::Unavailable(format!(
                "Listings failed to load: {e}"
            ))),
            (None, None) => Err(ServerError::Unavailable(
                "Listings are still loading".into(),
            )),
        }
    }

    /// Runs `f` against this login's map session, creating it on first use
    /// and rebuilding it once a newer dataset has been installed.
    /// Sessions idle for longer than the login lifetime are dropped first.
    pub fn with_map<F, T>(&self, token: &str, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut MapSession) -> Result<T, ServerError>,
    {
        let prepared = self.prepared()?;
        let now = Instant::now();
        self.evict_idle(now);
        let mut maps = self.lock_maps();

        let stale = maps
            .get(token)
            .map_or(true, |e| e.map.generation() != prepared.dataset.generation);
        if stale {
            debug!(generation = prepared.dataset.generation, "map session built");
            let map = MapSession::new(Arc::clone(self.loader.pipeline()), prepared);
            maps.insert(token.to_string(), MapEntry { map, last_used: now });
        }

        match maps.get_mut(token) {
            Some(entry) => {
                entry.last_used = now;
                f(&mut entry.map)
            }
            None => Err(ServerError::InternalError),
        }
    }

    pub fn drop_map(&self, token: &str) {
        self.lock_maps().remove(token);
    }

    /// Drops map sessions unused since `now - session_ttl_secs`. Returns how many went.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let mut maps = self.lock_maps();
        let ttl = Duration::from_secs(u64::try_from(self.session_ttl_secs).unwrap_or(0));
        let before = maps.len();
        maps.retain(|_, e| now.saturating_duration_since(e.last_used) <= ttl);
        let evicted = before - maps.len();
        if evicted > 0 {
            debug!(evicted, remaining = maps.len(), "idle map sessions evicted");
        }
        evicted
    }

    fn lock_maps(&self) -> MutexGuard<'_, HashMap<String, MapEntry>> {
        self.maps
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
