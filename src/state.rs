//! Durable deduplication state
//!
//! Tracks which record identifiers have already been converted to events
//! and the last-observed snapshot fingerprint, so repeated collection
//! cycles (and process restarts) emit each underlying record exactly once.
//! The identifier set is bounded: past the cap, the oldest-inserted entries
//! are evicted first — insertion order is the only ordering signal the
//! identifiers carry.
//!
//! Loading never fails: a missing or corrupt state file yields an empty
//! state, which at worst re-emits previously seen records once. Saving is
//! best-effort for the same reason.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default cap on tracked record identifiers.
pub const DEFAULT_MAX_TRACKED_RECORDS: usize = 10_000;

/// On-disk format: `{processed_uuids, last_stats_hash, last_updated}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    processed_uuids: Vec<String>,
    #[serde(default)]
    last_stats_hash: Option<String>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

pub struct StateStore {
    path: PathBuf,
    max_tracked: usize,
    // Insertion-ordered list plus a lookup set; eviction is pure insertion
    // order, not LRU.
    order: VecDeque<String>,
    index: HashSet<String>,
    last_stats_hash: Option<String>,
}

impl StateStore {
    /// Load persisted state from `path`. Any failure yields an empty store.
    pub fn load(path: impl Into<PathBuf>, max_tracked: usize) -> Self {
        let path = path.into();
        let mut store = Self {
            path,
            max_tracked,
            order: VecDeque::new(),
            index: HashSet::new(),
            last_stats_hash: None,
        };

        if !store.path.exists() {
            debug!(path = %store.path.display(), "no state file, starting empty");
            return store;
        }

        match Self::read_persisted(&store.path) {
            Ok(persisted) => {
                for uuid in persisted.processed_uuids {
                    store.insert(uuid);
                }
                store.last_stats_hash = persisted.last_stats_hash;
                debug!(
                    path = %store.path.display(),
                    processed_count = store.order.len(),
                    "loaded state"
                );
            }
            Err(e) => {
                warn!(
                    path = %store.path.display(),
                    error = %e,
                    "failed to load state, starting empty"
                );
            }
        }
        store
    }

    fn read_persisted(path: &Path) -> Result<PersistedState> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.index.contains(uuid)
    }

    /// Record an identifier as emitted, evicting the oldest-inserted
    /// entries once the cap is exceeded.
    pub fn mark_seen(&mut self, uuid: &str) {
        self.insert(uuid.to_string());
    }

    fn insert(&mut self, uuid: String) {
        if !self.index.insert(uuid.clone()) {
            return;
        }
        self.order.push_back(uuid);
        while self.order.len() > self.max_tracked {
            if let Some(evicted) = self.order.pop_front() {
                self.index.remove(&evicted);
            }
        }
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.last_stats_hash.as_deref()
    }

    pub fn set_fingerprint(&mut self, fingerprint: String) {
        self.last_stats_hash = Some(fingerprint);
    }

    pub fn tracked_count(&self) -> usize {
        self.order.len()
    }

    /// Persist the current state. Failure is logged, not propagated: the
    /// next cycle simply redoes dedup lookups against stale state, which is
    /// safe at the identifier level.
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            warn!(path = %self.path.display(), error = %e, "failed to save state");
        }
    }

    fn try_save(&self) -> Result<()> {
        let recent_start = self.order.len().saturating_sub(self.max_tracked);
        let persisted = PersistedState {
            processed_uuids: self.order.iter().skip(recent_start).cloned().collect(),
            last_stats_hash: self.last_stats_hash.clone(),
            last_updated: Some(Utc::now()),
        };
        let content = serde_json::to_string(&persisted).context("Failed to serialize state")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))
    }
}
