//! Collection facade
//!
//! The [`Collector`] trait is the upstream contract every telemetry source
//! implements: a configuration predicate, an async `collect()` returning
//! the cycle's batch of normalized events, and a cleanup hook. HTTP polling
//! collectors and CLI scrapers plug into the same surface; this module
//! ships the local log ingestion engine, [`ClaudeCodeCollector`].
//!
//! `collect` takes `&mut self`, so two cycles can never run concurrently
//! against one collector's state file; exclusive ownership is the locking
//! model.

use crate::config::get_config;
use crate::events::UsageEvent;
use crate::pricing::PricingTable;
use crate::records::StatsCache;
use crate::scanner::SessionScanner;
use crate::snapshot::SnapshotReader;
use crate::state::StateStore;
use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait Collector {
    fn name(&self) -> &'static str;

    /// Whether the source this collector reads from is present at all.
    /// An unconfigured collector is skipped, not failed.
    fn is_configured(&self) -> bool;

    /// Run one collection cycle, returning every newly discovered event.
    fn collect(&mut self) -> impl std::future::Future<Output = Result<Vec<UsageEvent>>> + Send;

    /// Cleanup hook invoked at shutdown.
    fn close(&mut self) {}
}

/// Ingests Claude Code's locally accumulating usage files: the
/// `stats-cache.json` aggregate snapshot and the per-session logs under
/// `projects/`.
pub struct ClaudeCodeCollector {
    claude_dir: PathBuf,
    stats_cache_path: PathBuf,
    projects_dir: PathBuf,
    snapshot: SnapshotReader,
    scanner: SessionScanner,
    state: StateStore,
    pricing: PricingTable,
}

impl ClaudeCodeCollector {
    /// Build from the global configuration.
    pub fn new() -> Self {
        let config = get_config();
        Self::with_paths(
            config.paths.claude_home.clone(),
            config.paths.state_file.clone(),
            config.dedup.max_tracked_records,
        )
    }

    /// Build against explicit paths; state is loaded here, once.
    pub fn with_paths(claude_dir: PathBuf, state_file: PathBuf, max_tracked: usize) -> Self {
        let stats_cache_path = claude_dir.join("stats-cache.json");
        let projects_dir = claude_dir.join("projects");
        Self {
            snapshot: SnapshotReader::new(&stats_cache_path),
            scanner: SessionScanner::new(&projects_dir),
            state: StateStore::load(state_file, max_tracked),
            pricing: PricingTable::anthropic(),
            claude_dir,
            stats_cache_path,
            projects_dir,
        }
    }

    /// Diagnostic snapshot of what this collector can see, for dashboards
    /// and the `status` command.
    pub fn summary(&self) -> CollectorSummary {
        let mut summary = CollectorSummary {
            configured: self.is_configured(),
            stats_cache_exists: self.stats_cache_path.exists(),
            projects_dir_exists: self.projects_dir.exists(),
            processed_record_count: self.state.tracked_count(),
            total_sessions: None,
            total_messages: None,
            first_session_date: None,
            models_used: Vec::new(),
        };

        if let Some(stats) = read_stats(&self.stats_cache_path) {
            summary.total_sessions = Some(stats.total_sessions);
            summary.total_messages = Some(stats.total_messages);
            summary.first_session_date = stats.first_session_date;
            summary.models_used = stats.model_usage.keys().cloned().collect();
        }

        summary
    }
}

impl Default for ClaudeCodeCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for ClaudeCodeCollector {
    fn name(&self) -> &'static str {
        "claude-code"
    }

    fn is_configured(&self) -> bool {
        self.claude_dir.exists()
    }

    /// One cycle: aggregate snapshot first, then session logs, then a
    /// best-effort state flush. Only a failure to read the projects root
    /// propagates; everything below that is per-file recovery. If the
    /// process dies before the flush, the next cycle re-emits at most this
    /// cycle's events — the sink contract is at-least-once.
    async fn collect(&mut self) -> Result<Vec<UsageEvent>> {
        if !self.is_configured() {
            debug!(path = %self.claude_dir.display(), "claude directory not found");
            return Ok(Vec::new());
        }

        let mut events = self.snapshot.collect(&mut self.state, &self.pricing);
        events.extend(self.scanner.collect(&mut self.state, &self.pricing)?);

        self.state.save();
        Ok(events)
    }
}

fn read_stats(path: &Path) -> Option<StatsCache> {
    let content = fs::read(path).ok()?;
    serde_json::from_slice(&content).ok()
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectorSummary {
    pub configured: bool,
    pub stats_cache_exists: bool,
    pub projects_dir_exists: bool,
    pub processed_record_count: usize,
    pub total_sessions: Option<u64>,
    pub total_messages: Option<u64>,
    pub first_session_date: Option<String>,
    pub models_used: Vec<String>,
}
