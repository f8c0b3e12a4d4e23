//! Session log scanner
//!
//! Discovers every `*.jsonl` session log under the projects root and reads
//! each one line by line, emitting one event per eligible record whose
//! identifier has not been seen before. The identifier check happens before
//! any field extraction, so steady-state scans stay cheap as historical log
//! volume grows: only newly appended lines produce work.
//!
//! The scan covers bytes present at open time; a line appended mid-scan
//! (or a partial trailing line from a concurrent writer) fails the JSON
//! parse, is skipped, and is picked up on the next cycle.

use crate::events::UsageEvent;
use crate::pricing::PricingTable;
use crate::records::SessionRecord;
use crate::state::StateStore;
use crate::timestamp::TimestampParser;
use anyhow::{Context, Result};
use glob::glob;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct SessionScanner {
    projects_dir: PathBuf,
}

impl SessionScanner {
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
        }
    }

    /// Scan all session logs, emitting events for new eligible records.
    ///
    /// Per-file read failures are logged and skipped; only a failure to
    /// list the projects root itself propagates.
    pub fn collect(
        &self,
        state: &mut StateStore,
        pricing: &PricingTable,
    ) -> Result<Vec<UsageEvent>> {
        let mut events = Vec::new();

        if !self.projects_dir.exists() {
            debug!(path = %self.projects_dir.display(), "projects directory not found");
            return Ok(events);
        }

        // A root we cannot list is a cycle failure, not a skipped file
        std::fs::read_dir(&self.projects_dir).with_context(|| {
            format!(
                "Failed to read projects directory: {}",
                self.projects_dir.display()
            )
        })?;

        let pattern = self.projects_dir.join("**").join("*.jsonl");
        let mut files: Vec<PathBuf> = glob(&pattern.to_string_lossy())
            .context("Invalid session log glob pattern")?
            .flatten()
            .collect();
        files.sort();

        let mut new_records = 0;
        for path in &files {
            match self.scan_file(path, state, pricing, &mut events) {
                Ok(count) => new_records += count,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "error parsing session file");
                }
            }
        }

        if new_records > 0 {
            info!(new_records, files = files.len(), "collected new session records");
        }

        Ok(events)
    }

    /// Read one session log, appending an event per new eligible record.
    /// Returns the number of newly seen records.
    fn scan_file(
        &self,
        path: &Path,
        state: &mut StateStore,
        pricing: &PricingTable,
        events: &mut Vec<UsageEvent>,
    ) -> Result<usize> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open session file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut new_count = 0;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Malformed lines (including partial trailing writes) are
            // skipped silently
            let Ok(record) = serde_json::from_str::<SessionRecord>(line) else {
                continue;
            };

            // Cheap checks first: eligibility and dedup before any
            // extraction work
            if !record.is_eligible() || state.contains(&record.uuid) {
                continue;
            }

            let Some(body) = &record.message else {
                continue;
            };
            let Some(usage) = &body.usage else {
                continue;
            };

            let hypothetical = pricing.cost(
                &body.model,
                usage.input_tokens,
                usage.output_tokens,
                usage.cache_read_input_tokens,
                usage.cache_creation_input_tokens,
            );
            let ephemeral = usage.cache_creation.clone().unwrap_or_default();
            let timestamp = TimestampParser::parse_value_or_now(record.timestamp.as_ref());

            let mut event = UsageEvent::new(
                "anthropic",
                &body.model,
                usage.input_tokens,
                usage.output_tokens,
                timestamp,
            );
            event.tag("source", "claude-code");
            event.tag("subscription", "claude-max");
            event.tag("data_type", "message");
            event.tag("session_id", record.short_session_id());
            event.field("cache_read_tokens", usage.cache_read_input_tokens);
            event.field("cache_write_tokens", usage.cache_creation_input_tokens);
            event.field("ephemeral_5m_tokens", ephemeral.ephemeral_5m_input_tokens);
            event.field("ephemeral_1h_tokens", ephemeral.ephemeral_1h_input_tokens);
            event.field("hypothetical_cost_usd", hypothetical);
            event.field(
                "service_tier",
                usage.service_tier.as_deref().unwrap_or("standard"),
            );
            event.field("has_tool_use", body.has_tool_use());
            event.field("has_thinking", body.has_thinking());
            event.field(
                "request_id",
                body.id.chars().take(20).collect::<String>(),
            );
            events.push(event);

            state.mark_seen(&record.uuid);
            new_count += 1;
        }

        Ok(new_count)
    }
}
