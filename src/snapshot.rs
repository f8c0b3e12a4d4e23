//! Aggregate snapshot reader
//!
//! Reads the periodically rewritten `stats-cache.json` aggregate file and
//! turns it into events. The snapshot has no per-record identity, only a
//! whole-file content fingerprint: when the fingerprint matches the one
//! stored in the dedup state the file is unchanged and nothing is emitted;
//! when it differs, all current per-model totals are re-asserted along with
//! the daily-activity history. A corrupt write cycle of the source file is
//! logged and treated as "no new data".

use crate::events::UsageEvent;
use crate::pricing::PricingTable;
use crate::records::StatsCache;
use crate::state::StateStore;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};

pub struct SnapshotReader {
    path: PathBuf,
}

impl SnapshotReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Emit aggregate events if the snapshot changed since last cycle.
    pub fn collect(&self, state: &mut StateStore, pricing: &PricingTable) -> Vec<UsageEvent> {
        let mut events = Vec::new();

        if !self.path.exists() {
            debug!(path = %self.path.display(), "stats cache not found");
            return events;
        }

        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "failed to read stats cache");
                return events;
            }
        };

        let stats: StatsCache = match serde_json::from_slice(&content) {
            Ok(stats) => stats,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "failed to parse stats cache");
                return events;
            }
        };

        let fingerprint = format!("{:x}", Sha256::digest(&content));
        if state.fingerprint() == Some(fingerprint.as_str()) {
            debug!("stats cache unchanged, skipping");
            return events;
        }
        state.set_fingerprint(fingerprint);

        // One point-in-time re-assertion per tracked model. The snapshot has
        // no model-level deltas, so a changed file re-emits every total.
        let now = Utc::now();
        for (model_name, totals) in &stats.model_usage {
            let hypothetical = pricing.cost(
                model_name,
                totals.input_tokens,
                totals.output_tokens,
                totals.cache_read_input_tokens,
                totals.cache_creation_input_tokens,
            );

            let mut event = UsageEvent::new(
                "anthropic",
                model_name,
                totals.input_tokens,
                totals.output_tokens,
                now,
            );
            event.tag("source", "claude-code");
            event.tag("subscription", "claude-max");
            event.tag("data_type", "aggregate");
            event.field("cache_read_tokens", totals.cache_read_input_tokens);
            event.field("cache_write_tokens", totals.cache_creation_input_tokens);
            event.field("hypothetical_cost_usd", hypothetical);
            event.field("total_sessions", stats.total_sessions);
            event.field("total_messages", stats.total_messages);
            event.field("web_search_requests", totals.web_search_requests);
            events.push(event);
        }

        for daily in &stats.daily_activity {
            let Ok(date) = chrono::NaiveDate::parse_from_str(&daily.date, "%Y-%m-%d") else {
                continue;
            };
            let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
                continue;
            };

            let mut event =
                UsageEvent::new("anthropic", "claude-code-activity", 0, 0, midnight.and_utc());
            event.tag("source", "claude-code");
            event.tag("data_type", "daily_activity");
            event.field("message_count", daily.message_count);
            event.field("session_count", daily.session_count);
            event.field("tool_call_count", daily.tool_call_count);
            events.push(event);
        }

        info!(
            model_count = stats.model_usage.len(),
            daily_count = stats.daily_activity.len(),
            "collected stats cache snapshot"
        );

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use tempfile::tempdir;

    fn stats_json() -> String {
        serde_json::json!({
            "modelUsage": {
                "claude-sonnet-4-20250514": {
                    "inputTokens": 1000, "outputTokens": 500,
                    "cacheReadInputTokens": 10, "cacheCreationInputTokens": 20,
                    "webSearchRequests": 1
                }
            },
            "dailyActivity": [
                {"date": "2025-06-01", "messageCount": 4, "sessionCount": 1, "toolCallCount": 7},
                {"date": "not-a-date", "messageCount": 9, "sessionCount": 9, "toolCallCount": 9}
            ],
            "totalSessions": 1,
            "totalMessages": 4,
            "firstSessionDate": "2025-06-01"
        })
        .to_string()
    }

    #[test]
    fn missing_file_emits_nothing() {
        let dir = tempdir().unwrap();
        let reader = SnapshotReader::new(dir.path().join("stats-cache.json"));
        let mut state = StateStore::load(dir.path().join("state.json"), 100);
        assert!(reader.collect(&mut state, &PricingTable::anthropic()).is_empty());
    }

    #[test]
    fn malformed_json_emits_nothing_and_keeps_fingerprint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats-cache.json");
        fs::write(&path, "{broken").unwrap();
        let reader = SnapshotReader::new(&path);
        let mut state = StateStore::load(dir.path().join("state.json"), 100);
        assert!(reader.collect(&mut state, &PricingTable::anthropic()).is_empty());
        assert!(state.fingerprint().is_none());
    }

    #[test]
    fn emits_model_and_daily_events_then_gates_on_fingerprint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats-cache.json");
        fs::write(&path, stats_json()).unwrap();
        let reader = SnapshotReader::new(&path);
        let mut state = StateStore::load(dir.path().join("state.json"), 100);
        let pricing = PricingTable::anthropic();

        let events = reader.collect(&mut state, &pricing);
        // One model event plus one daily event; the bad date is skipped
        assert_eq!(events.len(), 2);

        let model_event = &events[0];
        assert_eq!(model_event.model, "claude-sonnet-4");
        assert_eq!(model_event.input_tokens, 1000);
        assert_eq!(model_event.cost_usd, 0.0);
        assert_eq!(
            model_event.tags.get("data_type").map(String::as_str),
            Some("aggregate")
        );

        let daily_event = &events[1];
        assert_eq!(daily_event.model, "claude-code-activity");
        assert_eq!(daily_event.timestamp.year(), 2025);
        assert_eq!(daily_event.timestamp.hour(), 0);

        // Unchanged bytes: second cycle emits nothing
        assert!(reader.collect(&mut state, &pricing).is_empty());

        // Changed bytes: all totals re-emitted
        fs::write(&path, stats_json().replace("\"inputTokens\":1000", "\"inputTokens\":2000"))
            .unwrap();
        assert_eq!(reader.collect(&mut state, &pricing).len(), 2);
    }
}
