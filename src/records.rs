//! Raw record types
//!
//! Typed views of the two on-disk formats this collector ingests: the
//! line-delimited session logs under `projects/` and the periodically
//! rewritten `stats-cache.json` aggregate snapshot. Every field is optional
//! or defaulted so one missing key never discards a whole record; whether a
//! record is worth converting is decided once, in
//! [`SessionRecord::is_eligible`], not ad hoc downstream.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One line of a session log file.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default)]
    pub uuid: String,
    /// ISO-8601 string or epoch-millisecond number; kept raw until
    /// conversion time.
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(rename = "sessionId", default)]
    pub session_id: String,
    #[serde(default)]
    pub message: Option<MessageBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub id: String,
    #[serde(default = "unknown_model")]
    pub model: String,
    #[serde(default)]
    pub usage: Option<UsageCounters>,
    /// Content can be a string or a list of typed blocks depending on the
    /// writer version, so it stays a raw value.
    #[serde(default)]
    pub content: Value,
}

fn unknown_model() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageCounters {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_creation: Option<EphemeralCache>,
    #[serde(default)]
    pub service_tier: Option<String>,
}

/// Nested ephemeral cache buckets; tracked as extra fields, not rolled into
/// the primary cache counters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EphemeralCache {
    #[serde(default)]
    pub ephemeral_5m_input_tokens: u64,
    #[serde(default)]
    pub ephemeral_1h_input_tokens: u64,
}

impl SessionRecord {
    /// An eligible record is an assistant turn with a record identifier and
    /// a usage block. Everything else (user turns, summaries, tool results)
    /// is ignored.
    pub fn is_eligible(&self) -> bool {
        self.record_type == "assistant"
            && !self.uuid.is_empty()
            && self.message.as_ref().is_some_and(|m| m.usage.is_some())
    }

    /// Session identifier truncated for tagging.
    pub fn short_session_id(&self) -> String {
        if self.session_id.is_empty() {
            "unknown".to_string()
        } else {
            self.session_id.chars().take(8).collect()
        }
    }
}

impl MessageBody {
    pub fn has_tool_use(&self) -> bool {
        self.has_content_block("tool_use")
    }

    pub fn has_thinking(&self) -> bool {
        self.has_content_block("thinking")
    }

    fn has_content_block(&self, block_type: &str) -> bool {
        self.content
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .any(|b| b.get("type").and_then(Value::as_str) == Some(block_type))
            })
            .unwrap_or(false)
    }
}

/// The aggregate snapshot file (`stats-cache.json`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsCache {
    pub model_usage: BTreeMap<String, ModelTotals>,
    pub daily_activity: Vec<DailyActivity>,
    pub total_sessions: u64,
    pub total_messages: u64,
    pub first_session_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub web_search_requests: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyActivity {
    pub date: String,
    pub message_count: u64,
    pub session_count: u64,
    pub tool_call_count: u64,
}
