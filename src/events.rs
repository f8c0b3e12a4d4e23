//! Normalized usage events
//!
//! Every collector emits [`UsageEvent`] values regardless of where the raw
//! data came from (session logs, aggregate snapshots, provider APIs). The
//! event carries the four primary token counters plus free-form tags and
//! fields, and maps one-to-one onto a time-series write.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// A single value in the event field set.
///
/// Serialized untagged so JSON output reads as plain numbers/strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Integer(v.try_into().unwrap_or(i64::MAX))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Integer(if v { 1 } else { 0 })
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageEvent {
    pub provider: String,
    /// Normalized model identifier (date suffix stripped, lower-cased).
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cost_usd: f64,
    pub timestamp: DateTime<Utc>,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl UsageEvent {
    /// Create an event with `total_tokens` derived from input + output.
    /// The raw model identifier is normalized here so downstream consumers
    /// never see two spellings of the same model.
    pub fn new(
        provider: &str,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            provider: provider.to_string(),
            model: normalize_model_name(model),
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            cost_usd: 0.0,
            timestamp,
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn tag(&mut self, key: &str, value: impl Into<String>) {
        self.tags.insert(key.to_string(), value.into());
    }

    pub fn field(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Render as one InfluxDB line-protocol write.
    ///
    /// Tag set: provider, model plus `tags`. Field set: the four token
    /// counters, cost_usd plus `fields`. Timestamp in nanoseconds.
    pub fn to_line_protocol(&self, measurement: &str) -> String {
        let mut line = String::with_capacity(192);
        line.push_str(&escape_tag(measurement));
        line.push_str(",provider=");
        line.push_str(&escape_tag(&self.provider));
        line.push_str(",model=");
        line.push_str(&escape_tag(&self.model));
        for (key, value) in &self.tags {
            line.push(',');
            line.push_str(&escape_tag(key));
            line.push('=');
            line.push_str(&escape_tag(value));
        }

        line.push(' ');
        line.push_str(&format!(
            "input_tokens={}i,output_tokens={}i,total_tokens={}i,cost_usd={}",
            self.input_tokens, self.output_tokens, self.total_tokens, self.cost_usd
        ));
        for (key, value) in &self.fields {
            line.push(',');
            line.push_str(&escape_tag(key));
            line.push('=');
            match value {
                FieldValue::Integer(v) => line.push_str(&format!("{}i", v)),
                FieldValue::Float(v) => line.push_str(&v.to_string()),
                FieldValue::Text(v) => {
                    // Line protocol is newline-delimited; an embedded
                    // newline would split the write
                    line.push('"');
                    line.push_str(
                        &v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', " "),
                    );
                    line.push('"');
                }
            }
        }

        line.push(' ');
        // Nanosecond range covers 1677-2262; saturate outside it rather
        // than collapsing to epoch 0
        let nanos = self.timestamp.timestamp_nanos_opt().unwrap_or_else(|| {
            if self.timestamp.timestamp() >= 0 {
                i64::MAX
            } else {
                i64::MIN
            }
        });
        line.push_str(&nanos.to_string());
        line
    }
}

fn escape_tag(raw: &str) -> String {
    raw.replace(' ', "\\ ").replace(',', "\\,").replace('=', "\\=")
}

/// Strip a trailing `-YYYYMMDD` date suffix and lower-case the identifier.
pub fn normalize_model_name(model: &str) -> String {
    let lower = model.to_ascii_lowercase();
    // A date suffix is pure ASCII, so a non-char-boundary split point means
    // there is no suffix to strip
    if lower.len() > 9 && lower.is_char_boundary(lower.len() - 9) {
        let (head, tail) = lower.split_at(lower.len() - 9);
        if tail.starts_with('-') && tail[1..].chars().all(|c| c.is_ascii_digit()) {
            return head.to_string();
        }
    }
    lower
}
