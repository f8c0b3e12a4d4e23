use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Parses the timestamp shapes that show up in session log records:
/// ISO-8601 with a literal `Z`, explicit offsets, naive datetimes, and
/// epoch-millisecond numbers.
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a timestamp string into a `DateTime<Utc>`.
    pub fn parse(timestamp_str: &str) -> Result<DateTime<Utc>> {
        // Handle both Z suffix and timezone info
        let timestamp = if timestamp_str.ends_with('Z') {
            timestamp_str.replace('Z', "+00:00")
        } else {
            timestamp_str.to_string()
        };

        // Try parsing as ISO 8601
        if let Ok(dt) = DateTime::parse_from_rfc3339(&timestamp) {
            return Ok(dt.with_timezone(&Utc));
        }

        // Try parsing as naive datetime and assume UTC
        if let Ok(naive) = NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }

        anyhow::bail!("Failed to parse timestamp: {}", timestamp_str)
    }

    /// Parse a raw JSON timestamp value: strings go through [`Self::parse`],
    /// numbers are taken as epoch milliseconds.
    pub fn parse_value(value: &Value) -> Result<DateTime<Utc>> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => {
                let millis = n
                    .as_i64()
                    .ok_or_else(|| anyhow::anyhow!("Timestamp out of range: {}", n))?;
                Utc.timestamp_millis_opt(millis)
                    .single()
                    .ok_or_else(|| anyhow::anyhow!("Timestamp out of range: {}", millis))
            }
            other => anyhow::bail!("Unsupported timestamp value: {}", other),
        }
    }

    /// Fallback parse for record ingestion: an absent or unparseable source
    /// timestamp yields the current time rather than failing the record.
    pub fn parse_value_or_now(value: Option<&Value>) -> DateTime<Utc> {
        value
            .and_then(|v| Self::parse_value(v).ok())
            .unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_z_suffix() {
        let result = TimestampParser::parse("2024-01-01T12:00:00.000Z");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_timezone() {
        let result = TimestampParser::parse("2024-01-01T12:00:00.000+00:00");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_naive() {
        let result = TimestampParser::parse("2024-01-01T12:00:00.000");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        let result = TimestampParser::parse("invalid");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_epoch_millis() {
        let dt = TimestampParser::parse_value(&json!(1704110400000_i64)).unwrap();
        assert_eq!(dt, TimestampParser::parse("2024-01-01T12:00:00Z").unwrap());
    }

    #[test]
    fn test_parse_value_or_now_falls_back() {
        let before = Utc::now();
        let dt = TimestampParser::parse_value_or_now(Some(&json!("not a timestamp")));
        assert!(dt >= before);

        let dt = TimestampParser::parse_value_or_now(None);
        assert!(dt >= before);
    }
}
