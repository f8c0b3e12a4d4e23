#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use token_dash_collector::ClaudeCodeCollector;

/// A throwaway claude home with a `projects/` tree.
pub fn claude_home() -> Result<TempDir> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("projects"))?;
    Ok(dir)
}

/// A collector whose state file lives inside the same temp home.
pub fn collector_for(home: &Path) -> ClaudeCodeCollector {
    ClaudeCodeCollector::with_paths(
        home.to_path_buf(),
        home.join("token_dash_state.json"),
        10_000,
    )
}

/// One eligible assistant-turn log line.
pub fn assistant_line(uuid: &str, model: &str, input: u64, output: u64) -> String {
    serde_json::json!({
        "type": "assistant",
        "uuid": uuid,
        "timestamp": "2025-06-01T10:00:00Z",
        "sessionId": "fixture-session-0001",
        "message": {
            "id": format!("msg_{uuid}"),
            "model": model,
            "usage": {
                "input_tokens": input,
                "output_tokens": output,
                "cache_read_input_tokens": 0,
                "cache_creation_input_tokens": 0
            },
            "content": [{"type": "text", "text": "ok"}]
        }
    })
    .to_string()
}

/// Write (or overwrite) a session log file under a project directory.
pub fn write_session_file(home: &Path, project: &str, name: &str, lines: &[String]) -> Result<()> {
    let dir = home.join("projects").join(project);
    fs::create_dir_all(&dir)?;
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(dir.join(name), content)?;
    Ok(())
}

/// Append lines to an existing session log file.
pub fn append_session_lines(home: &Path, project: &str, name: &str, lines: &[String]) -> Result<()> {
    use std::io::Write;
    let path = home.join("projects").join(project).join(name);
    let mut file = fs::OpenOptions::new().append(true).create(true).open(path)?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

/// Write the aggregate snapshot file.
pub fn write_stats_cache(home: &Path, stats: &serde_json::Value) -> Result<()> {
    fs::write(home.join("stats-cache.json"), stats.to_string())?;
    Ok(())
}

pub fn simple_stats(input_tokens: u64) -> serde_json::Value {
    serde_json::json!({
        "modelUsage": {
            "claude-sonnet-4-20250514": {
                "inputTokens": input_tokens,
                "outputTokens": 500,
                "cacheReadInputTokens": 0,
                "cacheCreationInputTokens": 0,
                "webSearchRequests": 0
            }
        },
        "dailyActivity": [
            {"date": "2025-06-01", "messageCount": 3, "sessionCount": 1, "toolCallCount": 2}
        ],
        "totalSessions": 1,
        "totalMessages": 3,
        "firstSessionDate": "2025-06-01"
    })
}
