//! 历史摘要工具
//!
//! 供模型回看本会话最近的对话：取活跃会话最近 20 条消息，
//! 逐条打角色标签并截断到 100 字符，按原始顺序返回。

use async_trait::async_trait;
use serde_json::Value;

use crate::memory::Role;
use crate::session::SharedSessions;
use crate::tools::Tool;

/// 回看窗口：最近多少条消息
const SUMMARY_WINDOW: usize = 20;
/// 每条消息保留的最大字符数
const SNIPPET_CHARS: usize = 100;

/// History Summary 工具：持有会话状态的共享句柄
pub struct HistorySummaryTool {
    sessions: SharedSessions,
}

impl HistorySummaryTool {
    pub fn new(sessions: SharedSessions) -> Self {
        Self { sessions }
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    }
}

fn snippet(content: &str) -> String {
    let truncated: String = content.chars().take(SNIPPET_CHARS).collect();
    if content.chars().count() > SNIPPET_CHARS {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

#[async_trait]
impl Tool for HistorySummaryTool {
    fn name(&self) -> &str {
        "history_summary"
    }

    fn description(&self) -> &str {
        "Show the most recent messages of this conversation (role-labeled, truncated). No arguments."
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        let messages = self
            .sessions
            .lock()
            .map_err(|_| "Session state unavailable".to_string())?
            .active_messages();
        if messages.is_empty() {
            return Ok("No messages in this session yet.".to_string());
        }
        let start = messages.len().saturating_sub(SUMMARY_WINDOW);
        let lines: Vec<String> = messages[start..]
            .iter()
            .map(|m| format!("[{}] {}", role_label(m.role), snippet(&m.content)))
            .collect();
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{HistoryPersistence, Message};
    use crate::session::SessionManager;

    fn seeded_sessions(count: usize) -> (tempfile::TempDir, SessionManager) {
        let dir = tempfile::tempdir().unwrap();
        let mgr = SessionManager::bootstrap(HistoryPersistence::new(dir.path().join("h.json")));
        for i in 0..count {
            mgr.append(Message::user(format!("message {}", i)));
        }
        (dir, mgr)
    }

    #[tokio::test]
    async fn test_window_is_exactly_the_most_recent_twenty() {
        let (_dir, mgr) = seeded_sessions(25);
        let tool = HistorySummaryTool::new(mgr.shared());
        let out = tool.execute(serde_json::json!({})).await.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 20);
        // 原始顺序：最早保留的是第 5 条，最后是第 24 条
        assert!(lines[0].ends_with("message 5"));
        assert!(lines[19].ends_with("message 24"));
    }

    #[tokio::test]
    async fn test_long_messages_are_truncated() {
        let (_dir, mgr) = seeded_sessions(0);
        mgr.append(Message::assistant("x".repeat(300)));
        let tool = HistorySummaryTool::new(mgr.shared());
        let out = tool.execute(serde_json::json!({})).await.unwrap();
        assert!(out.starts_with("[assistant] "));
        assert!(out.ends_with("..."));
        assert!(out.len() < 300);
    }

    #[tokio::test]
    async fn test_empty_session() {
        let (_dir, mgr) = seeded_sessions(0);
        let tool = HistorySummaryTool::new(mgr.shared());
        let out = tool.execute(serde_json::json!({})).await.unwrap();
        assert_eq!(out, "No messages in this session yet.");
    }
}
