//! 会话持久化
//!
//! 单文件 JSON：{"session_id": ..., "messages": [{"type": "human"|"ai", "content", "timestamp"}]}。
//! 每次保存整体覆盖。加载失败（文件损坏、IO 错误）只告警并视为无持久化会话，绝不中断程序。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::memory::{Message, Role};

/// 单文件持久化适配器：绑定一个固定路径
#[derive(Debug)]
pub struct HistoryPersistence {
    path: PathBuf,
}

/// 磁盘文档根
#[derive(Serialize, Deserialize)]
struct PersistedSession {
    session_id: String,
    messages: Vec<PersistedMessage>,
}

/// 磁盘上的单条消息；type 只取 "human" / "ai"
#[derive(Serialize, Deserialize)]
struct PersistedMessage {
    #[serde(rename = "type")]
    kind: String,
    content: String,
    timestamp: Option<String>,
}

impl HistoryPersistence {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存一个会话的全部消息；父目录不存在时自动创建
    pub fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), AgentError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AgentError::PersistenceError(e.to_string()))?;
            }
        }
        let doc = PersistedSession {
            session_id: session_id.to_string(),
            messages: messages
                .iter()
                // System 消息只存在于请求拼装，不落盘
                .filter(|m| m.role != Role::System)
                .map(|m| PersistedMessage {
                    kind: match m.role {
                        Role::User => "human",
                        _ => "ai",
                    }
                    .to_string(),
                    content: m.content.clone(),
                    timestamp: Some(
                        m.timestamp.unwrap_or_else(chrono::Local::now).to_rfc3339(),
                    ),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| AgentError::PersistenceError(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| AgentError::PersistenceError(e.to_string()))
    }

    /// 加载持久化会话：文件不存在返回 None；损坏或读取失败告警后同样返回 None
    pub fn load(&self) -> Option<(String, Vec<Message>)> {
        if !self.path.exists() {
            return None;
        }
        let doc: PersistedSession = match std::fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|data| serde_json::from_str(&data).map_err(|e| e.to_string()))
        {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "history load failed, starting fresh");
                return None;
            }
        };

        let messages = doc
            .messages
            .into_iter()
            .map(|m| Message {
                role: match m.kind.as_str() {
                    "human" => Role::User,
                    _ => Role::Assistant,
                },
                content: m.content,
                timestamp: m.timestamp.as_deref().and_then(|t| {
                    chrono::DateTime::parse_from_rfc3339(t)
                        .ok()
                        .map(|dt| dt.with_timezone(&chrono::Local))
                }),
            })
            .collect();
        Some((doc.session_id, messages))
    }

    /// 删除持久化文件；文件不存在视为成功
    pub fn delete(&self) -> Result<(), AgentError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AgentError::PersistenceError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, HistoryPersistence) {
        let dir = tempfile::tempdir().unwrap();
        let p = HistoryPersistence::new(dir.path().join("history.json"));
        (dir, p)
    }

    #[test]
    fn test_round_trip_preserves_roles_and_order() {
        let (_dir, p) = temp_store();
        let messages = vec![
            Message::user("hello"),
            Message::assistant("hi, how can I help?"),
            Message::user("what time is it?"),
        ];
        p.save("sess-1", &messages).unwrap();

        let (id, loaded) = p.load().unwrap();
        assert_eq!(id, "sess-1");
        let pairs: Vec<(Role, &str)> = loaded.iter().map(|m| (m.role, m.content.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                (Role::User, "hello"),
                (Role::Assistant, "hi, how can I help?"),
                (Role::User, "what time is it?"),
            ]
        );
        // 时间戳应当解析回来
        assert!(loaded.iter().all(|m| m.timestamp.is_some()));
    }

    #[test]
    fn test_round_trip_empty_sequence() {
        let (_dir, p) = temp_store();
        p.save("empty", &[]).unwrap();
        let (id, loaded) = p.load().unwrap();
        assert_eq!(id, "empty");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_missing_file_loads_none() {
        let (_dir, p) = temp_store();
        assert!(p.load().is_none());
    }

    #[test]
    fn test_corrupted_file_loads_none() {
        let (_dir, p) = temp_store();
        std::fs::write(p.path(), "{not valid json").unwrap();
        assert!(p.load().is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, p) = temp_store();
        p.save("s", &[Message::user("x")]).unwrap();
        p.delete().unwrap();
        p.delete().unwrap();
        assert!(p.load().is_none());
    }

    #[test]
    fn test_save_overwrites_previous_document() {
        let (_dir, p) = temp_store();
        p.save("old", &[Message::user("old message")]).unwrap();
        p.save("new", &[Message::user("new message")]).unwrap();
        let (id, loaded) = p.load().unwrap();
        assert_eq!(id, "new");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].content, "new message");
    }
}
