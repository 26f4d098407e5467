//! 会话消息
//!
//! 消息一经追加不可变，顺序即对话顺序；时间戳在构造时打上，持久化时写为 RFC 3339。

use chrono::{DateTime, Local};

/// 消息角色（与 LLM API 一致；System 仅用于拼请求，不进入会话历史）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: Option<DateTime<Local>>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::stamped(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::stamped(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::stamped(Role::System, content)
    }

    fn stamped(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Some(Local::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_stamp_time() {
        let m = Message::user("hi");
        assert_eq!(m.role, Role::User);
        assert_eq!(m.content, "hi");
        assert!(m.timestamp.is_some());
    }
}
