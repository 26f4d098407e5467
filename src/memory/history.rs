//! 按会话的历史存储
//!
//! session_id -> 有序消息序列。只支持追加与整段清空，不支持改写或删除单条消息。

use std::collections::HashMap;

use crate::memory::Message;

/// 历史存储：每个会话一条有序消息序列
#[derive(Default)]
pub struct HistoryStore {
    sessions: HashMap<String, Vec<Message>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出某会话的消息序列，不存在时创建空序列
    pub fn get_or_create(&mut self, session_id: &str) -> &mut Vec<Message> {
        self.sessions.entry(session_id.to_string()).or_default()
    }

    pub fn append(&mut self, session_id: &str, message: Message) {
        debug_assert!(!message.content.is_empty(), "appended message must have content");
        self.get_or_create(session_id).push(message);
    }

    /// 清空某会话的消息（会话本身保留）
    pub fn clear(&mut self, session_id: &str) {
        if let Some(messages) = self.sessions.get_mut(session_id) {
            messages.clear();
        }
    }

    /// 某会话的全部消息（按追加顺序）；不存在时返回空
    pub fn all(&self, session_id: &str) -> Vec<Message> {
        self.sessions.get(session_id).cloned().unwrap_or_default()
    }

    pub fn len(&self, session_id: &str) -> usize {
        self.sessions.get(session_id).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self, session_id: &str) -> bool {
        self.len(session_id) == 0
    }

    /// 整体替换某会话的消息序列（仅用于启动时从磁盘恢复）
    pub fn replace(&mut self, session_id: &str, messages: Vec<Message>) {
        self.sessions.insert(session_id.to_string(), messages);
    }
}
