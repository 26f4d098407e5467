//! Mock LLM 客户端（测试与离线演示用，无需 API）
//!
//! 支持两种脚本：按序出队的固定回复（耗尽后回显最后一条用户消息），
//! 或每次都返回同一条回复（用于触发迭代上限的测试）。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

enum Script {
    /// 依次出队；耗尽后回显
    Sequence(Mutex<VecDeque<String>>),
    /// 永远同一条回复
    Repeating(String),
}

/// Mock 客户端
pub struct MockLlmClient {
    script: Script,
}

impl MockLlmClient {
    /// 无脚本：每次回显最后一条用户消息
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    /// 按序回复给定脚本，耗尽后回显
    pub fn with_script(replies: Vec<String>) -> Self {
        Self {
            script: Script::Sequence(Mutex::new(replies.into_iter().collect())),
        }
    }

    /// 每次都返回同一条回复
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self {
            script: Script::Repeating(reply.into()),
        }
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        match &self.script {
            Script::Repeating(reply) => Ok(reply.clone()),
            Script::Sequence(queue) => {
                if let Some(next) = queue.lock().expect("mock script poisoned").pop_front() {
                    return Ok(next);
                }
                let last_user = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or("(no input)");
                Ok(format!("(mock) {}", last_user))
            }
        }
    }
}
