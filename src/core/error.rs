//! Agent 错误类型
//!
//! 工具失败不在此列：执行器把未知工具、内部失败与超时统一折叠成
//! "Error: ..." 观察字符串还给模型。这里的枚举覆盖会冒泡的错误面：
//! LLM 调用、工具调用解析、配置与持久化。

use thiserror::Error;

/// 一次对话回合中可能冒泡的错误
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    /// LLM 输出形似工具调用但 JSON 无法解析
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),
}
