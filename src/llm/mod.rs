//! LLM 客户端抽象与实现（OpenAI 兼容 / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use traits::LlmClient;

use crate::config::AppConfig;
use crate::core::AgentError;

/// API Key 环境变量名（唯一的凭证来源，源码中不内置任何密钥）
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// 根据配置与环境变量选择 LLM 后端
///
/// provider = "mock" 或（Key 缺失且 allow_mock = true）时使用 Mock；
/// 否则必须有 API Key，缺失直接作为配置错误返回 —— 不存在隐式回退凭证。
pub fn create_llm_from_config(cfg: &AppConfig) -> Result<Arc<dyn LlmClient>, AgentError> {
    let provider = cfg.llm.provider.to_lowercase();

    if provider == "mock" {
        tracing::info!("Using Mock LLM (provider = mock)");
        return Ok(Arc::new(MockLlmClient::new()));
    }
    if provider != "openai" {
        return Err(AgentError::ConfigError(format!(
            "Unknown LLM provider '{}' (expected 'openai' or 'mock')",
            cfg.llm.provider
        )));
    }

    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => {
            tracing::info!(model = %cfg.llm.model, "Using OpenAI-compatible LLM");
            Ok(Arc::new(OpenAiClient::new(
                cfg.llm.base_url.as_deref(),
                &cfg.llm.model,
                key.trim(),
            )))
        }
        _ if cfg.llm.allow_mock => {
            tracing::warn!("{} not set, falling back to Mock LLM (allow_mock = true)", API_KEY_ENV);
            Ok(Arc::new(MockLlmClient::new()))
        }
        _ => Err(AgentError::ConfigError(format!(
            "{} is not set; export it, or set [llm] allow_mock = true to run without a backend",
            API_KEY_ENV
        ))),
    }
}
