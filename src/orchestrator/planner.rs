//! Planner：模型调用与工具调用解析
//!
//! 模型要么给最终回答（纯文本），要么请求一次工具调用
//! （JSON：{"tool": "calculator", "args": {"expression": "2+2"}}）。
//! parse_llm_output 从文本中提取 JSON 并判定是哪一种。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;

/// 模型请求的一次工具调用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// 解析后的模型输出
#[derive(Debug, Clone)]
pub enum PlannerOutput {
    /// 最终回答，回合结束
    Response(String),
    /// 请求执行工具，回合继续
    ToolCall(ToolCall),
}

/// 从模型输出中截取候选 JSON 片段：```json 围栏优先，其次首 { 到末 }
fn extract_json(output: &str) -> Option<&str> {
    if let Some(fence) = output.find("```json") {
        let body = &output[fence + 7..];
        let end = body.find("```").unwrap_or(body.len());
        return Some(body[..end].trim());
    }
    let start = output.find('{')?;
    match output.rfind('}') {
        Some(end) if end > start => Some(&output[start..=end]),
        // 截断的 JSON：原样交给解析器报错，由回路注入纠错提示
        _ => Some(&output[start..]),
    }
}

/// 判定模型输出：含合法 JSON 且 tool 非空则为 ToolCall，无 JSON 痕迹则为 Response，
/// 形似 JSON 但解析失败报 JsonParseError（由回路注入纠错提示后重试）
pub fn parse_llm_output(output: &str) -> Result<PlannerOutput, AgentError> {
    let trimmed = output.trim();
    let Some(json_str) = extract_json(trimmed) else {
        return Ok(PlannerOutput::Response(trimmed.to_string()));
    };

    let call: ToolCall = serde_json::from_str(json_str)
        .map_err(|e| AgentError::JsonParseError(format!("{}: {}", e, json_str)))?;

    if call.tool.is_empty() {
        Ok(PlannerOutput::Response(trimmed.to_string()))
    } else {
        Ok(PlannerOutput::ToolCall(call))
    }
}

/// Planner：持有 LLM 与 system prompt，负责拼 system + 消息后调用模型
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// 获取 LLM 累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }

    /// 一次模型调用：system prompt 在前，exchange（历史 + 本回合交互）在后
    pub async fn plan(&self, exchange: &[Message]) -> Result<String, AgentError> {
        let mut request = Vec::with_capacity(exchange.len() + 1);
        request.push(Message::system(&self.system_prompt));
        request.extend_from_slice(exchange);
        self.llm.complete(&request).await.map_err(AgentError::LlmError)
    }
}
