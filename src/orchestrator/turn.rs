//! 单回合工具调度回路
//!
//! 显式状态机：compose -> 模型调用 -> 解析 -> 工具调用则派发并写回观察，回到模型调用；
//! 最终回答则结束。步数上限是对失控工具循环的唯一防线，到达上限时
//! 返回带最后一次模型输出的"未能完成"文本而不是报错。

use crate::core::AgentError;
use crate::memory::Message;
use crate::orchestrator::planner::{parse_llm_output, Planner, PlannerOutput};
use crate::tools::ToolExecutor;

/// 单回合内最大工具调用轮数
pub const MAX_TOOL_STEPS: usize = 5;

/// 跑完一个用户回合，返回最终回答文本
///
/// history 是会话既有消息（不含本回合输入）；中间的工具交互只存在于
/// 本函数的局部 exchange 中，不会进入会话历史。LLM 层错误向上冒泡，
/// 由调用方转成用户可见的错误消息。
pub async fn run_turn(
    planner: &Planner,
    executor: &ToolExecutor,
    history: &[Message],
    user_input: &str,
) -> Result<String, AgentError> {
    let mut exchange: Vec<Message> = history.to_vec();
    exchange.push(Message::user(user_input));

    let mut step = 0;
    let mut last_output = String::new();

    loop {
        if step >= MAX_TOOL_STEPS {
            tracing::warn!(steps = MAX_TOOL_STEPS, "turn hit the tool-step cap");
            return Ok(format!(
                "Unable to complete the request within {} tool calls. Last model output:\n{}",
                MAX_TOOL_STEPS, last_output
            ));
        }

        let output = planner.plan(&exchange).await?;
        last_output = output.clone();

        match parse_llm_output(&output) {
            // 历史里的消息内容不允许为空，空回答降级为占位文本
            Ok(PlannerOutput::Response(text)) if text.is_empty() => {
                return Ok("(no response)".to_string())
            }
            Ok(PlannerOutput::Response(text)) => return Ok(text),
            Ok(PlannerOutput::ToolCall(call)) => {
                tracing::info!(step = step, tool = %call.tool, "dispatching tool call");
                let observation = executor.execute(&call.tool, call.args).await;
                // 工具请求与观察都写回 exchange，模型下一轮据此继续
                exchange.push(Message::assistant(&output));
                exchange.push(Message::user(format!(
                    "Observation from {}: {}",
                    call.tool, observation
                )));
            }
            Err(AgentError::JsonParseError(e)) => {
                // 形似工具调用但 JSON 坏了：注入纠错提示让模型重试，消耗一步
                tracing::warn!(error = %e, "malformed tool call, asking the model to retry");
                exchange.push(Message::assistant(&output));
                exchange.push(Message::user(
                    "Your last reply looked like a tool call but was not valid JSON. \
                     Reply with ONLY {\"tool\": \"name\", \"args\": {...}}, or answer in plain text."
                        .to_string(),
                ));
            }
            Err(e) => return Err(e),
        }

        step += 1;
    }
}
