//! 编排层：Planner + 工具调度回路 + 面向 REPL 的 Agent 门面

pub mod planner;
pub mod turn;

use std::sync::Arc;

pub use planner::{parse_llm_output, Planner, PlannerOutput, ToolCall};
pub use turn::{run_turn, MAX_TOOL_STEPS};

use crate::llm::LlmClient;
use crate::memory::Message;
use crate::session::SessionManager;
use crate::tools::{ToolExecutor, ToolRegistry};

/// 内置 system prompt；config/prompts/system.txt 存在时优先
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful and knowledgeable assistant with access to various tools.\n\
    Use the available tools when needed to provide accurate and helpful responses.\n\
    Always reply concisely, ideally in 2-3 sentences or short numbered bullet points.\n\
    If you don't know the answer and no tool can help, say \"I don't know\".";

/// 读取 system prompt 基底：按惯例路径找文件，找不到用内置默认
pub fn load_system_prompt() -> String {
    [
        "config/prompts/system.txt",
        "../config/prompts/system.txt",
    ]
    .into_iter()
    .find_map(|p| std::fs::read_to_string(p).ok())
    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
}

/// 拼接完整 system prompt：基底 + 注册表有序投影出的工具清单 + 调用协议
fn compose_system_prompt(base: &str, registry: &ToolRegistry) -> String {
    format!(
        "{base}\n\nAvailable tools (call at most one per reply):\n{tools}\n\n\
         To call a tool, reply with ONLY a JSON object: {{\"tool\": \"name\", \"args\": {{...}}}}.\n\
         Tool results will be fed back to you as observations. \
         When no tool is needed, reply with the final answer as plain text.",
        tools = registry.to_schema_json()
    )
}

/// Agent 门面：持有 Planner 与 ToolExecutor，对外只暴露"一轮聊天"
pub struct Agent {
    planner: Planner,
    executor: ToolExecutor,
}

impl Agent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        registry: ToolRegistry,
        base_prompt: &str,
        tool_timeout_secs: u64,
    ) -> Self {
        let system_prompt = compose_system_prompt(base_prompt, &registry);
        Self {
            planner: Planner::new(llm, system_prompt),
            executor: ToolExecutor::new(registry, tool_timeout_secs),
        }
    }

    /// 处理一条用户输入：跑调度回路，把用户消息与最终回答写入会话并落盘。
    /// 后端错误在这里折叠成回答文本 —— 对话继续，进程不退。
    pub async fn chat(&self, sessions: &SessionManager, input: &str) -> String {
        let history = sessions.messages();
        let reply = match run_turn(&self.planner, &self.executor, &history, input).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "turn failed");
                format!("Error: {}", e)
            }
        };

        sessions.append(Message::user(input));
        sessions.append(Message::assistant(reply.clone()));
        if let Err(e) = sessions.flush() {
            tracing::warn!(error = %e, "history flush failed");
        }
        reply
    }

    /// (name, description) 有序列表，供 /tools 展示
    pub fn tool_descriptors(&self) -> Vec<(String, String)> {
        self.executor.descriptors()
    }

    pub fn tool_count(&self) -> usize {
        self.executor.tool_names().len()
    }

    /// 累计 token 使用统计，供 /session 展示
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.planner.token_usage()
    }
}
