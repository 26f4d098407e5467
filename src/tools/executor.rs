//! 工具执行器
//!
//! 持有 ToolRegistry 与单次调用超时。对编排层而言工具永远"成功"：
//! 未知工具、内部失败、超时一律转为 "Error: ..." 字符串作为观察结果返回，
//! 失败是数据而不是控制流。每次调用输出结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::time::timeout;

use crate::tools::ToolRegistry;

/// 工具执行器：超时 + 审计 + 错误到字符串的统一折叠
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 执行指定工具并返回观察字符串；失败与超时折叠为 "Error: ..." 文本
    pub async fn execute(&self, tool_name: &str, args: Value) -> String {
        let start = Instant::now();
        let args_preview = args_preview(&args);
        let result = timeout(self.timeout, self.registry.execute(tool_name, args)).await;

        let (outcome, observation) = match result {
            Ok(Ok(content)) => ("ok", content),
            Ok(Err(e)) => ("error", format!("Error: {}", e)),
            Err(_) => (
                "timeout",
                format!(
                    "Error: tool '{}' timed out after {}s",
                    tool_name,
                    self.timeout.as_secs()
                ),
            ),
        };

        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        observation
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.tool_names()
    }

    pub fn descriptors(&self) -> Vec<(String, String)> {
        self.registry.descriptors()
    }

    pub fn schema_json(&self) -> String {
        self.registry.to_schema_json()
    }
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
