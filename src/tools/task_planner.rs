//! 任务规划工具
//!
//! 固定清单模板，提醒模型把计划落到真实的工具调用上，而不是只在回复里描述动作。
//! 纯提示性工具，不做任何计算。

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

/// Task Planner 工具
pub struct TaskPlannerTool;

#[async_trait]
impl Tool for TaskPlannerTool {
    fn name(&self) -> &str {
        "task_planner"
    }

    fn description(&self) -> &str {
        "Turn a request into a short execution checklist. Args: {\"request\": \"...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "request": { "type": "string", "description": "What the user asked for" }
            },
            "required": ["request"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let request = args
            .get("request")
            .and_then(|v| v.as_str())
            .unwrap_or("(unspecified)")
            .trim();
        Ok(format!(
            "Execution checklist for: {}\n\
             1. Decide which tools are needed (clock, calculator, weather, file_ops, run_command, web_search).\n\
             2. CALL each tool with concrete arguments - do not merely describe the call.\n\
             3. Use every tool result (observation) in the final answer.\n\
             4. If a tool returns an error string, adjust the arguments or pick another tool.\n\
             5. Finish with a plain-text answer once no more tool calls are needed.",
            request
        ))
    }
}
