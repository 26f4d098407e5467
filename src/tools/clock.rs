//! 时钟工具

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

/// Clock 工具：返回本地当前日期与时间
pub struct ClockTool;

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "clock"
    }

    fn description(&self) -> &str {
        "Get the current local date and time. No arguments."
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        Ok(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
    }
}
