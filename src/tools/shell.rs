//! 命令运行工具：白名单命令，禁止危险操作
//!
//! 仅允许配置中的命令名（首词，如 ls、pwd、echo）；即使首词在白名单内，
//! 含危险子串（rm -rf、fork bomb 等）的命令行也被拒绝。
//! 执行通过 sh -c / cmd /C，带超时。

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::tools::Tool;

/// 无论白名单如何配置都不放行的子串
const FORBIDDEN_SUBSTR: &[&str] = &[
    "rm -rf",
    "rm -fr",
    "rm -r",
    "| sh",
    "| bash",
    "mkfs",
    "dd if=",
    "> /dev/",
    ":(){ :|:& };:", // fork bomb
];

/// Command Runner 工具：仅执行白名单内的命令
pub struct CommandTool {
    allowed_commands: HashSet<String>,
    timeout_secs: u64,
}

impl CommandTool {
    pub fn new(allowed_commands: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            allowed_commands: allowed_commands.into_iter().map(|s| s.to_lowercase()).collect(),
            timeout_secs,
        }
    }

    fn check_allowed(&self, raw: &str) -> Result<(), String> {
        let lowered = raw.to_lowercase();
        for forbidden in FORBIDDEN_SUBSTR {
            if lowered.contains(forbidden) {
                return Err(format!("Command not allowed: contains '{}'", forbidden));
            }
        }
        let first = lowered.split_whitespace().next().unwrap_or("");
        if first.is_empty() {
            return Err("Empty command".to_string());
        }
        if !self.allowed_commands.contains(first) {
            return Err(format!("Command '{}' is not in the allow-list", first));
        }
        Ok(())
    }
}

#[async_trait]
impl Tool for CommandTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Run a whitelisted shell command (ls, pwd, date, whoami, echo, cat, head, tail). Args: {\"command\": \"ls -l\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Shell command line; the first word must be in the allow-list"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let command = args
            .get("command")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim();
        self.check_allowed(command)?;
        tracing::info!(command = %command, "run_command execute");

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };

        let output = tokio::time::timeout(
            std::time::Duration::from_secs(self.timeout_secs),
            cmd.output(),
        )
        .await
        .map_err(|_| format!("Command timed out after {}s", self.timeout_secs))?
        .map_err(|e| format!("Execution failed: {}", e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(format!("Exit {:?}\nstderr: {}", output.status, stderr.trim()));
        }
        Ok(stdout)
    }
}
