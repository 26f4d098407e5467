//! 工具箱
//!
//! 八个固定工具（进程启动时一次性注册，无动态注册）与统一的执行器。
//! 每个工具都是字符串进、字符串出；内部失败被执行器折叠为 "Error: ..." 观察文本。

pub mod calculator;
pub mod clock;
pub mod executor;
pub mod files;
pub mod history;
pub mod registry;
pub mod search;
pub mod shell;
pub mod task_planner;
pub mod weather;

pub use calculator::CalculatorTool;
pub use clock::ClockTool;
pub use executor::ToolExecutor;
pub use files::FileOpsTool;
pub use history::HistorySummaryTool;
pub use registry::{Tool, ToolRegistry};
pub use search::WebSearchTool;
pub use shell::CommandTool;
pub use task_planner::TaskPlannerTool;
pub use weather::WeatherTool;

use crate::config::AppConfig;
use crate::session::SharedSessions;

/// 按配置组装全量工具注册表（固定集合，注册顺序即模型看到的顺序）
pub fn build_registry(cfg: &AppConfig, sessions: SharedSessions) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(ClockTool);
    registry.register(CalculatorTool);
    registry.register(WeatherTool);
    registry.register(FileOpsTool::new(&cfg.app.workspace_root));
    registry.register(CommandTool::new(
        cfg.tools.shell.allowed_commands.clone(),
        cfg.tools.tool_timeout_secs,
    ));
    registry.register(WebSearchTool::new(
        cfg.tools.search.timeout_secs,
        cfg.tools.search.max_results,
    ));
    registry.register(HistorySummaryTool::new(sessions));
    registry.register(TaskPlannerTool);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::HistoryPersistence;
    use crate::session::SessionManager;

    #[test]
    fn test_full_registry_is_fixed_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = SessionManager::bootstrap(HistoryPersistence::new(dir.path().join("h.json")));
        let registry = build_registry(&AppConfig::default(), mgr.shared());
        assert_eq!(
            registry.tool_names(),
            vec![
                "clock",
                "calculator",
                "weather",
                "file_ops",
                "run_command",
                "web_search",
                "history_summary",
                "task_planner",
            ]
        );
    }
}
