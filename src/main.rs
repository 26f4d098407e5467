//! Wasp - Rust 个人聊天助手
//!
//! 入口：初始化日志与配置，构建 LLM 后端、工具注册表、会话管理器与 Agent，
//! 然后把控制权交给 REPL 主循环。

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wasp::config::{load_config, AppConfig};
use wasp::llm::create_llm_from_config;
use wasp::memory::HistoryPersistence;
use wasp::orchestrator::{load_system_prompt, Agent};
use wasp::repl::Repl;
use wasp::session::SessionManager;
use wasp::tools::build_registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 warn（保持 REPL 输出干净），可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    // 凭证缺失在这里硬失败（除非配置显式允许 Mock），不会带着坏后端进入对话
    let llm = create_llm_from_config(&cfg).context("LLM backend init failed")?;

    let sessions = SessionManager::bootstrap(HistoryPersistence::new(&cfg.app.history_file));
    let registry = build_registry(&cfg, sessions.shared());
    let agent = Agent::new(
        llm,
        registry,
        &load_system_prompt(),
        cfg.tools.tool_timeout_secs,
    );

    let model_label = format!("{} ({})", cfg.llm.model, cfg.llm.provider);
    let mut repl = Repl::new(agent, sessions, model_label);
    repl.run().await
}
