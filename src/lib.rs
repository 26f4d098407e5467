//! Wasp - Rust 个人聊天助手
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 共享错误类型
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **memory**: 会话消息、历史存储与 JSON 持久化
//! - **orchestrator**: Planner 与工具调度回路（compose -> call -> dispatch -> loop）
//! - **session**: 活跃会话管理（启动加载 / 新建 / 清空 / 落盘）
//! - **tools**: 工具箱（clock、calculator、weather、file_ops、run_command、
//!   web_search、history_summary、task_planner）与执行器
//! - **repl**: rustyline 交互式命令行（斜杠命令 + 聊天）

pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod orchestrator;
pub mod repl;
pub mod session;
pub mod tools;
