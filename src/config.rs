//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件（若存在），再用环境变量 `WASP__*` 覆盖
//! （双下划线表示嵌套，如 `WASP__LLM__MODEL=gpt-4o`）。所有键都有默认值，
//! 无配置文件时开箱即用。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub tools: ToolsSection,
}

/// [app] 段：历史文件路径与文件工具工作目录
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// 会话持久化文件（单文件，整体覆盖写）
    pub history_file: PathBuf,
    /// file_ops 工具的根目录，所有路径必须落在其下
    pub workspace_root: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            history_file: PathBuf::from("chat_history.json"),
            workspace_root: PathBuf::from("."),
        }
    }
}

/// [llm] 段：后端选择
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai（任意 OpenAI 兼容端点）/ mock
    pub provider: String,
    pub model: String,
    /// 兼容端点地址；None 时用官方默认
    pub base_url: Option<String>,
    /// 未设置 API Key 时是否允许回退到 Mock 后端（显式运维选择，默认否）
    pub allow_mock: bool,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            allow_mock: false,
        }
    }
}

/// [tools] 段：工具超时、Shell 白名单、搜索参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
    pub shell: ShellSection,
    pub search: SearchSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 10,
            shell: ShellSection::default(),
            search: SearchSection::default(),
        }
    }
}

/// [tools.shell] 段：允许执行的命令名（仅首词）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    pub allowed_commands: Vec<String>,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            allowed_commands: vec![
                "ls".into(),
                "pwd".into(),
                "date".into(),
                "whoami".into(),
                "echo".into(),
                "cat".into(),
                "head".into(),
                "tail".into(),
            ],
        }
    }
}

/// [tools.search] 段：Web 搜索超时与结果条数上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub timeout_secs: u64,
    pub max_results: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_results: 5,
        }
    }
}

/// 从 config 目录加载配置，环境变量 WASP__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 WASP__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("WASP")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
