//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），
//! 由 ToolRegistry 按名注册与查找。注册表在启动时一次性建好，之后只读；
//! 注册顺序被保留，暴露给模型的工具列表就是注册表的有序投影。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// 工具 trait：名称、描述（供 LLM 理解）、参数 schema、异步执行（args 为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（用于 JSON 中的 "tool" 字段）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema（供 LLM 生成正确的参数格式）
    /// 默认返回空对象，表示无参数
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具；失败以 Err(描述) 返回，由执行器统一转为观察字符串
    async fn execute(&self, args: Value) -> Result<String, String>;
}

/// 工具注册表：按名称存 Arc<dyn Tool>，并记录注册顺序
#[derive(Default)]
pub struct ToolRegistry {
    order: Vec<String>,
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工具；同名重复注册时替换实现但保留原有位置
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String, String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| format!("Unknown tool: {name}"))?;
        tool.execute(args).await
    }

    /// 工具名列表（按注册顺序）
    pub fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// (name, description) 有序列表，用于 /tools 展示与 prompt 中的工具段落
    pub fn descriptors(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name).map(|t| (name.clone(), t.description().to_string())))
            .collect()
    }

    /// 有序生成工具 schema JSON（name / description / parameters）
    pub fn to_schema_json(&self) -> String {
        let tools: Vec<Value> = self
            .order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema()
                })
            })
            .collect();
        serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyTool(&'static str);

    #[async_trait]
    impl Tool for DummyTool {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "dummy"
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut reg = ToolRegistry::new();
        reg.register(DummyTool("charlie"));
        reg.register(DummyTool("alpha"));
        reg.register(DummyTool("bravo"));
        assert_eq!(reg.tool_names(), vec!["charlie", "alpha", "bravo"]);

        // 重复注册不改变位置
        reg.register(DummyTool("alpha"));
        assert_eq!(reg.tool_names(), vec!["charlie", "alpha", "bravo"]);
        assert_eq!(reg.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error() {
        let reg = ToolRegistry::new();
        let err = reg.execute("nope", serde_json::json!({})).await.unwrap_err();
        assert!(err.contains("Unknown tool"));
    }
}
