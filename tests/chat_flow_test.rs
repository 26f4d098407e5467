//! 聊天回合集成测试
//!
//! 用 Mock / 故障 LLM 驱动完整回合：工具派发、迭代上限、后端错误折叠、
//! 会话落盘与恢复。不触网。

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use wasp::config::AppConfig;
    use wasp::llm::{LlmClient, MockLlmClient};
    use wasp::memory::{HistoryPersistence, Message, Role};
    use wasp::orchestrator::{Agent, MAX_TOOL_STEPS};
    use wasp::session::SessionManager;
    use wasp::tools::build_registry;

    /// 永远失败的后端（模拟网络故障）
    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
            Err("connection refused".to_string())
        }
    }

    fn harness(llm: Arc<dyn LlmClient>) -> (tempfile::TempDir, SessionManager, Agent) {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::default();
        cfg.app.workspace_root = dir.path().to_path_buf();
        let sessions =
            SessionManager::bootstrap(HistoryPersistence::new(dir.path().join("history.json")));
        let registry = build_registry(&cfg, sessions.shared());
        let agent = Agent::new(llm, registry, "You are a test assistant.", 5);
        (dir, sessions, agent)
    }

    #[tokio::test]
    async fn test_tool_dispatch_then_final_answer() {
        let llm = Arc::new(MockLlmClient::with_script(vec![
            r#"{"tool": "calculator", "args": {"expression": "15 * 23 + 7"}}"#.to_string(),
            "The result is 352.".to_string(),
        ]));
        let (_dir, sessions, agent) = harness(llm);

        let reply = agent.chat(&sessions, "what is 15 * 23 + 7?").await;
        assert_eq!(reply, "The result is 352.");

        // 历史只记录用户输入与最终回答，不含中间工具交互
        let messages = sessions.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "what is 15 * 23 + 7?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "The result is 352.");
    }

    #[tokio::test]
    async fn test_runaway_tool_loop_hits_the_cap() {
        // 后端每次都要求再调一次工具，回合必须在上限处收口
        let llm = Arc::new(MockLlmClient::repeating(
            r#"{"tool": "clock", "args": {}}"#.to_string(),
        ));
        let (_dir, sessions, agent) = harness(llm);

        let reply = agent.chat(&sessions, "loop forever please").await;
        assert!(
            reply.contains(&format!("within {} tool calls", MAX_TOOL_STEPS)),
            "got: {reply}"
        );

        // 回合正常落账，对话可以继续
        assert_eq!(sessions.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_assistant_message() {
        let (_dir, sessions, agent) = harness(Arc::new(FailingLlm));

        let reply = agent.chat(&sessions, "hello?").await;
        assert!(reply.starts_with("Error:"), "got: {reply}");
        assert!(reply.contains("connection refused"));

        let messages = sessions.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, reply);
    }

    #[tokio::test]
    async fn test_malformed_tool_call_gets_one_more_chance() {
        let llm = Arc::new(MockLlmClient::with_script(vec![
            r#"{"tool": "clock", "args":"#.to_string(), // 截断的 JSON
            "Recovered fine.".to_string(),
        ]));
        let (_dir, sessions, agent) = harness(llm);

        let reply = agent.chat(&sessions, "first try breaks").await;
        assert_eq!(reply, "Recovered fine.");
    }

    #[tokio::test]
    async fn test_turn_is_persisted_and_survives_restart() {
        let llm = Arc::new(MockLlmClient::with_script(vec!["Hi there.".to_string()]));
        let dir = tempfile::tempdir().unwrap();
        let history_path = dir.path().join("history.json");
        let id;
        {
            let mut cfg = AppConfig::default();
            cfg.app.workspace_root = dir.path().to_path_buf();
            let sessions = SessionManager::bootstrap(HistoryPersistence::new(&history_path));
            id = sessions.active_session_id();
            let registry = build_registry(&cfg, sessions.shared());
            let agent = Agent::new(llm, registry, "sys", 5);
            agent.chat(&sessions, "hello").await;
        }

        // 重启：同一路径引导出同一会话与同序消息
        let restored = SessionManager::bootstrap(HistoryPersistence::new(&history_path));
        assert_eq!(restored.active_session_id(), id);
        let pairs: Vec<(Role, String)> = restored
            .messages()
            .into_iter()
            .map(|m| (m.role, m.content))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (Role::User, "hello".to_string()),
                (Role::Assistant, "Hi there.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_observation_feeds_the_next_model_call() {
        // 第二次模型调用的消息里应当带上 calculator 的观察结果；
        // Mock 脚本耗尽后会回显最后一条用户消息，借此断言
        let llm = Arc::new(MockLlmClient::with_script(vec![
            r#"{"tool": "calculator", "args": {"expression": "2+2"}}"#.to_string(),
        ]));
        let (_dir, sessions, agent) = harness(llm);

        let reply = agent.chat(&sessions, "add it up").await;
        assert!(
            reply.contains("Observation from calculator: 4"),
            "got: {reply}"
        );
    }
}
