//! 活跃会话管理
//!
//! SessionManager 持有历史存储、持久化适配器与活跃会话 id —— 没有任何全局可变状态，
//! 由 main 构造后注入 REPL 与编排层。启动时优先采用磁盘上的会话；
//! 新建会话先落盘旧会话再换 id；清空会话同时删除持久化文件。
//!
//! 持久化是单文件的：任一时刻磁盘上只有当前活跃会话，切换会话会覆盖旧文档。

use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::core::AgentError;
use crate::memory::{HistoryPersistence, HistoryStore, Message};

/// 历史存储 + 活跃会话 id，一把锁保护（history_summary 工具与 REPL 共享）
pub struct SessionState {
    store: HistoryStore,
    active_id: String,
}

impl SessionState {
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// 活跃会话的全部消息（按追加顺序）
    pub fn active_messages(&self) -> Vec<Message> {
        self.store.all(&self.active_id)
    }
}

pub type SharedSessions = Arc<Mutex<SessionState>>;

/// 会话管理器
pub struct SessionManager {
    sessions: SharedSessions,
    persistence: HistoryPersistence,
}

impl SessionManager {
    /// 启动引导：有持久化文档则恢复其 id 与消息，否则生成全新会话
    pub fn bootstrap(persistence: HistoryPersistence) -> Self {
        let mut store = HistoryStore::new();
        let active_id = match persistence.load() {
            Some((id, messages)) => {
                tracing::info!(session = %id, count = messages.len(), "restored persisted session");
                store.replace(&id, messages);
                id
            }
            None => Uuid::new_v4().to_string(),
        };
        // 恢复与否，活跃会话启动后必有定义
        store.get_or_create(&active_id);

        Self {
            sessions: Arc::new(Mutex::new(SessionState { store, active_id })),
            persistence,
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.sessions.lock().expect("session state lock poisoned")
    }

    /// 共享句柄，供需要读历史的工具（history_summary）持有
    pub fn shared(&self) -> SharedSessions {
        Arc::clone(&self.sessions)
    }

    pub fn active_session_id(&self) -> String {
        self.state().active_id.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state().active_messages()
    }

    pub fn message_count(&self) -> usize {
        let state = self.state();
        state.store.len(&state.active_id)
    }

    /// 向活跃会话追加一条消息（内存内；落盘由 flush 负责）
    pub fn append(&self, message: Message) {
        let mut state = self.state();
        let id = state.active_id.clone();
        state.store.append(&id, message);
    }

    /// 将活跃会话写入磁盘（整体覆盖）
    pub fn flush(&self) -> Result<(), AgentError> {
        let (id, messages) = {
            let state = self.state();
            (state.active_id.clone(), state.active_messages())
        };
        self.persistence.save(&id, &messages)
    }

    /// 新建会话：先落盘当前会话，再换成空的新会话，返回新 id
    pub fn new_session(&self) -> String {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "flush before new session failed");
        }
        let new_id = Uuid::new_v4().to_string();
        let mut state = self.state();
        state.active_id = new_id.clone();
        state.store.get_or_create(&new_id);
        new_id
    }

    /// 清空活跃会话并删除持久化文档；重复调用无副作用
    pub fn clear_current(&self) -> Result<(), AgentError> {
        {
            let mut state = self.state();
            let id = state.active_id.clone();
            state.store.clear(&id);
        }
        self.persistence.delete()
    }
}
