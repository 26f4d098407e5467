//! 记忆层：会话消息类型、按会话的历史存储、JSON 文件持久化

pub mod conversation;
pub mod history;
pub mod persistence;

pub use conversation::{Message, Role};
pub use history::HistoryStore;
pub use persistence::HistoryPersistence;
