//! 核心类型：全局错误枚举

pub mod error;

pub use error::AgentError;
