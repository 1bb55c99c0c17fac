//! Memory Layer - In-Memory State Management
//!
//! 实现 SessionStore，会话状态只保存在进程内存中

mod session_store;

pub use session_store::InMemorySessionStore;
