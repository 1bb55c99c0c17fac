//! Melo - 语音控制的音乐播放器后端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Music Context: 音乐文件、上传策略
//! - Voice Context: 语音指令匹配、指令映射
//! - Session: 会话标识
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SessionStore, AudioStorage, SpeechRecognizer, Repositories）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful JSON API + 会话中间件
//! - Memory: 内存会话存储
//! - Worker: 语音转写与过期会话回收
//! - Persistence: SQLite + Sled 存储
//! - Adapters: 文件存储、时长探测、语音采集、语音识别客户端

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
