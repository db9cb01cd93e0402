//! Mixdown - 音频混音工作台后端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Mix Context: 时间戳、时间窗口、剪辑清单与混音计划
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SessionManager, MediaFetcher, AudioEditor, MixPlanner）
//! - Commands: CQRS 命令处理器（三种混音入口 + 单体媒体下载）
//! - Queries: CQRS 查询处理器（会话产物检索）
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Session: 磁盘会话管理器 + 过期清扫器
//! - Adapters: HTTP 媒体拉取、WAV 剪辑、HTTP 混音规划

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
