//! Configuration - 配置模块
//!
//! 类型定义 + 多源加载

mod loader;
mod types;

pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use types::{
    AppConfig, AudioConfig, FetcherConfig, LogConfig, PlannerConfig, ServerConfig, SessionConfig,
    StaticFilesConfig,
};
