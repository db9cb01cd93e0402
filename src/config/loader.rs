//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `MIXDOWN_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `MIXDOWN_SERVER__PORT=8080`
/// - `MIXDOWN_SESSION__ROOT_DIR=/data/sessions`
/// - `MIXDOWN_SESSION__EXPIRE_SECS=600`
/// - `MIXDOWN_PLANNER__URL=http://planner:8200`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("session.root_dir", "data/sessions")?
        .set_default("session.expire_secs", 300)?
        .set_default("session.sweep_interval_secs", 5)?
        .set_default("session.orphan_scan_cycles", 12)?
        .set_default("fetcher.resolver_url", "http://localhost:8100")?
        .set_default("fetcher.timeout_secs", 120)?
        .set_default("fetcher.max_retries", 0)?
        .set_default("planner.url", "http://localhost:8200")?
        .set_default("planner.timeout_secs", 120)?
        .set_default("planner.max_retries", 0)?
        .set_default("audio.crossfade_ms", 3000)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: MIXDOWN_
    // 层级分隔符: __ (双下划线)
    // 例如: MIXDOWN_SESSION__EXPIRE_SECS=600
    builder = builder.add_source(
        Environment::with_prefix("MIXDOWN")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // 验证端口范围
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    // 验证会话配置
    if config.session.root_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Session root dir cannot be empty".to_string(),
        ));
    }
    if config.session.expire_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Session expire time cannot be 0".to_string(),
        ));
    }
    if config.session.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Sweep interval cannot be 0".to_string(),
        ));
    }
    if config.session.orphan_scan_cycles == 0 {
        return Err(ConfigError::ValidationError(
            "Orphan scan cycle count cannot be 0".to_string(),
        ));
    }

    // 验证外部服务 URL
    if config.fetcher.resolver_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Fetcher resolver URL cannot be empty".to_string(),
        ));
    }
    if config.planner.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Planner URL cannot be empty".to_string(),
        ));
    }

    // 交叉淡化超过一分钟基本是配置笔误
    if config.audio.crossfade_ms > 60_000 {
        return Err(ConfigError::ValidationError(
            "Crossfade must be at most 60000ms".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Session Root: {:?}", config.session.root_dir);
    tracing::info!("Session Expire: {}s", config.session.expire_secs);
    tracing::info!("Sweep Interval: {}s", config.session.sweep_interval_secs);
    tracing::info!("Orphan Scan Every: {} cycles", config.session.orphan_scan_cycles);
    tracing::info!("Resolver URL: {}", config.fetcher.resolver_url);
    tracing::info!("Planner URL: {}", config.planner.url);
    tracing::info!("Crossfade: {}ms", config.audio.crossfade_ms);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5070);
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_expire() {
        let mut config = AppConfig::default();
        config.session.expire_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_sweep_interval() {
        let mut config = AppConfig::default();
        config.session.sweep_interval_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_absurd_crossfade() {
        let mut config = AppConfig::default();
        config.audio.crossfade_ms = 120_000;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_planner_url() {
        let mut config = AppConfig::default();
        config.planner.url = String::new();
        assert!(validate_config(&config).is_err());
    }
}
