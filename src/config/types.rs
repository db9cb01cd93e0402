//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 会话生命周期配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 媒体获取配置
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// 混音规划器配置
    #[serde(default)]
    pub planner: PlannerConfig,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL（用于拼接产物下载地址）
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// 静态文件服务配置（前端托管）
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default = "default_static_enabled")]
    pub enabled: bool,

    /// 静态文件目录
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,

    /// URL 路径前缀（如 "/" 表示根路径托管）
    #[serde(default = "default_static_path")]
    pub path: String,
}

fn default_static_enabled() -> bool {
    false
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("web")
}

fn default_static_path() -> String {
    "/".to_string()
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: default_static_enabled(),
            dir: default_static_dir(),
            path: default_static_path(),
        }
    }
}

/// 会话生命周期配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 会话工作区根目录
    #[serde(default = "default_session_root")]
    pub root_dir: PathBuf,

    /// 空闲过期时间（秒）
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,

    /// 清扫轮询间隔（秒）
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// 每多少个轮询周期做一次磁盘孤儿扫描
    #[serde(default = "default_orphan_scan_cycles")]
    pub orphan_scan_cycles: u64,
}

fn default_session_root() -> PathBuf {
    PathBuf::from("data/sessions")
}

fn default_expire_secs() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    5
}

fn default_orphan_scan_cycles() -> u64 {
    12
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root_dir: default_session_root(),
            expire_secs: default_expire_secs(),
            sweep_interval_secs: default_sweep_interval(),
            orphan_scan_cycles: default_orphan_scan_cycles(),
        }
    }
}

/// 媒体获取配置
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// 来源解析服务（标题/歌手 -> 下载 URL）的基础 URL
    #[serde(default = "default_resolver_url")]
    pub resolver_url: String,

    /// 单次下载超时时间（秒）
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// 最大重试次数
    #[serde(default)]
    pub max_retries: u32,
}

fn default_resolver_url() -> String {
    "http://localhost:8100".to_string()
}

fn default_fetch_timeout() -> u64 {
    120
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            resolver_url: default_resolver_url(),
            timeout_secs: default_fetch_timeout(),
            max_retries: 0,
        }
    }
}

/// 混音规划器（生成式 AI 服务）配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// 规划服务基础 URL
    #[serde(default = "default_planner_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_planner_timeout")]
    pub timeout_secs: u64,

    /// 最大重试次数
    #[serde(default)]
    pub max_retries: u32,
}

fn default_planner_url() -> String {
    "http://localhost:8200".to_string()
}

fn default_planner_timeout() -> u64 {
    120
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            url: default_planner_url(),
            timeout_secs: default_planner_timeout(),
            max_retries: 0,
        }
    }
}

/// 音频配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 拼接时的交叉淡化时长（毫秒）
    #[serde(default = "default_crossfade_ms")]
    pub crossfade_ms: u32,
}

fn default_crossfade_ms() -> u32 {
    3000
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            crossfade_ms: default_crossfade_ms(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5070);
        assert_eq!(config.session.root_dir, PathBuf::from("data/sessions"));
        assert_eq!(config.session.expire_secs, 300);
        assert_eq!(config.session.sweep_interval_secs, 5);
        assert_eq!(config.session.orphan_scan_cycles, 12);
        assert_eq!(config.audio.crossfade_ms, 3000);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5070");
    }

    #[test]
    fn test_public_base_url_replaces_wildcard_host() {
        let config = ServerConfig::default();
        assert_eq!(config.public_base_url(), "http://localhost:5070");

        let config = ServerConfig {
            base_url: Some("https://mix.example.com".to_string()),
            ..ServerConfig::default()
        };
        assert_eq!(config.public_base_url(), "https://mix.example.com");
    }
}
