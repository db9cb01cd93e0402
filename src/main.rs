//! Mixdown - 音频混音工作台后端
//!
//! - Domain: mix/ (Bounded Context)
//! - Application: commands, queries, ports
//! - Infrastructure: http, session, adapters

use std::sync::Arc;

use mixdown::config::{load_config, print_config};
use mixdown::infrastructure::adapters::{
    HttpMediaFetcher, HttpMediaFetcherConfig, HttpPlannerClient, HttpPlannerConfig, WavEditor,
    WavEditorConfig,
};
// use mixdown::infrastructure::adapters::FakeMediaFetcher;
use mixdown::infrastructure::http::{AppState, HttpServer, ServerConfig};
use mixdown::infrastructure::session::{DiskSessionManager, ExpirySweeper, SweeperConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},mixdown={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Mixdown - 音频混音工作台");
    print_config(&config);

    // 创建磁盘会话管理器（启动时扫描并接管既有会话目录）
    let session_manager = Arc::new(DiskSessionManager::new(&config.session.root_dir).await?);

    // 启动过期清扫器
    let sweeper = ExpirySweeper::new(
        SweeperConfig {
            poll_interval_secs: config.session.sweep_interval_secs,
            expire_secs: config.session.expire_secs,
            orphan_scan_cycles: config.session.orphan_scan_cycles,
        },
        session_manager.clone(),
    );
    tokio::spawn(sweeper.run());

    // 创建 HTTP 媒体拉取客户端
    let fetcher = Arc::new(HttpMediaFetcher::new(HttpMediaFetcherConfig {
        resolver_url: config.fetcher.resolver_url.clone(),
        timeout_secs: config.fetcher.timeout_secs,
        max_retries: config.fetcher.max_retries,
    })?);

    // // 离线联调用的假拉取器（locate/fetch 不出网，写入固定载荷）
    // let fetcher = Arc::new(FakeMediaFetcher::new(b"RIFF".to_vec()));

    // 创建 WAV 剪辑器
    let editor = Arc::new(WavEditor::new(WavEditorConfig {
        crossfade_ms: config.audio.crossfade_ms,
    }));

    // 创建 HTTP 混音规划客户端
    let planner = Arc::new(HttpPlannerClient::new(HttpPlannerConfig {
        url: config.planner.url.clone(),
        timeout_secs: config.planner.timeout_secs,
        max_retries: config.planner.max_retries,
    })?);

    // 创建 HTTP 服务器
    let mut server_config = ServerConfig::new(&config.server.host, config.server.port);
    if config.server.static_files.enabled {
        server_config = server_config.with_static_files(
            config.server.static_files.path.clone(),
            config.server.static_files.dir.display().to_string(),
        );
    }

    let state = AppState::new(
        session_manager,
        fetcher,
        editor,
        planner,
        config.server.public_base_url(),
    );

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
