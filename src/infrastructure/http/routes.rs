//! HTTP Routes
//!
//! API 路由定义
//!
//! API Endpoints:
//! - /api/ping                        GET   健康检查
//! - /api/mix/clips                   POST  按显式剪辑列表合成混音
//! - /api/mix/manifest                POST  按上传 CSV 清单合成混音（multipart）
//! - /api/mix/prompt                  POST  按自然语言描述规划并合成混音
//! - /api/media/video                 POST  下载单个视频到会话
//! - /api/media/audio                 POST  下载单个音频到会话
//! - /api/session/current             GET   查询当前会话簿记（诊断）
//! - /api/session/new                 POST  强制新建会话（诊断）
//! - /api/session/list                GET   列出已注册会话（诊断）
//! - /files/{session_id}/{filename}   GET   下载会话产物
//!
//! 会话令牌通过 X-Session-Id 请求头传递，每个响应体都回带 session_id

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route(
            "/files/:session_id/:filename",
            get(handlers::download_file),
        )
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/mix", mix_routes())
        .nest("/media", media_routes())
        .nest("/session", session_routes())
}

/// Mix 路由
fn mix_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clips", post(handlers::mix_from_clips))
        .route("/manifest", post(handlers::mix_from_manifest))
        .route("/prompt", post(handlers::mix_from_prompt))
}

/// Media 路由
fn media_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/video", post(handlers::download_video))
        .route("/audio", post(handlers::download_audio))
}

/// Session 诊断路由
fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/current", get(handlers::current_session))
        .route("/new", post(handlers::new_session))
        .route("/list", get(handlers::list_sessions))
}
