//! HTTP Handlers

mod files;
mod media;
mod mix;
mod ping;
mod session;

pub use files::*;
pub use media::*;
pub use mix::*;
pub use ping::*;
pub use session::*;

use axum::http::HeaderMap;
use std::sync::Arc;

use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 客户端携带会话令牌的请求头
pub const SESSION_HEADER: &str = "X-Session-Id";

/// 从请求头提取会话令牌
pub(crate) fn session_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
}

/// 解析请求对应的会话：令牌有效则复用（含落盘恢复），否则新建
pub(crate) async fn ensure_session(
    state: &Arc<AppState>,
    headers: &HeaderMap,
) -> Result<String, ApiError> {
    if let Some(id) = session_header(headers) {
        match state.session_manager.resolve(id).await {
            Ok(workspace) => return Ok(workspace.id().to_string()),
            Err(e) => {
                tracing::debug!(session_id = %id, error = %e, "Stale session token, creating new session");
            }
        }
    }

    let workspace = state
        .session_manager
        .create()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create session: {}", e)))?;
    Ok(workspace.id().to_string())
}
