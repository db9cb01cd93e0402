//! Session Handlers - 会话诊断接口

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, SessionListResponse, SessionResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::handlers::session_header;
use crate::infrastructure::http::state::AppState;

/// 查询当前会话的簿记信息
pub async fn current_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let id = session_header(&headers)
        .ok_or_else(|| ApiError::BadRequest("Missing X-Session-Id header".to_string()))?;

    let session = state
        .session_manager
        .get_session(id)
        .ok_or_else(|| ApiError::NotFound(format!("Session not found: {}", id)))?;

    Ok(Json(ApiResponse::success(SessionResponse {
        session_id: session.id,
        created_at: session.created_at.to_rfc3339(),
        last_accessed: session.last_accessed.to_rfc3339(),
    })))
}

/// 强制新建会话
pub async fn new_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let workspace = state
        .session_manager
        .create()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create session: {}", e)))?;

    let session = state
        .session_manager
        .get_session(workspace.id())
        .ok_or_else(|| ApiError::Internal("Session vanished after create".to_string()))?;

    Ok(Json(ApiResponse::success(SessionResponse {
        session_id: session.id,
        created_at: session.created_at.to_rfc3339(),
        last_accessed: session.last_accessed.to_rfc3339(),
    })))
}

/// 列出已注册的会话
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<SessionListResponse>> {
    let mut sessions: Vec<SessionResponse> = state
        .session_manager
        .list_sessions()
        .iter()
        .filter_map(|id| state.session_manager.get_session(id))
        .map(|s| SessionResponse {
            session_id: s.id,
            created_at: s.created_at.to_rfc3339(),
            last_accessed: s.last_accessed.to_rfc3339(),
        })
        .collect();
    sessions.sort_by(|a, b| a.session_id.cmp(&b.session_id));

    Json(ApiResponse::success(SessionListResponse {
        total: sessions.len(),
        sessions,
    }))
}
