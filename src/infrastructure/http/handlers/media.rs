//! Media HTTP Handlers - 单体媒体下载

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::application::{DownloadMediaCommand, MediaKind};
use crate::infrastructure::http::dto::{ApiResponse, DownloadMediaRequest, MediaResultResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::handlers::ensure_session;
use crate::infrastructure::http::state::AppState;

async fn download_media(
    state: Arc<AppState>,
    headers: HeaderMap,
    req: DownloadMediaRequest,
    kind: MediaKind,
) -> Result<Json<ApiResponse<MediaResultResponse>>, ApiError> {
    if req.url.trim().is_empty() {
        return Err(ApiError::BadRequest("URL is required".to_string()));
    }

    let session_id = ensure_session(&state, &headers).await?;
    let result = state
        .download_media_handler
        .handle(DownloadMediaCommand {
            session_id,
            url: req.url,
            kind,
        })
        .await?;

    let file_url = state.artifact_url(&result.session_id, &result.file_name);
    Ok(Json(ApiResponse::success(MediaResultResponse {
        session_id: result.session_id,
        file_name: result.file_name,
        file_url,
    })))
}

/// 下载视频到会话产物目录
pub async fn download_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<DownloadMediaRequest>,
) -> Result<Json<ApiResponse<MediaResultResponse>>, ApiError> {
    download_media(state, headers, req, MediaKind::Video).await
}

/// 下载音频到会话产物目录
pub async fn download_audio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<DownloadMediaRequest>,
) -> Result<Json<ApiResponse<MediaResultResponse>>, ApiError> {
    download_media(state, headers, req, MediaKind::Audio).await
}
