//! Mix HTTP Handlers - 混音三入口

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use crate::application::{
    MixFromClipsCommand, MixFromManifestCommand, MixFromPromptCommand,
};
use crate::domain::mix::{ClipSource, TimeWindow};
use crate::infrastructure::http::dto::{
    ApiResponse, MixFromClipsRequest, MixFromPromptRequest, MixResultResponse, PromptMixResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::handlers::ensure_session;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Mix from explicit clip list
// ============================================================================

/// 按显式剪辑列表合成混音
pub async fn mix_from_clips(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<MixFromClipsRequest>,
) -> Result<Json<ApiResponse<MixResultResponse>>, ApiError> {
    if req.clips.is_empty() {
        return Err(ApiError::BadRequest("Clip list is empty".to_string()));
    }

    let mut clips = Vec::with_capacity(req.clips.len());
    for clip in &req.clips {
        let window = TimeWindow::parse(&clip.start, &clip.end)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        clips.push(ClipSource {
            url: clip.url.clone(),
            window,
        });
    }

    let session_id = ensure_session(&state, &headers).await?;
    let result = state
        .mix_from_clips_handler
        .handle(MixFromClipsCommand { session_id, clips })
        .await?;

    let file_url = state.artifact_url(&result.session_id, &result.file_name);
    Ok(Json(ApiResponse::success(MixResultResponse {
        session_id: result.session_id,
        file_name: result.file_name,
        file_url,
        clip_count: result.clip_count,
    })))
}

// ============================================================================
// Mix from uploaded manifest
// ============================================================================

/// 按上传的 CSV 清单合成混音
pub async fn mix_from_manifest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<MixResultResponse>>, ApiError> {
    let mut manifest: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name == "file" {
            manifest = Some(
                field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?,
            );
        }
    }

    let manifest =
        manifest.ok_or_else(|| ApiError::BadRequest("Manifest file is required".to_string()))?;

    let session_id = ensure_session(&state, &headers).await?;
    let result = state
        .mix_from_manifest_handler
        .handle(MixFromManifestCommand {
            session_id,
            manifest,
        })
        .await?;

    let file_url = state.artifact_url(&result.session_id, &result.file_name);
    Ok(Json(ApiResponse::success(MixResultResponse {
        session_id: result.session_id,
        file_name: result.file_name,
        file_url,
        clip_count: result.clip_count,
    })))
}

// ============================================================================
// Mix from natural language prompt
// ============================================================================

/// 按自然语言描述规划并合成混音
pub async fn mix_from_prompt(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<MixFromPromptRequest>,
) -> Result<Json<ApiResponse<PromptMixResponse>>, ApiError> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is empty".to_string()));
    }

    let session_id = ensure_session(&state, &headers).await?;
    let result = state
        .mix_from_prompt_handler
        .handle(MixFromPromptCommand {
            session_id,
            prompt: req.prompt,
        })
        .await?;

    let file_url = state.artifact_url(&result.session_id, &result.file_name);
    Ok(Json(ApiResponse::success(PromptMixResponse {
        session_id: result.session_id,
        mix_title: result.mix_title,
        file_name: result.file_name,
        file_url,
        clip_count: result.clip_count,
    })))
}
