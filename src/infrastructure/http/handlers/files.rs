//! File Download Handler - 会话产物下载

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::GetArtifactQuery;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 下载会话下的产物文件
///
/// 按 video_dl → audio_dl → output 的顺序在产物目录中检索文件名
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path((session_id, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let query = GetArtifactQuery {
        session_id,
        filename,
    };

    let result = state.get_artifact_handler.handle(query).await?;
    let artifact_path = result.path;

    // 打开文件
    let file = tokio::fs::File::open(&artifact_path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open artifact: {}", e)))?;

    // 获取文件大小
    let metadata = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get file metadata: {}", e)))?;
    let file_size = metadata.len();

    // 检测 Content-Type
    let content_type = match artifact_path.extension().and_then(|e| e.to_str()) {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    };

    let file_name = artifact_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download")
        .to_string();

    // 流式返回文件内容
    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))?)
}
