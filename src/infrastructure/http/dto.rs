//! Data Transfer Objects

use serde::{Deserialize, Serialize};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    #[allow(dead_code)]
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Mix DTOs
// ============================================================================

/// 单个音频片段：来源地址与时间窗口
#[derive(Debug, Deserialize)]
pub struct ClipRequest {
    pub url: String,
    /// 起始时间，支持 SS / MM:SS / HH:MM:SS
    pub start: String,
    /// 结束时间，格式同上
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct MixFromClipsRequest {
    pub clips: Vec<ClipRequest>,
}

#[derive(Debug, Deserialize)]
pub struct MixFromPromptRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct MixResultResponse {
    pub session_id: String,
    pub file_name: String,
    pub file_url: String,
    pub clip_count: usize,
}

#[derive(Debug, Serialize)]
pub struct PromptMixResponse {
    pub session_id: String,
    pub mix_title: String,
    pub file_name: String,
    pub file_url: String,
    pub clip_count: usize,
}

// ============================================================================
// Media DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DownloadMediaRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct MediaResultResponse {
    pub session_id: String,
    pub file_name: String,
    pub file_url: String,
}

// ============================================================================
// Session DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub created_at: String,
    pub last_accessed: String,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub total: usize,
    pub sessions: Vec<SessionResponse>,
}
