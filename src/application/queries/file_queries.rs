//! File Queries - 产物检索

use std::path::PathBuf;

/// 按会话 + 文件名检索最终产物
#[derive(Debug, Clone)]
pub struct GetArtifactQuery {
    pub session_id: String,
    pub filename: String,
}

/// 产物检索响应
#[derive(Debug, Clone)]
pub struct GetArtifactResponse {
    pub path: PathBuf,
}
