//! Mix Commands - 混音生产命令

use crate::domain::mix::ClipSource;

/// 按显式剪辑列表生产混音
#[derive(Debug, Clone)]
pub struct MixFromClipsCommand {
    pub session_id: String,
    pub clips: Vec<ClipSource>,
}

/// 按上传的 CSV 清单生产混音
#[derive(Debug, Clone)]
pub struct MixFromManifestCommand {
    pub session_id: String,
    /// 清单原始内容，由处理器暂存到工作区 csv/ 下再解析
    pub manifest: String,
}

/// 按自然语言提示词生产混音
#[derive(Debug, Clone)]
pub struct MixFromPromptCommand {
    pub session_id: String,
    pub prompt: String,
}

/// 混音生产响应
#[derive(Debug, Clone)]
pub struct MixResponse {
    pub session_id: String,
    /// 最终产物文件名（位于 static/output 下）
    pub file_name: String,
    pub clip_count: usize,
}

/// 提示词混音响应（额外带上规划器起的标题）
#[derive(Debug, Clone)]
pub struct MixFromPromptResponse {
    pub session_id: String,
    pub file_name: String,
    pub clip_count: usize,
    pub mix_title: String,
}
