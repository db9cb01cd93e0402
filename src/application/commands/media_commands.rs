//! Media Commands - 单体媒体下载命令

/// 下载目标类别，决定产物落到哪个最终目录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// 产物文件名（来源格式对外不透明，按类别固定命名）
    pub fn file_name(&self) -> &'static str {
        match self {
            MediaKind::Video => "video.mp4",
            MediaKind::Audio => "audio.wav",
        }
    }
}

/// 下载单个媒体文件到会话的最终产物目录
#[derive(Debug, Clone)]
pub struct DownloadMediaCommand {
    pub session_id: String,
    pub url: String,
    pub kind: MediaKind,
}

/// 下载响应
#[derive(Debug, Clone)]
pub struct DownloadMediaResponse {
    pub session_id: String,
    pub file_name: String,
}
