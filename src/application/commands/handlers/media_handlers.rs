//! Media Command Handlers - 单体媒体下载

use std::sync::Arc;

use crate::application::commands::media_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{MediaFetcherPort, SessionManagerPort};

/// Download Media Handler - 下载单个媒体文件到最终产物目录
pub struct DownloadMediaHandler {
    sessions: Arc<dyn SessionManagerPort>,
    fetcher: Arc<dyn MediaFetcherPort>,
}

impl DownloadMediaHandler {
    pub fn new(sessions: Arc<dyn SessionManagerPort>, fetcher: Arc<dyn MediaFetcherPort>) -> Self {
        Self { sessions, fetcher }
    }

    pub async fn handle(
        &self,
        cmd: DownloadMediaCommand,
    ) -> Result<DownloadMediaResponse, ApplicationError> {
        let workspace = self.sessions.resolve(&cmd.session_id).await?;

        // 与混音入口一致: 每次请求前清空瞬态与输出子树
        self.sessions.clear_transient(&cmd.session_id).await?;
        self.sessions.clear_outputs(&cmd.session_id).await?;

        let dest_dir = match cmd.kind {
            MediaKind::Video => workspace.video_dl_dir(),
            MediaKind::Audio => workspace.audio_dl_dir(),
        };
        let dest = dest_dir.join(cmd.kind.file_name());

        let path = self.fetcher.fetch(&cmd.url, &dest).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| ApplicationError::internal("Download has no file name"))?;

        tracing::info!(
            session_id = %cmd.session_id,
            kind = ?cmd.kind,
            file_name = %file_name,
            "Media downloaded"
        );

        Ok(DownloadMediaResponse {
            session_id: cmd.session_id,
            file_name,
        })
    }
}
