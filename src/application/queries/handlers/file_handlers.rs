//! File Query Handlers - 产物检索

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::SessionManagerPort;
use crate::application::queries::file_queries::{GetArtifactQuery, GetArtifactResponse};

/// Get Artifact Handler
///
/// 只检索三个最终产物目录（video_dl、audio_dl、output），顺序固定，
/// 第一个命中者胜出；会话解析本身会刷新最后访问时间
pub struct GetArtifactHandler {
    sessions: Arc<dyn SessionManagerPort>,
}

impl GetArtifactHandler {
    pub fn new(sessions: Arc<dyn SessionManagerPort>) -> Self {
        Self { sessions }
    }

    pub async fn handle(
        &self,
        query: GetArtifactQuery,
    ) -> Result<GetArtifactResponse, ApplicationError> {
        // 路径穿越防护: 文件名不允许分隔符或父目录引用
        if query.filename.is_empty()
            || query.filename.contains('/')
            || query.filename.contains('\\')
            || query.filename.contains("..")
        {
            return Err(ApplicationError::validation(format!(
                "Invalid filename: {}",
                query.filename
            )));
        }

        let workspace = self.sessions.resolve(&query.session_id).await?;

        for candidate in workspace.artifact_candidates(&query.filename) {
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Ok(GetArtifactResponse { path: candidate });
            }
        }

        Err(ApplicationError::not_found("File", query.filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::session::DiskSessionManager;
    use tempfile::tempdir;

    async fn setup(temp: &std::path::Path) -> (GetArtifactHandler, crate::application::ports::Workspace) {
        let sessions = Arc::new(DiskSessionManager::new(temp).await.unwrap());
        let ws = sessions.create().await.unwrap();
        (GetArtifactHandler::new(sessions), ws)
    }

    #[tokio::test]
    async fn test_traversal_filenames_are_rejected() {
        let temp = tempdir().unwrap();
        let (handler, ws) = setup(temp.path()).await;

        for bad in ["", "../secret", "a/b.wav", "a\\b.wav"] {
            let result = handler
                .handle(GetArtifactQuery {
                    session_id: ws.id().to_string(),
                    filename: bad.to_string(),
                })
                .await;
            assert!(
                matches!(result, Err(ApplicationError::ValidationError(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_search_order_prefers_video_dir() {
        let temp = tempdir().unwrap();
        let (handler, ws) = setup(temp.path()).await;

        // 同名文件出现在两个产物目录时，video_dl 优先
        std::fs::write(ws.video_dl_dir().join("take.wav"), b"v").unwrap();
        std::fs::write(ws.output_dir().join("take.wav"), b"o").unwrap();

        let found = handler
            .handle(GetArtifactQuery {
                session_id: ws.id().to_string(),
                filename: "take.wav".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(found.path, ws.video_dl_dir().join("take.wav"));
    }

    #[tokio::test]
    async fn test_missing_artifact_is_not_found() {
        let temp = tempdir().unwrap();
        let (handler, ws) = setup(temp.path()).await;

        let result = handler
            .handle(GetArtifactQuery {
                session_id: ws.id().to_string(),
                filename: "nope.wav".to_string(),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }
}
