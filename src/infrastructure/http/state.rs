//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    DownloadMediaHandler, MixFromClipsHandler, MixFromManifestHandler, MixFromPromptHandler,
    // Query handlers
    GetArtifactHandler,
    // Ports
    AudioEditorPort, MediaFetcherPort, MixPlannerPort, SessionManagerPort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub session_manager: Arc<dyn SessionManagerPort>,
    pub fetcher: Arc<dyn MediaFetcherPort>,
    pub editor: Arc<dyn AudioEditorPort>,
    pub planner: Arc<dyn MixPlannerPort>,

    // ========== Command Handlers ==========
    pub mix_from_clips_handler: MixFromClipsHandler,
    pub mix_from_manifest_handler: MixFromManifestHandler,
    pub mix_from_prompt_handler: MixFromPromptHandler,
    pub download_media_handler: DownloadMediaHandler,

    // ========== Query Handlers ==========
    pub get_artifact_handler: GetArtifactHandler,

    /// 对外可达的基地址，用于拼接产物下载链接
    pub public_base_url: String,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        fetcher: Arc<dyn MediaFetcherPort>,
        editor: Arc<dyn AudioEditorPort>,
        planner: Arc<dyn MixPlannerPort>,
        public_base_url: String,
    ) -> Self {
        Self {
            // Ports
            session_manager: session_manager.clone(),
            fetcher: fetcher.clone(),
            editor: editor.clone(),
            planner: planner.clone(),

            // Command handlers
            mix_from_clips_handler: MixFromClipsHandler::new(
                session_manager.clone(),
                fetcher.clone(),
                editor.clone(),
            ),
            mix_from_manifest_handler: MixFromManifestHandler::new(
                session_manager.clone(),
                fetcher.clone(),
                editor.clone(),
            ),
            mix_from_prompt_handler: MixFromPromptHandler::new(
                session_manager.clone(),
                fetcher.clone(),
                editor.clone(),
                planner.clone(),
            ),
            download_media_handler: DownloadMediaHandler::new(
                session_manager.clone(),
                fetcher.clone(),
            ),

            // Query handlers
            get_artifact_handler: GetArtifactHandler::new(session_manager.clone()),

            public_base_url,
        }
    }

    /// 拼接某会话下产物文件的下载地址
    pub fn artifact_url(&self, session_id: &str, file_name: &str) -> String {
        format!(
            "{}/files/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            session_id,
            file_name
        )
    }
}
