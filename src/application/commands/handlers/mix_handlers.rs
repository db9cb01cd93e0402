//! Mix Command Handlers - 混音生产流水线
//!
//! 三条入口共用同一条流水线: 清空瞬态/输出子树 -> 逐个获取素材 ->
//! 按窗口裁剪 -> 交叉淡化拼接 -> 返回产物文件名
//!
//! 同一会话的并发混音请求不做串行化（接受的权衡）:
//! 后到的请求会清掉先到请求尚在使用的文件，先到者以错误告终

use std::sync::Arc;

use crate::application::commands::mix_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioEditorPort, MediaFetcherPort, MixPlannerPort, SessionManagerPort,
};
use crate::domain::mix::{parse_manifest, ClipSource};

/// 共用流水线
async fn assemble_mix(
    sessions: &Arc<dyn SessionManagerPort>,
    fetcher: &Arc<dyn MediaFetcherPort>,
    editor: &Arc<dyn AudioEditorPort>,
    session_id: &str,
    clips: &[ClipSource],
) -> Result<String, ApplicationError> {
    if clips.is_empty() {
        return Err(ApplicationError::validation("No clips provided"));
    }

    let workspace = sessions.resolve(session_id).await?;

    // 重跑前清掉上一次的中间产物与输出
    sessions.clear_transient(session_id).await?;
    sessions.clear_outputs(session_id).await?;

    let mut trimmed = Vec::with_capacity(clips.len());
    for (index, clip) in clips.iter().enumerate() {
        let dest = workspace.temp_dir().join(format!("{}.wav", index));
        let fetched = fetcher.fetch(&clip.url, &dest).await?;

        tracing::debug!(
            session_id = %session_id,
            index = index,
            window = %clip.window,
            "Clip fetched"
        );

        let piece = editor
            .trim(&fetched, clip.window, &workspace.split_dir())
            .await?;
        trimmed.push(piece);
    }

    let merged = editor.merge(&trimmed, &workspace.output_dir()).await?;
    let file_name = merged
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| ApplicationError::internal("Merged output has no file name"))?;

    tracing::info!(
        session_id = %session_id,
        clip_count = clips.len(),
        file_name = %file_name,
        "Mix assembled"
    );

    Ok(file_name)
}

/// Mix From Clips Handler - 显式剪辑列表入口
pub struct MixFromClipsHandler {
    sessions: Arc<dyn SessionManagerPort>,
    fetcher: Arc<dyn MediaFetcherPort>,
    editor: Arc<dyn AudioEditorPort>,
}

impl MixFromClipsHandler {
    pub fn new(
        sessions: Arc<dyn SessionManagerPort>,
        fetcher: Arc<dyn MediaFetcherPort>,
        editor: Arc<dyn AudioEditorPort>,
    ) -> Self {
        Self {
            sessions,
            fetcher,
            editor,
        }
    }

    pub async fn handle(&self, cmd: MixFromClipsCommand) -> Result<MixResponse, ApplicationError> {
        let file_name = assemble_mix(
            &self.sessions,
            &self.fetcher,
            &self.editor,
            &cmd.session_id,
            &cmd.clips,
        )
        .await?;

        Ok(MixResponse {
            session_id: cmd.session_id,
            file_name,
            clip_count: cmd.clips.len(),
        })
    }
}

/// Mix From Manifest Handler - CSV 清单入口
pub struct MixFromManifestHandler {
    sessions: Arc<dyn SessionManagerPort>,
    fetcher: Arc<dyn MediaFetcherPort>,
    editor: Arc<dyn AudioEditorPort>,
}

impl MixFromManifestHandler {
    pub fn new(
        sessions: Arc<dyn SessionManagerPort>,
        fetcher: Arc<dyn MediaFetcherPort>,
        editor: Arc<dyn AudioEditorPort>,
    ) -> Self {
        Self {
            sessions,
            fetcher,
            editor,
        }
    }

    pub async fn handle(
        &self,
        cmd: MixFromManifestCommand,
    ) -> Result<MixResponse, ApplicationError> {
        let workspace = self.sessions.resolve(&cmd.session_id).await?;

        // 清单先落盘到 csv/ 暂存区，再解析
        let staged = workspace.manifest_dir().join("upload.csv");
        tokio::fs::write(&staged, cmd.manifest.as_bytes())
            .await
            .map_err(|e| ApplicationError::internal(format!("Failed to stage manifest: {}", e)))?;

        let clips = parse_manifest(&cmd.manifest)?;

        let file_name = assemble_mix(
            &self.sessions,
            &self.fetcher,
            &self.editor,
            &cmd.session_id,
            &clips,
        )
        .await?;

        Ok(MixResponse {
            session_id: cmd.session_id,
            file_name,
            clip_count: clips.len(),
        })
    }
}

/// Mix From Prompt Handler - 生成式规划入口
pub struct MixFromPromptHandler {
    sessions: Arc<dyn SessionManagerPort>,
    fetcher: Arc<dyn MediaFetcherPort>,
    editor: Arc<dyn AudioEditorPort>,
    planner: Arc<dyn MixPlannerPort>,
}

impl MixFromPromptHandler {
    pub fn new(
        sessions: Arc<dyn SessionManagerPort>,
        fetcher: Arc<dyn MediaFetcherPort>,
        editor: Arc<dyn AudioEditorPort>,
        planner: Arc<dyn MixPlannerPort>,
    ) -> Self {
        Self {
            sessions,
            fetcher,
            editor,
            planner,
        }
    }

    pub async fn handle(
        &self,
        cmd: MixFromPromptCommand,
    ) -> Result<MixFromPromptResponse, ApplicationError> {
        if cmd.prompt.trim().is_empty() {
            return Err(ApplicationError::validation("Prompt cannot be empty"));
        }

        let plan = self.planner.plan(&cmd.prompt).await?;
        if plan.clips.is_empty() {
            return Err(ApplicationError::ExternalServiceError(
                "Planner returned an empty song list".to_string(),
            ));
        }

        tracing::info!(
            session_id = %cmd.session_id,
            mix_title = %plan.title,
            clip_count = plan.clips.len(),
            "Mix planned"
        );

        // 规划结果只有标题/歌手，逐个解析成可下载的来源 URL
        let mut clips = Vec::with_capacity(plan.clips.len());
        for planned in &plan.clips {
            let url = self.fetcher.locate(&planned.title, &planned.artist).await?;
            clips.push(ClipSource::new(url, planned.window));
        }

        let file_name = assemble_mix(
            &self.sessions,
            &self.fetcher,
            &self.editor,
            &cmd.session_id,
            &clips,
        )
        .await?;

        Ok(MixFromPromptResponse {
            session_id: cmd.session_id,
            file_name,
            clip_count: clips.len(),
            mix_title: plan.title,
        })
    }
}
