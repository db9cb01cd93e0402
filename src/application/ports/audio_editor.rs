//! Audio Editor Port - 音频剪辑抽象
//!
//! 裁剪与交叉淡化拼接的外部协作者接口

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::mix::TimeWindow;

/// 剪辑错误
#[derive(Debug, Error)]
pub enum EditError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Nothing to merge")]
    EmptyInput,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Audio Editor Port
#[async_trait]
pub trait AudioEditorPort: Send + Sync {
    /// 按时间窗口裁剪一个音频文件，产物写入 dest_dir，返回产物路径
    async fn trim(
        &self,
        src: &Path,
        window: TimeWindow,
        dest_dir: &Path,
    ) -> Result<PathBuf, EditError>;

    /// 按顺序拼接多个音频文件（固定交叉淡化），产物写入 dest_dir，返回产物路径
    async fn merge(&self, inputs: &[PathBuf], dest_dir: &Path) -> Result<PathBuf, EditError>;
}
