//! Media Fetcher Port - 媒体获取抽象
//!
//! "给定来源定位符，产出本地音频文件"的外部协作者接口

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 媒体获取错误
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Media Fetcher Port
#[async_trait]
pub trait MediaFetcherPort: Send + Sync {
    /// 根据标题与歌手解析出可下载的来源 URL
    async fn locate(&self, title: &str, artist: &str) -> Result<String, FetchError>;

    /// 把来源 URL 的内容下载到目标路径，返回实际写入的路径
    async fn fetch(&self, url: &str, dest: &Path) -> Result<PathBuf, FetchError>;
}
