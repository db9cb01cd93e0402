//! Fake Media Fetcher - 用于测试的媒体获取器
//!
//! 不发起网络请求，locate 返回固定 URL，fetch 把固定字节写到目标路径

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::application::ports::{FetchError, MediaFetcherPort};

/// Fake Media Fetcher
pub struct FakeMediaFetcher {
    /// fetch 时写入的固定内容
    payload: Vec<u8>,
}

impl FakeMediaFetcher {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl MediaFetcherPort for FakeMediaFetcher {
    async fn locate(&self, title: &str, artist: &str) -> Result<String, FetchError> {
        Ok(format!(
            "fake://{}/{}",
            title.replace(' ', "-"),
            artist.replace(' ', "-")
        ))
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<PathBuf, FetchError> {
        tracing::debug!(url = %url, dest = ?dest, "FakeMediaFetcher: writing fixed payload");

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchError::IoError(e.to_string()))?;
        }
        tokio::fs::write(dest, &self.payload)
            .await
            .map_err(|e| FetchError::IoError(e.to_string()))?;

        Ok(dest.to_path_buf())
    }
}
