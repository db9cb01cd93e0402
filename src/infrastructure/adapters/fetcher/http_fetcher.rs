//! HTTP Media Fetcher - 调用外部媒体服务
//!
//! 实现 MediaFetcherPort trait:
//! - 来源解析: GET {resolver_url}/api/resolve?q={title} {artist}
//!   Response: {"url": "..."} (JSON)，无结果时 url 为 null
//! - 下载: 对来源 URL 做流式 GET，边收边写入目标文件

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{FetchError, MediaFetcherPort};

/// 解析服务响应体 (JSON)
#[derive(Debug, Deserialize)]
struct ResolveResponse {
    url: Option<String>,
}

/// HTTP Media Fetcher 配置
#[derive(Debug, Clone)]
pub struct HttpMediaFetcherConfig {
    /// 来源解析服务基础 URL
    pub resolver_url: String,
    /// 单个请求超时时间（秒）
    pub timeout_secs: u64,
    /// 最大重试次数
    pub max_retries: u32,
}

impl Default for HttpMediaFetcherConfig {
    fn default() -> Self {
        Self {
            resolver_url: "http://localhost:8100".to_string(),
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

/// HTTP Media Fetcher
pub struct HttpMediaFetcher {
    client: Client,
    config: HttpMediaFetcherConfig,
}

impl HttpMediaFetcher {
    /// 创建新的 HTTP Media Fetcher
    pub fn new(config: HttpMediaFetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取解析 URL
    fn resolve_url(&self) -> String {
        format!("{}/api/resolve", self.config.resolver_url)
    }

    fn map_reqwest_error(e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::NetworkError(format!("Cannot connect: {}", e))
        } else {
            FetchError::NetworkError(e.to_string())
        }
    }

    /// 带重试的单文件下载
    async fn fetch_once(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::SourceNotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::NetworkError(format!(
                "HTTP {} fetching {}",
                status, url
            )));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchError::IoError(e.to_string()))?;
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| FetchError::IoError(e.to_string()))?;

        let mut stream = response.bytes_stream();
        let mut total = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Self::map_reqwest_error)?;
            total += chunk.len();
            file.write_all(&chunk)
                .await
                .map_err(|e| FetchError::IoError(e.to_string()))?;
        }
        file.flush()
            .await
            .map_err(|e| FetchError::IoError(e.to_string()))?;

        tracing::debug!(url = %url, dest = ?dest, bytes = total, "Media fetched");
        Ok(())
    }
}

#[async_trait]
impl MediaFetcherPort for HttpMediaFetcher {
    async fn locate(&self, title: &str, artist: &str) -> Result<String, FetchError> {
        let query = format!("{} {} official", title, artist);

        let mut last_error = FetchError::SourceNotFound(query.clone());
        for attempt in 0..=self.config.max_retries {
            let result = self
                .client
                .get(self.resolve_url())
                .query(&[("q", query.as_str())])
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    let body: ResolveResponse = response
                        .json()
                        .await
                        .map_err(|e| FetchError::NetworkError(e.to_string()))?;
                    return body
                        .url
                        .ok_or_else(|| FetchError::SourceNotFound(query.clone()));
                }
                Ok(response) => {
                    last_error = FetchError::NetworkError(format!(
                        "Resolver returned HTTP {}",
                        response.status()
                    ));
                }
                Err(e) => last_error = Self::map_reqwest_error(e),
            }

            if attempt < self.config.max_retries {
                tracing::warn!(
                    query = %query,
                    attempt = attempt + 1,
                    error = %last_error,
                    "Resolve attempt failed, retrying"
                );
            }
        }

        Err(last_error)
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<PathBuf, FetchError> {
        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            match self.fetch_once(url, dest).await {
                Ok(()) => return Ok(dest.to_path_buf()),
                // 来源不存在不重试
                Err(e @ FetchError::SourceNotFound(_)) => return Err(e),
                Err(e) => {
                    if attempt < self.config.max_retries {
                        tracing::warn!(
                            url = %url,
                            attempt = attempt + 1,
                            error = %e,
                            "Fetch attempt failed, retrying"
                        );
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::NetworkError("unreachable".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpMediaFetcherConfig::default();
        assert_eq!(config.resolver_url, "http://localhost:8100");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_resolve_url() {
        let fetcher = HttpMediaFetcher::new(HttpMediaFetcherConfig::default()).unwrap();
        assert_eq!(fetcher.resolve_url(), "http://localhost:8100/api/resolve");
    }
}
