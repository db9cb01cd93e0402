//! Mix Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MixError {
    #[error("无效的时间戳: {0}")]
    InvalidTimestamp(String),

    #[error("无效的时间窗口: start={start_secs}s end={end_secs}s")]
    InvalidWindow { start_secs: u32, end_secs: u32 },

    #[error("清单格式错误: {0}")]
    InvalidManifest(String),

    #[error("清单为空")]
    EmptyManifest,
}
