//! Mix Planner Port - 混音规划抽象
//!
//! "提示词进、结构化歌单出"的生成式 AI 协作者接口

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::mix::MixPlan;

/// 规划错误
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Malformed plan: {0}")]
    MalformedPlan(String),
}

/// Mix Planner Port
#[async_trait]
pub trait MixPlannerPort: Send + Sync {
    /// 根据自然语言提示词生成混音计划
    async fn plan(&self, prompt: &str) -> Result<MixPlan, PlanError>;
}
