//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::domain::mix::MixError;
use crate::application::ports::{EditError, FetchError, PlanError, SessionError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<SessionError> for ApplicationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) | SessionError::InvalidId(id) => {
                Self::not_found("Session", id)
            }
            SessionError::IoError(msg) => Self::InternalError(msg),
        }
    }
}

impl From<MixError> for ApplicationError {
    fn from(err: MixError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<FetchError> for ApplicationError {
    fn from(err: FetchError) -> Self {
        Self::ExternalServiceError(err.to_string())
    }
}

impl From<EditError> for ApplicationError {
    fn from(err: EditError) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<PlanError> for ApplicationError {
    fn from(err: PlanError) -> Self {
        Self::ExternalServiceError(err.to_string())
    }
}
