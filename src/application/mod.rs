//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SessionManager、MediaFetcher、AudioEditor、MixPlanner）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Handlers
    handlers::{DownloadMediaHandler, MixFromClipsHandler, MixFromManifestHandler, MixFromPromptHandler},
    DownloadMediaCommand,
    DownloadMediaResponse,
    MediaKind,
    MixFromClipsCommand,
    MixFromManifestCommand,
    MixFromPromptCommand,
    MixFromPromptResponse,
    MixResponse,
};

pub use error::ApplicationError;

pub use ports::{
    // Audio editor
    AudioEditorPort,
    EditError,
    // Media fetcher
    FetchError,
    MediaFetcherPort,
    // Mix planner
    MixPlannerPort,
    PlanError,
    // Session manager
    Session,
    SessionError,
    SessionManagerPort,
    Workspace,
    WORKSPACE_SKELETON,
};

pub use queries::{handlers::GetArtifactHandler, GetArtifactQuery, GetArtifactResponse};
