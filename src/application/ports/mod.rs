//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_editor;
mod media_fetcher;
mod mix_planner;
mod session_manager;

pub use audio_editor::{AudioEditorPort, EditError};
pub use media_fetcher::{FetchError, MediaFetcherPort};
pub use mix_planner::{MixPlannerPort, PlanError};
pub use session_manager::{
    Session, SessionError, SessionManagerPort, Workspace, WORKSPACE_SKELETON,
};
