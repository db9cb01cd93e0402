//! Session Infrastructure - 会话生命周期实现
//!
//! 磁盘承载的注册表 + 后台过期清扫

mod disk_manager;
mod sweeper;

pub use disk_manager::{is_valid_session_id, DiskSessionManager};
pub use sweeper::{ExpirySweeper, SweeperConfig};
