//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod editor;
pub mod fetcher;
pub mod planner;

pub use editor::*;
pub use fetcher::*;
pub use planner::*;
