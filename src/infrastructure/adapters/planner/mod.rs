//! 混音规划适配器

mod http_planner;

pub use http_planner::{HttpPlannerClient, HttpPlannerConfig};
