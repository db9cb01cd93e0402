//! Mix Context - 混音领域
//!
//! 值对象与清单解析，不依赖任何基础设施

mod errors;
mod manifest;
mod value_objects;

pub use errors::MixError;
pub use manifest::parse_manifest;
pub use value_objects::{parse_timestamp, ClipSource, MixPlan, PlannedClip, TimeWindow};
