//! Domain Layer - 领域层
//!
//! Mix Context: 混音计划、素材窗口与清单解析

pub mod mix;

pub use mix::{parse_manifest, parse_timestamp, ClipSource, MixError, MixPlan, PlannedClip, TimeWindow};
