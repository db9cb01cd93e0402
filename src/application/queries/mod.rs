//! Application Queries - CQRS 查询

mod file_queries;
pub mod handlers;

pub use file_queries::{GetArtifactQuery, GetArtifactResponse};
