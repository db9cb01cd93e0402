//! Application Commands - CQRS 命令

pub mod handlers;
mod media_commands;
mod mix_commands;

pub use media_commands::{DownloadMediaCommand, DownloadMediaResponse, MediaKind};
pub use mix_commands::{
    MixFromClipsCommand, MixFromManifestCommand, MixFromPromptCommand, MixFromPromptResponse,
    MixResponse,
};
