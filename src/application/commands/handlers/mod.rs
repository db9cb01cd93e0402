//! Command Handlers

mod media_handlers;
mod mix_handlers;

pub use media_handlers::DownloadMediaHandler;
pub use mix_handlers::{MixFromClipsHandler, MixFromManifestHandler, MixFromPromptHandler};
