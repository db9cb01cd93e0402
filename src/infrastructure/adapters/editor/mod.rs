//! 音频剪辑适配器

mod wav_editor;

pub use wav_editor::{WavEditor, WavEditorConfig};
