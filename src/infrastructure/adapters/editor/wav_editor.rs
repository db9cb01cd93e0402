//! WAV Editor - 基于 symphonia 的音频剪辑器
//!
//! 支持：
//! - WAV 解码为 PCM（symphonia）
//! - 按时间窗口裁剪
//! - 线性交叉淡化拼接
//! - PCM → WAV (16-bit) 编码

use async_trait::async_trait;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioEditorPort, EditError};
use crate::domain::mix::TimeWindow;

/// 解码后的 PCM 音频（交错采样）
struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

impl DecodedAudio {
    fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }
}

/// WAV 剪辑器配置
#[derive(Debug, Clone)]
pub struct WavEditorConfig {
    /// 拼接时的交叉淡化时长（毫秒）
    pub crossfade_ms: u32,
}

impl Default for WavEditorConfig {
    fn default() -> Self {
        Self { crossfade_ms: 3000 }
    }
}

/// WAV 剪辑器
///
/// 基于 symphonia 实现；所有输入都要求 WAV 格式，
/// 拼接要求各片段采样率与声道数一致（裁剪产物天然满足）
pub struct WavEditor {
    config: WavEditorConfig,
}

impl WavEditor {
    pub fn new(config: WavEditorConfig) -> Self {
        Self { config }
    }

    /// 使用 symphonia 解码 WAV 获取 PCM 数据
    fn decode_wav(data: Vec<u8>) -> Result<DecodedAudio, EditError> {
        let cursor = Cursor::new(data);
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let format_opts = FormatOptions::default();
        let metadata_opts = MetadataOptions::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &metadata_opts)
            .map_err(|e| EditError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| EditError::DecodingError("No audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| EditError::DecodingError("Unknown sample rate".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .map(|c| c.count())
            .ok_or_else(|| EditError::DecodingError("Unknown channel count".to_string()))?;

        let decoder_opts = DecoderOptions::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &decoder_opts)
            .map_err(|e| EditError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let mut samples: Vec<f32> = Vec::new();
        let track_id = track.id;

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(EditError::DecodingError(format!("Packet read error: {}", e)));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
            };

            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            // Only take the actual samples, not the entire buffer capacity
            let actual_samples = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        Ok(DecodedAudio {
            samples,
            sample_rate,
            channels,
        })
    }

    /// 将 PCM f32 样本编码为 16-bit WAV
    fn encode_wav(pcm: &DecodedAudio) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let num_channels = pcm.channels as u16;
        let sample_rate = pcm.sample_rate;
        let byte_rate = sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
        let block_align = num_channels * (bits_per_sample / 8);

        let data_size = pcm.samples.len() * 2;
        let file_size = 36 + data_size;

        let mut wav = Vec::with_capacity(44 + data_size);

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(file_size as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
        wav.extend_from_slice(&num_channels.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());
        for &sample in &pcm.samples {
            let clamped = sample.clamp(-1.0, 1.0);
            wav.extend_from_slice(&((clamped * 32767.0) as i16).to_le_bytes());
        }

        wav
    }

    /// 按时间窗口切出 PCM 子段（窗口越界时夹到实际长度）
    fn slice_window(audio: &DecodedAudio, window: TimeWindow) -> Result<DecodedAudio, EditError> {
        let total_frames = audio.frames();
        let start_frame = (window.start_secs as usize).saturating_mul(audio.sample_rate as usize);
        let end_frame = (window.end_secs as usize)
            .saturating_mul(audio.sample_rate as usize)
            .min(total_frames);

        if start_frame >= total_frames {
            return Err(EditError::InvalidInput(format!(
                "Window starts at {}s but audio is only {}s long",
                window.start_secs,
                total_frames / audio.sample_rate.max(1) as usize
            )));
        }

        let samples =
            audio.samples[start_frame * audio.channels..end_frame * audio.channels].to_vec();

        Ok(DecodedAudio {
            samples,
            sample_rate: audio.sample_rate,
            channels: audio.channels,
        })
    }

    /// 把 next 以线性交叉淡化追加到 combined 末尾
    fn append_with_crossfade(combined: &mut DecodedAudio, next: &DecodedAudio, crossfade_ms: u32) {
        let channels = combined.channels;
        let crossfade_frames = (combined.sample_rate as u64 * crossfade_ms as u64 / 1000) as usize;
        // 重叠不超过任一侧的一半，避免短片段被淡化吃掉
        let overlap = crossfade_frames
            .min(combined.frames() / 2)
            .min(next.frames() / 2);

        let tail_start = (combined.frames() - overlap) * channels;
        for frame in 0..overlap {
            let fade_in = frame as f32 / overlap as f32;
            let fade_out = 1.0 - fade_in;
            for ch in 0..channels {
                let idx = tail_start + frame * channels + ch;
                combined.samples[idx] =
                    combined.samples[idx] * fade_out + next.samples[frame * channels + ch] * fade_in;
            }
        }

        combined
            .samples
            .extend_from_slice(&next.samples[overlap * channels..]);
    }
}

#[async_trait]
impl AudioEditorPort for WavEditor {
    async fn trim(
        &self,
        src: &Path,
        window: TimeWindow,
        dest_dir: &Path,
    ) -> Result<PathBuf, EditError> {
        let data = tokio::fs::read(src)
            .await
            .map_err(|e| EditError::IoError(format!("{}: {}", src.display(), e)))?;

        let audio = Self::decode_wav(data)?;
        let piece = Self::slice_window(&audio, window)?;
        let encoded = Self::encode_wav(&piece);

        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| EditError::IoError(e.to_string()))?;

        let stem = src
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| EditError::InvalidInput(format!("Bad source path: {:?}", src)))?;
        let dest = dest_dir.join(format!("{}.wav", stem));

        tokio::fs::write(&dest, encoded)
            .await
            .map_err(|e| EditError::IoError(e.to_string()))?;

        tracing::debug!(src = ?src, dest = ?dest, window = %window, "Audio trimmed");
        Ok(dest)
    }

    async fn merge(&self, inputs: &[PathBuf], dest_dir: &Path) -> Result<PathBuf, EditError> {
        if inputs.is_empty() {
            return Err(EditError::EmptyInput);
        }

        let mut pieces = Vec::with_capacity(inputs.len());
        for path in inputs {
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| EditError::IoError(format!("{}: {}", path.display(), e)))?;
            pieces.push(Self::decode_wav(data)?);
        }

        let mut combined = pieces.remove(0);
        for piece in &pieces {
            if piece.sample_rate != combined.sample_rate || piece.channels != combined.channels {
                return Err(EditError::InvalidInput(format!(
                    "Mismatched formats: {}Hz/{}ch vs {}Hz/{}ch",
                    combined.sample_rate, combined.channels, piece.sample_rate, piece.channels
                )));
            }
            Self::append_with_crossfade(&mut combined, piece, self.config.crossfade_ms);
        }

        let encoded = Self::encode_wav(&combined);

        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| EditError::IoError(e.to_string()))?;

        let dest = dest_dir.join(format!("mix_{}.wav", chrono::Utc::now().timestamp()));
        tokio::fs::write(&dest, encoded)
            .await
            .map_err(|e| EditError::IoError(e.to_string()))?;

        tracing::info!(
            inputs = inputs.len(),
            crossfade_ms = self.config.crossfade_ms,
            dest = ?dest,
            "Audio merged"
        );
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const RATE: u32 = 8000;

    /// 合成一段单声道正弦 WAV
    fn sine_wav(freq: f32, secs: u32) -> Vec<u8> {
        let frames = (RATE * secs) as usize;
        let samples: Vec<f32> = (0..frames)
            .map(|i| (i as f32 * freq * 2.0 * std::f32::consts::PI / RATE as f32).sin() * 0.5)
            .collect();
        WavEditor::encode_wav(&DecodedAudio {
            samples,
            sample_rate: RATE,
            channels: 1,
        })
    }

    fn editor(crossfade_ms: u32) -> WavEditor {
        WavEditor::new(WavEditorConfig { crossfade_ms })
    }

    #[test]
    fn test_encode_decode_roundtrip_preserves_shape() {
        let wav = sine_wav(440.0, 2);
        let decoded = WavEditor::decode_wav(wav).unwrap();
        assert_eq!(decoded.sample_rate, RATE);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.frames(), (RATE * 2) as usize);
    }

    #[tokio::test]
    async fn test_trim_produces_window_length() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("3.wav");
        std::fs::write(&src, sine_wav(440.0, 10)).unwrap();

        let window = TimeWindow::new(2, 5).unwrap();
        let out = editor(0)
            .trim(&src, window, &temp.path().join("split"))
            .await
            .unwrap();

        // 产物继承源文件名
        assert_eq!(out.file_name().unwrap(), "3.wav");
        let decoded = WavEditor::decode_wav(std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(decoded.frames(), (RATE * 3) as usize);
    }

    #[tokio::test]
    async fn test_trim_clamps_overlong_window() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("clip.wav");
        std::fs::write(&src, sine_wav(440.0, 4)).unwrap();

        let window = TimeWindow::new(3, 60).unwrap();
        let out = editor(0)
            .trim(&src, window, temp.path())
            .await
            .unwrap();

        let decoded = WavEditor::decode_wav(std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(decoded.frames(), RATE as usize);
    }

    #[tokio::test]
    async fn test_trim_rejects_window_past_end() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("clip.wav");
        std::fs::write(&src, sine_wav(440.0, 2)).unwrap();

        let window = TimeWindow::new(10, 20).unwrap();
        let result = editor(0).trim(&src, window, temp.path()).await;
        assert!(matches!(result, Err(EditError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_merge_with_crossfade_overlaps() {
        let temp = tempdir().unwrap();
        let a = temp.path().join("a.wav");
        let b = temp.path().join("b.wav");
        std::fs::write(&a, sine_wav(440.0, 4)).unwrap();
        std::fs::write(&b, sine_wav(880.0, 4)).unwrap();

        let out = editor(2000)
            .merge(&[a, b], temp.path())
            .await
            .unwrap();

        let decoded = WavEditor::decode_wav(std::fs::read(&out).unwrap()).unwrap();
        // 4s + 4s - 2s 重叠 = 6s
        assert_eq!(decoded.frames(), (RATE * 6) as usize);
        assert!(out
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("mix_"));
    }

    #[tokio::test]
    async fn test_merge_without_crossfade_concatenates() {
        let temp = tempdir().unwrap();
        let a = temp.path().join("a.wav");
        let b = temp.path().join("b.wav");
        std::fs::write(&a, sine_wav(440.0, 2)).unwrap();
        std::fs::write(&b, sine_wav(880.0, 3)).unwrap();

        let out = editor(0).merge(&[a, b], temp.path()).await.unwrap();
        let decoded = WavEditor::decode_wav(std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(decoded.frames(), (RATE * 5) as usize);
    }

    #[tokio::test]
    async fn test_merge_rejects_empty_input() {
        let temp = tempdir().unwrap();
        let result = editor(0).merge(&[], temp.path()).await;
        assert!(matches!(result, Err(EditError::EmptyInput)));
    }
}
