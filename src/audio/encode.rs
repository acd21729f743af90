use std::io::Cursor;

use crate::track::Track;

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("wav write failed: {0}")]
    Wav(#[from] hound::Error),
}

/// Container encoder boundary. The engine hands over the raw assembled track
/// and a bitrate hint; WAV ignores the bitrate, a compressed implementation
/// would not. Encoding failures are fatal and never retried.
pub trait AudioEncoder {
    fn encode(&self, track: &Track, bitrate_kbps: u32) -> Result<Vec<u8>, EncodeError>;
    fn extension(&self) -> &'static str;
}

/// 16-bit PCM mono WAV via hound.
pub struct WavEncoder;

impl AudioEncoder for WavEncoder {
    fn encode(&self, track: &Track, _bitrate_kbps: u32) -> Result<Vec<u8>, EncodeError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: track.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in track.samples() {
                let clamped = sample.clamp(-1.0, 1.0);
                writer.write_sample((clamped * i16::MAX as f32) as i16)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    fn extension(&self) -> &'static str {
        "wav"
    }
}
