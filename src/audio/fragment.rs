use std::io::Cursor;

use rubato::{FftFixedIn, Resampler};

/// House sample rate. Every fragment is brought to this rate before it may
/// enter a track, so concatenation is a plain append.
pub const TARGET_RATE: u32 = 44_100;

/// Peak level fragments are normalized to, leaving a little headroom below
/// full scale.
const NORMALIZE_PEAK: f32 = 0.95;

const RESAMPLE_CHUNK: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("wav decode failed: {0}")]
    Decode(String),
    #[error("resample failed: {0}")]
    Resample(String),
}

/// Rendered audio for a single cue: mono f32 samples plus their rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFragment {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioFragment {
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// A silent fragment at the house rate.
    pub fn silence_ms(ms: u64) -> Self {
        Self {
            samples: vec![0.0; ms_to_samples(ms, TARGET_RATE)],
            sample_rate: TARGET_RATE,
        }
    }

    /// Decode WAV bytes (any channel count, int or float samples) into a
    /// mono fragment at the source rate.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, FragmentError> {
        let reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| FragmentError::Decode(e.to_string()))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| FragmentError::Decode(e.to_string()))?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| FragmentError::Decode(e.to_string()))?
            }
        };

        let samples = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        };

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_ms(&self) -> u64 {
        samples_to_ms(self.samples.len(), self.sample_rate)
    }

    /// Normalize, unify to the house rate, and fade the edges. Run on every
    /// speech fragment before assembly so levels match across cached and
    /// freshly synthesized audio and segment joins never click.
    pub fn prepared(mut self, fade_ms: u64) -> Result<Self, FragmentError> {
        self.normalize();
        if self.sample_rate != TARGET_RATE {
            self.samples = resample(&self.samples, self.sample_rate, TARGET_RATE)?;
            self.sample_rate = TARGET_RATE;
        }
        self.fade_edges(fade_ms);
        Ok(self)
    }

    fn normalize(&mut self) {
        let peak = self.samples.iter().fold(0f32, |acc, s| acc.max(s.abs()));
        if peak > 1e-6 {
            let scale = NORMALIZE_PEAK / peak;
            for s in &mut self.samples {
                *s *= scale;
            }
        }
    }

    /// Linear fade-in/out, clipped to at most half the fragment each side.
    pub(crate) fn fade_edges(&mut self, fade_ms: u64) {
        let fade = ms_to_samples(fade_ms, self.sample_rate).min(self.samples.len() / 2);
        if fade == 0 {
            return;
        }
        let len = self.samples.len();
        for i in 0..fade {
            let ramp = i as f32 / fade as f32;
            self.samples[i] *= ramp;
            self.samples[len - 1 - i] *= ramp;
        }
    }
}

fn resample(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>, FragmentError> {
    if samples.is_empty() || from == to {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(from as usize, to as usize, RESAMPLE_CHUNK, 2, 1)
        .map_err(|e| FragmentError::Resample(e.to_string()))?;

    let expected = samples_count_at(samples.len(), from, to);
    let mut out = Vec::with_capacity(expected + RESAMPLE_CHUNK);

    let mut pos = 0;
    while pos + RESAMPLE_CHUNK <= samples.len() {
        let frames = resampler
            .process(&[&samples[pos..pos + RESAMPLE_CHUNK]], None)
            .map_err(|e| FragmentError::Resample(e.to_string()))?;
        out.extend_from_slice(&frames[0]);
        pos += RESAMPLE_CHUNK;
    }
    if pos < samples.len() {
        let frames = resampler
            .process_partial(Some(&[&samples[pos..]]), None)
            .map_err(|e| FragmentError::Resample(e.to_string()))?;
        out.extend_from_slice(&frames[0]);
    }
    // Drain the resampler's internal delay line.
    let frames = resampler
        .process_partial::<&[f32]>(None, None)
        .map_err(|e| FragmentError::Resample(e.to_string()))?;
    out.extend_from_slice(&frames[0]);

    // Pin the output to the arithmetically expected length so durations stay
    // deterministic regardless of filter latency.
    out.resize(expected, 0.0);
    Ok(out)
}

fn samples_count_at(len: usize, from: u32, to: u32) -> usize {
    ((len as u64 * to as u64 + from as u64 / 2) / from as u64) as usize
}

pub(crate) fn ms_to_samples(ms: u64, rate: u32) -> usize {
    ((ms * rate as u64 + 500) / 1000) as usize
}

pub(crate) fn samples_to_ms(len: usize, rate: u32) -> u64 {
    (len as u64 * 1000 + rate as u64 / 2) / rate as u64
}
