#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cuetrack::config::{BeepConfig, CountdownConfig, Mode};
use cuetrack::schedule::{Cue, CueKind};
use cuetrack::synth::backend::{SynthBackend, SynthError};

/// Deterministic 16-bit mono WAV bytes: a constant mid-level signal of the
/// given length. Enough for duration and caching assertions.
pub fn wav_bytes(duration_ms: u64, sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let n = duration_ms * sample_rate as u64 / 1000;
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..n {
            writer.write_sample(8_000i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Scripted synthesis backend: counts calls, optionally fails the first N
/// attempts, then serves fixed-length WAV audio.
#[derive(Clone)]
pub struct ScriptedBackend {
    calls: Arc<AtomicUsize>,
    failures_remaining: Arc<AtomicUsize>,
    duration_ms: u64,
    sample_rate: u32,
}

impl ScriptedBackend {
    pub fn new(duration_ms: u64, sample_rate: u32) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            failures_remaining: Arc::new(AtomicUsize::new(0)),
            duration_ms,
            sample_rate,
        }
    }

    pub fn failing_first(self, failures: usize) -> Self {
        self.failures_remaining.store(failures, Ordering::SeqCst);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SynthBackend for ScriptedBackend {
    async fn synthesize(
        &self,
        _text: &str,
        _language: &str,
        _accent: &str,
    ) -> Result<Vec<u8>, SynthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(SynthError::BadAudio("scripted failure".to_string()));
        }
        Ok(wav_bytes(self.duration_ms, self.sample_rate))
    }
}

pub fn reps_config(start: u32, every_n: u32, skip_first_rest: u32) -> CountdownConfig {
    CountdownConfig {
        start,
        interval_ms: 3_500,
        long_interval_ms: 8_000,
        lead_in_text: None,
        end_text: None,
        language: "en".to_string(),
        accent: "com".to_string(),
        beep: BeepConfig {
            freq_hz: 1_000,
            duration_ms: 300,
            gain_db: -6.0,
        },
        fade_ms: 10,
        mode: Mode::Reps {
            every_n,
            skip_first_rest,
            rest_text: "rest".to_string(),
        },
    }
}

pub fn minutes_config(start: u32, speak_interval: u32, speak_at: Vec<u32>) -> CountdownConfig {
    CountdownConfig {
        start,
        interval_ms: 3_500,
        long_interval_ms: 8_000,
        lead_in_text: None,
        end_text: None,
        language: "en".to_string(),
        accent: "com".to_string(),
        beep: BeepConfig {
            freq_hz: 1_000,
            duration_ms: 300,
            gain_db: -6.0,
        },
        fade_ms: 10,
        mode: Mode::Minutes {
            speak_interval,
            speak_at,
            minute_text: "minutes remaining".to_string(),
        },
    }
}

pub fn speech_texts(cues: &[Cue]) -> Vec<String> {
    cues.iter()
        .filter_map(|c| match &c.kind {
            CueKind::Speech { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}
