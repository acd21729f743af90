use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::BuildError;

/// Flat parameter set exactly as it arrives from a front-end: CLI flags, a
/// saved preset document, or a web form. Numeric fields are signed here so
/// malformed input (e.g. `start = -1`) is representable and gets rejected by
/// `validate`, not by deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownSpec {
    pub mode: ModeTag,
    pub start: i64,
    pub interval_ms: i64,
    pub long_interval_ms: i64,
    pub every_n: i64,
    pub skip_first_rest: i64,
    pub speak_interval: i64,
    pub speak_at: Vec<i64>,
    pub lead_in_text: Option<String>,
    pub end_text: Option<String>,
    pub rest_text: String,
    pub minute_text: String,
    pub language: String,
    pub accent: String,
    pub beep_freq_hz: i64,
    pub beep_duration_ms: i64,
    pub beep_gain_db: f32,
    pub fade_ms: i64,
}

impl Default for CountdownSpec {
    fn default() -> Self {
        Self {
            mode: ModeTag::Reps,
            start: 80,
            interval_ms: 3_500,
            long_interval_ms: 8_000,
            every_n: 0,
            skip_first_rest: 0,
            speak_interval: 0,
            speak_at: Vec::new(),
            lead_in_text: None,
            end_text: None,
            rest_text: "rest".to_string(),
            minute_text: "minutes remaining".to_string(),
            language: "en".to_string(),
            accent: "com".to_string(),
            beep_freq_hz: 1_000,
            beep_duration_ms: 300,
            beep_gain_db: -6.0,
            fade_ms: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModeTag {
    #[default]
    Reps,
    Minutes,
}

impl CountdownSpec {
    /// Check every field and produce the typed, mode-tagged configuration.
    /// All rejection happens here, before any cue is scheduled or any
    /// backend call is made.
    pub fn validate(&self) -> Result<CountdownConfig, BuildError> {
        let start = to_u32("start", self.start)?;
        let interval_ms = to_positive_ms("interval_ms", self.interval_ms)?;
        let long_interval_ms = to_positive_ms("long_interval_ms", self.long_interval_ms)?;
        let fade_ms = to_u32("fade_ms", self.fade_ms)? as u64;

        let freq_hz = to_u32("beep_freq_hz", self.beep_freq_hz)?;
        if freq_hz == 0 {
            return Err(BuildError::invalid("beep_freq_hz", "must be positive"));
        }
        let beep = BeepConfig {
            freq_hz,
            duration_ms: to_positive_ms("beep_duration_ms", self.beep_duration_ms)?,
            gain_db: self.beep_gain_db,
        };

        let every_n = to_u32("every_n", self.every_n)?;
        let skip_first_rest = to_u32("skip_first_rest", self.skip_first_rest)?;
        let speak_interval = to_u32("speak_interval", self.speak_interval)?;

        let mode = match self.mode {
            ModeTag::Reps => {
                if speak_interval != 0 {
                    return Err(BuildError::invalid(
                        "speak_interval",
                        "only meaningful in minutes mode",
                    ));
                }
                if !self.speak_at.is_empty() {
                    return Err(BuildError::invalid(
                        "speak_at",
                        "only meaningful in minutes mode",
                    ));
                }
                Mode::Reps {
                    every_n,
                    skip_first_rest,
                    rest_text: self.rest_text.clone(),
                }
            }
            ModeTag::Minutes => {
                if every_n != 0 {
                    return Err(BuildError::invalid("every_n", "only meaningful in reps mode"));
                }
                if skip_first_rest != 0 {
                    return Err(BuildError::invalid(
                        "skip_first_rest",
                        "only meaningful in reps mode",
                    ));
                }
                let mut speak_at = Vec::with_capacity(self.speak_at.len());
                for &m in &self.speak_at {
                    let m = to_u32("speak_at", m)?;
                    if m > start {
                        return Err(BuildError::invalid(
                            "speak_at",
                            format!("minute {m} exceeds start ({start})"),
                        ));
                    }
                    speak_at.push(m);
                }
                Mode::Minutes {
                    speak_interval,
                    speak_at,
                    minute_text: self.minute_text.clone(),
                }
            }
        };

        Ok(CountdownConfig {
            start,
            interval_ms,
            long_interval_ms,
            lead_in_text: self.lead_in_text.clone(),
            end_text: self.end_text.clone(),
            language: self.language.clone(),
            accent: self.accent.clone(),
            beep,
            fade_ms,
            mode,
        })
    }

    /// Load a preset document. Presets are the same flat parameter set the
    /// CLI takes, stored as JSON.
    pub fn from_json_file(path: &Path) -> Result<Self, BuildError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| BuildError::invalid("preset", format!("{}: {e}", path.display())))
    }

    pub fn to_json_file(&self, path: &Path) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BuildError::invalid("preset", e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn to_u32(field: &'static str, value: i64) -> Result<u32, BuildError> {
    u32::try_from(value)
        .map_err(|_| BuildError::invalid(field, format!("must be a non-negative integer, got {value}")))
}

fn to_positive_ms(field: &'static str, value: i64) -> Result<u64, BuildError> {
    if value <= 0 {
        return Err(BuildError::invalid(
            field,
            format!("must be a positive duration in ms, got {value}"),
        ));
    }
    Ok(value as u64)
}

/// Validated, immutable countdown configuration. Mode-specific options live
/// behind the mode tag so the two schedulers never see each other's fields.
#[derive(Debug, Clone)]
pub struct CountdownConfig {
    pub start: u32,
    pub interval_ms: u64,
    pub long_interval_ms: u64,
    pub lead_in_text: Option<String>,
    pub end_text: Option<String>,
    pub language: String,
    pub accent: String,
    pub beep: BeepConfig,
    pub fade_ms: u64,
    pub mode: Mode,
}

#[derive(Debug, Clone)]
pub struct BeepConfig {
    pub freq_hz: u32,
    pub duration_ms: u64,
    pub gain_db: f32,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Reps {
        /// Insert a rest prompt every N counts; 0 disables rests entirely.
        every_n: u32,
        /// Suppress this many leading rest occurrences.
        skip_first_rest: u32,
        rest_text: String,
    },
    Minutes {
        /// Speak every N minutes; 0 = every minute. Ignored when `speak_at`
        /// is non-empty.
        speak_interval: u32,
        speak_at: Vec<u32>,
        minute_text: String,
    },
}

impl CountdownConfig {
    /// Cheap invariant re-check for configs built by hand rather than through
    /// `CountdownSpec::validate`.
    pub fn check(&self) -> Result<(), BuildError> {
        if self.interval_ms == 0 {
            return Err(BuildError::invalid("interval_ms", "must be positive"));
        }
        if self.long_interval_ms == 0 {
            return Err(BuildError::invalid("long_interval_ms", "must be positive"));
        }
        if self.beep.freq_hz == 0 {
            return Err(BuildError::invalid("beep_freq_hz", "must be positive"));
        }
        if self.beep.duration_ms == 0 {
            return Err(BuildError::invalid("beep_duration_ms", "must be positive"));
        }
        if let Mode::Minutes { speak_at, .. } = &self.mode {
            if speak_at.iter().any(|&m| m > self.start) {
                return Err(BuildError::invalid("speak_at", "minute exceeds start"));
            }
        }
        Ok(())
    }
}
