pub mod cue;
mod minutes;
mod reps;

pub use cue::{BeepVariant, Cue, CueKind};

use crate::config::{CountdownConfig, Mode};
use crate::error::BuildError;

/// Map a countdown configuration to its ordered cue sequence.
///
/// Pure and deterministic: no I/O, no clock, no randomness. Fails only on a
/// configuration that violates its invariants (possible when a
/// `CountdownConfig` was assembled by hand instead of via
/// `CountdownSpec::validate`).
pub fn schedule(config: &CountdownConfig) -> Result<Vec<Cue>, BuildError> {
    config.check()?;
    let cues = match &config.mode {
        Mode::Reps {
            every_n,
            skip_first_rest,
            rest_text,
        } => reps::schedule(config, *every_n, *skip_first_rest, rest_text),
        Mode::Minutes {
            speak_interval,
            speak_at,
            minute_text,
        } => minutes::schedule(config, *speak_interval, speak_at, minute_text),
    };
    Ok(cues)
}

/// Two-form pluralization: the configured language string decides the voice,
/// not the grammar, so this stays a plain count-driven pick.
pub(crate) fn pluralized<'a>(count: u32, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}
