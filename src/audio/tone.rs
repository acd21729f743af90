use std::f32::consts::TAU;

use super::fragment::{ms_to_samples, AudioFragment, TARGET_RATE};
use crate::config::BeepConfig;
use crate::schedule::BeepVariant;

/// Peak of a 0 dB beep. `gain_db` scales from here:
/// `amplitude = REF_AMPLITUDE * 10^(gain_db / 20)`.
pub const REF_AMPLITUDE: f32 = 0.8;

/// The end beep is pitched up by 1.5x and stretched to 2x the normal tick.
/// Tunable constants, not configuration: distinctiveness is the requirement,
/// the exact ratio is not.
pub const END_FREQ_RATIO: f32 = 1.5;
pub const END_DURATION_RATIO: u64 = 2;

/// Synthesize one beep. Pure and deterministic; always at the house rate.
pub fn render(beep: &BeepConfig, fade_ms: u64, variant: BeepVariant) -> AudioFragment {
    let (freq_hz, duration_ms) = match variant {
        BeepVariant::Normal => (beep.freq_hz as f32, beep.duration_ms),
        BeepVariant::End => (
            beep.freq_hz as f32 * END_FREQ_RATIO,
            beep.duration_ms * END_DURATION_RATIO,
        ),
    };

    let amplitude = REF_AMPLITUDE * 10f32.powf(beep.gain_db / 20.0);
    let n = ms_to_samples(duration_ms, TARGET_RATE);
    let mut samples = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f32 / TARGET_RATE as f32;
        samples.push(amplitude * (TAU * freq_hz * t).sin());
    }

    let mut fragment = AudioFragment::from_mono(samples, TARGET_RATE);
    // Edge fade against clicks, never more than half the burst.
    fragment.fade_edges(fade_ms.min(duration_ms / 2));
    fragment
}
