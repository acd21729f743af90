mod common;

use cuetrack::audio::fragment::AudioFragment;
use cuetrack::audio::tone::{self, END_DURATION_RATIO, REF_AMPLITUDE};
use cuetrack::config::BeepConfig;
use cuetrack::BeepVariant;

fn beep(gain_db: f32) -> BeepConfig {
    BeepConfig {
        freq_hz: 1_000,
        duration_ms: 300,
        gain_db,
    }
}

fn peak(fragment: &AudioFragment) -> f32 {
    fragment.samples().iter().fold(0f32, |acc, s| acc.max(s.abs()))
}

#[test]
fn normal_beep_has_configured_duration_and_rate() {
    let fragment = tone::render(&beep(0.0), 0, BeepVariant::Normal);
    assert_eq!(fragment.duration_ms(), 300);
    assert_eq!(fragment.sample_rate(), 44_100);
}

#[test]
fn end_beep_is_stretched_by_the_fixed_ratio() {
    let normal = tone::render(&beep(0.0), 0, BeepVariant::Normal);
    let end = tone::render(&beep(0.0), 0, BeepVariant::End);
    assert_eq!(end.duration_ms(), normal.duration_ms() * END_DURATION_RATIO);
    assert_ne!(
        &normal.samples()[..100],
        &end.samples()[..100],
        "end variant must sound different"
    );
}

#[test]
fn gain_db_scales_amplitude_logarithmically() {
    let full = peak(&tone::render(&beep(0.0), 0, BeepVariant::Normal));
    assert!((full - REF_AMPLITUDE).abs() < 0.05, "0 dB peak ~{REF_AMPLITUDE}, got {full}");

    let halved = peak(&tone::render(&beep(-6.0), 0, BeepVariant::Normal));
    let expected = REF_AMPLITUDE * 10f32.powf(-6.0 / 20.0);
    assert!((halved - expected).abs() < 0.05, "-6 dB peak ~{expected}, got {halved}");
}

#[test]
fn fade_zeroes_the_edges() {
    let fragment = tone::render(&beep(0.0), 10, BeepVariant::Normal);
    let samples = fragment.samples();
    assert_eq!(samples[0], 0.0);
    assert_eq!(samples[samples.len() - 1], 0.0);
    let mid = samples[samples.len() / 2].abs();
    assert!(mid > 0.1, "body of the tone survives the fade");
}

#[test]
fn oversized_fade_is_clipped_to_half_the_burst() {
    let short = BeepConfig {
        freq_hz: 1_000,
        duration_ms: 100,
        gain_db: 0.0,
    };
    let fragment = tone::render(&short, 10_000, BeepVariant::Normal);
    assert_eq!(fragment.duration_ms(), 100);
    // With the fade clipped to 50ms per edge the very middle still rings.
    let samples = fragment.samples();
    assert!(samples[samples.len() / 2].abs() > 0.0);
}

#[test]
fn silence_is_zeroed_and_exactly_sized() {
    let silence = AudioFragment::silence_ms(250);
    assert_eq!(silence.duration_ms(), 250);
    assert!(silence.samples().iter().all(|&s| s == 0.0));
}

#[test]
fn wav_bytes_decode_to_their_recorded_duration() {
    let bytes = common::wav_bytes(500, 44_100);
    let fragment = AudioFragment::from_wav_bytes(&bytes).unwrap();
    assert_eq!(fragment.duration_ms(), 500);
    assert_eq!(fragment.sample_rate(), 44_100);
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(AudioFragment::from_wav_bytes(b"definitely not riff").is_err());
}

#[test]
fn prepared_fragments_are_peak_normalized() {
    let bytes = common::wav_bytes(200, 44_100);
    let fragment = AudioFragment::from_wav_bytes(&bytes).unwrap();
    assert!(peak(&fragment) < 0.3, "source is quiet");

    let prepared = fragment.prepared(0).unwrap();
    assert!((peak(&prepared) - 0.95).abs() < 0.01);
    assert_eq!(prepared.duration_ms(), 200);
}

#[test]
fn prepared_fragments_land_on_the_house_rate() {
    let bytes = common::wav_bytes(500, 22_050);
    let fragment = AudioFragment::from_wav_bytes(&bytes).unwrap();
    let prepared = fragment.prepared(10).unwrap();
    assert_eq!(prepared.sample_rate(), 44_100);
    assert_eq!(prepared.duration_ms(), 500);
}
