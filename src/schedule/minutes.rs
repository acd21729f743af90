use super::cue::{BeepVariant, Cue};
use super::pluralized;
use crate::config::CountdownConfig;

/// Elapsed-time countdown: descend from `start` minutes to 0. Silent minutes
/// still tick a beep so elapsed time stays audible; the gap after each
/// boundary beep is the configured stand-in for one minute of waiting (the
/// track is a compressed rehearsal artifact, not a wall clock).
pub(super) fn schedule(
    config: &CountdownConfig,
    speak_interval: u32,
    speak_at: &[u32],
    minute_text: &str,
) -> Vec<Cue> {
    // "5 minutes remaining" vs "1 minute remaining"; custom texts without
    // the word "minutes" keep a single form.
    let singular = minute_text.replacen("minutes", "minute", 1);

    let mut cues = Vec::with_capacity(2 * config.start as usize + 4);

    if let Some(lead_in) = &config.lead_in_text {
        cues.push(Cue::speech(lead_in));
        cues.push(Cue::beep(BeepVariant::Normal, config.interval_ms));
    }

    for m in (0..=config.start).rev() {
        if should_speak(m, config.start, speak_interval, speak_at) {
            let unit = pluralized(m, &singular, minute_text);
            cues.push(Cue::speech(format!("{m} {unit}")));
        }
        if m > 0 {
            cues.push(Cue::beep(BeepVariant::Normal, config.interval_ms));
        }
    }

    if let Some(end_text) = &config.end_text {
        cues.push(Cue::speech(end_text));
    }
    cues.push(Cue::beep(BeepVariant::End, 0));

    cues
}

/// An explicit `speak_at` list overrides the interval policy entirely. With
/// an interval, the first and last minutes are always spoken; with neither,
/// every minute is.
fn should_speak(m: u32, start: u32, speak_interval: u32, speak_at: &[u32]) -> bool {
    if !speak_at.is_empty() {
        speak_at.contains(&m)
    } else if speak_interval > 0 {
        m % speak_interval == 0 || m == start || m == 0
    } else {
        true
    }
}
