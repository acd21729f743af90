use super::cue::{BeepVariant, Cue};
use crate::config::CountdownConfig;

/// Rep-count countdown: speak every number from `start` down to 1, a tick
/// beep after each cue, a rest prompt every `every_n` counts.
///
/// Rest placement: a rest is due right after speaking `n` when `n` is a
/// multiple of `every_n`, except for the starting number itself (a rest
/// before anything has happened is useless) and the final 1. The first
/// `skip_first_rest` due rests are suppressed and behave like normal counts.
pub(super) fn schedule(
    config: &CountdownConfig,
    every_n: u32,
    skip_first_rest: u32,
    rest_text: &str,
) -> Vec<Cue> {
    let mut cues = Vec::with_capacity(2 * config.start as usize + 4);

    if let Some(lead_in) = &config.lead_in_text {
        cues.push(Cue::speech(lead_in));
        cues.push(Cue::beep(BeepVariant::Normal, config.interval_ms));
    }

    let mut rest_count: u32 = 0;
    for n in (1..=config.start).rev() {
        cues.push(Cue::speech(n.to_string()));
        if n == 1 {
            break;
        }

        let mut gap = config.interval_ms;
        if every_n > 0 && n != config.start && n % every_n == 0 {
            rest_count += 1;
            if rest_count > skip_first_rest {
                cues.push(Cue::speech(rest_text));
                gap = config.long_interval_ms;
            }
        }
        cues.push(Cue::beep(BeepVariant::Normal, gap));
    }

    if let Some(end_text) = &config.end_text {
        cues.push(Cue::speech(end_text));
    }
    cues.push(Cue::beep(BeepVariant::End, 0));

    cues
}
