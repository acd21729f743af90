use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::audio::fragment::{ms_to_samples, samples_to_ms, AudioFragment, TARGET_RATE};
use crate::audio::tone;
use crate::config::CountdownConfig;
use crate::error::BuildError;
use crate::schedule::{Cue, CueKind};
use crate::synth::backend::SynthBackend;
use crate::synth::cache::SpeechCache;

/// One labeled span in the rendered track, half-open `[start_ms, end_ms)`.
/// Gaps between entries are silence; they carry no entry of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub label: String,
    #[serde(rename = "start")]
    pub start_ms: u64,
    #[serde(rename = "end")]
    pub end_ms: u64,
}

/// The assembled mono track at the house rate.
#[derive(Debug, Clone, Default)]
pub struct Track {
    samples: Vec<f32>,
}

impl Track {
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        TARGET_RATE
    }

    pub fn duration_ms(&self) -> u64 {
        samples_to_ms(self.samples.len(), TARGET_RATE)
    }

    fn push_fragment(&mut self, fragment: &AudioFragment) {
        debug_assert_eq!(fragment.sample_rate(), TARGET_RATE);
        self.samples.extend_from_slice(fragment.samples());
    }

    fn push_silence_ms(&mut self, ms: u64) {
        self.samples
            .resize(self.samples.len() + ms_to_samples(ms, TARGET_RATE), 0.0);
    }
}

/// Walks a cue sequence once and concatenates the rendered fragments into a
/// single track, recording exact offsets per cue.
///
/// Fragment resolution runs concurrently (one task per audible cue) so
/// external synthesis latency overlaps; the append stage then consumes the
/// results strictly in cue order, which is what keeps the timeline cursor
/// honest.
pub struct TrackAssembler<B> {
    cache: SpeechCache<B>,
    cancel: CancellationToken,
}

impl<B: SynthBackend> TrackAssembler<B> {
    pub fn new(cache: SpeechCache<B>, cancel: CancellationToken) -> Self {
        Self { cache, cancel }
    }

    pub async fn assemble(
        &self,
        config: &CountdownConfig,
        cues: &[Cue],
    ) -> Result<(Track, Vec<TimelineEntry>), BuildError> {
        let handles = self.spawn_resolvers(config, cues);

        let mut track = Track::default();
        let mut timeline = Vec::new();
        let mut t_ms: u64 = 0;
        let mut failed: Option<BuildError> = None;

        for (cue, handle) in cues.iter().zip(handles) {
            // First failure aborts the build; the remaining resolvers are
            // stopped and nothing partial escapes.
            if failed.is_some() {
                if let Some(handle) = handle {
                    handle.abort();
                }
                continue;
            }

            if let Some(handle) = handle {
                match join_fragment(handle).await {
                    Ok(fragment) => {
                        let duration = fragment.duration_ms();
                        track.push_fragment(&fragment);
                        timeline.push(TimelineEntry {
                            label: cue.label().to_string(),
                            start_ms: t_ms,
                            end_ms: t_ms + duration,
                        });
                        t_ms += duration;
                    }
                    Err(e) => {
                        failed = Some(e);
                        continue;
                    }
                }
            }

            if cue.gap_after_ms > 0 {
                track.push_silence_ms(cue.gap_after_ms);
                t_ms += cue.gap_after_ms;
            }
        }

        if let Some(e) = failed {
            return Err(e);
        }

        info!(
            cues = cues.len(),
            entries = timeline.len(),
            duration_ms = t_ms,
            "track assembled"
        );
        Ok((track, timeline))
    }

    /// Resolution stage. Order is preserved by position: the handle at index
    /// i belongs to the cue at index i, with `None` for pure silence cues.
    fn spawn_resolvers(
        &self,
        config: &CountdownConfig,
        cues: &[Cue],
    ) -> Vec<Option<JoinHandle<Result<AudioFragment, BuildError>>>> {
        cues.iter()
            .map(|cue| match &cue.kind {
                CueKind::Speech { text } => {
                    let cache = self.cache.clone();
                    let text = text.clone();
                    let language = config.language.clone();
                    let accent = config.accent.clone();
                    let fade_ms = config.fade_ms;
                    let cancel = self.cancel.clone();
                    Some(tokio::spawn(async move {
                        debug!(text = %text, "resolving speech cue");
                        let fragment = cache.resolve(&text, &language, &accent, &cancel).await?;
                        Ok(fragment.prepared(fade_ms)?)
                    }))
                }
                CueKind::Beep { variant } => {
                    let beep = config.beep.clone();
                    let fade_ms = config.fade_ms;
                    let variant = *variant;
                    Some(tokio::spawn(async move {
                        Ok(tone::render(&beep, fade_ms, variant))
                    }))
                }
                CueKind::Silence => None,
            })
            .collect()
    }
}

async fn join_fragment(
    handle: JoinHandle<Result<AudioFragment, BuildError>>,
) -> Result<AudioFragment, BuildError> {
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Err(BuildError::Cancelled),
        Err(e) => Err(BuildError::ResolveTask(e.to_string())),
    }
}
