pub mod audio;
pub mod config;
pub mod error;
pub mod schedule;
pub mod synth;
pub mod track;

pub use config::{BeepConfig, CountdownConfig, CountdownSpec, Mode, ModeTag};
pub use error::BuildError;
pub use schedule::{schedule, BeepVariant, Cue, CueKind};
pub use track::{Track, TrackAssembler, TimelineEntry};

use tokio_util::sync::CancellationToken;

use synth::backend::SynthBackend;
use synth::cache::SpeechCache;

/// Schedule and assemble in one call: validated configuration in,
/// (track, timeline) out. Fails fast; a failed build produces nothing.
pub async fn build_track<B: SynthBackend>(
    config: &CountdownConfig,
    cache: SpeechCache<B>,
    cancel: CancellationToken,
) -> Result<(Track, Vec<TimelineEntry>), BuildError> {
    let cues = schedule::schedule(config)?;
    tracing::info!(cues = cues.len(), "cue plan ready");
    TrackAssembler::new(cache, cancel)
        .assemble(config, &cues)
        .await
}
