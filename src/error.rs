use crate::audio::encode::EncodeError;
use crate::audio::fragment::FragmentError;
use crate::synth::backend::SynthError;

/// Build-level failures. Scheduling and assembly fail fast on the first of
/// these; no partial track or timeline is ever emitted.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid config: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The backend exhausted its retries (or returned garbage) for one phrase.
    #[error("speech synthesis failed for \"{text}\": {source}")]
    SynthesisFailure { text: String, source: SynthError },

    #[error("audio processing failed: {0}")]
    Audio(#[from] FragmentError),

    #[error("audio encoding failed: {0}")]
    Encoding(#[from] EncodeError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fragment resolution task failed: {0}")]
    ResolveTask(String),

    #[error("build cancelled")]
    Cancelled,
}

impl BuildError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        BuildError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
