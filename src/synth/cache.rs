use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::backend::{SynthBackend, SynthError};
use super::retry::RetryPolicy;
use crate::audio::fragment::AudioFragment;
use crate::error::BuildError;

/// Content-addressed on-disk store of synthesized speech. Entries are
/// append-only: identical keys are assumed to resolve to byte-identical
/// audio, so nothing is ever updated in place.
///
/// Cheap to clone; clones share the store and its in-flight table.
pub struct SpeechCache<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for SpeechCache<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<B> {
    backend: B,
    dir: PathBuf,
    retry: RetryPolicy,
    // Per-key gates behind one coarse lock: concurrent resolves of the same
    // key share a single backend call, unrelated keys proceed in parallel.
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

#[derive(Debug, Clone)]
struct CacheKey {
    text: String,
    language: String,
    accent: String,
}

impl CacheKey {
    fn new(text: &str, language: &str, accent: &str) -> Self {
        // Normalized so "Rest " and "rest" share an entry.
        Self {
            text: text.trim().to_lowercase(),
            language: language.trim().to_lowercase(),
            accent: accent.trim().to_lowercase(),
        }
    }

    fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}|{}|{}", self.language, self.accent, self.text));
        format!("{:x}", hasher.finalize())
    }
}

impl<B: SynthBackend> SpeechCache<B> {
    pub fn new(
        dir: impl Into<PathBuf>,
        backend: B,
        retry: RetryPolicy,
    ) -> Result<Self, BuildError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            inner: Arc::new(Inner {
                backend,
                dir,
                retry,
                inflight: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Resolve one phrase to audio. Hits return stored bytes with no
    /// external call; misses synthesize under a per-key single-flight gate
    /// and insert atomically. Unreadable entries degrade to a miss and get
    /// re-synthesized.
    pub async fn resolve(
        &self,
        text: &str,
        language: &str,
        accent: &str,
        cancel: &CancellationToken,
    ) -> Result<AudioFragment, BuildError> {
        let key = CacheKey::new(text, language, accent);
        let digest = key.digest();

        let gate = {
            let mut inflight = self.inner.inflight.lock().await;
            inflight.entry(digest.clone()).or_default().clone()
        };
        let _guard = gate.lock().await;

        let path = self.inner.dir.join(format!("{digest}.wav"));
        if let Some(fragment) = self.read_entry(&path) {
            debug!(text = %key.text, "speech cache hit");
            return Ok(fragment);
        }

        let bytes = self.synthesize_with_retry(&key, cancel).await?;
        let fragment = AudioFragment::from_wav_bytes(&bytes).map_err(|e| {
            BuildError::SynthesisFailure {
                text: key.text.clone(),
                source: SynthError::BadAudio(e.to_string()),
            }
        })?;

        // Rename is the commit point: concurrent readers either see the whole
        // entry or none of it, and a cancelled resolve leaves nothing behind.
        let tmp = self.inner.dir.join(format!("{digest}.tmp"));
        std::fs::write(&tmp, &bytes)?;
        std::fs::rename(&tmp, &path)?;
        debug!(text = %key.text, bytes = bytes.len(), "speech cache insert");

        Ok(fragment)
    }

    fn read_entry(&self, path: &Path) -> Option<AudioFragment> {
        let bytes = std::fs::read(path).ok()?;
        match AudioFragment::from_wav_bytes(&bytes) {
            Ok(fragment) => Some(fragment),
            Err(e) => {
                // Corruption is a miss, not a build failure.
                warn!(path = %path.display(), error = %e, "unreadable cache entry, re-synthesizing");
                None
            }
        }
    }

    async fn synthesize_with_retry(
        &self,
        key: &CacheKey,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, BuildError> {
        let max_attempts = self.inner.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(BuildError::Cancelled),
                r = self
                    .inner
                    .backend
                    .synthesize(&key.text, &key.language, &key.accent) => r,
            };

            match result {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        return Err(BuildError::SynthesisFailure {
                            text: key.text.clone(),
                            source: e,
                        });
                    }
                    let delay = self.inner.retry.delay_after(attempt - 1);
                    warn!(
                        text = %key.text,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "synthesis attempt failed, backing off"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(BuildError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}
