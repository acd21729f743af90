use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("synthesis backend returned {0}")]
    Status(reqwest::StatusCode),
    #[error("synthesis request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("synthesis backend returned undecodable audio: {0}")]
    BadAudio(String),
}

/// The external speech service boundary: one phrase in, WAV bytes out.
/// Implementations do a single attempt; retry policy lives in the cache.
pub trait SynthBackend: Send + Sync + 'static {
    fn synthesize(
        &self,
        text: &str,
        language: &str,
        accent: &str,
    ) -> impl Future<Output = Result<Vec<u8>, SynthError>> + Send;
}

/// HTTP synthesis client. Expects a service that accepts a JSON request and
/// answers with raw audio bytes.
#[derive(Clone)]
pub struct HttpSynthBackend {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SynthRequest<'a> {
    text: &'a str,
    language: &'a str,
    accent: &'a str,
}

impl HttpSynthBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

impl SynthBackend for HttpSynthBackend {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        accent: &str,
    ) -> Result<Vec<u8>, SynthError> {
        let response = self
            .client
            .post(format!("{}/synthesize", self.base_url))
            .json(&SynthRequest {
                text,
                language,
                accent,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SynthError::Status(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
