pub mod backend;
pub mod cache;
pub mod retry;

pub use backend::{HttpSynthBackend, SynthBackend, SynthError};
pub use cache::SpeechCache;
pub use retry::RetryPolicy;
