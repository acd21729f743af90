use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cuetrack::audio::encode::{AudioEncoder, WavEncoder};
use cuetrack::synth::{HttpSynthBackend, RetryPolicy, SpeechCache};
use cuetrack::{CountdownSpec, ModeTag};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Build a voiced countdown track with beeps, rest prompts, and a cue timeline."
)]
struct Args {
    /// Starting number (reps or minutes depending on mode)
    #[arg(long, default_value_t = 80, allow_negative_numbers = true)]
    start: i64,

    #[arg(long, value_enum, default_value_t = ModeArg::Reps)]
    mode: ModeArg,

    /// Milliseconds of silence between normal cues
    #[arg(long, default_value_t = 3_500)]
    interval_ms: i64,

    /// Milliseconds of silence after a rest cue
    #[arg(long, default_value_t = 8_000)]
    long_interval_ms: i64,

    /// Insert a rest prompt every N counts (reps mode). 0 disables.
    #[arg(long, default_value_t = 8)]
    every_n: i64,

    /// Number of initial rest periods to suppress
    #[arg(long, default_value_t = 0)]
    skip_first_rest: i64,

    /// Speak every N minutes (minutes mode). 0 = every minute.
    #[arg(long, default_value_t = 0)]
    speak_interval: i64,

    /// Speak only at specific minutes, comma-separated (e.g. "30,15,10,5,1")
    #[arg(long, value_delimiter = ',')]
    speak_at: Vec<i64>,

    /// Optional spoken lead-in line (e.g. "Get ready")
    #[arg(long)]
    lead_in: Option<String>,

    /// Optional spoken phrase at the very end (e.g. "Good job!")
    #[arg(long)]
    end_with: Option<String>,

    #[arg(long, default_value = "rest")]
    rest_text: String,

    #[arg(long, default_value = "minutes remaining")]
    minute_text: String,

    /// Synthesis language code (e.g. en, es)
    #[arg(long, default_value = "en")]
    language: String,

    /// Synthesis voice region (com, co.uk, com.au, ...)
    #[arg(long, default_value = "com")]
    accent: String,

    #[arg(long, default_value_t = 1_000)]
    beep_freq: i64,

    #[arg(long, default_value_t = 300)]
    beep_ms: i64,

    /// Beep gain in dB (negative = quieter)
    #[arg(long, default_value_t = -6.0, allow_negative_numbers = true)]
    beep_gain_db: f32,

    /// Fade in/out per fragment to avoid clicks
    #[arg(long, default_value_t = 12)]
    fade_ms: i64,

    #[arg(long, default_value = "countdown.wav")]
    outfile: PathBuf,

    #[arg(long, default_value_t = 192)]
    bitrate_kbps: u32,

    #[arg(long, default_value = "tts_cache")]
    cache_dir: PathBuf,

    /// Base URL of the speech synthesis service
    #[arg(long, default_value = "http://localhost:5002")]
    synth_url: String,

    /// Load all countdown parameters from a preset JSON file instead of flags
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Write the resolved parameters to a preset JSON file and exit
    #[arg(long)]
    save_preset: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Reps,
    Minutes,
}

impl From<ModeArg> for ModeTag {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Reps => ModeTag::Reps,
            ModeArg::Minutes => ModeTag::Minutes,
        }
    }
}

impl Args {
    fn to_spec(&self) -> CountdownSpec {
        CountdownSpec {
            mode: self.mode.into(),
            start: self.start,
            interval_ms: self.interval_ms,
            long_interval_ms: self.long_interval_ms,
            every_n: self.every_n,
            skip_first_rest: self.skip_first_rest,
            speak_interval: self.speak_interval,
            speak_at: self.speak_at.clone(),
            lead_in_text: self.lead_in.clone(),
            end_text: self.end_with.clone(),
            rest_text: self.rest_text.clone(),
            minute_text: self.minute_text.clone(),
            language: self.language.clone(),
            accent: self.accent.clone(),
            beep_freq_hz: self.beep_freq,
            beep_duration_ms: self.beep_ms,
            beep_gain_db: self.beep_gain_db,
            fade_ms: self.fade_ms,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let spec = match &args.preset {
        Some(path) => CountdownSpec::from_json_file(path)
            .with_context(|| format!("loading preset {}", path.display()))?,
        None => args.to_spec(),
    };

    if let Some(path) = &args.save_preset {
        spec.to_json_file(path)?;
        println!("Wrote preset: {}", path.display());
        return Ok(());
    }

    let config = spec.validate()?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling build");
                cancel.cancel();
            }
        });
    }

    let backend = HttpSynthBackend::new(&args.synth_url);
    let cache = SpeechCache::new(&args.cache_dir, backend, RetryPolicy::default())?;

    let (track, timeline) = cuetrack::build_track(&config, cache, cancel).await?;

    // Encode, then commit both artifacts atomically: a failed build must not
    // leave a truncated track or a timeline referencing one.
    let encoder = WavEncoder;
    let encoded = encoder.encode(&track, args.bitrate_kbps)?;
    let outfile = args.outfile.with_extension(encoder.extension());
    write_atomic(&outfile, &encoded)?;

    let timeline_path = outfile.with_extension("json");
    let timeline_json = serde_json::to_string_pretty(&timeline)?;
    write_atomic(&timeline_path, timeline_json.as_bytes())?;

    println!("Wrote: {}", outfile.display());
    println!("Wrote: {}", timeline_path.display());
    println!(
        "Track: {:.1}s, {} cues. Cache: {} (delete to refresh voices).",
        track.duration_ms() as f64 / 1000.0,
        timeline.len(),
        args.cache_dir.display()
    );
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let tmp = path.with_extension("part");
    std::fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
    Ok(())
}
