#![allow(dead_code)]

use narrator::NarratorConfig;
use narrator::config::RetryConfig;
use narrator_domain::{ProviderError, SpeechProvider, VoiceId, VoiceTable};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// 1 sample per millisecond keeps every duration exact.
pub const RATE: u32 = 1000;

#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Succeed with a clip of this many milliseconds.
    Audio(u64),
    /// Always answer with this HTTP status.
    Status(u16),
    /// Fail with this status `failures` times, then succeed.
    FlakyThenAudio { status: u16, failures: usize, ms: u64 },
    /// Drop the connection `failures` times, then succeed.
    TransportThenAudio { failures: usize, ms: u64 },
}

/// Scripted [`SpeechProvider`] that counts calls and tracks concurrency.
pub struct MockProvider {
    default_ms: u64,
    behaviours: HashMap<String, Behaviour>,
    latency: Duration,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockProvider {
    pub fn new(default_ms: u64) -> Self {
        Self {
            default_ms,
            behaviours: HashMap::new(),
            latency: Duration::ZERO,
            calls: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn on(mut self, text: &str, behaviour: Behaviour) -> Self {
        self.behaviours.insert(text.to_string(), behaviour);
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls_for(&self, text: &str) -> usize {
        self.calls.lock().unwrap().get(text).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, text: &str, call: usize) -> Result<Vec<u8>, ProviderError> {
        match self.behaviours.get(text) {
            None => Ok(wav_clip(self.default_ms, 0.1)),
            Some(Behaviour::Audio(ms)) => Ok(wav_clip(*ms, 0.1)),
            Some(Behaviour::Status(status)) => Err(ProviderError::status(*status, "scripted")),
            Some(Behaviour::FlakyThenAudio { status, failures, ms }) => {
                if call <= *failures {
                    Err(ProviderError::status(*status, "scripted"))
                } else {
                    Ok(wav_clip(*ms, 0.1))
                }
            }
            Some(Behaviour::TransportThenAudio { failures, ms }) => {
                if call <= *failures {
                    Err(ProviderError::Transport("connection reset".into()))
                } else {
                    Ok(wav_clip(*ms, 0.1))
                }
            }
        }
    }
}

impl SpeechProvider for MockProvider {
    async fn synthesize(&self, _voice: &VoiceId, text: &str) -> Result<Vec<u8>, ProviderError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(text.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let result = self.respond(text, call);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn clip_extension(&self) -> &str {
        "wav"
    }
}

/// Constant-level mono WAV at [`RATE`].
pub fn wav_clip(ms: u64, level: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let sample = (level * i16::MAX as f32) as i16;
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..ms * RATE as u64 / 1000 {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub fn voices() -> VoiceTable {
    VoiceTable::empty()
        .with_voice("Jessica", "voice-jessica")
        .with_voice("Ethan", "voice-ethan")
        .with_voice("Alex", "voice-alex")
}

/// Fast retries, exact timing, no bars, everything under `root`.
pub fn config(root: &Path) -> NarratorConfig {
    NarratorConfig {
        cache_dir: root.join("cache"),
        output_dir: root.join("out"),
        sample_rate: RATE,
        show_progress: false,
        retry: RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            jitter: false,
        },
        voices: voices(),
        ..NarratorConfig::default()
    }
}

pub fn wav_duration_ms(path: &Path) -> u64 {
    let reader = hound::WavReader::open(path).unwrap();
    reader.duration() as u64 * 1000 / reader.spec().sample_rate as u64
}
