//! TOML configuration, constructed once at startup and passed in.

use narrator_domain::{VoiceSettings, VoiceTable};
use narrator_elevenlabs::{ClientConfig, Model, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{NarratorError, Result};
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarratorConfig {
    /// Root of the content-addressed clip cache.
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: String,
    /// Sample rate of the assembled track; clips are resampled to it.
    pub sample_rate: u32,
    /// Provider calls allowed in flight per narration.
    pub max_concurrent_requests: usize,
    /// How far before the end of a line an overlapping line cuts in.
    pub overlap_lead_ms: u64,
    /// Upper bound of the crossfade between consecutive turns.
    pub crossfade_ms: u64,
    pub show_progress: bool,
    pub retry: RetryConfig,
    pub provider: ProviderConfig,
    pub voices: VoiceTable,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("audio"),
            output_dir: PathBuf::from("audio"),
            output_file: "final_podcast.wav".to_string(),
            sample_rate: 44_100,
            max_concurrent_requests: 2,
            overlap_lead_ms: 850,
            crossfade_ms: 10,
            show_progress: true,
            retry: RetryConfig::default(),
            provider: ProviderConfig::default(),
            voices: VoiceTable::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            jitter: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub model: Model,
    pub output_format: OutputFormat,
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
    /// Overrides the ElevenLabs API root.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let settings = VoiceSettings::default();
        Self {
            model: Model::default(),
            output_format: OutputFormat::default(),
            stability: settings.stability,
            similarity_boost: settings.similarity_boost,
            style: settings.style,
            use_speaker_boost: settings.use_speaker_boost,
            base_url: None,
            timeout_secs: 60,
        }
    }
}

impl ProviderConfig {
    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..ClientConfig::default()
        };
        if let Some(base_url) = &self.base_url {
            client.base_url = base_url.clone();
        }
        client
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        VoiceSettings::new(self.stability, self.similarity_boost)
            .with_style(self.style)
            .with_speaker_boost(self.use_speaker_boost)
    }
}

impl NarratorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| NarratorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| NarratorError::io(path, e))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(NarratorError::Config("sample_rate must be positive".into()));
        }
        if self.max_concurrent_requests == 0 {
            return Err(NarratorError::Config(
                "max_concurrent_requests must be at least 1".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(NarratorError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(NarratorError::Config(
                "retry.initial_delay_ms exceeds retry.max_delay_ms".into(),
            ));
        }
        if self.output_file.trim().is_empty() {
            return Err(NarratorError::Config("output_file must not be empty".into()));
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            jitter: self.retry.jitter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = NarratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, NarratorConfig::default());
        assert_eq!(config.max_concurrent_requests, 2);
        assert_eq!(config.overlap_lead_ms, 850);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.voices.len(), 4);
        assert_eq!(config.output_path(), PathBuf::from("audio/final_podcast.wav"));
    }

    #[test]
    fn full_file_overrides_everything() {
        let config = NarratorConfig::from_toml_str(
            r#"
            cache_dir = "/tmp/clips"
            output_dir = "/tmp/out"
            output_file = "episode.wav"
            sample_rate = 24000
            overlap_lead_ms = 600
            show_progress = false

            [retry]
            max_attempts = 3
            initial_delay_ms = 10
            max_delay_ms = 100
            jitter = false

            [provider]
            model = "eleven_turbo_v2_5"
            output_format = "pcm_24000"
            stability = 0.3

            [voices]
            Host = "voice-a"
            Guest = "voice-b"
            "#,
        )
        .unwrap();

        assert_eq!(config.sample_rate, 24_000);
        assert_eq!(config.overlap_lead_ms, 600);
        assert_eq!(config.provider.model, Model::ElevenTurboV2_5);
        assert_eq!(config.provider.output_format, OutputFormat::Pcm24000Hz);
        assert_eq!(config.provider.voice_settings().stability, 0.3);
        assert_eq!(config.provider.voice_settings().similarity_boost, 0.75);
        assert_eq!(config.voices.len(), 2);
        assert!(config.voices.resolve("Jessica").is_none());

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.max_delay, Duration::from_millis(100));
        assert!(!policy.jitter);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = NarratorConfig::from_toml_str("max_concurrent_requests = 0").unwrap_err();
        assert!(matches!(err, NarratorError::Config(_)));
    }

    #[test]
    fn zero_attempts_are_rejected() {
        let err = NarratorConfig::from_toml_str("[retry]\nmax_attempts = 0").unwrap_err();
        assert!(matches!(err, NarratorError::Config(_)));
    }

    #[test]
    fn unknown_model_is_a_config_error() {
        let err = NarratorConfig::from_toml_str("[provider]\nmodel = \"eleven_v9\"").unwrap_err();
        assert!(matches!(err, NarratorError::Config(_)));
    }

    #[test]
    fn provider_section_shapes_the_http_client() {
        let config = NarratorConfig::from_toml_str(
            "[provider]\nbase_url = \"http://127.0.0.1:9000\"\ntimeout_secs = 5",
        )
        .unwrap();
        let client = config.provider.client_config();
        assert_eq!(client.base_url, "http://127.0.0.1:9000");
        assert_eq!(client.timeout, Duration::from_secs(5));

        let default = ProviderConfig::default().client_config();
        assert_eq!(default.base_url, ClientConfig::default().base_url);
    }
}
