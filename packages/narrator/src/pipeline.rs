//! flatten → synthesize → assemble → export.

use narrator_domain::{DialogueScript, SpeechProvider, flatten};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::assembler::{AssemblerSettings, AudioAssembler, TurnStatus};
use crate::cache::ClipCache;
use crate::config::NarratorConfig;
use crate::error::{NarratorError, Result};
use crate::setup::phase_bar;
use crate::synthesizer::{SpeechSynthesizer, SynthesisReport};

/// Result of one narration request.
#[derive(Debug, Clone)]
pub struct NarrationReport {
    pub output: PathBuf,
    pub duration_ms: u64,
    pub synthesis: SynthesisReport,
    pub turns_included: usize,
    /// `(speaker, reason)` for every top-level turn left out of the track.
    pub turns_skipped: Vec<(String, String)>,
}

/// Renders dialogue scripts with one provider and one configuration.
///
/// The clip cache outlives any single request; clips synthesized for one
/// script are reused by the next.
pub struct Narrator<P> {
    synthesizer: SpeechSynthesizer<P>,
    config: NarratorConfig,
}

impl<P: SpeechProvider> Narrator<P> {
    pub async fn new(provider: P, config: NarratorConfig) -> Result<Self> {
        config.validate()?;
        let provider = Arc::new(provider);
        let cache = ClipCache::open(&config.cache_dir, provider.clip_extension()).await?;
        let synthesizer = SpeechSynthesizer::from_shared(provider, cache, config.voices.clone())
            .retry_policy(config.retry_policy())
            .max_in_flight(config.max_concurrent_requests);
        Ok(Self {
            synthesizer,
            config,
        })
    }

    pub fn config(&self) -> &NarratorConfig {
        &self.config
    }

    pub fn cache(&self) -> &ClipCache {
        self.synthesizer.cache()
    }

    pub fn provider(&self) -> &P {
        self.synthesizer.provider()
    }

    /// Render to the configured output path.
    pub async fn narrate(&self, script: &DialogueScript) -> Result<NarrationReport> {
        self.narrate_to(script, &self.config.output_path()).await
    }

    pub async fn narrate_to(&self, script: &DialogueScript, output: &Path) -> Result<NarrationReport> {
        if script.is_empty() {
            return Err(NarratorError::EmptyDialogue);
        }
        let started = Instant::now();
        let jobs = flatten(script.turns());
        info!(turns = script.len(), jobs = jobs.len(), "narrating script");

        let synth_bar = phase_bar(self.config.show_progress, "synthesis")?;
        let synthesis = self.synthesizer.synthesize_with(&jobs, synth_bar).await;

        let join_bar = phase_bar(self.config.show_progress, "joining")?;
        let assembler = AudioAssembler::new(self.assembler_settings()).progress(join_bar);
        let track = assembler.assemble(self.cache(), script.turns()).await?;

        let target = output.to_path_buf();
        let track = tokio::task::spawn_blocking(move || track.export(&target).map(|()| track))
            .await
            .map_err(|e| NarratorError::Export {
                path: output.to_path_buf(),
                reason: e.to_string(),
            })??;

        let turns_skipped = track
            .skipped()
            .map(|turn| {
                let reason = match &turn.status {
                    TurnStatus::Skipped(cause) => cause.to_string(),
                    TurnStatus::Included { .. } => String::new(),
                };
                (turn.speaker.clone(), reason)
            })
            .collect();

        let report = NarrationReport {
            output: output.to_path_buf(),
            duration_ms: track.duration_ms(),
            synthesis,
            turns_included: track.included(),
            turns_skipped,
        };
        info!(
            output = %report.output.display(),
            duration_ms = report.duration_ms,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "narration complete"
        );
        Ok(report)
    }

    fn assembler_settings(&self) -> AssemblerSettings {
        AssemblerSettings {
            overlap_lead_ms: self.config.overlap_lead_ms,
            crossfade_ms: self.config.crossfade_ms,
            sample_rate: self.config.sample_rate,
        }
    }
}
