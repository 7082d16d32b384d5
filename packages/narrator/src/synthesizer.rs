//! Bounded-concurrency, cached, retrying speech synthesis.

use futures::StreamExt;
use indicatif::ProgressBar;
use narrator_domain::{Fingerprint, ProviderError, SpeechProvider, SynthesisJob, VoiceTable};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::cache::ClipCache;
use crate::retry::RetryPolicy;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The speaker has no entry in the voice table.
    UnmappedSpeaker,
    /// Nothing to say.
    BlankText,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmappedSpeaker => f.write_str("no voice mapped for speaker"),
            Self::BlankText => f.write_str("blank text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobFailure {
    /// The provider rejected the line or kept failing until the attempt cap.
    Provider {
        error: ProviderError,
        attempts: u32,
        exhausted: bool,
    },
    /// Audio arrived but could not be written to the cache.
    Storage(String),
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider {
                error,
                attempts,
                exhausted: true,
            } => write!(f, "gave up after {attempts} attempts: {error}"),
            Self::Provider { error, .. } => write!(f, "rejected: {error}"),
            Self::Storage(reason) => write!(f, "cache write failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Clip already present; no provider call made.
    Cached,
    Synthesized { attempts: u32 },
    Skipped(SkipReason),
    Failed(JobFailure),
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: SynthesisJob,
    pub outcome: JobOutcome,
}

/// Settled state of every unique job in a batch, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct SynthesisReport {
    pub jobs: Vec<JobReport>,
    /// Jobs dropped before fan-out because an earlier job had the same
    /// fingerprint.
    pub duplicates: usize,
}

impl SynthesisReport {
    fn count(&self, pred: impl Fn(&JobOutcome) -> bool) -> usize {
        self.jobs.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn cached(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Cached))
    }

    pub fn synthesized(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Synthesized { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Failed(_)))
    }

    pub fn outcome_of(&self, fingerprint: &Fingerprint) -> Option<&JobOutcome> {
        self.jobs
            .iter()
            .find(|r| &r.job.fingerprint == fingerprint)
            .map(|r| &r.outcome)
    }
}

pub struct SpeechSynthesizer<P> {
    provider: Arc<P>,
    cache: ClipCache,
    voices: VoiceTable,
    retry: RetryPolicy,
    max_in_flight: usize,
}

impl<P: SpeechProvider> SpeechSynthesizer<P> {
    pub fn new(provider: P, cache: ClipCache, voices: VoiceTable) -> Self {
        Self::from_shared(Arc::new(provider), cache, voices)
    }

    pub fn from_shared(provider: Arc<P>, cache: ClipCache, voices: VoiceTable) -> Self {
        Self {
            provider,
            cache,
            voices,
            retry: RetryPolicy::default(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Admission limit for concurrent jobs; values below 1 are raised to 1.
    pub fn max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = limit.max(1);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &ClipCache {
        &self.cache
    }

    /// Settle one job: serve it from cache, skip it, or call the provider
    /// under the retry policy and store the result.
    pub async fn synthesize(&self, job: &SynthesisJob) -> JobOutcome {
        if self.cache.contains(&job.fingerprint).await {
            debug!(speaker = %job.speaker, fingerprint = %job.fingerprint, "cache hit");
            return JobOutcome::Cached;
        }

        if job.text.trim().is_empty() {
            warn!(speaker = %job.speaker, "skipping blank line");
            return JobOutcome::Skipped(SkipReason::BlankText);
        }

        let Some(voice) = self.voices.resolve(&job.speaker) else {
            warn!(speaker = %job.speaker, "no voice id for speaker, skipping line");
            return JobOutcome::Skipped(SkipReason::UnmappedSpeaker);
        };

        info!(
            speaker = %job.speaker,
            text = %preview(&job.text),
            "synthesizing line"
        );

        let attempt = self
            .retry
            .run(
                |_| self.provider.synthesize(voice, &job.text),
                ProviderError::is_transient,
            )
            .await;

        match attempt {
            Ok((audio, attempts)) => match self.cache.store(&job.fingerprint, audio).await {
                Ok(path) => {
                    info!(speaker = %job.speaker, attempts, path = %path.display(), "stored clip");
                    JobOutcome::Synthesized { attempts }
                }
                Err(e) => {
                    error!(speaker = %job.speaker, error = %e, "could not store clip");
                    JobOutcome::Failed(JobFailure::Storage(e.to_string()))
                }
            },
            Err(failure) => {
                error!(
                    speaker = %job.speaker,
                    attempts = failure.attempts,
                    exhausted = failure.exhausted,
                    error = %failure.error,
                    "synthesis failed"
                );
                JobOutcome::Failed(JobFailure::Provider {
                    error: failure.error,
                    attempts: failure.attempts,
                    exhausted: failure.exhausted,
                })
            }
        }
    }

    /// Settle every job, at most `max_in_flight` at a time.
    ///
    /// Returns only once all jobs have succeeded, failed or been skipped.
    /// A failing job never aborts the batch.
    pub async fn synthesize_all(&self, jobs: &[SynthesisJob]) -> SynthesisReport {
        self.synthesize_with(jobs, ProgressBar::hidden()).await
    }

    /// [`synthesize_all`](Self::synthesize_all), ticking `progress` once per
    /// settled job.
    pub async fn synthesize_with(&self, jobs: &[SynthesisJob], progress: ProgressBar) -> SynthesisReport {
        let mut seen = HashSet::new();
        let unique: Vec<&SynthesisJob> = jobs
            .iter()
            .filter(|job| seen.insert(job.fingerprint.clone()))
            .collect();
        let duplicates = jobs.len() - unique.len();

        info!(
            jobs = unique.len(),
            duplicates,
            max_in_flight = self.max_in_flight,
            "starting synthesis batch"
        );
        progress.set_length(unique.len() as u64);
        let progress = &progress;

        let mut settled: Vec<(usize, JobReport)> =
            futures::stream::iter(unique.into_iter().enumerate())
                .map(|(index, job)| async move {
                    let outcome = self.synthesize(job).await;
                    progress.inc(1);
                    (
                        index,
                        JobReport {
                            job: job.clone(),
                            outcome,
                        },
                    )
                })
                .buffer_unordered(self.max_in_flight)
                .collect()
                .await;

        settled.sort_by_key(|(index, _)| *index);
        progress.finish_and_clear();

        let report = SynthesisReport {
            jobs: settled.into_iter().map(|(_, r)| r).collect(),
            duplicates,
        };
        info!(
            synthesized = report.synthesized(),
            cached = report.cached(),
            skipped = report.skipped(),
            failed = report.failed(),
            "synthesis batch settled"
        );
        report
    }
}

fn preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 50;
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_lines() {
        assert_eq!(preview("short"), "short");
        let long = "x".repeat(80);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(50)));
    }

    #[test]
    fn failure_messages_distinguish_exhaustion() {
        let exhausted = JobFailure::Provider {
            error: ProviderError::status(429, "busy"),
            attempts: 5,
            exhausted: true,
        };
        assert_eq!(exhausted.to_string(), "gave up after 5 attempts: status 429: busy");

        let rejected = JobFailure::Provider {
            error: ProviderError::status(400, "bad"),
            attempts: 1,
            exhausted: false,
        };
        assert_eq!(rejected.to_string(), "rejected: status 400: bad");
    }
}
