//! Joins cached clips into one track in script order.
//!
//! Assembly runs in two phases. [`ClipBank::load`] reads and decodes every
//! clip the script references; [`AudioAssembler::join`] then builds the track
//! purely in memory, so timing rules are testable without a cache.

use futures::StreamExt;
use indicatif::ProgressBar;
use narrator_domain::{DialogueTurn, Fingerprint, flatten};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::audio::{AudioClip, decode_clip, write_wav};
use crate::cache::ClipCache;
use crate::error::{NarratorError, Result};

const DECODE_PARALLELISM: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerSettings {
    /// How far before the end of the base clip an overlap starts.
    pub overlap_lead_ms: u64,
    /// Upper bound of the crossfade between consecutive turns.
    pub crossfade_ms: u64,
    pub sample_rate: u32,
}

impl Default for AssemblerSettings {
    fn default() -> Self {
        Self {
            overlap_lead_ms: 850,
            crossfade_ms: 10,
            sample_rate: 44_100,
        }
    }
}

/// Why a line contributed no audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipCause {
    NotCached,
    Unreadable(String),
}

impl fmt::Display for SkipCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotCached => f.write_str("no cached clip"),
            Self::Unreadable(reason) => write!(f, "unreadable clip: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineClip {
    Loaded(AudioClip),
    Skipped(SkipCause),
}

/// Decoded clips for one script, keyed by fingerprint.
#[derive(Debug, Default)]
pub struct ClipBank {
    clips: HashMap<Fingerprint, LineClip>,
}

impl ClipBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and decode every clip referenced by `turns` at any depth.
    ///
    /// Missing or undecodable clips are recorded as skipped, never as errors.
    pub async fn load(cache: &ClipCache, turns: &[DialogueTurn], sample_rate: u32) -> Self {
        let mut seen = HashSet::new();
        let fingerprints: Vec<Fingerprint> = flatten(turns)
            .into_iter()
            .map(|job| job.fingerprint)
            .filter(|fp| seen.insert(fp.clone()))
            .collect();

        let clips = futures::stream::iter(fingerprints)
            .map(|fp| async move {
                let line = load_line(cache, &fp, sample_rate).await;
                (fp, line)
            })
            .buffer_unordered(DECODE_PARALLELISM)
            .collect()
            .await;

        Self { clips }
    }

    pub fn insert(&mut self, fingerprint: Fingerprint, line: LineClip) {
        self.clips.insert(fingerprint, line);
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&LineClip> {
        self.clips.get(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    fn clip_for(&self, turn: &DialogueTurn) -> std::result::Result<&AudioClip, SkipCause> {
        match self.get(&turn.fingerprint()) {
            Some(LineClip::Loaded(clip)) => Ok(clip),
            Some(LineClip::Skipped(cause)) => Err(cause.clone()),
            None => Err(SkipCause::NotCached),
        }
    }
}

async fn load_line(cache: &ClipCache, fingerprint: &Fingerprint, sample_rate: u32) -> LineClip {
    let bytes = match cache.load(fingerprint).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return LineClip::Skipped(SkipCause::NotCached),
        Err(e) => return LineClip::Skipped(SkipCause::Unreadable(e.to_string())),
    };

    let extension = cache.extension().to_string();
    let decoded =
        tokio::task::spawn_blocking(move || decode_clip(bytes, &extension, sample_rate)).await;

    match decoded {
        Ok(Ok(clip)) => {
            debug!(%fingerprint, duration_ms = clip.duration_ms(), "decoded clip");
            LineClip::Loaded(clip)
        }
        Ok(Err(e)) => {
            warn!(%fingerprint, error = %e, "cached clip does not decode");
            LineClip::Skipped(SkipCause::Unreadable(e.to_string()))
        }
        Err(e) => LineClip::Skipped(SkipCause::Unreadable(e.to_string())),
    }
}

/// Crossfade between the running track and the next turn.
///
/// Zero when either side is shorter than `max_ms`, otherwise the smallest
/// of `max_ms` and half of each side.
pub fn crossfade_duration(max_ms: u64, incoming_ms: u64, running_ms: u64) -> u64 {
    if incoming_ms < max_ms || running_ms < max_ms {
        0
    } else {
        max_ms.min(incoming_ms / 2).min(running_ms / 2)
    }
}

/// Where an overlap landed on its base clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPlacement {
    pub start_ms: u64,
    /// Length of the overlap tail appended past the end of the base.
    pub appended_ms: u64,
}

/// Mix `overlap` into the last `lead_ms` of `base`; whatever of the overlap
/// runs past `lead_ms` is appended after the base without a crossfade.
pub fn overlay_with_tail(base: &mut AudioClip, overlap: &AudioClip, lead_ms: u64) -> OverlayPlacement {
    let start_ms = base.duration_ms().saturating_sub(lead_ms);
    base.overlay(overlap, start_ms);

    let appended_ms = if overlap.duration_ms() > lead_ms {
        let tail = overlap.slice_from(lead_ms);
        let tail_ms = tail.duration_ms();
        base.append(&tail, 0);
        tail_ms
    } else {
        0
    };

    OverlayPlacement {
        start_ms,
        appended_ms,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnStatus {
    Included {
        /// Length of the turn with its overlaps folded in.
        duration_ms: u64,
        crossfade_ms: u64,
        overlaps_included: usize,
        overlaps_skipped: usize,
    },
    Skipped(SkipCause),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSummary {
    pub speaker: String,
    pub fingerprint: Fingerprint,
    pub status: TurnStatus,
}

/// The joined clip plus what happened to each top-level turn.
#[derive(Debug, Clone)]
pub struct AssembledTrack {
    clip: AudioClip,
    turns: Vec<TurnSummary>,
}

impl AssembledTrack {
    pub fn clip(&self) -> &AudioClip {
        &self.clip
    }

    pub fn duration_ms(&self) -> u64 {
        self.clip.duration_ms()
    }

    pub fn turns(&self) -> &[TurnSummary] {
        &self.turns
    }

    pub fn included(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| matches!(t.status, TurnStatus::Included { .. }))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &TurnSummary> {
        self.turns
            .iter()
            .filter(|t| matches!(t.status, TurnStatus::Skipped(_)))
    }

    /// Write the track as 16-bit WAV.
    pub fn export(&self, path: &Path) -> Result<()> {
        write_wav(path, &self.clip).map_err(|e| NarratorError::Export {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), duration_ms = self.duration_ms(), "exported track");
        Ok(())
    }
}

/// A turn's clip with every overlap below it folded in.
struct ResolvedTurn {
    clip: AudioClip,
    overlaps_included: usize,
    overlaps_skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AudioAssembler {
    settings: AssemblerSettings,
    progress: Option<ProgressBar>,
}

impl AudioAssembler {
    pub fn new(settings: AssemblerSettings) -> Self {
        Self {
            settings,
            progress: None,
        }
    }

    pub fn progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    pub fn settings(&self) -> &AssemblerSettings {
        &self.settings
    }

    /// Load the script's clips from `cache` and join them.
    pub async fn assemble(&self, cache: &ClipCache, turns: &[DialogueTurn]) -> Result<AssembledTrack> {
        if turns.is_empty() {
            return Err(NarratorError::EmptyDialogue);
        }
        let bank = ClipBank::load(cache, turns, self.settings.sample_rate).await;
        self.join(turns, &bank)
    }

    /// Build the track from already-decoded clips.
    ///
    /// Turns without audio leave no gap and no silence; they are simply
    /// absent. Fails only when nothing at all could be joined.
    pub fn join(&self, turns: &[DialogueTurn], bank: &ClipBank) -> Result<AssembledTrack> {
        if turns.is_empty() {
            return Err(NarratorError::EmptyDialogue);
        }
        if let Some(bar) = &self.progress {
            bar.set_length(turns.len() as u64);
        }

        let mut track = AudioClip::empty(self.settings.sample_rate);
        let mut summaries = Vec::with_capacity(turns.len());

        for (index, turn) in turns.iter().enumerate() {
            let status = match self.resolve(turn, bank) {
                Ok(resolved) => {
                    let duration_ms = resolved.clip.duration_ms();
                    let crossfade_ms =
                        crossfade_duration(self.settings.crossfade_ms, duration_ms, track.duration_ms());
                    track.append(&resolved.clip, crossfade_ms);
                    info!(
                        turn = index + 1,
                        speaker = %turn.speaker,
                        duration_ms,
                        crossfade_ms,
                        "joined turn"
                    );
                    TurnStatus::Included {
                        duration_ms,
                        crossfade_ms,
                        overlaps_included: resolved.overlaps_included,
                        overlaps_skipped: resolved.overlaps_skipped,
                    }
                }
                Err(cause) => {
                    warn!(turn = index + 1, speaker = %turn.speaker, %cause, "skipping turn");
                    TurnStatus::Skipped(cause)
                }
            };
            summaries.push(TurnSummary {
                speaker: turn.speaker.clone(),
                fingerprint: turn.fingerprint(),
                status,
            });
            if let Some(bar) = &self.progress {
                bar.inc(1);
            }
        }

        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }

        let track = AssembledTrack {
            clip: track,
            turns: summaries,
        };
        if track.included() == 0 {
            return Err(NarratorError::NothingAssembled { turns: turns.len() });
        }
        Ok(track)
    }

    fn resolve(&self, turn: &DialogueTurn, bank: &ClipBank) -> std::result::Result<ResolvedTurn, SkipCause> {
        let mut resolved = ResolvedTurn {
            clip: bank.clip_for(turn)?.clone(),
            overlaps_included: 0,
            overlaps_skipped: 0,
        };

        for overlap in &turn.overlaps {
            match self.resolve(overlap, bank) {
                Ok(inner) => {
                    let placement =
                        overlay_with_tail(&mut resolved.clip, &inner.clip, self.settings.overlap_lead_ms);
                    debug!(
                        speaker = %overlap.speaker,
                        start_ms = placement.start_ms,
                        appended_ms = placement.appended_ms,
                        "overlaid line"
                    );
                    resolved.overlaps_included += 1 + inner.overlaps_included;
                    resolved.overlaps_skipped += inner.overlaps_skipped;
                }
                Err(cause) => {
                    warn!(speaker = %overlap.speaker, %cause, "skipping overlap");
                    // Lines nested under a missing overlap are lost with it.
                    resolved.overlaps_skipped += overlap.line_count();
                }
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1000;

    fn tone(ms: u64, level: f32) -> AudioClip {
        AudioClip::new(vec![level; ms as usize], RATE)
    }

    fn assembler() -> AudioAssembler {
        AudioAssembler::new(AssemblerSettings {
            sample_rate: RATE,
            ..AssemblerSettings::default()
        })
    }

    fn bank(lines: &[(&DialogueTurn, AudioClip)]) -> ClipBank {
        let mut bank = ClipBank::new();
        for (turn, clip) in lines {
            bank.insert(turn.fingerprint(), LineClip::Loaded(clip.clone()));
        }
        bank
    }

    #[test]
    fn short_clip_after_empty_track_gets_no_crossfade() {
        assert_eq!(crossfade_duration(10, 5, 0), 0);
        assert_eq!(crossfade_duration(10, 1000, 0), 0);
        assert_eq!(crossfade_duration(10, 5, 1000), 0);
    }

    #[test]
    fn long_clips_get_the_full_crossfade() {
        assert_eq!(crossfade_duration(10, 1000, 1000), 10);
        assert_eq!(crossfade_duration(10, 10, 1000), 5);
    }

    #[test]
    fn short_overlap_starts_before_the_end_without_extending() {
        let mut base = tone(2000, 0.1);
        let placement = overlay_with_tail(&mut base, &tone(800, 0.2), 850);
        assert_eq!(placement, OverlayPlacement { start_ms: 1150, appended_ms: 0 });
        assert_eq!(base.duration_ms(), 2000);
        assert!((base.samples()[1149] - 0.1).abs() < 1e-6);
        assert!((base.samples()[1150] - 0.3).abs() < 1e-6);
        assert!((base.samples()[1950] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn long_overlap_appends_its_tail() {
        let mut base = tone(2000, 0.1);
        let placement = overlay_with_tail(&mut base, &tone(1200, 0.2), 850);
        assert_eq!(placement, OverlayPlacement { start_ms: 1150, appended_ms: 350 });
        assert_eq!(base.duration_ms(), 2350);
        assert!((base.samples()[2100] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn overlap_on_short_base_starts_at_zero() {
        let mut base = tone(300, 0.1);
        let placement = overlay_with_tail(&mut base, &tone(500, 0.2), 850);
        assert_eq!(placement.start_ms, 0);
        assert_eq!(placement.appended_ms, 0);
        assert_eq!(base.duration_ms(), 300);
    }

    #[test]
    fn missing_turn_is_left_out() {
        let a = DialogueTurn::new("Jessica", "one");
        let b = DialogueTurn::new("Ethan", "two");
        let c = DialogueTurn::new("Jessica", "three");
        let turns = vec![a.clone(), b, c.clone()];
        let bank = bank(&[(&a, tone(1000, 0.1)), (&c, tone(1000, 0.1))]);

        let track = assembler().join(&turns, &bank).unwrap();

        assert_eq!(track.duration_ms(), 1990);
        assert_eq!(track.included(), 2);
        let skipped: Vec<_> = track.skipped().map(|t| t.speaker.as_str()).collect();
        assert_eq!(skipped, vec!["Ethan"]);
    }

    #[test]
    fn nested_overlaps_fold_into_their_parent() {
        let inner = DialogueTurn::new("Ethan", "deeper");
        let overlap = DialogueTurn::new("Jessica", "over").with_overlap(inner.clone());
        let base = DialogueTurn::new("Alex", "base").with_overlap(overlap.clone());
        let bank = bank(&[
            (&base, tone(2000, 0.1)),
            (&overlap, tone(1000, 0.1)),
            (&inner, tone(1000, 0.1)),
        ]);

        let track = assembler().join(&[base], &bank).unwrap();

        // inner folds into overlap: 1000 + 150 = 1150 ms.
        // overlap on base: starts at 1150, appends 1150 - 850 = 300 ms.
        assert_eq!(track.duration_ms(), 2300);
        assert_eq!(
            track.turns()[0].status,
            TurnStatus::Included {
                duration_ms: 2300,
                crossfade_ms: 0,
                overlaps_included: 2,
                overlaps_skipped: 0,
            }
        );
    }

    #[test]
    fn missing_overlap_does_not_drop_its_turn() {
        let overlap = DialogueTurn::new("Ethan", "gone");
        let base = DialogueTurn::new("Jessica", "here").with_overlap(overlap);
        let bank = bank(&[(&base, tone(1000, 0.1))]);

        let track = assembler().join(&[base], &bank).unwrap();

        assert_eq!(track.duration_ms(), 1000);
        assert!(matches!(
            track.turns()[0].status,
            TurnStatus::Included { overlaps_skipped: 1, .. }
        ));
    }

    #[test]
    fn empty_script_is_rejected() {
        let err = assembler().join(&[], &ClipBank::new()).unwrap_err();
        assert!(matches!(err, NarratorError::EmptyDialogue));
    }

    #[test]
    fn no_audio_at_all_is_rejected() {
        let turns = vec![DialogueTurn::new("Jessica", "hi"), DialogueTurn::new("Ethan", "yo")];
        let err = assembler().join(&turns, &ClipBank::new()).unwrap_err();
        assert!(matches!(err, NarratorError::NothingAssembled { turns: 2 }));
    }
}
