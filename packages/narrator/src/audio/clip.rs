//! Mono PCM buffer with millisecond-addressed editing.
//!
//! Every operation works in whole milliseconds and rounds down to the
//! nearest sample, mirroring how the assembler reasons about timing.

/// Mono `f32` samples in `[-1.0, 1.0]` at a fixed sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    fn offset(&self, ms: u64) -> usize {
        ms_to_samples(ms, self.sample_rate).min(self.samples.len())
    }

    /// Everything from `start_ms` to the end.
    pub fn slice_from(&self, start_ms: u64) -> AudioClip {
        let start = self.offset(start_ms);
        Self::new(self.samples[start..].to_vec(), self.sample_rate)
    }

    /// Mix `other` into `self` starting at `position_ms`.
    ///
    /// Never lengthens `self`: whatever of `other` runs past the end is
    /// dropped. Mixed samples are clamped to full scale.
    pub fn overlay(&mut self, other: &AudioClip, position_ms: u64) {
        debug_assert_eq!(self.sample_rate, other.sample_rate, "overlay across sample rates");
        let start = self.offset(position_ms);
        for (dst, src) in self.samples[start..].iter_mut().zip(other.samples.iter()) {
            *dst = (*dst + *src).clamp(-1.0, 1.0);
        }
    }

    /// Append `other`, blending the last `crossfade_ms` of `self` with the
    /// first `crossfade_ms` of `other`.
    ///
    /// The result is `crossfade_ms` shorter than the two clips laid end to
    /// end. The crossfade is clamped to the shorter clip.
    pub fn append(&mut self, other: &AudioClip, crossfade_ms: u64) {
        debug_assert_eq!(self.sample_rate, other.sample_rate, "append across sample rates");
        let fade = ms_to_samples(crossfade_ms, self.sample_rate)
            .min(self.samples.len())
            .min(other.samples.len());

        if fade > 0 {
            let tail_start = self.samples.len() - fade;
            for i in 0..fade {
                let gain_in = (i + 1) as f32 / (fade + 1) as f32;
                let outgoing = self.samples[tail_start + i] * (1.0 - gain_in);
                let incoming = other.samples[i] * gain_in;
                self.samples[tail_start + i] = (outgoing + incoming).clamp(-1.0, 1.0);
            }
        }
        self.samples.extend_from_slice(&other.samples[fade..]);
    }
}

pub fn ms_to_samples(ms: u64, sample_rate: u32) -> usize {
    (ms * sample_rate as u64 / 1000) as usize
}
