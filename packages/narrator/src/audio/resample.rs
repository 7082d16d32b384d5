//! Sample-rate conversion for decoded clips.
//!
//! rubato is pure-CPU; callers feed and consume plain `Vec<f32>`.

use rubato::{FftFixedIn, Resampler};

use super::AudioError;

const CHUNK: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Resample mono PCM from `sr_in` to `sr_out`.
pub fn resample_mono(input: &[f32], sr_in: u32, sr_out: u32) -> Result<Vec<f32>, AudioError> {
    if sr_in == sr_out || input.is_empty() {
        return Ok(input.to_vec());
    }

    let mut resampler =
        FftFixedIn::<f32>::new(sr_in as usize, sr_out as usize, CHUNK, SUB_CHUNKS, 1)
            .map_err(|e| AudioError::Resample(e.to_string()))?;

    let expected_len = (input.len() as f64 * sr_out as f64 / sr_in as f64).ceil() as usize;
    // The filter delays its output; it is dropped from the head and flushed
    // from the tail with zero chunks.
    let delay = resampler.output_delay();
    let wanted = delay + expected_len;
    let mut out = Vec::with_capacity(wanted + CHUNK);

    let mut pos = 0;
    while out.len() < wanted {
        let chunk = resampler.input_frames_next();
        let start = pos.min(input.len());
        let end = (pos + chunk).min(input.len());

        // Zero-pad the final partial chunk and every flush chunk.
        let mut input_chunk = vec![0.0; chunk];
        input_chunk[..end - start].copy_from_slice(&input[start..end]);

        let block = vec![input_chunk];
        let frames = resampler
            .process(&block, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        out.extend_from_slice(&frames[0]);

        pos += chunk;
    }

    out.drain(..delay);
    out.truncate(expected_len);
    Ok(out)
}
