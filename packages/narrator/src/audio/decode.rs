//! Encoded clip bytes → mono [`AudioClip`] at the track sample rate.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{AudioClip, AudioError, resample::resample_mono};

/// Decode any container symphonia can probe, down-mix to mono and resample
/// to `target_rate`.
///
/// `extension` is only a probe hint; detection falls back to content.
pub fn decode_clip(bytes: Vec<u8>, extension: &str, target_rate: u32) -> Result<AudioClip, AudioError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if !extension.is_empty() {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoAudioTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut mono = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt frame: skip it, keep the rest of the clip.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        if sample_rate == 0 {
            sample_rate = spec.rate;
        }
        let channels = spec.channels.count().max(1);

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        mono.extend(
            sample_buf
                .samples()
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    if sample_rate == 0 {
        return Err(AudioError::UnknownSampleRate);
    }

    let samples = resample_mono(&mono, sample_rate, target_rate)?;
    Ok(AudioClip::new(samples, target_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav(samples: &[i16], rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for s in samples {
                writer.write_sample(*s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_mono_wav() {
        let clip = decode_clip(wav(&[8192; 1500], 1000, 1), "wav", 1000).unwrap();
        assert_eq!(clip.duration_ms(), 1500);
        assert!((clip.samples()[0] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn downmixes_stereo() {
        // Interleaved L/R: left full-ish, right silent.
        let frames: Vec<i16> = (0..500).flat_map(|_| [16384i16, 0]).collect();
        let clip = decode_clip(wav(&frames, 1000, 2), "wav", 1000).unwrap();
        assert_eq!(clip.len(), 500);
        assert!((clip.samples()[10] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_clip(b"definitely not audio".to_vec(), "mp3", 1000).is_err());
    }
}
