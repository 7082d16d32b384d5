//! [`SpeechProvider`] backed by the ElevenLabs text-to-speech endpoint.

use crate::client::ElevenLabsClient;
use crate::endpoints::text_to_speech::{TextToSpeech, TextToSpeechBody};
use crate::error::Result;
use crate::shared::{Model, OutputFormat};
use narrator_domain::{ProviderError, SpeechProvider, VoiceId, VoiceSettings};
use std::io::Cursor;
use tracing::debug;

#[derive(Clone)]
pub struct ElevenLabsSpeech {
    client: ElevenLabsClient,
    model: Model,
    voice_settings: VoiceSettings,
    output_format: OutputFormat,
}

impl ElevenLabsSpeech {
    pub fn new(client: ElevenLabsClient) -> Self {
        Self {
            client,
            model: Model::default(),
            voice_settings: VoiceSettings::default(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn voice_settings(mut self, settings: VoiceSettings) -> Self {
        self.voice_settings = settings;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    async fn request(&self, voice: &VoiceId, text: &str) -> Result<Vec<u8>> {
        let body = TextToSpeechBody::new(text)
            .with_model_id(self.model)
            .with_voice_settings(self.voice_settings);
        let endpoint =
            TextToSpeech::new(voice.clone(), body).with_output_format(self.output_format);

        let audio = self.client.hit(endpoint).await?;
        debug!(voice = %voice, bytes = audio.len(), "received audio");

        match self.output_format.pcm_sample_rate() {
            Some(sample_rate) => wrap_pcm_s16le(&audio, sample_rate),
            None => Ok(audio.to_vec()),
        }
    }
}

impl SpeechProvider for ElevenLabsSpeech {
    async fn synthesize(&self, voice: &VoiceId, text: &str) -> std::result::Result<Vec<u8>, ProviderError> {
        self.request(voice, text).await.map_err(ProviderError::from)
    }

    fn clip_extension(&self) -> &str {
        self.output_format.extension()
    }
}

/// Headerless mono s16le → WAV container.
fn wrap_pcm_s16le(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for frame in pcm.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([frame[0], frame[1]]))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}
