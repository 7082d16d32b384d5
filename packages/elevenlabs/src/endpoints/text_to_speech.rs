//! `POST /v1/text-to-speech/:voice_id`
//!
//! Converts text into speech and returns the encoded audio as raw bytes.

use super::*;
use crate::shared::{Model, OutputFormat};
use narrator_domain::{VoiceId, VoiceSettings};

#[derive(Debug, Clone, Serialize)]
pub struct TextToSpeechBody {
    pub text: String,
    pub model_id: Model,
    pub voice_settings: VoiceSettingsBody,
}

/// Wire form of [`VoiceSettings`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoiceSettingsBody {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl From<VoiceSettings> for VoiceSettingsBody {
    fn from(s: VoiceSettings) -> Self {
        Self {
            stability: s.stability,
            similarity_boost: s.similarity_boost,
            style: s.style,
            use_speaker_boost: s.use_speaker_boost,
        }
    }
}

impl TextToSpeechBody {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_id: Model::default(),
            voice_settings: VoiceSettings::default().into(),
        }
    }

    pub fn with_model_id(mut self, model: Model) -> Self {
        self.model_id = model;
        self
    }

    pub fn with_voice_settings(mut self, settings: VoiceSettings) -> Self {
        self.voice_settings = settings.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct TextToSpeech {
    voice_id: VoiceId,
    body: TextToSpeechBody,
    output_format: OutputFormat,
}

impl TextToSpeech {
    pub fn new(voice_id: VoiceId, body: TextToSpeechBody) -> Self {
        Self {
            voice_id,
            body,
            output_format: OutputFormat::default(),
        }
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

impl ElevenLabsEndpoint for TextToSpeech {
    const PATH: &'static str = "/v1/text-to-speech/:voice_id";

    const METHOD: Method = Method::POST;

    type ResponseBody = Bytes;

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![(":voice_id", self.voice_id.id())]
    }

    fn query_params(&self) -> Option<QueryValues> {
        Some(vec![("output_format", self.output_format.as_ref().to_string())])
    }

    fn headers(&self) -> Vec<(&'static str, &'static str)> {
        vec![("accept", self.output_format.accept())]
    }

    fn request_body(&self) -> Result<RequestBody> {
        Ok(RequestBody::Json(serde_json::to_value(&self.body)?))
    }

    async fn response_body(self, resp: Response) -> Result<Self::ResponseBody> {
        Ok(resp.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_model_and_settings() {
        let body = TextToSpeechBody::new("Welcome back to Tech Forward!");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model_id"], "eleven_monolingual_v1");
        assert_eq!(json["voice_settings"]["stability"], 0.5);
        assert_eq!(json["voice_settings"]["similarity_boost"], 0.75);
        assert_eq!(json["voice_settings"]["use_speaker_boost"], true);
    }

    #[test]
    fn url_targets_the_voice() {
        let endpoint = TextToSpeech::new(VoiceId::new("8iDUAV5slUpRv30f3cyz"), TextToSpeechBody::new("hi"))
            .with_output_format(OutputFormat::Pcm24000Hz);
        let base: Url = "https://api.elevenlabs.io".parse().unwrap();
        let url = endpoint.url(&base).unwrap();
        assert_eq!(url.path(), "/v1/text-to-speech/8iDUAV5slUpRv30f3cyz");
        assert_eq!(url.query(), Some("output_format=pcm_24000"));
        assert_eq!(endpoint.headers(), vec![("accept", "audio/pcm")]);
    }
}
