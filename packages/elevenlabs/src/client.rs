use crate::endpoints::{ElevenLabsEndpoint, RequestBody};
use crate::error::{ElevenLabsError, Result};
use reqwest::{Method, Url, header::CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

const XI_API_KEY_HEADER: &str = "xi-api-key";
const APPLICATION_JSON: &str = "application/json";
const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const API_KEY_VARS: [&str; 3] = ["ELEVENLABS_API_KEY", "ELEVEN_API_KEY", "ELEVEN_LABS_API_KEY"];

/// ElevenLabs HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, overridable for proxies and local fakes
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone)]
pub struct ElevenLabsClient {
    inner: reqwest::Client,
    api_key: String,
    base_url: Url,
}

impl ElevenLabsClient {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_config(ClientConfig::default())
    }

    pub fn from_env_with_config(config: ClientConfig) -> Result<Self> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .ok_or(ElevenLabsError::MissingApiKey)?;

        debug!(
            key_prefix = %api_key.chars().take(4).collect::<String>(),
            key_len = api_key.len(),
            "using ElevenLabs API key from environment"
        );

        Self::new_with_config(api_key, config)
    }

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::new_with_config(api_key, ClientConfig::default())
    }

    pub fn new_with_config(api_key: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .parse::<Url>()
            .map_err(|e| ElevenLabsError::InvalidUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            inner,
            api_key: api_key.into(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn hit<T: ElevenLabsEndpoint>(&self, endpoint: T) -> Result<T::ResponseBody> {
        let method = T::METHOD;
        let url = endpoint.url(&self.base_url)?;
        debug!(%method, %url, "elevenlabs request");

        let mut builder = self
            .inner
            .request(method, url)
            .header(XI_API_KEY_HEADER, &self.api_key);

        for (name, value) in endpoint.headers() {
            builder = builder.header(name, value);
        }

        if matches!(T::METHOD, Method::POST | Method::PATCH) {
            builder = match endpoint.request_body()? {
                RequestBody::Json(json) => {
                    builder.header(CONTENT_TYPE, APPLICATION_JSON).json(&json)
                }
                RequestBody::Empty => builder,
            };
        }

        let resp = builder.send().await?;

        let status = resp.status();
        if !status.is_success() {
            // Body is diagnostic only.
            let body = resp.text().await.unwrap_or_default();
            return Err(ElevenLabsError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        endpoint.response_body(resp).await
    }
}
