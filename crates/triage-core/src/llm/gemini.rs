//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::{CompletionModel, LlmError};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_VERSION: &str = "v1beta";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Connection settings for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    /// `None` (or blank) makes every call fail with
    /// [`LlmError::MissingCredential`].
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub api_version: String,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_version: DEFAULT_VERSION.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// [`CompletionModel`] backed by the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .user_agent(concat!("triage-core/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::Http(e.without_url()))?;
        Ok(Self { client, config })
    }

    /// Whether an API key is configured. Calls still fail closed without one.
    pub fn has_credential(&self) -> bool {
        self.config.credential().is_some()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self, api_key: &str) -> Result<Url, LlmError> {
        let mut base =
            Url::parse(&self.config.base_url).map_err(|e| LlmError::InvalidEndpoint(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let version = self.config.api_version.trim_matches('/');
        let mut url = base
            .join(&format!("{version}/models/{}:generateContent", self.config.model))
            .map_err(|e| LlmError::InvalidEndpoint(e.to_string()))?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }
}

#[async_trait]
impl CompletionModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.config.credential().ok_or(LlmError::MissingCredential)?;
        let endpoint = self.endpoint(api_key)?;

        let request = GenerateContentRequest {
            contents: vec![GenerateContent {
                role: "user",
                parts: vec![ContentPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable>".into());
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let payload = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| LlmError::Decode(e.without_url().to_string()))?;

        payload.into_text().ok_or(LlmError::EmptyResponse)
    }
}

// ── wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<GenerateContent<'a>>,
}

#[derive(Serialize)]
struct GenerateContent<'a> {
    role: &'static str,
    parts: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
struct ContentPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GenerateCandidate>,
}

#[derive(Deserialize)]
struct GenerateCandidate {
    content: Option<GenerateContentBlock>,
}

#[derive(Deserialize)]
struct GenerateContentBlock {
    #[serde(default)]
    parts: Vec<GeneratePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GeneratePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any.
    fn into_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}
