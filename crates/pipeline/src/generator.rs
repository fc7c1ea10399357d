//! Slide content generation.
//!
//! [`ContentGenerator`] is the capability the orchestrator depends on;
//! [`GeminiGenerator`] implements it with the Gemini `generateContent` REST
//! endpoint.

use async_trait::async_trait;
use pitchdeck_core::deck::PitchDeckData;
use pitchdeck_core::markdown::strip_code_fences;
use pitchdeck_core::prompt::{build_prompt, DeckImages};
use serde::{Deserialize, Serialize};

/// Default model name.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

/// Default API base URL.
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("generation API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The API answered without any generated text.
    #[error("no generated text in response")]
    EmptyResponse,
}

/// Everything a generator receives for one deck: the assembled prompt and
/// the rendering hints it was built from.
///
/// The prompt already embeds every hint, so a generator that only forwards
/// text (like [`GeminiGenerator`]) can ignore the other fields. They are
/// there for implementations that take structured styling or attach the
/// images themselves.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Canonical Marp theme name.
    pub theme: String,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    /// Image references as they appear in the prompt.
    pub images: DeckImages,
}

impl GenerationRequest {
    pub fn for_deck(data: &PitchDeckData, images: DeckImages) -> Self {
        Self {
            prompt: build_prompt(data, &images),
            theme: data.theme.clone(),
            background_color: data.background_color.clone(),
            text_color: data.text_color.clone(),
            images,
        }
    }
}

/// Turns a prompt into Marp slide markup.
///
/// Implementations return the document body only; code fences around the
/// answer are already stripped.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_GEMINI_API_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: [GeminiContent<'a>; 1],
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: [GeminiPart<'a>; 1],
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiResponse {
    /// Text of the first part of the first candidate.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()
            .map(|p| p.text)
    }
}

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiGenerator {
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = GeminiRequest {
            contents: [GeminiContent {
                parts: [GeminiPart {
                    text: &request.prompt,
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .json::<GeminiResponse>()
            .await?
            .into_text()
            .ok_or(GenerationError::EmptyResponse)?;

        let markdown = strip_code_fences(&text);
        if markdown.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        tracing::debug!(
            model = %self.config.model,
            chars = markdown.len(),
            "Slide content generated",
        );
        Ok(markdown)
    }
}
