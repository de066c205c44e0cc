//! HTTP completion backends for the evaluation providers.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LlmError, Provider};

const OPENAI_MODEL: &str = "o3";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

const GEMINI_MODEL: &str = "gemini-2.5-flash-preview-04-17";
const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Raw completion transport, separated from prompt building and verdict
/// parsing so tests can substitute a canned backend.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one prompt and return the model's raw text reply.
    async fn complete(
        &self,
        provider: Provider,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, LlmError>;
}

#[async_trait]
impl CompletionBackend for Box<dyn CompletionBackend> {
    async fn complete(
        &self,
        provider: Provider,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        (**self).complete(provider, api_key, prompt).await
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    response_format: OpenAiResponseFormat<'a>,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAiResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart<'a> {
    text: std::borrow::Cow<'a, str>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    parts: Vec<GeminiPart<'static>>,
}

/// Production backend speaking the providers' HTTP APIs with reqwest.
pub struct HttpCompletionBackend {
    client: reqwest::Client,
}

impl HttpCompletionBackend {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn complete_openai(&self, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        let request = OpenAiRequest {
            model: OPENAI_MODEL,
            messages: vec![OpenAiMessage {
                role: "user",
                content: prompt,
            }],
            response_format: OpenAiResponseFormat {
                format_type: "json_object",
            },
        };

        debug!(model = OPENAI_MODEL, "sending OpenAI completion request");
        let response = self
            .client
            .post(OPENAI_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::Provider(format!(
                "OpenAI API returned {}",
                response.status()
            )));
        }

        let body: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Provider(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::Provider("OpenAI response contained no choices".into()))
    }

    async fn complete_gemini(&self, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.into(),
                }],
            }],
        };

        let url = format!("{}/{}:generateContent", GEMINI_BASE, GEMINI_MODEL);
        debug!(model = GEMINI_MODEL, "sending Gemini completion request");
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::Provider(format!(
                "Gemini API returned {}",
                response.status()
            )));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Provider(e.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text.into_owned())
            .ok_or_else(|| LlmError::Provider("Gemini response contained no candidates".into()))
    }
}

impl Default for HttpCompletionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    async fn complete(
        &self,
        provider: Provider,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        match provider {
            Provider::OpenAi => self.complete_openai(api_key, prompt).await,
            Provider::Gemini => self.complete_gemini(api_key, prompt).await,
        }
    }
}
