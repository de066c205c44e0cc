//! LLM-backed job eligibility evaluation.
//!
//! The evaluator builds a prompt from the operator config, dispatches it to
//! the configured provider, and parses the model's JSON verdict. API keys
//! are validated against their shipped placeholder values before any
//! network call is attempted.

pub mod backend;
pub mod prompt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, GOOGLE_KEY_PLACEHOLDER, OPENAI_KEY_PLACEHOLDER};

pub use backend::{CompletionBackend, HttpCompletionBackend};

/// Evaluation failures, split so callers can distinguish operator
/// misconfiguration from provider trouble.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("failed to parse model response: {0}")]
    Parse(String),
}

/// Supported evaluation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    /// Parse a provider name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, LlmError> {
        match name.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            other => Err(LlmError::Config(format!(
                "invalid AI provider '{}': must be 'openai' or 'gemini'",
                other
            ))),
        }
    }

    /// Resolve the provider's API key from config, rejecting missing keys
    /// and the shipped placeholder values.
    pub fn resolve_key(self, config: &Config) -> Result<String, LlmError> {
        let (key, placeholder, label) = match self {
            Provider::OpenAi => (
                &config.api_keys.openai_api_key,
                OPENAI_KEY_PLACEHOLDER,
                "OpenAI",
            ),
            Provider::Gemini => (
                &config.api_keys.google_api_key,
                GOOGLE_KEY_PLACEHOLDER,
                "Google",
            ),
        };

        if key.is_empty() || key == placeholder {
            return Err(LlmError::Config(format!(
                "{} API key not configured or is a placeholder",
                label
            )));
        }

        Ok(key.clone())
    }
}

/// The model's verdict on one job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(default)]
    pub eligible: bool,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub missing_requirements: Vec<String>,
}

/// Evaluates job descriptions against the operator's criteria and resume.
pub struct Evaluator<B = HttpCompletionBackend> {
    backend: B,
}

impl Evaluator<HttpCompletionBackend> {
    pub fn new() -> Self {
        Self {
            backend: HttpCompletionBackend::new(),
        }
    }
}

impl Default for Evaluator<HttpCompletionBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: CompletionBackend> Evaluator<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Evaluate one job description. Key and provider validation happen
    /// before the backend is invoked.
    pub async fn evaluate(
        &self,
        job_description: &str,
        config: &Config,
    ) -> Result<Verdict, LlmError> {
        let provider = Provider::from_name(&config.general.ai_provider)?;
        let api_key = provider.resolve_key(config)?;

        let prompt = prompt::sanitize_text(&prompt::build_eligibility_prompt(
            job_description,
            config,
        ));

        debug!(provider = ?provider, "evaluating job description");
        let raw = self.backend.complete(provider, &api_key, &prompt).await?;
        parse_verdict(&raw)
    }

    /// Evaluate several descriptions sequentially, preserving order.
    pub async fn evaluate_batch(
        &self,
        job_descriptions: &[String],
        config: &Config,
    ) -> Result<Vec<Verdict>, LlmError> {
        let mut verdicts = Vec::with_capacity(job_descriptions.len());
        for description in job_descriptions {
            verdicts.push(self.evaluate(description, config).await?);
        }
        Ok(verdicts)
    }
}

/// Parse a verdict from the model's raw reply, stripping a leading/trailing
/// markdown code fence when present.
pub fn parse_verdict(raw: &str) -> Result<Verdict, LlmError> {
    let text = strip_code_fence(raw.trim());
    serde_json::from_str(text).map_err(|e| LlmError::Parse(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text
        .strip_prefix("```json\n")
        .or_else(|| text.strip_prefix("```\n"))
    else {
        return text;
    };
    rest.strip_suffix("\n```").unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedBackend {
        reply: String,
        calls: AtomicUsize,
    }

    impl CannedBackend {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        async fn complete(
            &self,
            _provider: Provider,
            _api_key: &str,
            _prompt: &str,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn configured(provider: &str) -> Config {
        let mut config = Config::default();
        config.general.ai_provider = provider.to_string();
        config.api_keys.openai_api_key = "sk-test".to_string();
        config.api_keys.google_api_key = "goog-test".to_string();
        config
    }

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!(Provider::from_name("OpenAI").unwrap(), Provider::OpenAi);
        assert_eq!(Provider::from_name("GEMINI").unwrap(), Provider::Gemini);
        assert!(matches!(
            Provider::from_name("claude"),
            Err(LlmError::Config(_))
        ));
    }

    #[test]
    fn parse_verdict_handles_plain_json() {
        let verdict = parse_verdict(
            r#"{"eligible": true, "reasoning": "good match", "missing_requirements": []}"#,
        )
        .unwrap();
        assert!(verdict.eligible);
        assert_eq!(verdict.reasoning, "good match");
    }

    #[test]
    fn parse_verdict_strips_markdown_fences() {
        let fenced = "```json\n{\"eligible\": false, \"reasoning\": \"needs clearance\", \"missing_requirements\": [\"TS/SCI\"]}\n```";
        let verdict = parse_verdict(fenced).unwrap();
        assert!(!verdict.eligible);
        assert_eq!(verdict.missing_requirements, vec!["TS/SCI"]);

        let bare_fence = "```\n{\"eligible\": true}\n```";
        let verdict = parse_verdict(bare_fence).unwrap();
        assert!(verdict.eligible);
        assert!(verdict.reasoning.is_empty());
    }

    #[test]
    fn parse_verdict_rejects_non_json() {
        assert!(matches!(
            parse_verdict("I think this candidate is great"),
            Err(LlmError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn placeholder_key_fails_before_backend_call() {
        let backend = CannedBackend::new(r#"{"eligible": true}"#);
        let mut config = configured("openai");
        config.api_keys.openai_api_key = OPENAI_KEY_PLACEHOLDER.to_string();

        let evaluator = Evaluator::with_backend(backend);
        let result = evaluator.evaluate("desc", &config).await;

        assert!(matches!(result, Err(LlmError::Config(_))));
        assert_eq!(evaluator.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_provider_fails_before_backend_call() {
        let backend = CannedBackend::new(r#"{"eligible": true}"#);
        let config = configured("anthropic");

        let evaluator = Evaluator::with_backend(backend);
        let result = evaluator.evaluate("desc", &config).await;

        assert!(matches!(result, Err(LlmError::Config(_))));
        assert_eq!(evaluator.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn evaluate_returns_parsed_verdict() {
        let backend = CannedBackend::new(
            r#"{"eligible": true, "reasoning": "solid fit", "missing_requirements": []}"#,
        );
        let evaluator = Evaluator::with_backend(backend);

        let verdict = evaluator
            .evaluate("Build Rust services.", &configured("gemini"))
            .await
            .unwrap();
        assert!(verdict.eligible);
        assert_eq!(verdict.reasoning, "solid fit");
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let backend = CannedBackend::new(r#"{"eligible": true, "reasoning": "ok"}"#);
        let evaluator = Evaluator::with_backend(backend);

        let descriptions = vec!["a".to_string(), "b".to_string()];
        let verdicts = evaluator
            .evaluate_batch(&descriptions, &configured("openai"))
            .await
            .unwrap();
        assert_eq!(verdicts.len(), 2);
        assert_eq!(evaluator.backend.calls.load(Ordering::SeqCst), 2);
    }
}
