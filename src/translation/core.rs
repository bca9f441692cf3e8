/*!
 * Core translation service implementation.
 *
 * This module defines the `LanguageModel` boundary every external request goes
 * through and the `TranslationService` that implements it on top of the
 * configured provider client.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::time::Instant;
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};

/// A single prompt sent to a language model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instructions
    pub system: String,
    /// User prompt
    pub prompt: String,
    /// Ask the provider to constrain the reply to a JSON object
    pub json_response: bool,
    /// Sampling temperature, provider default when unset
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            json_response: false,
            temperature: None,
        }
    }

    /// Request a JSON object reply
    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// The external text-generation collaborator
///
/// Translation, assessment and suggestion requests are all expressed as a
/// single completion. Implementations make exactly one attempt; callers decide
/// what a failure means for their workflow.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate the raw reply text for a request
    async fn generate(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    /// Human-readable name for logs and progress output
    fn describe(&self) -> String {
        "language model".to_string()
    }
}

/// Parse an endpoint string into host and port
fn parse_endpoint(endpoint: &str) -> Result<(String, u16)> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url.host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?;
    let host = format!("{}://{}", url.scheme(), host);

    let port = url.port().unwrap_or(if url.scheme() == "https" { 443 } else { 80 });

    Ok((host, port))
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },

    /// OpenAI API service
    OpenAI {
        /// Client instance
        client: OpenAI,
    },

    /// LM Studio local server (OpenAI-compatible)
    LMStudio {
        /// Client instance (OpenAI-compatible)
        client: OpenAI,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },
}

/// Language model backed by the configured provider
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let timeout_secs = config.get_timeout_secs();
        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => {
                let (host, port) = parse_endpoint(&config.get_endpoint())?;
                TranslationProviderImpl::Ollama {
                    client: Ollama::new(host, port, timeout_secs),
                }
            },
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(config.get_api_key(), config.get_endpoint(), timeout_secs),
            },
            ConfigTranslationProvider::LMStudio => {
                // LM Studio often doesn't require an API key; use a default if empty
                let api_key = {
                    let k = config.get_api_key();
                    if k.is_empty() { "lm-studio".to_string() } else { k }
                };
                TranslationProviderImpl::LMStudio {
                    client: OpenAI::new(api_key, config.get_endpoint(), timeout_secs),
                }
            },
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(config.get_api_key(), config.get_endpoint(), timeout_secs),
            },
        };

        Ok(Self { provider, config })
    }

    /// Get the maximum tokens for a model
    fn max_tokens_for_model(model: &str) -> u32 {
        let model = model.to_lowercase();
        if model.contains("claude-3-5") || model.contains("claude-3.5") || model.contains("claude-sonnet-4") {
            8192
        } else {
            4096
        }
    }
}

#[async_trait]
impl LanguageModel for TranslationService {
    async fn generate(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let start_time = Instant::now();
        let model = self.config.get_model();
        let temperature = request.temperature.unwrap_or(self.config.common.temperature);

        let text = match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let mut generation = GenerationRequest::new(&model, &request.prompt)
                    .system(&request.system)
                    .temperature(temperature);
                if request.json_response {
                    generation = generation.format("json");
                }
                let response = client.complete(generation).await?;
                Ollama::extract_text(&response)
            },
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                let mut chat = OpenAIRequest::new(&model)
                    .add_message("system", &request.system)
                    .add_message("user", &request.prompt)
                    .temperature(temperature)
                    .max_tokens(Self::max_tokens_for_model(&model));
                if request.json_response {
                    chat = chat.json_object();
                }
                let response = client.complete(chat).await?;
                OpenAI::extract_text(&response)
            },
            TranslationProviderImpl::Anthropic { client } => {
                // Anthropic has no JSON mode; the prompt itself asks for JSON
                let message = AnthropicRequest::new(&model, Self::max_tokens_for_model(&model))
                    .system(&request.system)
                    .add_message("user", &request.prompt)
                    .temperature(temperature);
                let response = client.complete(message).await?;
                Anthropic::extract_text(&response)
            },
        };

        log::debug!(
            "{} replied with {} chars in {:?}",
            self.describe(),
            text.len(),
            start_time.elapsed()
        );

        Ok(text)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.config.provider.display_name(), self.config.get_model())
    }
}
