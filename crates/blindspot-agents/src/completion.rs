//! Completion client seam.
//!
//! Every model call in the pipeline goes through `CompletionClient`: one
//! system instruction, one user message, one model, one temperature, one
//! trimmed string back. The production implementation wraps rig's
//! OpenAI-compatible `CompletionsClient`; tests substitute stubs.
//!
//! There is no retry. A failed call surfaces immediately as `Transport`, a
//! missing credential as `Configuration`.

use std::time::Instant;

use async_trait::async_trait;
use rig::client::CompletionClient as _;
use rig::completion::Prompt;
use rig::providers::openai;
use tracing::debug;

use crate::config::EndpointConfig;
use crate::errors::CritiqueError;
use crate::types::ModelId;

/// One chat-completion request (`messages = [system, user]`).
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_content: String,
    pub model: ModelId,
    pub temperature: f64,
}

impl CompletionRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        user_content: impl Into<String>,
        model: ModelId,
        temperature: f64,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_content: user_content.into(),
            model,
            temperature,
        }
    }
}

/// Opaque request/response access to a hosted completion model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Return the trimmed text of the first completion choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CritiqueError>;
}

/// `CompletionClient` backed by rig's OpenAI chat-completions provider.
pub struct RigCompletionClient {
    endpoint: EndpointConfig,
}

impl RigCompletionClient {
    pub fn new(endpoint: EndpointConfig) -> Self {
        Self { endpoint }
    }

    /// Build a rig client for the configured endpoint.
    fn client(&self) -> Result<openai::CompletionsClient, CritiqueError> {
        let api_key = self
            .endpoint
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(CritiqueError::missing_credential)?;

        openai::CompletionsClient::builder()
            .api_key(api_key)
            .base_url(&self.endpoint.base_url)
            .build()
            .map_err(|e| {
                CritiqueError::Configuration(format!("failed to build completion client: {e}"))
            })
    }
}

#[async_trait]
impl CompletionClient for RigCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CritiqueError> {
        let client = self.client()?;

        let agent = client
            .agent(request.model.as_str())
            .preamble(&request.system_prompt)
            .temperature(request.temperature)
            .build();

        let start = Instant::now();
        let response = tokio::time::timeout(
            self.endpoint.timeout,
            agent.prompt(request.user_content.as_str()),
        )
        .await
        .map_err(|_| {
            CritiqueError::Transport(format!(
                "completion request timed out after {}s",
                self.endpoint.timeout.as_secs()
            ))
        })?
        .map_err(|e| CritiqueError::Transport(e.to_string()))?;

        debug!(
            model = %request.model,
            temperature = request.temperature,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = response.len(),
            "completion returned"
        );

        Ok(response.trim().to_string())
    }
}
