//! Perspective agent: alternate expert viewpoints, built on the Analyzer's findings.

use crate::completion::CompletionClient;
use crate::errors::CritiqueError;
use crate::prompts::PromptSet;
use crate::types::{AgentResult, AgentRole, CritiqueRequest};

use super::invoke;

/// Run the Perspective agent. Must be called after the Analyzer completes.
pub async fn run_perspective(
    client: &dyn CompletionClient,
    prompts: &PromptSet,
    request: &CritiqueRequest,
    analyzer: &AgentResult,
    temperature: f64,
) -> Result<AgentResult, CritiqueError> {
    debug_assert_eq!(analyzer.role, AgentRole::Analyzer);
    invoke(
        client,
        AgentRole::Perspective,
        prompts.persona(AgentRole::Perspective),
        request,
        Some(&analyzer.output_text),
        temperature,
    )
    .await
}
