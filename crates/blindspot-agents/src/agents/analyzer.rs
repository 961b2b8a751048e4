//! Analyzer agent: structural weaknesses, hidden assumptions, missing constraints.

use crate::completion::CompletionClient;
use crate::errors::CritiqueError;
use crate::prompts::PromptSet;
use crate::types::{AgentResult, AgentRole, CritiqueRequest};

use super::invoke;

/// Run the Analyzer over the subject text alone.
pub async fn run_analyzer(
    client: &dyn CompletionClient,
    prompts: &PromptSet,
    request: &CritiqueRequest,
    temperature: f64,
) -> Result<AgentResult, CritiqueError> {
    invoke(
        client,
        AgentRole::Analyzer,
        prompts.persona(AgentRole::Analyzer),
        request,
        None,
        temperature,
    )
    .await
}
