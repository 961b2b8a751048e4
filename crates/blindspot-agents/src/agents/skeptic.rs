//! Skeptic agent: red-team failure modes and fragility.

use crate::completion::CompletionClient;
use crate::errors::CritiqueError;
use crate::prompts::PromptSet;
use crate::types::{AgentResult, AgentRole, CritiqueRequest};

use super::invoke;

/// Run the Skeptic over the subject text alone.
pub async fn run_skeptic(
    client: &dyn CompletionClient,
    prompts: &PromptSet,
    request: &CritiqueRequest,
    temperature: f64,
) -> Result<AgentResult, CritiqueError> {
    invoke(
        client,
        AgentRole::Skeptic,
        prompts.persona(AgentRole::Skeptic),
        request,
        None,
        temperature,
    )
    .await
}
