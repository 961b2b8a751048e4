//! Agent invocations for the critique panel.
//!
//! Each agent is a single completion call: a fixed persona as the system
//! instruction and the user's text as the message. Perspective additionally
//! receives the Analyzer's output, which makes it the only agent with a data
//! dependency.
//!
//! ```text
//! Analyzer ──► Perspective
//! Skeptic        (independent)
//! ```
//!
//! The debate synthesizer and the idea comparison live here too: both are one
//! more persona-driven call over text the panel already has.

pub mod analyzer;
pub mod compare;
pub mod debate;
pub mod perspective;
pub mod skeptic;

use std::time::Instant;

use tracing::{info, warn};

use crate::completion::{CompletionClient, CompletionRequest};
use crate::errors::CritiqueError;
use crate::types::{biased_temperature, AgentResult, AgentRole, CritiqueRequest};

/// Per-agent sampling temperatures for one pass over the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperaturePlan {
    pub analyzer: f64,
    pub perspective: f64,
    pub skeptic: f64,
}

impl TemperaturePlan {
    /// Main analysis: Analyzer at `t`, Perspective and Skeptic at `min(1, t + 0.1)`.
    pub fn analysis(base: f64) -> Self {
        Self {
            analyzer: base,
            perspective: biased_temperature(base),
            skeptic: biased_temperature(base),
        }
    }

    /// Debate view: only the Skeptic gets the exploratory bias.
    pub fn debate(base: f64) -> Self {
        Self {
            analyzer: base,
            perspective: base,
            skeptic: biased_temperature(base),
        }
    }

    pub fn for_role(&self, role: AgentRole) -> f64 {
        match role {
            AgentRole::Analyzer => self.analyzer,
            AgentRole::Perspective => self.perspective,
            AgentRole::Skeptic => self.skeptic,
        }
    }
}

/// User message for an agent. `extra_context` is the Analyzer's output.
pub fn user_message(subject: &str, extra_context: Option<&str>) -> String {
    match extra_context {
        Some(analyzer_output) => {
            format!("USER_TEXT:\n{subject}\n\nANALYZER_OUTPUT:\n{analyzer_output}")
        }
        None => format!("USER_TEXT:\n{subject}"),
    }
}

/// Issue one agent call.
///
/// # Errors
///
/// Whatever the client returns; callers abort the run on any error.
pub async fn invoke(
    client: &dyn CompletionClient,
    role: AgentRole,
    persona: &str,
    request: &CritiqueRequest,
    extra_context: Option<&str>,
    temperature: f64,
) -> Result<AgentResult, CritiqueError> {
    let completion = CompletionRequest::new(
        persona,
        user_message(request.subject_text(), extra_context),
        request.model(),
        temperature,
    );

    let start = Instant::now();
    let output_text = client.complete(&completion).await.inspect_err(|e| {
        warn!(agent = %role, kind = %e.kind(), error = %e, "agent call failed");
    })?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    info!(agent = %role, temperature, elapsed_ms, "agent finished");

    Ok(AgentResult {
        role,
        output_text,
        temperature,
        elapsed_ms,
        error: None,
    })
}
