//! Debate synthesizer: turns the three critiques into a two-round exchange.

use std::time::Instant;

use composition::DebateTranscript;
use tracing::info;

use crate::completion::{CompletionClient, CompletionRequest};
use crate::errors::CritiqueError;
use crate::types::{AgentOutputs, ModelId};

/// Texts the synthesizer argues over.
#[derive(Debug, Clone, Copy)]
pub struct DebateInputs<'a> {
    pub subject: &'a str,
    pub analyzer: &'a str,
    pub perspective: &'a str,
    pub skeptic: &'a str,
}

impl<'a> DebateInputs<'a> {
    pub fn from_outputs(subject: &'a str, outputs: &'a AgentOutputs) -> Self {
        Self {
            subject,
            analyzer: &outputs.analyzer.output_text,
            perspective: &outputs.perspective.output_text,
            skeptic: &outputs.skeptic.output_text,
        }
    }

    pub fn user_message(&self) -> String {
        format!(
            "USER_TEXT:\n{}\n\nANALYZER_OUTPUT:\n{}\n\nPERSPECTIVE_OUTPUT:\n{}\n\nSKEPTIC_OUTPUT:\n{}",
            self.subject, self.analyzer, self.perspective, self.skeptic
        )
    }
}

/// One synthesis call with the debate persona.
pub async fn build_debate_transcript(
    client: &dyn CompletionClient,
    persona: &str,
    inputs: DebateInputs<'_>,
    model: ModelId,
    temperature: f64,
) -> Result<DebateTranscript, CritiqueError> {
    let request = CompletionRequest::new(persona, inputs.user_message(), model, temperature);

    let start = Instant::now();
    let raw = client.complete(&request).await?;
    let transcript = DebateTranscript::parse(raw);

    info!(
        turns = transcript.turns.len(),
        rounds = transcript.rounds(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "debate synthesized"
    );
    Ok(transcript)
}
