//! Domain types shared by agents, the orchestrator, and front-ends.
//!
//! | Type              | Produced by        | Consumed by                 |
//! |-------------------|--------------------|-----------------------------|
//! | `CritiqueRequest` | front-end          | every agent invocation      |
//! | `AgentResult`     | agent invocation   | report composer, debate     |
//! | `AgentOutputs`    | orchestrator       | composer, debate synthesizer|

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CritiqueError, ErrorInfo};

/// Temperature added to the base for the Perspective and Skeptic agents.
pub const EXPLORATORY_BIAS: f64 = 0.1;

/// Clamp a sampling temperature into `[0, 1]`.
pub fn clamp_temperature(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// `min(1.0, t + 0.1)`: the exploratory temperature for adversarial agents.
pub fn biased_temperature(t: f64) -> f64 {
    (t + EXPLORATORY_BIAS).min(1.0)
}

// ── ModelId ─────────────────────────────────────────────────────────────────

/// Allow-listed completion model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    #[value(name = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4.1-mini")]
    #[value(name = "gpt-4.1-mini")]
    Gpt41Mini,
    #[serde(rename = "gpt-4.1")]
    #[value(name = "gpt-4.1")]
    Gpt41,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [Self::Gpt4oMini, Self::Gpt41Mini, Self::Gpt41];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt41Mini => "gpt-4.1-mini",
            Self::Gpt41 => "gpt-4.1",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = CritiqueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == trimmed)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                CritiqueError::Validation(format!(
                    "unsupported model '{trimmed}' (allowed: {})",
                    allowed.join(", ")
                ))
            })
    }
}

// ── CritiqueRequest ─────────────────────────────────────────────────────────

/// One user submission. Immutable once built.
///
/// The blank-text check is left to the orchestrator so that a blank request
/// can still be turned into a `Failed` run without touching the network.
/// Deserialization goes through [`CritiqueRequest::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCritiqueRequest")]
pub struct CritiqueRequest {
    subject_text: String,
    model: ModelId,
    temperature: f64,
}

impl CritiqueRequest {
    /// Build a request; the temperature is clamped into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// `Validation` if the temperature is NaN.
    pub fn new(
        subject_text: impl Into<String>,
        model: ModelId,
        temperature: f64,
    ) -> Result<Self, CritiqueError> {
        if temperature.is_nan() {
            return Err(CritiqueError::Validation(
                "temperature must be a number in [0, 1]".to_string(),
            ));
        }
        Ok(Self {
            subject_text: subject_text.into(),
            model,
            temperature: clamp_temperature(temperature),
        })
    }

    pub fn subject_text(&self) -> &str {
        &self.subject_text
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn is_blank(&self) -> bool {
        self.subject_text.trim().is_empty()
    }
}

/// Wire shape of a `CritiqueRequest` before validation.
#[derive(Deserialize)]
struct RawCritiqueRequest {
    subject_text: String,
    #[serde(default)]
    model: ModelId,
    temperature: f64,
}

impl TryFrom<RawCritiqueRequest> for CritiqueRequest {
    type Error = CritiqueError;

    fn try_from(raw: RawCritiqueRequest) -> Result<Self, Self::Error> {
        Self::new(raw.subject_text, raw.model, raw.temperature)
    }
}

// ── Agents ──────────────────────────────────────────────────────────────────

/// The three critique agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Structural weaknesses, hidden assumptions, missing constraints.
    Analyzer,
    /// Alternate expert viewpoints the author overlooked.
    Perspective,
    /// Red-team failure modes and fragility.
    Skeptic,
}

impl AgentRole {
    pub const ALL: [AgentRole; 3] = [Self::Analyzer, Self::Perspective, Self::Skeptic];

    pub fn name(self) -> &'static str {
        match self {
            Self::Analyzer => "Analyzer",
            Self::Perspective => "Perspective",
            Self::Skeptic => "Skeptic",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output of one agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub role: AgentRole,
    pub output_text: String,
    /// Temperature the agent was actually invoked with.
    pub temperature: f64,
    /// Wall-clock time of the completion call.
    pub elapsed_ms: u64,
    /// Always `None` on a returned result; a failed call aborts the run and
    /// its error is recorded on the run state instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// The three agent results of one pass, in pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutputs {
    pub analyzer: AgentResult,
    pub perspective: AgentResult,
    pub skeptic: AgentResult,
}
