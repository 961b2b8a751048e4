//! Blind Spot Finder: a three-agent critique pipeline.
//!
//! An idea, plan, or argument is reviewed by three personas over an
//! OpenAI-compatible completion service:
//!
//! - **Analyzer**: structural weaknesses, hidden assumptions, missing constraints
//! - **Perspective**: alternate expert viewpoints, seeded with the Analyzer's findings
//! - **Skeptic**: red-team failure modes and fragility
//!
//! The [`orchestrator::Orchestrator`] runs them, composes a report from a
//! template, and attaches a severity heatmap. It can also synthesize a debate
//! transcript between the three agents and compare two ideas side by side.
//! Deterministic report and transcript handling lives in the `composition`
//! crate.

pub mod agents;
pub mod cli;
pub mod completion;
pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod prompts;
pub mod state_machine;
pub mod types;

pub use completion::{CompletionClient, CompletionRequest, RigCompletionClient};
pub use config::{BlindspotConfig, EndpointConfig, PipelineConfig};
pub use errors::{CritiqueError, ErrorInfo, ErrorKind};
pub use orchestrator::{Orchestrator, PipelineRunState, Progress, ProgressSink};
pub use state_machine::RunStatus;
pub use types::{AgentResult, AgentRole, CritiqueRequest, ModelId};
