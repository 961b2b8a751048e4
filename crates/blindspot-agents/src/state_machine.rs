//! Run lifecycle: explicit states and legal transition guards.
//!
//! ```text
//! Pending → Running → Succeeded
//!    │         │
//!    └─────────┴────► Failed
//! ```
//!
//! Pre-flight failures (blank subject, missing credential, unloadable
//! prompts) go straight from `Pending` to `Failed`. Terminal states accept no
//! further transitions.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

fn is_legal_transition(from: RunStatus, to: RunStatus) -> bool {
    use RunStatus::*;

    if to == Failed && !from.is_terminal() {
        return true;
    }
    matches!((from, to), (Pending, Running) | (Running, Succeeded))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: RunStatus,
    pub to: RunStatus,
    pub at: DateTime<Utc>,
    /// Milliseconds since the run was created.
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalTransition {
    pub from: RunStatus,
    pub to: RunStatus,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal run transition: {} -> {}", self.from, self.to)
    }
}

impl std::error::Error for IllegalTransition {}

/// Lifecycle of a single run, with its transition log.
#[derive(Debug)]
pub struct RunLifecycle {
    current: RunStatus,
    created_at: Instant,
    transitions: Vec<TransitionRecord>,
}

impl RunLifecycle {
    pub fn new() -> Self {
        Self {
            current: RunStatus::Pending,
            created_at: Instant::now(),
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> RunStatus {
        self.current
    }

    /// Move to `to`, recording the transition.
    pub fn advance(&mut self, to: RunStatus, reason: Option<&str>) -> Result<(), IllegalTransition> {
        if !is_legal_transition(self.current, to) {
            return Err(IllegalTransition {
                from: self.current,
                to,
            });
        }

        tracing::debug!(from = %self.current, to = %to, "run transition");

        self.transitions.push(TransitionRecord {
            from: self.current,
            to,
            at: Utc::now(),
            elapsed_ms: self.created_at.elapsed().as_millis() as u64,
            reason: reason.map(String::from),
        });
        self.current = to;
        Ok(())
    }

    pub fn fail(&mut self, reason: &str) -> Result<(), IllegalTransition> {
        self.advance(RunStatus::Failed, Some(reason))
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// e.g. `Pending -> Running -> Succeeded (412ms)`.
    pub fn summary(&self) -> String {
        let mut path = vec![RunStatus::Pending.to_string()];
        path.extend(self.transitions.iter().map(|t| t.to.to_string()));
        format!(
            "{} ({}ms)",
            path.join(" -> "),
            self.created_at.elapsed().as_millis()
        )
    }
}

impl Default for RunLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
