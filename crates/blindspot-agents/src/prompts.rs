//! Persona prompts, report boilerplate, and prompt-directory overrides.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever persona content changes
//! so a given report can be traced back to the prompts that produced it.
//!
//! A prompt directory may override any subset of these files; absent files
//! fall back to the built-ins below.
//!
//! | File                      | Overrides             |
//! |---------------------------|-----------------------|
//! | `analyzer_prompt.txt`     | `ANALYZER_PREAMBLE`   |
//! | `perspective_prompt.txt`  | `PERSPECTIVE_PREAMBLE`|
//! | `skeptic_prompt.txt`      | `SKEPTIC_PREAMBLE`    |
//! | `debate_prompt.txt`       | `DEBATE_PREAMBLE`     |
//! | `compare_prompt.txt`      | `COMPARE_PREAMBLE`    |
//! | `report_template.txt`     | built-in report layout|

use std::io;
use std::path::Path;

use composition::{CompositionError, ReportTemplate};
use tracing::debug;

use crate::errors::CritiqueError;
use crate::types::AgentRole;

/// Prompt version. Bump on any preamble content change.
pub const PROMPT_VERSION: &str = "1.2.0";

/// Analyzer: structural weaknesses.
pub const ANALYZER_PREAMBLE: &str = "\
You are the Analyzer Agent in a blind-spot review panel. \
Dissect the user's idea, plan, or argument for structural weaknesses.

Report, as concise markdown bullet lists under these headings:
## Hidden Assumptions
Beliefs the plan depends on but never states or validates.
## Missing Constraints
Budget, time, legal, technical, or human limits the plan ignores.
## Logical Gaps
Steps that do not follow, circular reasoning, or unsupported leaps.
## Unanswered Questions
The questions a careful reviewer would ask first.

Be specific to the text. Do not praise. Do not rewrite the plan.";

/// Perspective: alternate viewpoints, seeded with the Analyzer's findings.
pub const PERSPECTIVE_PREAMBLE: &str = "\
You are the Perspective Agent in a blind-spot review panel. \
You receive the user's text and the Analyzer Agent's findings.

Re-examine the idea through expert viewpoints the author likely did not consider: \
end users, operators, finance, legal and compliance, ethics, security, \
and a direct competitor. For each viewpoint give the single most important \
concern in one or two sentences.

Do not repeat the Analyzer's points; build on them or contradict them. \
Finish with a short list of the perspectives that conflict with each other.";

/// Skeptic: red-team failure modes.
pub const SKEPTIC_PREAMBLE: &str = "\
You are the Skeptic Agent, an adversarial red-teamer. \
Assume the user's idea will fail and explain how.

Report, as concise markdown:
## Failure Modes
The most likely ways this breaks in practice.
## Worst-Case Scenarios
What happens when several things go wrong at once.
## Fragility
Single points of failure, dependencies, and brittle assumptions.
## Attack Surface
How a motivated adversary, competitor, or regulator could undermine it.

Be blunt and concrete. No reassurance.";

/// Debate synthesis: two rounds, three speakers, disagreement first.
pub const DEBATE_PREAMBLE: &str = "\
Create a debate between:
Analyzer • Perspective • Skeptic

Show 2 rounds:
Analyzer:
Perspective:
Skeptic:

Focus on disagreements and contradictions.";

/// Idea comparison.
pub const COMPARE_PREAMBLE: &str = "\
You are a rigorous evaluator comparing two ideas.

Compare IDEA A vs IDEA B on:
- Strengths
- Weaknesses
- Blind spots
- Risk profile
- Robustness under stress
- Likely success conditions

Then give:
- A short verdict on which is more robust
- One suggestion to improve IDEA A
- One suggestion to improve IDEA B

Be concise but concrete.";

// ── Boilerplate ──────────────────────────────────────────────────────────────

/// Register of the hand-written report sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Boilerplate {
    /// Rich markdown for rendered views.
    #[default]
    Markdown,
    /// Plain text for terminal output.
    Plain,
}

impl Boilerplate {
    pub fn exec_summary(self) -> &'static str {
        match self {
            Self::Markdown => "\
This idea has been evaluated by three specialized agents:

- **Analyzer Agent**: extracts structural weaknesses, hidden assumptions, and missing constraints.
- **Perspective Agent**: applies alternate expert viewpoints to reveal what you didn't consider.
- **Skeptic Agent**: aggressively red-teams the idea, surfacing failure modes and fragility.

Use this report as a **pre-mortem**: fix these issues *before* you invest time, money, or reputation.",
            Self::Plain => "\
This idea has been evaluated by three agents:
- Analyzer Agent: Structural weaknesses, missing constraints.
- Perspective Agent: Cross-domain viewpoints you overlooked.
- Skeptic Agent: Red-team adversarial failure modes.

Review the report carefully. These blind spots highlight weaknesses
that could lead to project failure if unaddressed.",
        }
    }

    pub fn top_three(self) -> &'static str {
        match self {
            Self::Markdown => "\
1. Identify the single most dangerous assumption and validate it immediately.
2. Resolve any conflicts between perspectives (e.g., user, technical, ethical).
3. Prepare mitigation for at least one worst-case scenario raised by the Skeptic Agent.",
            Self::Plain => "\
1. Pick the most severe assumption or risk and validate it quickly.
2. Investigate conflicting perspectives highlighted by the Perspective Agent.
3. Plan countermeasures for at least one worst-case scenario from the Skeptic Agent.",
        }
    }

    pub fn recommendations(self) -> &'static str {
        match self {
            Self::Markdown => "\
- Turn each blind spot into a concrete experiment or validation step.
- Re-run this multi-agent analysis after you update the idea.
- Share this report with a colleague and ask where they disagree with it.",
            Self::Plain => "\
- Turn each blind spot into a question or experiment.
- Update your idea and re-run this agent suite to find newly exposed issues.
- Share this report with a teammate for further review.",
        }
    }
}

// ── PromptSet ────────────────────────────────────────────────────────────────

/// Every prompt and the report template for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub analyzer: String,
    pub perspective: String,
    pub skeptic: String,
    pub debate: String,
    pub compare: String,
    pub template: ReportTemplate,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptSet {
    pub fn builtin() -> Self {
        Self {
            analyzer: ANALYZER_PREAMBLE.to_string(),
            perspective: PERSPECTIVE_PREAMBLE.to_string(),
            skeptic: SKEPTIC_PREAMBLE.to_string(),
            debate: DEBATE_PREAMBLE.to_string(),
            compare: COMPARE_PREAMBLE.to_string(),
            template: ReportTemplate::builtin(),
        }
    }

    /// Load overrides from `dir`, or the built-ins when `dir` is `None`.
    ///
    /// # Errors
    ///
    /// `Composition` if the directory is unreadable, a present file cannot be
    /// read, or the template lacks a placeholder.
    pub fn load(dir: Option<&Path>) -> Result<Self, CritiqueError> {
        let Some(dir) = dir else {
            return Ok(Self::builtin());
        };

        if !dir.is_dir() {
            return Err(CompositionError::PromptRead {
                path: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "prompt directory not found"),
            }
            .into());
        }

        let builtin = Self::builtin();
        let template_path = dir.join("report_template.txt");
        let template = if template_path.exists() {
            ReportTemplate::load(&template_path)?
        } else {
            builtin.template
        };

        let set = Self {
            analyzer: read_override(dir, "analyzer_prompt.txt", builtin.analyzer)?,
            perspective: read_override(dir, "perspective_prompt.txt", builtin.perspective)?,
            skeptic: read_override(dir, "skeptic_prompt.txt", builtin.skeptic)?,
            debate: read_override(dir, "debate_prompt.txt", builtin.debate)?,
            compare: read_override(dir, "compare_prompt.txt", builtin.compare)?,
            template,
        };
        debug!(dir = %dir.display(), "loaded prompt overrides");
        Ok(set)
    }

    /// Persona for an agent role.
    pub fn persona(&self, role: AgentRole) -> &str {
        match role {
            AgentRole::Analyzer => &self.analyzer,
            AgentRole::Perspective => &self.perspective,
            AgentRole::Skeptic => &self.skeptic,
        }
    }
}

fn read_override(dir: &Path, file: &str, fallback: String) -> Result<String, CompositionError> {
    let path = dir.join(file);
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(fallback),
        Err(source) => Err(CompositionError::PromptRead { path, source }),
    }
}
