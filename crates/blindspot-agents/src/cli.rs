//! Command-line surface of the `blindspot` binary.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::orchestrator::{Progress, ProgressSink};
use crate::prompts::Boilerplate;
use crate::types::{AgentRole, ModelId};

pub const DEFAULT_TEMPERATURE: f64 = 0.4;

pub const BANNER: &str = "\
============================================================
 BLIND SPOT FINDER - Multi-Agent CLI
============================================================";

#[derive(Debug, Parser)]
#[command(
    name = "blindspot",
    version,
    about = "Find the blind spots in an idea, plan, or argument",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `run` command.
    #[command(flatten)]
    pub run: RunArgs,
}

impl Cli {
    /// The subcommand to execute; `run` when none was given.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run(self.run))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze text from stdin and write a report (default).
    Run(RunArgs),
    /// Simulate a two-round debate between the three agents.
    Debate(AnalysisArgs),
    /// Compare two ideas read from files.
    Compare(CompareArgs),
    /// Check that the completion endpoint is reachable.
    Check,
}

#[derive(Debug, Clone, Args)]
pub struct AnalysisArgs {
    /// Completion model (defaults to OPENAI_MODEL or gpt-4o-mini).
    #[arg(long, value_enum)]
    pub model: Option<ModelId>,

    /// Base sampling temperature, clamped to [0, 1].
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f64,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Report file, overwritten on success.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the full run state as JSON instead of the report.
    #[arg(long)]
    pub json: bool,

    /// Also print a debate transcript after the report.
    #[arg(long)]
    pub with_debate: bool,

    /// Let the debate reuse the analysis outputs.
    #[arg(long)]
    pub reuse: bool,

    /// Boilerplate register (plain for text, markdown with --json).
    #[arg(long, value_enum)]
    pub boilerplate: Option<Boilerplate>,
}

impl RunArgs {
    pub fn boilerplate(&self) -> Boilerplate {
        self.boilerplate.unwrap_or(if self.json {
            Boilerplate::Markdown
        } else {
            Boilerplate::Plain
        })
    }
}

#[derive(Debug, Clone, Args)]
pub struct CompareArgs {
    #[arg(long)]
    pub idea_a: PathBuf,

    #[arg(long)]
    pub idea_b: PathBuf,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Read lines until the first blank line or EOF, trimmed.
pub fn read_subject_text<R: BufRead>(reader: R) -> io::Result<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n").trim().to_string())
}

/// Write the report, replacing any previous file.
pub fn write_report(path: &Path, report: &str) -> io::Result<()> {
    std::fs::write(path, report)
}

/// Progress line for a pipeline step.
pub fn progress_line(step: Progress) -> &'static str {
    match step {
        Progress::Agent(AgentRole::Analyzer) => "[1/4] Running Analyzer Agent...",
        Progress::Agent(AgentRole::Perspective) => "[2/4] Running Perspective Agent...",
        Progress::Agent(AgentRole::Skeptic) => "[3/4] Running Skeptic Agent...",
        Progress::Composing => "[4/4] Building final report...",
        Progress::Synthesizing => "Synthesizing debate...",
    }
}

/// Prints progress lines to stderr.
pub struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn on_progress(&self, step: Progress) {
        let _ = writeln!(io::stderr().lock(), "{}", progress_line(step));
    }
}
