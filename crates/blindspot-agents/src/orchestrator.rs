//! Pipeline orchestrator shared by every front-end.
//!
//! ```text
//! run(request)
//!   → pre-flight: blank subject? credential? prompts loadable?   (no calls)
//!   → Analyzer → Perspective(analyzer output) → Skeptic
//!       (Skeptic joins the chain concurrently when parallel_skeptic is set)
//!   → compose report + severity map + HTML
//!   → PipelineRunState { Succeeded | Failed }
//! ```
//!
//! Runs are all-or-nothing: a failure at any step discards every partial
//! output and leaves a single user-facing message on the state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use composition::{
    build_report, build_severity_bars, render_severity_html, DebateTranscript, ReportSections,
    SeverityMap,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::agents::analyzer::run_analyzer;
use crate::agents::compare::compare_ideas;
use crate::agents::debate::{build_debate_transcript, DebateInputs};
use crate::agents::perspective::run_perspective;
use crate::agents::skeptic::run_skeptic;
use crate::agents::TemperaturePlan;
use crate::completion::{CompletionClient, CompletionRequest};
use crate::config::PipelineConfig;
use crate::errors::{CritiqueError, ErrorInfo};
use crate::prompts::{Boilerplate, PromptSet};
use crate::state_machine::{RunLifecycle, RunStatus, TransitionRecord};
use crate::types::{clamp_temperature, AgentOutputs, AgentRole, CritiqueRequest, ModelId};

/// Status line of a successful analysis.
pub const SUCCESS_MESSAGE: &str = "✅ Multi-agent analysis complete.";

/// Observable outcome of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRunState {
    pub status: RunStatus,
    /// `SUCCESS_MESSAGE` or the error's user message.
    pub message: String,
    pub report: String,
    pub analyzer: String,
    pub perspective: String,
    pub skeptic: String,
    pub severity: Option<SeverityMap>,
    pub severity_html: String,
    pub error: Option<ErrorInfo>,
    /// Agent whose call failed, when the failure happened inside one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_agent: Option<AgentRole>,
    /// Completion calls issued, including a failed one.
    pub call_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(default)]
    pub transitions: Vec<TransitionRecord>,
}

impl PipelineRunState {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    /// Report on success, error message otherwise.
    pub fn display_text(&self) -> &str {
        if self.is_success() {
            &self.report
        } else {
            &self.message
        }
    }
}

/// Error plus the agent it came from, if any.
struct Failure {
    agent: Option<AgentRole>,
    error: CritiqueError,
}

impl From<CritiqueError> for Failure {
    fn from(error: CritiqueError) -> Self {
        Self { agent: None, error }
    }
}

fn in_agent(agent: AgentRole) -> impl FnOnce(CritiqueError) -> Failure {
    move |error| Failure {
        agent: Some(agent),
        error,
    }
}

/// Counts calls passing through to the wrapped client.
struct CountingClient<'a> {
    inner: &'a dyn CompletionClient,
    calls: AtomicUsize,
}

impl<'a> CountingClient<'a> {
    fn new(inner: &'a dyn CompletionClient) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for CountingClient<'_> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CritiqueError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.complete(request).await
    }
}

/// Pipeline step about to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Agent(AgentRole),
    Composing,
    Synthesizing,
}

/// Receives step notifications, e.g. for CLI progress lines.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, step: Progress);
}

/// Drives analysis, debate and comparison runs.
pub struct Orchestrator {
    config: PipelineConfig,
    client: Arc<dyn CompletionClient>,
    boilerplate: Boilerplate,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            config,
            client,
            boilerplate: Boilerplate::default(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Register of the hand-written report sections.
    pub fn with_boilerplate(mut self, boilerplate: Boilerplate) -> Self {
        self.boilerplate = boilerplate;
        self
    }

    fn notify(&self, step: Progress) {
        if let Some(sink) = &self.progress {
            sink.on_progress(step);
        }
    }

    // ── Analysis ────────────────────────────────────────────────────────────

    /// Full analysis: three agents, report, severity map.
    pub async fn run(&self, request: &CritiqueRequest) -> PipelineRunState {
        self.run_analysis(request).await.0
    }

    /// Analysis plus debate (the combined user action).
    ///
    /// By default the debate re-runs all three agents; with
    /// `reuse_agent_results` it argues over the analysis outputs instead.
    pub async fn run_with_debate(
        &self,
        request: &CritiqueRequest,
    ) -> (PipelineRunState, Result<DebateTranscript, CritiqueError>) {
        if !self.config.reuse_agent_results {
            let state = self.run(request).await;
            let debate = self.run_debate(request).await;
            return (state, debate);
        }

        let (state, outcome) = self.run_analysis(request).await;
        let debate = match outcome {
            Ok((prompts, outputs)) => {
                let counter = CountingClient::new(self.client.as_ref());
                self.synthesize(&counter, &prompts, request, &outputs).await
            }
            Err(err) => Err(err),
        };
        (state, debate)
    }

    async fn run_analysis(
        &self,
        request: &CritiqueRequest,
    ) -> (
        PipelineRunState,
        Result<(PromptSet, AgentOutputs), CritiqueError>,
    ) {
        let started_at = Utc::now();
        let mut lifecycle = RunLifecycle::new();
        let counter = CountingClient::new(self.client.as_ref());

        info!(
            model = %request.model(),
            temperature = request.temperature(),
            parallel_skeptic = self.config.parallel_skeptic,
            "analysis run started"
        );

        let outcome = self.analyze(&counter, request, &mut lifecycle).await;
        let call_count = counter.calls();

        match outcome {
            Ok((prompts, outputs)) => {
                self.notify(Progress::Composing);
                let severity = build_severity_bars();
                let severity_html = render_severity_html(&severity.to_value());
                let report = build_report(
                    &prompts.template,
                    &ReportSections {
                        analyzer_output: &outputs.analyzer.output_text,
                        perspective_output: &outputs.perspective.output_text,
                        skeptic_output: &outputs.skeptic.output_text,
                        exec_summary: self.boilerplate.exec_summary(),
                        top_three: self.boilerplate.top_three(),
                        recommendations: self.boilerplate.recommendations(),
                    },
                );
                advance(&mut lifecycle, RunStatus::Succeeded, Some("report composed"));
                info!(status = %lifecycle.current(), call_count, summary = %lifecycle.summary(), "analysis run finished");

                let state = PipelineRunState {
                    status: lifecycle.current(),
                    message: SUCCESS_MESSAGE.to_string(),
                    report,
                    analyzer: outputs.analyzer.output_text.clone(),
                    perspective: outputs.perspective.output_text.clone(),
                    skeptic: outputs.skeptic.output_text.clone(),
                    severity: Some(severity),
                    severity_html,
                    error: None,
                    failed_agent: None,
                    call_count,
                    started_at,
                    finished_at: Utc::now(),
                    transitions: lifecycle.transitions().to_vec(),
                };
                (state, Ok((prompts, outputs)))
            }
            Err(Failure { agent, error: err }) => {
                if let Err(illegal) = lifecycle.fail(&err.to_string()) {
                    warn!(error = %illegal, "run already terminal");
                }
                if err.kind().is_user_recoverable() {
                    warn!(kind = %err.kind(), error = %err, "analysis run rejected input");
                } else {
                    error!(
                        kind = %err.kind(),
                        agent = agent.map(AgentRole::name),
                        call_count,
                        error = %err,
                        "analysis run failed"
                    );
                }

                let state = PipelineRunState {
                    status: lifecycle.current(),
                    message: err.user_message(),
                    report: String::new(),
                    analyzer: String::new(),
                    perspective: String::new(),
                    skeptic: String::new(),
                    severity: None,
                    severity_html: String::new(),
                    error: Some(ErrorInfo::from(&err)),
                    failed_agent: agent,
                    call_count,
                    started_at,
                    finished_at: Utc::now(),
                    transitions: lifecycle.transitions().to_vec(),
                };
                (state, Err(err))
            }
        }
    }

    async fn analyze(
        &self,
        client: &dyn CompletionClient,
        request: &CritiqueRequest,
        lifecycle: &mut RunLifecycle,
    ) -> Result<(PromptSet, AgentOutputs), Failure> {
        let prompts = self.preflight(request)?;
        advance(lifecycle, RunStatus::Running, None);

        let plan = TemperaturePlan::analysis(request.temperature());
        let outputs = self.run_agents(client, &prompts, request, plan).await?;
        Ok((prompts, outputs))
    }

    // ── Debate ──────────────────────────────────────────────────────────────

    /// Debate view: re-runs all three agents, then synthesizes a transcript.
    pub async fn run_debate(
        &self,
        request: &CritiqueRequest,
    ) -> Result<DebateTranscript, CritiqueError> {
        let counter = CountingClient::new(self.client.as_ref());
        let result: Result<DebateTranscript, Failure> = async {
            let prompts = self.preflight(request)?;
            let plan = TemperaturePlan::debate(request.temperature());
            let outputs = self.run_agents(&counter, &prompts, request, plan).await?;
            self.synthesize(&counter, &prompts, request, &outputs)
                .await
                .map_err(Failure::from)
        }
        .await;

        match result {
            Ok(transcript) => {
                info!(call_count = counter.calls(), rounds = transcript.rounds(), "debate run finished");
                Ok(transcript)
            }
            Err(Failure { agent, error: err }) => {
                error!(
                    kind = %err.kind(),
                    agent = agent.map(AgentRole::name),
                    call_count = counter.calls(),
                    error = %err,
                    "debate run failed"
                );
                Err(err)
            }
        }
    }

    async fn synthesize(
        &self,
        client: &dyn CompletionClient,
        prompts: &PromptSet,
        request: &CritiqueRequest,
        outputs: &AgentOutputs,
    ) -> Result<DebateTranscript, CritiqueError> {
        self.notify(Progress::Synthesizing);
        build_debate_transcript(
            client,
            &prompts.debate,
            DebateInputs::from_outputs(request.subject_text(), outputs),
            request.model(),
            self.config.debate_temperature,
        )
        .await
    }

    // ── Compare ─────────────────────────────────────────────────────────────

    /// Compare two ideas in a single call.
    pub async fn compare(
        &self,
        idea_a: &str,
        idea_b: &str,
        model: ModelId,
        temperature: f64,
    ) -> Result<String, CritiqueError> {
        if idea_a.trim().is_empty() || idea_b.trim().is_empty() {
            return Err(CritiqueError::blank_comparison());
        }
        if !self.config.credential_configured {
            return Err(CritiqueError::missing_credential());
        }
        if temperature.is_nan() {
            return Err(CritiqueError::Validation(
                "temperature must be a number in [0, 1]".to_string(),
            ));
        }

        let prompts = PromptSet::load(self.config.prompts_dir.as_deref())?;
        compare_ideas(
            self.client.as_ref(),
            &prompts.compare,
            idea_a,
            idea_b,
            model,
            clamp_temperature(temperature),
        )
        .await
        .inspect_err(|e| error!(kind = %e.kind(), error = %e, "comparison failed"))
    }

    // ── Shared steps ────────────────────────────────────────────────────────

    /// Checks that need no network. Prompts load here so a bad template
    /// fails the run before any call is issued.
    fn preflight(&self, request: &CritiqueRequest) -> Result<PromptSet, CritiqueError> {
        if request.is_blank() {
            return Err(CritiqueError::blank_subject());
        }
        if !self.config.credential_configured {
            return Err(CritiqueError::missing_credential());
        }
        PromptSet::load(self.config.prompts_dir.as_deref())
    }

    async fn run_agents(
        &self,
        client: &dyn CompletionClient,
        prompts: &PromptSet,
        request: &CritiqueRequest,
        plan: TemperaturePlan,
    ) -> Result<AgentOutputs, Failure> {
        let chain = async {
            self.notify(Progress::Agent(AgentRole::Analyzer));
            let analyzer = run_analyzer(client, prompts, request, plan.analyzer)
                .await
                .map_err(in_agent(AgentRole::Analyzer))?;
            self.notify(Progress::Agent(AgentRole::Perspective));
            let perspective =
                run_perspective(client, prompts, request, &analyzer, plan.perspective)
                    .await
                    .map_err(in_agent(AgentRole::Perspective))?;
            Ok::<_, Failure>((analyzer, perspective))
        };
        let skeptic = async {
            self.notify(Progress::Agent(AgentRole::Skeptic));
            run_skeptic(client, prompts, request, plan.skeptic)
                .await
                .map_err(in_agent(AgentRole::Skeptic))
        };

        // The first failing branch drops the other one mid-call.
        let ((analyzer, perspective), skeptic) = if self.config.parallel_skeptic {
            tokio::try_join!(chain, skeptic)?
        } else {
            let chain = chain.await?;
            (chain, skeptic.await?)
        };

        Ok(AgentOutputs {
            analyzer,
            perspective,
            skeptic,
        })
    }
}

fn advance(lifecycle: &mut RunLifecycle, to: RunStatus, reason: Option<&str>) {
    if let Err(illegal) = lifecycle.advance(to, reason) {
        warn!(error = %illegal, "ignored run transition");
    }
}
