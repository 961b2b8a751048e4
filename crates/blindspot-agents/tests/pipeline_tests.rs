//! End-to-end pipeline tests against a recording stub client.
//!
//! No network: the stub answers by persona and records every request so the
//! tests can assert call counts, ordering, temperatures and message content.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use blindspot_agents::prompts::{
    Boilerplate, ANALYZER_PREAMBLE, COMPARE_PREAMBLE, DEBATE_PREAMBLE, PERSPECTIVE_PREAMBLE,
    SKEPTIC_PREAMBLE,
};
use blindspot_agents::{
    AgentRole, CompletionClient, CompletionRequest, CritiqueError, CritiqueRequest, ErrorKind,
    ModelId, Orchestrator, PipelineConfig, RunStatus,
};
use composition::{render_severity_html, Speaker};
use serde_json::json;

const TRANSCRIPT: &str = "\
Analyzer: the market is unproven
Perspective: runners want tempo, not mood
Skeptic: licensing costs sink it
Analyzer: retention is assumed
Perspective: privacy of mood data
Skeptic: incumbents copy it in a sprint";

/// Persona-keyed canned replies, with an optional failing persona and an
/// optional slow persona that is only recorded once its delay elapses.
struct StubClient {
    calls: Mutex<Vec<CompletionRequest>>,
    fail_persona: Option<&'static str>,
    slow_persona: Option<&'static str>,
}

impl StubClient {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_persona: None,
            slow_persona: None,
        }
    }

    fn slow(mut self, persona: &'static str) -> Self {
        self.slow_persona = Some(persona);
        self
    }

    fn failing(persona: &'static str) -> Self {
        Self {
            fail_persona: Some(persona),
            ..Self::new()
        }
    }

    fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CritiqueError> {
        if self.slow_persona == Some(request.system_prompt.as_str()) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        self.calls.lock().unwrap().push(request.clone());

        if self.fail_persona == Some(request.system_prompt.as_str()) {
            return Err(CritiqueError::Transport("503 Service Unavailable".into()));
        }

        let reply = match request.system_prompt.as_str() {
            ANALYZER_PREAMBLE => "A1",
            PERSPECTIVE_PREAMBLE => "P1",
            SKEPTIC_PREAMBLE => "S1",
            DEBATE_PREAMBLE => TRANSCRIPT,
            COMPARE_PREAMBLE => "IDEA B is more robust.",
            _ => "custom",
        };
        Ok(reply.to_string())
    }
}

fn configured() -> PipelineConfig {
    PipelineConfig {
        credential_configured: true,
        ..PipelineConfig::default()
    }
}

fn playlist_request(temperature: f64) -> CritiqueRequest {
    CritiqueRequest::new("Build a mood-based playlist app", ModelId::Gpt4oMini, temperature).unwrap()
}

fn setup(config: PipelineConfig, stub: StubClient) -> (Arc<StubClient>, Orchestrator) {
    let stub = Arc::new(stub);
    let orchestrator = Orchestrator::new(config, stub.clone());
    (stub, orchestrator)
}

#[tokio::test]
async fn playlist_app_end_to_end() {
    let (stub, orch) = setup(configured(), StubClient::new());

    let state = orch.run(&playlist_request(0.4)).await;

    assert_eq!(state.status, RunStatus::Succeeded);
    assert_eq!(state.message, "✅ Multi-agent analysis complete.");
    assert_eq!(
        (state.analyzer.as_str(), state.perspective.as_str(), state.skeptic.as_str()),
        ("A1", "P1", "S1")
    );
    for output in ["A1", "P1", "S1"] {
        assert!(state.report.contains(output), "report missing {output}");
    }
    for token in [
        "{ANALYZER_OUTPUT}",
        "{PERSPECTIVE_OUTPUT}",
        "{SKEPTIC_OUTPUT}",
        "{EXEC_SUMMARY}",
        "{TOP_THREE}",
        "{RECOMMENDATIONS}",
    ] {
        assert!(!state.report.contains(token), "unreplaced {token}");
    }
    assert!(state.report.contains(Boilerplate::Markdown.exec_summary()));

    let severity = state.severity.as_ref().unwrap();
    assert_eq!(severity.get("Risks"), Some(80.0));
    assert_eq!(severity.get("Evidence"), Some(60.0));
    assert!(state.severity_html.contains("80%"));
    assert!(state.error.is_none());

    let calls = stub.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(state.call_count, 3);

    assert_eq!(calls[0].system_prompt, ANALYZER_PREAMBLE);
    assert_eq!(calls[0].user_content, "USER_TEXT:\nBuild a mood-based playlist app");
    assert_eq!(calls[0].temperature, 0.4);

    assert_eq!(calls[1].system_prompt, PERSPECTIVE_PREAMBLE);
    assert_eq!(
        calls[1].user_content,
        "USER_TEXT:\nBuild a mood-based playlist app\n\nANALYZER_OUTPUT:\nA1"
    );
    assert!((calls[1].temperature - 0.5).abs() < 1e-9);

    assert_eq!(calls[2].system_prompt, SKEPTIC_PREAMBLE);
    assert!(!calls[2].user_content.contains("ANALYZER_OUTPUT"));
    assert!((calls[2].temperature - 0.5).abs() < 1e-9);

    assert!(calls.iter().all(|c| c.model == ModelId::Gpt4oMini));
}

#[tokio::test]
async fn temperature_bias_caps_at_one() {
    let (stub, orch) = setup(configured(), StubClient::new());

    let state = orch.run(&playlist_request(1.0)).await;
    assert!(state.is_success());
    assert!(stub.calls().iter().all(|c| c.temperature == 1.0));
}

#[tokio::test]
async fn blank_subject_makes_no_calls() {
    let (stub, orch) = setup(configured(), StubClient::new());

    let request = CritiqueRequest::new("  \n\t", ModelId::default(), 0.4).unwrap();
    let state = orch.run(&request).await;

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(state.error.as_ref().unwrap().kind, ErrorKind::Validation);
    assert_eq!(state.message, "⚠️ Please enter an idea, plan, or argument first.");
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn missing_credential_blocks_every_operation() {
    let (stub, orch) = setup(PipelineConfig::default(), StubClient::new());
    let request = playlist_request(0.4);

    let state = orch.run(&request).await;
    assert_eq!(state.error.unwrap().kind, ErrorKind::Configuration);
    assert!(state.message.contains("OPENAI_API_KEY"));

    let debate = orch.run_debate(&request).await.unwrap_err();
    assert_eq!(debate.kind(), ErrorKind::Configuration);

    let compare = orch
        .compare("idea a", "idea b", ModelId::default(), 0.4)
        .await
        .unwrap_err();
    assert_eq!(compare.kind(), ErrorKind::Configuration);

    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn perspective_failure_discards_partial_output() {
    let (stub, orch) = setup(configured(), StubClient::failing(PERSPECTIVE_PREAMBLE));

    let state = orch.run(&playlist_request(0.4)).await;

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(state.failed_agent, Some(AgentRole::Perspective));
    assert_eq!(
        state.message,
        "❌ Error during analysis: `TransportError` - 503 Service Unavailable"
    );
    assert!(state.analyzer.is_empty());
    assert!(state.perspective.is_empty());
    assert!(state.skeptic.is_empty());
    assert!(state.report.is_empty());
    assert!(state.severity.is_none());
    assert!(state.severity_html.is_empty());
    // Skeptic never runs once the chain has failed.
    assert_eq!(stub.call_count(), 2);
    assert_eq!(state.call_count, 2);
}

#[tokio::test(start_paused = true)]
async fn parallel_skeptic_failure_fails_run() {
    let config = PipelineConfig {
        parallel_skeptic: true,
        ..configured()
    };
    // Slow, so the Analyzer -> Perspective chain finishes first.
    let stub = StubClient::failing(SKEPTIC_PREAMBLE).slow(SKEPTIC_PREAMBLE);
    let (stub, orch) = setup(config, stub);

    let state = orch.run(&playlist_request(0.4)).await;

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(state.failed_agent, Some(AgentRole::Skeptic));
    assert!(state.analyzer.is_empty());
    assert_eq!(stub.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn parallel_analyzer_failure_drops_pending_skeptic() {
    let config = PipelineConfig {
        parallel_skeptic: true,
        ..configured()
    };
    let stub = StubClient::failing(ANALYZER_PREAMBLE).slow(SKEPTIC_PREAMBLE);
    let (stub, orch) = setup(config, stub);

    let state = orch.run(&playlist_request(0.4)).await;

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(state.failed_agent, Some(AgentRole::Analyzer));
    assert!(state.skeptic.is_empty());
    // The in-flight Skeptic call never completed.
    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].system_prompt, ANALYZER_PREAMBLE);
}

#[tokio::test]
async fn skeptic_failure_discards_finished_outputs() {
    let (stub, orch) = setup(configured(), StubClient::failing(SKEPTIC_PREAMBLE));

    let state = orch.run(&playlist_request(0.4)).await;

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(state.failed_agent, Some(AgentRole::Skeptic));
    assert!(state.analyzer.is_empty());
    assert!(state.perspective.is_empty());
    assert!(state.skeptic.is_empty());
    assert!(state.report.is_empty());
    assert!(state.severity.is_none());
    assert_eq!(state.call_count, 3);
    assert_eq!(stub.call_count(), 3);
}

#[tokio::test]
async fn deserialized_request_reaches_agents_clamped() {
    let (stub, orch) = setup(configured(), StubClient::new());

    let request: CritiqueRequest = serde_json::from_str(
        r#"{"subject_text":"Build a mood-based playlist app","model":"gpt-4.1","temperature":5.0}"#,
    )
    .unwrap();
    let state = orch.run(&request).await;

    assert!(state.is_success());
    let calls = stub.calls();
    assert!(calls.iter().all(|c| c.temperature == 1.0));
    assert!(calls.iter().all(|c| c.model == ModelId::Gpt41));
}

#[tokio::test]
async fn parallel_skeptic_success_matches_sequential_report() {
    let (_, sequential) = setup(configured(), StubClient::new());
    let (stub, parallel) = setup(
        PipelineConfig {
            parallel_skeptic: true,
            ..configured()
        },
        StubClient::new(),
    );

    let a = sequential.run(&playlist_request(0.4)).await;
    let b = parallel.run(&playlist_request(0.4)).await;

    assert!(b.is_success());
    assert_eq!(a.report, b.report);
    let perspective = stub
        .calls()
        .into_iter()
        .find(|c| c.system_prompt == PERSPECTIVE_PREAMBLE)
        .unwrap();
    assert!(perspective.user_content.ends_with("ANALYZER_OUTPUT:\nA1"));
}

#[tokio::test]
async fn debate_reruns_agents_with_debate_temperatures() {
    let (stub, orch) = setup(configured(), StubClient::new());

    let transcript = orch.run_debate(&playlist_request(0.4)).await.unwrap();

    assert_eq!(transcript.rounds(), 2);
    assert_eq!(transcript.turns_by(Speaker::Skeptic).count(), 2);
    assert_eq!(transcript.to_string(), TRANSCRIPT);

    let calls = stub.calls();
    let temperatures: Vec<f64> = calls.iter().map(|c| c.temperature).collect();
    assert_eq!(calls.len(), 4);
    assert_eq!(temperatures[0], 0.4);
    assert_eq!(temperatures[1], 0.4);
    assert!((temperatures[2] - 0.5).abs() < 1e-9);
    assert_eq!(temperatures[3], 0.5);

    let synthesis = &calls[3];
    assert_eq!(synthesis.system_prompt, DEBATE_PREAMBLE);
    assert!(synthesis.user_content.contains("ANALYZER_OUTPUT:\nA1"));
    assert!(synthesis.user_content.contains("PERSPECTIVE_OUTPUT:\nP1"));
    assert!(synthesis.user_content.ends_with("SKEPTIC_OUTPUT:\nS1"));
}

#[tokio::test]
async fn analysis_with_debate_issues_seven_calls() {
    let (stub, orch) = setup(configured(), StubClient::new());

    let (state, debate) = orch.run_with_debate(&playlist_request(0.4)).await;

    assert!(state.is_success());
    assert_eq!(state.call_count, 3);
    assert_eq!(debate.unwrap().rounds(), 2);
    assert_eq!(stub.call_count(), 7);
}

#[tokio::test]
async fn reused_results_issue_four_calls() {
    let config = PipelineConfig {
        reuse_agent_results: true,
        ..configured()
    };
    let (stub, orch) = setup(config, StubClient::new());

    let (state, debate) = orch.run_with_debate(&playlist_request(0.4)).await;

    assert!(state.is_success());
    assert!(debate.is_ok());
    let calls = stub.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[3].system_prompt, DEBATE_PREAMBLE);
}

#[tokio::test]
async fn reused_results_skip_debate_after_failure() {
    let config = PipelineConfig {
        reuse_agent_results: true,
        ..configured()
    };
    let (stub, orch) = setup(config, StubClient::failing(ANALYZER_PREAMBLE));

    let (state, debate) = orch.run_with_debate(&playlist_request(0.4)).await;

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(debate.unwrap_err().kind(), ErrorKind::Transport);
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn broken_template_fails_before_any_call() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("report_template.txt"),
        "{ANALYZER_OUTPUT}\n{SKEPTIC_OUTPUT}",
    )
    .unwrap();
    let config = PipelineConfig {
        prompts_dir: Some(dir.path().to_path_buf()),
        ..configured()
    };
    let (stub, orch) = setup(config, StubClient::new());

    let state = orch.run(&playlist_request(0.4)).await;

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(state.error.unwrap().kind, ErrorKind::Composition);
    assert!(state.message.contains("`CompositionError`"));
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn custom_prompts_and_template_are_used() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("analyzer_prompt.txt"), "Find holes.").unwrap();
    std::fs::write(
        dir.path().join("report_template.txt"),
        "# {EXEC_SUMMARY}\n{ANALYZER_OUTPUT}|{PERSPECTIVE_OUTPUT}|{SKEPTIC_OUTPUT}\n{TOP_THREE}\n{RECOMMENDATIONS}\n{NOT_A_PLACEHOLDER}",
    )
    .unwrap();
    let config = PipelineConfig {
        prompts_dir: Some(dir.path().to_path_buf()),
        ..configured()
    };
    let (stub, orch) = setup(config, StubClient::new());

    let state = orch.run(&playlist_request(0.4)).await;

    assert!(state.is_success());
    assert_eq!(stub.calls()[0].system_prompt, "Find holes.");
    assert!(state.report.contains("custom|P1|S1"));
    assert!(state.report.ends_with("{NOT_A_PLACEHOLDER}"));
}

#[tokio::test]
async fn compare_sends_both_ideas_once() {
    let (stub, orch) = setup(configured(), StubClient::new());

    let verdict = orch
        .compare("Coffee cart", "Food truck", ModelId::Gpt41Mini, 0.4)
        .await
        .unwrap();

    assert_eq!(verdict, "IDEA B is more robust.");
    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].user_content, "IDEA A:\nCoffee cart\n\nIDEA B:\nFood truck");
    assert_eq!(calls[0].model, ModelId::Gpt41Mini);
}

#[tokio::test]
async fn compare_blank_idea_is_validation() {
    let (stub, orch) = setup(configured(), StubClient::new());

    let err = orch
        .compare("", "Food truck", ModelId::default(), 0.4)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(stub.call_count(), 0);
}

#[test]
fn severity_render_clamps_scores() {
    let html = render_severity_html(&json!({ "Risks": 150, "Evidence": "high", "Fragility": "42" }));
    assert!(html.contains("100%"));
    assert!(!html.contains("150%"));
    assert!(html.contains("0%"));
    assert!(html.contains("42%"));

    let warning = render_severity_html(&json!([1, 2, 3]));
    assert_eq!(warning, "<p>⚠️ Could not compute severity distribution.</p>");
}

#[test]
fn failed_state_serializes_structured_codes() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_, orch) = setup(configured(), StubClient::failing(SKEPTIC_PREAMBLE));
    let state = rt.block_on(orch.run(&playlist_request(0.4)));

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["error"]["kind"], "transport");
    assert_eq!(json["report"], "");
    assert_eq!(json["analyzer"], "");
    assert_eq!(json["perspective"], "");
    assert_eq!(json["call_count"], 3);
    assert!(json["severity"].is_null());
}
