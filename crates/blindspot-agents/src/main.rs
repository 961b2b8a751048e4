use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use blindspot_agents::cli::{
    read_subject_text, write_report, AnalysisArgs, Cli, Command, CompareArgs, RunArgs,
    StderrProgress, BANNER,
};
use blindspot_agents::config::check_endpoint;
use blindspot_agents::prompts::PROMPT_VERSION;
use blindspot_agents::{BlindspotConfig, CritiqueRequest, Orchestrator, RigCompletionClient};
use clap::Parser;
use composition::render_severity_text;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "blindspot failed");
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but did not succeed.
async fn dispatch(cli: Cli) -> Result<bool> {
    let mut config = match BlindspotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("{}", e.user_message());
            return Ok(false);
        }
    };

    info!(
        prompt_version = PROMPT_VERSION,
        base_url = %config.endpoint.base_url,
        model = %config.default_model,
        "blindspot starting"
    );

    match cli.into_command() {
        Command::Check => {
            let reachable = check_endpoint(&config.endpoint).await;
            if reachable {
                println!("✅ {} is reachable", config.endpoint.base_url);
            } else {
                println!("❌ {} is not reachable", config.endpoint.base_url);
            }
            Ok(reachable)
        }
        Command::Run(args) => {
            if args.reuse {
                config.pipeline.reuse_agent_results = true;
            }
            run(&config, args).await
        }
        Command::Debate(args) => debate(&config, args).await,
        Command::Compare(args) => compare(&config, args).await,
    }
}

fn orchestrator(config: &BlindspotConfig) -> Orchestrator {
    let client = Arc::new(RigCompletionClient::new(config.endpoint.clone()));
    Orchestrator::new(config.pipeline.clone(), client).with_progress(Arc::new(StderrProgress))
}

fn request(config: &BlindspotConfig, args: &AnalysisArgs, text: String) -> Result<CritiqueRequest> {
    let model = args.model.unwrap_or(config.default_model);
    Ok(CritiqueRequest::new(text, model, args.temperature)?)
}

/// Banner, then the subject from stdin. `None` when nothing was entered.
fn prompt_for_subject() -> Result<Option<String>> {
    println!("{BANNER}");
    println!("Paste your idea, plan, or argument below.");
    println!("Press ENTER on an empty line to finish.\n");
    io::stdout().flush().ok();

    let text = read_subject_text(io::stdin().lock()).context("failed to read stdin")?;
    if text.is_empty() {
        println!("No input provided.");
        return Ok(None);
    }
    Ok(Some(text))
}

async fn run(config: &BlindspotConfig, args: RunArgs) -> Result<bool> {
    let Some(text) = prompt_for_subject()? else {
        return Ok(false);
    };
    let request = request(config, &args.analysis, text)?;
    let orchestrator = orchestrator(config).with_boilerplate(args.boilerplate());

    let (state, debate) = if args.with_debate {
        let (state, debate) = orchestrator.run_with_debate(&request).await;
        (state, Some(debate))
    } else {
        (orchestrator.run(&request).await, None)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("\n{}", state.display_text());
        if let Some(severity) = &state.severity {
            println!("\nSeverity\n{}", render_severity_text(severity, 30));
        }
    }

    let mut ok = state.is_success();
    if ok {
        let path = args.output.as_ref().unwrap_or(&config.report_path);
        write_report(path, &state.report)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("\nSaved to {}", path.display());
    }

    match debate {
        Some(Ok(transcript)) => println!("\n🗣️ Debate\n\n{transcript}"),
        Some(Err(e)) => {
            ok = false;
            // The analysis already printed the same message.
            if state.is_success() {
                println!("\n{}", e.user_message());
            }
        }
        None => {}
    }
    Ok(ok)
}

async fn debate(config: &BlindspotConfig, args: AnalysisArgs) -> Result<bool> {
    let Some(text) = prompt_for_subject()? else {
        return Ok(false);
    };
    let request = request(config, &args, text)?;

    match orchestrator(config).run_debate(&request).await {
        Ok(transcript) => {
            println!("\n{transcript}");
            Ok(true)
        }
        Err(e) => {
            println!("\n{}", e.user_message());
            Ok(false)
        }
    }
}

async fn compare(config: &BlindspotConfig, args: CompareArgs) -> Result<bool> {
    let read = |path: &std::path::Path| {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    };
    let idea_a = read(args.idea_a.as_path())?;
    let idea_b = read(args.idea_b.as_path())?;
    let model = args.analysis.model.unwrap_or(config.default_model);

    match orchestrator(config)
        .compare(&idea_a, &idea_b, model, args.analysis.temperature)
        .await
    {
        Ok(verdict) => {
            println!("{verdict}");
            Ok(true)
        }
        Err(e) => {
            println!("{}", e.user_message());
            Ok(false)
        }
    }
}
