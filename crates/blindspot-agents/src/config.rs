//! Runtime configuration.
//!
//! Everything environment-driven is read once, here, into explicit structs
//! that are passed down. Components never read the environment themselves.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (applied by `main`)
//! 2. Process environment / `.env` file (loaded with `dotenvy`)
//! 3. Built-in defaults
//!
//! | Variable                     | Field                             | Default                     |
//! |------------------------------|-----------------------------------|-----------------------------|
//! | `OPENAI_API_KEY`             | `endpoint.api_key`                | none                        |
//! | `OPENAI_BASE_URL`            | `endpoint.base_url`               | `https://api.openai.com/v1` |
//! | `OPENAI_MODEL`               | `default_model`                   | `gpt-4o-mini`               |
//! | `BLINDSPOT_TIMEOUT_SECS`     | `endpoint.timeout`                | 120                         |
//! | `BLINDSPOT_PROMPTS_DIR`      | `pipeline.prompts_dir`            | built-in prompts            |
//! | `BLINDSPOT_REPORT_PATH`      | `report_path`                     | `blind_spot_report.txt`     |
//! | `BLINDSPOT_PARALLEL_SKEPTIC` | `pipeline.parallel_skeptic`       | false                       |
//! | `BLINDSPOT_REUSE_RESULTS`    | `pipeline.reuse_agent_results`    | false                       |

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::CritiqueError;
use crate::types::ModelId;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_REPORT_PATH: &str = "blind_spot_report.txt";
/// Sampling temperature of the debate synthesis call.
pub const DEFAULT_DEBATE_TEMPERATURE: f64 = 0.5;

const ENV_API_KEY: &str = "OPENAI_API_KEY";
const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
const ENV_MODEL: &str = "OPENAI_MODEL";
const ENV_TIMEOUT_SECS: &str = "BLINDSPOT_TIMEOUT_SECS";
const ENV_PROMPTS_DIR: &str = "BLINDSPOT_PROMPTS_DIR";
const ENV_REPORT_PATH: &str = "BLINDSPOT_REPORT_PATH";
const ENV_PARALLEL_SKEPTIC: &str = "BLINDSPOT_PARALLEL_SKEPTIC";
const ENV_REUSE_RESULTS: &str = "BLINDSPOT_REUSE_RESULTS";

/// Completion service endpoint. Only the completion client sees this.
#[derive(Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    /// Bearer credential; `None` means every network operation is refused.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Upper bound on a single completion round trip.
    pub timeout: Duration,
}

impl EndpointConfig {
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// What the orchestrator needs to drive a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Whether a credential is configured. Checked before any call.
    pub credential_configured: bool,
    /// Directory with prompt/template overrides; `None` uses built-ins.
    pub prompts_dir: Option<PathBuf>,
    /// Run Skeptic concurrently with the Analyzer → Perspective chain.
    pub parallel_skeptic: bool,
    /// Let the debate step reuse the analysis outputs instead of re-running
    /// the three agents (four calls instead of seven).
    pub reuse_agent_results: bool,
    pub debate_temperature: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            credential_configured: false,
            prompts_dir: None,
            parallel_skeptic: false,
            reuse_agent_results: false,
            debate_temperature: DEFAULT_DEBATE_TEMPERATURE,
        }
    }
}

/// Top-level configuration assembled at startup.
#[derive(Debug, Clone)]
pub struct BlindspotConfig {
    pub endpoint: EndpointConfig,
    pub default_model: ModelId,
    pub report_path: PathBuf,
    pub pipeline: PipelineConfig,
}

impl Default for BlindspotConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            default_model: ModelId::default(),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl BlindspotConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, CritiqueError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// `Configuration` when a variable is present but unusable.
    pub fn from_vars<F>(get: F) -> Result<Self, CritiqueError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let api_key = get(ENV_API_KEY);
        let base_url = get(ENV_BASE_URL).unwrap_or(defaults.endpoint.base_url);

        let default_model = match get(ENV_MODEL) {
            Some(raw) => raw.parse::<ModelId>().map_err(|e| {
                CritiqueError::Configuration(format!("{ENV_MODEL}: {e}"))
            })?,
            None => defaults.default_model,
        };

        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|_| {
                CritiqueError::Configuration(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
                ))
            })?),
            None => defaults.endpoint.timeout,
        };

        let endpoint = EndpointConfig {
            base_url,
            api_key,
            timeout,
        };

        let pipeline = PipelineConfig {
            credential_configured: endpoint.has_credential(),
            prompts_dir: get(ENV_PROMPTS_DIR).map(PathBuf::from),
            parallel_skeptic: get(ENV_PARALLEL_SKEPTIC).is_some_and(|v| parse_flag(&v)),
            reuse_agent_results: get(ENV_REUSE_RESULTS).is_some_and(|v| parse_flag(&v)),
            ..defaults.pipeline
        };

        let config = Self {
            endpoint,
            default_model,
            report_path: get(ENV_REPORT_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.report_path),
            pipeline,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the assembled config.
    pub fn validate(&self) -> Result<(), CritiqueError> {
        if self.endpoint.timeout.is_zero() {
            return Err(CritiqueError::Configuration(
                "request timeout must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pipeline.debate_temperature) {
            return Err(CritiqueError::Configuration(format!(
                "debate_temperature must be in [0, 1], got {}",
                self.pipeline.debate_temperature
            )));
        }
        if self.endpoint.base_url.trim().is_empty() {
            return Err(CritiqueError::Configuration(
                "base URL must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Check if the completion endpoint is reachable (GET `{base_url}/models`).
pub async fn check_endpoint(endpoint: &EndpointConfig) -> bool {
    let models_url = format!("{}/models", endpoint.base_url.trim_end_matches('/'));
    let mut request = reqwest::Client::new()
        .get(&models_url)
        .timeout(Duration::from_secs(5));
    if let Some(key) = endpoint.api_key.as_deref() {
        request = request.bearer_auth(key);
    }
    match request.send().await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}
