//! Centralized configuration for ModelScore.
//!
//! Compile-time defaults live on the `NetworkConfig` and `ReportConfig`
//! constant holders. A `ScoreConfig` value is built once at startup and
//! passed by reference into both remote clients.

use std::path::PathBuf;
use std::time::Duration;

/// Network-related defaults.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const HF_API_BASE: &'static str = "https://huggingface.co";
    pub const GITHUB_API_BASE: &'static str = "https://api.github.com";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const USER_AGENT: &'static str = "ModelScore/0.3";
    pub const GITHUB_ACCEPT: &'static str = "application/vnd.github+json";
    pub const RATE_LIMIT_MAX_WAIT: Duration = Duration::from_secs(60);
    pub const RATE_LIMIT_MAX_ATTEMPTS: u32 = 3;
    pub const THROTTLE_DELAY: Duration = Duration::from_millis(500);
    /// Pages followed on one list endpoint before the listing is abandoned.
    pub const MAX_LIST_PAGES: u32 = 200;
    pub const GITHUB_PER_PAGE: &'static str = "100";
}

/// Report and input file defaults.
pub struct ReportConfig;

impl ReportConfig {
    pub const MODEL_LIST_FILE: &'static str = "model_list_map.txt";
    pub const OUTPUT_DIR: &'static str = "model_scores";
    pub const BASE_NAME: &'static str = "modelscore";
    pub const TIMESTAMP_FORMAT: &'static str = "%Y%m%d_%H%M%S";
    pub const FILE_EXTENSION: &'static str = "xlsx";
}

/// Environment variable holding the GitHub access token.
pub const GITHUB_TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Environment variable holding the Hugging Face access token.
pub const HF_TOKEN_ENV_VAR: &str = "HF_TOKEN";

/// How rate-limit signals from either API are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitPolicy {
    /// Treat a rate-limit response like any other category failure.
    #[default]
    FailFast,
    /// Re-attempt rate-limited requests, waiting for the reset hint.
    Backoff {
        /// Total attempts including the first one.
        max_attempts: u32,
        /// Upper bound on a single wait.
        max_wait: Duration,
    },
}

impl RateLimitPolicy {
    /// Backoff with the default attempt count and wait cap.
    pub fn backoff() -> Self {
        RateLimitPolicy::Backoff {
            max_attempts: NetworkConfig::RATE_LIMIT_MAX_ATTEMPTS,
            max_wait: NetworkConfig::RATE_LIMIT_MAX_WAIT,
        }
    }
}

/// Runtime configuration for a ModelScore run.
#[derive(Clone)]
pub struct ScoreConfig {
    /// Input list of `hub_id, owner/repo` lines.
    pub model_list_path: PathBuf,
    /// Directory the report workbook is written into.
    pub output_dir: PathBuf,
    /// Report file name prefix.
    pub report_base_name: String,
    /// Hugging Face base URL (API paths are appended).
    pub hub_api_base: String,
    /// GitHub REST API base URL.
    pub github_api_base: String,
    /// Optional Hugging Face token.
    pub hf_token: Option<String>,
    /// Optional GitHub token; unlocks token-gated checklist items.
    pub github_token: Option<String>,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub rate_limit_policy: RateLimitPolicy,
}

impl std::fmt::Debug for ScoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreConfig")
            .field("model_list_path", &self.model_list_path)
            .field("output_dir", &self.output_dir)
            .field("report_base_name", &self.report_base_name)
            .field("hub_api_base", &self.hub_api_base)
            .field("github_api_base", &self.github_api_base)
            .field("hf_token", &self.hf_token.as_ref().map(|_| "<redacted>"))
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("rate_limit_policy", &self.rate_limit_policy)
            .finish()
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            model_list_path: PathBuf::from(ReportConfig::MODEL_LIST_FILE),
            output_dir: PathBuf::from(ReportConfig::OUTPUT_DIR),
            report_base_name: ReportConfig::BASE_NAME.to_string(),
            hub_api_base: NetworkConfig::HF_API_BASE.to_string(),
            github_api_base: NetworkConfig::GITHUB_API_BASE.to_string(),
            hf_token: None,
            github_token: None,
            request_timeout: NetworkConfig::REQUEST_TIMEOUT,
            user_agent: NetworkConfig::USER_AGENT.to_string(),
            rate_limit_policy: RateLimitPolicy::default(),
        }
    }
}

impl ScoreConfig {
    /// Defaults plus tokens read from the environment.
    pub fn from_env() -> Self {
        Self {
            hf_token: read_token(HF_TOKEN_ENV_VAR),
            github_token: read_token(GITHUB_TOKEN_ENV_VAR),
            ..Self::default()
        }
    }

    pub fn with_model_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_list_path = path.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_report_base_name(mut self, name: impl Into<String>) -> Self {
        self.report_base_name = name.into();
        self
    }

    pub fn with_hub_api_base(mut self, base: impl Into<String>) -> Self {
        self.hub_api_base = base.into();
        self
    }

    pub fn with_github_api_base(mut self, base: impl Into<String>) -> Self {
        self.github_api_base = base.into();
        self
    }

    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.and_then(|t| normalize_token(&t));
        self
    }

    pub fn with_hf_token(mut self, token: Option<String>) -> Self {
        self.hf_token = token.and_then(|t| normalize_token(&t));
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_rate_limit_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit_policy = policy;
        self
    }

    /// Whether GitHub requests carry credentials.
    pub fn has_github_token(&self) -> bool {
        self.github_token.is_some()
    }
}

fn read_token(var: &str) -> Option<String> {
    std::env::var(var).ok().and_then(|t| normalize_token(&t))
}

fn normalize_token(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScoreConfig::default();
        assert_eq!(config.model_list_path, PathBuf::from("model_list_map.txt"));
        assert_eq!(config.report_base_name, "modelscore");
        assert_eq!(config.rate_limit_policy, RateLimitPolicy::FailFast);
        assert!(!config.has_github_token());
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = ScoreConfig::default()
            .with_github_token(Some("   ".into()))
            .with_hf_token(Some(" hf_abc \n".into()));
        assert!(config.github_token.is_none());
        assert_eq!(config.hf_token.as_deref(), Some("hf_abc"));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = ScoreConfig::default().with_github_token(Some("ghp_secret".into()));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_backoff_policy_defaults() {
        match RateLimitPolicy::backoff() {
            RateLimitPolicy::Backoff {
                max_attempts,
                max_wait,
            } => {
                assert_eq!(max_attempts, 3);
                assert_eq!(max_wait, Duration::from_secs(60));
            }
            other => panic!("unexpected policy {:?}", other),
        }
    }
}
