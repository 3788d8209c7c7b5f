//! ModelScore CLI - batch scoring and single-resource inspection.
//!
//! `modelscore` (or `modelscore run`) reads the model list and writes the
//! workbook; the other subcommands fetch one resource and print it as JSON.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use modelscore_core::config::{GITHUB_TOKEN_ENV_VAR, HF_TOKEN_ENV_VAR};
use modelscore_core::github::RepoHost;
use modelscore_core::hub::{ModelHub, OrgRecord};
use modelscore_core::input::parse_repository_id;
use modelscore_core::{
    classify, run_with_config, ClassifiedOwner, GitHubClient, HubClient, NetworkConfig,
    RateLimitPolicy, ReportConfig, ScoreConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "modelscore", version)]
#[command(about = "Collect Hugging Face and GitHub metadata for ML models into a spreadsheet")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Hugging Face base URL
    #[arg(long, global = true, default_value = NetworkConfig::HF_API_BASE)]
    hub_api: String,

    /// GitHub REST API base URL
    #[arg(long, global = true, default_value = NetworkConfig::GITHUB_API_BASE)]
    github_api: String,

    /// GitHub token; unlocks the token-gated checklist items
    #[arg(long, global = true, env = GITHUB_TOKEN_ENV_VAR, hide_env_values = true)]
    github_token: Option<String>,

    /// Hugging Face token for gated or private models
    #[arg(long, global = true, env = HF_TOKEN_ENV_VAR, hide_env_values = true)]
    hf_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = NetworkConfig::REQUEST_TIMEOUT.as_secs())]
    timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process the model list and write the report (default)
    Run(RunArgs),
    /// Print a model's metadata
    Model { hub_id: String },
    /// Classify an owner and print its user or organization record
    Owner { name: String },
    /// Print a user's overview
    User { name: String },
    /// Print an organization's overview and asset counts
    Org { name: String },
    /// Print a repository's metadata and security checklist
    Repo {
        /// `owner/repo`
        repository: String,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Model list file (`hub_id, owner/repo` per line)
    #[arg(short, long, default_value = ReportConfig::MODEL_LIST_FILE)]
    input: PathBuf,

    /// Directory the report is written into
    #[arg(short, long, default_value = ReportConfig::OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Report file name prefix
    #[arg(long, default_value = ReportConfig::BASE_NAME)]
    base_name: String,

    /// Retry rate-limited requests up to N times (0 fails fast)
    #[arg(long, default_value = "0")]
    rate_limit_retries: u32,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from(ReportConfig::MODEL_LIST_FILE),
            output_dir: PathBuf::from(ReportConfig::OUTPUT_DIR),
            base_name: ReportConfig::BASE_NAME.to_string(),
            rate_limit_retries: 0,
        }
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn base_config(cli: &Cli) -> ScoreConfig {
    ScoreConfig::default()
        .with_hub_api_base(cli.hub_api.as_str())
        .with_github_api_base(cli.github_api.as_str())
        .with_github_token(cli.github_token.clone())
        .with_hf_token(cli.hf_token.clone())
        .with_request_timeout(Duration::from_secs(cli.timeout))
}

fn rate_limit_policy(retries: u32) -> RateLimitPolicy {
    if retries == 0 {
        RateLimitPolicy::FailFast
    } else {
        RateLimitPolicy::Backoff {
            max_attempts: retries.saturating_add(1),
            max_wait: NetworkConfig::RATE_LIMIT_MAX_WAIT,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn execute(cli: Cli) -> Result<u8> {
    let config = base_config(&cli);

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => {
            let policy = rate_limit_policy(args.rate_limit_retries);
            let config = config
                .with_model_list(args.input)
                .with_output_dir(args.output_dir)
                .with_report_base_name(args.base_name)
                .with_rate_limit_policy(policy);

            info!("Starting ModelScore run");
            let summary = run_with_config(&config).await?;
            Ok(summary.exit_code() as u8)
        }
        Command::Model { hub_id } => {
            let hub = HubClient::new(&config)?;
            let record = hub
                .fetch_model(&hub_id)
                .await
                .with_context(|| format!("fetching model {}", hub_id))?;
            print_json(&record)?;
            Ok(0)
        }
        Command::Owner { name } => {
            let hub = HubClient::new(&config)?;
            match classify(&hub, &name).await? {
                ClassifiedOwner::User(record) => print_json(&record)?,
                ClassifiedOwner::Organization { name, overview } => {
                    let assets = hub.fetch_org_assets(&name).await;
                    print_json(&OrgRecord::new(name, overview, assets))?;
                }
            }
            Ok(0)
        }
        Command::User { name } => {
            let hub = HubClient::new(&config)?;
            print_json(&hub.fetch_user(&name).await?)?;
            Ok(0)
        }
        Command::Org { name } => {
            let hub = HubClient::new(&config)?;
            print_json(&hub.fetch_org(&name).await?)?;
            Ok(0)
        }
        Command::Repo { repository } => {
            let (owner, name) = parse_repository_id(&repository)
                .ok_or_else(|| anyhow!("'{}' is not of the form owner/repo", repository))?;
            let repos = GitHubClient::new(&config)?;
            let repo = repos.fetch_repo(owner, name).await?;
            print_json(&repos.fetch_security_checklist(&repo).await)?;
            Ok(0)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match execute(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}
