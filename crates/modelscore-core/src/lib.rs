//! ModelScore Core - collects Hugging Face and GitHub metadata for ML models.
//!
//! For each `hub_id, owner/repo` pair in a model list, the library fetches
//! model metadata and the owner's profile from the Hugging Face Hub, the
//! repository and its security posture from GitHub, and writes everything
//! into one timestamped `.xlsx` workbook.
//!
//! # Example
//!
//! ```rust,ignore
//! use modelscore_core::{run_with_config, ScoreConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> modelscore_core::Result<()> {
//!     let config = ScoreConfig::from_env().with_model_list("model_list_map.txt");
//!     let summary = run_with_config(&config).await?;
//!     println!("{} entries, report at {:?}", summary.entries, summary.report_path);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod github;
pub mod hub;
pub mod input;
pub mod network;
pub mod owner;
pub mod processor;
pub mod report;

// Re-export commonly used types
pub use config::{NetworkConfig, RateLimitPolicy, ReportConfig, ScoreConfig};
pub use driver::{run, run_batch, run_with_config, RunSummary};
pub use error::{ErrorKind, Result, ScoreError};
pub use github::{CheckStatus, ChecklistItem, GitHubClient, RepoHost, RepoMetadata, RepoSecurityRecord};
pub use hub::{HubClient, ModelHub, ModelRecord, OrgRecord, UserRecord};
pub use input::{parse_model_list, read_model_list, ModelEntry, ModelList};
pub use owner::{classify, ClassifiedOwner, OwnerKind};
pub use processor::RecordProcessor;
pub use report::{Report, ReportTab, TabCategory, Table};
