//! GitHub repository metadata and security posture.

mod checklist;
mod client;
mod types;

pub use checklist::{
    evaluate_checklist, CheckStatus, ChecklistInputs, ChecklistItem, Probe, BRANCH_PROTECTION,
    DEPENDABOT_SECURITY_UPDATES, LICENSE_PRESENT, MEMBERS_WITHOUT_2FA, NOT_ARCHIVED,
    PUBLIC_VISIBILITY, SECRET_SCANNING, TWO_FACTOR_REQUIREMENT,
};
pub use client::GitHubClient;
pub use types::{
    FeatureStatus, ReleaseSummary, RepoFields, RepoLicense, RepoMetadata, RepoOwner,
    RepoSecurityRecord, SecurityAndAnalysis,
};

use crate::Result;
use async_trait::async_trait;

/// Read access to a repository host.
#[async_trait]
pub trait RepoHost: Send + Sync {
    async fn fetch_repo(&self, owner: &str, repo: &str) -> Result<RepoMetadata>;

    /// Gather owner, branch and member details and evaluate the checklist.
    ///
    /// Never fails; anything that could not be fetched is reported through
    /// the record's optional fields and `Unknown` checklist items.
    async fn fetch_security_checklist(&self, repo: &RepoMetadata) -> RepoSecurityRecord;
}
