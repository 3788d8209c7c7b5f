//! Repository security checklist evaluation.
//!
//! Evaluation is pure: the client gathers the probes, this module turns them
//! into a fixed, ordered list of items.

use super::types::{FeatureStatus, RepoMetadata, SecurityAndAnalysis};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

pub const TWO_FACTOR_REQUIREMENT: &str = "two_factor_requirement";
pub const MEMBERS_WITHOUT_2FA: &str = "members_without_2fa";
pub const SECRET_SCANNING: &str = "secret_scanning";
pub const DEPENDABOT_SECURITY_UPDATES: &str = "dependabot_security_updates";
pub const BRANCH_PROTECTION: &str = "branch_protection";
pub const PUBLIC_VISIBILITY: &str = "public_visibility";
pub const LICENSE_PRESENT: &str = "license_present";
pub const NOT_ARCHIVED: &str = "not_archived";

const NO_TOKEN: &str = "requires a GitHub token";

/// Outcome of one checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    Pass,
    Fail,
    NotApplicable,
    Unknown,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "Pass",
            CheckStatus::Fail => "Fail",
            CheckStatus::NotApplicable => "NotApplicable",
            CheckStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub name: &'static str,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ChecklistItem {
    fn new(name: &'static str, status: CheckStatus) -> Self {
        Self {
            name,
            status,
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Result of a best-effort sub-request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Probe<T> {
    Found(T),
    /// The request was made and failed; holds the reason.
    Unavailable(String),
    NotRequested,
}

/// Everything the checklist is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ChecklistInputs<'a> {
    pub repo: &'a RepoMetadata,
    pub has_token: bool,
    /// Whether the owner turned out to be an organization, `None` if unknown.
    pub owner_is_org: Option<bool>,
    pub owner_profile: &'a Probe<Map<String, Value>>,
    pub branch_protected: &'a Probe<bool>,
    pub members_without_2fa: &'a Probe<usize>,
}

/// Evaluate all items, in their fixed order.
pub fn evaluate_checklist(inputs: &ChecklistInputs<'_>) -> Vec<ChecklistItem> {
    let security = inputs.repo.fields.security_and_analysis.as_ref();

    vec![
        two_factor_requirement(inputs),
        members_without_2fa(inputs),
        security_feature(inputs.has_token, SECRET_SCANNING, security, |s| {
            s.secret_scanning.as_ref()
        }),
        security_feature(inputs.has_token, DEPENDABOT_SECURITY_UPDATES, security, |s| {
            s.dependabot_security_updates.as_ref()
        }),
        branch_protection(inputs),
        public_visibility(inputs.repo),
        license_present(inputs.repo),
        not_archived(inputs.repo),
    ]
}

fn two_factor_requirement(inputs: &ChecklistInputs<'_>) -> ChecklistItem {
    let item = |status| ChecklistItem::new(TWO_FACTOR_REQUIREMENT, status);

    if !inputs.has_token {
        return item(CheckStatus::Unknown).with_detail(NO_TOKEN);
    }
    match inputs.owner_is_org {
        Some(false) => return item(CheckStatus::NotApplicable).with_detail("owner is a user"),
        None => return item(CheckStatus::Unknown).with_detail("owner type unknown"),
        Some(true) => {}
    }
    match inputs.owner_profile {
        Probe::Found(profile) => match profile
            .get("two_factor_requirement_enabled")
            .and_then(Value::as_bool)
        {
            Some(true) => item(CheckStatus::Pass),
            Some(false) => item(CheckStatus::Fail),
            None => item(CheckStatus::Unknown).with_detail("setting not visible"),
        },
        Probe::Unavailable(reason) => item(CheckStatus::Unknown).with_detail(reason.clone()),
        Probe::NotRequested => item(CheckStatus::Unknown),
    }
}

fn members_without_2fa(inputs: &ChecklistInputs<'_>) -> ChecklistItem {
    let item = |status| ChecklistItem::new(MEMBERS_WITHOUT_2FA, status);

    if !inputs.has_token {
        return item(CheckStatus::Unknown).with_detail(NO_TOKEN);
    }
    if inputs.owner_is_org == Some(false) {
        return item(CheckStatus::NotApplicable).with_detail("owner is a user");
    }
    match inputs.members_without_2fa {
        Probe::Found(0) => item(CheckStatus::Pass),
        Probe::Found(n) => item(CheckStatus::Fail).with_detail(format!("{} members without 2FA", n)),
        Probe::Unavailable(reason) => item(CheckStatus::Unknown).with_detail(reason.clone()),
        Probe::NotRequested => item(CheckStatus::Unknown),
    }
}

fn security_feature(
    has_token: bool,
    name: &'static str,
    security: Option<&SecurityAndAnalysis>,
    select: impl Fn(&SecurityAndAnalysis) -> Option<&FeatureStatus>,
) -> ChecklistItem {
    if !has_token {
        return ChecklistItem::new(name, CheckStatus::Unknown).with_detail(NO_TOKEN);
    }
    match security.and_then(select).and_then(FeatureStatus::enabled) {
        Some(true) => ChecklistItem::new(name, CheckStatus::Pass),
        Some(false) => ChecklistItem::new(name, CheckStatus::Fail),
        None => ChecklistItem::new(name, CheckStatus::Unknown).with_detail("setting not visible"),
    }
}

fn branch_protection(inputs: &ChecklistInputs<'_>) -> ChecklistItem {
    let item = |status| ChecklistItem::new(BRANCH_PROTECTION, status);

    if inputs.repo.fields.default_branch.is_none() {
        return item(CheckStatus::NotApplicable).with_detail("no default branch");
    }
    match inputs.branch_protected {
        Probe::Found(true) => item(CheckStatus::Pass),
        Probe::Found(false) => item(CheckStatus::Fail),
        Probe::Unavailable(reason) => item(CheckStatus::Unknown).with_detail(reason.clone()),
        Probe::NotRequested => item(CheckStatus::Unknown),
    }
}

fn public_visibility(repo: &RepoMetadata) -> ChecklistItem {
    let item = |status| ChecklistItem::new(PUBLIC_VISIBILITY, status);

    match (repo.fields.visibility.as_deref(), repo.fields.private) {
        (Some("public"), _) => item(CheckStatus::Pass),
        (Some(other), _) => item(CheckStatus::Fail).with_detail(other),
        (None, Some(false)) => item(CheckStatus::Pass),
        (None, Some(true)) => item(CheckStatus::Fail).with_detail("private"),
        (None, None) => item(CheckStatus::Unknown).with_detail("visibility missing"),
    }
}

fn license_present(repo: &RepoMetadata) -> ChecklistItem {
    match repo.fields.license.as_ref() {
        Some(license) => {
            let label = license
                .spdx_id
                .as_deref()
                .or(license.key.as_deref())
                .or(license.name.as_deref())
                .unwrap_or("declared");
            ChecklistItem::new(LICENSE_PRESENT, CheckStatus::Pass).with_detail(label)
        }
        None => ChecklistItem::new(LICENSE_PRESENT, CheckStatus::Fail),
    }
}

fn not_archived(repo: &RepoMetadata) -> ChecklistItem {
    if repo.fields.archived == Some(true) {
        ChecklistItem::new(NOT_ARCHIVED, CheckStatus::Fail).with_detail("archived")
    } else {
        ChecklistItem::new(NOT_ARCHIVED, CheckStatus::Pass)
    }
}
