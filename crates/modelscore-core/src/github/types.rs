//! GitHub repository metadata and the security record built from it.

use super::checklist::{ChecklistItem, Probe};
use crate::report::{flatten_json, Cell, Table};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Owner block of a repository response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    /// `"User"` or `"Organization"`
    #[serde(default, rename = "type")]
    pub owner_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoLicense {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub spdx_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `{"status": "enabled" | "disabled"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStatus {
    #[serde(default)]
    pub status: Option<String>,
}

impl FeatureStatus {
    /// `Some(true)` for enabled, `Some(false)` for disabled.
    pub fn enabled(&self) -> Option<bool> {
        match self.status.as_deref() {
            Some("enabled") => Some(true),
            Some("disabled") => Some(false),
            _ => None,
        }
    }
}

/// Security settings; only visible to tokens with admin access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityAndAnalysis {
    #[serde(default)]
    pub secret_scanning: Option<FeatureStatus>,
    #[serde(default)]
    pub dependabot_security_updates: Option<FeatureStatus>,
}

/// Typed subset of `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoFields {
    pub name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub private: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub license: Option<RepoLicense>,
    #[serde(default)]
    pub security_and_analysis: Option<SecurityAndAnalysis>,
}

/// Repository metadata: the typed fields plus the full response.
#[derive(Debug, Clone, Serialize)]
pub struct RepoMetadata {
    #[serde(skip)]
    pub fields: RepoFields,
    pub raw: Value,
}

impl RepoMetadata {
    pub fn from_value(raw: Value) -> Result<Self> {
        let fields: RepoFields = serde_json::from_value(raw.clone())?;
        Ok(Self { fields, raw })
    }

    pub fn owner_login(&self) -> &str {
        &self.fields.owner.login
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    /// `Some(true)` for organization-owned repositories, `None` when the
    /// response omits the owner type.
    pub fn owner_is_org(&self) -> Option<bool> {
        self.fields
            .owner
            .owner_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("organization"))
    }
}

/// Latest tag and number of releases on the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseSummary {
    pub latest_tag: Option<String>,
    pub count: usize,
}

/// Everything gathered about one repository's security posture.
#[derive(Debug, Clone, Serialize)]
pub struct RepoSecurityRecord {
    pub repo: RepoMetadata,
    pub owner_profile: Probe<Map<String, Value>>,
    pub topics: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub releases: Option<ReleaseSummary>,
    pub checklist: Vec<ChecklistItem>,
}

const SCOPE_REPOSITORY: &str = "Repository";
const SCOPE_OWNER: &str = "Owner/Org";
const SCOPE_CHECKLIST: &str = "Checklist";

impl RepoSecurityRecord {
    /// Checklist item by name.
    pub fn check(&self, name: &str) -> Option<&ChecklistItem> {
        self.checklist.iter().find(|item| item.name == name)
    }

    /// Scope/Key/Value layout with nested JSON flattened.
    pub fn to_table(&self) -> Table {
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        let mut push = |scope: &str, key: String, value: Cell| {
            rows.push(vec![Cell::text(scope), Cell::Text(key), value]);
        };

        for (key, value) in flatten_json("", &self.repo.raw) {
            push(SCOPE_REPOSITORY, key, value);
        }
        push(
            SCOPE_REPOSITORY,
            "topics".into(),
            self.topics
                .as_ref()
                .map(|t| Cell::text(t.join(", ")))
                .unwrap_or(Cell::Empty),
        );
        push(
            SCOPE_REPOSITORY,
            "languages".into(),
            self.languages
                .as_ref()
                .map(|l| Cell::text(l.join(", ")))
                .unwrap_or(Cell::Empty),
        );
        push(
            SCOPE_REPOSITORY,
            "releases.latest_tag".into(),
            self.releases
                .as_ref()
                .and_then(|r| r.latest_tag.as_deref())
                .into(),
        );
        push(
            SCOPE_REPOSITORY,
            "releases.count".into(),
            self.releases.as_ref().map(|r| r.count).into(),
        );

        match &self.owner_profile {
            Probe::Found(profile) => {
                for (key, value) in flatten_json("", &Value::Object(profile.clone())) {
                    push(SCOPE_OWNER, key, value);
                }
            }
            Probe::Unavailable(reason) => push(SCOPE_OWNER, "fetch_error".into(), Cell::text(reason)),
            Probe::NotRequested => {}
        }

        for item in &self.checklist {
            push(SCOPE_CHECKLIST, item.name.to_string(), Cell::text(item.status.as_str()));
            if let Some(detail) = &item.detail {
                push(SCOPE_CHECKLIST, format!("{}.detail", item.name), Cell::text(detail));
            }
        }

        Table::Matrix {
            headers: vec!["Scope".into(), "Key".into(), "Value".into()],
            rows,
        }
    }
}
