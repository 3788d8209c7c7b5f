//! Hugging Face Hub record types and their report layouts.

use crate::owner::OwnerKind;
use crate::report::{Cell, Table};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model metadata from `GET /api/models/{id}?securityStatus=true`.
///
/// Every field is optional: the hub omits fields for gated, disabled or
/// private repositories. Fields not modelled here land in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
    /// Note: the hub returns this key in snake_case
    #[serde(default, rename = "pipeline_tag")]
    pub pipeline_tag: Option<String>,
    #[serde(default, rename = "library_name")]
    pub library_name: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub downloads: Option<u64>,
    #[serde(default)]
    pub likes: Option<u64>,
    /// `false`, `"auto"` or `"manual"`
    #[serde(default)]
    pub gated: Option<Value>,
    #[serde(default)]
    pub private: Option<bool>,
    #[serde(default)]
    pub disabled: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    /// Malware/pickle scan summary, only present with `securityStatus=true`
    #[serde(default)]
    pub security_repo_status: Option<Value>,
    #[serde(default)]
    pub siblings: Option<Vec<HubSibling>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// File entry listed in a model's `siblings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSibling {
    pub rfilename: String,
}

impl ModelRecord {
    /// Key/Value layout: modelled fields first, then everything else the hub sent.
    pub fn to_table(&self) -> Table {
        let mut rows: Vec<(String, Cell)> = vec![
            ("id".into(), self.id.as_deref().into()),
            ("modelId".into(), self.model_id.as_deref().into()),
            ("author".into(), self.author.as_deref().into()),
            ("sha".into(), self.sha.as_deref().into()),
            ("pipeline_tag".into(), self.pipeline_tag.as_deref().into()),
            ("library_name".into(), self.library_name.as_deref().into()),
            (
                "tags".into(),
                self.tags
                    .as_ref()
                    .map(|tags| Cell::text(tags.join(", ")))
                    .unwrap_or(Cell::Empty),
            ),
            ("downloads".into(), self.downloads.into()),
            ("likes".into(), self.likes.into()),
            (
                "gated".into(),
                self.gated.as_ref().map(Cell::from).unwrap_or(Cell::Empty),
            ),
            ("private".into(), self.private.into()),
            ("disabled".into(), self.disabled.into()),
            ("createdAt".into(), self.created_at.as_deref().into()),
            ("lastModified".into(), self.last_modified.as_deref().into()),
            (
                "securityRepoStatus".into(),
                self.security_repo_status
                    .as_ref()
                    .map(Cell::from)
                    .unwrap_or(Cell::Empty),
            ),
            (
                "siblings_count".into(),
                self.siblings.as_ref().map(Vec::len).into(),
            ),
        ];

        rows.extend(
            self.extra
                .iter()
                .map(|(key, value)| (key.clone(), Cell::from(value))),
        );

        Table::Pairs {
            headers: ["Key", "Value"],
            rows,
        }
    }
}

/// Owner overview as answered by the user or organization endpoint.
#[derive(Debug, Clone)]
pub struct OwnerOverview {
    pub name: String,
    /// Which endpoint answered the lookup.
    pub endpoint: OwnerKind,
    pub fields: Map<String, Value>,
}

impl OwnerOverview {
    /// The response's `type` discriminator, if present.
    pub fn type_tag(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }
}

/// A user's profile overview.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub username: String,
    pub overview: Map<String, Value>,
}

impl UserRecord {
    /// Label/Value layout led by a `User Name` row.
    pub fn to_table(&self) -> Table {
        let mut rows = vec![("User Name".to_string(), Cell::text(&self.username))];
        rows.extend(
            self.overview
                .iter()
                .map(|(key, value)| (key.clone(), Cell::from(value))),
        );
        Table::Pairs {
            headers: ["Label", "Value"],
            rows,
        }
    }
}

/// Counts gathered from an organization's sub-resources.
///
/// `None` marks a sub-request that failed, `Some(0)` a resource that is
/// legitimately empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrgAssets {
    pub members_count: Option<usize>,
    pub models_count: Option<usize>,
    pub datasets_count: Option<usize>,
    pub spaces_count: Option<usize>,
}

impl OrgAssets {
    /// Whether any sub-request failed.
    pub fn is_partial(&self) -> bool {
        self.members_count.is_none()
            || self.models_count.is_none()
            || self.datasets_count.is_none()
            || self.spaces_count.is_none()
    }
}

/// An organization's overview plus asset counts.
#[derive(Debug, Clone, Serialize)]
pub struct OrgRecord {
    pub org_name: String,
    pub overview: Map<String, Value>,
    #[serde(flatten)]
    pub assets: OrgAssets,
}

impl OrgRecord {
    pub fn new(org_name: impl Into<String>, overview: Map<String, Value>, assets: OrgAssets) -> Self {
        Self {
            org_name: org_name.into(),
            overview,
            assets,
        }
    }

    /// Single wide row: `org_name`, `overview_*` columns, then the counts.
    pub fn to_table(&self) -> Table {
        let mut headers = vec!["org_name".to_string()];
        let mut row = vec![Cell::text(&self.org_name)];

        for (key, value) in &self.overview {
            headers.push(format!("overview_{}", key));
            row.push(Cell::from(value));
        }

        for (name, count) in [
            ("members_count", self.assets.members_count),
            ("models_count", self.assets.models_count),
            ("datasets_count", self.assets.datasets_count),
            ("spaces_count", self.assets.spaces_count),
        ] {
            headers.push(name.to_string());
            row.push(count.into());
        }

        Table::Matrix {
            headers,
            rows: vec![row],
        }
    }
}
