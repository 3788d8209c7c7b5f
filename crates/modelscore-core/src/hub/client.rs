//! Hugging Face Hub REST client.

use super::types::{ModelRecord, OrgAssets, OrgRecord, OwnerOverview, UserRecord};
use super::ModelHub;
use crate::config::ScoreConfig;
use crate::network::HttpClient;
use crate::owner::OwnerKind;
use crate::{Result, ScoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Service label for errors and logs.
const SERVICE: &str = "huggingface";

/// Client for the Hugging Face Hub API.
pub struct HubClient {
    http: HttpClient,
}

impl HubClient {
    pub fn new(config: &ScoreConfig) -> Result<Self> {
        let http = HttpClient::new(
            SERVICE,
            &config.hub_api_base,
            config.hf_token.as_deref(),
            config,
        )?;
        Ok(Self { http })
    }

    /// Fetch a user's overview.
    pub async fn fetch_user(&self, username: &str) -> Result<UserRecord> {
        let overview = self.user_overview(username).await?;
        Ok(UserRecord {
            username: username.to_string(),
            overview,
        })
    }

    /// Fetch an organization's overview plus its asset counts.
    ///
    /// Only a failing overview fails the call; sub-request failures leave
    /// the corresponding count unset.
    pub async fn fetch_org(&self, org_name: &str) -> Result<OrgRecord> {
        let overview = self.org_overview(org_name).await?;
        let assets = self.fetch_org_assets(org_name).await;
        Ok(OrgRecord::new(org_name, overview, assets))
    }

    async fn user_overview(&self, username: &str) -> Result<Map<String, Value>> {
        self.http
            .get_json(
                &format!("api/users/{}/overview", urlencoding::encode(username)),
                &[],
            )
            .await
    }

    async fn org_overview(&self, org_name: &str) -> Result<Map<String, Value>> {
        self.http
            .get_json(
                &format!("api/organizations/{}/overview", urlencoding::encode(org_name)),
                &[],
            )
            .await
    }

    /// Item count across every page of a list endpoint.
    ///
    /// `None` when any page fails or the listing runs past the page cap, so
    /// a partial count is never reported as the total.
    async fn count_list(&self, what: &str, path: &str, query: &[(&str, &str)]) -> Option<usize> {
        match self.http.get_all_pages::<Value>(path, query).await {
            Ok(items) => Some(items.len()),
            Err(e) => {
                warn!("Could not fetch {} ({}): {}", what, path, e);
                None
            }
        }
    }
}

/// Hub ids keep their `/` separators; each segment is encoded on its own.
fn encode_hub_id(hub_id: &str) -> String {
    hub_id
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl ModelHub for HubClient {
    async fn fetch_model(&self, hub_id: &str) -> Result<ModelRecord> {
        let record: ModelRecord = self
            .http
            .get_json(
                &format!("api/models/{}", encode_hub_id(hub_id)),
                &[("securityStatus", "true")],
            )
            .await?;
        info!(
            "Retrieved model info: {}, SHA: {}",
            record.id.as_deref().unwrap_or(hub_id),
            record.sha.as_deref().unwrap_or("-")
        );
        Ok(record)
    }

    async fn resolve_owner(&self, name: &str) -> Result<OwnerOverview> {
        match self.user_overview(name).await {
            Ok(fields) => {
                return Ok(OwnerOverview {
                    name: name.to_string(),
                    endpoint: OwnerKind::User,
                    fields,
                })
            }
            Err(ScoreError::NotFound { .. }) => {
                debug!("{} is not a user, trying organizations", name);
            }
            Err(e) => return Err(e),
        }

        match self.org_overview(name).await {
            Ok(fields) => Ok(OwnerOverview {
                name: name.to_string(),
                endpoint: OwnerKind::Organization,
                fields,
            }),
            Err(ScoreError::NotFound { .. }) => Err(ScoreError::NotFound {
                service: SERVICE.to_string(),
                resource: format!("owner {}", name),
            }),
            Err(e) => Err(e),
        }
    }

    async fn fetch_org_assets(&self, org_name: &str) -> OrgAssets {
        let org = urlencoding::encode(org_name).into_owned();
        let author = [("author", org_name)];

        let assets = OrgAssets {
            members_count: self
                .count_list("members", &format!("api/organizations/{}/members", org), &[])
                .await,
            models_count: self.count_list("models", "api/models", &author).await,
            datasets_count: self.count_list("datasets", "api/datasets", &author).await,
            spaces_count: self.count_list("spaces", "api/spaces", &author).await,
        };

        if assets.is_partial() {
            warn!("Organization {} record is incomplete", org_name);
        }
        assets
    }
}
