//! GitHub REST client.

use super::checklist::{evaluate_checklist, ChecklistInputs, Probe};
use super::types::{ReleaseSummary, RepoMetadata, RepoSecurityRecord};
use super::RepoHost;
use crate::config::{NetworkConfig, ScoreConfig};
use crate::network::HttpClient;
use crate::{Result, ScoreError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const SERVICE: &str = "github";

#[derive(Debug, Deserialize)]
struct TopicsResponse {
    #[serde(default)]
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseEntry {
    #[serde(default)]
    tag_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    #[serde(default)]
    protected: bool,
}

/// Client for the GitHub REST API.
pub struct GitHubClient {
    http: HttpClient,
}

impl GitHubClient {
    pub fn new(config: &ScoreConfig) -> Result<Self> {
        let http = HttpClient::new(
            SERVICE,
            &config.github_api_base,
            config.github_token.as_deref(),
            config,
        )?
        .with_accept(NetworkConfig::GITHUB_ACCEPT);
        Ok(Self { http })
    }

    pub fn has_token(&self) -> bool {
        self.http.has_token()
    }

    /// Fetch the owner's profile from the org or user endpoint.
    ///
    /// Returns the profile probe and whether the owner is an organization.
    /// When the repository does not say, the org endpoint is tried first.
    async fn fetch_owner_profile(
        &self,
        login: &str,
        owner_is_org: Option<bool>,
    ) -> (Probe<Map<String, Value>>, Option<bool>) {
        let login_enc = urlencoding::encode(login);
        let org_path = format!("orgs/{}", login_enc);
        let user_path = format!("users/{}", login_enc);

        let result: Result<(Map<String, Value>, bool)> = match owner_is_org {
            Some(true) => self.http.get_json(&org_path, &[]).await.map(|p| (p, true)),
            Some(false) => self.http.get_json(&user_path, &[]).await.map(|p| (p, false)),
            None => match self.http.get_json(&org_path, &[]).await {
                Ok(profile) => Ok((profile, true)),
                Err(ScoreError::NotFound { .. }) => {
                    debug!("{} is not an organization, trying users", login);
                    self.http.get_json(&user_path, &[]).await.map(|p| (p, false))
                }
                Err(e) => Err(e),
            },
        };

        match result {
            Ok((profile, is_org)) => (Probe::Found(profile), Some(is_org)),
            Err(e) => {
                warn!("Could not fetch owner profile for {}: {}", login, e);
                (Probe::Unavailable(e.to_string()), owner_is_org)
            }
        }
    }

    async fn fetch_topics(&self, base: &str) -> Option<Vec<String>> {
        optional(
            "topics",
            self.http
                .get_json::<TopicsResponse>(&format!("{}/topics", base), &[])
                .await
                .map(|r| r.names),
        )
    }

    async fn fetch_languages(&self, base: &str) -> Option<Vec<String>> {
        optional(
            "languages",
            self.http
                .get_json::<Map<String, Value>>(&format!("{}/languages", base), &[])
                .await
                .map(|langs| langs.keys().cloned().collect()),
        )
    }

    async fn fetch_releases(&self, base: &str) -> Option<ReleaseSummary> {
        optional(
            "releases",
            self.http
                .get_all_pages::<ReleaseEntry>(
                    &format!("{}/releases", base),
                    &[("per_page", NetworkConfig::GITHUB_PER_PAGE)],
                )
                .await
                .map(|releases| ReleaseSummary {
                    latest_tag: releases.first().and_then(|r| r.tag_name.clone()),
                    count: releases.len(),
                }),
        )
    }

    async fn fetch_branch_protection(&self, base: &str, branch: Option<&str>) -> Probe<bool> {
        let Some(branch) = branch else {
            return Probe::NotRequested;
        };
        let path = format!("{}/branches/{}", base, urlencoding::encode(branch));
        match self.http.get_json::<BranchResponse>(&path, &[]).await {
            Ok(b) => Probe::Found(b.protected),
            Err(e) => {
                warn!("Could not fetch branch {}: {}", branch, e);
                Probe::Unavailable(e.to_string())
            }
        }
    }

    async fn fetch_members_without_2fa(&self, login: &str, owner_is_org: Option<bool>) -> Probe<usize> {
        if !self.has_token() || owner_is_org != Some(true) {
            return Probe::NotRequested;
        }
        let path = format!("orgs/{}/members", urlencoding::encode(login));
        match self
            .http
            .get_all_pages::<Value>(
                &path,
                &[
                    ("filter", "2fa_disabled"),
                    ("per_page", NetworkConfig::GITHUB_PER_PAGE),
                ],
            )
            .await
        {
            Ok(members) => Probe::Found(members.len()),
            Err(e) => {
                warn!("Could not list members without 2FA for {}: {}", login, e);
                Probe::Unavailable(e.to_string())
            }
        }
    }
}

fn optional<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Could not fetch {}: {}", what, e);
            None
        }
    }
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn fetch_repo(&self, owner: &str, repo: &str) -> Result<RepoMetadata> {
        let raw: Value = self
            .http
            .get_json(
                &format!(
                    "repos/{}/{}",
                    urlencoding::encode(owner),
                    urlencoding::encode(repo)
                ),
                &[],
            )
            .await?;
        let metadata = RepoMetadata::from_value(raw)?;
        info!(
            "Retrieved repository {}/{}",
            metadata.owner_login(),
            metadata.name()
        );
        Ok(metadata)
    }

    async fn fetch_security_checklist(&self, repo: &RepoMetadata) -> RepoSecurityRecord {
        let login = repo.owner_login();
        let base = format!(
            "repos/{}/{}",
            urlencoding::encode(login),
            urlencoding::encode(repo.name())
        );

        let (owner_profile, owner_is_org) =
            self.fetch_owner_profile(login, repo.owner_is_org()).await;
        let topics = self.fetch_topics(&base).await;
        let languages = self.fetch_languages(&base).await;
        let releases = self.fetch_releases(&base).await;
        let branch_protected = self
            .fetch_branch_protection(&base, repo.fields.default_branch.as_deref())
            .await;
        let members_without_2fa = self.fetch_members_without_2fa(login, owner_is_org).await;

        let checklist = evaluate_checklist(&ChecklistInputs {
            repo,
            has_token: self.has_token(),
            owner_is_org,
            owner_profile: &owner_profile,
            branch_protected: &branch_protected,
            members_without_2fa: &members_without_2fa,
        });

        RepoSecurityRecord {
            repo: repo.clone(),
            owner_profile,
            topics,
            languages,
            releases,
            checklist,
        }
    }
}
