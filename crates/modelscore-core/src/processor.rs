//! Per-entry orchestration: one input pair in, its report tabs out.

use crate::github::RepoHost;
use crate::hub::{ModelHub, OrgRecord};
use crate::input::ModelEntry;
use crate::owner::{classify, ClassifiedOwner};
use crate::report::{ReportTab, TabCategory};
use crate::ScoreError;
use tracing::{error, info, warn};

/// Turns model list entries into report tabs using the two remote clients.
pub struct RecordProcessor<'a> {
    hub: &'a dyn ModelHub,
    repos: &'a dyn RepoHost,
}

impl<'a> RecordProcessor<'a> {
    pub fn new(hub: &'a dyn ModelHub, repos: &'a dyn RepoHost) -> Self {
        Self { hub, repos }
    }

    /// Produce the tabs for one entry, in HF-model, HF-user/HF-org, GH-repo
    /// order. A failing category is logged and omitted; this never fails.
    pub async fn process(&self, entry: &ModelEntry, row_index: usize) -> Vec<ReportTab> {
        info!(
            "Processing #{} {} / {}",
            row_index, entry.hub_id, entry.repository_id
        );
        let mut tabs = Vec::with_capacity(3);

        match self.hub.fetch_model(&entry.hub_id).await {
            Ok(model) => tabs.push(ReportTab::new(
                row_index,
                TabCategory::HfModel,
                model.to_table(),
            )),
            Err(e) => log_omitted(entry, TabCategory::HfModel, &e),
        }

        if let Some(tab) = self.owner_tab(entry, row_index).await {
            tabs.push(tab);
        }

        if let Some(tab) = self.repo_tab(entry, row_index).await {
            tabs.push(tab);
        }

        tabs
    }

    async fn owner_tab(&self, entry: &ModelEntry, row_index: usize) -> Option<ReportTab> {
        let owner = entry.owner();
        let classified = match classify(self.hub, owner).await {
            Ok(classified) => classified,
            Err(e) => {
                warn!(
                    "Could not classify owner {} of {}: {}",
                    owner, entry.hub_id, e
                );
                return None;
            }
        };

        Some(match classified {
            ClassifiedOwner::User(record) => {
                ReportTab::new(row_index, TabCategory::HfUser, record.to_table())
            }
            ClassifiedOwner::Organization { name, overview } => {
                let assets = self.hub.fetch_org_assets(&name).await;
                let record = OrgRecord::new(name, overview, assets);
                ReportTab::new(row_index, TabCategory::HfOrg, record.to_table())
            }
        })
    }

    async fn repo_tab(&self, entry: &ModelEntry, row_index: usize) -> Option<ReportTab> {
        let (owner, name) = match entry.repository() {
            Ok(parts) => parts,
            Err(e) => {
                log_omitted(entry, TabCategory::GhRepo, &e);
                return None;
            }
        };

        let repo = match self.repos.fetch_repo(owner, name).await {
            Ok(repo) => repo,
            Err(e) => {
                log_omitted(entry, TabCategory::GhRepo, &e);
                return None;
            }
        };

        let record = self.repos.fetch_security_checklist(&repo).await;
        Some(ReportTab::new(
            row_index,
            TabCategory::GhRepo,
            record.to_table(),
        ))
    }
}

fn log_omitted(entry: &ModelEntry, category: TabCategory, err: &ScoreError) {
    match err {
        ScoreError::MalformedInput { .. } => {
            error!("Omitting {} tab for {}: {}", category, entry.hub_id, err)
        }
        _ => warn!(
            "Omitting {} tab for {} ({:?}): {}",
            category,
            entry.hub_id,
            err.kind(),
            err
        ),
    }
}
