//! Batch driver: model list in, one workbook out.

use crate::config::ScoreConfig;
use crate::github::{GitHubClient, RepoHost};
use crate::hub::{HubClient, ModelHub};
use crate::input::{read_model_list, ModelList};
use crate::processor::RecordProcessor;
use crate::report::{Report, TabCategory};
use crate::{Result, ScoreError};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Outcome counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Well-formed entries processed.
    pub entries: usize,
    /// Entries that produced at least one tab.
    pub succeeded: usize,
    /// Entries with no tab at all, plus malformed lines.
    pub failed: usize,
    /// Entries without their HF-model tab.
    pub incomplete: usize,
    /// Lines rejected by the parser.
    pub malformed: usize,
    pub tabs_written: usize,
    pub report_path: Option<PathBuf>,
}

impl RunSummary {
    /// `0` when every entry got its model tab and no line was malformed.
    pub fn exit_code(&self) -> i32 {
        if self.incomplete == 0 && self.malformed == 0 {
            0
        } else {
            1
        }
    }

    pub fn log(&self) {
        info!(
            "Run finished: {} entries, {} succeeded, {} failed, {} incomplete, {} malformed lines",
            self.entries, self.succeeded, self.failed, self.incomplete, self.malformed
        );
        if let Some(path) = &self.report_path {
            info!("Report: {}", path.display());
        }
    }
}

/// Process every entry in order, appending tabs to `report`.
///
/// Row indices are 1-based positions among the well-formed entries.
pub async fn run_batch(
    list: &ModelList,
    processor: &RecordProcessor<'_>,
    report: &mut Report,
) -> RunSummary {
    let mut summary = RunSummary {
        entries: list.entries.len(),
        malformed: list.malformed.len(),
        failed: list.malformed.len(),
        ..Default::default()
    };

    for (i, entry) in list.entries.iter().enumerate() {
        let tabs = processor.process(entry, i + 1).await;

        if !tabs.iter().any(|t| t.category == TabCategory::HfModel) {
            summary.incomplete += 1;
        }
        if tabs.is_empty() {
            warn!(
                "No data collected for {} (line {})",
                entry.hub_id, entry.line_number
            );
            summary.failed += 1;
        } else {
            summary.succeeded += 1;
        }

        summary.tabs_written += tabs.len();
        report.add_tabs(tabs);
    }

    summary
}

/// Read the model list, process it and write the report.
///
/// Fails only when the input cannot be read, holds no entries, or the
/// workbook cannot be written.
pub async fn run(
    config: &ScoreConfig,
    hub: &dyn ModelHub,
    repos: &dyn RepoHost,
) -> Result<RunSummary> {
    let list = read_model_list(&config.model_list_path)?;
    if list.is_empty() {
        return Err(ScoreError::EmptyInput {
            path: config.model_list_path.clone(),
        });
    }
    info!(
        "Found {} models to process in {}",
        list.entries.len(),
        config.model_list_path.display()
    );

    let processor = RecordProcessor::new(hub, repos);
    let mut report = Report::new(&config.report_base_name);
    let mut summary = run_batch(&list, &processor, &mut report).await;

    summary.report_path = Some(report.finalize(&config.output_dir)?);
    summary.log();
    Ok(summary)
}

/// [`run`] against the live Hugging Face and GitHub APIs.
pub async fn run_with_config(config: &ScoreConfig) -> Result<RunSummary> {
    if !config.has_github_token() {
        warn!("No GitHub token configured; token-gated checks will be Unknown");
    }
    let hub = HubClient::new(config)?;
    let repos = GitHubClient::new(config)?;
    run(config, &hub, &repos).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{Probe, RepoMetadata, RepoSecurityRecord};
    use crate::hub::{ModelRecord, OrgAssets, OwnerOverview};
    use crate::input::parse_model_list;
    use crate::owner::OwnerKind;
    use async_trait::async_trait;
    use serde_json::{json, Map};

    /// Every model exists except those named `missing`.
    struct Hub;

    #[async_trait]
    impl ModelHub for Hub {
        async fn fetch_model(&self, hub_id: &str) -> Result<ModelRecord> {
            if hub_id.contains("/missing") {
                return Err(ScoreError::NotFound {
                    service: "huggingface".into(),
                    resource: hub_id.into(),
                });
            }
            Ok(ModelRecord {
                id: Some(hub_id.into()),
                ..Default::default()
            })
        }

        async fn resolve_owner(&self, name: &str) -> Result<OwnerOverview> {
            if name == "nobody" {
                return Err(ScoreError::NotFound {
                    service: "huggingface".into(),
                    resource: format!("owner {}", name),
                });
            }
            Ok(OwnerOverview {
                name: name.into(),
                endpoint: OwnerKind::User,
                fields: Map::new(),
            })
        }

        async fn fetch_org_assets(&self, _org_name: &str) -> OrgAssets {
            OrgAssets::default()
        }
    }

    struct Repos;

    #[async_trait]
    impl RepoHost for Repos {
        async fn fetch_repo(&self, owner: &str, repo: &str) -> Result<RepoMetadata> {
            RepoMetadata::from_value(json!({"name": repo, "owner": {"login": owner}}))
        }

        async fn fetch_security_checklist(&self, repo: &RepoMetadata) -> RepoSecurityRecord {
            RepoSecurityRecord {
                repo: repo.clone(),
                owner_profile: Probe::NotRequested,
                topics: None,
                languages: None,
                releases: None,
                checklist: Vec::new(),
            }
        }
    }

    #[tokio::test]
    async fn test_run_batch_counts() {
        let list = parse_model_list(
            "# header\nalice/a, alice/a\nbroken line\nnobody/missing, bad-repo\nalice/missing, alice/b\n",
        );
        let processor = RecordProcessor::new(&Hub, &Repos);
        let mut report = Report::new("test");

        let summary = run_batch(&list, &processor, &mut report).await;

        assert_eq!(summary.entries, 3);
        assert_eq!(summary.malformed, 1);
        // one entry produced nothing, plus the malformed line
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.incomplete, 2);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(
            report.tab_names(),
            vec!["1-HF-model", "1-HF-user", "1-GH-repo", "3-HF-user", "3-GH-repo"]
        );
    }

    #[tokio::test]
    async fn test_clean_run_exit_code() {
        let list = parse_model_list("alice/a, alice/a\n");
        let processor = RecordProcessor::new(&Hub, &Repos);
        let mut report = Report::new("test");

        let summary = run_batch(&list, &processor, &mut report).await;
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.tabs_written, 3);
    }

    #[tokio::test]
    async fn test_run_rejects_empty_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("list.txt");
        std::fs::write(&input, "# nothing here\n\n").unwrap();
        let config = ScoreConfig::default()
            .with_model_list(&input)
            .with_output_dir(dir.path().join("out"));

        let err = run(&config, &Hub, &Repos).await.unwrap_err();
        assert!(matches!(err, ScoreError::EmptyInput { .. }));
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_run_writes_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("list.txt");
        std::fs::write(&input, "alice/a, alice/a\n").unwrap();
        let config = ScoreConfig::default()
            .with_model_list(&input)
            .with_output_dir(dir.path().join("out"))
            .with_report_base_name("scores");

        let summary = run(&config, &Hub, &Repos).await.unwrap();
        let path = summary.report_path.unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("scores-"));
    }
}
