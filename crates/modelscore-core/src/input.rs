//! Model list parsing.
//!
//! One `hub_id, owner/repo` pair per line. Blank lines and lines starting
//! with `#` are ignored.

use crate::{Result, ScoreError};
use std::path::Path;
use tracing::error;

/// One (model, repository) pair from the model list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub hub_id: String,
    pub repository_id: String,
    /// 1-based physical line in the input file.
    pub line_number: usize,
}

impl ModelEntry {
    /// Namespace of the hub id: the text before the first `/`.
    pub fn owner(&self) -> &str {
        self.hub_id
            .split_once('/')
            .map(|(owner, _)| owner)
            .unwrap_or(self.hub_id.as_str())
    }

    /// Split the repository id into `(owner, repo)`.
    pub fn repository(&self) -> Result<(&str, &str)> {
        parse_repository_id(&self.repository_id).ok_or_else(|| ScoreError::MalformedInput {
            line: self.line_number,
            message: format!(
                "repository id '{}' is not of the form owner/repo",
                self.repository_id
            ),
        })
    }
}

/// Parse `owner/repo`; both parts must be non-empty after trimming.
pub fn parse_repository_id(id: &str) -> Option<(&str, &str)> {
    let (owner, repo) = id.split_once('/')?;
    let (owner, repo) = (owner.trim(), repo.trim());
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner, repo))
}

/// Parsed model list.
#[derive(Debug, Default)]
pub struct ModelList {
    pub entries: Vec<ModelEntry>,
    /// Lines that could not be parsed.
    pub malformed: Vec<ScoreError>,
}

impl ModelList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse model list text. Malformed lines are logged and collected, never fatal.
pub fn parse_model_list(content: &str) -> ModelList {
    let mut list = ModelList::default();

    for (idx, raw) in content.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [hub_id, repository_id] if !hub_id.is_empty() && !repository_id.is_empty() => {
                list.entries.push(ModelEntry {
                    hub_id: hub_id.to_string(),
                    repository_id: repository_id.to_string(),
                    line_number,
                });
            }
            _ => {
                let err = ScoreError::MalformedInput {
                    line: line_number,
                    message: format!("expected 'hub_id, owner/repo', got '{}'", line),
                };
                error!("Skipping line: {}", err);
                list.malformed.push(err);
            }
        }
    }

    list
}

/// Read and parse the model list at `path`.
pub fn read_model_list(path: &Path) -> Result<ModelList> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ScoreError::io_with_path(e, path))?;
    Ok(parse_model_list(&content))
}
