//! Report assembly and workbook output.

mod tab;
mod writer;

pub use tab::{flatten_json, Cell, ReportTab, TabCategory, Table};
pub use writer::{sanitize_sheet_name, write_workbook, SheetNamer};

use crate::config::ReportConfig;
use crate::{Result, ScoreError};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::info;

/// Ordered collection of tabs destined for one workbook.
///
/// The file name is fixed at creation. [`Report::finalize`] consumes the
/// report, so it can only be written once.
#[derive(Debug)]
pub struct Report {
    file_name: String,
    tabs: Vec<ReportTab>,
}

impl Report {
    /// New report stamped with the current local time.
    pub fn new(base_name: &str) -> Self {
        Self::with_timestamp(base_name, Local::now().naive_local())
    }

    pub fn with_timestamp(base_name: &str, at: NaiveDateTime) -> Self {
        let file_name = format!(
            "{}-{}.{}",
            base_name,
            at.format(ReportConfig::TIMESTAMP_FORMAT),
            ReportConfig::FILE_EXTENSION
        );
        Self {
            file_name,
            tabs: Vec::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn add_tab(&mut self, tab: ReportTab) {
        self.tabs.push(tab);
    }

    pub fn add_tabs(&mut self, tabs: impl IntoIterator<Item = ReportTab>) {
        self.tabs.extend(tabs);
    }

    pub fn tabs(&self) -> &[ReportTab] {
        &self.tabs
    }

    pub fn tab_names(&self) -> Vec<String> {
        self.tabs.iter().map(ReportTab::name).collect()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Write the workbook into `output_dir`, creating it if needed.
    pub fn finalize(self, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)
            .map_err(|e| ScoreError::io_with_path(e, output_dir))?;

        let path = output_dir.join(&self.file_name);
        write_workbook(&self.tabs, &path).map_err(|e| match e {
            ScoreError::Report { message, source } => ScoreError::Report {
                message: format!("{}: {}", path.display(), message),
                source,
            },
            other => other,
        })?;

        info!("Saved report with {} tabs to {}", self.tabs.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    fn pairs_tab(row: usize, category: TabCategory) -> ReportTab {
        ReportTab::new(
            row,
            category,
            Table::Pairs {
                headers: ["Key", "Value"],
                rows: vec![("id".into(), Cell::text("x"))],
            },
        )
    }

    #[test]
    fn test_file_name_uses_timestamp() {
        let report = Report::with_timestamp("modelscore", at());
        assert_eq!(report.file_name(), "modelscore-20240309_140507.xlsx");
    }

    #[test]
    fn test_tabs_keep_insertion_order() {
        let mut report = Report::with_timestamp("r", at());
        report.add_tab(pairs_tab(2, TabCategory::GhRepo));
        report.add_tabs(vec![
            pairs_tab(1, TabCategory::HfModel),
            pairs_tab(1, TabCategory::HfUser),
        ]);
        assert_eq!(report.tab_names(), vec!["2-GH-repo", "1-HF-model", "1-HF-user"]);
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn test_finalize_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("nested").join("scores");

        let mut report = Report::with_timestamp("modelscore", at());
        report.add_tab(pairs_tab(1, TabCategory::HfModel));
        let path = report.finalize(&output).unwrap();

        assert_eq!(path, output.join("modelscore-20240309_140507.xlsx"));
        assert!(path.exists());
    }
}
