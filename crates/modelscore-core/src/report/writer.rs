//! Workbook serialization.

use super::tab::{Cell, ReportTab, Table};
use crate::Result;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Longest worksheet name spreadsheet applications accept.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Longest string a single cell can hold.
const MAX_CELL_CHARS: usize = 32_767;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['/', '\\', '?', '*', '[', ']', ':'];

/// Make `name` acceptable as a worksheet name.
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches('\'');
    let truncated: String = trimmed.chars().take(MAX_SHEET_NAME_LEN).collect();
    if truncated.is_empty() {
        "Sheet".to_string()
    } else {
        truncated
    }
}

/// Hands out sanitized names, suffixing `_1`, `_2`, ... on collisions.
/// Names compare case-insensitively, like spreadsheet applications do.
#[derive(Debug, Default)]
pub struct SheetNamer {
    used: HashSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, name: &str) -> String {
        let base = sanitize_sheet_name(name);
        if self.used.insert(base.to_lowercase()) {
            return base;
        }

        let mut n = 1usize;
        loop {
            let suffix = format!("_{}", n);
            let keep = MAX_SHEET_NAME_LEN - suffix.len();
            let candidate: String = base.chars().take(keep).chain(suffix.chars()).collect();
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Write every tab as one worksheet, in order, to `path`.
pub fn write_workbook(tabs: &[ReportTab], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let mut namer = SheetNamer::new();

    for tab in tabs {
        let name = namer.claim(&tab.name());
        let sheet = workbook.add_worksheet();
        sheet.set_name(&name)?;
        write_table(sheet, &tab.table)?;
        debug!("Wrote sheet {} ({} rows)", name, tab.table.row_count());
    }

    if tabs.is_empty() {
        workbook.add_worksheet().set_name("Sheet")?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_table(sheet: &mut Worksheet, table: &Table) -> Result<()> {
    match table {
        Table::Pairs { headers, rows } => {
            write_text(sheet, 0, 0, headers[0])?;
            write_text(sheet, 0, 1, headers[1])?;
            for (i, (label, value)) in rows.iter().enumerate() {
                let row = i as u32 + 1;
                write_text(sheet, row, 0, label)?;
                write_cell(sheet, row, 1, value)?;
            }
        }
        Table::Matrix { headers, rows } => {
            for (col, header) in headers.iter().enumerate() {
                write_text(sheet, 0, col as u16, header)?;
            }
            for (i, cells) in rows.iter().enumerate() {
                let row = i as u32 + 1;
                for (col, value) in cells.iter().enumerate() {
                    write_cell(sheet, row, col as u16, value)?;
                }
            }
        }
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Empty => {}
        Cell::Text(text) => write_text(sheet, row, col, text)?,
        Cell::Number(n) => {
            sheet.write_number(row, col, *n)?;
        }
        Cell::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}

fn write_text(sheet: &mut Worksheet, row: u32, col: u16, text: &str) -> Result<()> {
    if text.chars().count() > MAX_CELL_CHARS {
        let clipped: String = text.chars().take(MAX_CELL_CHARS).collect();
        sheet.write_string(row, col, &clipped)?;
    } else {
        sheet.write_string(row, col, text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::TabCategory;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("1-HF-model"), "1-HF-model");
        assert_eq!(sanitize_sheet_name("a/b\\c?d*e[f]g:h"), "a_b_c_d_e_f_g_h");
        assert_eq!(sanitize_sheet_name(""), "Sheet");
        assert_eq!(sanitize_sheet_name("''"), "Sheet");

        let long = "x".repeat(40);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), 31);
    }

    #[test]
    fn test_namer_suffixes_duplicates() {
        let mut namer = SheetNamer::new();
        assert_eq!(namer.claim("1-HF-model"), "1-HF-model");
        assert_eq!(namer.claim("1-hf-MODEL"), "1-hf-MODEL_1");
        assert_eq!(namer.claim("1-HF-model"), "1-HF-model_2");

        let long = "y".repeat(35);
        let first = namer.claim(&long);
        let second = namer.claim(&long);
        assert_eq!(first.chars().count(), 31);
        assert_eq!(second.chars().count(), 31);
        assert!(second.ends_with("_1"));
    }

    #[test]
    fn test_write_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        let tabs = vec![
            ReportTab::new(
                1,
                TabCategory::HfModel,
                Table::Pairs {
                    headers: ["Key", "Value"],
                    rows: vec![
                        ("id".into(), Cell::text("alice/model-x")),
                        ("downloads".into(), Cell::Number(5.0)),
                        ("private".into(), Cell::Bool(false)),
                        ("sha".into(), Cell::Empty),
                        ("card".into(), Cell::text("z".repeat(40_000))),
                    ],
                },
            ),
            ReportTab::new(
                1,
                TabCategory::HfOrg,
                Table::Matrix {
                    headers: vec!["org_name".into(), "models_count".into()],
                    rows: vec![vec![Cell::text("acme"), Cell::Empty]],
                },
            ),
        ];

        write_workbook(&tabs, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_write_empty_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.xlsx");
        write_workbook(&[], &path).unwrap();
        assert!(path.exists());
    }
}
