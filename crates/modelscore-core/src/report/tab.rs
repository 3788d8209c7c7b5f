//! Report tab model: categories, tables and cell values.

use serde_json::Value;
use std::fmt;

/// Data category a tab belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TabCategory {
    HfModel,
    HfUser,
    HfOrg,
    GhRepo,
}

impl TabCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TabCategory::HfModel => "HF-model",
            TabCategory::HfUser => "HF-user",
            TabCategory::HfOrg => "HF-org",
            TabCategory::GhRepo => "GH-repo",
        }
    }
}

impl fmt::Display for TabCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Render for logs and tests.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&Value> for Cell {
    /// Scalars map to typed cells; arrays and objects become compact JSON text.
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(Cell::Number)
                .unwrap_or_else(|| Cell::Text(n.to_string())),
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<Option<usize>> for Cell {
    fn from(value: Option<usize>) -> Self {
        value.map(|n| Cell::Number(n as f64)).unwrap_or(Cell::Empty)
    }
}

impl From<Option<u64>> for Cell {
    fn from(value: Option<u64>) -> Self {
        value.map(|n| Cell::Number(n as f64)).unwrap_or(Cell::Empty)
    }
}

impl From<Option<bool>> for Cell {
    fn from(value: Option<bool>) -> Self {
        value.map(Cell::Bool).unwrap_or(Cell::Empty)
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map(Cell::text).unwrap_or(Cell::Empty)
    }
}

/// Tabular content of one tab.
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    /// Two columns: a label and its value.
    Pairs {
        headers: [&'static str; 2],
        rows: Vec<(String, Cell)>,
    },
    /// Arbitrary header row followed by data rows.
    Matrix {
        headers: Vec<String>,
        rows: Vec<Vec<Cell>>,
    },
}

impl Table {
    /// Number of data rows (header excluded).
    pub fn row_count(&self) -> usize {
        match self {
            Table::Pairs { rows, .. } => rows.len(),
            Table::Matrix { rows, .. } => rows.len(),
        }
    }

    /// Value for `label` in a pairs table, or in the first column of a matrix.
    pub fn lookup(&self, label: &str) -> Option<&Cell> {
        match self {
            Table::Pairs { rows, .. } => rows.iter().find(|(k, _)| k == label).map(|(_, v)| v),
            Table::Matrix { headers, rows } => {
                let col = headers.iter().position(|h| h == label)?;
                rows.first().and_then(|row| row.get(col))
            }
        }
    }
}

/// One named block of the report, tied to the input row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTab {
    /// 1-based position of the originating entry.
    pub row_index: usize,
    pub category: TabCategory,
    pub table: Table,
}

impl ReportTab {
    pub fn new(row_index: usize, category: TabCategory, table: Table) -> Self {
        Self {
            row_index,
            category,
            table,
        }
    }

    /// Tab name: `{row_index}-{category}`.
    pub fn name(&self) -> String {
        format!("{}-{}", self.row_index, self.category)
    }
}

/// Flatten nested JSON into dotted/bracketed keys.
///
/// `{"owner": {"login": "x"}, "topics": ["a"]}` with prefix `repo` yields
/// `repo.owner.login` and `repo.topics[0]`. Empty containers are kept as a
/// single key with `{}`/`[]` text so they still show up in the report.
pub fn flatten_json(prefix: &str, value: &Value) -> Vec<(String, Cell)> {
    let mut out = Vec::new();
    flatten_into(prefix, value, &mut out);
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, Cell)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&path, child, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                flatten_into(&format!("{}[{}]", prefix, i), child, out);
            }
        }
        other => out.push((prefix.to_string(), Cell::from(other))),
    }
}
