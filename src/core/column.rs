use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, Result};

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ColumnType {
    #[default]
    String,
    Int,
    Float,
    Bool,
}

impl FromStr for ColumnType {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" => Ok(ColumnType::String),
            "int" | "integer" => Ok(ColumnType::Int),
            "float" | "double" | "number" => Ok(ColumnType::Float),
            "bool" | "boolean" => Ok(ColumnType::Bool),
            other => Err(ReaderError::InvalidColumnType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ColumnType {
    type Error = ReaderError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
        })
    }
}

fn default_required() -> bool {
    true
}

/// A column the caller expects in the input.
///
/// Deserializes from JSON such as `{"name": "total", "type": "float"}`;
/// `required` defaults to `true` and `type` to `string`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnSpec {
    /// A required string column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            column_type: ColumnType::String,
        }
    }

    /// Marks the column optional: it may be missing from the header and
    /// trailing fields may be absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use autocsv::core::column::{ColumnSpec, ColumnType};
    ///
    /// let note = ColumnSpec::new("note").optional();
    /// assert!(!note.required);
    /// assert_eq!(note.column_type, ColumnType::String);
    /// ```
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets the type cells of this column are coerced to.
    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }
}

impl From<&str> for ColumnSpec {
    fn from(name: &str) -> Self {
        ColumnSpec::new(name)
    }
}

/// Normalizes a column name for fuzzy matching: ASCII alphanumerics only,
/// lower-cased.
pub fn slug(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn column_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^(?i)[a-z_-][a-z0-9_-]*").expect("valid column name pattern"))
}

/// Rejects the column list if any name does not start like an identifier.
///
/// Names must not start with a digit: header detection relies on a header's
/// first cell never starting with one.
pub fn check_column_names(columns: &[ColumnSpec]) -> Result<()> {
    let invalid: Vec<String> = columns
        .iter()
        .filter(|column| !column_name_pattern().is_match(&column.name))
        .map(|column| column.name.clone())
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ReaderError::InvalidColumnNames(invalid))
    }
}

/// Without a header line columns are mapped left to right, which only works
/// when every optional column trails the required ones.
pub fn check_required_first(columns: &[ColumnSpec]) -> Result<()> {
    columns
        .iter()
        .try_fold(true, |previous_required, column| {
            if column.required && !previous_required {
                Err(ReaderError::MixedRequiredColumns)
            } else {
                Ok(column.required)
            }
        })
        .map(|_| ())
}

/// Derives a column specification from a header row.
///
/// Cells collapse onto their slug; a repeated slug keeps its first position.
pub fn columns_from_header(header: &[String]) -> Vec<ColumnSpec> {
    let mut columns: Vec<ColumnSpec> = Vec::with_capacity(header.len());
    for cell in header {
        let name = slug(cell);
        if !columns.iter().any(|column| column.name == name) {
            columns.push(ColumnSpec::new(name));
        }
    }
    columns
}

/// Resolved mapping of column names to zero-based field indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    entries: Vec<(String, usize)>,
}

impl ColumnMap {
    /// Maps every column to its declaration position.
    pub fn positional(columns: &[ColumnSpec]) -> Self {
        Self {
            entries: columns
                .iter()
                .enumerate()
                .map(|(index, column)| (column.name.clone(), index))
                .collect(),
        }
    }

    /// Maps columns to header cells by slug equality.
    ///
    /// Unknown header cells are ignored and unmatched columns stay unmapped.
    /// When several cells match the same column, the last one wins but the
    /// column keeps the position of its first match.
    pub fn from_header(columns: &[ColumnSpec], header: &[String]) -> Self {
        let slugs: Vec<(String, &str)> = columns
            .iter()
            .map(|column| (slug(&column.name), column.name.as_str()))
            .collect();

        let mut map = ColumnMap::default();
        for (index, cell) in header.iter().enumerate() {
            let cell_slug = slug(cell);
            // later declarations with the same slug shadow earlier ones
            if let Some((_, name)) = slugs.iter().rev().find(|(s, _)| *s == cell_slug) {
                map.insert(name, index);
            }
        }
        map
    }

    fn insert(&mut self, name: &str, index: usize) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = index,
            None => self.entries.push((name.to_string(), index)),
        }
    }

    /// Returns the zero-based field index of a column, `None` when unmapped.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, index)| *index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of mapped columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, index)` pairs in header order, or declaration order
    /// for a positional map.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, index)| (name.as_str(), *index))
    }
}
