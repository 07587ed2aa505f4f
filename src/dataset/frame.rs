//! Column-oriented metric dataset.
//!
//! A `MetricFrame` is the read-only, already-loaded table of samples the
//! engine slices into windows. Every cell is nullable, mirroring what a
//! results export typically contains.

use crate::utils::config::NULL_GROUP_LABEL;
use crate::utils::error::AggregationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed column storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum Column {
    Timestamp(Vec<Option<DateTime<Utc>>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Timestamp(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Column::Timestamp(_) => "timestamp",
            Column::Float(_) => "float",
            Column::Text(_) => "text",
        }
    }

    /// Cell rendered as a grouping key part
    ///
    /// **Public** - any column type can be used for grouping; a row past
    /// the end reads as null
    pub fn key_at(&self, row: usize) -> Option<String> {
        match self {
            Column::Timestamp(v) => v.get(row).copied().flatten().map(|ts| ts.to_rfc3339()),
            Column::Float(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            Column::Text(v) => v.get(row).cloned().flatten(),
        }
    }
}

/// A named column, as stored in the frame and on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedColumn {
    pub name: String,

    #[serde(flatten)]
    pub column: Column,
}

/// In-memory table of metric samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricFrame {
    columns: Vec<NamedColumn>,
}

impl MetricFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, checking its length against existing columns
    ///
    /// **Public** - builder used by loaders and tests
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<Self, AggregationError> {
        let name = name.into();

        if let Some(first) = self.columns.first() {
            let expected = first.column.len();
            if column.len() != expected {
                return Err(AggregationError::LengthMismatch {
                    column: name,
                    expected,
                    actual: column.len(),
                });
            }
        }

        // Re-adding a name replaces the earlier column
        self.columns.retain(|c| c.name != name);
        self.columns.push(NamedColumn { name, column });
        Ok(self)
    }

    /// Check that all columns have the same number of rows and distinct names
    ///
    /// **Public** - frames built through serde skip `with_column`
    pub fn validate(&self) -> Result<(), AggregationError> {
        let expected = self.len();
        for (i, c) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|prev| prev.name == c.name) {
                return Err(AggregationError::DuplicateColumn(c.name.clone()));
            }

            if c.column.len() != expected {
                return Err(AggregationError::LengthMismatch {
                    column: c.name.clone(),
                    expected,
                    actual: c.column.len(),
                });
            }
        }
        Ok(())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.columns.first().map(|c| c.column.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&Column, AggregationError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.column)
            .ok_or_else(|| AggregationError::MissingColumn(name.to_string()))
    }

    /// Resolve a column as timestamps
    ///
    /// **Public** - text columns are parsed as RFC 3339; the first
    /// unparseable cell fails the whole call.
    pub fn timestamps(&self, name: &str) -> Result<Vec<Option<DateTime<Utc>>>, AggregationError> {
        match self.column(name)? {
            Column::Timestamp(v) => Ok(v.clone()),
            Column::Text(v) => v
                .iter()
                .enumerate()
                .map(|(row, cell)| match cell {
                    None => Ok(None),
                    Some(raw) => DateTime::parse_from_rfc3339(raw)
                        .map(|ts| Some(ts.with_timezone(&Utc)))
                        .map_err(|_| AggregationError::MalformedTimestamp {
                            column: name.to_string(),
                            row,
                            value: raw.clone(),
                        }),
                })
                .collect(),
            other => Err(AggregationError::ColumnType {
                column: name.to_string(),
                expected: "timestamp",
                actual: other.type_name(),
            }),
        }
    }

    /// Resolve a column as numeric measurements
    pub fn floats(&self, name: &str) -> Result<&[Option<f64>], AggregationError> {
        match self.column(name)? {
            Column::Float(v) => Ok(v),
            other => Err(AggregationError::ColumnType {
                column: name.to_string(),
                expected: "float",
                actual: other.type_name(),
            }),
        }
    }

    /// Build the grouping key of every row
    ///
    /// **Public** - nulls are kept as `None` parts, never dropped
    pub fn group_keys(&self, columns: &[String]) -> Result<Vec<GroupKey>, AggregationError> {
        if columns.is_empty() {
            return Err(AggregationError::NoGroupingColumns);
        }
        self.validate()?;

        let resolved = columns
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((0..self.len())
            .map(|row| GroupKey(resolved.iter().map(|c| c.key_at(row)).collect()))
            .collect())
    }

    /// Earliest non-null timestamp in a column
    pub fn earliest(&self, name: &str) -> Result<Option<DateTime<Utc>>, AggregationError> {
        Ok(self.timestamps(name)?.into_iter().flatten().min())
    }
}

/// Operation identity: one part per grouping column
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey(pub Vec<Option<String>>);

impl GroupKey {
    pub fn single(value: impl Into<String>) -> Self {
        Self(vec![Some(value.into())])
    }

    /// Key of rows whose (single) grouping column is null
    pub fn null() -> Self {
        Self(vec![None])
    }

    pub fn parts(&self) -> &[Option<String>] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<&str> = self
            .0
            .iter()
            .map(|p| p.as_deref().unwrap_or(NULL_GROUP_LABEL))
            .collect();
        write!(f, "{}", rendered.join("/"))
    }
}
