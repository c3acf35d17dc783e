//! In-memory record tables
//!
//! A [`Table`] is an ordered sequence of records sharing one ordered column
//! set. Records are `serde_json` maps, so cells hold any JSON value: numbers
//! and strings for ordinary columns, nested objects for relation fields.
//!
//! Tables built from heterogeneous records are padded: a record lacking a
//! column gets `null` in that column. Column order is the order in which
//! columns first appear across the input records.

pub mod prefix;
pub mod schema;

use std::collections::HashSet;
use std::io::Read;

use serde_json::{Map, Value};

use crate::errors::{JoinError, Result};
use crate::relational::value_ops::canonical_key;

/// One record of a table (column name -> cell value)
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let columns = columns
            .into_iter()
            .map(Into::into)
            .filter(|c: &String| seen.insert(c.clone()))
            .collect();
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from records, padding missing cells with `null`
    pub fn from_records(records: Vec<Row>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.push_row(record);
        }
        table
    }

    /// Parse a JSON array of objects
    pub fn from_json_value(value: Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(JoinError::malformed(
                "expected a JSON array of records at top level",
            ));
        };

        let mut records = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(map) => records.push(map),
                other => {
                    return Err(JoinError::malformed_row(
                        idx,
                        format!("expected a JSON object, found {}", json_kind(&other)),
                    ))
                }
            }
        }
        Ok(Self::from_records(records))
    }

    /// Read a JSON array of objects from a reader
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_json_value(value)
    }

    /// Append a record. Columns unknown so far are added to the table and
    /// back-filled with `null` in earlier rows.
    pub fn push_row(&mut self, mut record: Row) {
        let new_columns: Vec<String> = record
            .keys()
            .filter(|k| !self.columns.contains(k))
            .cloned()
            .collect();

        if !new_columns.is_empty() {
            for row in &mut self.rows {
                for column in &new_columns {
                    row.insert(column.clone(), Value::Null);
                }
            }
            self.columns.extend(new_columns);
        }

        let mut ordered = Map::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = record.remove(column).unwrap_or(Value::Null);
            ordered.insert(column.clone(), value);
        }
        self.rows.push(ordered);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Column names containing `needle` as a substring, in column order
    pub fn columns_containing(&self, needle: &str) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.contains(needle))
            .map(String::as_str)
            .collect()
    }

    /// All cells of one column, or `None` if the column does not exist
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        if !self.has_column(name) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.get(name).unwrap_or(&Value::Null))
                .collect(),
        )
    }

    /// Distinct cell values of one column in first-appearance order.
    ///
    /// Numbers are compared numerically, so `105` and `105.0` count once.
    pub fn distinct_values(&self, name: &str) -> Option<Vec<Value>> {
        let values = self.column_values(name)?;
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for value in values {
            let key = canonical_key(value).unwrap_or_else(|| "null".to_string());
            if seen.insert(key) {
                distinct.push(value.clone());
            }
        }
        Some(distinct)
    }

    /// Keep the first row for every distinct value of `column`.
    ///
    /// Joins never deduplicate; use this to get one row per entity.
    pub fn deduplicate_on(&self, column: &str) -> Result<Table> {
        if !self.has_column(column) {
            return Err(JoinError::configuration(format!(
                "cannot deduplicate on '{}': column not found in {:?}",
                column, self.columns
            )));
        }

        let mut seen = HashSet::new();
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                let value = row.get(column).unwrap_or(&Value::Null);
                seen.insert(canonical_key(value).unwrap_or_else(|| "null".to_string()))
            })
            .cloned()
            .collect();

        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Rename every column through `rename`, keeping row and column order
    pub(crate) fn rename_columns<F>(&self, rename: F) -> Table
    where
        F: Fn(&str) -> String,
    {
        let columns: Vec<String> = self.columns.iter().map(|c| rename(c)).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(k, v)| (rename(k), v.clone()))
                    .collect::<Row>()
            })
            .collect();
        Table { columns, rows }
    }

    /// Drop a column if present
    pub(crate) fn drop_column(&mut self, name: &str) {
        self.columns.retain(|c| c != name);
        for row in &mut self.rows {
            row.shift_remove(name);
        }
    }

    /// Mutable access to rows for in-crate transforms that keep the column set
    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// Assemble a table from already-uniform parts
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Table {
        Table { columns, rows }
    }

    pub fn to_json_value(&self) -> Value {
        Value::Array(self.rows.iter().cloned().map(Value::Object).collect())
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
