//! Unit tests - join semantics exercised through the public API
//!
//! These tests need no files or external processes.

mod relation_tests;

use linref_join::{Row, Table};
use serde_json::Value;

/// Build a table from `json!` object literals
pub fn table(values: Vec<Value>) -> Table {
    Table::from_records(
        values
            .into_iter()
            .map(|v| v.as_object().cloned().expect("test records are objects"))
            .collect::<Vec<Row>>(),
    )
}
