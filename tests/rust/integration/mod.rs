//! Integration tests - pipelines of joins, configuration files and the CLI binary

mod cli_tests;
mod pipeline_tests;

use linref_join::{Row, Table};
use serde_json::Value;

pub fn table(values: Vec<Value>) -> Table {
    Table::from_records(
        values
            .into_iter()
            .map(|v| v.as_object().cloned().expect("test records are objects"))
            .collect::<Vec<Row>>(),
    )
}
