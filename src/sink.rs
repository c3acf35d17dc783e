//! Preparing joined records for persistence
//!
//! File formats with case-insensitive column names (GeoPackage, shapefile)
//! reject tables with both `Name` and `name`. [`prepare_layer`] renames such
//! collisions, flattens geometry objects to their WKT text and drops columns
//! that only make sense in memory. The result can be written as JSON with
//! [`write_json`] or handed to a geospatial writer.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use log::debug;
use serde_json::Value;

use crate::errors::{JoinError, Result};
use crate::table::{Row, Table};

const GEOMETRY_COLUMN: &str = "geometry";
const ROAD_SEGMENTS_COLUMN: &str = "roadSegments";

/// Turn records into a table ready to be stored as one layer
pub fn prepare_layer(records: Vec<Row>) -> Result<Table> {
    if records.is_empty() {
        return Err(JoinError::empty_input("prepare_layer"));
    }

    let table = Table::from_records(records);
    let mut table = rename_case_insensitive_duplicates(&table);

    for row in table.rows_mut() {
        if let Some(Value::Object(geometry)) = row.get(GEOMETRY_COLUMN) {
            if let Some(wkt) = geometry.get("wkt").cloned() {
                row.insert(GEOMETRY_COLUMN.to_string(), wkt);
            }
        }
    }

    table.drop_column(ROAD_SEGMENTS_COLUMN);
    Ok(table)
}

/// Rename columns whose lower-cased name was already seen.
///
/// The n-th colliding column (counting across all collisions) gets `_<n>`
/// appended: `["Name", "name", "ID", "id"]` becomes
/// `["Name", "name_1", "ID", "id_2"]`. A suffix that would hit a name already
/// in use is skipped, so `["id", "ID", "ID_1"]` becomes `["id", "ID_2", "ID_1"]`.
pub fn rename_case_insensitive_duplicates(table: &Table) -> Table {
    let mut used: HashSet<String> = table.columns().iter().map(|c| c.to_lowercase()).collect();
    let mut seen = HashSet::new();
    let mut renames = BTreeMap::new();
    let mut n = 0;
    for column in table.columns() {
        if !seen.insert(column.to_lowercase()) {
            let mut renamed = column.clone();
            while used.contains(&renamed.to_lowercase()) {
                n += 1;
                renamed = format!("{}_{}", column, n);
            }
            used.insert(renamed.to_lowercase());
            renames.insert(column.clone(), renamed);
        }
    }

    if renames.is_empty() {
        return table.clone();
    }
    debug!("Renaming case-insensitive duplicate columns: {:?}", renames);
    table.rename_columns(|c| renames.get(c).cloned().unwrap_or_else(|| c.to_string()))
}

/// Layer name for an object type: `type<id>_<name>` with a file-safe name
pub fn layer_name(object_type_id: i64, name: &str) -> String {
    let safe: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("type{}_{}", object_type_id, safe)
}

/// Write a table as a pretty-printed JSON array of records
pub fn write_json<W: Write>(table: &Table, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &table.to_json_value())?;
    Ok(())
}

/// Write several named layers as one JSON object `{ layer: [records] }`
pub fn write_json_layers<W: Write>(layers: &BTreeMap<String, Table>, writer: W) -> Result<()> {
    let document: serde_json::Map<String, Value> = layers
        .iter()
        .map(|(name, table)| (name.clone(), table.to_json_value()))
        .collect();
    serde_json::to_writer_pretty(writer, &Value::Object(document))?;
    Ok(())
}
