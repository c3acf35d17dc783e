//! Namespace prefixing for repeated joins
//!
//! Joining several entity types in a pipeline quickly produces clashing
//! column names (`id`, `start`, `end`...). Each side of a join is therefore
//! renamed under a namespace prefix such as `t105_`.
//!
//! Prefixing is idempotent in an approximate way: if any column name already
//! contains the prefix as a substring the table is assumed to be prefixed and
//! is returned unchanged. This means a result of
//! `join(a, b)` can be joined again with the same prefixes without producing
//! `t105_t105_start`.

use log::debug;
use serde_json::Value;

use super::Table;
use crate::errors::{JoinError, Result};

/// True if some column already contains `prefix`
pub fn is_prefixed(table: &Table, prefix: &str) -> bool {
    table.columns().iter().any(|c| c.contains(prefix))
}

impl Table {
    /// Return a copy with every column renamed to `prefix + name`, unless the
    /// table already carries the prefix (see module docs).
    pub fn with_prefix(&self, prefix: &str) -> Table {
        if prefix.is_empty() || is_prefixed(self, prefix) {
            debug!("Prefix '{}' already present, leaving columns unchanged", prefix);
            return self.clone();
        }
        self.rename_columns(|c| format!("{}{}", prefix, c))
    }
}

/// Derive a namespace prefix from the table's single entity type.
///
/// Exactly one column name must contain `object_type_column`, and that column
/// must hold exactly one distinct non-null value `V`. The prefix is
/// `lead + V + "_"`, e.g. `t105_`.
pub fn derive_object_type_prefix(
    table: &Table,
    object_type_column: &str,
    lead: &str,
    context: &str,
) -> Result<String> {
    let candidates = table.columns_containing(object_type_column);
    if candidates.len() != 1 {
        return Err(JoinError::configuration_with_context(
            format!(
                "expected exactly one column containing '{}', found {}: {:?}",
                object_type_column,
                candidates.len(),
                candidates
            ),
            context,
        ));
    }
    let column = candidates[0];

    // Column exists, so distinct_values is Some
    let distinct = table.distinct_values(column).unwrap_or_default();
    if distinct.len() != 1 {
        return Err(JoinError::configuration_with_context(
            format!(
                "expected exactly one distinct value in column '{}', found {}: {:?}",
                column,
                distinct.len(),
                distinct
            ),
            context,
        ));
    }

    let type_text = match &distinct[0] {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(JoinError::configuration_with_context(
                format!(
                    "column '{}' holds {} which cannot name a prefix",
                    column, other
                ),
                context,
            ))
        }
    };

    let prefix = format!("{}{}_", lead, type_text);
    debug!("Derived prefix '{}' from column '{}'", prefix, column);
    Ok(prefix)
}
