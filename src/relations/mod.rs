//! Parent/child relation resolution
//!
//! Child records carry their parents' ids in a nested relation cell (see
//! [`relation_field`]). [`RelationResolver`] looks every referenced id up in
//! a parent table and emits one merged row per (matching parent row, child
//! row) pair.
//!
//! Nothing is deduplicated: if a parent object has two road segments and the
//! child three, all six combinations come out. Filter inputs or outputs on
//! the object id if one row per object is wanted.
//!
//! Children whose relation cell is missing or has no parent list contribute
//! no rows at all. Unexpected parent multiplicities are logged and collected
//! in a [`ResolveReport`], never treated as errors.

pub mod merge;
pub mod relation_field;

use std::collections::HashMap;

use log::{debug, info, warn};
use serde_json::Value;

use crate::config::{ColumnNames, JoinConfig};
use crate::errors::{JoinError, Result};
use crate::relational::value_ops::canonical_key;
use crate::table::prefix::derive_object_type_prefix;
use crate::table::schema::{ColumnRole, TableSchema};
use crate::table::Table;

pub use merge::{merge_rows, MergePolicy};
pub use relation_field::{ParentGroup, Relation};

/// A child whose parent lookup did not give exactly one row per reference
#[derive(Debug, Clone, PartialEq)]
pub enum MultiplicityAnomaly {
    /// More than one output row was produced for the child
    MultipleParents {
        child_id: Value,
        referenced: Vec<i64>,
        matched_rows: usize,
    },
    /// Several parents referenced, only one row found
    ReferencedNotFound {
        child_id: Value,
        referenced: Vec<i64>,
        missing: Vec<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolveReport {
    pub anomalies: Vec<MultiplicityAnomaly>,
    /// Child rows without any parent reference
    pub children_without_relation: usize,
}

#[derive(Debug, Clone)]
pub struct RelationResolver {
    columns: ColumnNames,
    object_type_prefix: String,
    merge_policy: MergePolicy,
}

impl Default for RelationResolver {
    fn default() -> Self {
        Self::from_config(&JoinConfig::default())
    }
}

impl RelationResolver {
    pub fn new(columns: ColumnNames) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn from_config(config: &JoinConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            object_type_prefix: config.object_type_prefix.clone(),
            merge_policy: MergePolicy::PreferChild,
        }
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Attach parent fields to every child that references a parent.
    ///
    /// # Arguments
    /// * `parent_prefix` - applied to `parents` if given
    /// * `child_prefix` - applied to `children`; derived from the child
    ///   object type (`t<type>_`) if `None`
    /// * `skip_child_prefix` - keep child columns unchanged (overrides `child_prefix`)
    pub fn resolve_parents(
        &self,
        parents: &Table,
        children: &Table,
        parent_prefix: Option<&str>,
        child_prefix: Option<&str>,
        skip_child_prefix: bool,
    ) -> Result<Table> {
        self.resolve_parents_with_report(
            parents,
            children,
            parent_prefix,
            child_prefix,
            skip_child_prefix,
        )
        .map(|(table, _)| table)
    }

    /// Same as [`resolve_parents`](Self::resolve_parents), also returning
    /// the multiplicity diagnostics.
    pub fn resolve_parents_with_report(
        &self,
        parents: &Table,
        children: &Table,
        parent_prefix: Option<&str>,
        child_prefix: Option<&str>,
        skip_child_prefix: bool,
    ) -> Result<(Table, ResolveReport)> {
        let parent_prefix = parent_prefix.unwrap_or("");
        let parents = parents.with_prefix(parent_prefix);

        let child_prefix = if skip_child_prefix {
            String::new()
        } else {
            match child_prefix {
                Some(p) => p.to_string(),
                None => derive_object_type_prefix(
                    children,
                    self.columns.name_for(ColumnRole::ObjectType),
                    &self.object_type_prefix,
                    "deriving prefix for child table",
                )?,
            }
        };
        let children = children.with_prefix(&child_prefix);

        let parent_schema = TableSchema::describe(&parents, &self.columns, parent_prefix);
        let child_schema = TableSchema::describe(&children, &self.columns, &child_prefix);

        let parent_id = parent_schema.require(ColumnRole::Identifier, "parent table")?;
        let child_id = child_schema.require(ColumnRole::Identifier, "child table")?;
        let relation_key = child_schema.require(ColumnRole::Relations, "child table")?;

        debug!(
            "Resolving parents: parent id '{}', child id '{}', relations '{}'",
            parent_id, child_id, relation_key
        );

        let parent_index = index_by(&parents, parent_id);

        let mut output = Table::new(
            parents
                .columns()
                .iter()
                .chain(children.columns())
                .cloned(),
        );
        let mut report = ResolveReport::default();

        for (idx, child) in children.rows().iter().enumerate() {
            let relation = Relation::from_cell(child.get(relation_key))
                .map_err(|msg| JoinError::malformed_row(idx, msg))?;

            if relation == Relation::NoRelation {
                report.children_without_relation += 1;
                continue;
            }

            let referenced = relation.parent_ids();
            let mut missing = Vec::new();
            let mut produced = 0usize;

            for parent_ref in &referenced {
                let matches = canonical_key(&Value::from(*parent_ref))
                    .and_then(|key| parent_index.get(&key))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);

                if matches.is_empty() {
                    missing.push(*parent_ref);
                }
                for &pi in matches {
                    let merged = merge_rows(&parents.rows()[pi], child, self.merge_policy);
                    output.push_row(merged);
                    produced += 1;
                }
            }

            let child_id_value = child.get(child_id).cloned().unwrap_or(Value::Null);
            if produced > 1 {
                warn!(
                    "Multiple parents {:?} found for child object {}",
                    referenced, child_id_value
                );
                report.anomalies.push(MultiplicityAnomaly::MultipleParents {
                    child_id: child_id_value,
                    referenced,
                    matched_rows: produced,
                });
            } else if referenced.len() > 1 && produced == 1 {
                info!(
                    "Several parents {:?} referenced by child object {}, but only one found (missing {:?})",
                    referenced, child_id_value, missing
                );
                report.anomalies.push(MultiplicityAnomaly::ReferencedNotFound {
                    child_id: child_id_value,
                    referenced,
                    missing,
                });
            }
        }

        debug!(
            "Resolved {} child rows into {} rows ({} anomalies)",
            children.len(),
            output.len(),
            report.anomalies.len()
        );

        Ok((output, report))
    }
}

/// Parent row indices keyed by identifier value
fn index_by(table: &Table, column: &str) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, row) in table.rows().iter().enumerate() {
        if let Some(key) = row.get(column).and_then(canonical_key) {
            index.entry(key).or_default().push(idx);
        }
    }
    index
}
