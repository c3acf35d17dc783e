//! Column role resolution
//!
//! Joins need to know which columns hold the link sequence id, positions,
//! identifiers and relation fields. Rather than probing column names inside
//! the join code, each input table is described once per call: the expected
//! name for every role (`prefix + configured name`) is looked up and the
//! result is stored in a [`TableSchema`].
//!
//! A role is *bound* when exactly one column matches its expected name. If
//! several columns match ignoring ASCII case (`id` and `ID`), the role is
//! *ambiguous* and any operation requiring it fails.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use super::Table;
use crate::config::ColumnNames;
use crate::errors::{JoinError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnRole {
    LinkSequenceId,
    StartPosition,
    EndPosition,
    RelativePosition,
    Identifier,
    ObjectType,
    Relations,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 7] = [
        ColumnRole::LinkSequenceId,
        ColumnRole::StartPosition,
        ColumnRole::EndPosition,
        ColumnRole::RelativePosition,
        ColumnRole::Identifier,
        ColumnRole::ObjectType,
        ColumnRole::Relations,
    ];

    /// Roles bound to a single exact column. The object type is located by
    /// substring instead, see [`crate::table::prefix`].
    pub const DESCRIBED: [ColumnRole; 6] = [
        ColumnRole::LinkSequenceId,
        ColumnRole::StartPosition,
        ColumnRole::EndPosition,
        ColumnRole::RelativePosition,
        ColumnRole::Identifier,
        ColumnRole::Relations,
    ];
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnRole::LinkSequenceId => "link sequence id",
            ColumnRole::StartPosition => "start position",
            ColumnRole::EndPosition => "end position",
            ColumnRole::RelativePosition => "relative position",
            ColumnRole::Identifier => "identifier",
            ColumnRole::ObjectType => "object type",
            ColumnRole::Relations => "relations",
        };
        write!(f, "{}", name)
    }
}

/// How a table is positioned along its link sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionKind {
    /// Span between two position columns
    Line { start: String, end: String },
    /// Single position, used as both start and end
    Point { position: String },
}

impl PositionKind {
    pub fn start(&self) -> &str {
        match self {
            PositionKind::Line { start, .. } => start,
            PositionKind::Point { position } => position,
        }
    }

    pub fn end(&self) -> &str {
        match self {
            PositionKind::Line { end, .. } => end,
            PositionKind::Point { position } => position,
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, PositionKind::Point { .. })
    }
}

/// Role -> column binding for one (possibly prefixed) table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    expected: BTreeMap<ColumnRole, String>,
    bound: BTreeMap<ColumnRole, String>,
    ambiguous: BTreeMap<ColumnRole, Vec<String>>,
}

impl TableSchema {
    /// Resolve every role against `table`, expecting `prefix + name`
    pub fn describe(table: &Table, names: &ColumnNames, prefix: &str) -> Self {
        let mut expected = BTreeMap::new();
        let mut bound = BTreeMap::new();
        let mut ambiguous = BTreeMap::new();

        for role in ColumnRole::DESCRIBED {
            let wanted = format!("{}{}", prefix, names.name_for(role));
            let matches: Vec<String> = table
                .columns()
                .iter()
                .filter(|c| c.eq_ignore_ascii_case(&wanted))
                .cloned()
                .collect();

            if matches.len() > 1 {
                ambiguous.insert(role, matches);
            } else if table.has_column(&wanted) {
                bound.insert(role, wanted.clone());
            }
            expected.insert(role, wanted);
        }

        debug!("Described table with prefix '{}': {:?}", prefix, bound);

        Self {
            expected,
            bound,
            ambiguous,
        }
    }

    /// Column bound to `role`, if any
    pub fn column(&self, role: ColumnRole) -> Option<&str> {
        self.bound.get(&role).map(String::as_str)
    }

    /// Name the role would have, whether or not it exists
    pub fn expected(&self, role: ColumnRole) -> &str {
        self.expected.get(&role).map(String::as_str).unwrap_or_default()
    }

    /// Column bound to `role`, or a configuration error naming it
    pub fn require(&self, role: ColumnRole, context: &str) -> Result<&str> {
        if let Some(candidates) = self.ambiguous.get(&role) {
            return Err(JoinError::configuration_with_context(
                format!(
                    "{} column '{}' is ambiguous, candidates: {:?}",
                    role,
                    self.expected(role),
                    candidates
                ),
                context,
            ));
        }
        self.column(role).ok_or_else(|| {
            JoinError::configuration_with_context(
                format!("{} column '{}' not found", role, self.expected(role)),
                context,
            )
        })
    }

    /// LINE if both start and end are bound, else POINT if the relative
    /// position is bound, else a configuration error naming all three.
    pub fn position_kind(&self, context: &str) -> Result<PositionKind> {
        for role in [
            ColumnRole::StartPosition,
            ColumnRole::EndPosition,
            ColumnRole::RelativePosition,
        ] {
            if self.ambiguous.contains_key(&role) {
                self.require(role, context)?;
            }
        }

        if let (Some(start), Some(end)) = (
            self.column(ColumnRole::StartPosition),
            self.column(ColumnRole::EndPosition),
        ) {
            return Ok(PositionKind::Line {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        if let Some(position) = self.column(ColumnRole::RelativePosition) {
            return Ok(PositionKind::Point {
                position: position.to_string(),
            });
        }

        Err(JoinError::configuration_with_context(
            format!(
                "no link position columns: need ('{}', '{}') or '{}'",
                self.expected(ColumnRole::StartPosition),
                self.expected(ColumnRole::EndPosition),
                self.expected(ColumnRole::RelativePosition)
            ),
            context,
        ))
    }
}
