//! Interval-overlap join along a linear reference
//!
//! Finds pairs of records from two tables that lie on the same link sequence
//! and whose positions overlap. Each side is either a LINE (start and end
//! position) or a POINT (one relative position, used as both start and end).
//!
//! The join predicate is
//!
//! ```text
//! A.linkSequenceId = B.linkSequenceId AND A.start < B.end AND A.end > B.start
//! ```
//!
//! so touching endpoints do not overlap and a point exactly on a line's
//! boundary does not match it. Two point tables instead require equal
//! positions.
//!
//! ## Column naming
//!
//! The right table is renamed under a namespace prefix, by default derived
//! from its object type (`t105_` for type 105). The left table is only
//! renamed when a prefix is given, so results can be chained:
//!
//! ```ignore
//! let engine = IntervalJoinEngine::default();
//! let tunnels_speed = engine.join(&tunnels, &speed_limits, None, None, JoinType::Inner)?;
//! let with_traffic = engine.join(&tunnels_speed, &traffic, None, None, JoinType::Inner)?;
//! // columns: tunnel columns, t105_* speed limit columns, t540_* traffic columns
//! ```
//!
//! Prefixing is idempotent (see [`crate::table::prefix`]). Output keeps every
//! row pair that matches; one entity with several road segments therefore
//! appears several times. Use [`Table::deduplicate_on`] for one row per entity.

use log::debug;

use crate::config::{ColumnNames, JoinConfig};
use crate::errors::Result;
use crate::relational::{col, Join, JoinType, Operator};
use crate::table::prefix::derive_object_type_prefix;
use crate::table::schema::{ColumnRole, PositionKind, TableSchema};
use crate::table::Table;

const LEFT_ALIAS: &str = "A";
const RIGHT_ALIAS: &str = "B";

#[derive(Debug, Clone)]
pub struct IntervalJoinEngine {
    columns: ColumnNames,
    object_type_prefix: String,
}

impl Default for IntervalJoinEngine {
    fn default() -> Self {
        Self::from_config(&JoinConfig::default())
    }
}

impl IntervalJoinEngine {
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
        }
    }

    /// Join `left` and `right` on shared link sequence and overlapping
    /// position.
    ///
    /// # Arguments
    /// * `left_prefix` - applied to `left` if given, otherwise left columns are kept
    /// * `right_prefix` - applied to `right`; derived from its object type if `None`
    /// * `join_type` - inner, left, right or full
    ///
    /// # Errors
    /// `JoinError::Configuration` if the right prefix cannot be derived, or
    /// either side lacks its link sequence or position columns.
    pub fn join(
        &self,
        left: &Table,
        right: &Table,
        left_prefix: Option<&str>,
        right_prefix: Option<&str>,
        join_type: JoinType,
    ) -> Result<Table> {
        let left_prefix = left_prefix.unwrap_or("");
        let left = left.with_prefix(left_prefix);

        let right_prefix = match right_prefix {
            Some(p) => p.to_string(),
            None => derive_object_type_prefix(
                right,
                self.columns.name_for(ColumnRole::ObjectType),
                &self.object_type_prefix,
                "deriving prefix for right table of overlap join",
            )?,
        };
        let right = right.with_prefix(&right_prefix);

        let left_schema = TableSchema::describe(&left, &self.columns, left_prefix);
        let right_schema = TableSchema::describe(&right, &self.columns, &right_prefix);

        let join = self.build_join(&left_schema, &right_schema, join_type)?;
        join.evaluate(&left, &right)
    }

    /// Assemble the relational join for two described tables
    fn build_join(
        &self,
        left: &TableSchema,
        right: &TableSchema,
        join_type: JoinType,
    ) -> Result<Join> {
        let left_link = left.require(ColumnRole::LinkSequenceId, "left table of overlap join")?;
        let right_link = right.require(ColumnRole::LinkSequenceId, "right table of overlap join")?;
        let left_pos = left.position_kind("left table of overlap join")?;
        let right_pos = right.position_kind("right table of overlap join")?;

        debug!(
            "Overlap join: left {:?}, right {:?}, {}",
            left_pos, right_pos, join_type
        );

        let join = Join::new(LEFT_ALIAS, RIGHT_ALIAS, join_type).on(
            Operator::Equal,
            col(LEFT_ALIAS, left_link),
            col(RIGHT_ALIAS, right_link),
        );

        let join = match (&left_pos, &right_pos) {
            (PositionKind::Point { position: a }, PositionKind::Point { position: b }) => {
                join.on(Operator::Equal, col(LEFT_ALIAS, a), col(RIGHT_ALIAS, b))
            }
            _ => join
                .on(
                    Operator::LessThan,
                    col(LEFT_ALIAS, left_pos.start()),
                    col(RIGHT_ALIAS, right_pos.end()),
                )
                .on(
                    Operator::GreaterThan,
                    col(LEFT_ALIAS, left_pos.end()),
                    col(RIGHT_ALIAS, right_pos.start()),
                ),
        };

        Ok(join)
    }
}
