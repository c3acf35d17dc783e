//! linref-join - joins for linear-referenced road network records
//!
//! This crate joins record tables describing objects positioned along a
//! road network's linear reference system:
//! - Interval-overlap joins on link sequence id and start/end or point position
//! - Parent/child resolution through nested relation references
//! - Helpers for lane classification and preparing output layers
//!
//! Both joins take tables as immutable input and return a new table.

pub mod config;
pub mod errors;
pub mod lanes;
pub mod overlap;
pub mod relational;
pub mod relations;
pub mod sink;
pub mod table;

pub use config::{ColumnNames, JoinConfig};
pub use errors::{JoinError, Result};
pub use overlap::IntervalJoinEngine;
pub use relational::JoinType;
pub use relations::{MergePolicy, MultiplicityAnomaly, RelationResolver, ResolveReport};
pub use table::{Row, Table};
