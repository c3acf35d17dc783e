//! In-memory relational join evaluation
//!
//! A [`Join`] describes a two-table join the way a query renderer would:
//! two table aliases, a join kind and a list of comparisons (`joining_on`)
//! that must all hold. It can be rendered as SQL text for logging and
//! evaluated directly against two [`Table`](crate::table::Table)s.
//!
//! ```ignore
//! let join = Join::new("A", "B", JoinType::Inner)
//!     .on(Operator::Equal, col("A", "linkSequenceId"), col("B", "t105_linkSequenceId"))
//!     .on(Operator::LessThan, col("A", "start"), col("B", "t105_end"))
//!     .on(Operator::GreaterThan, col("A", "end"), col("B", "t105_start"));
//!
//! println!("{}", join.to_sql());
//! let joined = join.evaluate(&left, &right)?;
//! ```
//!
//! Relations only live for the duration of one `evaluate` call.

mod evaluator;
pub mod value_ops;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::JoinError;

pub trait ToSql {
    fn to_sql(&self) -> String;
}

/// Deserialized through [`FromStr`], so configuration files accept the same
/// spellings as the command line.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    /// Unmatched left rows are emitted with nulls on the right
    pub fn keeps_unmatched_left(self) -> bool {
        matches!(self, JoinType::Left | JoinType::Full)
    }

    /// Unmatched right rows are emitted with nulls on the left
    pub fn keeps_unmatched_right(self) -> bool {
        matches!(self, JoinType::Right | JoinType::Full)
    }
}

impl FromStr for JoinType {
    type Err = JoinError;

    /// Case-insensitive; accepts an `outer` suffix (`left outer`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let kind = lowered
            .strip_suffix("outer")
            .map(str::trim_end)
            .unwrap_or(&lowered);
        match kind {
            "inner" => Ok(JoinType::Inner),
            "left" => Ok(JoinType::Left),
            "right" => Ok(JoinType::Right),
            "full" => Ok(JoinType::Full),
            _ => Err(JoinError::configuration(format!(
                "unsupported join type '{}' (expected inner, left, right or full)",
                s
            ))),
        }
    }
}

impl TryFrom<String> for JoinType {
    type Error = JoinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL OUTER",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table_alias: String,
    pub column: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Operand {
    Column(ColumnRef),
    Literal(Value),
}

/// Shorthand for a column operand
pub fn col(table_alias: &str, column: &str) -> Operand {
    Operand::Column(ColumnRef {
        table_alias: table_alias.to_string(),
        column: column.to_string(),
    })
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    LessThan,
    GreaterThan,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Equal => "=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OperatorApplication {
    pub operator: Operator,
    pub operands: Vec<Operand>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Join {
    pub left_alias: String,
    pub right_alias: String,
    pub joining_on: Vec<OperatorApplication>,
    pub join_type: JoinType,
}

impl Join {
    pub fn new(left_alias: &str, right_alias: &str, join_type: JoinType) -> Self {
        Self {
            left_alias: left_alias.to_string(),
            right_alias: right_alias.to_string(),
            joining_on: Vec::new(),
            join_type,
        }
    }

    /// Add one binary comparison to the join condition
    pub fn on(mut self, operator: Operator, lhs: Operand, rhs: Operand) -> Self {
        self.joining_on.push(OperatorApplication {
            operator,
            operands: vec![lhs, rhs],
        });
        self
    }
}

impl ToSql for Operand {
    fn to_sql(&self) -> String {
        match self {
            Operand::Column(c) => format!("{}.{}", c.table_alias, c.column),
            Operand::Literal(Value::String(s)) => format!("'{}'", s.replace('\'', "''")),
            Operand::Literal(Value::Null) => "NULL".to_string(),
            Operand::Literal(v) => v.to_string(),
        }
    }
}

impl ToSql for OperatorApplication {
    fn to_sql(&self) -> String {
        let operands: Vec<String> = self.operands.iter().map(ToSql::to_sql).collect();
        operands.join(&format!(" {} ", self.operator))
    }
}

impl ToSql for Join {
    fn to_sql(&self) -> String {
        let mut sql = format!(
            "SELECT * FROM {}\n{} JOIN {}",
            self.left_alias, self.join_type, self.right_alias
        );
        if !self.joining_on.is_empty() {
            let conditions: Vec<String> = self.joining_on.iter().map(ToSql::to_sql).collect();
            sql.push_str(" ON\n");
            sql.push_str(&conditions.join(" AND\n"));
        }
        sql
    }
}
