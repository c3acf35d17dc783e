//! Nested-loop join evaluation with an equality hash index
//!
//! The first column-to-column equality between the two sides (typically the
//! link sequence id) is used to bucket right rows, so each left row is only
//! tested against right rows sharing that key. All remaining comparisons are
//! checked per candidate pair.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde_json::Value;

use super::value_ops::{canonical_key, compare_values};
use super::{Join, Operand, Operator, OperatorApplication, ToSql};
use crate::errors::{JoinError, Result};
use crate::table::{Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Operand resolved against the input tables
#[derive(Debug, Clone)]
enum BoundOperand {
    Column(Side, String),
    Literal(Value),
}

#[derive(Debug, Clone)]
struct BoundPredicate {
    operator: Operator,
    lhs: BoundOperand,
    rhs: BoundOperand,
}

impl BoundOperand {
    fn value<'a>(&'a self, left: &'a Row, right: &'a Row) -> &'a Value {
        match self {
            BoundOperand::Column(Side::Left, c) => left.get(c).unwrap_or(&Value::Null),
            BoundOperand::Column(Side::Right, c) => right.get(c).unwrap_or(&Value::Null),
            BoundOperand::Literal(v) => v,
        }
    }
}

impl BoundPredicate {
    fn holds(&self, left: &Row, right: &Row) -> bool {
        let ordering = compare_values(self.lhs.value(left, right), self.rhs.value(left, right));
        match (self.operator, ordering) {
            (_, None) => false,
            (Operator::Equal, Some(o)) => o.is_eq(),
            (Operator::LessThan, Some(o)) => o.is_lt(),
            (Operator::GreaterThan, Some(o)) => o.is_gt(),
        }
    }

    /// (left column, right column) if this is a cross-side equality
    fn equi_columns(&self) -> Option<(&str, &str)> {
        if self.operator != Operator::Equal {
            return None;
        }
        match (&self.lhs, &self.rhs) {
            (BoundOperand::Column(Side::Left, l), BoundOperand::Column(Side::Right, r))
            | (BoundOperand::Column(Side::Right, r), BoundOperand::Column(Side::Left, l)) => {
                Some((l.as_str(), r.as_str()))
            }
            _ => None,
        }
    }
}

impl Join {
    /// Evaluate the join over two tables, returning a new table.
    ///
    /// Output columns are all left columns followed by all right columns. A
    /// right column whose name is already taken is renamed `<name>_<n>`.
    pub fn evaluate(&self, left: &Table, right: &Table) -> Result<Table> {
        debug!("Evaluating join:\n{}", self.to_sql());

        let predicates = self
            .joining_on
            .iter()
            .map(|app| self.bind(app, left, right))
            .collect::<Result<Vec<_>>>()?;

        let (columns, right_names) = output_columns(left.columns(), right.columns());
        let combine = |l: Option<&Row>, r: Option<&Row>| -> Row {
            let mut row = Row::with_capacity(columns.len());
            for name in left.columns() {
                let v = l.and_then(|l| l.get(name)).cloned().unwrap_or(Value::Null);
                row.insert(name.clone(), v);
            }
            for (name, out_name) in right.columns().iter().zip(&right_names) {
                let v = r.and_then(|r| r.get(name)).cloned().unwrap_or(Value::Null);
                row.insert(out_name.clone(), v);
            }
            row
        };

        let index = predicates
            .iter()
            .find_map(BoundPredicate::equi_columns)
            .map(|(l, r)| (l.to_string(), build_index(right, r)));

        let all_right: Vec<usize> = (0..right.len()).collect();
        let mut right_matched = vec![false; right.len()];
        let mut rows = Vec::new();

        for left_row in left.rows() {
            let candidates: &[usize] = match &index {
                Some((left_col, buckets)) => left_row
                    .get(left_col)
                    .and_then(canonical_key)
                    .and_then(|key| buckets.get(&key))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
                None => &all_right,
            };

            let mut matched = false;
            for &ri in candidates {
                let right_row = &right.rows()[ri];
                if predicates.iter().all(|p| p.holds(left_row, right_row)) {
                    rows.push(combine(Some(left_row), Some(right_row)));
                    right_matched[ri] = true;
                    matched = true;
                }
            }

            if !matched && self.join_type.keeps_unmatched_left() {
                rows.push(combine(Some(left_row), None));
            }
        }

        if self.join_type.keeps_unmatched_right() {
            for (ri, right_row) in right.rows().iter().enumerate() {
                if !right_matched[ri] {
                    rows.push(combine(None, Some(right_row)));
                }
            }
        }

        debug!(
            "{} JOIN of {} x {} rows produced {} rows",
            self.join_type,
            left.len(),
            right.len(),
            rows.len()
        );

        Ok(Table::from_parts(columns, rows))
    }

    fn bind(&self, app: &OperatorApplication, left: &Table, right: &Table) -> Result<BoundPredicate> {
        let [lhs, rhs] = app.operands.as_slice() else {
            return Err(JoinError::configuration(format!(
                "operator {} expects 2 operands, got {}",
                app.operator,
                app.operands.len()
            )));
        };
        Ok(BoundPredicate {
            operator: app.operator,
            lhs: self.bind_operand(lhs, left, right)?,
            rhs: self.bind_operand(rhs, left, right)?,
        })
    }

    fn bind_operand(&self, operand: &Operand, left: &Table, right: &Table) -> Result<BoundOperand> {
        match operand {
            Operand::Literal(v) => Ok(BoundOperand::Literal(v.clone())),
            Operand::Column(c) => {
                let (side, table) = if c.table_alias == self.left_alias {
                    (Side::Left, left)
                } else if c.table_alias == self.right_alias {
                    (Side::Right, right)
                } else {
                    return Err(JoinError::configuration(format!(
                        "unknown table alias '{}' (expected '{}' or '{}')",
                        c.table_alias, self.left_alias, self.right_alias
                    )));
                };
                if !table.has_column(&c.column) {
                    return Err(JoinError::configuration(format!(
                        "column '{}' not found in {}: {:?}",
                        c.column,
                        c.table_alias,
                        table.columns()
                    )));
                }
                Ok(BoundOperand::Column(side, c.column.clone()))
            }
        }
    }
}

/// Right-row indices bucketed by the canonical key of `column`; nulls skipped
fn build_index(table: &Table, column: &str) -> HashMap<String, Vec<usize>> {
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, row) in table.rows().iter().enumerate() {
        if let Some(key) = row.get(column).and_then(canonical_key) {
            buckets.entry(key).or_default().push(idx);
        }
    }
    buckets
}

/// Output column list plus the (possibly renamed) output name of each right column
fn output_columns(left: &[String], right: &[String]) -> (Vec<String>, Vec<String>) {
    let mut used: HashSet<String> = left.iter().cloned().collect();
    let mut columns = left.to_vec();
    let mut right_names = Vec::with_capacity(right.len());

    for name in right {
        let mut out = name.clone();
        let mut n = 1;
        while used.contains(&out) {
            out = format!("{}_{}", name, n);
            n += 1;
        }
        used.insert(out.clone());
        columns.push(out.clone());
        right_names.push(out);
    }
    (columns, right_names)
}
