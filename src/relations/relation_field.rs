//! Typed view of the nested relation cell of a child record
//!
//! ```json
//! { "parents": [ { "entityType": 67, "entityIds": [1001, 1002] } ] }
//! ```
//!
//! The road data API's own field names (`foreldre`, `type`, `vegobjekter`)
//! are accepted too, and `type` may be either an id or an object with an
//! `id` field. Other keys in the cell (child references, for instance) are
//! ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::table::json_kind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentGroup {
    #[serde(alias = "type", deserialize_with = "entity_type_id")]
    pub entity_type: i64,
    #[serde(alias = "vegobjekter")]
    pub entity_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct RelationsCell {
    #[serde(default, alias = "foreldre")]
    parents: Option<Vec<ParentGroup>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    Parents(Vec<ParentGroup>),
    NoRelation,
}

impl Relation {
    /// Interpret a relation cell.
    ///
    /// A missing cell, `null`, or an object without a parent list is
    /// `NoRelation`. Any other shape is an error describing the problem.
    pub fn from_cell(cell: Option<&Value>) -> Result<Relation, String> {
        match cell {
            None | Some(Value::Null) => Ok(Relation::NoRelation),
            Some(value @ Value::Object(_)) => {
                let parsed: RelationsCell = serde_json::from_value(value.clone())
                    .map_err(|e| format!("invalid relation structure: {}", e))?;
                Ok(match parsed.parents {
                    Some(groups) => Relation::Parents(groups),
                    None => Relation::NoRelation,
                })
            }
            Some(other) => Err(format!(
                "relation cell must be an object, found {}",
                json_kind(other)
            )),
        }
    }

    /// Referenced parent ids across all groups, in order, duplicates kept
    pub fn parent_ids(&self) -> Vec<i64> {
        match self {
            Relation::Parents(groups) => groups
                .iter()
                .flat_map(|g| g.entity_ids.iter().copied())
                .collect(),
            Relation::NoRelation => Vec::new(),
        }
    }
}

fn entity_type_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TypeRef {
        Id(i64),
        Object { id: i64 },
    }

    Ok(match TypeRef::deserialize(deserializer)? {
        TypeRef::Id(id) | TypeRef::Object { id } => id,
    })
}
