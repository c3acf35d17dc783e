use serde::{Deserialize, Serialize};

use crate::table::Row;

/// Which side wins when parent and child rows share a field name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    #[default]
    PreferChild,
    PreferParent,
}

/// Union of the fields of `parent` and `child`.
///
/// Parent fields keep their positions; child-only fields are appended in
/// child order. Colliding fields take the value chosen by `policy`.
pub fn merge_rows(parent: &Row, child: &Row, policy: MergePolicy) -> Row {
    let mut merged = parent.clone();
    for (key, value) in child {
        match policy {
            MergePolicy::PreferChild => {
                merged.insert(key.clone(), value.clone());
            }
            MergePolicy::PreferParent => {
                if !merged.contains_key(key) {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
    }
    merged
}
