use linref_join::{JoinError, MultiplicityAnomaly, RelationResolver};
use serde_json::{json, Value};

use super::table;

fn tunnel_child(id: i64, parent_ids: Value) -> Value {
    json!({
        "id": id,
        "objectType": 67,
        "relations": {"parents": [{"entityType": 581, "entityIds": parent_ids}]}
    })
}

#[test]
fn test_both_referenced_parents_found() {
    let parents = table(vec![json!({"id": 1, "name": "A"}), json!({"id": 2, "name": "B"})]);
    let children = table(vec![tunnel_child(100, json!([1, 2]))]);

    let (out, report) = RelationResolver::default()
        .resolve_parents_with_report(&parents, &children, None, None, false)
        .unwrap();

    assert_eq!(out.len(), 2);
    let names: Vec<&Value> = out.rows().iter().map(|r| &r["name"]).collect();
    assert_eq!(names, vec![&json!("A"), &json!("B")]);
    assert!(out.rows().iter().all(|r| r["t67_id"] == json!(100)));
    assert_eq!(
        report.anomalies,
        vec![MultiplicityAnomaly::MultipleParents {
            child_id: json!(100),
            referenced: vec![1, 2],
            matched_rows: 2,
        }]
    );
}

#[test]
fn test_only_one_referenced_parent_exists() {
    let parents = table(vec![json!({"id": 1, "name": "A"})]);
    let children = table(vec![tunnel_child(100, json!([1, 2]))]);

    let (out, report) = RelationResolver::default()
        .resolve_parents_with_report(&parents, &children, None, None, false)
        .unwrap();

    assert_eq!(out.len(), 1);
    let row = &out.rows()[0];
    assert_eq!(row["id"], json!(1));
    assert_eq!(row["name"], json!("A"));
    assert_eq!(row["t67_id"], json!(100));
    assert_eq!(row["t67_objectType"], json!(67));
    assert!(matches!(
        report.anomalies.as_slice(),
        [MultiplicityAnomaly::ReferencedNotFound { missing, .. }] if missing == &vec![2]
    ));
}

#[test]
fn test_child_without_parents_contributes_nothing() {
    let parents = table(vec![json!({"id": 1})]);
    let children = table(vec![
        json!({"id": 100, "objectType": 67, "relations": {"children": [{"entityType": 5, "entityIds": [1]}]}}),
        json!({"id": 101, "objectType": 67, "relations": null}),
        json!({"id": 102, "objectType": 67}),
        tunnel_child(103, json!([1])),
    ]);

    let (out, report) = RelationResolver::default()
        .resolve_parents_with_report(&parents, &children, None, None, false)
        .unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out.rows()[0]["t67_id"], json!(103));
    assert_eq!(report.children_without_relation, 3);
    assert!(report.anomalies.is_empty());
}

#[test]
fn test_duplicate_parent_rows_each_produce_a_row() {
    // Parent object split over two road segments
    let parents = table(vec![
        json!({"id": 1, "segment": 1}),
        json!({"id": 1, "segment": 2}),
    ]);
    let children = table(vec![tunnel_child(100, json!([1]))]);
    let out = RelationResolver::default()
        .resolve_parents(&parents, &children, None, None, false)
        .unwrap();
    assert_eq!(out.len(), 2);
}

#[test]
fn test_parent_and_child_prefixes() {
    let parents = table(vec![json!({"id": 1, "name": "A"})]);
    let children = table(vec![tunnel_child(100, json!([1]))]);

    let out = RelationResolver::default()
        .resolve_parents(&parents, &children, Some("mor_"), Some("datter_"), false)
        .unwrap();
    assert_eq!(out.len(), 1);
    let row = &out.rows()[0];
    assert_eq!(row["mor_id"], json!(1));
    assert_eq!(row["datter_id"], json!(100));

    // Already prefixed inputs are not prefixed again
    let prefixed_parents = parents.with_prefix("mor_");
    let again = RelationResolver::default()
        .resolve_parents(&prefixed_parents, &children, Some("mor_"), Some("datter_"), false)
        .unwrap();
    assert_eq!(again, out);
}

#[test]
fn test_string_parent_ids_do_not_match_numbers() {
    let parents = table(vec![json!({"id": "1"})]);
    let children = table(vec![tunnel_child(100, json!([1]))]);
    let out = RelationResolver::default()
        .resolve_parents(&parents, &children, None, None, false)
        .unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_float_parent_ids_match() {
    let parents = table(vec![json!({"id": 1.0})]);
    let children = table(vec![tunnel_child(100, json!([1]))]);
    let out = RelationResolver::default()
        .resolve_parents(&parents, &children, None, None, false)
        .unwrap();
    assert_eq!(out.len(), 1);
}

#[test]
fn test_missing_parent_id_column() {
    let parents = table(vec![json!({"nvdbId": 1})]);
    let children = table(vec![tunnel_child(100, json!([1]))]);
    let err = RelationResolver::default()
        .resolve_parents(&parents, &children, None, None, false)
        .unwrap_err();
    assert!(matches!(err, JoinError::Configuration { .. }));
    assert!(err.to_string().contains("parent table"));
}

#[test]
fn test_child_prefix_needs_unique_object_type() {
    let parents = table(vec![json!({"id": 1})]);
    let children = table(vec![
        tunnel_child(100, json!([1])),
        json!({"id": 101, "objectType": 68, "relations": null}),
    ]);
    let err = RelationResolver::default()
        .resolve_parents(&parents, &children, None, None, false)
        .unwrap_err();
    assert!(matches!(err, JoinError::Configuration { .. }));

    // Skipping the child prefix needs no object type at all
    let out = RelationResolver::default()
        .resolve_parents(&parents, &children, Some("p_"), None, true)
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out.rows()[0]["p_id"], json!(1));
    assert_eq!(out.rows()[0]["id"], json!(100));
}

#[test]
fn test_repeated_parent_reference_produces_a_row_each_time() {
    let parents = table(vec![json!({"id": 1, "name": "A"})]);
    let children = table(vec![tunnel_child(100, json!([1, 1]))]);

    let (out, report) = RelationResolver::default()
        .resolve_parents_with_report(&parents, &children, None, None, false)
        .unwrap();

    assert_eq!(out.len(), 2);
    assert!(out.rows().iter().all(|r| r["name"] == json!("A")));
    assert_eq!(
        report.anomalies,
        vec![MultiplicityAnomaly::MultipleParents {
            child_id: json!(100),
            referenced: vec![1, 1],
            matched_rows: 2,
        }]
    );
}
