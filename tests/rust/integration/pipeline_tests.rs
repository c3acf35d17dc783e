use std::io::Write;

use linref_join::{
    sink, IntervalJoinEngine, JoinConfig, JoinType, RelationResolver, Table,
};
use serde_json::json;

use super::table;

fn tunnels() -> Table {
    table(vec![
        json!({"id": 1, "objectType": 67, "linkSequenceId": 10, "start": 0.1, "end": 0.4}),
        json!({"id": 1, "objectType": 67, "linkSequenceId": 11, "start": 0.0, "end": 0.2}),
        json!({"id": 2, "objectType": 67, "linkSequenceId": 20, "start": 0.5, "end": 0.9}),
    ])
}

fn speed_limits() -> Table {
    table(vec![
        json!({"id": 500, "objectType": 105, "linkSequenceId": 10, "start": 0.0, "end": 0.3, "value": 80}),
        json!({"id": 501, "objectType": 105, "linkSequenceId": 10, "start": 0.3, "end": 1.0, "value": 60}),
        json!({"id": 502, "objectType": 105, "linkSequenceId": 11, "start": 0.0, "end": 1.0, "value": 70}),
    ])
}

fn traffic() -> Table {
    table(vec![
        json!({"id": 900, "objectType": 540, "linkSequenceId": 10, "start": 0.0, "end": 1.0, "aadt": 12000}),
        json!({"id": 901, "objectType": 540, "linkSequenceId": 20, "start": 0.0, "end": 1.0, "aadt": 3000}),
    ])
}

#[test]
fn test_chained_overlap_joins_keep_namespaces_apart() {
    let engine = IntervalJoinEngine::default();

    let with_speed = engine
        .join(&tunnels(), &speed_limits(), None, None, JoinType::Inner)
        .unwrap();
    // Tunnel 1 on link 10 hits both speed limits, on link 11 the third one
    assert_eq!(with_speed.len(), 3);

    let with_traffic = engine
        .join(&with_speed, &traffic(), None, None, JoinType::Inner)
        .unwrap();
    assert_eq!(with_traffic.len(), 2);
    for column in ["id", "t105_id", "t105_value", "t540_aadt"] {
        assert!(with_traffic.has_column(column), "missing {}", column);
    }
    assert!(with_traffic
        .rows()
        .iter()
        .all(|r| r["t540_aadt"] == json!(12000)));

    // One row per tunnel object
    let per_tunnel = with_speed.deduplicate_on("id").unwrap();
    assert_eq!(per_tunnel.len(), 1);
}

#[test]
fn test_left_join_then_resolve_parents() {
    let engine = IntervalJoinEngine::default();
    let overlaps = engine
        .join(&tunnels(), &traffic(), None, None, JoinType::Left)
        .unwrap();
    assert_eq!(overlaps.len(), 3);

    let tunnel_parts = table(vec![json!({
        "id": 7000,
        "objectType": 581,
        "relations": {"parents": [{"entityType": 67, "entityIds": [2]}]}
    })]);
    let resolved = RelationResolver::default()
        .resolve_parents(&overlaps, &tunnel_parts, None, None, false)
        .unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved.rows()[0]["t540_aadt"], json!(3000));
    assert_eq!(resolved.rows()[0]["t581_id"], json!(7000));
}

#[test]
fn test_config_file_with_custom_column_names() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
columns:
  link_sequence_id: veglenkesekvensid
  start_position: startposisjon
  end_position: sluttposisjon
  relative_position: relativPosisjon
  id: nvdbId
  object_type: objekttype
  relations: relasjoner
join_type: left
"#
    )
    .unwrap();

    let config = JoinConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.join_type, JoinType::Left);

    let left = table(vec![
        json!({"nvdbId": 1, "veglenkesekvensid": 5, "startposisjon": 0.0, "sluttposisjon": 0.5}),
    ]);
    let right = table(vec![
        json!({"nvdbId": 2, "objekttype": 95, "veglenkesekvensid": 5, "relativPosisjon": 0.25}),
    ]);
    let out = IntervalJoinEngine::from_config(&config)
        .join(&left, &right, None, None, config.join_type)
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out.rows()[0]["t95_nvdbId"], json!(2));
}

#[test]
fn test_joined_output_written_as_json() {
    let out = IntervalJoinEngine::default()
        .join(&tunnels(), &speed_limits(), None, None, JoinType::Inner)
        .unwrap();
    let mut buf = Vec::new();
    sink::write_json(&out, &mut buf).unwrap();

    let reread = Table::from_json_reader(buf.as_slice()).unwrap();
    assert_eq!(reread.len(), out.len());
    assert_eq!(reread.columns(), out.columns());
}
