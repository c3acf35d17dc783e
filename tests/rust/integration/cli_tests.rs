use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::{json, Value};

fn write_json(dir: &Path, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_linref-join"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("binary runs")
}

#[test]
fn test_overlap_command_writes_joined_records() {
    let dir = tempfile::tempdir().unwrap();
    let left = write_json(
        dir.path(),
        "left.json",
        &json!([{"id": 1, "linkSequenceId": 10, "start": 0.0, "end": 0.5}]),
    );
    let right = write_json(
        dir.path(),
        "right.json",
        &json!([
            {"linkSequenceId": 10, "start": 0.4, "end": 0.6, "objectType": 105},
            {"linkSequenceId": 10, "start": 0.5, "end": 0.8, "objectType": 105}
        ]),
    );
    let output = dir.path().join("out.json");

    let result = run(&[
        "overlap",
        "--left",
        left.to_str().unwrap(),
        "--right",
        right.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let joined: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let rows = joined.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["t105_start"], json!(0.4));
}

#[test]
fn test_parents_command_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let parents = write_json(dir.path(), "parents.json", &json!([{"id": 1, "name": "A"}]));
    let children = write_json(
        dir.path(),
        "children.json",
        &json!([{
            "id": 100,
            "objectType": 67,
            "relations": {"parents": [{"entityType": 1, "entityIds": [1, 2]}]}
        }]),
    );

    let result = run(&[
        "parents",
        "--parents",
        parents.to_str().unwrap(),
        "--children",
        children.to_str().unwrap(),
    ]);
    assert!(result.status.success());

    let rows: Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["name"], json!("A"));
}

#[test]
fn test_configuration_error_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let left = write_json(dir.path(), "left.json", &json!([{"linkSequenceId": 10}]));
    let right = write_json(
        dir.path(),
        "right.json",
        &json!([{"linkSequenceId": 10, "start": 0.0, "end": 1.0, "objectType": 105}]),
    );

    let result = run(&[
        "overlap",
        "--left",
        left.to_str().unwrap(),
        "--right",
        right.to_str().unwrap(),
        "--join",
        "left",
    ]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Configuration error"));
}

#[test]
fn test_unknown_join_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let table = write_json(
        dir.path(),
        "t.json",
        &json!([{"linkSequenceId": 10, "start": 0.0, "end": 1.0, "objectType": 105}]),
    );
    let path = table.to_str().unwrap();

    let result = run(&["overlap", "--left", path, "--right", path, "--join", "sideways"]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("sideways"));
}
