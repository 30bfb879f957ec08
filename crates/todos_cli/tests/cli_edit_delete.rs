use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("todos-{nanos}-{file_name}"))
}

fn write_store(path: &Path, tasks: serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(&tasks).unwrap()).unwrap();
}

fn todos(store_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_todos"))
        .args(args)
        .env("TODOS_STORE_PATH", store_path)
        .env("TODOS_CONFIG_PATH", store_path.with_extension("config.json"))
        .output()
        .expect("failed to run todos")
}

fn two_tasks() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 1,
            "task": "old",
            "status": "Not Started",
            "priority": "Low",
            "assignedTo": ""
        },
        {
            "id": 2,
            "task": "other",
            "status": "In Progress",
            "priority": "High",
            "assignedTo": "sam",
            "dependsOn": [1]
        }
    ])
}

#[test]
fn edit_command_updates_title() {
    let store_path = temp_path("cli-edit.json");
    write_store(&store_path, two_tasks());

    let output = todos(&store_path, &["edit", "1:new title: with colon"]);

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Updated task:"));
    assert_eq!(stored[0]["task"], "new title: with colon");
    assert_eq!(stored[1], two_tasks()[1]);
}

#[test]
fn edit_command_rejects_missing_separator() {
    let store_path = temp_path("cli-edit-format.json");
    write_store(&store_path, two_tasks());

    let output = todos(&store_path, &["edit", "1 new title"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_format"));
}

#[test]
fn edit_command_reports_missing_id() {
    let store_path = temp_path("cli-edit-missing.json");
    write_store(&store_path, two_tasks());

    let output = todos(&store_path, &["edit", "9:new title"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: not_found - task 9 not found"));
}

#[test]
fn delete_command_removes_task_and_keeps_dependents() {
    let store_path = temp_path("cli-delete.json");
    write_store(&store_path, two_tasks());

    let output = todos(&store_path, &["delete", "1"]);

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Deleted task: old (1)"));

    let remaining = stored.as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["id"], 2);
    assert_eq!(remaining[0]["dependsOn"], serde_json::json!([1]));
}

#[test]
fn del_alias_deletes() {
    let store_path = temp_path("cli-del.json");
    write_store(&store_path, two_tasks());

    let output = todos(&store_path, &["--json", "del", "2"]);

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    assert_eq!(parsed["id"], 2);
    assert_eq!(parsed["task"], "other");
    assert_eq!(stored.as_array().unwrap().len(), 1);
}

#[test]
fn delete_command_missing_id_leaves_store_unchanged() {
    let store_path = temp_path("cli-delete-missing.json");
    write_store(&store_path, two_tasks());
    let before = std::fs::read_to_string(&store_path).unwrap();

    let output = todos(&store_path, &["delete", "7"]);
    let after = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: not_found"));
    assert_eq!(before, after);
}

#[test]
fn delete_command_rejects_non_numeric_id() {
    let store_path = temp_path("cli-delete-bad-id.json");
    write_store(&store_path, two_tasks());

    let output = todos(&store_path, &["delete", "abc"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_format"));
}
