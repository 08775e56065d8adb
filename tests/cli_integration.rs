//! Integration tests for the `tf` CLI.
//!
//! Each test points `tf` at a temp data directory with `-C`, runs it as a
//! subprocess, and checks stdout and/or the files it leaves behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::Value;

/// Get the path to the built `tf` binary.
fn tf_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tf");
    path
}

fn tf_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(tf_bin());
    cmd.arg("-C")
        .arg(dir)
        .args(args)
        .env_remove("TASKFLOW_DIR")
        .env_remove("TASKFLOW_LOG");
    cmd
}

/// Run `tf` against the given data directory, returning (stdout, stderr, success).
fn run_tf(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = tf_command(dir, args).output().expect("failed to run tf");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tf` expecting success, return stdout.
fn run_tf_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tf(dir, args);
    if !success {
        panic!(
            "tf {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `tf` expecting failure, return stderr.
fn run_tf_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tf(dir, args);
    if success {
        panic!("tf {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

fn run_tf_json(dir: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let out = run_tf_ok(dir, &full);
    serde_json::from_str(&out).unwrap_or_else(|e| panic!("bad JSON from {:?}: {}\n{}", args, e, out))
}

/// Capture a task and return its ID.
fn capture(dir: &Path, text: &str) -> String {
    let task = run_tf_json(dir, &["capture", text]);
    task["id"].as_str().unwrap().to_string()
}

fn now_id(dir: &Path) -> Option<String> {
    let view = run_tf_json(dir, &["dashboard"]);
    view["now_task"]["id"].as_str().map(String::from)
}

fn stored_tasks(dir: &Path) -> Vec<Value> {
    let text = fs::read_to_string(dir.join("tasks.json")).unwrap();
    let stored: Value = serde_json::from_str(&text).unwrap();
    stored["tasks"].as_array().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Setup and reads
// ---------------------------------------------------------------------------

#[test]
fn test_init_writes_config_once() {
    let tmp = tempfile::TempDir::new().unwrap();
    let dir = tmp.path().join("data");

    let out = run_tf_ok(&dir, &["init"]);
    assert!(out.contains("initialized taskflow"));
    let config = fs::read_to_string(dir.join("taskflow.toml")).unwrap();
    assert!(config.contains("[review]"));

    let out = run_tf_ok(&dir, &["init"]);
    assert!(out.contains("already initialized"));
}

#[test]
fn test_empty_dashboard() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_tf_ok(tmp.path(), &[]);
    assert!(out.contains("(nothing active)"));
    assert!(out.contains("== Next (0) =="));

    let view = run_tf_json(tmp.path(), &["dashboard"]);
    assert!(view["now_task"].is_null());
    assert_eq!(view["next_tasks"].as_array().unwrap().len(), 0);
}

#[test]
fn test_capture_parses_fields() {
    let tmp = tempfile::TempDir::new().unwrap();
    let task = run_tf_json(tmp.path(), &["capture", "Call", "mom", "@phone", "tomorrow", "#family"]);
    assert_eq!(task["title"], "Call mom");
    assert_eq!(task["context"], "phone");
    assert_eq!(task["tags"][0], "family");
    assert_eq!(task["status"], "next");
    assert_eq!(task["source"], "quick_capture");
    assert_eq!(task["original_input"], "Call mom @phone tomorrow #family");
    assert!(task["scheduled_for"].is_i64());

    let out = run_tf_ok(tmp.path(), &["dashboard"]);
    assert!(out.contains("Call mom @phone #family (due "));
}

#[test]
fn test_blank_capture_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_tf_err(tmp.path(), &["capture", "   "]);
    assert!(err.contains("nothing to capture"));
    assert!(!tmp.path().join("tasks.json").exists());
}

#[test]
fn test_next_queue_oldest_first() {
    let tmp = tempfile::TempDir::new().unwrap();
    let first = capture(tmp.path(), "First");
    let second = capture(tmp.path(), "Second");

    let view = run_tf_json(tmp.path(), &["dashboard"]);
    let ids: Vec<&str> = view["next_tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[test]
fn test_start_and_complete() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = capture(tmp.path(), "Write report");

    let out = run_tf_ok(tmp.path(), &["start", &id[..8]]);
    assert!(out.starts_with("started [>]"));
    assert_eq!(now_id(tmp.path()).as_deref(), Some(id.as_str()));

    let done = run_tf_json(tmp.path(), &["done", &id]);
    assert_eq!(done["status"], "done");
    assert!(done["completed_at"].is_i64());
    assert_eq!(now_id(tmp.path()), None);

    // Done tasks are hidden from the dashboard but still listed
    let list = run_tf_json(tmp.path(), &["list", "--status", "done"]);
    assert_eq!(list["tasks"].as_array().unwrap().len(), 1);
}

#[test]
fn test_switch_requires_confirmation_without_tty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let a = capture(tmp.path(), "Task A");
    let b = capture(tmp.path(), "Task B");
    run_tf_ok(tmp.path(), &["start", &a]);

    let err = run_tf_err(tmp.path(), &["start", &b]);
    assert!(err.contains("pass --yes"));
    assert_eq!(now_id(tmp.path()).as_deref(), Some(a.as_str()));

    run_tf_ok(tmp.path(), &["start", &b, "--yes"]);
    assert_eq!(now_id(tmp.path()).as_deref(), Some(b.as_str()));

    let tasks = stored_tasks(tmp.path());
    let active = tasks.iter().filter(|t| t["status"] == "now").count();
    assert_eq!(active, 1);
    let demoted = tasks.iter().find(|t| t["id"] == a.as_str()).unwrap();
    assert_eq!(demoted["status"], "next");
}

#[test]
fn test_status_now_requires_confirmation_without_tty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let a = capture(tmp.path(), "Task A");
    let b = capture(tmp.path(), "Task B");
    run_tf_ok(tmp.path(), &["start", &a]);

    let err = run_tf_err(tmp.path(), &["status", &b, "now"]);
    assert!(err.contains("pass --yes"));
    assert_eq!(now_id(tmp.path()).as_deref(), Some(a.as_str()));

    let out = run_tf_ok(tmp.path(), &["status", &b, "now", "--yes"]);
    assert!(out.starts_with("started"));
    assert_eq!(now_id(tmp.path()).as_deref(), Some(b.as_str()));
}

#[test]
fn test_starting_the_active_task_is_a_no_op() {
    let tmp = tempfile::TempDir::new().unwrap();
    let a = capture(tmp.path(), "Task A");
    run_tf_ok(tmp.path(), &["start", &a]);
    let before = stored_tasks(tmp.path())[0]["sync_version"].as_u64().unwrap();

    let out = run_tf_ok(tmp.path(), &["start", &a]);
    assert!(out.starts_with("already active"));
    assert_eq!(
        stored_tasks(tmp.path())[0]["sync_version"].as_u64().unwrap(),
        before
    );
}

#[test]
fn test_reject_policy_refuses_switch() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("taskflow.toml"),
        "[store]\non_switch = \"reject\"\n",
    )
    .unwrap();
    let a = capture(tmp.path(), "Task A");
    let b = capture(tmp.path(), "Task B");
    run_tf_ok(tmp.path(), &["start", &a]);

    run_tf_err(tmp.path(), &["start", &b, "--yes"]);
    assert_eq!(now_id(tmp.path()).as_deref(), Some(a.as_str()));
}

#[test]
fn test_done_is_terminal() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = capture(tmp.path(), "Finish me");
    run_tf_ok(tmp.path(), &["done", &id]);

    run_tf_err(tmp.path(), &["start", &id, "--yes"]);
    run_tf_err(tmp.path(), &["defer", &id]);
    let tasks = stored_tasks(tmp.path());
    assert_eq!(tasks[0]["status"], "done");
}

#[test]
fn test_defer_and_status() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = capture(tmp.path(), "Wait for reply");

    run_tf_ok(tmp.path(), &["defer", &id]);
    let view = run_tf_json(tmp.path(), &["dashboard"]);
    assert_eq!(view["waiting_tasks"][0]["id"], id.as_str());

    run_tf_ok(tmp.path(), &["status", &id, "someday"]);
    let view = run_tf_json(tmp.path(), &["dashboard"]);
    assert_eq!(view["waiting_tasks"].as_array().unwrap().len(), 0);

    let err = run_tf_err(tmp.path(), &["status", &id, "later"]);
    assert!(err.contains("unknown status"));
}

#[test]
fn test_rename_keeps_id_and_bumps_version() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = capture(tmp.path(), "Draft");
    let before = stored_tasks(tmp.path())[0]["sync_version"].as_u64().unwrap();

    let task = run_tf_json(tmp.path(), &["rename", &id, "Final", "draft"]);
    assert_eq!(task["id"], id.as_str());
    assert_eq!(task["title"], "Final draft");
    assert_eq!(task["original_input"], "Draft");
    assert_eq!(task["sync_version"].as_u64().unwrap(), before + 1);
}

#[test]
fn test_delete() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = capture(tmp.path(), "Throwaway");
    let out = run_tf_ok(tmp.path(), &["delete", &id]);
    assert!(out.contains("deleted"));
    assert!(stored_tasks(tmp.path()).is_empty());

    let err = run_tf_err(tmp.path(), &["delete", &id]);
    assert!(err.contains("no task matching"));
}

#[test]
fn test_review_resets_countdown() {
    let tmp = tempfile::TempDir::new().unwrap();
    let view = run_tf_json(tmp.path(), &["dashboard"]);
    assert!(view["review_due_in_days"].as_i64().unwrap() < 0);

    let out = run_tf_json(tmp.path(), &["review"]);
    assert_eq!(out["review_due_in_days"], 7);
    let config = fs::read_to_string(tmp.path().join("taskflow.toml")).unwrap();
    assert!(config.contains("last_review_at"));
}

#[test]
fn test_corrupt_store_is_reported() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("tasks.json"), "{ not json").unwrap();
    let err = run_tf_err(tmp.path(), &["dashboard"]);
    assert!(err.starts_with("error:"));
    assert!(err.contains("tasks.json"));
}

// ---------------------------------------------------------------------------
// Wire protocol
// ---------------------------------------------------------------------------

#[test]
fn test_serve_answers_one_line_per_request() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut child = tf_command(tmp.path(), &["serve"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run tf serve");

    {
        let stdin = child.stdin.as_mut().unwrap();
        writeln!(stdin, r#"{{"cmd":"quick_capture","title":"Served task"}}"#).unwrap();
        writeln!(stdin, r#"{{"cmd":"get_dashboard_data"}}"#).unwrap();
        writeln!(stdin, r#"{{"cmd":"launch_rockets"}}"#).unwrap();
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let replies: Vec<Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0]["ok"], true);
    assert_eq!(replies[1]["ok"], true);
    assert_eq!(replies[1]["data"]["next_tasks"][0]["title"], "Served task");
    assert_eq!(replies[2]["ok"], false);
    assert!(replies[2]["error"].is_string());
}
