//! CLI Bridge Tests
//!
//! Exit codes: 0 allowed, 2 publish denied, 1 error.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

fn create_policy_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{ "post": {{ "width": 100, "height": 100 }} }}"#).unwrap();
    file
}

fn run(policies: &NamedTempFile, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_featured-image-guard"))
        .arg("--policies")
        .arg(policies.path())
        .args(args)
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn evaluate_allowed_exits_zero() {
    let policies = create_policy_file();
    let output = run(&policies, &["evaluate", "--post-type", "post", "--image", r#"{"width": 640, "height": 480}"#]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_json(&output)["outcome"], "allowed");
}

#[test]
fn evaluate_untracked_type_without_image_exits_zero() {
    let policies = create_policy_file();
    let output = run(&policies, &["evaluate", "--post-type", "page"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn evaluate_rejected_exits_two() {
    let policies = create_policy_file();

    let output = run(&policies, &["evaluate", "--post-type", "post"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout_json(&output)["outcome"], "rejected_no_image");

    let output = run(&policies, &["evaluate", "--post-type", "post", "--image", r#"{"width": 99, "height": 100}"#]);
    assert_eq!(output.status.code(), Some(2));
    let result = stdout_json(&output);
    assert_eq!(result["outcome"], "rejected_wrong_size");
    assert_eq!(result["policy"]["width"], 100);
}

#[test]
fn invalid_image_json_exits_one() {
    let policies = create_policy_file();
    let output = run(&policies, &["evaluate", "--post-type", "post", "--image", "{ not json"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_json(&output)["error"].as_str().unwrap().contains("Invalid image metadata"));
}

#[test]
fn invalid_policy_file_exits_one() {
    let mut policies = NamedTempFile::new().unwrap();
    write!(policies, r#"{{ "post": {{ "width": "wide" }} }}"#).unwrap();

    let output = run(&policies, &["policies"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn policies_lists_forced_types() {
    let policies = create_policy_file();
    let output = run(&policies, &["policies"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_json(&output)["post"]["height"], 100);
}

#[test]
fn notice_renders_and_rejects_unknown_codes() {
    let policies = create_policy_file();

    let output = run(&policies, &["notice", "--post-type", "post", "--reason", "wrong-size"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_json(&output)["summary"], "doesn't respect the image dimension: 100px × 100px");

    let output = run(&policies, &["notice", "--post-type", "post", "--reason", "blurry"]);
    assert_eq!(output.status.code(), Some(1));
}
