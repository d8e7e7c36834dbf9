use std::process::Command;

fn switchyard(args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_switchyard");
    Command::new(exe)
        .args(args)
        .env_remove("SWITCHYARD_NOT_FOUND_BODY")
        .output()
        .unwrap()
}

#[test]
fn test_cli_routes_lists_demo_routes() {
    let output = switchyard(&["routes"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("GET /quotes/:id"));
    assert!(stdout.contains("POST /quotes"));
}

#[test]
fn test_cli_request_prints_response() {
    let output = switchyard(&["request", "get", "/quotes/1"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("HTTP 200 OK"));
    assert!(stdout.contains("Alan Kay"));
}

#[test]
fn test_cli_request_json_with_session() {
    let output = switchyard(&["request", "GET", "/get_value", "--session", "msg=hello", "--json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], 200);
    assert_eq!(value["body"], "hello");
    assert_eq!(value["session"]["msg"], "hello");
}

#[test]
fn test_cli_rejects_bad_method() {
    let output = switchyard(&["request", "G E T", "/"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parsing request"), "stderr: {stderr}");
}

#[test]
fn test_cli_rejects_malformed_form_field() {
    let output = switchyard(&["request", "POST", "/quotes", "--form", "oops"]);
    assert!(!output.status.success());
}
