use std::fs;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

const PAGE: &str = r#"
[viewport]
width = 800
height = 600

[[elements]]
tag = "article"
class = ["news-card"]

[[elements.children]]
tag = "span"
class = ["news-card__live"]
"#;

fn bin(dir: &TempDir) -> Command {
    let config = dir.path().join("config.toml");
    fs::write(&config, "[logging]\nfilter = \"off\"\n").expect("write config");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fragment-host"));
    cmd.env_remove("RUST_LOG")
        .env_remove("FRAGMENT_HOST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

fn stdout(cmd: &mut Command) -> String {
    let output = cmd.output().expect("run fragment-host");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 stdout")
}

#[test]
fn run_prints_notifications_as_json_lines() {
    let dir = TempDir::new().expect("temp dir");
    let page = dir.path().join("page.toml");
    fs::write(&page, PAGE).expect("write page");

    let out = stdout(bin(&dir).args([
        "run",
        "--page",
        page.to_str().expect("utf-8 path"),
        "--advance-ms",
        "30000",
        "--now",
        "2024-03-05T12:00:00Z",
    ]));

    let events: Vec<String> = out
        .lines()
        .map(|line| {
            let value: Value = serde_json::from_str(line).expect("json line");
            value["event"].as_str().expect("event name").to_string()
        })
        .collect();
    assert_eq!(events, vec!["news-card-ready", "live-content-refresh"]);
}

#[test]
fn breakpoint_command() {
    let dir = TempDir::new().expect("temp dir");
    assert_eq!(stdout(bin(&dir).args(["breakpoint", "800"])).trim(), "md");
    assert_eq!(
        stdout(bin(&dir).args(["breakpoint", "800", "--preset", "navigation"])).trim(),
        "tablet"
    );
}

#[test]
fn relative_time_command() {
    let dir = TempDir::new().expect("temp dir");
    let out = stdout(bin(&dir).args([
        "relative-time",
        "2024-03-05T11:00:00Z",
        "--now",
        "2024-03-05T12:00:00Z",
        "--style",
        "sentence",
    ]));
    assert_eq!(out.trim(), "1 hour ago");
}

#[test]
fn bad_timestamp_exits_with_failure() {
    let dir = TempDir::new().expect("temp dir");
    let output = bin(&dir)
        .args(["relative-time", "not-a-date"])
        .output()
        .expect("run fragment-host");
    assert_eq!(output.status.code(), Some(1));
}
