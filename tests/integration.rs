//! End-to-end integration tests for the workflow CLI
//!
//! These tests run the built `stepci-cli` binary against the `mock-runner`
//! engine and verify:
//! 1. Input resolution (path, argument, stdin)
//! 2. Secrets/env plumbing into the engine
//! 3. JSON and human-readable reports and exit codes

use serde_json::Value;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Test context with paths and cleanup
struct TestContext {
    /// Temporary directory for this test
    temp_dir: PathBuf,
    /// Config file passed through STEPCI_CLI_CONFIG
    config_path: PathBuf,
}

impl TestContext {
    /// Create a new test context using the mock engine
    fn new(test_name: &str) -> Self {
        let ctx = Self::bare(test_name);
        ctx.create_config(env!("CARGO_BIN_EXE_mock-runner"));
        ctx
    }

    /// Create a test context without any config file
    fn bare(test_name: &str) -> Self {
        let temp_dir = env::temp_dir().join("stepci-cli-tests").join(test_name);

        // Clean up any previous test artifacts
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).expect("Failed to create temp dir");

        let config_path = temp_dir.join("config.toml");
        Self {
            temp_dir,
            config_path,
        }
    }

    /// Create a config file for the test
    fn create_config(&self, engine_path: &str) {
        let config_content = format!(
            r#"
[engine]
command = "{engine_path}"
args = []
"#,
            engine_path = engine_path.replace('\\', "\\\\"),
        );
        fs::write(&self.config_path, config_content).expect("Failed to write config");
    }

    /// Write a file into the test directory
    fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.join(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Run the CLI with the given arguments and stdin
    fn run_cli(&self, args: &[&str], stdin: &str) -> CliOutput {
        let mut child = Command::new(env!("CARGO_BIN_EXE_stepci-cli"))
            .args(args)
            .env("STEPCI_CLI_CONFIG", &self.config_path)
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to run stepci-cli");

        child
            .stdin
            .take()
            .expect("Failed to open stdin")
            .write_all(stdin.as_bytes())
            .expect("Failed to write stdin");

        let output = child.wait_with_output().expect("Failed to wait for stepci-cli");

        CliOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        }
    }

    /// Run the CLI expecting a JSON report on stdout
    fn run_json(&self, args: &[&str], stdin: &str) -> (Value, CliOutput) {
        let output = self.run_cli(args, stdin);
        let report: Value = serde_json::from_str(&output.stdout).unwrap_or_else(|e| {
            panic!(
                "Expected JSON report ({}):\nstdout: {}\nstderr: {}",
                e, output.stdout, output.stderr
            )
        });
        (report, output)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.temp_dir);
    }
}

/// Output from a CLI run
#[derive(Debug)]
struct CliOutput {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

const STATUS_MISMATCH: &str = r#"
version: "1.1"
name: Status check
tests:
  health:
    steps:
      - name: Get health
        http:
          url: http://localhost/health
          method: GET
          check:
            status: 200
        mock:
          status: 404
          statusText: Not Found
          headers:
            Content-Type: application/json
          body: '{"error":"not found"}'
"#;

const CAPTURING: &str = r#"
version: "1.1"
env:
  host: localhost
tests:
  login:
    steps:
      - name: Sign in
        http:
          url: "http://${{ env.host }}/login"
          method: POST
          check:
            status: 200
          captures:
            token: "${{ secrets.token }}"
            host: "${{ env.host }}"
"#;

fn messages(report: &Value) -> Vec<String> {
    report["messages"]
        .as_array()
        .expect("messages array")
        .iter()
        .map(|m| m.as_str().unwrap_or_default().to_string())
        .collect()
}

// ============== Tests ==============

#[test]
fn test_no_input() {
    let ctx = TestContext::new("no_input");
    let (report, output) = ctx.run_json(&[], "   \n");

    assert_eq!(output.code, Some(1));
    assert_eq!(report["passed"], Value::Bool(false));
    let error = &report["errors"][0];
    assert!(
        error["message"].as_str().unwrap().contains("No input provided"),
        "Unexpected error: {}",
        error
    );
    assert!(error.get("stack").is_none());
}

#[test]
fn test_status_mismatch_from_argument() {
    let ctx = TestContext::new("status_mismatch");
    let (report, output) = ctx.run_json(&[STATUS_MISMATCH], "");

    assert_eq!(output.code, Some(1));
    assert_eq!(report["passed"], Value::Bool(false));

    let messages = messages(&report);
    assert!(messages.contains(&"🔴 Step Failed: Get health".to_string()));
    assert!(messages.contains(&"  🌍 URL: http://localhost/health".to_string()));
    assert!(
        messages.contains(&"    - status: Expected 200 Got 404".to_string()),
        "Missing status failure in {:?}",
        messages
    );
    assert!(messages.contains(&"    - Status: 404 Not Found".to_string()));
    assert!(messages.contains(&"    - Body (JSON):\n{\n  \"error\": \"not found\"\n}".to_string()));
    assert_eq!(report["tests"][0]["steps"][0]["passed"], Value::Bool(false));
}

#[test]
fn test_captures_from_stdin_with_secrets() {
    let ctx = TestContext::new("captures_stdin");
    let (report, output) = ctx.run_json(&["-s", r#"{"token": "s3cr3t"}"#], CAPTURING);

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert_eq!(report["passed"], Value::Bool(true));
    assert_eq!(
        report["captures"],
        serde_json::json!({"token": "s3cr3t", "host": "localhost"})
    );
    assert!(report["errors"].as_array().unwrap().is_empty());
}

#[test]
fn test_path_flag_with_env_file() {
    let ctx = TestContext::new("path_env_file");
    let workflow = ctx.write_file("workflow.yml", CAPTURING);
    let env_file = ctx.write_file("env.json", r#"{"host": "api.internal"}"#);

    let (report, output) = ctx.run_json(
        &[
            "--path",
            workflow.to_str().unwrap(),
            "--env",
            env_file.to_str().unwrap(),
            "ignored: positional",
        ],
        "",
    );

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert_eq!(report["captures"]["host"], Value::from("api.internal"));
    assert_eq!(report["captures"]["token"], Value::from(""));
}

#[test]
fn test_empty_path_reads_stdin() {
    let ctx = TestContext::new("empty_path");
    let (report, output) = ctx.run_json(&["--path", ""], STATUS_MISMATCH);

    assert_eq!(output.code, Some(1));
    assert!(messages(&report).contains(&"🔴 Step Failed: Get health".to_string()));
}

#[test]
fn test_missing_workflow_file_is_reported() {
    let ctx = TestContext::new("missing_file");
    let missing = ctx.temp_dir.join("nope.yml");
    let (report, output) = ctx.run_json(&["-p", missing.to_str().unwrap()], "");

    assert_eq!(output.code, Some(1));
    let error = &report["errors"][0];
    assert!(error["message"].as_str().unwrap().contains("ENOENT"));
    assert!(error["stack"].as_str().unwrap().contains("mockRunner"));
}

#[test]
fn test_passed_without_tests() {
    let ctx = TestContext::new("no_tests");
    let (report, output) = ctx.run_json(&["version: \"1.1\"\ntests: {}"], "");

    assert_eq!(output.code, Some(0));
    assert_eq!(report["passed"], Value::Bool(true));
    assert_eq!(report["captures"], serde_json::json!({}));
    assert!(messages(&report)[0].contains("no tests were executed"));
}

#[test]
fn test_last_test_without_steps() {
    let ctx = TestContext::new("no_steps");
    let (report, output) = ctx.run_json(&["tests:\n  empty:\n    steps: []\n"], "");

    assert_eq!(output.code, Some(1));
    assert_eq!(report["passed"], Value::Bool(false));
    assert!(report["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("No steps found"));
}

#[test]
fn test_engine_exception() {
    let ctx = TestContext::new("engine_exception");
    let (report, output) = ctx.run_json(&["error: Workflow schema is invalid"], "");

    assert_eq!(output.code, Some(1));
    assert_eq!(report["errors"][0]["message"], Value::from("Workflow schema is invalid"));
    assert!(report["errors"][0]["stack"].is_string());
}

#[test]
fn test_engine_crash() {
    let ctx = TestContext::new("engine_crash");
    let (report, output) = ctx.run_json(&["exit: 7"], "");

    assert_eq!(output.code, Some(1));
    assert!(report["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("exit code 7"));
}

#[test]
fn test_engine_not_found() {
    let ctx = TestContext::bare("engine_not_found");
    ctx.create_config("/nonexistent/stepci-runner");
    let (report, output) = ctx.run_json(&["tests: {}"], "");

    assert_eq!(output.code, Some(1));
    assert!(report["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("not found"));
}

#[test]
fn test_bad_secret_is_fatal() {
    let ctx = TestContext::new("bad_secret");
    let output = ctx.run_cli(&["-s", "{not json", "tests: {}"], "");

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.trim().is_empty(), "stdout: {}", output.stdout);
    assert!(
        output.stderr.contains("Error: Invalid --secret value"),
        "stderr: {}",
        output.stderr
    );
}

#[test]
fn test_human_readable_failure() {
    let ctx = TestContext::new("human_failure");
    let output = ctx.run_cli(&["-h", STATUS_MISMATCH], "");

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("WORKFLOW FAILED"), "stdout: {}", output.stdout);
    assert!(output.stdout.contains("Tests:"));
    assert!(output.stdout.contains("Steps:"));
    assert!(output.stdout.contains("    - status: Expected 200 Got 404"));
    assert!(serde_json::from_str::<Value>(&output.stdout).is_err());
}

#[test]
fn test_human_readable_captures() {
    let ctx = TestContext::new("human_captures");
    let output = ctx.run_cli(
        &["--human-readable", "--secret", r#"{"token": "abc"}"#],
        CAPTURING,
    );

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("WORKFLOW PASSED"));
    assert!(output.stdout.contains("Captures:"));
    assert!(output.stdout.contains(": abc"));
}

#[test]
fn test_config_default_human_readable() {
    let ctx = TestContext::new("config_human");
    let config = fs::read_to_string(&ctx.config_path).unwrap();
    fs::write(
        &ctx.config_path,
        format!("{}\n[output]\nhuman_readable = true\n", config),
    )
    .unwrap();

    let output = ctx.run_cli(&["tests: {}"], "");
    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("WORKFLOW PASSED"));
}

#[test]
fn test_help_flag() {
    let ctx = TestContext::bare("help");
    let output = ctx.run_cli(&["--help"], "");

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("--human-readable"));
    assert!(output.stdout.contains("--secret"));
    assert!(Path::new(env!("CARGO_BIN_EXE_mock-runner")).exists());
}
