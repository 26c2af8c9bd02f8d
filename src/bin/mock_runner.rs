//! Mock workflow engine for integration testing
//!
//! Speaks the engine protocol on stdin/stdout without making any HTTP
//! calls. Each step declares the response it "receives" under `mock:`, and
//! the step's `check:` block is evaluated against that response:
//!
//! ```yaml
//! version: "1.1"
//! env:
//!   host: localhost
//! tests:
//!   health:
//!     steps:
//!       - name: Get health
//!         http:
//!           url: http://${{ env.host }}/health
//!           method: GET
//!           check:
//!             status: 200
//!           captures:
//!             token: ${{ secrets.token }}
//!         mock:
//!           status: 404
//!           statusText: Not Found
//! ```
//!
//! A top-level `error:` makes the engine report an exception, and `exit:`
//! makes it exit with that code without answering.

use serde_json::{json, Map, Value};
use serde_yaml::Value as Yaml;
use std::collections::BTreeMap;
use std::io::{Read, Write};

type Vars = BTreeMap<String, String>;

fn main() {
    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        std::process::exit(2);
    }

    let response = match handle_request(&input) {
        Ok(response) => response,
        Err(Failure::Exit(code)) => std::process::exit(code),
        Err(Failure::Error(message)) => json!({
            "error": {
                "message": message,
                "stack": format!("Error: {}\n    at mockRunner (mock_runner.rs)", message),
            }
        }),
    };

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    if let Ok(text) = serde_json::to_string(&response) {
        writer.write_all(text.as_bytes()).ok();
    }
    writer.flush().ok();
}

enum Failure {
    Exit(i32),
    Error(String),
}

fn handle_request(input: &str) -> Result<Value, Failure> {
    let request: Value = serde_json::from_str(input)
        .map_err(|e| Failure::Error(format!("Invalid request: {}", e)))?;

    let source = match request["kind"].as_str() {
        Some("file") => {
            let path = request["path"].as_str().unwrap_or_default();
            std::fs::read_to_string(path).map_err(|e| {
                Failure::Error(format!("ENOENT: cannot read workflow '{}': {}", path, e))
            })?
        }
        Some("yaml") => request["source"].as_str().unwrap_or_default().to_string(),
        other => return Err(Failure::Error(format!("Unknown request kind {:?}", other))),
    };

    let workflow: Yaml = serde_yaml::from_str(&source)
        .map_err(|e| Failure::Error(format!("Invalid workflow YAML: {}", e)))?;

    if let Some(code) = workflow.get("exit").and_then(Yaml::as_i64) {
        return Err(Failure::Exit(code as i32));
    }
    if let Some(message) = workflow.get("error").and_then(Yaml::as_str) {
        return Err(Failure::Error(message.to_string()));
    }

    let mut env = Vars::new();
    if let Some(Yaml::Mapping(defaults)) = workflow.get("env") {
        for (key, value) in defaults {
            if let (Some(key), Some(value)) = (key.as_str(), scalar_text(value)) {
                env.insert(key.to_string(), value);
            }
        }
    }
    env.extend(string_map(&request["options"]["env"]));
    let secrets = string_map(&request["options"]["secrets"]);

    let mut tests = Vec::new();
    if let Some(Yaml::Mapping(defs)) = workflow.get("tests") {
        for (id, test) in defs {
            tests.push(run_test(id.as_str().unwrap_or("test"), test, &env, &secrets));
        }
    }

    let passed = tests.iter().all(|t| t["passed"] == json!(true));
    Ok(json!({
        "workflow": {"name": workflow.get("name").and_then(Yaml::as_str)},
        "result": {"passed": passed, "tests": tests},
    }))
}

fn run_test(id: &str, test: &Yaml, env: &Vars, secrets: &Vars) -> Value {
    let steps: Vec<Value> = test
        .get("steps")
        .and_then(Yaml::as_sequence)
        .map(|steps| {
            steps
                .iter()
                .enumerate()
                .map(|(i, step)| run_step(&format!("{}-{}", id, i), step, env, secrets))
                .collect()
        })
        .unwrap_or_default();

    let passed = steps.iter().all(|s| s["passed"] == json!(true));
    json!({
        "id": id,
        "name": test.get("name").and_then(Yaml::as_str).unwrap_or(id),
        "passed": passed,
        "steps": steps,
    })
}

fn run_step(id: &str, step: &Yaml, env: &Vars, secrets: &Vars) -> Value {
    let mut step = step.clone();
    substitute(&mut step, env, secrets);

    let http = step.get("http").cloned().unwrap_or(Yaml::Null);
    let mock = step.get("mock").cloned().unwrap_or(Yaml::Null);

    let status = mock.get("status").and_then(Yaml::as_u64).unwrap_or(200);
    let status_text = mock
        .get("statusText")
        .and_then(Yaml::as_str)
        .unwrap_or("OK")
        .to_string();
    let headers: Map<String, Value> = match mock.get("headers") {
        Some(headers) => serde_json::from_value(to_json(headers)).unwrap_or_default(),
        None => Map::new(),
    };
    let body = mock
        .get("body")
        .and_then(scalar_text)
        .unwrap_or_default();

    let mut checks = Map::new();
    if let Some(check) = http.get("check") {
        if let Some(expected) = check.get("status") {
            checks.insert("status".into(), detail(to_json(expected), json!(status)));
        }
        if let Some(expected) = check.get("statusText") {
            checks.insert("statusText".into(), detail(to_json(expected), json!(status_text)));
        }
        if let Some(expected) = check.get("body") {
            checks.insert("body".into(), detail(to_json(expected), json!(body)));
        }
        if let Some(Yaml::Mapping(expected)) = check.get("headers") {
            let mut group = Map::new();
            for (name, value) in expected {
                let name = name.as_str().unwrap_or_default().to_string();
                let given = headers.get(&name).cloned().unwrap_or(Value::Null);
                group.insert(name, detail(to_json(value), given));
            }
            checks.insert("headers".into(), Value::Object(group));
        }
    }

    let passed = checks.values().all(check_passed);
    let captures = http.get("captures").map(to_json).unwrap_or_else(|| json!({}));

    json!({
        "id": id,
        "name": step.get("name").and_then(Yaml::as_str),
        "passed": passed,
        "request": {
            "url": http.get("url").and_then(Yaml::as_str).unwrap_or_default(),
            "method": http.get("method").and_then(Yaml::as_str).unwrap_or("GET"),
        },
        "response": {
            "status": status,
            "statusText": status_text,
            "headers": headers,
            "body": {"type": "Buffer", "data": body.as_bytes()},
        },
        "checks": checks,
        "captures": captures,
    })
}

fn detail(expected: Value, given: Value) -> Value {
    let passed = expected == given;
    json!({"expected": expected, "given": given, "passed": passed})
}

fn check_passed(check: &Value) -> bool {
    match check.get("passed") {
        Some(passed) => passed == &json!(true),
        None => check
            .as_object()
            .map(|group| group.values().all(check_passed))
            .unwrap_or(true),
    }
}

/// Replace `${{ env.NAME }}` and `${{ secrets.NAME }}` in every string
fn substitute(value: &mut Yaml, env: &Vars, secrets: &Vars) {
    match value {
        Yaml::String(text) => *text = expand(text, env, secrets),
        Yaml::Sequence(items) => {
            for item in items {
                substitute(item, env, secrets);
            }
        }
        Yaml::Mapping(map) => {
            for (_, item) in map.iter_mut() {
                substitute(item, env, secrets);
            }
        }
        _ => {}
    }
}

fn expand(text: &str, env: &Vars, secrets: &Vars) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find("${{") {
        let Some(len) = rest[start..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        let expr = rest[start + 3..start + len].trim();
        let value = match expr.split_once('.') {
            Some(("env", name)) => env.get(name),
            Some(("secrets", name)) => secrets.get(name),
            _ => None,
        };
        out.push_str(value.map(String::as_str).unwrap_or_default());
        rest = &rest[start + len + 2..];
    }
    out.push_str(rest);
    out
}

fn scalar_text(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_map(value: &Value) -> Vars {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn to_json(value: &Yaml) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
