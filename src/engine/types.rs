//! Workflow result types produced by the engine
//!
//! Only the fields the CLI inspects are modelled. Everything else the engine
//! reports is kept in `extra` maps so it survives into the JSON report.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::common::StringMap;

/// Options handed to the engine alongside the workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOptions {
    #[serde(default)]
    pub secrets: StringMap,
    #[serde(default)]
    pub env: StringMap,
}

/// Outcome of a whole workflow run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub passed: bool,
    #[serde(default)]
    pub tests: Vec<TestResult>,
}

/// Outcome of one test
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestResult {
    pub passed: bool,
    #[serde(default)]
    pub steps: Vec<StepResult>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of one step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<StepRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<StepResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<Checks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captures: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StepResult {
    /// Step name for display, falling back for absent or empty names
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Unnamed Step",
        }
    }
}

/// Request issued by a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response received by a step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<ResponseBody>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw response body bytes
///
/// Accepted as a byte array, a Node `Buffer` object or a plain string;
/// always serialized back as a byte array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireBody", into = "Vec<u8>")]
pub struct ResponseBody(pub Vec<u8>);

#[derive(Deserialize)]
#[serde(untagged)]
enum WireBody {
    Bytes(Vec<u8>),
    Buffer { data: Vec<u8> },
    Text(String),
}

impl From<WireBody> for ResponseBody {
    fn from(wire: WireBody) -> Self {
        match wire {
            WireBody::Bytes(bytes) | WireBody::Buffer { data: bytes } => Self(bytes),
            WireBody::Text(text) => Self(text.into_bytes()),
        }
    }
}

impl From<ResponseBody> for Vec<u8> {
    fn from(body: ResponseBody) -> Self {
        body.0
    }
}

impl ResponseBody {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the body as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

/// Named checks in the order the engine reported them
#[derive(Debug, Clone, Default)]
pub struct Checks(pub Vec<(String, CheckNode)>);

impl Checks {
    pub fn get(&self, key: &str) -> Option<&CheckNode> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, node)| node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CheckNode)> {
        self.0.iter().map(|(key, node)| (key.as_str(), node))
    }
}

impl Serialize for Checks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, node) in &self.0 {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Checks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChecksVisitor;

        impl<'de> Visitor<'de> for ChecksVisitor {
            type Value = Checks;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of checks")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Checks, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, CheckNode>()? {
                    entries.push(entry);
                }
                Ok(Checks(entries))
            }
        }

        deserializer.deserialize_map(ChecksVisitor)
    }
}

/// A node in a step's check map
///
/// Objects carrying both `expected` and `given` are single checks; any other
/// object is a group of named sub-checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckNode {
    Detail(CheckDetail),
    Group(Checks),
    Other(Value),
}

/// An expected/given pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckDetail {
    pub expected: Value,
    pub given: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CheckDetail {
    pub fn new(expected: Value, given: Value) -> Self {
        Self {
            expected,
            given,
            extra: Map::new(),
        }
    }

    /// A check passes when both sides serialize to the same text
    ///
    /// Object keys keep their order, so `{"a":1,"b":2}` and `{"b":2,"a":1}`
    /// do not match.
    pub fn passed(&self) -> bool {
        serde_json::to_string(&self.expected).ok() == serde_json::to_string(&self.given).ok()
    }
}

/// A check that did not pass, keyed by its dotted path
#[derive(Debug, Clone, PartialEq)]
pub struct FailedCheck<'a> {
    pub key: String,
    pub expected: &'a Value,
    pub given: &'a Value,
}

/// Collect failing checks in reported order; grouped checks get `group.sub` keys
pub fn failed_checks(checks: &Checks) -> Vec<FailedCheck<'_>> {
    let mut failed = Vec::new();
    for (key, node) in checks.iter() {
        match node {
            CheckNode::Detail(detail) => push_failed(&mut failed, key.to_string(), detail),
            CheckNode::Group(group) => {
                for (sub_key, sub_node) in group.iter() {
                    if let CheckNode::Detail(detail) = sub_node {
                        push_failed(&mut failed, format!("{}.{}", key, sub_key), detail);
                    }
                }
            }
            CheckNode::Other(_) => {}
        }
    }
    failed
}

fn push_failed<'a>(failed: &mut Vec<FailedCheck<'a>>, key: String, detail: &'a CheckDetail) {
    if !detail.passed() {
        failed.push(FailedCheck {
            key,
            expected: &detail.expected,
            given: &detail.given,
        });
    }
}
