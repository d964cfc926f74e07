//! Playground REST wire types (status, inference, inference log).

use serde::{Deserialize, Serialize};

use crate::definition::NamedDefinition;
use crate::form::FunctionInput;

/// `GET /api/status` body: `{ "has_key", "fns": [{ "name", "definition" }] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    /// Whether the server has a model API key configured.
    #[serde(default)]
    pub has_key: bool,
    #[serde(default)]
    pub fns: Vec<NamedDefinition>,
}

/// `POST /api/inference` body. `input` is always sent, `null` for no-argument calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub name: String,
    pub input: Option<FunctionInput>,
}

/// Kind of a function input or output value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Json,
    String,
    None,
}

impl ValueType {
    /// Classify a JSON value the way the server tags results.
    pub fn of_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ValueType::None,
            serde_json::Value::String(_) => ValueType::String,
            _ => ValueType::Json,
        }
    }
}

/// `POST /api/inference` response: `{ "type", "value" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(rename = "type")]
    pub typ: ValueType,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl SubmissionResult {
    pub fn from_value(value: serde_json::Value) -> Self {
        Self {
            typ: ValueType::of_value(&value),
            value,
        }
    }

    /// Text for the output panel: pretty JSON (two-space indent), verbatim string, or empty.
    pub fn render(&self) -> String {
        match self.typ {
            ValueType::Json => serde_json::to_string_pretty(&self.value)
                .unwrap_or_else(|_| self.value.to_string()),
            ValueType::String => match &self.value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            },
            ValueType::None => String::new(),
        }
    }
}

/// One row of the inference log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub entry_id: String,
    #[serde(default)]
    pub fn_name: String,
    pub input_type: ValueType,
    pub output_type: ValueType,
    #[serde(default)]
    pub input_data: Option<serde_json::Value>,
    #[serde(default)]
    pub output_data: Option<serde_json::Value>,
    /// ISO-8601 timestamp as sent by the server (offset optional).
    pub ts: String,
}

/// `GET /api/inference-log?page=N` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogListing {
    #[serde(default)]
    pub entries: Vec<LogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn json_result_renders_with_two_space_indent() {
        let r: SubmissionResult =
            serde_json::from_str(r#"{"type":"json","value":{"a":1}}"#).unwrap();
        assert_eq!(r.render(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn string_and_none_results() {
        let r: SubmissionResult =
            serde_json::from_str(r#"{"type":"string","value":"  hi\nthere "}"#).unwrap();
        assert_eq!(r.render(), "  hi\nthere ");
        let r: SubmissionResult = serde_json::from_str(r#"{"type":"none"}"#).unwrap();
        assert_eq!(r.value, serde_json::Value::Null);
        assert_eq!(r.render(), "");
    }

    #[test]
    fn classifies_values() {
        assert_eq!(SubmissionResult::from_value(serde_json::json!(null)).typ, ValueType::None);
        assert_eq!(SubmissionResult::from_value(serde_json::json!("x")).typ, ValueType::String);
        assert_eq!(SubmissionResult::from_value(serde_json::json!([1])).typ, ValueType::Json);
    }

    #[test]
    fn request_always_carries_input() {
        let req = InferenceRequest {
            name: "motivate.motivate_me".to_string(),
            input: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({ "name": "motivate.motivate_me", "input": null })
        );

        let mut kw = BTreeMap::new();
        kw.insert("topic".to_string(), "cats".to_string());
        let req = InferenceRequest {
            name: "essay".to_string(),
            input: Some(FunctionInput::Keywords(kw)),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({ "name": "essay", "input": { "topic": "cats" } })
        );
    }

    #[test]
    fn log_entry_tolerates_missing_data() {
        let e: LogEntry = serde_json::from_value(serde_json::json!({
            "entry_id": "1",
            "fn_name": "sentiment.sentiment",
            "input_type": "string",
            "output_type": "none",
            "input_data": "I love it",
            "ts": "2023-07-01T12:00:00"
        }))
        .unwrap();
        assert_eq!(e.output_data, None);
        assert_eq!(e.input_data, Some(serde_json::json!("I love it")));
    }
}
