//! Function descriptors as published by the playground server (`GET /api/status`).
//!
//! The server sends the full function definition (instruction, examples, message stack,
//! model options, ...); only the calling convention and the description are kept here.
//! Older servers describe the calling convention as a tag list (`mode: ["kw", "pos",
//! "no_args"]`); that form is normalized into [`InputConfig`] while deserializing so nothing
//! downstream has to know about it.

use serde::{Deserialize, Deserializer, Serialize};

/// Declared input shape of a text function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputType {
    /// Called with named keyword arguments, e.g. `f(topic="cats")`.
    Keyword,
    /// Called with one positional text value, e.g. `f("some text")`.
    Unary,
    /// Anything else the server sent. Kept verbatim so it can be reported.
    Unrecognized(String),
}

impl InputType {
    pub fn as_str(&self) -> &str {
        match self {
            InputType::Keyword => "keyword",
            InputType::Unary => "unary",
            InputType::Unrecognized(s) => s.as_str(),
        }
    }
}

impl From<String> for InputType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "keyword" => InputType::Keyword,
            "unary" => InputType::Unary,
            _ => InputType::Unrecognized(s),
        }
    }
}

impl From<InputType> for String {
    fn from(t: InputType) -> Self {
        match t {
            InputType::Unrecognized(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl Default for InputType {
    /// A definition that never said how it is called.
    fn default() -> Self {
        InputType::Unrecognized(String::new())
    }
}

/// Accept any JSON for `input_type` so one bad definition cannot fail the whole status decode.
fn lenient_input_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<InputType, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => InputType::from(s),
        serde_json::Value::Null => InputType::default(),
        other => InputType::Unrecognized(other.to_string()),
    })
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which inputs a function accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default, alias = "inputType", deserialize_with = "lenient_input_type")]
    pub input_type: InputType,
    /// An empty payload is acceptable.
    #[serde(default, alias = "allowNone")]
    pub allow_none: bool,
    /// No editor at all: the function is always called without input.
    #[serde(default, alias = "strictNoArgs")]
    pub strict_no_args: bool,
}

impl InputConfig {
    /// Normalize a legacy tag list (`kw`, `pos`, `no_args`).
    ///
    /// `no_args` next to `kw` or `pos` only makes the payload optional; on its own it
    /// means the function is always called without input.
    pub fn from_mode_tags(tags: &[String]) -> Self {
        let has = |tag: &str| tags.iter().any(|t| t == tag);
        let no_args = has("no_args");
        let input_type = if has("kw") || has("keyword") {
            InputType::Keyword
        } else if has("pos") {
            InputType::Unary
        } else {
            InputType::Unrecognized(tags.join(","))
        };
        let strict_no_args = no_args && matches!(input_type, InputType::Unrecognized(_));
        Self {
            input_type,
            allow_none: no_args,
            strict_no_args,
        }
    }
}

/// Calling convention and documentation of one invokable text function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub input_config: InputConfig,
    /// Keyword names that must carry a non-empty value (keyword functions only).
    pub required_args: Vec<String>,
    pub description: String,
}

impl FunctionDescriptor {
    /// True when the function takes no input under any circumstance.
    pub fn takes_no_input(&self) -> bool {
        self.input_config.strict_no_args && self.input_config.allow_none
    }
}

/// One `fns[]` item of the status response: `{ "name", "definition" }`.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedDefinition {
    pub name: String,
    pub definition: DefinitionBody,
}

impl NamedDefinition {
    pub fn into_descriptor(self) -> FunctionDescriptor {
        let input_config = match (self.definition.input_config, self.definition.mode) {
            (Some(config), _) => config,
            (None, Some(tags)) => InputConfig::from_mode_tags(&tags),
            (None, None) => {
                log::debug!("function {} has no input config", self.name);
                InputConfig {
                    input_type: InputType::default(),
                    allow_none: false,
                    strict_no_args: false,
                }
            }
        };
        FunctionDescriptor {
            name: self.name,
            input_config,
            required_args: self.definition.required_args.unwrap_or_default(),
            description: self.definition.description.unwrap_or_default(),
        }
    }
}

/// Subset of the server-side definition the playground uses; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefinitionBody {
    #[serde(default, alias = "inputConfig")]
    pub input_config: Option<InputConfig>,
    /// Legacy tag list.
    #[serde(default)]
    pub mode: Option<Vec<String>>,
    #[serde(default, alias = "requiredArgs")]
    pub required_args: Option<Vec<String>>,
    #[serde(default, alias = "instruction")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> FunctionDescriptor {
        serde_json::from_value::<NamedDefinition>(json)
            .expect("named definition")
            .into_descriptor()
    }

    #[test]
    fn parses_server_definition_and_ignores_extra_fields() {
        let d = parse(serde_json::json!({
            "name": "writing.essay.generate_essay",
            "definition": {
                "instruction": "Write an essay about the topic.",
                "examples": [],
                "message_stack": [],
                "input_config": { "input_type": "keyword", "allow_none": false, "strict_no_args": false },
                "output_config": { "cast_to_json": false },
                "required_args": ["topic"],
                "gpt_opts": { "model": "gpt-3.5-turbo" },
                "name": null
            }
        }));
        assert_eq!(d.name, "writing.essay.generate_essay");
        assert_eq!(d.input_config.input_type, InputType::Keyword);
        assert_eq!(d.required_args, vec!["topic".to_string()]);
        assert_eq!(d.description, "Write an essay about the topic.");
        assert!(!d.takes_no_input());
    }

    #[test]
    fn accepts_camel_case_aliases() {
        let d = parse(serde_json::json!({
            "name": "f",
            "definition": {
                "description": "d",
                "inputConfig": { "inputType": "unary", "allowNone": true },
                "requiredArgs": []
            }
        }));
        assert_eq!(d.input_config.input_type, InputType::Unary);
        assert!(d.input_config.allow_none);
        assert!(!d.input_config.strict_no_args);
    }

    #[test]
    fn unknown_input_type_is_preserved() {
        let d = parse(serde_json::json!({
            "name": "f",
            "definition": { "input_config": { "input_type": "variadic" } }
        }));
        assert_eq!(
            d.input_config.input_type,
            InputType::Unrecognized("variadic".to_string())
        );
    }

    #[test]
    fn legacy_mode_tags_are_normalized() {
        let d = parse(serde_json::json!({
            "name": "motivate.motivate_me",
            "definition": { "mode": ["no_args"] }
        }));
        assert!(d.input_config.strict_no_args);
        assert!(d.input_config.allow_none);
        assert!(d.takes_no_input());

        let d = parse(serde_json::json!({
            "name": "summarize.summarize",
            "definition": { "mode": ["pos"] }
        }));
        assert_eq!(d.input_config.input_type, InputType::Unary);
        assert!(!d.input_config.allow_none);

        let d = parse(serde_json::json!({
            "name": "entail.entail",
            "definition": { "mode": ["pos", "keyword"] }
        }));
        assert_eq!(d.input_config.input_type, InputType::Keyword);
    }

    #[test]
    fn legacy_kw_tag_is_keyword() {
        let d = parse(serde_json::json!({
            "name": "writing.essay.generate_essay",
            "definition": { "mode": ["kw"], "required_args": ["topic"] }
        }));
        assert_eq!(d.input_config.input_type, InputType::Keyword);
        assert!(!d.input_config.allow_none);
        assert!(!d.input_config.strict_no_args);
    }

    #[test]
    fn legacy_no_args_next_to_a_call_mode_keeps_the_editor() {
        let d = parse(serde_json::json!({
            "name": "story.tell",
            "definition": { "mode": ["no_args", "kw"] }
        }));
        assert_eq!(d.input_config.input_type, InputType::Keyword);
        assert!(d.input_config.allow_none);
        assert!(!d.input_config.strict_no_args);
        assert!(!d.takes_no_input());

        let d = parse(serde_json::json!({
            "name": "summarize.summarize",
            "definition": { "mode": ["no_args", "pos"] }
        }));
        assert_eq!(d.input_config.input_type, InputType::Unary);
        assert!(d.input_config.allow_none);
        assert!(!d.input_config.strict_no_args);
    }

    #[test]
    fn malformed_input_type_is_unrecognized() {
        let d = parse(serde_json::json!({
            "name": "f",
            "definition": { "input_config": { "allow_none": true } }
        }));
        assert_eq!(d.input_config.input_type, InputType::Unrecognized(String::new()));
        assert!(d.input_config.allow_none);

        let d = parse(serde_json::json!({
            "name": "f",
            "definition": { "input_config": { "input_type": null } }
        }));
        assert_eq!(d.input_config.input_type, InputType::Unrecognized(String::new()));

        let d = parse(serde_json::json!({
            "name": "f",
            "definition": { "input_config": { "input_type": 3 } }
        }));
        assert_eq!(d.input_config.input_type, InputType::Unrecognized("3".to_string()));
    }

    #[test]
    fn missing_input_config_is_unrecognized() {
        let d = parse(serde_json::json!({ "name": "f", "definition": {} }));
        assert_eq!(d.input_config.input_type, InputType::Unrecognized(String::new()));
        assert!(d.required_args.is_empty());
    }

    #[test]
    fn input_type_round_trips_as_plain_string() {
        let v = serde_json::to_value(InputType::Keyword).unwrap();
        assert_eq!(v, serde_json::json!("keyword"));
    }
}
