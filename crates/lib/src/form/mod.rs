//! Input forms: pick an editor from a function's calling convention and build its payload.
//!
//! [`resolve`] maps a descriptor to exactly one [`FormMode`]; [`FunctionForm`] pairs that
//! mode with a live editor and is what the CLI and the desktop app hold while the user types.

mod keyword;
mod unary;

pub use keyword::{DisplayEntry, KeyValueEntry, KeywordEditor};
pub use unary::UnaryEditor;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::definition::{FunctionDescriptor, InputType};
use crate::error::ConfigurationError;

/// Editor selected for a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// No editor; the payload is always `null`.
    NoArgs,
    Keyword {
        required_args: Vec<String>,
        allow_none: bool,
    },
    Unary {
        allow_none: bool,
    },
}

impl FormMode {
    pub fn label(&self) -> &'static str {
        match self {
            FormMode::NoArgs => "no-args",
            FormMode::Keyword { .. } => "keyword",
            FormMode::Unary { .. } => "unary",
        }
    }
}

/// Resolve the editor mode. `strict_no_args` wins over the declared input type.
pub fn resolve(descriptor: &FunctionDescriptor) -> Result<FormMode, ConfigurationError> {
    let config = &descriptor.input_config;
    if config.strict_no_args {
        return Ok(FormMode::NoArgs);
    }
    match &config.input_type {
        InputType::Keyword => Ok(FormMode::Keyword {
            required_args: descriptor.required_args.clone(),
            allow_none: config.allow_none,
        }),
        InputType::Unary => Ok(FormMode::Unary {
            allow_none: config.allow_none,
        }),
        other => Err(ConfigurationError::new(&descriptor.name, other)),
    }
}

/// Non-null inference input. `None` at the call site is sent as JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionInput {
    Text(String),
    Keywords(BTreeMap<String, String>),
}

/// A mounted form: the resolved mode together with its editor state.
#[derive(Debug, Clone)]
pub enum FunctionForm {
    NoArgs,
    Keyword(KeywordEditor),
    Unary(UnaryEditor),
}

impl FunctionForm {
    pub fn from_mode(mode: FormMode) -> Self {
        match mode {
            FormMode::NoArgs => FunctionForm::NoArgs,
            FormMode::Keyword {
                required_args,
                allow_none,
            } => FunctionForm::Keyword(KeywordEditor::new(required_args, allow_none)),
            FormMode::Unary { allow_none } => FunctionForm::Unary(UnaryEditor::new(allow_none)),
        }
    }

    pub fn for_descriptor(descriptor: &FunctionDescriptor) -> Result<Self, ConfigurationError> {
        resolve(descriptor).map(Self::from_mode)
    }

    pub fn can_submit(&self) -> bool {
        match self {
            FunctionForm::NoArgs => true,
            FunctionForm::Keyword(editor) => editor.can_submit(),
            FunctionForm::Unary(editor) => editor.can_submit(),
        }
    }

    /// Required keyword names that still block submission.
    pub fn missing_required(&self) -> Vec<String> {
        match self {
            FunctionForm::Keyword(editor) => editor.missing_required(),
            _ => Vec::new(),
        }
    }

    pub fn payload(&self) -> Option<FunctionInput> {
        match self {
            FunctionForm::NoArgs => None,
            FunctionForm::Keyword(editor) => Some(FunctionInput::Keywords(editor.to_payload())),
            FunctionForm::Unary(editor) => Some(FunctionInput::Text(editor.to_payload())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::InputConfig;

    fn descriptor(input_type: InputType, allow_none: bool, strict_no_args: bool) -> FunctionDescriptor {
        FunctionDescriptor {
            name: "f".to_string(),
            input_config: InputConfig {
                input_type,
                allow_none,
                strict_no_args,
            },
            required_args: Vec::new(),
            description: String::new(),
        }
    }

    #[test]
    fn strict_no_args_wins_over_input_type() {
        for input_type in [
            InputType::Keyword,
            InputType::Unary,
            InputType::Unrecognized("x".to_string()),
        ] {
            for allow_none in [false, true] {
                let d = descriptor(input_type.clone(), allow_none, true);
                assert_eq!(resolve(&d), Ok(FormMode::NoArgs));
            }
        }
    }

    #[test]
    fn keyword_and_unary_carry_their_config() {
        let mut d = descriptor(InputType::Keyword, true, false);
        d.required_args = vec!["a".to_string()];
        assert_eq!(
            resolve(&d),
            Ok(FormMode::Keyword {
                required_args: vec!["a".to_string()],
                allow_none: true
            })
        );
        let d = descriptor(InputType::Unary, false, false);
        assert_eq!(resolve(&d), Ok(FormMode::Unary { allow_none: false }));
    }

    #[test]
    fn unrecognized_input_type_is_configuration_error() {
        let d = descriptor(InputType::Unrecognized("batch".to_string()), false, false);
        let err = resolve(&d).unwrap_err();
        assert_eq!(err.function, "f");
        assert_eq!(err.input_type, "batch");
        assert!(FunctionForm::for_descriptor(&d).is_err());
    }

    #[test]
    fn keyword_scenario_builds_mapping_payload() {
        let mut d = descriptor(InputType::Keyword, false, false);
        d.required_args = vec!["topic".to_string()];
        let mut form = FunctionForm::for_descriptor(&d).unwrap();
        assert!(!form.can_submit());
        assert_eq!(form.missing_required(), vec!["topic".to_string()]);
        if let FunctionForm::Keyword(editor) = &mut form {
            editor.update_value("topic", "cats");
        }
        assert!(form.can_submit());
        let payload = serde_json::to_value(form.payload()).unwrap();
        assert_eq!(payload, serde_json::json!({ "topic": "cats" }));
    }

    #[test]
    fn unary_scenario_allows_empty_with_allow_none() {
        let d = descriptor(InputType::Unary, true, false);
        let form = FunctionForm::for_descriptor(&d).unwrap();
        assert!(form.can_submit());
        assert_eq!(form.payload(), Some(FunctionInput::Text(String::new())));
    }

    #[test]
    fn no_args_payload_is_always_null() {
        let d = descriptor(InputType::Unary, true, true);
        let form = FunctionForm::for_descriptor(&d).unwrap();
        assert!(form.can_submit());
        assert_eq!(form.payload(), None);
        assert_eq!(serde_json::to_value(form.payload()).unwrap(), serde_json::Value::Null);
    }
}
