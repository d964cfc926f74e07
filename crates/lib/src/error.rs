//! Error types shared by the form resolver, the submission path and the API client.

use crate::definition::InputType;

/// Transport-level failure talking to the playground server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("playground request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("playground api error: {0}")]
    Api(String),
}

/// A descriptor declares an input type the playground has no editor for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("function {function} is misconfigured: unrecognized input type {input_type:?}")]
pub struct ConfigurationError {
    pub function: String,
    pub input_type: String,
}

impl ConfigurationError {
    pub fn new(function: impl Into<String>, input_type: &InputType) -> Self {
        Self {
            function: function.into(),
            input_type: input_type.as_str().to_string(),
        }
    }
}

/// Errors surfaced at the UI boundary when running a function.
#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("inference failed: {0}")]
    Submission(#[from] ClientError),

    /// The form's submission gate is closed. `missing` lists empty required arguments.
    #[error("{}", blocked_message(.missing))]
    ValidationBlocked { missing: Vec<String> },
}

fn blocked_message(missing: &[String]) -> String {
    if missing.is_empty() {
        "input is required".to_string()
    } else {
        format!("missing required arguments: {}", missing.join(", "))
    }
}
