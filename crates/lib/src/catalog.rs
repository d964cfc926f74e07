//! Function catalog: the status snapshot fetched once per session.
//!
//! Built from `GET /api/status` and passed by value to whatever renders forms; cloning
//! shares the same immutable list.

use std::sync::Arc;

use crate::api::{PlaygroundApi, StatusResponse};
use crate::definition::FunctionDescriptor;
use crate::error::ClientError;

/// Read-only view of the server's functions.
#[derive(Debug, Clone)]
pub struct Catalog {
    has_key: bool,
    functions: Arc<[FunctionDescriptor]>,
}

impl Catalog {
    pub fn new(has_key: bool, functions: Vec<FunctionDescriptor>) -> Self {
        Self {
            has_key,
            functions: functions.into(),
        }
    }

    /// Fetch the status once and freeze it.
    pub async fn fetch(api: &dyn PlaygroundApi) -> Result<Self, ClientError> {
        let status = api.status().await?;
        let catalog = Self::from(status);
        log::debug!("catalog loaded: {} functions", catalog.len());
        Ok(catalog)
    }

    /// Whether the server reported a model API key.
    pub fn has_key(&self) -> bool {
        self.has_key
    }

    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    pub fn find(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(false, Vec::new())
    }
}

impl From<StatusResponse> for Catalog {
    fn from(status: StatusResponse) -> Self {
        let functions = status
            .fns
            .into_iter()
            .map(|named| named.into_descriptor())
            .collect();
        Self::new(status.has_key, functions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> StatusResponse {
        serde_json::from_value(serde_json::json!({
            "has_key": true,
            "fns": [
                { "name": "sentiment.sentiment", "definition": {
                    "instruction": "Detect sentiment",
                    "input_config": { "input_type": "unary" } } },
                { "name": "motivate.motivate_me", "definition": {
                    "instruction": "Motivate me",
                    "input_config": { "input_type": "unary", "allow_none": true, "strict_no_args": true } } }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn lookup_by_name() {
        let catalog = Catalog::from(status());
        assert!(catalog.has_key());
        assert_eq!(catalog.len(), 2);
        assert!(catalog.find("motivate.motivate_me").unwrap().takes_no_input());
        assert!(catalog.find("nope").is_none());
    }

    #[test]
    fn malformed_definition_does_not_hide_the_others() {
        let status: StatusResponse = serde_json::from_value(serde_json::json!({
            "has_key": true,
            "fns": [
                { "name": "broken", "definition": { "input_config": { "allow_none": true } } },
                { "name": "sentiment.sentiment", "definition": {
                    "input_config": { "input_type": "unary" } } }
            ]
        }))
        .expect("status with one malformed definition");
        let catalog = Catalog::from(status);
        assert_eq!(catalog.len(), 2);
        let broken = catalog.find("broken").unwrap();
        assert!(crate::form::resolve(broken).is_err());
        let good = catalog.find("sentiment.sentiment").unwrap();
        assert_eq!(
            crate::form::resolve(good),
            Ok(crate::form::FormMode::Unary { allow_none: false })
        );
    }

    #[test]
    fn clones_share_the_snapshot() {
        let a = Catalog::from(status());
        let b = a.clone();
        assert!(std::ptr::eq(a.functions().as_ptr(), b.functions().as_ptr()));
    }
}
