//! Single-value editor for unary functions.

#[derive(Debug, Clone, Default)]
pub struct UnaryEditor {
    value: String,
    allow_none: bool,
}

impl UnaryEditor {
    pub fn new(allow_none: bool) -> Self {
        Self {
            value: String::new(),
            allow_none,
        }
    }

    pub fn allow_none(&self) -> bool {
        self.allow_none
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut String {
        &mut self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn can_submit(&self) -> bool {
        self.allow_none || !self.value.is_empty()
    }

    /// The raw text; any JSON interpretation is left to the server.
    pub fn to_payload(&self) -> String {
        self.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_needs_allow_none() {
        assert!(!UnaryEditor::new(false).can_submit());
        assert!(UnaryEditor::new(true).can_submit());
    }

    #[test]
    fn payload_is_not_coerced() {
        let mut e = UnaryEditor::new(false);
        e.set_value("{\"a\": 1}");
        assert!(e.can_submit());
        assert_eq!(e.to_payload(), "{\"a\": 1}");
    }
}
