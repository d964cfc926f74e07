//! Keyword-argument editor: named entries, a draft row, and the submission gate.

use std::collections::BTreeMap;

/// One named argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueEntry {
    pub name: String,
    pub value: String,
}

/// A row as shown to the user; required rows cannot be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub name: String,
    pub value: String,
    pub required: bool,
}

/// Editor state for a keyword function.
///
/// `entries` keeps insertion order for display only; names are unique.
#[derive(Debug, Clone, Default)]
pub struct KeywordEditor {
    required_args: Vec<String>,
    allow_none: bool,
    entries: Vec<KeyValueEntry>,
    draft_name: String,
    draft_value: String,
}

impl KeywordEditor {
    /// Mount an editor for the given required names, seeded with empty values.
    ///
    /// Repeated names are kept once, in first-seen order. Empty names are dropped since no
    /// entry can ever carry them.
    pub fn new(required_args: Vec<String>, allow_none: bool) -> Self {
        let mut required = Vec::with_capacity(required_args.len());
        for name in required_args {
            if name.is_empty() {
                log::warn!("ignoring empty required argument name");
            } else if !required.contains(&name) {
                required.push(name);
            }
        }
        let mut editor = Self {
            required_args: Vec::new(),
            allow_none,
            entries: Vec::new(),
            draft_name: String::new(),
            draft_value: String::new(),
        };
        editor.seed_required(&required);
        editor.required_args = required;
        editor
    }

    pub fn required_args(&self) -> &[String] {
        &self.required_args
    }

    pub fn allow_none(&self) -> bool {
        self.allow_none
    }

    pub fn entries(&self) -> &[KeyValueEntry] {
        &self.entries
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }

    fn is_required(&self, name: &str) -> bool {
        self.required_args.iter().any(|r| r == name)
    }

    /// Ensure every required name has an entry; existing values are left alone.
    pub fn seed_required(&mut self, required_args: &[String]) {
        for name in required_args {
            if !name.is_empty() && self.value(name).is_none() {
                self.entries.push(KeyValueEntry {
                    name: name.clone(),
                    value: String::new(),
                });
            }
        }
    }

    /// Set `name` to `value`, inserting the entry when absent. Empty names are ignored.
    pub fn update_value(&mut self, name: &str, value: impl Into<String>) {
        if name.is_empty() {
            return;
        }
        let value = value.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.value = value,
            None => self.entries.push(KeyValueEntry {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Remove a free entry. Required names are never removed. Returns true if an entry went away.
    pub fn remove_entry(&mut self, name: &str) -> bool {
        if self.is_required(name) {
            return false;
        }
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    pub fn draft_name(&self) -> &str {
        &self.draft_name
    }

    pub fn draft_value(&self) -> &str {
        &self.draft_value
    }

    pub fn draft_name_mut(&mut self) -> &mut String {
        &mut self.draft_name
    }

    pub fn draft_value_mut(&mut self) -> &mut String {
        &mut self.draft_value
    }

    pub fn set_draft(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.draft_name = name.into();
        self.draft_value = value.into();
    }

    pub fn clear_draft(&mut self) {
        self.draft_name.clear();
        self.draft_value.clear();
    }

    pub fn can_add_draft(&self) -> bool {
        !self.draft_name.is_empty() && !self.draft_value.is_empty()
    }

    /// Commit the draft row (overwriting an entry of the same name) and clear it.
    pub fn add_draft(&mut self) -> bool {
        if !self.can_add_draft() {
            return false;
        }
        let name = std::mem::take(&mut self.draft_name);
        let value = std::mem::take(&mut self.draft_value);
        self.update_value(&name, value);
        true
    }

    /// Required names whose value is still empty, in declared order.
    pub fn missing_required(&self) -> Vec<String> {
        self.required_args
            .iter()
            .filter(|name| self.value(name).map_or(true, str::is_empty))
            .cloned()
            .collect()
    }

    pub fn can_submit(&self) -> bool {
        self.missing_required().is_empty() && (self.allow_none || !self.entries.is_empty())
    }

    pub fn to_payload(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|e| (e.name.clone(), e.value.clone()))
            .collect()
    }

    /// Required rows first (declared order), then free rows in the order they were added.
    pub fn display_entries(&self) -> Vec<DisplayEntry> {
        let required = self.required_args.iter().map(|name| DisplayEntry {
            name: name.clone(),
            value: self.value(name).unwrap_or_default().to_string(),
            required: true,
        });
        let free = self
            .entries
            .iter()
            .filter(|e| !self.is_required(&e.name))
            .map(|e| DisplayEntry {
                name: e.name.clone(),
                value: e.value.clone(),
                required: false,
            });
        required.chain(free).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn required_args_gate_submission() {
        let mut e = KeywordEditor::new(names(&["a", "b"]), false);
        e.update_value("extra", "x");
        assert!(!e.can_submit());
        e.update_value("a", "1");
        assert!(!e.can_submit());
        assert_eq!(e.missing_required(), names(&["b"]));
        e.update_value("b", "2");
        assert!(e.can_submit());
    }

    #[test]
    fn present_but_empty_required_is_not_satisfied() {
        let mut e = KeywordEditor::new(names(&["a"]), true);
        assert_eq!(e.value("a"), Some(""));
        assert!(!e.can_submit());
        e.update_value("a", "v");
        e.update_value("a", "");
        assert!(!e.can_submit());
    }

    #[test]
    fn empty_set_needs_allow_none() {
        let e = KeywordEditor::new(Vec::new(), false);
        assert!(!e.can_submit());
        let e = KeywordEditor::new(Vec::new(), true);
        assert!(e.can_submit());
        assert!(e.to_payload().is_empty());
    }

    #[test]
    fn remove_required_is_noop() {
        let mut e = KeywordEditor::new(names(&["a"]), false);
        e.update_value("a", "1");
        e.update_value("b", "2");
        assert!(!e.remove_entry("a"));
        assert_eq!(e.entries().len(), 2);
        assert!(e.remove_entry("b"));
        assert_eq!(e.entries().len(), 1);
        assert!(!e.remove_entry("missing"));
    }

    #[test]
    fn update_inserts_absent_name() {
        let mut e = KeywordEditor::new(Vec::new(), false);
        e.update_value("tone", "formal");
        assert_eq!(e.to_payload().get("tone").map(String::as_str), Some("formal"));
        e.update_value("", "ignored");
        assert_eq!(e.entries().len(), 1);
    }

    #[test]
    fn reseeding_never_overwrites() {
        let mut e = KeywordEditor::new(names(&["a", "b"]), false);
        e.update_value("a", "kept");
        let before = e.to_payload();
        e.seed_required(&names(&["a", "b"]));
        assert_eq!(e.to_payload(), before);
        assert_eq!(e.entries().len(), 2);
    }

    #[test]
    fn draft_requires_both_fields_and_clears() {
        let mut e = KeywordEditor::new(Vec::new(), false);
        e.set_draft("name", "");
        assert!(!e.add_draft());
        assert_eq!(e.draft_name(), "name");

        e.draft_value_mut().push_str("value");
        assert!(e.add_draft());
        assert_eq!(e.draft_name(), "");
        assert_eq!(e.draft_value(), "");
        assert_eq!(e.value("name"), Some("value"));

        e.set_draft("name", "second");
        assert!(e.add_draft());
        assert_eq!(e.entries().len(), 1);
        assert_eq!(e.value("name"), Some("second"));
    }

    #[test]
    fn repeated_required_names_collapse() {
        let mut e = KeywordEditor::new(names(&["topic", "tone", "topic"]), false);
        assert_eq!(e.required_args(), names(&["topic", "tone"]).as_slice());
        assert_eq!(e.display_entries().len(), 2);
        assert_eq!(e.missing_required(), names(&["topic", "tone"]));
        e.update_value("topic", "cats");
        e.update_value("tone", "dry");
        assert!(e.can_submit());
    }

    #[test]
    fn empty_required_name_is_dropped() {
        let mut e = KeywordEditor::new(names(&["", "topic"]), false);
        assert_eq!(e.required_args(), names(&["topic"]).as_slice());
        assert!(e.entries().iter().all(|entry| !entry.name.is_empty()));
        e.update_value("topic", "cats");
        assert!(e.can_submit());
        assert_eq!(e.to_payload().len(), 1);
    }

    #[test]
    fn display_puts_required_first() {
        let mut e = KeywordEditor::new(names(&["b", "a"]), false);
        e.update_value("z", "1");
        e.update_value("a", "2");
        e.update_value("y", "3");
        let shown: Vec<(String, bool)> = e
            .display_entries()
            .into_iter()
            .map(|d| (d.name, d.required))
            .collect();
        assert_eq!(
            shown,
            vec![
                ("b".to_string(), true),
                ("a".to_string(), true),
                ("z".to_string(), false),
                ("y".to_string(), false),
            ]
        );
    }
}
