//! `-Wfoo` / `-Wno-foo` style toggle validator.

use crate::base::{Validator, ValidatorResult};

/// Toggles a `no-`-prefixed (configurable) disable marker on a warning name.
#[derive(Debug, Clone)]
pub struct WarningsValidator {
    pub prefix: String,
}

impl Default for WarningsValidator {
    fn default() -> Self {
        Self {
            prefix: "no-".to_string(),
        }
    }
}

impl WarningsValidator {
    pub fn is_disabled(&self, value: &str) -> bool {
        value.starts_with(self.prefix.as_str())
    }

    pub fn get_base_name<'a>(&self, value: &'a str) -> &'a str {
        value.strip_prefix(self.prefix.as_str()).unwrap_or(value)
    }

    pub fn toggle(&self, value: &str) -> String {
        if let Some(base) = value.strip_prefix(self.prefix.as_str()) {
            base.to_string()
        } else {
            format!("{}{value}", self.prefix)
        }
    }
}

impl Validator for WarningsValidator {
    fn get_completions(&self, partial: &str) -> Vec<String> {
        vec![self.toggle(partial)]
    }

    fn validate(&self, _value: &str) -> ValidatorResult {
        ValidatorResult::ok()
    }

    fn cycle_next(&self, value: &str) -> Option<String> {
        Some(self.toggle(value))
    }

    fn cycle_prev(&self, value: &str) -> Option<String> {
        Some(self.toggle(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_and_removes_prefix() {
        let validator = WarningsValidator::default();
        assert_eq!(validator.toggle("unused"), "no-unused");
        assert_eq!(validator.toggle("no-unused"), "unused");
    }

    #[test]
    fn is_disabled_and_base_name() {
        let validator = WarningsValidator::default();
        assert!(validator.is_disabled("no-unused"));
        assert_eq!(validator.get_base_name("no-unused"), "unused");
        assert!(!validator.is_disabled("unused"));
    }
}
