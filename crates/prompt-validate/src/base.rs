//! Shared validator result type and trait.

/// Outcome of completing or validating a single captured value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorResult {
    pub completions: Vec<String>,
    pub valid: bool,
    pub message: Option<String>,
    pub selected_index: Option<usize>,
}

impl ValidatorResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// A capture-group value checker and completer.
pub trait Validator {
    /// Completions for a partial value, in display order.
    fn get_completions(&self, partial: &str) -> Vec<String>;

    /// Whether `value` is acceptable as a final value for the captured
    /// group.
    fn validate(&self, value: &str) -> ValidatorResult;

    /// Advance to the next completion after `value`, wrapping to the first
    /// when `value` is the last (or isn't present at all).
    fn cycle_next(&self, value: &str) -> Option<String> {
        let completions = self.get_completions(value);
        if completions.is_empty() {
            return None;
        }
        match completions.iter().position(|c| c == value) {
            Some(idx) => Some(completions[(idx + 1) % completions.len()].clone()),
            None => Some(completions[0].clone()),
        }
    }

    /// Step back to the previous completion before `value`, wrapping to the
    /// last.
    fn cycle_prev(&self, value: &str) -> Option<String> {
        let completions = self.get_completions(value);
        if completions.is_empty() {
            return None;
        }
        match completions.iter().position(|c| c == value) {
            Some(0) => Some(completions[completions.len() - 1].clone()),
            Some(idx) => Some(completions[idx - 1].clone()),
            None => Some(completions[completions.len() - 1].clone()),
        }
    }
}
