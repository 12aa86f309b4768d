//! Command name registration with hyphen-word abbreviation lookup.

use std::collections::HashMap;

use thiserror::Error;

/// Outcome of executing a registered command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub message: Option<String>,
    pub exit_editor: bool,
    pub print_result: bool,
    pub reset_before_print: bool,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown command: {0}")]
    NotFound(String),
    #[error("ambiguous command {input}: matches {}", candidates.join(", "))]
    Ambiguous { input: String, candidates: Vec<String> },
}

/// Registers command names and resolves an abbreviated input to exactly one
/// of them. Abbreviation is word-wise: the input is split on `-`, and each
/// input word must be a prefix of the corresponding word of a candidate
/// command with the same word count.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry<H> {
    handlers: HashMap<String, H>,
}

impl<H> CommandRegistry<H> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, handler: H) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Resolve `input` to a registered handler: exact match first, then
    /// unambiguous word-wise abbreviation.
    pub fn get(&self, input: &str) -> Result<&H, LookupError> {
        if let Some(handler) = self.handlers.get(input) {
            return Ok(handler);
        }

        let name = match_abbreviation(input, self.handlers.keys().map(String::as_str))?;
        Ok(&self.handlers[&name])
    }
}

/// Resolve `input` against `candidates` using word-wise prefix abbreviation.
pub fn match_abbreviation<'a>(
    input: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Result<String, LookupError> {
    let input_words: Vec<&str> = input.split('-').collect();

    let matches: Vec<&str> = candidates
        .filter(|candidate| {
            let candidate_words: Vec<&str> = candidate.split('-').collect();
            candidate_words.len() == input_words.len()
                && input_words
                    .iter()
                    .zip(candidate_words.iter())
                    .all(|(input_word, candidate_word)| candidate_word.starts_with(input_word))
        })
        .collect();

    match matches.len() {
        0 => Err(LookupError::NotFound(input.to_string())),
        1 => Ok(matches[0].to_string()),
        _ => {
            let mut candidates: Vec<String> = matches.into_iter().map(String::from).collect();
            candidates.sort();
            Err(LookupError::Ambiguous {
                input: input.to_string(),
                candidates,
            })
        }
    }
}
