//! Wires a loaded [`Config`] into the building blocks the editor needs:
//! the flag matcher, the per-category validator registry, the program
//! alias table, and the resolved theme styles.

use std::collections::HashMap;
use std::path::PathBuf;

use prompt_config::{Config, ValidatorConfig};
use prompt_lexer::DuplicateOverlay;
use prompt_match::{FlagRule, Matcher};
use prompt_programs::ProgramAlias;
use prompt_style::{parse_color, ParsedColor};
use prompt_validate::{
    ChoiceValidator, CustomValidator, DirectoryValidator, FileValidator, MultipleChoiceValidator, SortMode,
    Validator, WarningsValidator,
};

/// Compile every declared flag's patterns into a [`Matcher`]. Invalid
/// patterns are skipped (and logged) inside `Matcher::new` itself.
pub fn build_matcher(config: &Config) -> Matcher {
    let rules: Vec<FlagRule<'_>> = config
        .flags
        .iter()
        .map(|flag| FlagRule {
            category: flag.category.as_str(),
            patterns: flag.regexps.as_slice(),
        })
        .collect();
    Matcher::new(&rules)
}

fn sort_mode_from(raw: Option<&str>) -> SortMode {
    match raw {
        Some("date") => SortMode::Date,
        Some("size") => SortMode::Size,
        _ => SortMode::Name,
    }
}

fn validator_from_config(vc: &ValidatorConfig, cwd: &PathBuf) -> Option<Box<dyn Validator>> {
    match vc {
        ValidatorConfig::File(cfg) => Some(Box::new(FileValidator {
            extensions: cfg.extensions.clone(),
            multiple: cfg.multiple,
            separator: cfg.separator.clone(),
            sort: sort_mode_from(cfg.sort.as_deref()),
            include: cfg.include.clone(),
            exclude: cfg.exclude.clone(),
            startup_directory: cwd.clone(),
        })),
        ValidatorConfig::Directory(cfg) => Some(Box::new(DirectoryValidator {
            inner: FileValidator {
                extensions: cfg.extensions.clone(),
                multiple: cfg.multiple,
                separator: cfg.separator.clone(),
                sort: sort_mode_from(cfg.sort.as_deref()),
                include: cfg.include.clone(),
                exclude: cfg.exclude.clone(),
                startup_directory: cwd.clone(),
            },
        })),
        ValidatorConfig::Choice(cfg) => Some(Box::new(ChoiceValidator {
            options: cfg.options.clone(),
        })),
        ValidatorConfig::MultipleChoice(cfg) => Some(Box::new(MultipleChoiceValidator::new(
            cfg.options.clone(),
            cfg.separator.clone(),
            cfg.minimum,
            cfg.maximum,
        ))),
        ValidatorConfig::Warnings(cfg) => Some(Box::new(WarningsValidator {
            prefix: cfg.prefix.clone(),
        })),
        // Custom validators shell out asynchronously and don't implement the
        // synchronous `Validator` trait; they're built separately and not
        // registered for inline tab-completion.
        ValidatorConfig::Custom(_) => None,
    }
}

/// Build the category -> validator registry from `config.flags`, plus a
/// parallel table of the `Custom` validators keyed by category for
/// out-of-band invocation.
pub fn build_validators(config: &Config, cwd: &PathBuf) -> (HashMap<String, Box<dyn Validator>>, HashMap<String, CustomValidator>) {
    let mut registry = HashMap::new();
    let mut custom = HashMap::new();

    for flag in &config.flags {
        let Some(validator_config) = &flag.validator else {
            continue;
        };
        if let ValidatorConfig::Custom(cfg) = validator_config {
            custom.insert(
                flag.category.clone(),
                CustomValidator::new(cfg.command.clone(), std::time::Duration::from_secs_f64(cfg.timeout)),
            );
            continue;
        }
        if let Some(validator) = validator_from_config(validator_config, cwd) {
            registry.insert(flag.category.clone(), validator);
        }
    }

    (registry, custom)
}

/// Borrow `config.programs` as the flat alias view `prompt-programs` wants.
pub fn build_program_aliases(config: &Config) -> Vec<ProgramAlias<'_>> {
    config
        .programs
        .iter()
        .map(|(name, program)| ProgramAlias {
            canonical_name: name.as_str(),
            aliases: program.aliases.as_slice(),
        })
        .collect()
}

/// Resolve a theme's per-category base styles, falling back to an empty
/// theme (no styling) when `theme_name` isn't configured.
pub fn build_theme_styles(config: &Config, theme_name: &str) -> HashMap<String, ParsedColor> {
    let mut styles = HashMap::new();
    let Some(theme) = config.get_theme(theme_name) else {
        return styles;
    };

    for (name, spec) in &theme.entries {
        match parse_color(spec) {
            Ok(parsed) => {
                styles.insert(name.clone(), parsed);
            }
            Err(err) => {
                tracing::warn!(category = name, spec, %err, "invalid theme color, skipping");
            }
        }
    }
    styles
}

/// Pull the three duplicate-overlay styles (`ui:duplicates-hidden`,
/// `ui:duplicates-selected`, `ui:duplicates-current`) out of a resolved
/// theme style map.
pub fn build_overlay_styles(theme_styles: &HashMap<String, ParsedColor>) -> HashMap<DuplicateOverlay, ParsedColor> {
    let mut overlays = HashMap::new();
    if let Some(style) = theme_styles.get("ui:duplicates-hidden") {
        overlays.insert(DuplicateOverlay::Hidden, style.clone());
    }
    if let Some(style) = theme_styles.get("ui:duplicates-selected") {
        overlays.insert(DuplicateOverlay::Selected, style.clone());
    }
    if let Some(style) = theme_styles.get("ui:duplicates-current") {
        overlays.insert(DuplicateOverlay::Current, style.clone());
    }
    overlays
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_config::load_config_from_string;

    #[test]
    fn builds_matcher_and_validators_from_default_config() {
        let config = load_config_from_string(prompt_config::default_document()).unwrap();
        let matcher = build_matcher(&config);
        let tokens = prompt_text::tokenize("gcc -Iinclude -o out main.c");
        let matches = matcher.match_tokens(&tokens);
        assert_eq!(matches[1].category, "Includes");

        let cwd = std::env::current_dir().unwrap();
        let (registry, custom) = build_validators(&config, &cwd);
        assert!(registry.contains_key("Includes"));
        assert!(custom.is_empty());
    }

    #[test]
    fn theme_styles_resolve_named_entries() {
        let config = load_config_from_string(prompt_config::default_document()).unwrap();
        let styles = build_theme_styles(&config, "default");
        assert!(styles.contains_key("Includes"));
        assert!(styles.contains_key("ui:gap"));
    }
}
