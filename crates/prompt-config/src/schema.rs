//! Deserializable configuration schema.

use std::collections::HashMap;

use serde::Deserialize;

fn default_separator() -> String {
    ",".to_string()
}

fn default_warnings_prefix() -> String {
    "no-".to_string()
}

fn default_true() -> bool {
    true
}

fn default_granularity() -> String {
    "token".to_string()
}

/// A single validator declaration, tagged on `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ValidatorConfig {
    File(FileValidatorConfig),
    Directory(FileValidatorConfig),
    Choice(ChoiceValidatorConfig),
    MultipleChoice(MultipleChoiceValidatorConfig),
    Warnings(WarningsValidatorConfig),
    Custom(CustomValidatorConfig),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileValidatorConfig {
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChoiceValidatorConfig {
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MultipleChoiceValidatorConfig {
    pub options: Vec<String>,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub minimum: Option<usize>,
    #[serde(default)]
    pub maximum: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WarningsValidatorConfig {
    #[serde(default = "default_warnings_prefix")]
    pub prefix: String,
}

impl Default for WarningsValidatorConfig {
    fn default() -> Self {
        Self {
            prefix: default_warnings_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CustomValidatorConfig {
    pub command: String,
    #[serde(default = "default_custom_timeout")]
    pub timeout: f64,
}

fn default_custom_timeout() -> f64 {
    5.0
}

/// A flag definition: the category it belongs to, the patterns that match
/// it, and how its captured value should be completed/validated.
#[derive(Debug, Clone, Deserialize)]
pub struct Flag {
    pub category: String,
    pub regexps: Vec<String>,
    #[serde(default)]
    pub capture_groups: Vec<String>,
    #[serde(default)]
    pub validator: Option<ValidatorConfig>,
    #[serde(default)]
    pub help: Option<String>,
}

/// Normalizes `colors: red` and `colors: [red, blue]` to the same shape.
#[derive(Debug, Clone, Default)]
pub struct Category {
    pub colors: Vec<String>,
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColorsField {
            One(String),
            Many(Vec<String>),
        }

        #[derive(Deserialize)]
        struct Raw {
            colors: ColorsField,
        }

        let raw = Raw::deserialize(deserializer)?;
        let colors = match raw.colors {
            ColorsField::One(c) => vec![c],
            ColorsField::Many(c) => c,
        };
        Ok(Category { colors })
    }
}

/// Maps a group name (e.g. `Compiler`) to the member category names it
/// aggregates for duplicate-detection purposes.
pub type CategoryMap = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Theme {
    #[serde(flatten)]
    pub entries: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Program {
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct KeyBindings {
    #[serde(default)]
    pub normal: HashMap<String, String>,
    #[serde(default)]
    pub duplicates: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_granularity")]
    pub granularity: String,
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            granularity: default_granularity(),
            color: true,
        }
    }
}

/// The full, merged configuration document.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub config: GlobalConfig,
    #[serde(default)]
    pub categories: HashMap<String, Category>,
    #[serde(default)]
    pub category_maps: CategoryMap,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default)]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub programs: HashMap<String, Program>,
    #[serde(default)]
    pub keybindings: KeyBindings,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Config {
    pub fn get_program(&self, name: &str) -> Option<(&str, &Program)> {
        self.programs.iter().find(|(n, _)| n.as_str() == name).map(|(n, p)| (n.as_str(), p))
    }

    pub fn get_flags_for_program(&self, _program: &str) -> Vec<&Flag> {
        // Flag categories aren't currently scoped per program in the
        // configuration schema: every declared flag applies everywhere.
        self.flags.iter().collect()
    }

    pub fn get_theme(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_accepts_single_or_list_colors() {
        let single: Category = serde_yaml::from_str("colors: red").unwrap();
        assert_eq!(single.colors, vec!["red".to_string()]);

        let many: Category = serde_yaml::from_str("colors: [red, blue]").unwrap();
        assert_eq!(many.colors, vec!["red".to_string(), "blue".to_string()]);
    }

    #[test]
    fn validator_config_tags_on_type() {
        let yaml = "type: choice\noptions: [\"0\", \"1\", \"2\"]\n";
        let validator: ValidatorConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(validator, ValidatorConfig::Choice(_)));
    }
}
