//! Configuration schema, YAML loading, and built-in defaults.

mod defaults;
mod loader;
mod schema;

pub use defaults::default_document;
pub use loader::{
    default_config_path, default_dropin_dir, deep_merge, load_config, load_config_from_string,
    load_dropin_directory, load_yaml_file, ConfigError,
};
pub use schema::{
    Category, CategoryMap, ChoiceValidatorConfig, Config, CustomValidatorConfig, FileValidatorConfig,
    Flag, GlobalConfig, KeyBindings, MultipleChoiceValidatorConfig, Program, Theme, ValidatorConfig,
    WarningsValidatorConfig,
};
