//! YAML configuration loading: a main file plus a drop-in directory,
//! deep-merged before being deserialized into [`Config`].

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::defaults::default_document;
use crate::schema::Config;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} as YAML: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prompt")
        .join("config.yaml")
}

pub fn default_dropin_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prompt")
        .join("conf.d")
}

/// Recursively merge `overlay` onto `base`: mappings merge key-by-key,
/// sequences concatenate, and anything else (scalars, mismatched types) is
/// overwritten by the overlay's value.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        (Value::Sequence(mut base_seq), Value::Sequence(overlay_seq)) => {
            base_seq.extend(overlay_seq);
            Value::Sequence(base_seq)
        }
        (_, overlay) => overlay,
    }
}

/// Parse a single YAML file into a [`Value`] for merging.
pub fn load_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every `*.yaml`/`*.yml` file in `dir`, in a single combined
/// lexicographic order, merging each on top of the last.
pub fn load_dropin_directory(dir: &Path) -> Result<Value, ConfigError> {
    let mut merged = Value::Mapping(Default::default());

    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(merged);
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    paths.sort();

    for path in paths {
        debug!(?path, "loading drop-in config fragment");
        let fragment = load_yaml_file(&path)?;
        merged = deep_merge(merged, fragment);
    }

    Ok(merged)
}

/// Load the full configuration: built-in defaults, then the main config
/// file (if present), then the drop-in directory, each layer merged on top
/// of the last. Missing optional files are treated as empty, not errors.
pub fn load_config(config_path: Option<&Path>, dropin_dir: Option<&Path>) -> Result<Config, ConfigError> {
    let mut merged: Value = serde_yaml::from_str(default_document()).expect("built-in defaults must parse");

    let config_path = config_path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if config_path.exists() {
        merged = deep_merge(merged, load_yaml_file(&config_path)?);
    } else {
        debug!(?config_path, "no main config file found, using defaults");
    }

    let dropin_dir = dropin_dir.map(Path::to_path_buf).unwrap_or_else(default_dropin_dir);
    if dropin_dir.is_dir() {
        merged = deep_merge(merged, load_dropin_directory(&dropin_dir)?);
    }

    serde_yaml::from_value(merged.clone()).or_else(|err| {
        warn!(%err, "merged configuration failed to deserialize, falling back to defaults");
        load_config_from_string(default_document())
    })
}

/// Parse a YAML string directly into [`Config`], bypassing file discovery.
/// Primarily for tests and the `--config` override path.
pub fn load_config_from_string(content: &str) -> Result<Config, ConfigError> {
    serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
        path: PathBuf::from("<string>"),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn deep_merge_recurses_into_mappings() {
        let base: Value = serde_yaml::from_str("a:\n  b: 1\n  c: 2\n").unwrap();
        let overlay: Value = serde_yaml::from_str("a:\n  c: 3\n  d: 4\n").unwrap();
        let merged = deep_merge(base, overlay);
        let expected: Value = serde_yaml::from_str("a:\n  b: 1\n  c: 3\n  d: 4\n").unwrap();
        assert_eq!(merged, expected);
    }

    #[test]
    fn deep_merge_concatenates_sequences() {
        let base: Value = serde_yaml::from_str("items: [1, 2]\n").unwrap();
        let overlay: Value = serde_yaml::from_str("items: [3]\n").unwrap();
        let merged = deep_merge(base, overlay);
        let expected: Value = serde_yaml::from_str("items: [1, 2, 3]\n").unwrap();
        assert_eq!(merged, expected);
    }

    #[test]
    fn dropin_directory_loads_in_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("10-second.yaml"))
            .unwrap()
            .write_all(b"aliases:\n  q: \"second\"\n")
            .unwrap();
        File::create(dir.path().join("01-first.yml"))
            .unwrap()
            .write_all(b"aliases:\n  q: \"first\"\n")
            .unwrap();

        let merged = load_dropin_directory(dir.path()).unwrap();
        let aliases = merged.get("aliases").unwrap().get("q").unwrap().as_str().unwrap();
        assert_eq!(aliases, "second");
    }

    #[test]
    fn load_config_falls_back_to_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing_config = dir.path().join("config.yaml");
        let missing_dropin = dir.path().join("conf.d");
        let config = load_config(Some(&missing_config), Some(&missing_dropin)).unwrap();
        assert!(config.categories.contains_key("Includes"));
    }
}
