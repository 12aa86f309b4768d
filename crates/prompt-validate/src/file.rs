//! File and directory path validators.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::base::{Validator, ValidatorResult};

/// Ordering applied to directory listings before they're offered as
/// completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Name,
    Date,
    Size,
}

/// Completes and validates filesystem paths, optionally restricted to a set
/// of extensions and an include/exclude glob filter.
#[derive(Debug, Clone)]
pub struct FileValidator {
    pub extensions: Vec<String>,
    pub multiple: bool,
    pub separator: String,
    pub sort: SortMode,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub startup_directory: PathBuf,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            multiple: false,
            separator: ",".to_string(),
            sort: SortMode::Name,
            include: Vec::new(),
            exclude: Vec::new(),
            startup_directory: PathBuf::from("."),
        }
    }
}

impl FileValidator {
    /// Split off all but the last `,`-separated (or configured separator)
    /// value, returning `(already_completed, last_partial)`.
    fn split_multiple<'a>(&self, value: &'a str) -> (&'a str, &'a str) {
        if !self.multiple {
            return ("", value);
        }
        match value.rfind(self.separator.as_str()) {
            Some(idx) => (&value[..idx + self.separator.len()], &value[idx + self.separator.len()..]),
            None => ("", value),
        }
    }

    fn resolve_dir_and_prefix(&self, partial: &str) -> (PathBuf, String) {
        let as_path = Path::new(partial);
        if partial.ends_with('/') {
            (self.startup_directory.join(as_path), String::new())
        } else if let Some(parent) = as_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let prefix = as_path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            (self.startup_directory.join(parent), prefix)
        } else {
            (self.startup_directory.clone(), partial.to_string())
        }
    }

    fn list_entries(&self, dir: &Path, prefix: &str) -> Vec<fs::DirEntry> {
        let Ok(read_dir) = fs::read_dir(dir) else {
            return Vec::new();
        };

        read_dir
            .filter_map(Result::ok)
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if prefix.is_empty() && name.starts_with('.') {
                    return false;
                }
                if !prefix.is_empty() && !name.starts_with(prefix) {
                    return false;
                }
                self.passes_filters(&name, entry)
            })
            .collect()
    }

    fn passes_filters(&self, name: &str, entry: &fs::DirEntry) -> bool {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if !is_dir && !self.extensions.is_empty() {
            let matches_ext = self.extensions.iter().any(|ext| {
                if ext.is_empty() {
                    !name.contains('.')
                } else {
                    name.ends_with(ext.as_str())
                }
            });
            if !matches_ext {
                return false;
            }
        }

        if !self.include.is_empty()
            && !self
                .include
                .iter()
                .any(|pattern| Pattern::new(pattern).map(|p| p.matches(name)).unwrap_or(false))
        {
            return false;
        }

        if self
            .exclude
            .iter()
            .any(|pattern| Pattern::new(pattern).map(|p| p.matches(name)).unwrap_or(false))
        {
            return false;
        }

        true
    }

    fn sort_entries(&self, mut entries: Vec<fs::DirEntry>) -> Vec<fs::DirEntry> {
        match self.sort {
            SortMode::Name => entries.sort_by_key(|e| e.file_name()),
            SortMode::Date => entries.sort_by_key(|e| {
                e.metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
            }),
            SortMode::Size => entries.sort_by_key(|e| e.metadata().map(|m| m.len()).unwrap_or(0)),
        }
        entries
    }

    fn completions_for(&self, partial: &str, dirs_only: bool) -> Vec<String> {
        let (dir, prefix) = self.resolve_dir_and_prefix(partial);
        let entries = self.sort_entries(self.list_entries(&dir, &prefix));

        entries
            .into_iter()
            .filter(|entry| !dirs_only || entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                    format!("{name}/")
                } else {
                    name
                }
            })
            .collect()
    }
}

impl Validator for FileValidator {
    fn get_completions(&self, partial: &str) -> Vec<String> {
        let (prefix, tail) = self.split_multiple(partial);
        self.completions_for(tail, false)
            .into_iter()
            .map(|c| format!("{prefix}{c}"))
            .collect()
    }

    fn validate(&self, value: &str) -> ValidatorResult {
        let values: Vec<&str> = if self.multiple {
            value.split(self.separator.as_str()).collect()
        } else {
            vec![value]
        };

        for v in values {
            let path = self.startup_directory.join(v);
            if !path.exists() {
                return ValidatorResult::invalid(format!("no such file: {v}"));
            }
            if !self.extensions.is_empty() {
                let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
                let matches_ext = self.extensions.iter().any(|ext| {
                    if ext.is_empty() {
                        !name.contains('.')
                    } else {
                        name.ends_with(ext.as_str())
                    }
                });
                if !matches_ext {
                    return ValidatorResult::invalid(format!("unexpected extension: {v}"));
                }
            }
        }

        ValidatorResult::ok()
    }
}

/// Like [`FileValidator`] but offers and accepts only directories; any
/// configured `extensions` are ignored.
#[derive(Debug, Clone, Default)]
pub struct DirectoryValidator {
    pub inner: FileValidator,
}

impl Validator for DirectoryValidator {
    fn get_completions(&self, partial: &str) -> Vec<String> {
        let (prefix, tail) = self.inner.split_multiple(partial);
        self.inner
            .completions_for(tail, true)
            .into_iter()
            .map(|c| format!("{prefix}{c}"))
            .collect()
    }

    fn validate(&self, value: &str) -> ValidatorResult {
        let path = self.inner.startup_directory.join(value);
        if path.is_dir() {
            ValidatorResult::ok()
        } else {
            ValidatorResult::invalid(format!("no such directory: {value}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn lists_matching_extensions_and_hides_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("main.c")).unwrap();
        File::create(dir.path().join("main.o")).unwrap();
        File::create(dir.path().join(".hidden.c")).unwrap();

        let validator = FileValidator {
            extensions: vec![".c".to_string()],
            startup_directory: dir.path().to_path_buf(),
            ..Default::default()
        };

        let completions = validator.get_completions("");
        assert_eq!(completions, vec!["main.c".to_string()]);
    }

    #[test]
    fn validate_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let validator = FileValidator {
            startup_directory: dir.path().to_path_buf(),
            ..Default::default()
        };
        let result = validator.validate("nope.c");
        assert!(!result.valid);
    }

    #[test]
    fn directory_validator_only_lists_dirs() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("file.txt")).unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let validator = DirectoryValidator {
            inner: FileValidator {
                startup_directory: dir.path().to_path_buf(),
                ..Default::default()
            },
        };
        let completions = validator.get_completions("");
        assert_eq!(completions, vec!["subdir/".to_string()]);
    }
}
