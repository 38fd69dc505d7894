//! Theme file loading.
//!
//! A theme is a JSON, TOML or YAML file whose content is handed to clients as
//! JSON. The current value is kept in [`ThemeState`] and replaced whenever the
//! file changes and still parses.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

/// Error loading a theme file.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ThemeError {
    #[error("Failed to read theme {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON theme: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML theme: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid YAML theme: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported theme format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Parse a theme file by extension.
pub(crate) fn load_theme(path: &Path) -> Result<Value, ThemeError> {
    let content = std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("toml") => {
            let value: toml::Value = toml::from_str(&content)?;
            Ok(serde_json::to_value(value)?)
        }
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&content)?),
        _ => Err(ThemeError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Current theme, shared between handlers and the theme watcher.
pub(crate) struct ThemeState {
    path: Option<PathBuf>,
    value: RwLock<Value>,
}

impl ThemeState {
    /// Load the theme at `path`. A missing or invalid file leaves an empty theme.
    pub(crate) fn load(path: Option<PathBuf>) -> Self {
        let value = path
            .as_deref()
            .and_then(|p| match load_theme(p) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load theme");
                    None
                }
            })
            .unwrap_or_else(empty_theme);
        Self {
            path,
            value: RwLock::new(value),
        }
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn current(&self) -> Value {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-read the theme file. Returns the new value, or `None` if the file
    /// could not be loaded and the previous theme was kept.
    pub(crate) fn reload(&self) -> Option<Value> {
        let path = self.path.as_deref()?;
        match load_theme(path) {
            Ok(value) => {
                *self.value.write().unwrap_or_else(PoisonError::into_inner) = value.clone();
                Some(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to reload theme");
                None
            }
        }
    }
}

fn empty_theme() -> Value {
    Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_load_theme_formats() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("theme.json");
        fs::write(&json_path, r##"{"primaryColor": "#ff0000"}"##).unwrap();
        let toml_path = dir.path().join("theme.toml");
        fs::write(&toml_path, "primaryColor = \"#ff0000\"\n").unwrap();
        let yaml_path = dir.path().join("theme.yml");
        fs::write(&yaml_path, "primaryColor: '#ff0000'\n").unwrap();

        let expected = json!({"primaryColor": "#ff0000"});
        for path in [json_path, toml_path, yaml_path] {
            assert_eq!(load_theme(&path).unwrap(), expected);
        }
    }

    #[test]
    fn test_load_theme_errors() {
        let dir = tempfile::tempdir().unwrap();
        let css = dir.path().join("theme.css");
        fs::write(&css, "body {}").unwrap();
        assert!(matches!(load_theme(&css), Err(ThemeError::UnsupportedFormat(_))));
        assert!(matches!(
            load_theme(&dir.path().join("missing.json")),
            Err(ThemeError::Io { .. })
        ));
    }

    #[test]
    fn test_reload_keeps_previous_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        fs::write(&path, r#"{"a": 1}"#).unwrap();
        let state = ThemeState::load(Some(path.clone()));
        assert_eq!(state.current(), json!({"a": 1}));

        fs::write(&path, "{not json").unwrap();
        assert_eq!(state.reload(), None);
        assert_eq!(state.current(), json!({"a": 1}));

        fs::write(&path, r#"{"a": 2}"#).unwrap();
        assert_eq!(state.reload(), Some(json!({"a": 2})));
        assert_eq!(state.current(), json!({"a": 2}));
    }

    #[test]
    fn test_missing_theme_is_empty() {
        let state = ThemeState::load(None);
        assert_eq!(state.current(), json!({}));
        assert_eq!(state.reload(), None);
    }
}
