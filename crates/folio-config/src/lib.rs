//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support `${VAR}` expansion. Expanded fields:
//! - `server.host`
//! - `book.title`
//! - `book.github`
//! - `book.base`
//! - `book.footer`
//! - `build.site`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override theme file.
    pub theme: Option<PathBuf>,
    /// Override rank display.
    pub display_rank: Option<bool>,
    /// Override i18n mode.
    pub i18n: Option<bool>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override live reload enabled flag.
    pub live_reload_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Globs ignored by the scanner when `docs.ignored` is not set.
pub const DEFAULT_IGNORED: &[&str] = &["**/node_modules/**"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Book metadata copied into the compiled book config.
    pub book: BookSection,
    /// Server configuration.
    pub server: ServerConfig,
    /// Live reload configuration.
    pub live_reload: LiveReloadConfig,
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// `[book]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BookSection {
    /// Book title, appended to every page title.
    pub title: Option<String>,
    /// Navbar icon path.
    pub icon: Option<String>,
    /// Repository URL.
    pub github: Option<String>,
    /// Path of the docs project inside the repository, e.g. `packages/site`.
    pub base: Option<String>,
    /// Repository branch used for "edit this page" links.
    pub source_branch: Option<String>,
    /// Keep rank prefixes in titles and URLs.
    pub display_rank: bool,
    /// Render the home page as a landing page without sidebar.
    pub home_mode: bool,
    /// Skip heading entries in the sidebar.
    pub only_file: bool,
    /// Footer markdown.
    pub footer: Option<String>,
    /// Extra top navigation entries.
    pub nav: Vec<NavLink>,
}

/// A top navigation entry declared in config.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NavLink {
    /// Entry title. An entry titled `github` sets the repository link instead.
    pub title: String,
    /// Target URL or path.
    pub link: String,
    /// Sort key within the navbar.
    #[serde(default)]
    pub nav_order: Option<i64>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7890,
        }
    }
}

/// Live reload configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Whether live reload is enabled.
    pub enabled: bool,
    /// Quiet period before a burst of changes triggers a recompute.
    pub debounce_ms: u64,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 100,
        }
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    theme: Option<String>,
    ignored: Option<Vec<String>>,
    i18n: Option<bool>,
    fallback_language: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Source directory for markdown files.
    pub source_dir: PathBuf,
    /// Theme file watched and served separately from content.
    pub theme: Option<PathBuf>,
    /// Glob patterns skipped while scanning.
    pub ignored: Vec<String>,
    /// Treat top-level directories as language trees.
    pub i18n: bool,
    /// Language used when a page has no translation.
    pub fallback_language: Option<String>,
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    output_dir: Option<String>,
    site: Option<String>,
}

/// Resolved build configuration.
#[derive(Debug, Default)]
pub struct BuildConfig {
    /// Directory receiving `book.json`, search documents and the sitemap.
    pub output_dir: PathBuf,
    /// Public site URL. A sitemap is written only when set.
    pub site: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`book.title`").
        field: String,
        /// Error message (e.g., "${`BOOK_TITLE`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, then the
    /// result is validated again.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(theme) = &settings.theme {
            self.docs_resolved.theme = Some(theme.clone());
        }
        if let Some(display_rank) = settings.display_rank {
            self.book.display_rank = display_rank;
        }
        if let Some(i18n) = settings.i18n {
            self.docs_resolved.i18n = i18n;
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(live_reload_enabled) = settings.live_reload_enabled {
            self.live_reload.enabled = live_reload_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            book: BookSection::default(),
            server: ServerConfig::default(),
            live_reload: LiveReloadConfig::default(),
            docs: DocsConfigRaw::default(),
            build: BuildConfigRaw::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                theme: None,
                ignored: default_ignored(),
                i18n: false,
                fallback_language: None,
            },
            build_resolved: BuildConfig {
                output_dir: base.join("dist"),
                site: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_docs()?;
        self.validate_book()?;

        if self.live_reload.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "live_reload.debounce_ms must be greater than 0".to_owned(),
            ));
        }
        if let Some(ref site) = self.build_resolved.site {
            require_http_url(site, "build.site")?;
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 lets the OS pick, which is never what a docs preview wants
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        for pattern in &self.docs_resolved.ignored {
            glob::Pattern::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("docs.ignored pattern '{pattern}' is invalid: {e}"))
            })?;
        }
        if let Some(ref lang) = self.docs_resolved.fallback_language {
            require_non_empty(lang, "docs.fallback_language")?;
        }
        Ok(())
    }

    fn validate_book(&self) -> Result<(), ConfigError> {
        for entry in &self.book.nav {
            require_non_empty(&entry.title, "book.nav.title")?;
            require_non_empty(&entry.link, "book.nav.link")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        expand::expand_opt(&mut self.book.title, "book.title")?;
        expand::expand_opt(&mut self.book.github, "book.github")?;
        expand::expand_opt(&mut self.book.base, "book.base")?;
        expand::expand_opt(&mut self.book.footer, "book.footer")?;
        expand::expand_opt(&mut self.build.site, "build.site")?;

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            theme: self.docs.theme.as_deref().map(|t| config_dir.join(t)),
            ignored: self.docs.ignored.clone().unwrap_or_else(default_ignored),
            i18n: self.docs.i18n.unwrap_or(false),
            fallback_language: self.docs.fallback_language.clone(),
        };

        self.build_resolved = BuildConfig {
            output_dir: resolve(self.build.output_dir.as_deref(), "dist"),
            site: self.build.site.clone(),
        };
    }
}

fn default_ignored() -> Vec<String> {
    DEFAULT_IGNORED.iter().map(|s| (*s).to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7890);
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(config.build_resolved.output_dir, PathBuf::from("/test/dist"));
        assert_eq!(config.docs_resolved.ignored, vec!["**/node_modules/**"]);
        assert!(config.live_reload.enabled);
        assert_eq!(config.live_reload.debounce_ms, 100);
        assert!(!config.book.display_rank);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 7890);
        assert!(config.book.nav.is_empty());
    }

    #[test]
    fn test_parse_book_section() {
        let toml = r#"
[book]
title = "Handbook"
display_rank = true
home_mode = true
nav = [
  { title = "GitHub", link = "https://github.com/acme/handbook" },
  { title = "Blog", link = "https://blog.acme.dev", nav_order = 5 },
]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.book.title.as_deref(), Some("Handbook"));
        assert!(config.book.display_rank);
        assert!(config.book.home_mode);
        assert_eq!(
            config.book.nav,
            vec![
                NavLink {
                    title: "GitHub".to_owned(),
                    link: "https://github.com/acme/handbook".to_owned(),
                    nav_order: None,
                },
                NavLink {
                    title: "Blog".to_owned(),
                    link: "https://blog.acme.dev".to_owned(),
                    nav_order: Some(5),
                },
            ]
        );
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
source_dir = "documentation"
theme = "theme.json"
i18n = true
fallback_language = "en"

[build]
output_dir = "public"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/documentation")
        );
        assert_eq!(
            config.docs_resolved.theme,
            Some(PathBuf::from("/project/theme.json"))
        );
        assert!(config.docs_resolved.i18n);
        assert_eq!(config.docs_resolved.fallback_language.as_deref(), Some("en"));
        assert_eq!(
            config.build_resolved.output_dir,
            PathBuf::from("/project/public")
        );
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_rejects_bad_ignored_glob() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.docs_resolved.ignored = vec!["**/[".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("docs.ignored"));
    }

    #[test]
    fn test_validate_rejects_non_http_site() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.build_resolved.site = Some("ftp://docs.example.com".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("build.site"));
    }

    #[test]
    fn test_validate_rejects_zero_debounce() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.live_reload.debounce_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            port: Some(9000),
            source_dir: Some(PathBuf::from("/custom/docs")),
            display_rank: Some(true),
            live_reload_enabled: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/custom/docs")
        );
        assert!(config.book.display_rank);
        assert!(!config.live_reload.enabled);
        assert!(!config.docs_resolved.i18n);
    }

    #[test]
    fn test_load_from_file_and_discover() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("folio.toml"),
            "[book]\ntitle = \"Guide\"\n[server]\nport = 8100\n",
        )
        .unwrap();
        let nested = dir.path().join("docs/deep");
        std::fs::create_dir_all(&nested).unwrap();

        let found = Config::discover_from(&nested).unwrap();
        assert_eq!(found, dir.path().join("folio.toml"));

        let config = Config::load(Some(found.as_path()), None).unwrap();
        assert_eq!(config.book.title.as_deref(), Some("Guide"));
        assert_eq!(config.server.port, 8100);
        assert_eq!(config.docs_resolved.source_dir, dir.path().join("docs"));
        assert_eq!(config.config_path, Some(found));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/folio.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
