//! Book config artifact and its compiler.
//!
//! [`BookCompiler::generate`] scans the docs tree and produces the
//! [`BookConfig`] that is written to `book.json`, served to clients and
//! compiled into a [`BookModel`](crate::model::BookModel).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use folio_storage::Storage;

use crate::error::ScanError;
use crate::metadata::MetadataReader;
use crate::nav::split_github;
use crate::nav_item::NavItem;
use crate::scanner::{DEFAULT_IGNORED, LangSidebar, Redirects, ScanOptions, Scanner};

/// Sidebar of a book: one tree, or one tree per language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SidebarConfig {
    Single(Vec<NavItem>),
    I18n(BTreeMap<String, LangSidebar>),
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self::Single(Vec::new())
    }
}

impl SidebarConfig {
    /// Language codes, empty for a single tree.
    #[must_use]
    pub fn languages(&self) -> Vec<String> {
        match self {
            Self::Single(_) => Vec::new(),
            Self::I18n(langs) => langs.keys().cloned().collect(),
        }
    }

    /// Every tree with its language code (empty for a single tree).
    #[must_use]
    pub fn trees(&self) -> Vec<(&str, &[NavItem])> {
        match self {
            Self::Single(items) => vec![("", items.as_slice())],
            Self::I18n(langs) => langs
                .iter()
                .map(|(code, lang)| (code.as_str(), lang.data.as_slice()))
                .collect(),
        }
    }

    fn without_hashes(&self) -> Self {
        let strip = |items: &[NavItem]| items.iter().map(NavItem::without_hashes).collect();
        match self {
            Self::Single(items) => Self::Single(strip(items)),
            Self::I18n(langs) => Self::I18n(
                langs
                    .iter()
                    .map(|(code, lang)| {
                        (
                            code.clone(),
                            LangSidebar {
                                name: lang.name.clone(),
                                data: strip(&lang.data),
                            },
                        )
                    })
                    .collect(),
            ),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Compiled book description.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    /// Docs project directory inside the repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_branch: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub display_rank: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub home_mode: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub only_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    /// Language whose pages fill untranslated ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_language: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nav: Vec<NavItem>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub redirects: Redirects,
    pub sidebar: SidebarConfig,
}

impl BookConfig {
    /// Whether `other` has the same structure, ignoring page content hashes.
    #[must_use]
    pub fn same_structure(&self, other: &Self) -> bool {
        self.without_hashes() == other.without_hashes()
    }

    fn without_hashes(&self) -> Self {
        Self {
            sidebar: self.sidebar.without_hashes(),
            ..self.clone()
        }
    }

    /// Fallback language if it exists in the tree, else the first language.
    #[must_use]
    pub fn fallback_language(&self) -> Option<String> {
        let langs = self.sidebar.languages();
        self.fallback_language
            .as_ref()
            .filter(|code| langs.contains(code))
            .cloned()
            .or_else(|| langs.into_iter().next())
    }

    /// Pretty JSON with a trailing newline, as written to `book.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Settings of a [`BookCompiler`].
#[derive(Clone, Debug)]
pub struct BookOptions {
    pub title: String,
    pub icon: Option<String>,
    pub github: Option<String>,
    pub base: Option<String>,
    pub source_dir: Option<String>,
    pub source_branch: Option<String>,
    pub display_rank: bool,
    pub home_mode: bool,
    pub only_file: bool,
    pub footer: Option<String>,
    /// Navbar entries from the book config.
    pub nav: Vec<NavItem>,
    pub i18n: bool,
    pub fallback_language: Option<String>,
    pub ignored: Vec<Pattern>,
}

impl Default for BookOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            icon: None,
            github: None,
            base: None,
            source_dir: None,
            source_branch: None,
            display_rank: false,
            home_mode: false,
            only_file: false,
            footer: None,
            nav: Vec::new(),
            i18n: false,
            fallback_language: None,
            ignored: Pattern::new(DEFAULT_IGNORED).into_iter().collect(),
        }
    }
}

/// Scans a docs tree into a [`BookConfig`].
///
/// Keeps one [`MetadataReader`] for its whole lifetime so repeated
/// generations only parse files whose content changed.
pub struct BookCompiler {
    reader: Arc<MetadataReader>,
    options: BookOptions,
}

impl BookCompiler {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, options: BookOptions) -> Self {
        Self {
            reader: Arc::new(MetadataReader::new(storage)),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &BookOptions {
        &self.options
    }

    /// Shared metadata reader.
    #[must_use]
    pub fn reader(&self) -> &Arc<MetadataReader> {
        &self.reader
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        self.reader.storage()
    }

    /// Scan the docs tree from its current state.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] for structural problems in the tree.
    pub fn generate(&self) -> Result<BookConfig, ScanError> {
        let start = Instant::now();
        let options = &self.options;
        let scanner = Scanner::new(
            Arc::clone(&self.reader),
            ScanOptions {
                display_rank: options.display_rank,
                only_file: options.only_file,
                ignored: options.ignored.clone(),
            },
        );

        let (sidebar, redirects) = if options.i18n {
            let output = scanner.scan_i18n()?;
            (SidebarConfig::I18n(output.langs), output.redirects)
        } else {
            let output = scanner.scan()?;
            (SidebarConfig::Single(output.sidebar), output.redirects)
        };

        let (nav, nav_github) = split_github(options.nav.clone());

        let config = BookConfig {
            version: Some(env!("CARGO_PKG_VERSION").to_owned()),
            title: options.title.clone(),
            icon: options.icon.clone(),
            github: options.github.clone().or(nav_github),
            base: options.base.clone(),
            source_dir: options.source_dir.clone(),
            source_branch: options.source_branch.clone(),
            display_rank: options.display_rank,
            home_mode: options.home_mode,
            only_file: options.only_file,
            footer: options.footer.clone(),
            fallback_language: options.fallback_language.clone(),
            nav,
            redirects,
            sidebar,
        };

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            cached_files = self.reader.cached_len(),
            "Book config updated"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_storage::MockStorage;
    use pretty_assertions::assert_eq;

    fn compiler(storage: MockStorage, options: BookOptions) -> BookCompiler {
        BookCompiler::new(Arc::new(storage), options)
    }

    #[test]
    fn test_generate_single_tree() {
        let storage = MockStorage::new()
            .with_file("README.md", "# Home")
            .with_file("old.md", "---\nredirect: ./README.md\n---\n");
        let options = BookOptions {
            title: "Folio".to_owned(),
            nav: vec![
                NavItem::link("GitHub", "https://github.com/example/folio"),
                NavItem::link("Blog", "https://blog.example.com"),
            ],
            ..BookOptions::default()
        };
        let config = compiler(storage, options).generate().unwrap();

        assert_eq!(config.title, "Folio");
        assert_eq!(config.github.as_deref(), Some("https://github.com/example/folio"));
        assert_eq!(config.nav.len(), 1);
        assert_eq!(config.redirects.get("/old.md").map(String::as_str), Some("/README.md"));
        let SidebarConfig::Single(items) = &config.sidebar else {
            panic!("expected a single tree");
        };
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_explicit_github_wins() {
        let options = BookOptions {
            github: Some("https://github.com/a/b".to_owned()),
            nav: vec![NavItem::link("github", "https://github.com/c/d")],
            ..BookOptions::default()
        };
        let config = compiler(MockStorage::new().with_file("a.md", "# A"), options)
            .generate()
            .unwrap();
        assert_eq!(config.github.as_deref(), Some("https://github.com/a/b"));
        assert!(config.nav.is_empty());
    }

    #[test]
    fn test_generate_i18n() {
        let storage = MockStorage::new()
            .with_file("en/README.md", "# Home")
            .with_file("zh/README.md", "# 首页");
        let options = BookOptions {
            i18n: true,
            fallback_language: Some("zh".to_owned()),
            ..BookOptions::default()
        };
        let config = compiler(storage, options).generate().unwrap();
        assert_eq!(config.sidebar.languages(), vec!["en", "zh"]);
        assert_eq!(config.fallback_language().as_deref(), Some("zh"));
    }

    #[test]
    fn test_sidebar_config_json_shapes() {
        let single = SidebarConfig::Single(vec![NavItem::file("A", "/a.md")]);
        assert!(serde_json::to_value(&single).unwrap().is_array());

        let mut langs = BTreeMap::new();
        langs.insert(
            "en".to_owned(),
            LangSidebar {
                name: "English".to_owned(),
                data: vec![NavItem::file("A", "/a.md")],
            },
        );
        let i18n = SidebarConfig::I18n(langs);
        let json = serde_json::to_value(&i18n).unwrap();
        assert_eq!(json["en"]["name"], "English");

        let back: SidebarConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, i18n);
    }

    #[test]
    fn test_same_structure_ignores_hashes() {
        let a = BookConfig {
            sidebar: SidebarConfig::Single(vec![NavItem::file("A", "/a.md").with_hash("11111111")]),
            ..BookConfig::default()
        };
        let b = BookConfig {
            sidebar: SidebarConfig::Single(vec![NavItem::file("A", "/a.md").with_hash("22222222")]),
            ..BookConfig::default()
        };
        let c = BookConfig {
            sidebar: SidebarConfig::Single(vec![NavItem::file("B", "/a.md").with_hash("22222222")]),
            ..BookConfig::default()
        };
        assert!(a.same_structure(&b));
        assert!(!a.same_structure(&c));
    }

    #[test]
    fn test_fallback_language_defaults_to_first() {
        let mut langs = BTreeMap::new();
        for code in ["en", "zh"] {
            langs.insert(code.to_owned(), LangSidebar::default());
        }
        let config = BookConfig {
            fallback_language: Some("fr".to_owned()),
            sidebar: SidebarConfig::I18n(langs),
            ..BookConfig::default()
        };
        assert_eq!(config.fallback_language().as_deref(), Some("en"));
        assert_eq!(BookConfig::default().fallback_language(), None);
    }

    #[test]
    fn test_to_json_round_trip() {
        let config = BookConfig {
            title: "Folio".to_owned(),
            display_rank: true,
            sidebar: SidebarConfig::Single(vec![NavItem::file("A", "/a.md")]),
            ..BookConfig::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.ends_with("}\n"));
        assert!(json.contains("\"displayRank\": true"));
        assert!(!json.contains("homeMode"));
        let back: BookConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
