//! Sidebar tree nodes.
//!
//! [`NavItem`] is the raw scan result. [`AnnotatedNavItem`] is the same tree
//! with the derived link forms added; it is produced by
//! [`annotate`](crate::annotate::annotate) and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::frontmatter::{Feature, FrontMatter, Hero};

/// Node type of a sidebar entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavItemKind {
    Dir,
    File,
    Heading,
    /// External entry from the book config.
    #[default]
    Link,
}

/// Frontmatter settings carried by a sidebar entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavSettings {
    #[serde(skip_serializing_if = "is_false")]
    pub is_nav: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav_order: Option<i64>,
    #[serde(skip_serializing_if = "is_false")]
    pub sidebar_ignore: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero: Option<Hero>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,
    #[serde(skip_serializing_if = "is_false")]
    pub reverse: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl From<&FrontMatter> for NavSettings {
    fn from(fm: &FrontMatter) -> Self {
        Self {
            is_nav: fm.is_nav,
            nav_title: fm.nav_title.clone(),
            nav_order: fm.nav_order,
            sidebar_ignore: fm.sidebar_ignore,
            hero: fm.hero.clone(),
            features: fm.features.clone(),
            reverse: fm.reverse,
        }
    }
}

/// Raw sidebar entry as produced by the scanner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub title: String,
    /// Raw path with rank prefixes and `.md` kept. Directories end in `/`.
    #[serde(default)]
    pub link: String,
    #[serde(rename = "type", default)]
    pub kind: NavItemKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(flatten)]
    pub settings: NavSettings,
}

impl NavItem {
    /// Page entry.
    #[must_use]
    pub fn file(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            kind: NavItemKind::File,
            ..Self::default()
        }
    }

    /// Directory entry.
    #[must_use]
    pub fn dir(title: impl Into<String>, link: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            kind: NavItemKind::Dir,
            children,
            ..Self::default()
        }
    }

    /// In-page anchor entry.
    #[must_use]
    pub fn heading(title: impl Into<String>, id: &str) -> Self {
        Self {
            title: title.into(),
            link: format!("#{id}"),
            kind: NavItemKind::Heading,
            ..Self::default()
        }
    }

    /// External entry.
    #[must_use]
    pub fn link(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            kind: NavItemKind::Link,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: NavSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == NavItemKind::Dir
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == NavItemKind::File
    }

    /// Copy of the tree with every content hash removed.
    ///
    /// Two trees equal under this projection differ only in page bodies.
    #[must_use]
    pub fn without_hashes(&self) -> Self {
        Self {
            hash: None,
            children: self.children.iter().map(Self::without_hashes).collect(),
            ..self.clone()
        }
    }
}

/// Sidebar entry with derived link forms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedNavItem {
    pub title: String,
    /// Canonical link: ranks hidden, index files collapsed to their directory.
    pub link: String,
    /// Raw scan path.
    pub origin_link: String,
    /// Ranks hidden, index files kept.
    pub user_full_path: String,
    #[serde(rename = "type")]
    pub kind: NavItemKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AnnotatedNavItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(flatten)]
    pub settings: NavSettings,
}

impl AnnotatedNavItem {
    /// Wrap an external config entry whose link is used as is.
    #[must_use]
    pub fn external(item: &NavItem) -> Self {
        Self {
            title: item.title.clone(),
            link: item.link.clone(),
            origin_link: item.link.clone(),
            user_full_path: item.link.clone(),
            kind: item.kind,
            children: Vec::new(),
            hash: None,
            settings: item.settings.clone(),
        }
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == NavItemKind::Dir
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == NavItemKind::File
    }

    /// Nav order with the default applied.
    #[must_use]
    pub fn nav_order(&self) -> i64 {
        self.settings
            .nav_order
            .unwrap_or(crate::nav::DEFAULT_NAV_ORDER)
    }
}
