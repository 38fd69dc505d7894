//! Derived view of a book at one location.

use serde::{Deserialize, Serialize};

use crate::annotate::annotate;
use crate::book::{BookConfig, SidebarConfig};
use crate::locale::{resolve_language, split_locale_path};
use crate::nav::extract_nav;
use crate::nav_item::{AnnotatedNavItem, NavItem};
use crate::projection::{current_links, current_sidebar};
use crate::routes::{RouteInput, RouteItem, generate_routes, home_page};
use crate::scanner::Redirects;

/// Reader location: a path inside a language tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    /// Requested language, resolved against the book's languages on compile.
    pub lang: Option<String>,
}

impl Navigation {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            lang: None,
        }
    }

    /// Split a locale-qualified path such as `/en/guide`.
    #[must_use]
    pub fn from_locale_path(path: &str, langs: &[String]) -> Self {
        let (lang, path) = split_locale_path(path, langs);
        Self {
            path,
            lang: lang.map(str::to_owned),
        }
    }
}

/// Entry of the language switcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangEntry {
    pub code: String,
    pub name: String,
}

/// Everything a client needs to render the book at one location.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookModel {
    /// Annotated sidebar of the active language.
    pub sidebar: Vec<AnnotatedNavItem>,
    pub nav: Vec<AnnotatedNavItem>,
    pub routes: Vec<RouteItem>,
    pub redirects: Redirects,
    /// Active language, empty outside i18n mode.
    pub lang: String,
    pub lang_list: Vec<LangEntry>,
    pub home_page: String,
    pub current_sidebar: Vec<AnnotatedNavItem>,
    pub current_links: Vec<AnnotatedNavItem>,
}

impl BookModel {
    /// Derive the model for `navigation` from a compiled config.
    #[must_use]
    pub fn compile(config: &BookConfig, navigation: &Navigation) -> Self {
        let langs = config.sidebar.languages();
        let fallback = config.fallback_language();
        let lang = resolve_language(navigation.lang.as_deref(), fallback.as_deref(), &langs)
            .unwrap_or_default()
            .to_owned();

        let (raw, lang_list): (&[NavItem], Vec<LangEntry>) = match &config.sidebar {
            SidebarConfig::Single(items) => (items.as_slice(), Vec::new()),
            SidebarConfig::I18n(trees) => (
                trees.get(&lang).map_or(&[][..], |tree| tree.data.as_slice()),
                trees
                    .iter()
                    .map(|(code, tree)| LangEntry {
                        code: code.clone(),
                        name: tree.name.clone(),
                    })
                    .collect(),
            ),
        };

        let sidebar = annotate(raw, config.display_rank);
        let nav = extract_nav(&sidebar, &config.nav);
        let routes = generate_routes(&RouteInput {
            sidebar: &sidebar,
            nav: &nav,
            redirects: &config.redirects,
            display_rank: config.display_rank,
            lang: &lang,
            book_title: &config.title,
        });
        let home_page = home_page(&routes);
        let current_sidebar = current_sidebar(&sidebar, &navigation.path);
        let current_links = current_links(&current_sidebar, &home_page, config.home_mode);

        Self {
            sidebar,
            nav,
            routes,
            redirects: config.redirects.clone(),
            lang,
            lang_list,
            home_page,
            current_sidebar,
            current_links,
        }
    }

    /// Route matching `path` exactly.
    #[must_use]
    pub fn route(&self, path: &str) -> Option<&RouteItem> {
        self.routes.iter().find(|r| r.pattern == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav_item::NavSettings;
    use crate::routes::RouteTarget;
    use crate::scanner::LangSidebar;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn single_book() -> BookConfig {
        BookConfig {
            title: "Book".to_owned(),
            sidebar: SidebarConfig::Single(vec![
                NavItem::file("Home", "/README.md"),
                NavItem::dir(
                    "Guide",
                    "/guide/",
                    vec![
                        NavItem::file("Guide", "/guide/README.md"),
                        NavItem::file("Setup", "/guide/setup.md"),
                    ],
                )
                .with_settings(NavSettings {
                    is_nav: true,
                    ..NavSettings::default()
                }),
                NavItem::file("Faq", "/faq.md"),
            ]),
            ..BookConfig::default()
        }
    }

    fn i18n_book() -> BookConfig {
        let mut langs = BTreeMap::new();
        langs.insert(
            "en".to_owned(),
            LangSidebar {
                name: "English".to_owned(),
                data: vec![NavItem::file("Home", "/README.md")],
            },
        );
        langs.insert(
            "zh".to_owned(),
            LangSidebar {
                name: "中文".to_owned(),
                data: vec![NavItem::file("首页", "/README.md"), NavItem::file("指南", "/guide.md")],
            },
        );
        BookConfig {
            title: "Book".to_owned(),
            fallback_language: Some("zh".to_owned()),
            sidebar: SidebarConfig::I18n(langs),
            ..BookConfig::default()
        }
    }

    #[test]
    fn test_compile_single_tree() {
        let model = BookModel::compile(&single_book(), &Navigation::new("/faq"));
        assert_eq!(model.lang, "");
        assert!(model.lang_list.is_empty());
        assert_eq!(model.home_page, "/");
        assert_eq!(model.nav.len(), 1);
        let current: Vec<_> = model.current_sidebar.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(current, vec!["/", "/faq"]);
        assert!(model.route("/guide/setup").is_some());
    }

    #[test]
    fn test_compile_inside_nav_dir() {
        let model = BookModel::compile(&single_book(), &Navigation::new("/guide/setup"));
        let current: Vec<_> = model.current_links.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(current, vec!["/guide/", "/guide/setup"]);
    }

    #[test]
    fn test_compile_i18n_language_resolution() {
        let book = i18n_book();
        let langs = book.sidebar.languages();

        let en = BookModel::compile(&book, &Navigation::from_locale_path("/en/", &langs));
        assert_eq!(en.lang, "en");
        assert_eq!(en.sidebar.len(), 1);

        let default = BookModel::compile(&book, &Navigation::new("/"));
        assert_eq!(default.lang, "zh");
        assert_eq!(default.sidebar.len(), 2);

        let unknown = BookModel::compile(
            &book,
            &Navigation {
                path: "/".to_owned(),
                lang: Some("fr".to_owned()),
            },
        );
        assert_eq!(unknown.lang, "zh");

        let names: Vec<_> = en.lang_list.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["English", "中文"]);
    }

    #[test]
    fn test_content_routes_carry_language() {
        let book = i18n_book();
        let model = BookModel::compile(&book, &Navigation::new("/guide"));
        let Some(RouteItem {
            target: RouteTarget::Content { source, .. },
            ..
        }) = model.route("/guide")
        else {
            panic!("expected a content route");
        };
        assert_eq!(source.url(), "/_content/zh/guide.md");
    }

    #[test]
    fn test_home_mode_drops_home_from_links() {
        let book = BookConfig {
            home_mode: true,
            ..single_book()
        };
        let model = BookModel::compile(&book, &Navigation::new("/"));
        let links: Vec<_> = model.current_links.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(links, vec!["/faq"]);
    }

    #[test]
    fn test_model_json_is_camel_case() {
        let model = BookModel::compile(&single_book(), &Navigation::new("/"));
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["homePage"], "/");
        assert!(json["currentSidebar"].is_array());
        assert!(json["langList"].is_array());
    }
}
