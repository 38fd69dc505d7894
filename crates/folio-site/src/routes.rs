//! Route table generation.
//!
//! Routes are emitted in a fixed order and the consuming router is expected
//! to take the first match:
//!
//! 1. Explicit redirects, in rank-shown and rank-hidden form.
//! 2. Nav directories redirecting to their first page.
//! 3. Content routes, each followed by its aliases.
//! 4. A root fallback when nothing serves `/`.
//! 5. The catch-all `*`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use folio_storage::{Storage, StorageError};

use crate::frontmatter::strip_title_block;
use crate::link::{join_path, link_path};
use crate::nav_item::{AnnotatedNavItem, NavItemKind};
use crate::projection::flat_nav;
use crate::scanner::Redirects;

/// Pattern of the catch-all route.
pub const CATCH_ALL: &str = "*";

/// Mount point of the raw markdown endpoint.
pub const CONTENT_PREFIX: &str = "/_content";

/// What a route resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RouteTarget {
    /// Declared with a `redirect` setting.
    Redirect { to: String },
    /// Nav directory to its first page.
    NavRedirect { to: String },
    /// Alternative spelling of a content route.
    Alias { to: String },
    /// `/` to the first page when there is no home page.
    RootFallback { to: String },
    /// A page, fetched on demand.
    Content {
        source: ContentSource,
        data: Box<AnnotatedNavItem>,
    },
    NotFound,
}

impl RouteTarget {
    /// Target path of any redirecting route.
    #[must_use]
    pub fn redirect_to(&self) -> Option<&str> {
        match self {
            Self::Redirect { to }
            | Self::NavRedirect { to }
            | Self::Alias { to }
            | Self::RootFallback { to } => Some(to),
            Self::Content { .. } | Self::NotFound => None,
        }
    }

    #[must_use]
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content { .. })
    }
}

/// One entry of the route table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteItem {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub target: RouteTarget,
}

impl RouteItem {
    fn redirect(pattern: impl Into<String>, target: RouteTarget) -> Self {
        Self {
            pattern: pattern.into(),
            title: None,
            target,
        }
    }
}

/// Where the markdown of a content route lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSource {
    /// Language directory, empty outside i18n mode.
    pub lang: String,
    /// Raw link of the page inside the language tree.
    pub origin_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// Markdown of a page, possibly completed from another language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageContent {
    pub body: String,
    /// Language the body is shown in.
    pub lang: String,
    /// Set when the page had no own content and the fallback language filled it.
    pub translated_from: Option<String>,
}

impl ContentSource {
    /// Fetch URL of the raw markdown below [`CONTENT_PREFIX`]. The hash busts
    /// client caches.
    #[must_use]
    pub fn url(&self) -> String {
        let path = join_path(&[CONTENT_PREFIX, &self.lang, &self.origin_link]);
        match &self.hash {
            Some(hash) => format!("{path}?hash={hash}"),
            None => path,
        }
    }

    /// Storage path of the page in `lang`.
    #[must_use]
    pub fn storage_path(&self, lang: &str) -> PathBuf {
        let mut path = PathBuf::from(lang);
        path.push(self.origin_link.trim_start_matches('/'));
        path
    }

    /// Load the page body.
    ///
    /// When the page has nothing beyond its frontmatter and title, the body
    /// of the same page in `fallback_lang` is appended and the result is
    /// reported in that language.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the page itself cannot be read.
    pub fn load(
        &self,
        storage: &dyn Storage,
        fallback_lang: Option<&str>,
    ) -> Result<PageContent, StorageError> {
        let body = storage.read(&self.storage_path(&self.lang))?;
        let untranslated = PageContent {
            body,
            lang: self.lang.clone(),
            translated_from: None,
        };

        let Some(fallback) = fallback_lang.filter(|f| *f != self.lang) else {
            return Ok(untranslated);
        };
        if !strip_title_block(&untranslated.body).trim().is_empty() {
            return Ok(untranslated);
        }

        match storage.read(&self.storage_path(fallback)) {
            Ok(original) => {
                let mut body = untranslated.body;
                body.push_str(strip_title_block(&original).trim_start());
                Ok(PageContent {
                    body,
                    lang: fallback.to_owned(),
                    translated_from: Some(fallback.to_owned()),
                })
            }
            Err(e) => {
                tracing::debug!(link = %self.origin_link, lang = fallback, error = %e, "No fallback page");
                Ok(untranslated)
            }
        }
    }
}

/// Inputs of [`generate_routes`].
#[derive(Clone, Copy, Debug)]
pub struct RouteInput<'a> {
    pub sidebar: &'a [AnnotatedNavItem],
    pub nav: &'a [AnnotatedNavItem],
    pub redirects: &'a Redirects,
    pub display_rank: bool,
    pub lang: &'a str,
    pub book_title: &'a str,
}

/// Build the full route table.
#[must_use]
pub fn generate_routes(input: &RouteInput<'_>) -> Vec<RouteItem> {
    let mut routes = redirect_routes(input.redirects, input.display_rank);
    routes.extend(nav_routes(input.nav));
    let content = content_routes(input);

    let has_root = routes.iter().chain(&content).any(|r| r.pattern == "/");
    let fallback = content
        .iter()
        .find(|r| r.target.is_content() && !r.pattern.is_empty() && !r.pattern.contains('*'))
        .map(|r| r.pattern.clone());
    routes.extend(content);

    if !has_root && let Some(first) = fallback {
        routes.push(RouteItem::redirect("/", RouteTarget::RootFallback { to: first }));
    }

    routes.push(RouteItem::redirect(CATCH_ALL, RouteTarget::NotFound));
    routes
}

fn redirect_routes(redirects: &Redirects, display_rank: bool) -> Vec<RouteItem> {
    let mut routes = Vec::new();
    for (pattern, target) in redirects {
        let to = link_path(target, display_rank);
        let with_rank = link_path(pattern, true);
        let without_rank = link_path(pattern, false);
        let rank_hidden = (without_rank != with_rank).then_some(without_rank);
        routes.push(RouteItem::redirect(
            with_rank,
            RouteTarget::Redirect { to: to.clone() },
        ));
        if let Some(pattern) = rank_hidden {
            routes.push(RouteItem::redirect(pattern, RouteTarget::Redirect { to }));
        }
    }
    routes
}

fn nav_routes(nav: &[AnnotatedNavItem]) -> Vec<RouteItem> {
    nav.iter()
        .filter(|item| item.is_dir())
        .filter_map(|item| {
            let first = first_page(item)?;
            (item.link != first).then(|| {
                RouteItem::redirect(item.link.clone(), RouteTarget::NavRedirect { to: first })
            })
        })
        .collect()
}

/// First page below `item` in sidebar order.
fn first_page(item: &AnnotatedNavItem) -> Option<String> {
    let mut queue: Vec<&AnnotatedNavItem> = vec![item];
    while !queue.is_empty() {
        let current = queue.remove(0);
        match current.kind {
            NavItemKind::File => return Some(current.link.clone()),
            NavItemKind::Dir => {
                queue.splice(0..0, current.children.iter());
            }
            NavItemKind::Heading | NavItemKind::Link => {}
        }
    }
    None
}

fn content_routes(input: &RouteInput<'_>) -> Vec<RouteItem> {
    let mut routes = Vec::new();
    for item in flat_nav(input.sidebar).into_iter().filter(|i| i.is_file()) {
        let link = item.link.clone();
        routes.push(RouteItem {
            pattern: link.clone(),
            title: Some(route_title(&item.title, input.book_title)),
            target: RouteTarget::Content {
                source: ContentSource {
                    lang: input.lang.to_owned(),
                    origin_link: item.origin_link.clone(),
                    hash: item.hash.clone(),
                },
                data: Box::new(item.clone()),
            },
        });

        if item.user_full_path != link {
            routes.push(RouteItem::redirect(
                item.user_full_path.clone(),
                RouteTarget::Alias { to: link.clone() },
            ));
        }

        if !input.display_rank {
            let ranked = link_path(&item.origin_link, true);
            if ranked != link {
                routes.push(RouteItem::redirect(ranked, RouteTarget::Alias { to: link }));
            }
        }
    }
    routes
}

/// Document title of a page route.
#[must_use]
pub fn route_title(page_title: &str, book_title: &str) -> String {
    if page_title.is_empty() {
        return book_title.to_owned();
    }
    format!("{} - {book_title}", capitalize(page_title))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Path served at `/`: the target of a root redirect, `/` itself when it is a
/// page, or empty when the table has no root.
#[must_use]
pub fn home_page(routes: &[RouteItem]) -> String {
    routes
        .iter()
        .find(|r| r.pattern == "/")
        .map(|r| r.target.redirect_to().unwrap_or("/").to_owned())
        .unwrap_or_default()
}
