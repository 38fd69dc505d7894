//! Path-dependent sidebar projection.
//!
//! A nav directory owns its part of the tree: while the reader is inside it,
//! the sidebar shows only that directory's children, and everywhere else the
//! directory is cut out of the sidebar and reached through the navbar.

use crate::nav_item::AnnotatedNavItem;

/// Sidebar visible at `path`.
///
/// Scoped to the children of a nav directory when `path` is that directory
/// or one of its pages, otherwise the whole tree without nav directories.
/// Hidden entries and directories left empty are removed at every depth.
#[must_use]
pub fn current_sidebar(sidebar: &[AnnotatedNavItem], path: &str) -> Vec<AnnotatedNavItem> {
    match find_scope(sidebar, path) {
        Some(scope) => visible(&scope.children),
        None => visible(&without_nav_dirs(sidebar)),
    }
}

fn is_nav_dir(item: &AnnotatedNavItem) -> bool {
    item.is_dir() && item.settings.is_nav
}

/// Nav directory containing `path`, if any.
fn find_scope<'a>(items: &'a [AnnotatedNavItem], path: &str) -> Option<&'a AnnotatedNavItem> {
    for item in items {
        if is_nav_dir(item) {
            let contains = item.link == path
                || flat_nav(&item.children)
                    .iter()
                    .any(|page| page.is_file() && page.link == path);
            if contains {
                return Some(item);
            }
        } else if item.is_dir()
            && let Some(scope) = find_scope(&item.children, path)
        {
            return Some(scope);
        }
    }
    None
}

fn without_nav_dirs(items: &[AnnotatedNavItem]) -> Vec<AnnotatedNavItem> {
    items
        .iter()
        .filter(|item| !is_nav_dir(item))
        .map(|item| AnnotatedNavItem {
            children: if item.is_dir() {
                without_nav_dirs(&item.children)
            } else {
                item.children.clone()
            },
            ..item.clone()
        })
        .collect()
}

fn visible(items: &[AnnotatedNavItem]) -> Vec<AnnotatedNavItem> {
    items
        .iter()
        .filter(|item| !item.settings.sidebar_ignore)
        .filter_map(|item| {
            if !item.is_dir() {
                return Some(item.clone());
            }
            let children = visible(&item.children);
            (!children.is_empty()).then(|| AnnotatedNavItem {
                children,
                ..item.clone()
            })
        })
        .collect()
}

/// Pages of a tree in sidebar order, with directories flattened away.
#[must_use]
pub fn flat_nav(items: &[AnnotatedNavItem]) -> Vec<&AnnotatedNavItem> {
    let mut pages = Vec::new();
    collect_pages(items, &mut pages);
    pages
}

fn collect_pages<'a>(items: &'a [AnnotatedNavItem], pages: &mut Vec<&'a AnnotatedNavItem>) {
    for item in items {
        if item.is_dir() {
            collect_pages(&item.children, pages);
        } else {
            pages.push(item);
        }
    }
}

/// Pages for previous/next links under the current sidebar.
///
/// In home mode the home page is left out.
#[must_use]
pub fn current_links(
    current_sidebar: &[AnnotatedNavItem],
    home_page: &str,
    home_mode: bool,
) -> Vec<AnnotatedNavItem> {
    flat_nav(current_sidebar)
        .into_iter()
        .filter(|page| !page.settings.sidebar_ignore)
        .filter(|page| !(home_mode && page.link == home_page))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::annotate;
    use crate::nav_item::{NavItem, NavSettings};
    use pretty_assertions::assert_eq;

    fn nav() -> NavSettings {
        NavSettings {
            is_nav: true,
            ..NavSettings::default()
        }
    }

    fn ignored() -> NavSettings {
        NavSettings {
            sidebar_ignore: true,
            ..NavSettings::default()
        }
    }

    fn sidebar() -> Vec<AnnotatedNavItem> {
        let raw = vec![
            NavItem::file("Home", "/README.md"),
            NavItem::file("Intro", "/intro.md"),
            NavItem::file("Secret", "/secret.md").with_settings(ignored()),
            NavItem::dir(
                "Guide",
                "/guide/",
                vec![
                    NavItem::file("Guide", "/guide/README.md"),
                    NavItem::file("Setup", "/guide/setup.md"),
                    NavItem::dir(
                        "Hidden",
                        "/guide/hidden/",
                        vec![NavItem::file("Draft", "/guide/hidden/draft.md").with_settings(ignored())],
                    ),
                ],
            )
            .with_settings(nav()),
            NavItem::dir(
                "More",
                "/more/",
                vec![
                    NavItem::file("Faq", "/more/faq.md"),
                    NavItem::dir(
                        "Api",
                        "/more/api/",
                        vec![NavItem::file("Ref", "/more/api/ref.md")],
                    )
                    .with_settings(nav()),
                ],
            ),
        ];
        annotate(&raw, false)
    }

    fn links(items: &[AnnotatedNavItem]) -> Vec<&str> {
        items.iter().map(|i| i.link.as_str()).collect()
    }

    #[test]
    fn test_global_mode_excises_nav_dirs() {
        let current = current_sidebar(&sidebar(), "/intro");
        assert_eq!(links(&current), vec!["/", "/intro", "/more/"]);
        assert_eq!(links(&current[2].children), vec!["/more/faq"]);
    }

    #[test]
    fn test_scoped_mode_inside_nav_dir() {
        let current = current_sidebar(&sidebar(), "/guide/setup");
        assert_eq!(links(&current), vec!["/guide/", "/guide/setup"]);

        let at_dir = current_sidebar(&sidebar(), "/guide/");
        assert_eq!(links(&at_dir), vec!["/guide/", "/guide/setup"]);
    }

    #[test]
    fn test_scoped_mode_for_nested_nav_dir() {
        let current = current_sidebar(&sidebar(), "/more/api/ref");
        assert_eq!(links(&current), vec!["/more/api/ref"]);
    }

    #[test]
    fn test_unknown_path_uses_global_mode() {
        let current = current_sidebar(&sidebar(), "/nowhere");
        assert_eq!(links(&current), vec!["/", "/intro", "/more/"]);
    }

    #[test]
    fn test_scoped_containment() {
        let tree = sidebar();
        let guide = &tree[3];
        let allowed: Vec<&str> = flat_nav(&guide.children)
            .iter()
            .map(|p| p.link.as_str())
            .collect();
        for page in flat_nav(&guide.children) {
            let current = current_sidebar(&tree, &page.link);
            for item in flat_nav(&current) {
                assert!(allowed.contains(&item.link.as_str()), "{} escaped", item.link);
            }
        }
    }

    #[test]
    fn test_flat_nav_and_current_links() {
        let tree = sidebar();
        let all: Vec<&str> = flat_nav(&tree).iter().map(|p| p.link.as_str()).collect();
        assert_eq!(
            all,
            vec![
                "/",
                "/intro",
                "/secret",
                "/guide/",
                "/guide/setup",
                "/guide/hidden/draft",
                "/more/faq",
                "/more/api/ref",
            ]
        );

        let current = current_sidebar(&tree, "/");
        assert_eq!(links(&current_links(&current, "/", false)), vec!["/", "/intro", "/more/faq"]);
        assert_eq!(links(&current_links(&current, "/", true)), vec!["/intro", "/more/faq"]);
    }
}
