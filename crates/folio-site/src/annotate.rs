//! Sidebar post-processing.
//!
//! Adds the user-facing link forms to a raw tree. Pure and recursive: the
//! input tree is left untouched and the result depends only on the raw links.

use crate::link::{link_path, user_link};
use crate::nav_item::{AnnotatedNavItem, NavItem, NavItemKind};

/// Annotate a raw sidebar with `originLink`, canonical `link` and `userFullPath`.
#[must_use]
pub fn annotate(items: &[NavItem], display_rank: bool) -> Vec<AnnotatedNavItem> {
    items.iter().map(|item| annotate_item(item, display_rank)).collect()
}

fn annotate_item(item: &NavItem, display_rank: bool) -> AnnotatedNavItem {
    let (link, user_full_path) = link_forms(&item.link, item.kind, display_rank);
    AnnotatedNavItem {
        title: item.title.clone(),
        link,
        origin_link: item.link.clone(),
        user_full_path,
        kind: item.kind,
        children: annotate(&item.children, display_rank),
        hash: item.hash.clone(),
        settings: item.settings.clone(),
    }
}

/// Recompute the link forms of an annotated tree from its origin links.
///
/// Annotating twice gives the same result as annotating once.
#[must_use]
pub fn reannotate(items: &[AnnotatedNavItem], display_rank: bool) -> Vec<AnnotatedNavItem> {
    items
        .iter()
        .map(|item| {
            let (link, user_full_path) = link_forms(&item.origin_link, item.kind, display_rank);
            AnnotatedNavItem {
                link,
                user_full_path,
                children: reannotate(&item.children, display_rank),
                ..item.clone()
            }
        })
        .collect()
}

/// Canonical link and full path of a raw link.
///
/// Anchors and external links are kept verbatim.
fn link_forms(raw: &str, kind: NavItemKind, display_rank: bool) -> (String, String) {
    match kind {
        NavItemKind::Heading | NavItemKind::Link => (raw.to_owned(), raw.to_owned()),
        NavItemKind::Dir | NavItemKind::File => {
            (user_link(raw, display_rank), link_path(raw, display_rank))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<NavItem> {
        vec![
            NavItem::file("Home", "/README.md"),
            NavItem::dir(
                "Guide",
                "/001-guide/",
                vec![
                    NavItem::file("Guide", "/001-guide/README.md"),
                    NavItem::file("Setup", "/001-guide/002-setup.md")
                        .with_hash("1234abcd"),
                ],
            ),
        ]
    }

    #[test]
    fn test_annotate_link_forms() {
        let annotated = annotate(&sample(), false);
        assert_eq!(annotated[0].link, "/");
        assert_eq!(annotated[0].user_full_path, "/README");
        assert_eq!(annotated[0].origin_link, "/README.md");

        let guide = &annotated[1];
        assert_eq!(guide.link, "/guide/");
        assert_eq!(guide.user_full_path, "/guide/");

        let index = &guide.children[0];
        assert_eq!(index.link, "/guide/");
        assert_eq!(index.user_full_path, "/guide/README");

        let setup = &guide.children[1];
        assert_eq!(setup.link, "/guide/setup");
        assert_eq!(setup.user_full_path, "/guide/setup");
        assert_eq!(setup.origin_link, "/001-guide/002-setup.md");
        assert_eq!(setup.hash.as_deref(), Some("1234abcd"));
    }

    #[test]
    fn test_annotate_with_display_rank() {
        let annotated = annotate(&sample(), true);
        let setup = &annotated[1].children[1];
        assert_eq!(setup.link, "/001-guide/002-setup");
        assert_eq!(annotated[1].children[0].link, "/001-guide/");
    }

    #[test]
    fn test_index_collapse() {
        let items = vec![
            NavItem::file("", "/d/index.md"),
            NavItem::file("", "/e/readme.md"),
        ];
        let annotated = annotate(&items, false);
        assert_eq!(annotated[0].link, "/d/");
        assert_eq!(annotated[1].link, "/e/");
    }

    #[test]
    fn test_headings_keep_anchor() {
        let mut page = NavItem::file("A", "/a.md");
        page.children.push(NavItem::heading("One", "1-one"));
        let items = vec![page];
        let annotated = annotate(&items, false);
        assert_eq!(annotated[0].children[0].link, "#1-one");
    }

    #[test]
    fn test_reannotate_is_idempotent() {
        for display_rank in [false, true] {
            let once = annotate(&sample(), display_rank);
            let twice = reannotate(&once, display_rank);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_input_is_untouched() {
        let raw = sample();
        let before = raw.clone();
        let _ = annotate(&raw, false);
        assert_eq!(raw, before);
    }
}
