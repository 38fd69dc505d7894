//! Top navbar derivation.

use crate::nav_item::{AnnotatedNavItem, NavItem};

/// Sort key of navbar entries without an explicit `navOrder`.
pub const DEFAULT_NAV_ORDER: i64 = 100;

/// Collect navbar entries from the sidebar and append the configured ones.
///
/// An `isNav` file is taken as is. An `isNav` directory is taken when it has
/// children, and is not searched further. The result is stable-sorted by
/// `navOrder`, so equal orders keep sidebar order followed by config order.
#[must_use]
pub fn extract_nav(sidebar: &[AnnotatedNavItem], config_nav: &[NavItem]) -> Vec<AnnotatedNavItem> {
    let mut nav = Vec::new();
    collect(sidebar, &mut nav);
    nav.extend(config_nav.iter().map(AnnotatedNavItem::external));
    nav.sort_by_key(AnnotatedNavItem::nav_order);
    nav
}

fn collect(items: &[AnnotatedNavItem], nav: &mut Vec<AnnotatedNavItem>) {
    for item in items {
        if item.settings.is_nav {
            if item.is_file() || (item.is_dir() && !item.children.is_empty()) {
                nav.push(item.clone());
            }
        } else if item.is_dir() {
            collect(&item.children, nav);
        }
    }
}

/// Remove a config entry titled `github` (any case) and return its link.
///
/// The last such entry wins.
#[must_use]
pub fn split_github(config_nav: Vec<NavItem>) -> (Vec<NavItem>, Option<String>) {
    let mut github = None;
    let nav = config_nav
        .into_iter()
        .filter_map(|item| {
            if item.title.eq_ignore_ascii_case("github") {
                github = Some(item.link);
                None
            } else {
                Some(item)
            }
        })
        .collect();
    (nav, github)
}
