//! `sitemap.xml` generation.

use std::fmt::Write as _;

use crate::book::BookConfig;
use crate::link::user_link;
use crate::nav_item::{NavItem, NavItemKind};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Public paths of every visible page, prefixed with the language in i18n mode.
#[must_use]
pub fn page_paths(config: &BookConfig) -> Vec<String> {
    let mut paths = Vec::new();
    for (lang, items) in config.sidebar.trees() {
        collect(items, lang, config.display_rank, &mut paths);
    }
    paths
}

fn collect(items: &[NavItem], lang: &str, display_rank: bool, paths: &mut Vec<String>) {
    for item in items {
        if item.settings.sidebar_ignore {
            continue;
        }
        match item.kind {
            NavItemKind::File => {
                let link = user_link(&item.link, display_rank);
                let path = if lang.is_empty() {
                    link
                } else {
                    format!("/{lang}{link}")
                };
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
            NavItemKind::Dir => collect(&item.children, lang, display_rank, paths),
            NavItemKind::Heading | NavItemKind::Link => {}
        }
    }
}

/// Render the sitemap of a book deployed at `site`.
#[must_use]
pub fn render_sitemap(config: &BookConfig, site: &str) -> String {
    let base = site.trim_end_matches('/');
    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    let _ = writeln!(xml, r#"<urlset xmlns="{SITEMAP_NS}">"#);
    for path in page_paths(config) {
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape_xml(&format!("{base}{path}")));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::SidebarConfig;
    use crate::nav_item::NavSettings;
    use crate::scanner::LangSidebar;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<'x'>"), "&lt;&apos;x&apos;&gt;");
    }

    #[test]
    fn test_page_paths_skip_hidden() {
        let config = BookConfig {
            sidebar: SidebarConfig::Single(vec![
                NavItem::file("Home", "/README.md"),
                NavItem::dir(
                    "Guide",
                    "/001-guide/",
                    vec![
                        NavItem::file("Guide", "/001-guide/README.md"),
                        NavItem::file("Setup", "/001-guide/002-setup.md"),
                    ],
                ),
                NavItem::file("Draft", "/draft.md").with_settings(NavSettings {
                    sidebar_ignore: true,
                    ..NavSettings::default()
                }),
            ]),
            ..BookConfig::default()
        };
        assert_eq!(page_paths(&config), vec!["/", "/guide/", "/guide/setup"]);
    }

    #[test]
    fn test_render_sitemap_i18n() {
        let mut langs = BTreeMap::new();
        langs.insert(
            "en".to_owned(),
            LangSidebar {
                name: "English".to_owned(),
                data: vec![NavItem::file("A & B", "/a.md")],
            },
        );
        let config = BookConfig {
            sidebar: SidebarConfig::I18n(langs),
            ..BookConfig::default()
        };
        let xml = render_sitemap(&config, "https://docs.example.com/");
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#)));
        assert!(xml.contains("<loc>https://docs.example.com/en/a</loc>"));
        assert!(xml.ends_with("</urlset>\n"));
    }
}
