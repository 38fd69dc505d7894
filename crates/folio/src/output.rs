//! Cargo-style status lines on stderr.
//!
//! Every line starts with a right-aligned verb (`Compiled`, `Wrote`,
//! `Serving`) so a build log reads as a column of actions.

use console::{Style, Term};
use folio_site::{BookConfig, BrokenLink, page_paths};

/// Width the status verb is right-aligned to.
const LABEL_WIDTH: usize = 12;

/// Terminal output formatter.
pub(crate) struct Output {
    stderr: Term,
    stdout: Term,
    label: Style,
    warn: Style,
    error: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            stderr: Term::stderr(),
            stdout: Term::stdout(),
            label: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            error: Style::new().red().bold(),
        }
    }

    /// Print `msg` behind a green status verb.
    pub(crate) fn status(&self, label: &str, msg: &str) {
        self.line(&self.label, label, msg);
    }

    /// Print the page and language counts of a compiled book.
    pub(crate) fn compiled(&self, book: &BookConfig) {
        self.status("Compiled", &book_summary(book));
    }

    /// Print a broken link as a warning.
    pub(crate) fn broken_link(&self, link: &BrokenLink) {
        self.line(&self.warn, "Broken", &link.to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.error, "Error", msg);
    }

    /// Print machine-readable output to stdout.
    pub(crate) fn data(&self, data: &str) {
        let _ = self.stdout.write_str(data);
    }

    fn line(&self, style: &Style, label: &str, msg: &str) {
        let label = style.apply_to(format!("{label:>LABEL_WIDTH$}"));
        let _ = self.stderr.write_line(&format!("{label} {msg}"));
    }
}

/// One-line description of a compiled book: title, visible pages, languages.
pub(crate) fn book_summary(book: &BookConfig) -> String {
    let pages = page_paths(book).len();
    let title = if book.title.is_empty() {
        "book"
    } else {
        book.title.as_str()
    };
    let mut summary = format!("{title} ({pages} {})", plural(pages, "page"));
    let languages = book.sidebar.languages().len();
    if languages > 0 {
        summary.push_str(&format!(" in {languages} {}", plural(languages, "language")));
    }
    summary
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_owned()
    } else {
        format!("{noun}s")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use folio_site::{LangSidebar, NavItem, SidebarConfig};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_book_summary_counts_pages() {
        let book = BookConfig {
            title: "Handbook".to_owned(),
            sidebar: SidebarConfig::Single(vec![
                NavItem::file("Home", "/README.md"),
                NavItem::dir(
                    "Guide",
                    "/001-guide/",
                    vec![
                        NavItem::file("Setup", "/001-guide/001-setup.md"),
                        NavItem::file("Usage", "/001-guide/002-usage.md"),
                    ],
                ),
            ]),
            ..BookConfig::default()
        };
        assert_eq!(book_summary(&book), "Handbook (3 pages)");
    }

    #[test]
    fn test_book_summary_counts_languages() {
        let mut langs = BTreeMap::new();
        for (code, name) in [("en", "English"), ("zh", "中文")] {
            langs.insert(
                code.to_owned(),
                LangSidebar {
                    name: name.to_owned(),
                    data: vec![NavItem::file("Home", "/README.md")],
                },
            );
        }
        let book = BookConfig {
            sidebar: SidebarConfig::I18n(langs),
            ..BookConfig::default()
        };
        assert_eq!(book_summary(&book), "book (2 pages) in 2 languages");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "page"), "page");
        assert_eq!(plural(0, "page"), "pages");
    }
}
