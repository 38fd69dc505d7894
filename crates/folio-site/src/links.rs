//! Broken relative link detection.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use folio_storage::{Storage, StorageError};

use crate::book::BookConfig;
use crate::link::resolve_link;
use crate::nav_item::{NavItem, NavItemKind};
use crate::routes::ContentSource;

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]\((.*?)(\s+.*?)?\)").unwrap());

static RELATIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\.?\.?/").unwrap());

/// Link whose target does not exist in the docs tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokenLink {
    /// Storage path of the page containing the link.
    pub path: PathBuf,
    /// 1-based line of the link.
    pub line: usize,
    /// 1-based column of the link, in characters.
    pub col: usize,
    pub link: String,
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{}) link warn: {}",
            self.path.display(),
            self.line,
            self.col,
            self.link
        )
    }
}

/// Check every page of the book.
///
/// # Errors
///
/// Returns a storage error if a page cannot be read.
pub fn check_links(
    config: &BookConfig,
    storage: &dyn Storage,
) -> Result<Vec<BrokenLink>, StorageError> {
    let mut pages = Vec::new();
    for (lang, items) in config.sidebar.trees() {
        collect_pages(items, lang, &mut pages);
    }

    let mut broken = Vec::new();
    for path in pages {
        let content = storage.read(&path)?;
        broken.extend(check_page(storage, &path, &content));
    }
    Ok(broken)
}

fn collect_pages(items: &[NavItem], lang: &str, pages: &mut Vec<PathBuf>) {
    for item in items {
        match item.kind {
            NavItemKind::File => {
                let source = ContentSource {
                    lang: lang.to_owned(),
                    origin_link: item.link.clone(),
                    hash: None,
                };
                let path = source.storage_path(lang);
                if !pages.contains(&path) {
                    pages.push(path);
                }
            }
            NavItemKind::Dir => collect_pages(&item.children, lang, pages),
            NavItemKind::Heading | NavItemKind::Link => {}
        }
    }
}

/// Relative links of one page that point nowhere.
///
/// Links starting with `/` resolve against the docs root, `./` and `../`
/// against the page's directory. Anchors are ignored.
#[must_use]
pub fn check_page(storage: &dyn Storage, path: &Path, content: &str) -> Vec<BrokenLink> {
    let base = format!("/{}", path.to_string_lossy());
    MARKDOWN_LINK
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let link = caps.get(1)?.as_str();
            if !RELATIVE.is_match(link) {
                return None;
            }
            let target = link.split_once('#').map_or(link, |(target, _)| target);
            let resolved = resolve_link(&base, target);
            let target_path = Path::new(resolved.trim_start_matches('/'));
            if storage.exists(target_path) {
                return None;
            }
            let (line, col) = position(content, whole.start());
            Some(BrokenLink {
                path: path.to_path_buf(),
                line,
                col,
                link: link.to_owned(),
            })
        })
        .collect()
}

fn position(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let col = before[line_start..].chars().count() + 1;
    (line, col)
}
