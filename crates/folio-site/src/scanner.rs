//! Docs tree scanner.
//!
//! Walks the docs root through [`Storage`](folio_storage::Storage) and builds
//! the raw [`NavItem`] sidebar. Sibling order is fully determined by names and
//! directory settings, never by listing order:
//!
//! 1. The index file (`README.md` / `index.md`) comes first.
//! 2. Numeric ranks compare numerically.
//! 3. Directories come before files.
//! 4. Ranked entries come before unranked ones.
//! 5. Rank-stripped names compare lexicographically.
//!
//! Rules 2 to 5 are flipped when the directory sets `reverse`.
//!
//! Entries with a `redirect` setting are left out of the tree and recorded in
//! the redirect map instead. File redirects are keyed by the file link, and
//! directory redirects by the directory link followed by `*`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use folio_storage::Entry;

use crate::error::ScanError;
use crate::filename::{
    is_dir_config_file, is_index_file, is_markdown_file, parse_filename, strip_rank,
};
use crate::frontmatter::FrontMatter;
use crate::link::{link_path, resolve_link};
use crate::locale::language_name;
use crate::metadata::MetadataReader;
use crate::nav_item::{NavItem, NavItemKind, NavSettings};

/// Glob skipped by default.
pub const DEFAULT_IGNORED: &str = "**/node_modules/**";

/// Scanner settings.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Keep rank prefixes in titles and allow names that only differ by rank.
    pub display_rank: bool,
    /// Leave out H2 heading entries under pages.
    pub only_file: bool,
    /// Paths relative to the docs root that are skipped.
    pub ignored: Vec<Pattern>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            display_rank: false,
            only_file: false,
            ignored: Pattern::new(DEFAULT_IGNORED).into_iter().collect(),
        }
    }
}

/// Raw redirect map: pattern to absolute target.
pub type Redirects = BTreeMap<String, String>;

/// Result of scanning a single tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub sidebar: Vec<NavItem>,
    pub redirects: Redirects,
}

/// Sidebar of one language directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangSidebar {
    /// Display name of the language.
    pub name: String,
    pub data: Vec<NavItem>,
}

/// Result of scanning in i18n mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct I18nScanOutput {
    /// Trees keyed by language code.
    pub langs: BTreeMap<String, LangSidebar>,
    /// Redirects of every language, keyed by language-relative patterns.
    pub redirects: Redirects,
}

/// Builds sidebar trees from a docs root.
pub struct Scanner {
    reader: Arc<MetadataReader>,
    options: ScanOptions,
}

impl Scanner {
    /// Create a scanner reading through `reader`.
    ///
    /// The reader is shared so its content cache survives across scans.
    #[must_use]
    pub fn new(reader: Arc<MetadataReader>, options: ScanOptions) -> Self {
        Self { reader, options }
    }

    #[must_use]
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan the whole docs root as a single tree.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] for storage failures, duplicate names, nested
    /// nav entries and redirect cycles.
    pub fn scan(&self) -> Result<ScanOutput, ScanError> {
        let root = Path::new("");
        let mut redirects = Redirects::new();
        let config = self.reader.read_dir_config(root)?;
        let sidebar = self.read_dir(root, "/", None, &config, &mut redirects)?;
        detect_redirect_cycles(&redirects)?;
        Ok(ScanOutput { sidebar, redirects })
    }

    /// Scan each top-level language directory as its own tree.
    ///
    /// Directories that are not a known language code are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Same as [`Scanner::scan`].
    pub fn scan_i18n(&self) -> Result<I18nScanOutput, ScanError> {
        let root = Path::new("");
        let mut output = I18nScanOutput::default();

        for entry in self.reader.storage().list(root)? {
            if !entry.is_dir() || self.is_skipped(root, &entry) {
                continue;
            }
            let Some(name) = language_name(&entry.name) else {
                tracing::warn!(dir = %entry.name, "Unsupported language directory");
                continue;
            };
            let dir = root.join(&entry.name);
            let config = self.reader.read_dir_config(&dir)?;
            let data = self.read_dir(&dir, "/", None, &config, &mut output.redirects)?;
            output.langs.insert(
                entry.name.clone(),
                LangSidebar {
                    name: name.to_owned(),
                    data,
                },
            );
        }

        detect_redirect_cycles(&output.redirects)?;
        Ok(output)
    }

    fn is_skipped(&self, dir: &Path, entry: &Entry) -> bool {
        if entry.name.starts_with('.') {
            return true;
        }
        let path = dir.join(&entry.name);
        let path = path.to_string_lossy();
        let dir_form = format!("{path}/");
        self.options
            .ignored
            .iter()
            .any(|p| p.matches(&path) || (entry.is_dir() && p.matches(&dir_form)))
    }

    /// Entries of `dir` that become sidebar nodes.
    fn candidates(&self, dir: &Path) -> Result<Vec<Entry>, ScanError> {
        Ok(self
            .reader
            .storage()
            .list(dir)?
            .into_iter()
            .filter(|e| !self.is_skipped(dir, e))
            .filter(|e| e.is_dir() || (is_markdown_file(&e.name) && !is_dir_config_file(&e.name)))
            .collect())
    }

    fn read_dir(
        &self,
        dir: &Path,
        link: &str,
        nav_parent: Option<&str>,
        config: &FrontMatter,
        redirects: &mut Redirects,
    ) -> Result<Vec<NavItem>, ScanError> {
        let mut entries = self.candidates(dir)?;

        if !self.options.display_rank {
            let mut seen = HashSet::new();
            for entry in &entries {
                let name = strip_rank(&entry.name);
                if !seen.insert(name.clone()) {
                    return Err(ScanError::DuplicateTitle {
                        dir: link.to_owned(),
                        name,
                    });
                }
            }
        }

        entries.sort_by(|a, b| compare_entries(a, b, config.reverse));

        let Some(groups) = &config.groups else {
            return self.read_entries(&entries, dir, link, nav_parent, redirects);
        };

        let mut claimed = BTreeSet::new();
        let mut result = Vec::new();
        for group in groups {
            let members: Vec<Entry> = entries
                .iter()
                .filter(|e| group.members.contains(&e.name))
                .cloned()
                .collect();
            claimed.extend(members.iter().map(|e| e.name.clone()));
            let children = self.read_entries(&members, dir, link, nav_parent, redirects)?;
            match &group.title {
                None => result.extend(children),
                Some(_) if children.is_empty() => {}
                Some(title) => result.push(NavItem::dir(title.clone(), link, children)),
            }
        }

        let rest: Vec<Entry> = entries
            .into_iter()
            .filter(|e| !claimed.contains(&e.name))
            .collect();
        result.extend(self.read_entries(&rest, dir, link, nav_parent, redirects)?);
        Ok(result)
    }

    fn read_entries(
        &self,
        entries: &[Entry],
        dir: &Path,
        link: &str,
        nav_parent: Option<&str>,
        redirects: &mut Redirects,
    ) -> Result<Vec<NavItem>, ScanError> {
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let item = if entry.is_dir() {
                self.read_dir_entry(entry, dir, link, nav_parent, redirects)?
            } else {
                self.read_file_entry(entry, dir, link, nav_parent, redirects)?
            };
            items.extend(item);
        }
        Ok(items)
    }

    fn read_file_entry(
        &self,
        entry: &Entry,
        dir: &Path,
        link: &str,
        nav_parent: Option<&str>,
        redirects: &mut Redirects,
    ) -> Result<Option<NavItem>, ScanError> {
        let path = dir.join(&entry.name);
        let meta = self.reader.read_file(&path, self.options.display_rank)?;
        let item_link = format!("{link}{}", entry.name);

        if let Some(target) = &meta.front_matter.redirect {
            redirects.insert(item_link.clone(), resolve_link(&item_link, target));
            return Ok(None);
        }
        check_nesting(&meta.front_matter, nav_parent, &item_link)?;

        let children = if self.options.only_file {
            Vec::new()
        } else {
            meta.headings
                .iter()
                .map(|h| NavItem::heading(h.title.clone(), &h.id))
                .collect()
        };

        Ok(Some(NavItem {
            title: meta.title,
            link: item_link,
            kind: NavItemKind::File,
            children,
            hash: Some(meta.hash),
            settings: NavSettings::from(&meta.front_matter),
        }))
    }

    fn read_dir_entry(
        &self,
        entry: &Entry,
        dir: &Path,
        link: &str,
        nav_parent: Option<&str>,
        redirects: &mut Redirects,
    ) -> Result<Option<NavItem>, ScanError> {
        let path = dir.join(&entry.name);
        let config = self.reader.read_dir_config(&path)?;
        let dir_link = format!("{link}{}/", entry.name);

        if let Some(target) = &config.redirect {
            redirects.insert(format!("{dir_link}*"), resolve_link(&dir_link, target));
            return Ok(None);
        }
        check_nesting(&config, nav_parent, &dir_link)?;

        let child_nav_parent = if config.is_nav {
            Some(dir_link.as_str())
        } else {
            nav_parent
        };
        let children = self.read_dir(&path, &dir_link, child_nav_parent, &config, redirects)?;
        if children.is_empty() {
            return Ok(None);
        }

        let title = match config.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => title.to_owned(),
            None if self.options.display_rank => entry.name.clone(),
            None => strip_rank(&entry.name),
        };

        Ok(Some(
            NavItem::dir(title, dir_link, children).with_settings(NavSettings::from(&config)),
        ))
    }
}

fn check_nesting(fm: &FrontMatter, nav_parent: Option<&str>, link: &str) -> Result<(), ScanError> {
    match nav_parent {
        Some(parent) if fm.is_nav => Err(ScanError::NestedNav {
            parent: parent.to_owned(),
            link: link.to_owned(),
        }),
        _ => Ok(()),
    }
}

/// Sibling order.
fn compare_entries(a: &Entry, b: &Entry, reverse: bool) -> Ordering {
    let a_index = !a.is_dir() && is_index_file(&a.name);
    let b_index = !b.is_dir() && is_index_file(&b.name);
    match (a_index, b_index) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    let flip = |ord: Ordering| if reverse { ord.reverse() } else { ord };
    let pa = parse_filename(&a.name);
    let pb = parse_filename(&b.name);
    let (ra, rb) = (pa.rank_order(), pb.rank_order());

    if let (Some(ra), Some(rb)) = (ra, rb)
        && ra != rb
    {
        return flip(ra.cmp(&rb));
    }
    if a.is_dir() != b.is_dir() {
        return flip(if a.is_dir() {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }
    if ra.is_some() != rb.is_some() {
        return flip(if ra.is_some() {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }
    flip(pa.title.cmp(&pb.title).then_with(|| a.name.cmp(&b.name)))
}

/// Fail if following redirects can come back to where it started.
///
/// Patterns and targets are compared in their rank-hidden form. A directory
/// pattern (`/old/*`) matches every target below that directory.
fn detect_redirect_cycles(redirects: &Redirects) -> Result<(), ScanError> {
    let rules: Vec<(String, String)> = redirects
        .iter()
        .map(|(pattern, target)| (link_path(pattern, false), link_path(target, false)))
        .collect();

    let next_rule = |target: &str| {
        rules.iter().position(|(pattern, _)| match pattern.strip_suffix('*') {
            Some(prefix) => target.starts_with(prefix),
            None => pattern == target,
        })
    };

    for start in 0..rules.len() {
        let mut chain = vec![start];
        let mut target = rules[start].1.as_str();
        while let Some(next) = next_rule(target) {
            if chain.contains(&next) {
                chain.push(next);
                return Err(ScanError::RedirectCycle {
                    chain: chain.into_iter().map(|i| rules[i].0.clone()).collect(),
                });
            }
            chain.push(next);
            target = rules[next].1.as_str();
        }
    }
    Ok(())
}
