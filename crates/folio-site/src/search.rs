//! Full-text search documents.
//!
//! One document per page and directory of each language tree, written next to
//! the build output for a client-side search index.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use folio_storage::{Storage, StorageError};

use crate::book::BookConfig;
use crate::frontmatter::split_frontmatter;
use crate::link::link_path;
use crate::nav_item::{NavItem, NavItemKind};
use crate::routes::ContentSource;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Canonical full path of the entry.
    pub id: String,
    pub title: String,
    /// Markdown body without frontmatter. Empty for directories.
    pub text: String,
}

/// Output file name of the documents of `lang`.
#[must_use]
pub fn documents_file_name(lang: &str) -> String {
    if lang.is_empty() {
        "documents.json".to_owned()
    } else {
        format!("documents.{lang}.json")
    }
}

/// Search documents keyed by language code (empty outside i18n mode).
///
/// Entries hidden from the sidebar are skipped together with their children.
///
/// # Errors
///
/// Returns a storage error if a page cannot be read.
pub fn search_documents(
    config: &BookConfig,
    storage: &dyn Storage,
) -> Result<BTreeMap<String, Vec<SearchDocument>>, StorageError> {
    let mut output = BTreeMap::new();
    for (lang, items) in config.sidebar.trees() {
        let mut collector = Collector {
            storage,
            lang,
            display_rank: config.display_rank,
            seen: HashSet::new(),
            documents: Vec::new(),
        };
        collector.walk(items)?;
        output.insert(lang.to_owned(), collector.documents);
    }
    Ok(output)
}

struct Collector<'a> {
    storage: &'a dyn Storage,
    lang: &'a str,
    display_rank: bool,
    seen: HashSet<&'a str>,
    documents: Vec<SearchDocument>,
}

impl<'a> Collector<'a> {
    fn walk(&mut self, items: &'a [NavItem]) -> Result<(), StorageError> {
        for item in items {
            if item.settings.sidebar_ignore {
                continue;
            }
            match item.kind {
                NavItemKind::File => self.push(item, true)?,
                NavItemKind::Dir => {
                    self.push(item, false)?;
                    self.walk(&item.children)?;
                }
                NavItemKind::Heading | NavItemKind::Link => {}
            }
        }
        Ok(())
    }

    fn push(&mut self, item: &'a NavItem, read_body: bool) -> Result<(), StorageError> {
        if !self.seen.insert(&item.link) {
            return Ok(());
        }
        let text = if read_body {
            let source = ContentSource {
                lang: self.lang.to_owned(),
                origin_link: item.link.clone(),
                hash: None,
            };
            let content = self.storage.read(&source.storage_path(self.lang))?;
            match split_frontmatter(&content) {
                Ok((_, body)) => body.to_owned(),
                Err(_) => content,
            }
        } else {
            String::new()
        };
        self.documents.push(SearchDocument {
            id: link_path(&item.link, self.display_rank),
            title: item.title.clone(),
            text,
        });
        Ok(())
    }
}
