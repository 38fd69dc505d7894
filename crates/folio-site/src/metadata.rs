//! Per-file metadata with a content-hash cache.
//!
//! [`MetadataReader`] reads pages through [`Storage`] and remembers the parse
//! result of every file keyed by its resolved path. A file whose content hash
//! is unchanged is never parsed again, which keeps rescans in the dev loop
//! proportional to what was edited.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use sha2::{Digest, Sha256};

use folio_storage::{Storage, StorageError};

use crate::filename::{is_dir_config_file, is_index_file, strip_markdown_ext, strip_rank};
use crate::frontmatter::{FrontMatter, Heading, parse_document, parse_front_matter};

/// Content fingerprint used in content URLs and change detection.
///
/// First four bytes of the SHA-256 digest, hex encoded.
#[must_use]
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..4])
}

/// Metadata of a markdown page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileMetadata {
    /// Frontmatter title, else first H1, else the file name.
    pub title: String,
    pub hash: String,
    pub front_matter: FrontMatter,
    /// H2 headings in document order.
    pub headings: Vec<Heading>,
}

/// Raw markdown read for the dev loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkdownFile {
    pub body: String,
    pub hash: String,
    /// Frontmatter or headings differ from the previously cached parse.
    pub metadata_changed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ParsedPage {
    front_matter: FrontMatter,
    h1: Option<String>,
    headings: Vec<Heading>,
}

#[derive(Clone, Debug)]
struct CacheEntry {
    hash: String,
    page: ParsedPage,
}

/// Reads page and directory metadata through a [`Storage`] backend.
pub struct MetadataReader {
    storage: Arc<dyn Storage>,
    cache: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl MetadataReader {
    /// Create a reader with an empty cache.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Backing storage.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Read metadata of a markdown page.
    ///
    /// Malformed frontmatter is logged and the page falls back to default
    /// settings and its file name as title.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read.
    pub fn read_file(&self, path: &Path, display_rank: bool) -> Result<FileMetadata, StorageError> {
        let text = self.storage.read(path)?;
        let hash = content_hash(&text);
        let page = self.cached_or_parse(path, &text, &hash).1;

        let title = page
            .front_matter
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .or(page.h1)
            .unwrap_or_else(|| filename_title(path, display_rank));

        Ok(FileMetadata {
            title,
            hash,
            front_matter: page.front_matter,
            headings: page.headings,
        })
    }

    /// Read the directory config file (`config.yml` / `config.yaml`) of `dir`.
    ///
    /// Returns default settings when there is none. A malformed file is
    /// logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the directory cannot be listed or the
    /// config file cannot be read.
    pub fn read_dir_config(&self, dir: &Path) -> Result<FrontMatter, StorageError> {
        let entries = self.storage.list(dir)?;
        let Some(config) = entries
            .iter()
            .find(|e| !e.is_dir() && is_dir_config_file(&e.name))
        else {
            return Ok(FrontMatter::default());
        };

        let path = dir.join(&config.name);
        let text = self.storage.read(&path)?;
        match parse_front_matter(&text) {
            Ok(front_matter) => Ok(front_matter),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse directory config");
                Ok(FrontMatter::default())
            }
        }
    }

    /// Read a page body for a content update.
    ///
    /// Reports whether its metadata changed against the cached parse. A file
    /// seen for the first time counts as changed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read.
    pub fn read_markdown(&self, path: &Path) -> Result<MarkdownFile, StorageError> {
        let body = self.storage.read(path)?;
        let hash = content_hash(&body);
        let previous = self.cached_page(path);
        let (_, page) = self.cached_or_parse(path, &body, &hash);
        let metadata_changed = previous.as_ref() != Some(&page);
        Ok(MarkdownFile {
            body,
            hash,
            metadata_changed,
        })
    }

    /// Drop all cached entries.
    pub fn clear(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached files.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn cached_page(&self, path: &Path) -> Option<ParsedPage> {
        let key = self.storage.resolve(path);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .map(|entry| entry.page.clone())
    }

    /// Returns whether the cache was hit, and the parsed page.
    fn cached_or_parse(&self, path: &Path, text: &str, hash: &str) -> (bool, ParsedPage) {
        let key = self.storage.resolve(path);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = cache.get(&key)
            && entry.hash == hash
        {
            return (true, entry.page.clone());
        }

        let page = parse_page(path, text);
        cache.insert(
            key,
            CacheEntry {
                hash: hash.to_owned(),
                page: page.clone(),
            },
        );
        (false, page)
    }
}

fn parse_page(path: &Path, text: &str) -> ParsedPage {
    match parse_document(text) {
        Ok(doc) => ParsedPage {
            front_matter: doc.front_matter,
            h1: doc.h1,
            headings: doc.headings,
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to parse frontmatter");
            ParsedPage {
                front_matter: FrontMatter::default(),
                h1: None,
                headings: Vec::new(),
            }
        }
    }
}

/// Title derived from the file name. Index files have no title of their own.
fn filename_title(path: &Path, display_rank: bool) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if is_index_file(&name) {
        return String::new();
    }
    let stem = strip_markdown_ext(&name);
    if display_rank {
        stem.to_owned()
    } else {
        strip_rank(stem)
    }
}
