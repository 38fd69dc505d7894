//! Error types for building the book.

use folio_storage::StorageError;

/// Structural error that aborts a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Storage failure while listing or reading the docs tree.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Two siblings share a name once rank prefixes are removed.
    #[error(
        "Duplicate name `{name}` in `{dir}` after removing the rank number, use `--display-rank`"
    )]
    DuplicateTitle { dir: String, name: String },
    /// An `isNav` entry inside an `isNav` directory.
    #[error("Nav entry `{link}` is nested inside nav directory `{parent}`")]
    NestedNav { parent: String, link: String },
    /// Redirects that never reach a page.
    #[error("Redirect cycle: {}", chain.join(" -> "))]
    RedirectCycle { chain: Vec<String> },
}
