//! Book compilation for Folio.
//!
//! This crate turns a directory of markdown files into everything a docs
//! client needs to render it:
//! - [`BookCompiler`]: scans the docs tree into a [`BookConfig`]
//! - [`BookModel`]: annotated sidebar, navbar, route table and the sidebar
//!   visible at one location
//! - [`BookStore`]: reactive holder swapping in a new model on every change
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use folio_site::{BookCompiler, BookOptions, BookStore};
//! use folio_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("docs")));
//! let compiler = BookCompiler::new(storage, BookOptions::default());
//! let store = BookStore::new(compiler.generate()?);
//!
//! let model = store.navigate("/guide/setup");
//! for route in &model.routes {
//!     println!("{}", route.pattern);
//! }
//! # Ok(())
//! # }
//! ```

mod annotate;
mod book;
mod error;
mod filename;
mod frontmatter;
mod link;
mod links;
mod locale;
mod metadata;
mod model;
mod nav;
mod nav_item;
mod projection;
mod routes;
mod scanner;
mod search;
mod sitemap;
mod store;

pub use annotate::{annotate, reannotate};
pub use book::{BookCompiler, BookConfig, BookOptions, SidebarConfig};
pub use error::ScanError;
pub use filename::{
    MARKDOWN_EXT, ParsedFilename, Rank, is_dir_config_file, is_index_file, is_markdown_file,
    parse_filename, strip_rank,
};
pub use frontmatter::{
    Feature, FrontMatter, FrontMatterError, Group, Hero, HeroAction, parse_front_matter,
    split_frontmatter, strip_title_block,
};
pub use link::{join_path, link_path, resolve_link, user_link};
pub use links::{BrokenLink, check_links, check_page};
pub use locale::{language_name, resolve_language, split_locale_path};
pub use metadata::{FileMetadata, MarkdownFile, MetadataReader, content_hash};
pub use model::{BookModel, LangEntry, Navigation};
pub use nav::{DEFAULT_NAV_ORDER, extract_nav, split_github};
pub use nav_item::{AnnotatedNavItem, NavItem, NavItemKind, NavSettings};
pub use projection::{current_links, current_sidebar, flat_nav};
pub use routes::{
    CATCH_ALL, CONTENT_PREFIX, ContentSource, PageContent, RouteInput, RouteItem, RouteTarget,
    generate_routes, home_page, route_title,
};
pub use scanner::{DEFAULT_IGNORED, LangSidebar, Redirects, ScanOptions, Scanner};
pub use search::{SearchDocument, documents_file_name, search_documents};
pub use sitemap::{page_paths, render_sitemap};
pub use store::{BookStore, SubscriptionId};
