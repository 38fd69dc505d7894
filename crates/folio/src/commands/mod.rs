//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod check;
pub(crate) mod serve;

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::{BookOptions, NavItem};

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;
pub(crate) use serve::ServeArgs;

/// Arguments shared by every command that compiles the book.
#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    docs: Option<PathBuf>,

    /// Keep rank prefixes in page links.
    #[arg(long)]
    display_rank: bool,

    /// Treat top-level directories as languages.
    #[arg(long)]
    i18n: bool,
}

impl SourceArgs {
    /// Load the config with these arguments layered over `settings`.
    pub(crate) fn load(&self, settings: CliSettings) -> Result<Config, CliError> {
        let settings = CliSettings {
            source_dir: self.docs.clone(),
            display_rank: self.display_rank.then_some(true),
            i18n: self.i18n.then_some(true),
            ..settings
        };
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}

/// Translate the loaded config into book compilation options.
pub(crate) fn book_options(config: &Config) -> Result<BookOptions, CliError> {
    let book = &config.book;
    let ignored = config
        .docs_resolved
        .ignored
        .iter()
        .map(|pattern| glob::Pattern::new(pattern))
        .collect::<Result<Vec<_>, _>>()?;
    let nav = book
        .nav
        .iter()
        .map(|link| {
            let mut item = NavItem::link(&link.title, &link.link);
            item.settings.nav_order = link.nav_order;
            item
        })
        .collect();

    Ok(BookOptions {
        title: book.title.clone().unwrap_or_default(),
        icon: book.icon.clone(),
        github: book.github.clone(),
        base: book.base.clone(),
        source_dir: config
            .docs_resolved
            .source_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        source_branch: book.source_branch.clone(),
        display_rank: book.display_rank,
        home_mode: book.home_mode,
        only_file: book.only_file,
        footer: book.footer.clone(),
        nav,
        i18n: config.docs_resolved.i18n,
        fallback_language: config.docs_resolved.fallback_language.clone(),
        ignored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_site::NavItemKind;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_book_options_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("folio.toml");
        fs::write(
            &config_path,
            r#"
[book]
title = "Handbook"
display_rank = true
nav = [{ title = "Blog", link = "https://example.com/blog", nav_order = 3 }]

[docs]
source_dir = "content"
ignored = ["**/drafts/**"]
"#,
        )
        .unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();
        let options = book_options(&config).unwrap();

        assert_eq!(options.title, "Handbook");
        assert!(options.display_rank);
        assert_eq!(options.source_dir.as_deref(), Some("content"));
        assert_eq!(options.nav.len(), 1);
        assert_eq!(options.nav[0].kind, NavItemKind::Link);
        assert_eq!(options.nav[0].settings.nav_order, Some(3));
        assert!(options.ignored[0].matches("a/drafts/b.md"));
    }

    #[test]
    fn test_source_args_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("folio.toml");
        fs::write(&config_path, "[book]\ntitle = \"Handbook\"\n").unwrap();

        let args = SourceArgs {
            config: Some(config_path),
            docs: Some(dir.path().join("other")),
            display_rank: true,
            i18n: true,
        };
        let config = args.load(CliSettings::default()).unwrap();

        assert!(config.book.display_rank);
        assert!(config.docs_resolved.i18n);
        assert_eq!(config.docs_resolved.source_dir, dir.path().join("other"));
    }
}
