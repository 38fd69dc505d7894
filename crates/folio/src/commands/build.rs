//! `folio build` command implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use folio_config::CliSettings;
use folio_site::{BookCompiler, documents_file_name, render_sitemap, search_documents};
use folio_storage::{FsStorage, Storage};

use super::{SourceArgs, book_options};
use crate::error::CliError;
use crate::output::Output;

/// File name of the compiled book config.
const BOOK_FILE: &str = "book.json";

const SITEMAP_FILE: &str = "sitemap.xml";

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory (default: dist next to folio.toml).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the book config to stdout instead of writing files.
    #[arg(long)]
    json: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.source.load(CliSettings {
            output_dir: self.output,
            ..CliSettings::default()
        })?;

        let storage: Arc<dyn Storage> =
            Arc::new(FsStorage::new(config.docs_resolved.source_dir.clone()));
        let compiler = BookCompiler::new(Arc::clone(&storage), book_options(&config)?);
        let book = compiler.generate()?;
        let json = book.to_json()?;

        if self.json {
            output.data(&json);
            return Ok(());
        }

        let output_dir = &config.build_resolved.output_dir;
        output.compiled(&book);
        fs::create_dir_all(output_dir)?;

        if write_if_changed(&output_dir.join(BOOK_FILE), &json)? {
            output.status("Wrote", BOOK_FILE);
        } else {
            output.status("Fresh", BOOK_FILE);
        }

        for (lang, documents) in search_documents(&book, storage.as_ref())? {
            let name = documents_file_name(&lang);
            write_if_changed(&output_dir.join(&name), &serde_json::to_string(&documents)?)?;
            tracing::info!(file = %name, count = documents.len(), "Wrote search documents");
        }

        if let Some(site) = &config.build_resolved.site {
            write_if_changed(&output_dir.join(SITEMAP_FILE), &render_sitemap(&book, site))?;
            output.status("Wrote", SITEMAP_FILE);
        }

        output.status("Finished", &output_dir.display().to_string());
        Ok(())
    }
}

/// Write `content` unless the file already holds exactly that.
///
/// Returns whether the file was written. Skipping unchanged output keeps
/// file watchers of downstream tools quiet.
fn write_if_changed(path: &Path, content: &str) -> Result<bool, CliError> {
    match fs::read_to_string(path) {
        Ok(existing) if existing == content => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::write(path, content)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_if_changed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BOOK_FILE);

        assert!(write_if_changed(&path, "{}\n").unwrap());
        assert!(!write_if_changed(&path, "{}\n").unwrap());
        assert!(write_if_changed(&path, "{\"title\": \"x\"}\n").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"title\": \"x\"}\n");
    }

    #[test]
    fn test_build_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(docs.join("001-guide")).unwrap();
        fs::write(docs.join("README.md"), "# Home\n").unwrap();
        fs::write(docs.join("001-guide/001-setup.md"), "# Setup\n\nInstall it.\n").unwrap();
        let config_path = dir.path().join("folio.toml");
        fs::write(
            &config_path,
            "[book]\ntitle = \"Book\"\n\n[build]\nsite = \"https://docs.example.com\"\n",
        )
        .unwrap();

        let args = BuildArgs {
            source: SourceArgs {
                config: Some(config_path),
                ..SourceArgs::default()
            },
            output: None,
            json: false,
        };
        args.execute().unwrap();

        let dist = dir.path().join("dist");
        let book: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dist.join(BOOK_FILE)).unwrap()).unwrap();
        assert_eq!(book["title"], "Book");

        let documents = fs::read_to_string(dist.join("documents.json")).unwrap();
        assert!(documents.contains("Install it."));

        let sitemap = fs::read_to_string(dist.join(SITEMAP_FILE)).unwrap();
        assert!(sitemap.contains("<loc>https://docs.example.com/guide/setup</loc>"));
    }
}
