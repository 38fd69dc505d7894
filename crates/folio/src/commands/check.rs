//! `folio check` command implementation.

use std::sync::Arc;

use clap::Args;
use folio_config::CliSettings;
use folio_site::{BookCompiler, check_links};
use folio_storage::{FsStorage, Storage};

use super::{SourceArgs, book_options};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    source: SourceArgs,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.source.load(CliSettings::default())?;

        let storage: Arc<dyn Storage> =
            Arc::new(FsStorage::new(config.docs_resolved.source_dir.clone()));
        let book = BookCompiler::new(Arc::clone(&storage), book_options(&config)?).generate()?;

        output.compiled(&book);

        let broken = check_links(&book, storage.as_ref())?;
        if broken.is_empty() {
            output.status("Checked", "no broken links");
            return Ok(());
        }

        for link in &broken {
            output.broken_link(link);
        }
        Err(CliError::BrokenLinks(broken.len()))
    }
}
