//! `folio serve` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use folio_config::CliSettings;
use folio_server::{ServerConfig, run_server};

use super::{SourceArgs, book_options};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Theme file (JSON, TOML or YAML).
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Enable live reload (default: enabled).
    #[arg(long)]
    live_reload: Option<bool>,

    /// Disable live reload.
    #[arg(long, conflicts_with = "live_reload")]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let live_reload_enabled = self.resolve_live_reload_enabled();
        let config = self.source.load(CliSettings {
            host: self.host,
            port: self.port,
            theme: self.theme,
            live_reload_enabled,
            ..CliSettings::default()
        })?;

        output.status(
            "Serving",
            &format!(
                "{} on http://{}:{}",
                config.docs_resolved.source_dir.display(),
                config.server.host,
                config.server.port
            ),
        );
        if let Some(theme) = &config.docs_resolved.theme {
            output.status("Theme", &theme.display().to_string());
        }
        if config.live_reload.enabled {
            output.status("Watching", "live reload enabled");
        }

        let server_config = ServerConfig {
            host: config.server.host.clone(),
            port: config.server.port,
            source_dir: config.docs_resolved.source_dir.clone(),
            theme: config.docs_resolved.theme.clone(),
            live_reload_enabled: config.live_reload.enabled,
            debounce: Duration::from_millis(config.live_reload.debounce_ms),
            book: book_options(&config)?,
            version: version.to_owned(),
        };
        run_server(server_config).await?;

        Ok(())
    }

    /// Resolve `live_reload_enabled` from --live-reload/--no-live-reload flags.
    fn resolve_live_reload_enabled(&self) -> Option<bool> {
        self.no_live_reload.then_some(false).or(self.live_reload)
    }
}
