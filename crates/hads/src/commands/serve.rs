//! `hads serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use hads_config::{CliSettings, Config};
use hads_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover hads.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation root (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long, env = "HADS_HOST")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "HADS_PORT")]
    port: Option<u16>,

    /// Disable creating and editing files.
    #[arg(long)]
    read_only: bool,

    /// Enable verbose output (log every index pass and request).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.banner(format_args!(
            "Serving on http://{}:{}",
            config.server.host, config.server.port
        ));
        output.field("Source directory", &config.docs_resolved.source_dir.display());
        if config.docs_resolved.read_only {
            output.note("Read-only: editing disabled");
        }

        let server_config = server_config_from_config(&config);
        if let Some(css) = &server_config.custom_css {
            output.field("Custom stylesheet", &css.display());
        }

        run_server(server_config).await?;
        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            source_dir: self.source_dir.clone(),
            read_only: self.read_only.then_some(true),
            ..CliSettings::default()
        }
    }
}
