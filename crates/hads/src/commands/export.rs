//! `hads export` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use hads_config::{CliSettings, Config};
use hads_index::Indexer;
use hads_site::{ExportOptions, export};
use hads_storage::FsStorage;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Path to configuration file (default: auto-discover hads.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation root (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory (default: next to the sources).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Prefix prepended to image sources (overrides config).
    #[arg(long)]
    image_prefix: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExportArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let options = ExportOptions {
            output_dir: config.export_output_dir().to_path_buf(),
            image_prefix: self
                .image_prefix
                .unwrap_or_else(|| config.export_resolved.image_prefix.clone()),
        };
        output.field("Source", &config.docs_resolved.source_dir.display());
        output.field("Output", &options.output_dir.display());

        let storage = Arc::new(FsStorage::new(config.docs_resolved.source_dir.clone()));
        let indexer = Arc::new(Indexer::new(storage)?);
        let summary = export(&indexer, &options)?;

        output.done(format_args!(
            "Exported {} pages ({} folder indexes)",
            summary.pages, summary.folder_indexes
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_execute_writes_pages() {
        let source = tempfile::tempdir().unwrap();
        fs::write(source.path().join("README.md"), "# Home").unwrap();
        fs::write(source.path().join("hads.toml"), "").unwrap();
        let output = tempfile::tempdir().unwrap();

        let args = ExportArgs {
            config: Some(source.path().join("hads.toml")),
            source_dir: None,
            output_dir: Some(output.path().to_path_buf()),
            image_prefix: None,
            verbose: false,
        };
        args.execute().unwrap();

        let page = fs::read_to_string(output.path().join("README.html")).unwrap();
        assert!(page.contains(r#"<h1 id="home">Home</h1>"#));
        assert!(output.path().join("index.html").exists());
    }

    #[test]
    fn test_execute_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = ExportArgs {
            config: Some(dir.path().join("hads.toml")),
            source_dir: None,
            output_dir: None,
            image_prefix: None,
            verbose: false,
        };

        assert!(matches!(args.execute(), Err(CliError::Config(_))));
    }
}
