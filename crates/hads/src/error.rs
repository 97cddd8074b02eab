//! CLI error types.

use hads_config::ConfigError;
use hads_index::IndexError;
use hads_server::ServerError;
use hads_site::ExportError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Index(#[from] IndexError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Export(#[from] ExportError),
}
