//! HTTP server for hads.
//!
//! Serves a documentation root with axum:
//! - GET on any route resolves it to a rendered page, a raw file or a redirect
//! - POST on a document route saves the submitted `content`
//! - `/_hads/custom.css` serves the root's custom stylesheet
//!
//! Pages are full HTML documents, or JSON when the client sends
//! `Accept: application/json`.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use hads_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         source_dir: PathBuf::from("docs"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use hads_index::Indexer;
use hads_site::{Layout, Resolver};
use hads_storage::FsStorage;
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Documentation root.
    pub source_dir: PathBuf,
    /// Disable creating and editing files.
    pub read_only: bool,
    /// Images directory, relative to the root.
    pub images_dir: String,
    /// Custom stylesheet (`None` when the root has none).
    pub custom_css: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 4040,
            source_dir: PathBuf::from("."),
            read_only: false,
            images_dir: "images".to_owned(),
            custom_css: None,
        }
    }
}

/// Run the server until Ctrl-C.
///
/// Indexes the whole root before accepting requests.
///
/// # Errors
///
/// Returns an error if the root cannot be indexed or the address cannot be
/// bound.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let storage = Arc::new(FsStorage::new(config.source_dir.clone()));
    let indexer = Arc::new(Indexer::new(storage)?);
    indexer.index_all()?;
    tracing::info!(documents = indexer.len(), "Indexed documentation root");

    let state = Arc::new(AppState {
        resolver: Resolver::new(indexer).with_read_only(config.read_only),
        layout: Layout::new()
            .with_read_only(config.read_only)
            .with_custom_css(config.custom_css.is_some()),
        images_dir: config.images_dir.clone(),
        custom_css: config.custom_css.clone(),
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from a loaded `hads.toml`.
///
/// The custom stylesheet is detected once, here.
#[must_use]
pub fn server_config_from_config(config: &hads_config::Config) -> ServerConfig {
    let docs = &config.docs_resolved;

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        source_dir: docs.source_dir.clone(),
        read_only: docs.read_only,
        images_dir: docs.images_dir.clone(),
        custom_css: docs.has_custom_css().then(|| docs.custom_css_path()),
    }
}

#[cfg(test)]
mod tests {
    use hads_config::{CliSettings, Config};

    use super::*;

    #[test]
    fn test_server_config_from_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("custom.css"), "body {}").unwrap();
        let config_path = temp_dir.path().join("hads.toml");
        std::fs::write(&config_path, "[server]\nport = 8080\n\n[docs]\nread_only = true\n").unwrap();

        let settings = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&config_path), Some(&settings)).unwrap();
        let server_config = server_config_from_config(&config);

        assert_eq!(server_config.host, "0.0.0.0");
        assert_eq!(server_config.port, 8080);
        assert_eq!(server_config.source_dir, temp_dir.path());
        assert!(server_config.read_only);
        assert_eq!(server_config.images_dir, "images");
        assert_eq!(
            server_config.custom_css,
            Some(temp_dir.path().join("custom.css"))
        );
    }

    #[test]
    fn test_server_config_without_custom_css() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("hads.toml");
        std::fs::write(&config_path, "").unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();
        assert_eq!(server_config_from_config(&config).custom_css, None);
    }
}
