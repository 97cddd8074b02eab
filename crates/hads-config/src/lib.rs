//! Configuration management for hads.
//!
//! Parses `hads.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `docs.source_dir`
//! - `docs.images_dir`
//! - `export.output_dir`
//! - `export.image_prefix`

mod expand;

use std::path::{Path, PathBuf};

use hads_storage::path::sanitize_path;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the documentation root.
    pub source_dir: Option<PathBuf>,
    /// Override read-only mode.
    pub read_only: Option<bool>,
    /// Override the static export directory.
    pub output_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "hads.toml";

const DEFAULT_IMAGES_DIR: &str = "images";
const DEFAULT_CUSTOM_CSS: &str = "custom.css";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Static export configuration (paths are relative strings from TOML).
    export: ExportConfigRaw,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved export configuration (set after loading).
    #[serde(skip)]
    pub export_resolved: ExportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 4040,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    images_dir: Option<String>,
    read_only: Option<bool>,
    custom_css: Option<String>,
}

/// Resolved documentation configuration.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Documentation root.
    pub source_dir: PathBuf,
    /// Images directory, relative to the root, with leading `../` stripped.
    pub images_dir: String,
    /// Whether creating and editing files is disabled.
    pub read_only: bool,
    /// Stylesheet file name, relative to the root.
    pub custom_css: String,
}

impl DocsConfig {
    /// Absolute images directory.
    #[must_use]
    pub fn images_path(&self) -> PathBuf {
        self.source_dir.join(&self.images_dir)
    }

    /// Absolute custom stylesheet path.
    #[must_use]
    pub fn custom_css_path(&self) -> PathBuf {
        self.source_dir.join(&self.custom_css)
    }

    /// Whether the custom stylesheet exists.
    #[must_use]
    pub fn has_custom_css(&self) -> bool {
        self.custom_css_path().is_file()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportConfigRaw {
    output_dir: Option<String>,
    image_prefix: Option<String>,
}

/// Resolved static export configuration.
#[derive(Debug, Default)]
pub struct ExportConfig {
    /// Output directory. `None` writes next to the sources.
    pub output_dir: Option<PathBuf>,
    /// Prefix prepended to relative image sources.
    pub image_prefix: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.source_dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_ROOT`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn expand_optional(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(raw) = value {
        *raw = expand::expand_env(raw, field)?;
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `hads.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Directory static exports are written to.
    #[must_use]
    pub fn export_output_dir(&self) -> &Path {
        self.export_resolved
            .output_dir
            .as_deref()
            .unwrap_or(&self.docs_resolved.source_dir)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(read_only) = settings.read_only {
            self.docs_resolved.read_only = read_only;
        }
        if let Some(output_dir) = &settings.output_dir {
            self.export_resolved.output_dir = Some(output_dir.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            docs: DocsConfigRaw::default(),
            export: ExportConfigRaw::default(),
            docs_resolved: DocsConfig {
                source_dir: base.to_path_buf(),
                images_dir: DEFAULT_IMAGES_DIR.to_owned(),
                read_only: false,
                custom_css: DEFAULT_CUSTOM_CSS.to_owned(),
            },
            export_resolved: ExportConfig::default(),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        require_non_empty(&self.docs_resolved.images_dir, "docs.images_dir")?;
        require_non_empty(&self.docs_resolved.custom_css, "docs.custom_css")?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        expand_optional(&mut self.docs.source_dir, "docs.source_dir")?;
        expand_optional(&mut self.docs.images_dir, "docs.images_dir")?;
        expand_optional(&mut self.export.output_dir, "export.output_dir")?;
        expand_optional(&mut self.export.image_prefix, "export.image_prefix")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let source_dir = match self.docs.source_dir.as_deref() {
            Some(dir) => config_dir.join(dir),
            None => config_dir.to_path_buf(),
        };

        self.docs_resolved = DocsConfig {
            source_dir,
            images_dir: sanitize_path(self.docs.images_dir.as_deref().unwrap_or(DEFAULT_IMAGES_DIR)),
            read_only: self.docs.read_only.unwrap_or(false),
            custom_css: self
                .docs
                .custom_css
                .clone()
                .unwrap_or_else(|| DEFAULT_CUSTOM_CSS.to_owned()),
        };

        self.export_resolved = ExportConfig {
            output_dir: self.export.output_dir.as_deref().map(|dir| config_dir.join(dir)),
            image_prefix: self.export.image_prefix.clone().unwrap_or_default(),
        };
    }
}
