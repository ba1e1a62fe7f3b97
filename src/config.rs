//! Layered configuration: built-in defaults, then an optional `config.toml` in
//! the platform config directory, then `LIBRARY_*` environment variables
//! (`LIBRARY_STORAGE__DATA_DIR=/srv/library`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::catalog::{CatalogFiles, BOOKS_FILE_NAME, MEMBERS_FILE_NAME};

const ENV_PREFIX: &str = "LIBRARY";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config_file = project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME));
        Self::load_from(config_file.as_deref())
    }

    /// Build the configuration from an explicit file (if any) plus the
    /// environment. A missing file is not an error.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        }

        let cfg = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("failed to build configuration")?;

        cfg.try_deserialize()
            .context("failed to deserialize configuration")
    }
}

/// Where the catalog files live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "StorageConfig::default_books_file")]
    pub books_file: String,
    #[serde(default = "StorageConfig::default_members_file")]
    pub members_file: String,
}

impl StorageConfig {
    fn default_data_dir() -> PathBuf {
        PathBuf::from(".")
    }

    fn default_books_file() -> String {
        BOOKS_FILE_NAME.to_string()
    }

    fn default_members_file() -> String {
        MEMBERS_FILE_NAME.to_string()
    }

    pub fn catalog_files(&self) -> CatalogFiles {
        CatalogFiles::new(
            self.data_dir.join(&self.books_file),
            self.data_dir.join(&self.members_file),
        )
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            books_file: Self::default_books_file(),
            members_file: Self::default_members_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    #[serde(default = "LoggingConfig::default_directory")]
    pub directory: PathBuf,
    #[serde(default = "LoggingConfig::default_file_name")]
    pub file_name: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }

    /// The platform data directory, or the working directory when the home
    /// directory cannot be resolved.
    fn default_directory() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn default_file_name() -> String {
        "library-catalog.log".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            directory: Self::default_directory(),
            file_name: Self::default_file_name(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "library", "library-catalog")
}
