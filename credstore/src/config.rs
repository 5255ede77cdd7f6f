use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{CONFIG_ENV_PREFIX, DEFAULT_LOG_LEVEL, DEFAULT_TABLE_CAPACITY};
use crate::error::Result;

const ENV_SEPARATOR: &str = "_";

/// Settings for a credential store.
///
/// Missing sections and fields fall back to their defaults, so an empty
/// file is a valid config. Field names avoid underscores since the
/// environment source splits keys on them (`CREDSTORE_TABLE_CAPACITY` is
/// `table.capacity`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StoreConfig {
    pub table: TableCfg,
    pub log: LogCfg,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct TableCfg {
    /// Initial number of slots. Must be a power of two.
    pub capacity: usize,
}

impl Default for TableCfg {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TABLE_CAPACITY,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct LogCfg {
    /// `EnvFilter` directive, e.g. `warn` or `credstore=debug`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Format of the log messages. Options are: `json` or `compact`. Default is `compact`
    pub format: Option<String>,
    /// Append logs to this file instead of stderr.
    pub path: Option<PathBuf>,
}

impl Default for LogCfg {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: None,
            path: None,
        }
    }
}

impl StoreConfig {
    /// Loads a config from a file. The file has to exist.
    pub fn from_file(path: &Path) -> Result<StoreConfig> {
        let settings = Config::builder().add_source(
            File::from(path)
                .required(true)
                .format(FileFormat::Toml),
        );
        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Resolves the config from the optional file at `path`, then applies
    /// `CREDSTORE_*` environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<StoreConfig> {
        let mut settings = Config::builder();
        if let Some(path) = path {
            settings = settings.add_source(
                File::from(path)
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }
        settings = settings.add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .prefix_separator(ENV_SEPARATOR)
                .try_parsing(true),
        );
        let config = settings.build()?;
        debug!("Config built: {config:?}");
        Ok(config.try_deserialize()?)
    }

    /// Writes a config to a file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let data = toml::to_string(self)?;
        if let Some(parent_dir) = path.parent() {
            std::fs::create_dir_all(parent_dir)?;
        }

        std::fs::write(path, data)?;
        Ok(())
    }
}
