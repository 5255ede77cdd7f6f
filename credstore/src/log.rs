use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LogCfg;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl From<Option<&str>> for LogFormat {
    fn from(fmt: Option<&str>) -> Self {
        match fmt.map(|s| s.to_lowercase()) {
            None => LogFormat::Compact,
            Some(s) => match s.as_str() {
                "json" => LogFormat::Json,
                "compact" | "" => LogFormat::Compact,
                _ => {
                    warn!("log.format: {} is not supported, defaulting to `compact`", s);
                    LogFormat::Compact
                }
            },
        }
    }
}

/// Installs the global tracing subscriber described by `cfg`.
///
/// `RUST_LOG` wins over `cfg.level`. Logs go to stderr unless `cfg.path`
/// is set, in which case they are appended to that file. Fails if a global
/// subscriber is already installed.
pub fn initialize_tracing_subscriber(cfg: &LogCfg) -> Result<()> {
    // Logging format
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_file(true)
        .with_target(false);

    // Level filter
    let filter_layer = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(cfg.level.as_str())?,
    };

    let trace_builder = tracing_subscriber::registry().with(filter_layer);

    // The layer type changes with both the format and the writer, so each
    // combination is spelled out.
    let format = LogFormat::from(cfg.format.as_deref());
    let installed = match cfg.path.as_ref() {
        Some(path) => {
            let file = Mutex::new(OpenOptions::new().append(true).create(true).open(path)?);
            match format {
                LogFormat::Compact => trace_builder
                    .with(fmt_layer.compact().with_writer(file))
                    .try_init(),
                LogFormat::Json => trace_builder
                    .with(fmt_layer.json().with_writer(file))
                    .try_init(),
            }
        }
        None => match format {
            LogFormat::Compact => trace_builder
                .with(fmt_layer.compact().with_writer(io::stderr))
                .try_init(),
            LogFormat::Json => trace_builder
                .with(fmt_layer.json().with_writer(io::stderr))
                .try_init(),
        },
    };

    installed.map_err(|e| StoreError::LogInit(e.to_string()))
}
