//! Logging configuration for litemodel
//!
//! litemodel emits `tracing` events: connection lifecycle at `info`, failed
//! statements at `debug`, and registry misses or failed table creation at
//! `warn`. Applications that already install a subscriber need nothing from
//! this module; [`LogConfig`] is a convenience for those that don't.

use litemodel_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "litemodel.log";

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to a daily-rotated file
    File(PathBuf),
    /// Output to both stdout and file
    Both(PathBuf),
}

/// Log format style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable format (default)
    Pretty,
    /// Single-line format
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `litemodel=debug`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Info level to stdout
    pub fn info() -> Self {
        Self::default()
    }

    /// Debug level to stdout; shows every failed statement
    pub fn debug() -> Self {
        Self::default().with_level("debug")
    }

    /// Warn level to stdout
    pub fn warn() -> Self {
        Self::default().with_level("warn")
    }

    /// Set log output to a rotated file
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Set log output to both stdout and file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set log level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Install this configuration as the global subscriber.
    ///
    /// File output returns a guard that must be kept alive; dropping it
    /// flushes and stops the writer thread. Fails with
    /// [`Error::InvalidArgument`] on a bad filter directive and with
    /// [`Error::InvalidOperation`] if a global subscriber is already set.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use litemodel::logging::LogConfig;
    ///
    /// let _guard = LogConfig::debug().with_file("./logs/litemodel.log").init()?;
    /// # Ok::<(), litemodel::Error>(())
    /// ```
    pub fn init(self) -> Result<Option<WorkerGuard>> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| Error::InvalidArgument(format!("log filter {:?}: {}", self.level, e)))?;
        let registry = tracing_subscriber::registry().with(env_filter);

        let (result, guard) = match (&self.output, self.format) {
            (LogOutput::Stdout, LogFormat::Pretty) => {
                (registry.with(fmt::layer().pretty()).try_init(), None)
            }
            (LogOutput::Stdout, LogFormat::Compact) => {
                (registry.with(fmt::layer().compact()).try_init(), None)
            }
            (LogOutput::File(path), LogFormat::Pretty) => {
                let (writer, guard) = file_writer(path);
                let layer = fmt::layer().with_writer(writer).with_ansi(false).pretty();
                (registry.with(layer).try_init(), Some(guard))
            }
            (LogOutput::File(path), LogFormat::Compact) => {
                let (writer, guard) = file_writer(path);
                let layer = fmt::layer().with_writer(writer).with_ansi(false).compact();
                (registry.with(layer).try_init(), Some(guard))
            }
            // Both outputs share the default single-line layout
            (LogOutput::Both(path), _) => {
                let (writer, guard) = file_writer(path);
                let result = registry
                    .with(fmt::layer())
                    .with(fmt::layer().with_writer(writer).with_ansi(false))
                    .try_init();
                (result, Some(guard))
            }
        };

        result.map_err(|e| Error::InvalidOperation(format!("logging already initialized: {}", e)))?;
        Ok(guard)
    }
}

fn file_writer(path: &Path) -> (NonBlocking, WorkerGuard) {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);
    tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, file_name))
}
