//! Logger built on `tracing-subscriber`.
//!
//! Console output plus an optional file output in full, compact or JSON
//! format. The level filter can be changed at runtime through
//! [`LogLevelHandle`].

pub mod config;
pub mod error;

pub use config::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};
pub use error::LoggerError;

use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

type FilteredRegistry = tracing_subscriber::layer::Layered<reload::Layer<EnvFilter, Registry>, Registry>;

type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Changes the active filter of an initialized logger.
#[derive(Clone)]
pub struct LogLevelHandle {
    inner: Arc<FilterHandle>,
}

impl LogLevelHandle {
    /// Replaces the filter with `level`, a level name or `EnvFilter` directive.
    pub fn set_level(&self, level: &str) -> Result<(), LoggerError> {
        let filter = build_filter(level)?;
        self.inner
            .reload(filter)
            .map_err(|e| LoggerError::Init(e.to_string()))?;
        tracing::info!(level, "Log level changed");
        Ok(())
    }

    pub fn current_level(&self) -> Option<String> {
        self.inner.with_current(|filter| filter.to_string()).ok()
    }
}

/// Parses a level name or directive string into an [`EnvFilter`].
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(level).map_err(|e| LoggerError::Filter {
        directive: level.to_string(),
        message: e.to_string(),
    })
}

/// Installs the global subscriber.
///
/// The file layer is registered before the console layer so ANSI escapes
/// never reach the file.
pub fn init_logger(config: LoggerConfig) -> Result<LogLevelHandle, LoggerError> {
    config.validate()?;

    let (filter_layer, handle) = reload::Layer::new(build_filter(&config.level)?);

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.file.enabled {
        layers.push(file_layer(&config.file)?);
    }
    if config.console.enabled {
        let use_ansi = config.console.colored && std::io::stdout().is_terminal();
        layers.push(
            fmt::layer()
                .with_ansi(use_ansi)
                .with_target(true)
                .with_level(true)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(layers)
        .try_init()
        .map_err(|e| LoggerError::Init(e.to_string()))?;

    Ok(LogLevelHandle {
        inner: Arc::new(handle),
    })
}

fn file_layer(config: &FileConfig) -> Result<BoxedLayer, LoggerError> {
    let writer = Mutex::new(open_log_file(&config.path, config.append)?);
    let base = fmt::layer().with_ansi(false).with_target(true);

    let layer = match config.format {
        LogFormat::Full => base.with_writer(writer).boxed(),
        LogFormat::Compact => base.compact().with_writer(writer).boxed(),
        LogFormat::Json => base.json().with_writer(writer).boxed(),
    };
    Ok(layer)
}

fn open_log_file(path: &Path, append: bool) -> Result<File, LoggerError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_test_handle<R>(initial: &str, f: impl FnOnce(&LogLevelHandle) -> R) -> R {
        let (filter_layer, handle) = reload::Layer::new(build_filter(initial).unwrap());
        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().with_writer(std::io::sink));
        let handle = LogLevelHandle {
            inner: Arc::new(handle),
        };
        tracing::subscriber::with_default(subscriber, || f(&handle))
    }

    #[test]
    fn set_level_replaces_filter() {
        with_test_handle("info", |handle| {
            handle.set_level("debug").unwrap();
            assert_eq!(handle.current_level().as_deref(), Some("debug"));

            handle.set_level("warn,ecotrack::services=trace").unwrap();
            let current = handle.current_level().unwrap();
            assert!(current.contains("ecotrack::services=trace"));
        });
    }

    #[test]
    fn invalid_directive_is_rejected() {
        assert!(matches!(
            build_filter("ecotrack=loud"),
            Err(LoggerError::Filter { .. })
        ));
    }

    #[test]
    fn log_file_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/app.log");
        open_log_file(&path, true).unwrap();
        assert!(path.exists());
    }
}
