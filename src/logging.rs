use crate::config::LoggingConfig;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Console logging plus an optional plain-text log file. `RUST_LOG` overrides
/// the configured level. Keep the returned guard alive until exit so the file
/// writer flushes.
pub fn init_logging(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(filter());

    let (file_layer, guard) = match cfg.file.as_deref().map(Path::new) {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "pipeline.log".into());
            // Falls back to console only if the directory cannot be made.
            match std::fs::create_dir_all(dir) {
                Ok(()) => {
                    let appender = tracing_appender::rolling::never(dir, name);
                    let (writer, guard) = tracing_appender::non_blocking(appender);
                    let layer = tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer)
                        .with_filter(filter());
                    (Some(layer), Some(guard))
                }
                Err(e) => {
                    eprintln!("cannot create log directory {}: {}", dir.display(), e);
                    (None, None)
                }
            }
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init();
    guard
}
