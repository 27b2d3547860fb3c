use anyhow::{Context, Result};
use std::fs::{self, File};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogOutput, LoggingConfig};

/// Installs the global tracing subscriber described by `config`.
///
/// The level applies to everything, and explicitly to both runtime crates, so
/// `level = "debug"` shows proxy generation and sidecar requests.
pub fn setup_global_logging(config: &LoggingConfig) -> Result<()> {
    let level = config.level.as_str();
    let filter = format!("{},dapr_runtime={},dapr_client={}", level, level, level);

    match config.output {
        LogOutput::File => {
            let log_path = config.log_path();
            if let Some(parent) = log_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }
            let file = File::create(&log_path)
                .with_context(|| format!("Failed to create log file {:?}", log_path))?;
            let file_writer = std::sync::Mutex::new(file);

            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true)
                .with_ansi(false)
                .with_filter(EnvFilter::builder().parse(&filter)?);

            tracing_subscriber::registry()
                .with(file_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
        }
        LogOutput::Stdout => {
            let stdout_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true)
                .with_ansi(true)
                .pretty()
                .with_filter(EnvFilter::builder().parse(&filter)?);

            tracing_subscriber::registry()
                .with(stdout_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
        }
    }

    Ok(())
}
