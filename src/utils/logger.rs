use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "linksan=warn";

pub fn init_logger(log_dir: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match log_dir {
        Some(log_dir) => {
            // Create log directory if it doesn't exist
            if !log_dir.exists() {
                fs::create_dir_all(log_dir)
                    .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
            }

            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            let log_file = log_dir.join(format!("linksan_{}.log", timestamp));

            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(fs::File::create(&log_file)?))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            info!("Logging to {}", log_file.display());
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    info!("Logger initialized");
    Ok(())
}
