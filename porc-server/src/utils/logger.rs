//! Logging Infrastructure
//!
//! `RUST_LOG`-driven filter, console output by default, daily rolling files
//! when a log directory is configured. Production logs are JSON.

use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "porc_server=info,tower_http=info";

/// Initialize the global subscriber
pub fn init_logger(log_dir: Option<&Path>, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    if let Some(dir) = log_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Cannot create log dir {}: {e}, logging to stdout", dir.display());
        } else {
            let file_appender = tracing_appender::rolling::daily(dir, "porc-server");
            if json {
                subscriber.json().with_writer(file_appender).init();
            } else {
                subscriber.with_ansi(false).with_writer(file_appender).init();
            }
            return;
        }
    }

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
