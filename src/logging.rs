use anyhow::Context;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Daily-rotated `server.YYYY-MM-DD.log` files, oldest pruned past `max_files`.
pub fn file_appender(cfg: &LogConfig) -> anyhow::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("server")
        .filename_suffix("log")
        .max_log_files(cfg.max_files)
        .build(&cfg.dir)
        .with_context(|| format!("open log directory {}", cfg.dir))
}

/// Console output plus a JSON file log. The guard must outlive the program's logging.
pub fn init(cfg: &LogConfig) -> anyhow::Result<WorkerGuard> {
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(cfg)?);

    let console_json = cfg.json.then(|| fmt::layer().with_target(false).json());
    let console_text = (!cfg.json).then(fmt::layer);
    let file = fmt::layer().with_ansi(false).json().with_writer(file_writer);

    tracing_subscriber::registry()
        .with(EnvFilter::new(&cfg.filter))
        .with(console_json)
        .with(console_text)
        .with(file)
        .try_init()
        .context("install tracing subscriber")?;
    Ok(guard)
}
