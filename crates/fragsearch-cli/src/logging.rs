use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Environment variable holding filter directives that replace `-v`/`-q`,
/// e.g. `FRAGSEARCH_LOG=fragsearch::engine::invoker=trace`.
pub const LOG_ENV_VAR: &str = "FRAGSEARCH_LOG";

/// `-q` keeps errors only. Each `-v` opens one more level, starting from warnings.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::ERROR
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Builds the event filter. Directives from the environment win over the flags, except
/// under `-q`.
pub fn event_filter(verbosity: u8, quiet: bool, directives: Option<&str>) -> Result<EnvFilter> {
    let default = level_filter(verbosity, quiet);
    match directives.filter(|d| !quiet && !d.trim().is_empty()) {
        Some(directives) => EnvFilter::builder()
            .with_default_directive(default.into())
            .parse(directives)
            .map_err(|e| CliError::Config(format!("Invalid {}: {}", LOG_ENV_VAR, e))),
        None => Ok(EnvFilter::builder()
            .with_default_directive(default.into())
            .parse_lossy("")),
    }
}

/// Installs the global subscriber: compact records on stderr and, with `--log-file`,
/// a plain-text copy that also notes when each workflow span closes.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let directives = std::env::var(LOG_ENV_VAR).ok();
    let filter = event_filter(verbosity, quiet, directives.as_deref())?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer);

    if let Some(path) = log_file {
        let file = File::create(&path).map_err(CliError::Io)?;
        subscriber.with(file_layer(file)).init();
    } else {
        subscriber.init();
    }

    Ok(())
}

fn file_layer<S>(file: File) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
}
