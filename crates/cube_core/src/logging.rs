//! Logger initialization.
//!
//! Informational output goes to stdout and warnings/errors to stderr. Both
//! streams share one filter, taken from `LoggingConfig::env_filter`, then
//! `RUST_LOG`, then `info`.

use std::sync::Once;

use env_logger::{Logger, Target, WriteStyle};
use log::{Level, LevelFilter, Log, Metadata, Record};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter in `env_logger` syntax, e.g. "info" or "cube_render=debug,wgpu=warn".
    pub env_filter: Option<String>,
    pub write_style: WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: WriteStyle::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Output stream a record of `level` is written to.
pub fn stream_for(level: Level) -> Stream {
    if level <= Level::Warn {
        Stream::Stderr
    } else {
        Stream::Stdout
    }
}

struct SplitLogger {
    out: Logger,
    err: Logger,
}

impl Log for SplitLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        match stream_for(metadata.level()) {
            Stream::Stdout => self.out.enabled(metadata),
            Stream::Stderr => self.err.enabled(metadata),
        }
    }

    fn log(&self, record: &Record<'_>) {
        match stream_for(record.level()) {
            Stream::Stdout => self.out.log(record),
            Stream::Stderr => self.err.log(record),
        }
    }

    fn flush(&self) {
        self.out.flush();
        self.err.flush();
    }
}

fn filter_spec(config: &LoggingConfig) -> Option<String> {
    config
        .env_filter
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
}

fn build_logger(config: &LoggingConfig, target: Target) -> Logger {
    let mut builder = env_logger::Builder::new();
    match filter_spec(config) {
        Some(filter) => {
            builder.parse_filters(&filter);
        }
        None => {
            builder.filter_level(LevelFilter::Info);
        }
    }
    builder
        .target(target)
        .write_style(config.write_style)
        .format_target(false)
        .build()
}

static INIT: Once = Once::new();

/// Installs the global logger. Subsequent calls are ignored, as is the case
/// where another logger was installed first.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let logger = SplitLogger {
            out: build_logger(&config, Target::Stdout),
            err: build_logger(&config, Target::Stderr),
        };
        let max_level = logger.out.filter().max(logger.err.filter());
        if log::set_boxed_logger(Box::new(logger)).is_ok() {
            log::set_max_level(max_level);
        }
        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_and_errors_go_to_stderr() {
        assert_eq!(stream_for(Level::Error), Stream::Stderr);
        assert_eq!(stream_for(Level::Warn), Stream::Stderr);
    }

    #[test]
    fn informational_records_go_to_stdout() {
        assert_eq!(stream_for(Level::Info), Stream::Stdout);
        assert_eq!(stream_for(Level::Debug), Stream::Stdout);
        assert_eq!(stream_for(Level::Trace), Stream::Stdout);
    }

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig {
            env_filter: Some("warn".to_string()),
            ..Default::default()
        };
        let logger = build_logger(&config, Target::Stdout);
        assert_eq!(logger.filter(), LevelFilter::Warn);
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
        log::info!("still alive");
    }
}
