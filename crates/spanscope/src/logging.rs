//! Logging setup for spanscope
//
// Console output goes to stderr so stdout stays clean for the chart. An
// optional log file gets the same events without colors.
//
// Usage:
//   Call `logging::init(verbose, log_file)` at the start of main().
//   Keep the returned guard alive for the program's duration.

use std::io::IsTerminal;
use std::path::Path;
use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::fmt::{
    format::{FormatEvent, FormatFields, Writer},
    FmtContext,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

#[allow(dead_code)]
pub struct LogGuard(Option<tracing_appender::non_blocking::WorkerGuard>);

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the default level.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<LogGuard> {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(val) => tracing_subscriber::EnvFilter::new(val),
        Err(_) if verbose => tracing_subscriber::EnvFilter::new("debug"),
        Err(_) => tracing_subscriber::EnvFilter::new("info"),
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .event_format(ConsoleFormatter {
            ansi: std::io::stderr().is_terminal(),
        });

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(LogGuard(guard))
}

/// Compact console line: time, level, target, message
pub struct ConsoleFormatter {
    ansi: bool,
}

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let (level_str, level_color) = match *meta.level() {
            tracing::Level::ERROR => ("ERROR", "\x1b[1;91m"),
            tracing::Level::WARN => ("WARN ", "\x1b[1;93m"),
            tracing::Level::INFO => ("INFO ", "\x1b[1;94m"),
            tracing::Level::DEBUG => ("DEBUG", "\x1b[1;92m"),
            tracing::Level::TRACE => ("TRACE", "\x1b[1;95m"),
        };
        let now = chrono::Local::now().format("%H:%M:%S%.3f");

        if self.ansi {
            write!(writer, "\x1b[2;36m{}\x1b[0m {}{}\x1b[0m \x1b[2;33m{}\x1b[0m: ", now, level_color, level_str, meta.target())?;
        } else {
            write!(writer, "{} {} {}: ", now, level_str, meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
