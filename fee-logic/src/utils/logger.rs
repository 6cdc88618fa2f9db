use anyhow::{Context, Result};
use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use std::path::PathBuf;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Targets,
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
};

/// Where and how verbosely the editor logs
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub file_level: Level,
    pub console_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "fee-editor".to_string(),
            file_level: Level::DEBUG,
            console_level: Level::INFO,
        }
    }
}

impl LogConfig {
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_console_level(mut self, level: Level) -> Self {
        self.console_level = level;
        self
    }
}

/// Installs a daily rolling file layer and a colourised console layer.
/// The returned guard must outlive all logging.
pub fn setup_logger(config: &LogConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!(
            "Failed to create log directory {}",
            config.directory.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(Targets::new().with_default(config.file_level));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(Targets::new().with_default(config.console_level));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to set global subscriber")?;

    Ok(guard)
}

// --- Formatters ---

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn event_message(event: &Event<'_>) -> String {
    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);
    visitor.message
}

/// Highlights commit outcomes in the message
fn colorize(msg: &str) -> String {
    const MARKERS: [(&str, Color); 3] = [
        ("COMMITTED", Color::LightGreen),
        ("BLOCKED", Color::LightRed),
        ("FAILED", Color::LightRed),
    ];
    MARKERS
        .iter()
        .fold(msg.to_string(), |acc, (marker, color)| {
            acc.replace(
                marker,
                &Style::new().fg(*color).bold().paint(*marker).to_string(),
            )
        })
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = *event.metadata().level();
        let msg = colorize(&event_message(event));
        if level <= Level::WARN {
            let tag = Style::new().fg(Color::Yellow).paint(level.as_str());
            writeln!(writer, "{} {}", tag, msg)
        } else {
            writeln!(writer, "{}", msg)
        }
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let metadata = event.metadata();
        writeln!(
            writer,
            "{} [{}] {}: {}",
            timestamp,
            metadata.level(),
            metadata.target(),
            event_message(event)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize_marks_outcomes() {
        let plain = colorize("nothing to see");
        assert_eq!(plain, "nothing to see");

        let marked = colorize("Gas fee COMMITTED: limit=21000");
        assert!(marked.contains("COMMITTED"));
        assert_ne!(marked, "Gas fee COMMITTED: limit=21000");
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default().with_directory("/tmp/fee-logs");
        assert_eq!(config.directory, PathBuf::from("/tmp/fee-logs"));
        assert_eq!(config.console_level, Level::INFO);
    }
}
