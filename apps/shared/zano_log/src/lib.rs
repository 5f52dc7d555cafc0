//! Centralized logging for Zano applications
//!
//! Provides a custom formatter for tracing that:
//! - Formats thread IDs as #N instead of ThreadId(N)
//! - Renders script output (events carrying `runtime` and `object` fields) as
//!   `lua::object-name: message`
//! - Strips the application prefix from targets for cleaner output
//! - Filters external dependency logs based on `ZANO_LOGDEPS`
//!
//! # Environment Variables
//!
//! - `ZANO_LOGDEPS`: Set to `1` to enable logging from external dependencies.
//!   Default is `0` which only shows logs from Zano code and scripts.
//! - `RUST_LOG`: Overrides the filter directives entirely.
//!
//! # Usage
//!
//! ```rust,ignore
//! use zano_log::{init_logging, LogConfig};
//! use tracing::Level;
//!
//! let file = std::fs::File::create("client.log")?;
//! let config = LogConfig::new("zano_client::")
//!     .with_log_file(file)
//!     .with_level(Level::DEBUG);
//! init_logging(config)?;
//! ```

use std::fmt as std_fmt;
use std::io::{self, Write};
use tracing::Level;
use tracing::field::Field;
use tracing_subscriber::field::Visit;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields, format::Writer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Crates whose events pass the default filter
const ZANO_TARGETS: [&str; 3] = ["zano_client", "zano_runtime", "zano_log"];

/// Field extractor for the script fields `runtime` and `object`
///
/// Used by the custom formatter to detect script log records and format them
/// as `runtime::object: message`.
#[derive(Default)]
pub struct FieldExtractor {
    pub runtime: Option<String>,
    pub object: Option<String>,
    pub message: Option<String>,
}

impl FieldExtractor {
    fn set(&mut self, field: &Field, value: String) {
        match field.name() {
            "runtime" => self.runtime = Some(value),
            "object" => self.object = Some(value),
            "message" => self.message = Some(value),
            _ => {}
        }
    }

    /// The `runtime::object` label, if this is a script record
    pub fn script_label(&self) -> Option<String> {
        match (&self.runtime, &self.object) {
            (Some(runtime), Some(object)) => Some(format!("{}::{}", runtime, object)),
            _ => None,
        }
    }
}

impl Visit for FieldExtractor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std_fmt::Debug) {
        self.set(field, format!("{:?}", value).trim_matches('"').to_string());
    }
}

/// Custom event formatter for Zano applications
///
/// Line layout: `timestamp LEVEL #thread target: message fields`, where the
/// target of script records is replaced by `runtime::object`.
pub struct CustomFormatter<T> {
    timer: T,
    ansi: bool,
    /// Prefix to strip from log targets (e.g., "zano_client::")
    strip_prefix: Option<String>,
}

impl<T> CustomFormatter<T> {
    pub fn new(timer: T, ansi: bool) -> Self {
        Self {
            timer,
            ansi,
            strip_prefix: None,
        }
    }

    pub fn with_strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefix = Some(prefix.into());
        self
    }

    /// Target as shown in the log line, or `None` to hide it
    fn display_target<'t>(&self, target: &'t str) -> Option<&'t str> {
        let Some(prefix) = &self.strip_prefix else {
            return Some(target);
        };
        let app_name = prefix.trim_end_matches("::");
        if target == app_name {
            return None;
        }
        let shown = target.strip_prefix(prefix.as_str()).unwrap_or(target);
        (!shown.is_empty()).then_some(shown)
    }
}

impl<T: Clone> Clone for CustomFormatter<T> {
    fn clone(&self) -> Self {
        Self {
            timer: self.timer.clone(),
            ansi: self.ansi,
            strip_prefix: self.strip_prefix.clone(),
        }
    }
}

impl<S, N, T> FormatEvent<S, N> for CustomFormatter<T>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    T: fmt::time::FormatTime,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std_fmt::Result {
        let metadata = event.metadata();

        let (dim_start, dim_end) = if self.ansi {
            ("\x1b[2m", "\x1b[0m")
        } else {
            ("", "")
        };
        let (level_color, level_str) = match *metadata.level() {
            Level::ERROR => ("\x1b[31m", "ERROR"),
            Level::WARN => ("\x1b[33m", " WARN"),
            Level::INFO => ("\x1b[32m", " INFO"),
            Level::DEBUG => ("\x1b[34m", "DEBUG"),
            Level::TRACE => ("\x1b[35m", "TRACE"),
        };
        let (level_color, color_end) = if self.ansi {
            (level_color, "\x1b[0m")
        } else {
            ("", "")
        };

        write!(writer, "{}", dim_start)?;
        self.timer.format_time(&mut writer)?;
        write!(writer, "{} ", dim_end)?;

        write!(writer, "{}{}{} ", level_color, level_str, color_end)?;

        let thread_id = format!("{:?}", std::thread::current().id());
        if let Some(num) = thread_id
            .strip_prefix("ThreadId(")
            .and_then(|s| s.strip_suffix(")"))
            .and_then(|s| s.parse::<u64>().ok())
        {
            write!(writer, "#{:03} ", num)?;
        }

        let mut extractor = FieldExtractor::default();
        event.record(&mut extractor);

        if let Some(label) = extractor.script_label() {
            write!(writer, "{}{}{}: ", dim_start, label, dim_end)?;
            if let Some(msg) = &extractor.message {
                write!(writer, "{}", msg)?;
            }
        } else {
            if let Some(target) = self.display_target(metadata.target()) {
                write!(writer, "{}{}{}: ", dim_start, target, dim_end)?;
            }
            ctx.field_format().format_fields(writer.by_ref(), event)?;
        }

        writeln!(writer)
    }
}

/// Create a timer with local UTC offset
///
/// Uses format: `[year]/[month]/[day] [hour]:[minute]:[second].[subsecond digits:4]`.
/// Falls back to UTC if the local offset cannot be determined.
pub fn create_custom_timer()
-> OffsetTime<&'static [time::format_description::BorrowedFormatItem<'static>]> {
    use time::macros::format_description;

    let format =
        format_description!("[year]/[month]/[day] [hour]:[minute]:[second].[subsecond digits:4]");
    let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    OffsetTime::new(offset, format)
}

/// Check if dependency logging is enabled via `ZANO_LOGDEPS`
pub fn is_dependency_logging_enabled() -> bool {
    std::env::var("ZANO_LOGDEPS")
        .map(|v| v == "1")
        .unwrap_or(false)
}

/// Build the filter directives for the given level
///
/// Without `log_deps`, everything except Zano crates is turned off.
pub fn build_filter_directives(level: Level, log_deps: bool) -> String {
    let level_str = level.as_str().to_lowercase();

    if log_deps {
        return level_str;
    }

    let mut directives = String::from("off");
    for target in ZANO_TARGETS {
        directives.push_str(&format!(",{}={}", target, level_str));
    }
    directives
}

/// Detect if ANSI colors should be used based on environment
///
/// Disables ANSI colors if:
/// - stdout is not a TTY (piped/redirected)
/// - NO_COLOR env var is set (https://no-color.org/)
/// - TERM=dumb
pub fn should_use_ansi() -> bool {
    atty::is(atty::Stream::Stdout)
        && std::env::var("NO_COLOR").is_err()
        && std::env::var("TERM").map(|t| t != "dumb").unwrap_or(true)
}

/// Logging configuration
pub struct LogConfig<W: Write + Send + 'static = std::fs::File> {
    /// Prefix to strip from log targets (e.g., "zano_client::")
    pub strip_prefix: String,
    /// Whether to use ANSI color codes (auto-detected if None)
    pub use_ansi: Option<bool>,
    /// Minimum log level
    pub level: Level,
    /// Optional file to write logs to, in addition to stdout
    pub log_file: Option<W>,
}

impl<W: Write + Send + 'static> LogConfig<W> {
    pub fn new(strip_prefix: impl Into<String>) -> Self {
        Self {
            strip_prefix: strip_prefix.into(),
            use_ansi: None,
            level: Level::INFO,
            log_file: None,
        }
    }

    /// Set whether to use ANSI colors (default: auto-detect)
    pub fn with_ansi(mut self, use_ansi: bool) -> Self {
        self.use_ansi = Some(use_ansi);
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_log_file(mut self, file: W) -> Self {
        self.log_file = Some(file);
        self
    }
}

/// Initialize the global subscriber
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_logging<W: Write + Send + 'static>(
    config: LogConfig<W>,
) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::EnvFilter;

    let timer = create_custom_timer();
    let use_ansi = config.use_ansi.unwrap_or_else(should_use_ansi);
    let filter_directives = build_filter_directives(config.level, is_dependency_logging_enabled());

    // RUST_LOG wins over our defaults
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&filter_directives));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(
            CustomFormatter::new(timer.clone(), use_ansi).with_strip_prefix(&config.strip_prefix),
        )
        .with_ansi(use_ansi)
        .with_writer(io::stdout);

    let file_layer = config.log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .event_format(CustomFormatter::new(timer, false).with_strip_prefix(&config.strip_prefix))
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

/// Initialize logging to stdout only
pub fn init_logging_simple(
    strip_prefix: impl Into<String>,
    level: Level,
) -> Result<(), Box<dyn std::error::Error>> {
    let config: LogConfig<std::fs::File> = LogConfig::new(strip_prefix).with_level(level);
    init_logging(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::{error, info};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(prefix: &str, f: impl FnOnce()) -> String {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .event_format(CustomFormatter::new((), false).with_strip_prefix(prefix))
            .with_writer(move || writer.clone());
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_script_records_use_runtime_and_object() {
        let out = capture("zano_log::", || {
            info!(runtime = "lua", object = "hero", "hello\tworld");
        });
        assert!(out.contains("INFO"), "{out}");
        assert!(out.contains("lua::hero: hello\tworld"), "{out}");
    }

    #[test]
    fn test_debug_formatted_fields_are_unquoted() {
        let name = String::from("villain");
        let out = capture("zano_log::", || {
            error!(runtime = "lua", object = ?name, "boom");
        });
        assert!(out.contains("ERROR"), "{out}");
        assert!(out.contains("lua::villain: boom"), "{out}");
    }

    #[test]
    fn test_plain_records_show_stripped_target() {
        let out = capture("zano_log::", || {
            info!(target: "zano_log::frames", count = 3, "stepped");
        });
        assert!(out.contains("frames: stepped"), "{out}");
        assert!(out.contains("count=3"), "{out}");
        assert!(!out.contains("zano_log::frames"), "{out}");
    }

    #[test]
    fn test_bare_app_target_is_hidden() {
        let formatter = CustomFormatter::new((), false).with_strip_prefix("zano_client::");
        assert_eq!(formatter.display_target("zano_client"), None);
        assert_eq!(formatter.display_target("zano_client::config"), Some("config"));
        assert_eq!(formatter.display_target("mlua::vm"), Some("mlua::vm"));
    }

    #[test]
    fn test_filter_directives() {
        assert_eq!(build_filter_directives(Level::DEBUG, true), "debug");
        let directives = build_filter_directives(Level::WARN, false);
        assert!(directives.starts_with("off,"));
        assert!(directives.contains("zano_runtime=warn"));
        assert!(directives.contains("zano_client=warn"));
    }

    #[test]
    fn test_field_extractor_needs_both_fields() {
        let mut extractor = FieldExtractor {
            runtime: Some("lua".into()),
            ..Default::default()
        };
        assert_eq!(extractor.script_label(), None);
        extractor.object = Some("hero".into());
        assert_eq!(extractor.script_label().as_deref(), Some("lua::hero"));
    }

    #[test]
    fn test_log_config_builder() {
        let config: LogConfig = LogConfig::new("zano_client::")
            .with_level(Level::TRACE)
            .with_ansi(false);
        assert_eq!(config.level, Level::TRACE);
        assert_eq!(config.use_ansi, Some(false));
        assert!(config.log_file.is_none());
    }
}
