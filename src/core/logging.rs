//! Terminal Logging Module
//!
//! Sets up structured logging for the importer:
//! - JSON log file with daily rotation (tracing-appender)
//! - Pretty stderr output, so stdout stays clean for documents
//! - `log` macros from the parsing core bridged into `tracing`
//! - miette report hook matched to the terminal
//!
//! Also holds the small amount of terminal styling the CLI uses.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use console::{style, Color};
use supports_color::Stream;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

const LOG_FILE_NAME: &str = "dh-statblock.log";

static TERMINAL_CAPS: OnceLock<TerminalCapabilities> = OnceLock::new();

pub fn terminal_caps() -> &'static TerminalCapabilities {
    TERMINAL_CAPS.get_or_init(TerminalCapabilities::detect)
}

// ============================================================================
// Terminal Capability Detection
// ============================================================================

/// Terminal color support levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLevel {
    TrueColor,
    Ansi256,
    Ansi16,
    NoColor,
}

/// Detected capabilities of the stderr terminal
#[derive(Debug, Clone)]
pub struct TerminalCapabilities {
    pub color_level: ColorLevel,
    pub supports_unicode: bool,
    pub is_interactive: bool,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        use is_terminal::IsTerminal;

        let color_level = match supports_color::on(Stream::Stderr) {
            Some(support) if support.has_16m => ColorLevel::TrueColor,
            Some(support) if support.has_256 => ColorLevel::Ansi256,
            Some(support) if support.has_basic => ColorLevel::Ansi16,
            _ => ColorLevel::NoColor,
        };

        let is_interactive = io::stderr().is_terminal();

        // Unicode support heuristic
        let supports_unicode = std::env::var("TERM")
            .map(|t| !t.contains("dumb"))
            .unwrap_or(true)
            && std::env::var("LANG")
                .map(|l| l.contains("UTF-8") || l.contains("utf8"))
                .unwrap_or(true);

        Self {
            color_level,
            supports_unicode,
            is_interactive,
        }
    }

    pub fn should_colorize(&self) -> bool {
        self.is_interactive && self.color_level != ColorLevel::NoColor
    }
}

// ============================================================================
// Logging Initialization
// ============================================================================

/// Default filter directive when `RUST_LOG` is not set.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Initialize logging.
///
/// Installs a JSON file layer writing to `log_dir` and a pretty stderr layer,
/// redirects `log` records into `tracing` and configures miette. `RUST_LOG`
/// wins over the `debug` toggle.
///
/// The returned guard must live until shutdown so buffered lines are flushed.
pub fn init(debug: bool, log_dir: &Path) -> WorkerGuard {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter.clone());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(terminal_caps().should_colorize())
        .pretty()
        .with_filter(env_filter);

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer);

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    init_miette();

    log::debug!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_NAME)
    );

    guard
}

/// Initialize miette for error reporting
pub fn init_miette() {
    let caps = terminal_caps();

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(caps.color_level == ColorLevel::TrueColor)
                .unicode(caps.supports_unicode)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .color(caps.should_colorize())
                .build(),
        )
    }))
    .ok(); // Ignore if already set
}

// ============================================================================
// Styling
// ============================================================================

/// Colors for preview and summary output
#[derive(Debug, Clone)]
pub struct ColorPalette {
    pub heading: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            heading: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

impl ColorPalette {
    /// Color one preview line: misses in warning color, skipped chunks in
    /// error color, headers bold.
    pub fn preview_line(&self, line: &str) -> String {
        let trimmed = line.trim_start();
        if trimmed.starts_with("Skipped:") || trimmed.starts_with("Error:") {
            format!("{}", style(line).fg(self.error))
        } else if trimmed.ends_with("Not Found") || trimmed.ends_with("None detected") {
            format!("{}", style(line).fg(self.warning))
        } else if line.starts_with('#') || line.starts_with("Batch Mode:") {
            format!("{}", style(line).fg(self.heading).bold())
        } else {
            line.to_string()
        }
    }

    /// Color a whole preview when the terminal supports it.
    pub fn preview(&self, text: &str, colorize: bool) -> String {
        if !colorize {
            return text.to_string();
        }
        text.lines()
            .map(|l| self.preview_line(l))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn success(&self, text: &str) -> String {
        format!("{}", style(text).fg(self.success).bold())
    }

    pub fn warning(&self, text: &str) -> String {
        format!("{}", style(text).fg(self.warning).bold())
    }
}

// ============================================================================
// Tests
// ============================================================================
