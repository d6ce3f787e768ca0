//! A minimal logging facade: shared configuration behind one lock, an output
//! handle, and the final static line written after an animation ends.

use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::compose::{Part, PartFlags};
use crate::field::{Field, FieldOptions};
use crate::snapshot::Snapshot;
use crate::style::{Level, Styles};

/// When styled output is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color on interactive output unless `NO_COLOR` is set.
    #[default]
    Auto,
    Always,
    Never,
}

/// Clock used for the timestamp part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZone {
    #[default]
    Local,
    Utc,
}

/// Shared, mutable rendering configuration.
///
/// ```rust,ignore
/// let config = Config::default()
///     .timestamp(true)
///     .color(ColorMode::Never)
///     .interactive(true);
/// let logger = Logger::with_output(config, std::io::stdout());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Entries below this level are dropped by [`Logger::log`].
    pub level: Level,
    pub parts: Vec<Part>,
    pub flags: PartFlags,
    /// A chrono `strftime` pattern.
    pub time_format: String,
    pub time_zone: TimeZone,
    pub color: ColorMode,
    /// Overrides terminal detection on the output.
    pub interactive: Option<bool>,
    /// Overrides the queried terminal width.
    pub width: Option<u16>,
    pub fields: FieldOptions,
    pub styles: Styles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: Level::Info,
            parts: Part::DEFAULT_ORDER.to_vec(),
            flags: PartFlags::default(),
            time_format: "%H:%M:%S".to_string(),
            time_zone: TimeZone::Local,
            color: ColorMode::Auto,
            interactive: None,
            width: None,
            fields: FieldOptions::default(),
            styles: Styles::default(),
        }
    }
}

impl Config {
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn parts(mut self, parts: impl Into<Vec<Part>>) -> Self {
        self.parts = parts.into();
        self
    }

    pub fn timestamp(mut self, enabled: bool) -> Self {
        self.flags.timestamp = enabled;
        self
    }

    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    pub fn time_zone(mut self, zone: TimeZone) -> Self {
        self.time_zone = zone;
        self
    }

    pub fn color(mut self, mode: ColorMode) -> Self {
        self.color = mode;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = Some(interactive);
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn fields(mut self, fields: FieldOptions) -> Self {
        self.fields = fields;
        self
    }

    pub fn styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }
}

/// Shared handle to the byte sink lines and frames are written to.
///
/// Writes are best effort: failures are dropped so a broken pipe never
/// aborts the work being tracked.
#[derive(Clone)]
pub struct Output {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
    terminal: bool,
}

impl Output {
    pub fn stderr() -> Self {
        let terminal = std::io::stderr().is_terminal();
        Self {
            sink: Arc::new(Mutex::new(Box::new(std::io::stderr()))),
            terminal,
        }
    }

    /// Wraps an arbitrary writer. It is assumed not to be a terminal.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
            terminal: false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub(crate) fn write_all(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = sink.write_all(bytes);
        let _ = sink.flush();
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("terminal", &self.terminal)
            .finish_non_exhaustive()
    }
}

/// Cloneable logging facade shared by animations and groups.
#[derive(Debug, Clone)]
pub struct Logger {
    config: Arc<Mutex<Config>>,
    output: Output,
}

impl Default for Logger {
    fn default() -> Self {
        Self::stderr(Config::default())
    }
}

impl Logger {
    pub fn stderr(config: Config) -> Self {
        Self::new(config, Output::stderr())
    }

    pub fn with_output(config: Config, writer: impl Write + Send + 'static) -> Self {
        Self::new(config, Output::new(writer))
    }

    pub fn new(config: Config, output: Output) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            output,
        }
    }

    /// Mutates the shared configuration. Running animations keep the
    /// snapshot they started with.
    pub fn configure(&self, f: impl FnOnce(&mut Config)) {
        f(&mut self.lock());
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Writes one static entry followed by a newline.
    pub fn log(&self, level: Level, message: &str, fields: &[Field]) {
        let snapshot = Snapshot::capture_level(self, level, None);
        if level < snapshot.min_level {
            return;
        }
        let mut line = snapshot.static_line(level, message, fields);
        line.push('\n');
        self.output.write_all(line.as_bytes());
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Config> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
