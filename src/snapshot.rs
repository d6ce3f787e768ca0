use std::fmt::Write as _;
use std::time::Duration;

use owo_colors::Style;

use crate::animation::{Animation, Mode};
use crate::color::{ColorStop, Lut, normalize, paint};
use crate::compose::{Part, PartFlags, RenderedParts, build_line};
use crate::field::{Field, FieldOptions, format_fields};
use crate::logger::{ColorMode, Logger, Output, TimeZone};
use crate::style::{Level, Styles};

/// Where the terminal width comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WidthSource {
    Fixed(u16),
    Terminal,
    Unknown,
}

impl WidthSource {
    pub(crate) fn get(self) -> Option<u16> {
        match self {
            WidthSource::Fixed(cols) => Some(cols),
            WidthSource::Terminal => crossterm::terminal::size()
                .ok()
                .map(|(cols, _)| cols)
                .filter(|cols| *cols > 0),
            WidthSource::Unknown => None,
        }
    }
}

/// Everything a render loop needs from the [`Logger`], copied once.
///
/// Capturing takes the logger lock exactly once. Derived values (styled
/// label, icon, tick rate, gradient tables) are computed after the lock is
/// released, and the render loop never goes back to the logger.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub(crate) min_level: Level,
    parts: Vec<Part>,
    flags: PartFlags,
    time_format: String,
    time_zone: TimeZone,
    pub(crate) color: bool,
    pub(crate) interactive: bool,
    pub(crate) output: Output,
    pub(crate) width: WidthSource,
    pub(crate) fields: FieldOptions,
    styles: Styles,

    pub(crate) level: Level,
    pub(crate) label: String,
    pub(crate) icon: String,
    pub(crate) message_style: Style,
    pub(crate) spinner_style: Style,

    pub(crate) tick: Duration,
    pub(crate) pulse: Vec<ColorStop>,
    pub(crate) shimmer: Option<Lut>,
    pub(crate) bar: Option<Lut>,
}

impl Snapshot {
    pub(crate) fn capture(logger: &Logger, animation: &Animation) -> Self {
        let mut snapshot = Self::capture_level(logger, animation.level, animation.icon.as_deref());
        snapshot.derive_mode(&animation.mode);
        snapshot
    }

    /// Captures the settings needed for a static line at `level`.
    pub(crate) fn capture_level(logger: &Logger, level: Level, icon: Option<&str>) -> Self {
        let config = logger.lock();
        let min_level = config.level;
        let parts = config.parts.clone();
        let flags = config.flags;
        let time_format = config.time_format.clone();
        let time_zone = config.time_zone;
        let color_mode = config.color;
        let interactive_override = config.interactive;
        let width_override = config.width;
        let fields = config.fields.clone();
        let styles = config.styles.clone();
        drop(config);

        let output = logger.output().clone();
        let interactive = interactive_override.unwrap_or_else(|| output.is_terminal());
        let color = interactive
            && match color_mode {
                ColorMode::Always => true,
                ColorMode::Never => false,
                ColorMode::Auto => std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty()),
            };
        let width = match (width_override, interactive) {
            (Some(cols), _) => WidthSource::Fixed(cols),
            (None, true) => WidthSource::Terminal,
            (None, false) => WidthSource::Unknown,
        };

        let level_style = styles.level(level);
        let label = paint(level_style.label_style, &level_style.label, color);
        let icon = paint(
            level_style.icon_style,
            icon.unwrap_or(level_style.icon.as_str()),
            color,
        );
        let message_style = level_style.message_style;
        let spinner_style = styles.spinner;

        Self {
            min_level,
            parts,
            flags,
            time_format,
            time_zone,
            color,
            interactive,
            output,
            width,
            fields,
            styles,
            level,
            label,
            icon,
            message_style,
            spinner_style,
            tick: Duration::from_millis(100),
            pulse: Vec::new(),
            shimmer: None,
            bar: None,
        }
    }

    fn derive_mode(&mut self, mode: &Mode) {
        self.tick = mode.tick_rate();
        match mode {
            Mode::Spinner(_) => {}
            Mode::Pulse(pulse) => {
                let stops = if pulse.stops.is_empty() {
                    &self.styles.pulse
                } else {
                    &pulse.stops
                };
                self.pulse = normalize(stops);
            }
            Mode::Shimmer(shimmer) => {
                let stops = if shimmer.stops.is_empty() {
                    &self.styles.shimmer
                } else {
                    &shimmer.stops
                };
                self.shimmer = Some(Lut::build(stops, Lut::RESOLUTION, self.message_style));
            }
            Mode::Bar(bar) => {
                let stops = bar.gradient.as_ref().or(self.styles.bar.as_ref());
                self.bar = stops
                    .filter(|stops| !stops.is_empty())
                    .map(|stops| Lut::build(stops, Lut::RESOLUTION, Style::new()));
            }
        }
    }

    pub(crate) fn term_width(&self) -> Option<u16> {
        self.width.get()
    }

    pub(crate) fn label_for(&self, level: Level) -> String {
        let style = self.styles.level(level);
        paint(style.label_style, &style.label, self.color)
    }

    /// The registry icon for `level`, ignoring any per-animation override.
    pub(crate) fn default_icon(&self, level: Level) -> String {
        let style = self.styles.level(level);
        paint(style.icon_style, &style.icon, self.color)
    }

    pub(crate) fn timestamp(&self) -> String {
        if !self.flags.timestamp {
            return String::new();
        }
        let mut out = String::new();
        let _ = match self.time_zone {
            TimeZone::Local => write!(out, "{}", chrono::Local::now().format(&self.time_format)),
            TimeZone::Utc => write!(out, "{}", chrono::Utc::now().format(&self.time_format)),
        };
        paint(Style::new().dimmed(), &out, self.color)
    }

    pub(crate) fn format_fields(&self, fields: &[Field]) -> String {
        format_fields(fields, &self.fields, self.color)
    }

    /// Joins already rendered parts in the configured order.
    pub(crate) fn line(&self, label: &str, icon: &str, message: &str, fields: &str) -> String {
        let timestamp = self.timestamp();
        let parts = RenderedParts {
            timestamp: &timestamp,
            level: label,
            icon,
            message,
            fields,
        };
        build_line(&self.parts, self.flags, &parts)
    }

    /// A complete, non-animated line for `level`.
    pub(crate) fn static_line(&self, level: Level, message: &str, fields: &[Field]) -> String {
        let label = self.label_for(level);
        let icon = if level == self.level {
            self.icon.clone()
        } else {
            self.default_icon(level)
        };
        let message = paint(self.styles.level(level).message_style, message, self.color);
        self.line(&label, &icon, &message, &self.format_fields(fields))
    }
}
