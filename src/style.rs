use owo_colors::Style;

use crate::color::{Color, ColorStop};

/// Severity of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Label, icon and message styling for one level.
#[derive(Debug, Clone)]
pub struct LevelStyle {
    pub label: String,
    pub label_style: Style,
    pub icon: String,
    pub icon_style: Style,
    pub message_style: Style,
}

impl LevelStyle {
    fn new(label: &str, icon: &str, accent: Style) -> Self {
        Self {
            label: label.to_string(),
            label_style: accent.bold(),
            icon: icon.to_string(),
            icon_style: accent,
            message_style: Style::new(),
        }
    }
}

/// Read-only style registry consulted when a snapshot is captured.
#[derive(Debug, Clone)]
pub struct Styles {
    levels: [LevelStyle; 5],
    /// Style of the spinner frame glyph.
    pub spinner: Style,
    /// Default stops for pulse animations.
    pub pulse: Vec<ColorStop>,
    /// Default stops for shimmer animations.
    pub shimmer: Vec<ColorStop>,
    /// Optional gradient painted across the filled part of bars.
    pub bar: Option<Vec<ColorStop>>,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            levels: [
                LevelStyle::new("TRC", "·", Style::new().bright_black()),
                LevelStyle::new("DBG", "•", Style::new().blue()),
                LevelStyle::new("INF", "✓", Style::new().green()),
                LevelStyle::new("WRN", "!", Style::new().yellow()),
                LevelStyle::new("ERR", "✗", Style::new().red()),
            ],
            spinner: Style::new().magenta(),
            pulse: vec![
                ColorStop::new(0.0, Color::rgb(0x5f, 0x5f, 0xaf)),
                ColorStop::new(1.0, Color::rgb(0xd7, 0xd7, 0xff)),
            ],
            shimmer: vec![
                ColorStop::new(0.0, Color::rgb(0x6c, 0x6c, 0x6c)),
                ColorStop::new(0.5, Color::rgb(0xff, 0xff, 0xff)),
                ColorStop::new(1.0, Color::rgb(0x6c, 0x6c, 0x6c)),
            ],
            bar: None,
        }
    }
}

impl Styles {
    pub fn level(&self, level: Level) -> &LevelStyle {
        &self.levels[level.index()]
    }

    pub fn level_mut(&mut self, level: Level) -> &mut LevelStyle {
        &mut self.levels[level.index()]
    }
}
