use std::time::Duration;

use crate::cancel::CancelToken;
use crate::color::ColorStop;
use crate::error::{BoxError, Result};
use crate::field::Field;
use crate::live::Update;
use crate::logger::Logger;
use crate::style::Level;
use crate::widgets::{BarStyle, Spinner};

/// Redraw interval for the color animations (~30 fps).
pub const COLOR_TICK: Duration = Duration::from_millis(33);
/// Redraw interval for bars.
pub const BAR_TICK: Duration = Duration::from_millis(100);
/// Gradient cycles per second when no valid speed is given.
pub const DEFAULT_SPEED: f64 = 0.5;

/// Which way shimmer waves travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Right,
    Left,
    /// From both ends towards the center.
    MiddleIn,
    /// From the center towards both ends.
    MiddleOut,
}

#[derive(Debug, Clone, Default)]
pub struct SpinnerMode {
    pub spinner: Spinner,
    pub reverse: bool,
}

#[derive(Debug, Clone)]
pub struct PulseMode {
    /// Empty means the registry default.
    pub stops: Vec<ColorStop>,
    pub speed: f64,
}

#[derive(Debug, Clone)]
pub struct ShimmerMode {
    /// Empty means the registry default.
    pub stops: Vec<ColorStop>,
    pub speed: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct BarMode {
    pub style: BarStyle,
    pub current: i64,
    pub total: i64,
    /// Paints the filled cells. Falls back to the registry bar gradient.
    pub gradient: Option<Vec<ColorStop>>,
}

/// The closed set of animation kinds.
#[derive(Debug, Clone)]
pub enum Mode {
    Spinner(SpinnerMode),
    Pulse(PulseMode),
    Shimmer(ShimmerMode),
    Bar(BarMode),
}

impl Mode {
    /// Interval between redraws for this mode.
    pub fn tick_rate(&self) -> Duration {
        match self {
            Mode::Spinner(s) => s.spinner.frame_interval(),
            Mode::Pulse(_) | Mode::Shimmer(_) => COLOR_TICK,
            Mode::Bar(_) => BAR_TICK,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Spinner(_) => "spinner",
            Mode::Pulse(_) => "pulse",
            Mode::Shimmer(_) => "shimmer",
            Mode::Bar(_) => "bar",
        }
    }
}

pub(crate) fn speed_or_default(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        DEFAULT_SPEED
    }
}

/// Describes one animated line: what it shows and how it moves.
///
/// Setters that do not apply to the chosen mode are ignored.
///
/// ```rust,ignore
/// let logger = Logger::default();
/// let body = Animation::spinner("Fetching")
///     .field("url", url)
///     .elapsed("took")
///     .delay(Duration::from_millis(200))
///     .run(&logger, |_| fetch(url))?;
/// logger.log(Level::Info, "Fetched", &[Field::new("bytes", body.len())]);
/// ```
#[derive(Debug, Clone)]
pub struct Animation {
    pub(crate) mode: Mode,
    pub(crate) message: String,
    pub(crate) fields: Vec<Field>,
    pub(crate) level: Level,
    pub(crate) icon: Option<String>,
    pub(crate) delay: Option<Duration>,
    pub(crate) elapsed_key: Option<String>,
    pub(crate) percent_key: Option<String>,
    pub(crate) token: Option<CancelToken>,
}

impl Animation {
    pub fn new(mode: Mode, message: impl Into<String>) -> Self {
        Self {
            mode,
            message: message.into(),
            fields: Vec::new(),
            level: Level::Info,
            icon: None,
            delay: None,
            elapsed_key: None,
            percent_key: None,
            token: None,
        }
    }

    pub fn spinner(message: impl Into<String>) -> Self {
        Self::new(Mode::Spinner(SpinnerMode::default()), message)
    }

    pub fn pulse(message: impl Into<String>) -> Self {
        Self::new(
            Mode::Pulse(PulseMode {
                stops: Vec::new(),
                speed: DEFAULT_SPEED,
            }),
            message,
        )
    }

    pub fn shimmer(message: impl Into<String>) -> Self {
        Self::new(
            Mode::Shimmer(ShimmerMode {
                stops: Vec::new(),
                speed: DEFAULT_SPEED,
                direction: Direction::Right,
            }),
            message,
        )
    }

    pub fn bar(message: impl Into<String>, total: i64) -> Self {
        Self::new(
            Mode::Bar(BarMode {
                style: BarStyle::default(),
                current: 0,
                total,
                gradient: None,
            }),
            message,
        )
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Replaces the level icon while animating (spinners draw frames instead).
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Draws nothing until `delay` has passed; quick tasks never flicker.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = (!delay.is_zero()).then_some(delay);
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push(Field::new(key, value));
        self
    }

    pub fn fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Field>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Appends a live elapsed-time field under `key`.
    pub fn elapsed(mut self, key: impl Into<String>) -> Self {
        self.elapsed_key = Some(key.into());
        self
    }

    /// Appends a live percentage field under `key` (bars only).
    pub fn percent(mut self, key: impl Into<String>) -> Self {
        self.percent_key = Some(key.into());
        self
    }

    pub fn cancel_on(mut self, token: &CancelToken) -> Self {
        self.token = Some(token.clone());
        self
    }

    pub fn spinner_style(mut self, spinner: Spinner) -> Self {
        if let Mode::Spinner(mode) = &mut self.mode {
            mode.spinner = spinner;
        }
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        if let Mode::Spinner(mode) = &mut self.mode {
            mode.reverse = reverse;
        }
        self
    }

    /// Gradient stops for pulse, shimmer and bar fills.
    pub fn gradient(mut self, stops: impl Into<Vec<ColorStop>>) -> Self {
        let stops = stops.into();
        match &mut self.mode {
            Mode::Pulse(mode) => mode.stops = stops,
            Mode::Shimmer(mode) => mode.stops = stops,
            Mode::Bar(mode) => mode.gradient = Some(stops),
            Mode::Spinner(_) => {}
        }
        self
    }

    /// Gradient cycles per second. Non-positive values use the default.
    pub fn speed(mut self, speed: f64) -> Self {
        match &mut self.mode {
            Mode::Pulse(mode) => mode.speed = speed,
            Mode::Shimmer(mode) => mode.speed = speed,
            Mode::Spinner(_) | Mode::Bar(_) => {}
        }
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        if let Mode::Shimmer(mode) = &mut self.mode {
            mode.direction = direction;
        }
        self
    }

    pub fn bar_style(mut self, style: BarStyle) -> Self {
        if let Mode::Bar(mode) = &mut self.mode {
            mode.style = style;
        }
        self
    }

    /// Initial bar progress.
    pub fn progress(mut self, current: i64) -> Self {
        if let Mode::Bar(mode) = &mut self.mode {
            mode.current = current;
        }
        self
    }

    /// Interval between redraws.
    pub fn tick_rate(&self) -> Duration {
        self.mode.tick_rate()
    }

    /// Runs `task` in the background while the animation is drawn.
    ///
    /// Returns the task's value, its error as [`Error::Task`](crate::Error::Task),
    /// or [`Error::Cancelled`](crate::Error::Cancelled). The animated line is
    /// erased before returning; logging the outcome is up to the caller.
    pub fn run<T, E, F>(self, logger: &Logger, task: F) -> Result<T>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce(Update) -> std::result::Result<T, E> + Send + 'static,
    {
        crate::runner::run(self, logger, task)
    }

    pub(crate) fn initial_progress(&self) -> (i64, i64) {
        match &self.mode {
            Mode::Bar(bar) => (bar.current, bar.total),
            _ => (0, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_rate_follows_mode() {
        assert_eq!(Animation::spinner("x").tick_rate(), Spinner::DEFAULT_INTERVAL);
        assert_eq!(
            Animation::spinner("x").spinner_style(Spinner::line()).tick_rate(),
            Spinner::line().frame_interval()
        );
        assert_eq!(Animation::pulse("x").tick_rate(), COLOR_TICK);
        assert_eq!(Animation::bar("x", 3).tick_rate(), BAR_TICK);
    }

    #[test]
    fn mode_specific_setters_are_ignored_elsewhere() {
        let a = Animation::spinner("x").direction(Direction::Left).progress(4).speed(9.0);
        assert!(matches!(a.mode(), Mode::Spinner(_)));
        assert_eq!(a.initial_progress(), (0, 1));

        let b = Animation::bar("x", 10).progress(4);
        assert_eq!(b.initial_progress(), (4, 10));
    }

    #[test]
    fn invalid_speed_falls_back() {
        assert_eq!(speed_or_default(-1.0), DEFAULT_SPEED);
        assert_eq!(speed_or_default(f64::NAN), DEFAULT_SPEED);
        assert_eq!(speed_or_default(2.0), 2.0);
    }

    #[test]
    fn zero_delay_means_no_delay() {
        assert!(Animation::spinner("x").delay(Duration::ZERO).delay.is_none());
    }
}
