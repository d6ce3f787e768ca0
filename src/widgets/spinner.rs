use std::borrow::Cow;
use std::time::Duration;

const DOTS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A time-driven spinner animation.
///
/// Unlike a tick counter, the frame is derived from elapsed time, so a
/// spinner sharing a redraw loop with faster animations still turns at its
/// own pace.
///
/// ```rust,ignore
/// let spinner = Spinner::dots();
/// let glyph = spinner.frame_at(started.elapsed(), false);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Spinner {
    frames: Cow<'static, [&'static str]>,
    interval: Duration,
}

impl Spinner {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(80);

    /// Braille dot spinner (the default).
    pub fn dots() -> Self {
        Self::preset(DOTS, Self::DEFAULT_INTERVAL)
    }

    /// Classic line spinner.
    pub fn line() -> Self {
        Self::preset(&["|", "/", "-", "\\"], Duration::from_millis(130))
    }

    /// Arrow spinner.
    pub fn arrow() -> Self {
        Self::preset(&["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"], Duration::from_millis(100))
    }

    /// Quarter-circle spinner.
    pub fn circle() -> Self {
        Self::preset(&["◴", "◷", "◶", "◵"], Duration::from_millis(120))
    }

    /// A dot bouncing between two walls.
    pub fn bounce() -> Self {
        Self::preset(
            &["[    ]", "[=   ]", "[==  ]", "[=== ]", "[ ===]", "[  ==]", "[   =]"],
            Duration::from_millis(100),
        )
    }

    /// Custom frames. An empty frame list or a zero interval falls back to
    /// the dots defaults.
    pub fn custom(frames: Vec<&'static str>, interval: Duration) -> Self {
        let frames = if frames.is_empty() {
            Cow::Borrowed(DOTS)
        } else {
            Cow::Owned(frames)
        };
        Self {
            frames,
            interval: non_zero_or(interval, Self::DEFAULT_INTERVAL),
        }
    }

    fn preset(frames: &'static [&'static str], interval: Duration) -> Self {
        Self {
            frames: Cow::Borrowed(frames),
            interval,
        }
    }

    /// Replace the frame interval. Zero resets to the default.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = non_zero_or(interval, Self::DEFAULT_INTERVAL);
        self
    }

    pub fn frame_interval(&self) -> Duration {
        self.interval
    }

    pub fn frames(&self) -> &[&'static str] {
        &self.frames
    }

    /// Frame index for the given elapsed time, mirrored when `reverse`.
    pub fn index_at(&self, elapsed: Duration, reverse: bool) -> usize {
        let count = self.frames.len().max(1);
        let step = (elapsed.as_nanos() / self.interval.as_nanos().max(1)) as usize;
        let index = step % count;
        if reverse { count - 1 - index } else { index }
    }

    /// Frame glyph for the given elapsed time.
    pub fn frame_at(&self, elapsed: Duration, reverse: bool) -> &'static str {
        self.frames
            .get(self.index_at(elapsed, reverse))
            .copied()
            .unwrap_or("")
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::dots()
    }
}

fn non_zero_or(d: Duration, fallback: Duration) -> Duration {
    if d.is_zero() { fallback } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_advance_with_time() {
        let s = Spinner::dots();
        assert_eq!(s.frame_at(Duration::ZERO, false), "⠋");
        assert_eq!(s.frame_at(Duration::from_millis(80), false), "⠙");
        assert_eq!(s.frame_at(Duration::from_millis(159), false), "⠙");
        // wraps after ten frames
        assert_eq!(s.frame_at(Duration::from_millis(800), false), "⠋");
    }

    #[test]
    fn reverse_mirrors_the_index() {
        let s = Spinner::line();
        assert_eq!(s.index_at(Duration::ZERO, true), 3);
        assert_eq!(s.frame_at(Duration::ZERO, true), "\\");
        assert_eq!(s.frame_at(Duration::from_millis(130), true), "-");
    }

    #[test]
    fn invalid_custom_parameters_use_defaults() {
        let s = Spinner::custom(vec![], Duration::ZERO);
        assert_eq!(s.frames(), DOTS);
        assert_eq!(s.frame_interval(), Spinner::DEFAULT_INTERVAL);
        assert_eq!(Spinner::line().interval(Duration::ZERO).frame_interval(), Spinner::DEFAULT_INTERVAL);
    }
}
