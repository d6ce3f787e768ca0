//! Per-tick frame computation shared by single animations and groups.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use owo_colors::Style;

use crate::animation::{Animation, BarMode, Direction, Mode, PulseMode, ShimmerMode, SpinnerMode, speed_or_default};
use crate::color::{Color, Lut, interpolate, paint};
use crate::compose::{align_bar, clip_to_width};
use crate::field::Field;
use crate::live::LiveState;
use crate::snapshot::Snapshot;
use crate::style::Level;
use crate::widgets::{BarAlign, BarStyle, PercentDisplay, bar_cells, percent};

/// Per-slot render state: the mode plus caches that survive across ticks.
pub(crate) struct FrameRenderer {
    mode: Mode,
    level: Level,
    elapsed_key: Option<String>,
    percent_key: Option<String>,
    cache: Cache,
}

#[derive(Default)]
struct Cache {
    // Formatted fields, keyed by the identity of the published field list.
    fields: Option<(Arc<Vec<Field>>, String)>,
    // Pulse style for the last resolved color.
    pulse: Option<(Color, Style)>,
}

impl FrameRenderer {
    pub(crate) fn new(animation: &Animation) -> Self {
        Self {
            mode: animation.mode.clone(),
            level: animation.level,
            elapsed_key: animation.elapsed_key.clone(),
            percent_key: animation.percent_key.clone(),
            cache: Cache::default(),
        }
    }

    /// The animated line for `elapsed` time since the run started.
    pub(crate) fn frame(&mut self, snap: &Snapshot, live: &LiveState, elapsed: Duration) -> String {
        let fields = self.fields(snap, live, elapsed);
        let Self { mode, cache, .. } = self;
        let line = match mode {
            Mode::Spinner(spinner) => spinner_frame(spinner, snap, live, &fields, elapsed),
            Mode::Pulse(pulse) => pulse_frame(pulse, cache, snap, live, &fields, elapsed),
            Mode::Shimmer(shimmer) => shimmer_frame(shimmer, snap, live, &fields, elapsed),
            Mode::Bar(bar) => bar_frame(bar, snap, live, &snap.label, &snap.icon, &fields),
        };
        fit(snap, line)
    }

    /// A frozen line for a finished slot, using the level's own icon.
    pub(crate) fn done_line(
        &mut self, snap: &Snapshot, live: &LiveState, elapsed: Duration, failed: bool,
    ) -> String {
        let level = if failed { Level::Error } else { self.level };
        let label = snap.label_for(level);
        let icon = snap.default_icon(level);
        let fields = self.fields(snap, live, elapsed);
        let line = match &self.mode {
            Mode::Bar(bar) => bar_frame(bar, snap, live, &label, &icon, &fields),
            _ => {
                let message = paint(snap.message_style, &live.message, snap.color);
                snap.line(&label, &icon, &message, &fields)
            }
        };
        fit(snap, line)
    }

    /// The single line printed when output is not a terminal.
    pub(crate) fn static_line(&mut self, snap: &Snapshot, live: &LiveState) -> String {
        let fields = snap.format_fields(&live.fields);
        let message = paint(snap.message_style, &live.message, snap.color);
        snap.line(&snap.label, &snap.icon, &message, &fields)
    }

    fn fields(&mut self, snap: &Snapshot, live: &LiveState, elapsed: Duration) -> String {
        let mut text = match &self.cache.fields {
            Some((fields, text)) if Arc::ptr_eq(fields, &live.fields) => text.clone(),
            _ => {
                let text = snap.format_fields(&live.fields);
                self.cache.fields = Some((live.fields.clone(), text.clone()));
                text
            }
        };

        let mut dynamic = Vec::new();
        if let Some(key) = &self.elapsed_key {
            dynamic.push(Field::new(key.as_str(), format_elapsed(elapsed)));
        }
        if let (Some(key), Mode::Bar(_)) = (&self.percent_key, &self.mode) {
            let (current, total) = live.progress();
            dynamic.push(Field::new(key.as_str(), format!("{}%", percent(to_i64(current), to_i64(total)))));
        }
        if !dynamic.is_empty() {
            text.push_str(&snap.format_fields(&dynamic));
        }
        text
    }
}

/// Redrawn lines must stay on one row or cursor movement loses track of them.
fn fit(snap: &Snapshot, line: String) -> String {
    match snap.term_width() {
        Some(cols) if cols > 0 => clip_to_width(&line, usize::from(cols)),
        _ => line,
    }
}

fn spinner_frame(
    mode: &SpinnerMode, snap: &Snapshot, live: &LiveState, fields: &str, elapsed: Duration,
) -> String {
    let glyph = mode.spinner.frame_at(elapsed, mode.reverse);
    let icon = paint(snap.spinner_style, glyph, snap.color);
    let message = paint(snap.message_style, &live.message, snap.color);
    snap.line(&snap.label, &icon, &message, fields)
}

/// Oscillates in `[0, 1]`, starting at 0.
pub(crate) fn pulse_phase(elapsed: Duration, speed: f64) -> f64 {
    (1.0 + (TAU * elapsed.as_secs_f64() * speed - FRAC_PI_2).sin()) / 2.0
}

fn pulse_frame(
    mode: &PulseMode, cache: &mut Cache, snap: &Snapshot, live: &LiveState, fields: &str,
    elapsed: Duration,
) -> String {
    let message = if snap.color {
        let t = pulse_phase(elapsed, speed_or_default(mode.speed));
        let color = interpolate(t, &snap.pulse);
        let style = match cache.pulse {
            Some((cached, style)) if cached == color => style,
            _ => {
                let style = color.style(snap.message_style);
                cache.pulse = Some((color, style));
                style
            }
        };
        paint_runs(&live.message, style)
    } else {
        live.message.to_string()
    };
    snap.line(&snap.label, &snap.icon, &message, fields)
}

/// Styles each non-whitespace run of `text`; whitespace stays bare.
pub(crate) fn paint_runs(text: &str, style: Style) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut run = String::new();
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !run.is_empty() {
                let _ = write!(out, "{}", style.style(run.as_str()));
                run.clear();
            }
            out.push(ch);
        } else {
            run.push(ch);
        }
    }
    if !run.is_empty() {
        let _ = write!(out, "{}", style.style(run.as_str()));
    }
    out
}

/// Position in the gradient for a character at `pos` (both in `[0, 1]`).
pub(crate) fn shimmer_position(pos: f64, phase: f64, direction: Direction) -> f64 {
    let fold = |p: f64| (p - 0.5).abs() * 2.0;
    let x = match direction {
        Direction::Right => pos - phase,
        Direction::Left => pos + phase,
        Direction::MiddleIn => fold(pos) + phase,
        Direction::MiddleOut => fold(pos) - phase,
    };
    x.rem_euclid(1.0)
}

fn shimmer_frame(
    mode: &ShimmerMode, snap: &Snapshot, live: &LiveState, fields: &str, elapsed: Duration,
) -> String {
    let message = match (&snap.shimmer, snap.color) {
        (Some(lut), true) => {
            let phase = (elapsed.as_secs_f64() * speed_or_default(mode.speed)).rem_euclid(1.0);
            shimmer_text(&live.message, lut, phase, mode.direction)
        }
        _ => live.message.to_string(),
    };
    snap.line(&snap.label, &snap.icon, &message, fields)
}

pub(crate) fn shimmer_text(text: &str, lut: &Lut, phase: f64, direction: Direction) -> String {
    let count = text.chars().count();
    let span = count.saturating_sub(1).max(1) as f64;
    let mut out = String::with_capacity(text.len() * 20);
    for (i, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            out.push(ch);
            continue;
        }
        let style = lut.style_at(shimmer_position(i as f64 / span, phase, direction));
        let _ = write!(out, "{}", style.style(ch));
    }
    out
}

fn bar_frame(
    mode: &BarMode, snap: &Snapshot, live: &LiveState, label: &str, icon: &str, fields: &str,
) -> String {
    let style = &mode.style;
    let width = snap.term_width();
    let (current, total) = live.progress();
    let bar = paint_bar(to_i64(current), to_i64(total), style, snap.bar.as_ref(), snap.color, width);
    let bar = match style.percent {
        PercentDisplay::Hidden => bar,
        PercentDisplay::Before => format!("{:>3}% {bar}", percent(to_i64(current), to_i64(total))),
        PercentDisplay::After => format!("{bar} {:>3}%", percent(to_i64(current), to_i64(total))),
    };

    let message = paint(snap.message_style, &live.message, snap.color);
    match style.align {
        BarAlign::Inline => {
            let message = align_bar(&message, &bar, &style.separator, BarAlign::Inline, width);
            snap.line(label, icon, &message, fields)
        }
        align => {
            let line = snap.line(label, icon, &message, fields);
            align_bar(&line, &bar, &style.separator, align, width)
        }
    }
}

/// Styled bar: filled cells take the gradient (or the filled style), empty
/// cells the empty style.
fn paint_bar(
    current: i64, total: i64, style: &BarStyle, gradient: Option<&Lut>, color: bool,
    width: Option<u16>,
) -> String {
    let inner = style.inner_width(width);
    let cells = bar_cells(current, total, style, inner);
    let mut out = paint(style.cap_style, &style.left_cap, color);
    let span = inner.saturating_sub(1).max(1) as f64;
    for (i, cell) in cells.iter().enumerate() {
        if !color {
            out.push(cell.glyph);
            continue;
        }
        let cell_style = match (cell.filled, gradient) {
            (true, Some(lut)) => lut.style_at(i as f64 / span),
            (true, None) => style.filled_style,
            (false, _) => style.empty_style,
        };
        let _ = write!(out, "{}", cell_style.style(cell.glyph));
    }
    out.push_str(&paint(style.cap_style, &style.right_cap, color));
    out
}

/// `4.2s`, `1m05s`, `2h03m`.
pub(crate) fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
