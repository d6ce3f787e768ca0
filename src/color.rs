//! Color stops, gradient interpolation and precomputed lookup tables.
//!
//! Pulse and shimmer resolve a color per tick (and, for shimmer, per
//! character). Interpolating a multi-stop gradient for every character of
//! every frame is wasted work, so each session builds a [`Lut`] once and
//! indexes into it afterwards.
//!
//! ```rust,ignore
//! let stops = [ColorStop::new(0.0, Color::rgb(40, 40, 40)), ColorStop::new(1.0, Color::WHITE)];
//! let mid = interpolate(0.5, &stops);          // => Color { r: 148, g: 148, b: 148 }
//! let lut = Lut::build(&stops, 64, Style::new());
//! let (color, style) = lut.sample(0.5);
//! ```

use owo_colors::Style;

/// A 24-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`. Returns `None` for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// A foreground style in this color, layered over `base`.
    pub fn style(self, base: Style) -> Style {
        base.truecolor(self.r, self.g, self.b)
    }

    fn lerp(self, to: Self, t: f64) -> Self {
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self::rgb(
            channel(self.r, to.r),
            channel(self.g, to.g),
            channel(self.b, to.b),
        )
    }
}

/// A color pinned at a position in `[0, 1]` along a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub position: f64,
    pub color: Color,
}

impl ColorStop {
    pub const fn new(position: f64, color: Color) -> Self {
        Self { position, color }
    }
}

/// Sorts stops ascending by position and clamps positions into `[0, 1]`.
///
/// NaN positions are dropped.
pub fn normalize(stops: &[ColorStop]) -> Vec<ColorStop> {
    let mut out: Vec<ColorStop> = stops
        .iter()
        .filter(|s| !s.position.is_nan())
        .map(|s| ColorStop::new(s.position.clamp(0.0, 1.0), s.color))
        .collect();
    out.sort_by(|a, b| a.position.total_cmp(&b.position));
    out
}

/// Samples `stops` at `position`.
///
/// `stops` must be sorted ascending (see [`normalize`]). The position is
/// clamped to `[0, 1]`; before the first stop the first color is returned,
/// after the last stop the last color. With no stops the result is white.
pub fn interpolate(position: f64, stops: &[ColorStop]) -> Color {
    let t = if position.is_nan() { 0.0 } else { position.clamp(0.0, 1.0) };

    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Color::WHITE;
    };
    if t <= first.position {
        return first.color;
    }
    if t >= last.position {
        return last.color;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t > hi.position {
            continue;
        }
        let span = hi.position - lo.position;
        if span <= f64::EPSILON {
            return hi.color;
        }
        return lo.color.lerp(hi.color, (t - lo.position) / span);
    }
    last.color
}

/// A fixed-resolution sampling of a gradient with a matching table of styles.
///
/// The resolution is decided at build time and never changes.
#[derive(Debug, Clone)]
pub struct Lut {
    colors: Vec<Color>,
    styles: Vec<Style>,
}

impl Lut {
    /// Default resolution used by shimmer and bar gradients.
    pub const RESOLUTION: usize = 256;

    /// Precomputes `resolution` evenly spaced samples of `stops`.
    ///
    /// `stops` may be unsorted. A resolution below 2 is raised to 2 so both
    /// ends of the gradient are represented.
    pub fn build(stops: &[ColorStop], resolution: usize, base: Style) -> Self {
        let stops = normalize(stops);
        let resolution = resolution.max(2);
        let last = (resolution - 1) as f64;

        let colors: Vec<Color> = (0..resolution)
            .map(|i| interpolate(i as f64 / last, &stops))
            .collect();
        let styles = colors.iter().map(|c| c.style(base)).collect();
        Self { colors, styles }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Table index for a position in `[0, 1]`.
    pub fn index(&self, position: f64) -> usize {
        let t = if position.is_nan() { 0.0 } else { position.clamp(0.0, 1.0) };
        (t * (self.len() - 1) as f64).round() as usize
    }

    /// Color and style at a position in `[0, 1]`.
    pub fn sample(&self, position: f64) -> (Color, Style) {
        let i = self.index(position);
        (self.colors[i], self.styles[i])
    }

    pub fn style_at(&self, position: f64) -> Style {
        self.styles[self.index(position)]
    }
}

/// Applies `style` to `text` when `enabled`, otherwise returns the text as is.
pub(crate) fn paint(style: Style, text: &str, enabled: bool) -> String {
    if enabled && !text.is_empty() {
        style.style(text).to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_stops() -> Vec<ColorStop> {
        vec![
            ColorStop::new(0.0, Color::rgb(0, 100, 200)),
            ColorStop::new(1.0, Color::rgb(200, 100, 0)),
        ]
    }

    #[test]
    fn empty_stops_fall_back_to_white() {
        assert_eq!(interpolate(0.3, &[]), Color::WHITE);
    }

    #[test]
    fn single_stop_is_constant() {
        let stops = [ColorStop::new(0.4, Color::rgb(1, 2, 3))];
        for t in [0.0, 0.4, 0.9, 1.0] {
            assert_eq!(interpolate(t, &stops), Color::rgb(1, 2, 3));
        }
    }

    #[test]
    fn midpoint_is_linear() {
        assert_eq!(interpolate(0.5, &two_stops()), Color::rgb(100, 100, 100));
    }

    #[test]
    fn outside_stop_range_clamps_to_edge_colors() {
        let stops = [
            ColorStop::new(0.25, Color::rgb(10, 10, 10)),
            ColorStop::new(0.75, Color::rgb(20, 20, 20)),
        ];
        assert_eq!(interpolate(0.0, &stops), Color::rgb(10, 10, 10));
        assert_eq!(interpolate(1.0, &stops), Color::rgb(20, 20, 20));
        assert_eq!(interpolate(-3.0, &stops), Color::rgb(10, 10, 10));
        assert_eq!(interpolate(f64::NAN, &stops), Color::rgb(10, 10, 10));
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("00ff00"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn normalize_sorts_and_clamps() {
        let stops = normalize(&[
            ColorStop::new(1.5, Color::WHITE),
            ColorStop::new(f64::NAN, Color::WHITE),
            ColorStop::new(-1.0, Color::rgb(0, 0, 0)),
        ]);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].position, 0.0);
        assert_eq!(stops[1].position, 1.0);
    }

    #[test]
    fn lut_endpoints_match_stops() {
        let lut = Lut::build(&two_stops(), 16, Style::new());
        assert_eq!(lut.len(), 16);
        assert_eq!(lut.sample(0.0).0, Color::rgb(0, 100, 200));
        assert_eq!(lut.sample(1.0).0, Color::rgb(200, 100, 0));
        assert_eq!(lut.index(2.0), 15);
    }

    #[test]
    fn lut_resolution_has_a_floor() {
        let lut = Lut::build(&two_stops(), 0, Style::new());
        assert_eq!(lut.len(), 2);
    }

    fn arb_stops() -> impl Strategy<Value = Vec<ColorStop>> {
        prop::collection::vec((0.0f64..=1.0, any::<(u8, u8, u8)>()), 1..6).prop_map(|raw| {
            let stops: Vec<ColorStop> = raw
                .into_iter()
                .map(|(p, (r, g, b))| ColorStop::new(p, Color::rgb(r, g, b)))
                .collect();
            normalize(&stops)
        })
    }

    proptest! {
        #[test]
        fn endpoints_are_first_and_last(stops in arb_stops()) {
            prop_assert_eq!(interpolate(0.0, &stops), stops[0].color);
            prop_assert_eq!(interpolate(1.0, &stops), stops[stops.len() - 1].color);
        }

        #[test]
        fn channels_are_monotonic_between_stops(
            a in any::<(u8, u8, u8)>(),
            b in any::<(u8, u8, u8)>(),
            t1 in 0.0f64..=1.0,
            t2 in 0.0f64..=1.0,
        ) {
            let stops = [
                ColorStop::new(0.0, Color::rgb(a.0, a.1, a.2)),
                ColorStop::new(1.0, Color::rgb(b.0, b.1, b.2)),
            ];
            let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            let (x, y) = (interpolate(lo, &stops), interpolate(hi, &stops));
            for (from, to, cx, cy) in [(a.0, b.0, x.r, y.r), (a.1, b.1, x.g, y.g), (a.2, b.2, x.b, y.b)] {
                if from <= to {
                    prop_assert!(cx <= cy);
                } else {
                    prop_assert!(cx >= cy);
                }
            }
        }
    }
}
