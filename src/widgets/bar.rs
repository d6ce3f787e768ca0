use owo_colors::Style;

/// Where the bar sits relative to the rest of the line.
///
/// See [`align_bar`](crate::compose::align_bar) for the exact layout of each policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarAlign {
    /// Bar follows the message, before the fields.
    Inline,
    /// Bar, separator, then the rest of the line.
    Left,
    /// Rest of the line, separator, then the bar.
    Right,
    /// Bar at the left edge, rest of the line pushed to the right edge.
    LeftPad,
    /// Rest of the line at the left edge, bar pushed to the right edge.
    #[default]
    RightPad,
}

/// Whether a percentage is printed next to the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PercentDisplay {
    Hidden,
    Before,
    #[default]
    After,
}

/// Glyphs, sizing and layout of a progress bar.
///
/// ```rust,ignore
/// let bar = render_bar(45, 100, &BarStyle::block().width(20), None);
/// // => █████████▏          (with the block gradient glyphs)
/// ```
#[derive(Debug, Clone)]
pub struct BarStyle {
    pub filled: char,
    pub empty: char,
    /// Partial-fill glyphs from least to most filled. Takes precedence over
    /// `half` and `head`.
    pub sub_cells: Vec<char>,
    /// Leading boundary glyph, drawn when the fill ends half way into a cell.
    pub half: Option<char>,
    /// Trailing boundary glyph, drawn on the first empty cell.
    pub head: Option<char>,
    pub left_cap: String,
    pub right_cap: String,
    /// Fixed inner width. When `None` the width follows the terminal.
    pub width: Option<usize>,
    pub min_width: usize,
    pub max_width: usize,
    pub align: BarAlign,
    pub percent: PercentDisplay,
    /// Printed between the bar and the rest of the line.
    pub separator: String,
    pub filled_style: Style,
    pub empty_style: Style,
    pub cap_style: Style,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self::thin()
    }
}

impl BarStyle {
    pub const MIN_WIDTH: usize = 10;
    pub const MAX_WIDTH: usize = 40;

    fn base(filled: char, empty: char) -> Self {
        Self {
            filled,
            empty,
            sub_cells: Vec::new(),
            half: None,
            head: None,
            left_cap: String::new(),
            right_cap: String::new(),
            width: None,
            min_width: Self::MIN_WIDTH,
            max_width: Self::MAX_WIDTH,
            align: BarAlign::default(),
            percent: PercentDisplay::default(),
            separator: " ".to_string(),
            filled_style: Style::new().magenta(),
            empty_style: Style::new().bright_black(),
            cap_style: Style::new().dimmed(),
        }
    }

    /// Heavy line with half-cell boundaries: `━━━━━╸━━━━`.
    pub fn thin() -> Self {
        Self {
            half: Some('╸'),
            head: Some('╺'),
            ..Self::base('━', '━')
        }
    }

    /// Solid blocks with eighth-cell resolution: `█████▌    `.
    pub fn block() -> Self {
        Self {
            sub_cells: vec!['▏', '▎', '▍', '▌', '▋', '▊', '▉'],
            ..Self::base('█', ' ')
        }
    }

    /// Shaded blocks: `█████░░░░░`.
    pub fn smooth() -> Self {
        Self {
            sub_cells: vec!['▒', '▓'],
            ..Self::base('█', '░')
        }
    }

    /// Plain ASCII with a head: `[=====>    ]`.
    pub fn ascii() -> Self {
        Self {
            head: Some('>'),
            left_cap: "[".to_string(),
            right_cap: "]".to_string(),
            ..Self::base('=', ' ')
        }
    }

    /// Filled and hollow dots: `●●●●●○○○○○`.
    pub fn dots() -> Self {
        Self::base('●', '○')
    }

    /// Every built-in style, for callers that cycle through them.
    pub fn presets() -> Vec<(&'static str, Self)> {
        vec![
            ("thin", Self::thin()),
            ("block", Self::block()),
            ("smooth", Self::smooth()),
            ("ascii", Self::ascii()),
            ("dots", Self::dots()),
        ]
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn auto_width(mut self, min: usize, max: usize) -> Self {
        self.width = None;
        self.min_width = min;
        self.max_width = max.max(min);
        self
    }

    pub fn align(mut self, align: BarAlign) -> Self {
        self.align = align;
        self
    }

    pub fn percent(mut self, percent: PercentDisplay) -> Self {
        self.percent = percent;
        self
    }

    pub fn caps(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_cap = left.into();
        self.right_cap = right.into();
        self
    }

    /// Inner width (without caps) for a terminal of `term_width` columns.
    pub fn inner_width(&self, term_width: Option<u16>) -> usize {
        if let Some(width) = self.width {
            return width;
        }
        let max = self.max_width.max(self.min_width);
        match term_width {
            Some(cols) if cols > 0 => (cols as usize / 4).clamp(self.min_width, max),
            _ => self.min_width,
        }
    }

    /// Distinguishable fill states per cell.
    pub fn resolution(&self) -> u64 {
        if !self.sub_cells.is_empty() {
            self.sub_cells.len() as u64 + 1
        } else if self.half.is_some() {
            2
        } else {
            1
        }
    }
}

/// One rendered cell of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    /// Whether the cell belongs to the filled section (drives styling).
    pub filled: bool,
}

/// Lays out `inner` cells for `current / total`.
///
/// `total <= 0` is treated as 1 and `current` is clamped to `[0, total]`.
pub fn bar_cells(current: i64, total: i64, style: &BarStyle, inner: usize) -> Vec<Cell> {
    let total = total.max(1) as u128;
    let current = (current.max(0) as u128).min(total);
    let resolution = style.resolution() as u128;

    let sub_units = inner as u128 * resolution * current / total;
    let filled = (sub_units / resolution) as usize;
    let remainder = (sub_units % resolution) as usize;

    let mut cells = Vec::with_capacity(inner);
    cells.extend((0..filled).map(|_| Cell {
        glyph: style.filled,
        filled: true,
    }));

    if filled < inner {
        if !style.sub_cells.is_empty() {
            if remainder > 0 {
                cells.push(Cell {
                    glyph: style.sub_cells[remainder - 1],
                    filled: true,
                });
            }
        } else if remainder % 2 == 1 {
            if let Some(half) = style.half {
                cells.push(Cell {
                    glyph: half,
                    filled: true,
                });
            }
        } else if filled > 0
            && let Some(head) = style.head
        {
            cells.push(Cell {
                glyph: head,
                filled: false,
            });
        }
    }

    while cells.len() < inner {
        cells.push(Cell {
            glyph: style.empty,
            filled: false,
        });
    }
    cells
}

/// Renders an unstyled bar, caps included.
///
/// ```rust,ignore
/// assert_eq!(render_bar(5, 10, &BarStyle::thin().width(10), None), "━━━━━╺━━━━");
/// ```
pub fn render_bar(current: i64, total: i64, style: &BarStyle, term_width: Option<u16>) -> String {
    let inner = style.inner_width(term_width);
    let mut out = String::with_capacity(inner * 3 + style.left_cap.len() + style.right_cap.len());
    out.push_str(&style.left_cap);
    out.extend(bar_cells(current, total, style, inner).iter().map(|c| c.glyph));
    out.push_str(&style.right_cap);
    out
}

/// Percentage of `current / total`, rounded down, after clamping.
pub fn percent(current: i64, total: i64) -> u64 {
    let total = total.max(1) as u128;
    let current = (current.max(0) as u128).min(total);
    (current * 100 / total) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn thin_half_way_has_trailing_boundary() {
        let style = BarStyle::thin().width(10);
        assert_eq!(render_bar(5, 10, &style, None), "━━━━━╺━━━━");
    }

    #[test]
    fn thin_odd_remainder_uses_half_glyph() {
        // 10 cells * 2 * 55 / 100 = 11 sub units -> 5 full cells plus a half
        let style = BarStyle::thin().width(10);
        assert_eq!(render_bar(55, 100, &style, None), "━━━━━╸━━━━");
    }

    #[test]
    fn boundaries_are_never_drawn_at_the_ends() {
        let style = BarStyle::ascii().width(8);
        assert_eq!(render_bar(0, 8, &style, None), "[        ]");
        assert_eq!(render_bar(8, 8, &style, None), "[========]");
        assert_eq!(render_bar(4, 8, &style, None), "[====>   ]");
    }

    #[test]
    fn block_uses_sub_cell_glyphs() {
        let style = BarStyle::block().width(4);
        // 4 cells * 8 * 5 / 16 = 10 sub units -> 1 full cell, remainder 2
        assert_eq!(render_bar(5, 16, &style, None), "█▎  ");
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let style = BarStyle::dots().width(4);
        assert_eq!(render_bar(-5, 10, &style, None), "○○○○");
        assert_eq!(render_bar(50, 10, &style, None), "●●●●");
        assert_eq!(render_bar(3, 0, &style, None), "●●●●");
        assert_eq!(render_bar(3, -1, &style, None), "●●●●");
    }

    #[test]
    fn auto_width_follows_terminal() {
        let style = BarStyle::dots();
        assert_eq!(style.inner_width(None), BarStyle::MIN_WIDTH);
        assert_eq!(style.inner_width(Some(80)), 20);
        assert_eq!(style.inner_width(Some(20)), BarStyle::MIN_WIDTH);
        assert_eq!(style.inner_width(Some(400)), BarStyle::MAX_WIDTH);
        assert_eq!(style.clone().width(7).inner_width(Some(400)), 7);
    }

    #[test]
    fn percent_rounds_down_and_clamps() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(20, 10), 100);
        assert_eq!(percent(-1, 10), 0);
    }

    proptest! {
        #[test]
        fn visible_width_is_inner_plus_caps(
            total in 1i64..500,
            frac in 0.0f64..=1.0,
            width in 1usize..60,
            preset in 0usize..5,
        ) {
            let (_, style) = BarStyle::presets().swap_remove(preset);
            let style = style.width(width);
            let current = (total as f64 * frac) as i64;
            let bar = render_bar(current, total, &style, None);
            let caps = style.left_cap.width() + style.right_cap.width();
            prop_assert_eq!(bar.width(), width + caps);
            prop_assert_eq!(bar.chars().count(), width + style.left_cap.chars().count() + style.right_cap.chars().count());
        }

        #[test]
        fn empty_and_full_bars(total in 1i64..500, width in 1usize..60, preset in 0usize..5) {
            let (_, style) = BarStyle::presets().swap_remove(preset);
            let inner = style.clone().width(width);
            let empty = bar_cells(0, total, &inner, width);
            prop_assert!(empty.iter().all(|c| !c.filled && c.glyph == inner.empty));
            let full = bar_cells(total, total, &inner, width);
            prop_assert!(full.iter().all(|c| c.filled && c.glyph == inner.filled));
        }
    }
}
