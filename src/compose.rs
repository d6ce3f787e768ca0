//! Assembles the logical parts of a line and places bars next to them.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::widgets::BarAlign;

/// A logical segment of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Timestamp,
    Level,
    Icon,
    Message,
    Fields,
}

impl Part {
    pub const DEFAULT_ORDER: [Part; 5] = [
        Part::Timestamp,
        Part::Level,
        Part::Icon,
        Part::Message,
        Part::Fields,
    ];
}

/// Which parts are switched on. Message and fields are always shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartFlags {
    pub timestamp: bool,
    pub level: bool,
    pub icon: bool,
}

impl Default for PartFlags {
    fn default() -> Self {
        Self {
            timestamp: false,
            level: true,
            icon: true,
        }
    }
}

impl PartFlags {
    pub fn enabled(&self, part: Part) -> bool {
        match part {
            Part::Timestamp => self.timestamp,
            Part::Level => self.level,
            Part::Icon => self.icon,
            Part::Message | Part::Fields => true,
        }
    }
}

/// Already rendered text for each part.
#[derive(Debug, Default, Clone)]
pub struct RenderedParts<'a> {
    pub timestamp: &'a str,
    pub level: &'a str,
    pub icon: &'a str,
    pub message: &'a str,
    pub fields: &'a str,
}

impl<'a> RenderedParts<'a> {
    fn get(&self, part: Part) -> &'a str {
        match part {
            Part::Timestamp => self.timestamp,
            Part::Level => self.level,
            Part::Icon => self.icon,
            Part::Message => self.message,
            Part::Fields => self.fields,
        }
    }
}

/// Joins enabled, non-empty parts in `order` with single spaces.
///
/// A part that already begins with a space (formatted fields are
/// space-prefixed) is appended as is.
pub fn build_line(order: &[Part], flags: PartFlags, parts: &RenderedParts<'_>) -> String {
    let mut line = String::new();
    for &part in order {
        if !flags.enabled(part) {
            continue;
        }
        let text = parts.get(part);
        if text.is_empty() {
            continue;
        }
        if line.is_empty() {
            line.push_str(text.trim_start_matches(' '));
        } else if text.starts_with(' ') {
            line.push_str(text);
        } else {
            line.push(' ');
            line.push_str(text);
        }
    }
    line
}

/// Terminal columns occupied by `text`, ignoring escape sequences.
pub fn display_width(text: &str) -> usize {
    if text.contains('\x1b') {
        strip_ansi_escapes::strip_str(text).width()
    } else {
        text.width()
    }
}

/// Cuts `text` to at most `cols` terminal columns.
///
/// Escape sequences are copied through without counting. A clipped line
/// that carried styling gets a trailing reset so color never bleeds into
/// the next row.
pub fn clip_to_width(text: &str, cols: usize) -> String {
    if display_width(text) <= cols {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut used = 0;
    let mut styled = false;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            styled = true;
            out.push(c);
            if let Some(next) = chars.next() {
                out.push(next);
                if next == '[' {
                    for c in chars.by_ref() {
                        out.push(c);
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
            }
            continue;
        }
        let width = c.width().unwrap_or(0);
        if used + width > cols {
            break;
        }
        used += width;
        out.push(c);
    }
    if styled {
        out.push_str("\x1b[0m");
    }
    out
}

/// Positions `bar` relative to `message`.
///
/// The pad policies fill the row up to `term_width`; when the width is
/// unknown or too narrow they fall back to `separator`.
pub fn align_bar(
    message: &str, bar: &str, separator: &str, align: BarAlign, term_width: Option<u16>,
) -> String {
    if bar.is_empty() {
        return message.to_string();
    }
    if message.is_empty() {
        return bar.to_string();
    }
    match align {
        BarAlign::Inline | BarAlign::Right => format!("{message}{separator}{bar}"),
        BarAlign::Left => format!("{bar}{separator}{message}"),
        BarAlign::LeftPad => {
            let gap = pad_gap(message, bar, separator, term_width);
            format!("{bar}{gap}{message}")
        }
        BarAlign::RightPad => {
            let gap = pad_gap(message, bar, separator, term_width);
            format!("{message}{gap}{bar}")
        }
    }
}

fn pad_gap(message: &str, bar: &str, separator: &str, term_width: Option<u16>) -> String {
    let used = display_width(message) + display_width(bar);
    match term_width {
        Some(cols) if cols as usize > used => " ".repeat(cols as usize - used),
        _ => separator.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_disabled_and_empty_parts() {
        let parts = RenderedParts {
            timestamp: "12:00:00",
            level: "INF",
            icon: "",
            message: "Downloading",
            fields: " url=x",
        };
        let line = build_line(&Part::DEFAULT_ORDER, PartFlags::default(), &parts);
        assert_eq!(line, "INF Downloading url=x");

        let flags = PartFlags {
            timestamp: true,
            ..PartFlags::default()
        };
        let line = build_line(&Part::DEFAULT_ORDER, flags, &parts);
        assert_eq!(line, "12:00:00 INF Downloading url=x");
    }

    #[test]
    fn honours_custom_order() {
        let parts = RenderedParts {
            level: "WRN",
            icon: "!",
            message: "slow",
            fields: " n=1",
            ..Default::default()
        };
        let order = [Part::Message, Part::Fields, Part::Icon, Part::Level];
        assert_eq!(build_line(&order, PartFlags::default(), &parts), "slow n=1 ! WRN");
    }

    #[test]
    fn leading_fields_lose_their_space() {
        let parts = RenderedParts {
            fields: " n=1",
            ..Default::default()
        };
        let order = [Part::Fields, Part::Message];
        assert_eq!(build_line(&order, PartFlags::default(), &parts), "n=1");
    }

    #[test]
    fn width_ignores_styling_and_counts_wide_chars() {
        assert_eq!(display_width("\x1b[31mred\x1b[0m"), 3);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width("⠋ go"), 4);
    }

    #[test]
    fn clipping_counts_columns_not_bytes() {
        assert_eq!(clip_to_width("short", 10), "short");
        assert_eq!(clip_to_width("abcdefghij", 4), "abcd");
        // a wide char that would straddle the edge is dropped
        assert_eq!(clip_to_width("a日本", 2), "a");
        let clipped = clip_to_width("\x1b[31mredder\x1b[0m", 3);
        assert_eq!(clipped, "\x1b[31mred\x1b[0m");
        assert_eq!(display_width(&clipped), 3);
    }

    #[test]
    fn fixed_alignments() {
        assert_eq!(align_bar("msg", "[==]", " ", BarAlign::Inline, None), "msg [==]");
        assert_eq!(align_bar("msg", "[==]", " | ", BarAlign::Right, None), "msg | [==]");
        assert_eq!(align_bar("msg", "[==]", " ", BarAlign::Left, Some(80)), "[==] msg");
    }

    #[test]
    fn pad_alignments_fill_the_row() {
        assert_eq!(align_bar("msg", "[==]", " ", BarAlign::RightPad, Some(10)), "msg   [==]");
        assert_eq!(align_bar("msg", "[==]", " ", BarAlign::LeftPad, Some(10)), "[==]   msg");
        let styled = "\x1b[1mmsg\x1b[0m";
        let line = align_bar(styled, "[==]", " ", BarAlign::RightPad, Some(10));
        assert_eq!(display_width(&line), 10);
    }

    #[test]
    fn pad_alignments_fall_back_on_narrow_terminals() {
        assert_eq!(align_bar("message", "[====]", "~", BarAlign::RightPad, Some(8)), "message~[====]");
        assert_eq!(align_bar("message", "[====]", "~", BarAlign::LeftPad, None), "[====]~message");
    }
}
