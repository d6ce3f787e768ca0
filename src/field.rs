//! Key/value fields and their one-segment text rendering.

use std::fmt::Write as _;

use owo_colors::Style;

use crate::color::paint;

/// A single `key=value` pair attached to a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: String,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

impl<K: Into<String>, V: ToString> From<(K, V)> for Field {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// When field values are wrapped in quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quote {
    /// Quote values that are empty or contain whitespace, quotes or `=`.
    #[default]
    Auto,
    Always,
    Never,
}

/// Formatting options for [`format_fields`].
#[derive(Debug, Clone)]
pub struct FieldOptions {
    pub quote: Quote,
    /// Sort fields by key (stable) instead of insertion order.
    pub sort: bool,
    pub key_style: Style,
    pub value_style: Style,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            quote: Quote::Auto,
            sort: false,
            key_style: Style::new().bright_black(),
            value_style: Style::new(),
        }
    }
}

/// Renders `fields` as a single space-prefixed segment: ` a=1 b="x y"`.
///
/// Styling is applied only when `color` is set. Returns an empty string for
/// an empty field list.
pub fn format_fields(fields: &[Field], opts: &FieldOptions, color: bool) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let mut ordered: Vec<&Field> = fields.iter().collect();
    if opts.sort {
        ordered.sort_by(|a, b| a.key.cmp(&b.key));
    }

    let mut out = String::new();
    for field in ordered {
        let key = paint(opts.key_style, &format!("{}=", field.key), color);
        let value = paint(opts.value_style, &quote(&field.value, opts.quote), color);
        let _ = write!(out, " {key}{value}");
    }
    out
}

fn quote(value: &str, policy: Quote) -> String {
    let needs_quotes = match policy {
        Quote::Always => true,
        Quote::Never => false,
        Quote::Auto => {
            value.is_empty()
                || value
                    .chars()
                    .any(|c| c.is_whitespace() || c == '"' || c == '=' || c.is_control())
        }
    };
    if needs_quotes {
        format!("{value:?}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_space_prefixed() {
        let fields = vec![Field::new("file", "a.txt"), Field::new("size", 42)];
        assert_eq!(format_fields(&fields, &FieldOptions::default(), false), " file=a.txt size=42");
        assert_eq!(format_fields(&[], &FieldOptions::default(), false), "");
    }

    #[test]
    fn auto_quoting() {
        let fields = vec![
            Field::new("msg", "two words"),
            Field::new("empty", ""),
            Field::new("eq", "a=b"),
        ];
        assert_eq!(
            format_fields(&fields, &FieldOptions::default(), false),
            r#" msg="two words" empty="" eq="a=b""#
        );
    }

    #[test]
    fn quote_policies_and_sorting() {
        let fields = vec![Field::new("b", "x y"), Field::new("a", "1")];
        let opts = FieldOptions {
            quote: Quote::Never,
            sort: true,
            ..FieldOptions::default()
        };
        assert_eq!(format_fields(&fields, &opts, false), " a=1 b=x y");
        let opts = FieldOptions {
            quote: Quote::Always,
            ..FieldOptions::default()
        };
        assert_eq!(format_fields(&fields, &opts, false), r#" b="x y" a="1""#);
    }

    #[test]
    fn colored_output_keeps_plain_text() {
        let fields = vec![Field::from(("k", "v"))];
        let styled = format_fields(&fields, &FieldOptions::default(), true);
        assert!(styled.contains('\x1b'));
        assert_eq!(strip_ansi_escapes::strip_str(&styled), " k=v");
    }
}
