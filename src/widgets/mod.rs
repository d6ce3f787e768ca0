//! Glyph-level building blocks for animation frames.
//!
//! # Spinner
//!
//! [`Spinner`] maps elapsed time to a frame, so it needs no per-tick state:
//!
//! ```rust,ignore
//! let spinner = Spinner::dots(); // ⠋ ⠙ ⠹ ...
//! write!(f, "{} working...", spinner.frame_at(started.elapsed(), false))?;
//!
//! // Other presets:
//! let s = Spinner::line();  // | / - \
//! let s = Spinner::arrow(); // ← ↖ ↑ ↗ → ↘ ↓ ↙
//!
//! // Custom frames:
//! let s = Spinner::custom(vec!["🌑", "🌒", "🌓", "🌔", "🌕"], Duration::from_millis(120));
//! ```
//!
//! # Progress bar
//!
//! [`render_bar`] draws a bar with sub-cell resolution:
//!
//! ```rust,ignore
//! let bar = render_bar(45, 100, &BarStyle::ascii().width(30), None);
//! // => [=============>                ]
//!
//! let bar = render_bar(5, 10, &BarStyle::thin().width(10), None);
//! // => ━━━━━╺━━━━
//! ```

mod bar;
mod spinner;

pub use bar::*;
pub use spinner::*;
