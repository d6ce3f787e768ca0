#![doc = include_str!("../README.md")]

pub(crate) mod animation;
pub(crate) mod cancel;
pub(crate) mod color;
pub(crate) mod compose;
pub(crate) mod error;
pub(crate) mod field;
pub(crate) mod group;
pub(crate) mod live;
pub(crate) mod logger;
pub(crate) mod render;
pub(crate) mod runner;
pub(crate) mod snapshot;
pub(crate) mod style;
pub(crate) mod task;
pub mod widgets;
pub(crate) mod writer;


/// Re-exports of all public types and functions.
pub mod prelude {
    pub use crate::animation::{
        Animation, BAR_TICK, BarMode, COLOR_TICK, DEFAULT_SPEED, Direction, Mode, PulseMode,
        ShimmerMode, SpinnerMode,
    };
    pub use crate::cancel::CancelToken;
    pub use crate::color::{Color, ColorStop, Lut, interpolate, normalize};
    pub use crate::compose::{Part, PartFlags, RenderedParts, align_bar, build_line, display_width};
    pub use crate::error::{BoxError, Error, Result};
    pub use crate::field::{Field, FieldOptions, Quote, format_fields};
    pub use crate::group::{Group, GroupResult, SlotBuilder, SlotHandle, SlotOutcome};
    pub use crate::live::Update;
    pub use crate::logger::{ColorMode, Config, Logger, Output, TimeZone};
    pub use crate::style::{Level, LevelStyle, Styles};
    pub use crate::widgets::{
        BarAlign, BarStyle, Cell, PercentDisplay, Spinner, bar_cells, percent, render_bar,
    };
}

pub use crate::prelude::*;
