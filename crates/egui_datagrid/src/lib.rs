//! A data grid widget for [`egui`].
//!
//! [`DataGrid`] renders a list of rows through a list of [`GridColumn`]s:
//!
//! * columns can be frozen against either edge with [`StickyColumnConfig`],
//! * column widths are changed by dragging the header separators,
//! * rows can carry an expansion row with arbitrary content,
//! * the scroll position snaps to row boundaries once scrolling stops,
//! * below a width breakpoint the grid becomes a list of cards.
//!
//! The pure parts ([`ColumnModel`], [`snap_target`], [`classify_viewport`],
//! [`plan_expansion_row`], …) are public so they can be used and tested on their own.
//!
//! ## Feature flags
//! * `serde`: derive `Serialize`/`Deserialize` for the configuration types, and keep column
//!   widths in persisted memory.

/// Panic in debug builds, log otherwise.
macro_rules! log_or_panic {
    ($fmt: literal) => { $crate::log_or_panic!($fmt,) };
    ($fmt: literal, $($arg: tt)*) => {{
        if cfg!(debug_assertions) {
            panic!($fmt, $($arg)*);
        } else {
            log::error!($fmt, $($arg)*);
        }
    }};
}
pub(crate) use log_or_panic;

mod column;
mod column_model;
mod desktop;
mod grid;
mod layout;
mod mobile;
mod rows;
mod scroll_snap;
mod sizing;
mod skeleton;
mod style;
mod surface;

pub use crate::{
    column::{CellContent, ColumnRef, GridColumn, StickyColumnConfig, StickySide},
    column_model::{ColumnModel, ConfigError, StickyCell},
    grid::{DataGrid, GridHandle, GridResponse},
    layout::{DEFAULT_MOBILE_BREAKPOINT, RenderMode, classify_viewport},
    rows::{BodyLayout, BodySpan, ExpansionCell, RowBorders, SpanKind, plan_expansion_row},
    scroll_snap::{
        RowSpan, ScrollSnapConfig, ScrollSnapEngine, ScrollState, SnapAnimation, SnapDecision,
        SnapPhase, snap_target,
    },
    sizing::{ColumnResizeMode, ColumnSize, SizingState},
    style::GridStyle,
    surface::GridSurface,
};
