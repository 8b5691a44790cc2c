//! Picks between the table layout and the narrow card layout.

/// Widths below this many points render as cards.
pub const DEFAULT_MOBILE_BREAKPOINT: f32 = 768.0;

/// How a [`crate::DataGrid`] is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// A table with a sticky header, frozen columns, resize handles and scroll snapping.
    Desktop,

    /// One card per row, with a label/value pair per column.
    Mobile,
}

impl RenderMode {
    #[inline]
    pub fn is_mobile(self) -> bool {
        self == Self::Mobile
    }

    /// Resize handles, sticky offsets and scroll snapping only exist in the table layout.
    #[inline]
    pub fn has_column_layout(self) -> bool {
        self == Self::Desktop
    }
}

/// Classify the available width. Pure: the same width always gives the same mode.
pub fn classify_viewport(width: f32, breakpoint: f32) -> RenderMode {
    if width < breakpoint {
        RenderMode::Mobile
    } else {
        RenderMode::Desktop
    }
}
