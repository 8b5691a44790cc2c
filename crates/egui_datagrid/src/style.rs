use egui::{Color32, Stroke, Visuals};

/// Styling configuration for grid appearance.
///
/// All fields are optional. When `None`, the grid uses `ui.visuals()` defaults.
#[derive(Clone, Debug, Default)]
pub struct GridStyle {
    /// Header background color.
    /// Falls back to `ui.visuals().extreme_bg_color`.
    pub header_bg_color: Option<Color32>,

    /// Background of frozen cells, so scrolling content does not show through them.
    /// Falls back to `ui.visuals().panel_fill`.
    pub sticky_bg_color: Option<Color32>,

    /// Stroke for vertical grid lines, including the inner edge of frozen columns.
    /// Falls back to `ui.visuals().widgets.noninteractive.bg_stroke`.
    pub vertical_grid_stroke: Option<Stroke>,

    /// Stroke for horizontal grid lines.
    /// Falls back to `ui.visuals().widgets.noninteractive.bg_stroke`.
    pub horizontal_grid_stroke: Option<Stroke>,

    /// Background color for striped rows.
    /// Falls back to `ui.visuals().faint_bg_color`.
    pub striped_bg_color: Option<Color32>,

    /// Background color for hovered rows.
    /// Falls back to `ui.visuals().widgets.hovered.weak_bg_fill`.
    pub hovered_bg_color: Option<Color32>,

    /// Dashed line on top of an expansion row.
    /// Falls back to the horizontal grid stroke.
    pub expansion_border_stroke: Option<Stroke>,

    /// Horizontal padding inside every cell. Default: `8.0`.
    pub cell_padding: Option<f32>,
}

impl GridStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid lines only, no fills: closest to a plain HTML table.
    pub fn plain() -> Self {
        Self {
            striped_bg_color: Some(Color32::TRANSPARENT),
            hovered_bg_color: Some(Color32::TRANSPARENT),
            ..Self::default()
        }
    }

    #[inline]
    pub fn header_bg_color(mut self, color: Color32) -> Self {
        self.header_bg_color = Some(color);
        self
    }

    #[inline]
    pub fn sticky_bg_color(mut self, color: Color32) -> Self {
        self.sticky_bg_color = Some(color);
        self
    }

    #[inline]
    pub fn vertical_grid_stroke(mut self, stroke: impl Into<Stroke>) -> Self {
        self.vertical_grid_stroke = Some(stroke.into());
        self
    }

    #[inline]
    pub fn horizontal_grid_stroke(mut self, stroke: impl Into<Stroke>) -> Self {
        self.horizontal_grid_stroke = Some(stroke.into());
        self
    }

    #[inline]
    pub fn striped_bg_color(mut self, color: Color32) -> Self {
        self.striped_bg_color = Some(color);
        self
    }

    #[inline]
    pub fn hovered_bg_color(mut self, color: Color32) -> Self {
        self.hovered_bg_color = Some(color);
        self
    }

    #[inline]
    pub fn expansion_border_stroke(mut self, stroke: impl Into<Stroke>) -> Self {
        self.expansion_border_stroke = Some(stroke.into());
        self
    }

    #[inline]
    pub fn cell_padding(mut self, padding: f32) -> Self {
        self.cell_padding = Some(padding);
        self
    }

    /// Fill in every `None` from `visuals`.
    pub(crate) fn resolve(&self, visuals: &Visuals) -> ResolvedStyle {
        let grid_stroke = visuals.widgets.noninteractive.bg_stroke;
        let horizontal = self.horizontal_grid_stroke.unwrap_or(grid_stroke);
        ResolvedStyle {
            header_bg: self.header_bg_color.unwrap_or(visuals.extreme_bg_color),
            sticky_bg: self.sticky_bg_color.unwrap_or(visuals.panel_fill),
            vertical: self.vertical_grid_stroke.unwrap_or(grid_stroke),
            horizontal,
            striped_bg: self.striped_bg_color.unwrap_or(visuals.faint_bg_color),
            hovered_bg: self
                .hovered_bg_color
                .unwrap_or(visuals.widgets.hovered.weak_bg_fill),
            expansion_border: self.expansion_border_stroke.unwrap_or(horizontal),
            cell_padding: self.cell_padding.unwrap_or(8.0),
        }
    }
}

/// [`GridStyle`] with every fallback applied, for one frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResolvedStyle {
    pub header_bg: Color32,
    pub sticky_bg: Color32,
    pub vertical: Stroke,
    pub horizontal: Stroke,
    pub striped_bg: Color32,
    pub hovered_bg: Color32,
    pub expansion_border: Stroke,
    pub cell_padding: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_fall_back_to_visuals() {
        let visuals = Visuals::dark();
        let resolved = GridStyle::new().resolve(&visuals);
        assert_eq!(resolved.striped_bg, visuals.faint_bg_color);
        assert_eq!(resolved.vertical, visuals.widgets.noninteractive.bg_stroke);
        assert_eq!(resolved.expansion_border, resolved.horizontal);
        assert_eq!(resolved.cell_padding, 8.0);
    }

    #[test]
    fn expansion_border_follows_custom_grid_stroke() {
        let stroke = Stroke::new(2.0, Color32::RED);
        let resolved = GridStyle::new()
            .horizontal_grid_stroke(stroke)
            .resolve(&Visuals::light());
        assert_eq!(resolved.expansion_border, stroke);
    }
}
