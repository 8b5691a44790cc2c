//! The narrow layout: one card per row, one label/value pair per column.
//!
//! Nothing here touches column widths, sticky offsets or scroll snapping.

use egui::{Align, Id, Layout, ScrollArea, TextWrapMode, Ui, Vec2, vec2};

use crate::{
    column::{CellContent, GridColumn},
    grid::GridOptions,
    skeleton,
    surface::GridSurface,
};

/// Width reserved for the column label in a card.
const LABEL_WIDTH: f32 = 80.0;

pub(crate) struct MobileView<'g, 'a, T> {
    pub id: Id,
    pub data: &'g [T],
    pub columns: &'g [GridColumn<'a, T>],
    pub surface: GridSurface,
    pub state_content: Option<CellContent<'a>>,
    pub options: &'g GridOptions,
}

impl<T> MobileView<'_, '_, T> {
    /// Returns the scroll offset of the card list.
    pub(crate) fn show(self, ui: &mut Ui) -> Vec2 {
        profiling::function_scope!();

        let Self {
            id,
            data,
            columns,
            surface,
            state_content,
            options,
        } = self;

        let mut scroll_area = ScrollArea::vertical()
            .id_salt(id.with("mobile_scroll"))
            .auto_shrink([false, false]);
        if let Some(max_height) = options.max_height {
            scroll_area = scroll_area.max_height(max_height);
        }

        let output = scroll_area.show(ui, |ui| match surface {
            GridSurface::Loading => skeleton::cards(ui, columns.len()),
            GridSurface::Error | GridSurface::Empty => {
                ui.add_space(ui.spacing().item_spacing.y);
                ui.vertical_centered(|ui| {
                    if let Some(content) = state_content {
                        content.show(ui);
                    }
                });
            }
            GridSurface::Ready => {
                for (index, row) in data.iter().enumerate() {
                    ui.push_id(index, |ui| card(ui, columns, row, index));
                    ui.add_space(ui.spacing().item_spacing.y);
                }
            }
        });

        output.state.offset
    }
}

fn card<T>(ui: &mut Ui, columns: &[GridColumn<'_, T>], row: &T, index: usize) {
    profiling::function_scope!();

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.style_mut().wrap_mode = Some(TextWrapMode::Wrap);

        for column in columns {
            let content = column.cell(row, index);
            if content.is_action_cluster() {
                content.show(ui);
                continue;
            }

            ui.horizontal_top(|ui| {
                ui.allocate_ui_with_layout(
                    vec2(LABEL_WIDTH, 0.0),
                    Layout::top_down(Align::Min),
                    |ui| {
                        ui.set_min_width(LABEL_WIDTH);
                        ui.add(
                            egui::Label::new(column.header().clone().small().weak())
                                .wrap_mode(TextWrapMode::Extend),
                        );
                    },
                );
                ui.vertical(|ui| content.show(ui));
            });
        }
    });
}
