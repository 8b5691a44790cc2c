//! The table layout: sticky header, frozen columns, resize handles, virtualized rows and
//! scroll snapping.
//!
//! Everything is placed in content coordinates (origin at the top-left of the header row,
//! before scrolling) and translated to the screen once per rect.

use egui::{
    Align, Color32, CursorIcon, Direction, Id, Layout, NumExt as _, Painter, Pos2, Rangef, Rect,
    ScrollArea, Sense, Shape, TextWrapMode, Ui, UiBuilder, Vec2, pos2, vec2,
};

use crate::{
    column::{CellContent, GridColumn, StickySide},
    column_model::ColumnModel,
    grid::{ExpansionFn, GridOptions, HasExpansionFn},
    rows::{BodyLayout, BodySpan, ExpansionCell, RowBorders, SpanKind, plan_expansion_row},
    scroll_snap::{ScrollSnapEngine, ScrollState, snap_target},
    sizing::SizingState,
    skeleton,
    style::ResolvedStyle,
    surface::GridSurface,
};

/// Height of the band showing the error or empty content.
const STATE_BAND_HEIGHT: f32 = 96.0;

/// The horizontal part of the viewport, in content coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct HorizontalView {
    pub scroll_x: f32,
    pub width: f32,
}

impl HorizontalView {
    fn range(self) -> Rangef {
        Rangef::new(self.scroll_x, self.scroll_x + self.width)
    }
}

/// Columns laid out left to right from zero.
pub(crate) fn natural_ranges(widths: &[f32]) -> Vec<Rangef> {
    let mut x = 0.0;
    widths
        .iter()
        .map(|&width| {
            let range = Rangef::new(x, x + width);
            x += width;
            range
        })
        .collect()
}

/// Where the column at `index` is painted this frame.
///
/// A frozen column stays at its natural position until scrolling would move it past its
/// offset from the viewport edge, and is held there from then on.
pub(crate) fn place_column(
    model: &ColumnModel,
    index: usize,
    natural: Rangef,
    view: HorizontalView,
) -> Rangef {
    let width = natural.span();
    let min = match model.sticky(index).map(|cell| cell.side) {
        None => return natural,
        Some(StickySide::Left) => natural
            .min
            .max(view.scroll_x + model.left_offset(index)),
        Some(StickySide::Right) => natural
            .min
            .min(view.scroll_x + view.width - model.right_offset(index) - width),
    };
    Rangef::new(min, min + width)
}

/// The part of the viewport left to scrolling columns once the stuck frozen columns are
/// painted over the edges.
pub(crate) fn scrolling_region(
    model: &ColumnModel,
    natural: &[Rangef],
    placed: &[Rangef],
    view: HorizontalView,
) -> Rangef {
    let mut region = view.range();
    for (index, (natural, placed)) in natural.iter().zip(placed).enumerate() {
        if placed.min == natural.min {
            continue;
        }
        match model.sticky(index).map(|cell| cell.side) {
            Some(StickySide::Left) => region.min = region.min.max(placed.max),
            Some(StickySide::Right) => region.max = region.max.min(placed.min),
            None => {}
        }
    }
    region
}

/// Header and body widths of every column. Frozen columns are always their `max_width`.
fn column_widths<T>(
    columns: &[GridColumn<'_, T>],
    model: &ColumnModel,
    sizing: &SizingState,
) -> (Vec<f32>, Vec<f32>) {
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            if let Some(sticky) = model.sticky(index) {
                (sticky.max_width, sticky.max_width)
            } else {
                let declared = column.declared_width();
                let size = sizing.get(column.id());
                (
                    size.map_or(declared, |size| size.header),
                    size.map_or(declared, |size| size.cell),
                )
            }
        })
        .unzip()
}

// ----------------------------------------------------------------------------

/// Maps content coordinates to the screen for one frame.
#[derive(Clone, Copy, Debug)]
struct Geometry {
    /// Screen position of the content origin.
    origin: Pos2,

    /// The visible part of the content, in content coordinates.
    viewport: Rect,

    /// The visible part of the content, on screen.
    view_clip: Rect,

    /// `view_clip` minus the header.
    body_clip: Rect,

    header_height: f32,
    content_width: f32,
}

impl Geometry {
    fn new(origin: Pos2, viewport: Rect, view_clip: Rect, header_height: f32, content_width: f32) -> Self {
        let body_clip = Rect::from_min_max(
            pos2(view_clip.min.x, view_clip.min.y + header_height),
            view_clip.max,
        );
        Self {
            origin,
            viewport,
            view_clip,
            body_clip,
            header_height,
            content_width,
        }
    }

    fn to_screen(&self, x: Rangef, y: Rangef) -> Rect {
        Rect::from_x_y_ranges(x, y).translate(self.origin.to_vec2())
    }

    fn screen_x(&self, x: Rangef) -> Rangef {
        Rangef::new(x.min + self.origin.x, x.max + self.origin.x)
    }

    fn view(&self) -> HorizontalView {
        HorizontalView {
            scroll_x: self.viewport.min.x,
            width: self.viewport.width(),
        }
    }

    /// Full-width row, in screen coordinates.
    fn row_rect(&self, y: Rangef) -> Rect {
        self.to_screen(Rangef::new(0.0, self.content_width), y)
    }
}

/// Add a single-line cell at `rect`.
fn cell_ui(
    ui: &mut Ui,
    id_salt: impl std::hash::Hash,
    rect: Rect,
    clip: Rect,
    padding: f32,
    add_contents: impl FnOnce(&mut Ui),
) {
    let mut child = ui.new_child(
        UiBuilder::new()
            .id_salt(id_salt)
            .max_rect(rect.shrink2(vec2(padding, 0.0)))
            .layout(Layout::left_to_right(Align::Center)),
    );
    child.set_clip_rect(clip.intersect(rect));
    child.style_mut().wrap_mode = Some(TextWrapMode::Truncate);
    add_contents(&mut child);
}

/// Add expansion content at `rect`. Returns the height it wants.
fn expansion_ui(
    ui: &mut Ui,
    id_salt: impl std::hash::Hash,
    rect: Rect,
    clip: Rect,
    padding: f32,
    content: CellContent<'_>,
) -> f32 {
    let mut child = ui.new_child(
        UiBuilder::new()
            .id_salt(id_salt)
            .max_rect(rect.shrink(padding))
            .layout(Layout::top_down(Align::Min)),
    );
    child.set_clip_rect(clip.intersect(rect));
    content.show(&mut child);
    child.min_rect().height() + 2.0 * padding
}

// ----------------------------------------------------------------------------

/// Everything the table layout needs for one frame.
pub(crate) struct DesktopView<'g, 'a, T> {
    pub id: Id,
    pub data: &'g [T],
    pub columns: &'g [GridColumn<'a, T>],
    pub model: &'g ColumnModel,
    pub expansion: Option<&'g ExpansionFn<'a, T>>,
    pub has_expansion: Option<&'g HasExpansionFn<'a, T>>,
    pub surface: GridSurface,

    /// The error or empty content, whichever `surface` asks for.
    pub state_content: Option<CellContent<'a>>,
    pub options: &'g GridOptions,
}

pub(crate) struct DesktopOutput {
    pub scroll_offset: Vec2,
    pub snap_target: Option<f32>,
}

impl<T> DesktopView<'_, '_, T> {
    pub(crate) fn show(
        self,
        ui: &mut Ui,
        sizing: &mut SizingState,
        engine: &mut ScrollSnapEngine,
        expansion_heights: &mut ahash::HashMap<usize, f32>,
    ) -> DesktopOutput {
        profiling::function_scope!();

        let Self {
            id,
            data,
            columns,
            model,
            expansion,
            has_expansion,
            surface,
            state_content,
            options,
        } = self;

        let header_height = options.header_height;
        let style = options.style.resolve(ui.visuals());
        let striped = options.striped.unwrap_or_else(|| ui.visuals().striped);
        let time = ui.input(|i| i.time);

        let (header_widths, cell_widths) = column_widths(columns, model, sizing);
        let header_natural = natural_ranges(&header_widths);
        let cell_natural = natural_ranges(&cell_widths);
        let content_width = header_widths
            .iter()
            .sum::<f32>()
            .max(cell_widths.iter().sum::<f32>());

        let layout = if surface.is_ready() {
            let expands: Vec<bool> = data
                .iter()
                .enumerate()
                .map(|(index, row)| match (expansion, has_expansion) {
                    (None, _) => false,
                    (Some(_), Some(has_expansion)) => has_expansion(row, index),
                    (Some(render), None) => render(row, index).is_some(),
                })
                .collect();
            BodyLayout::new(header_height, options.row_height, &expands, |row| {
                expansion_heights
                    .get(&row)
                    .copied()
                    .unwrap_or(options.expansion_height_hint)
            })
        } else {
            BodyLayout::default()
        };

        let content_height = match surface {
            GridSurface::Ready => layout.content_height(),
            GridSurface::Loading => {
                header_height + columns.len().max(1) as f32 * skeleton::ROW_PITCH
            }
            GridSurface::Error | GridSurface::Empty => header_height + STATE_BAND_HEIGHT,
        };

        let snapping = options.scroll_snap && surface.is_ready();
        let forced = if snapping {
            engine.animated_offset(time)
        } else {
            engine.cancel();
            None
        };

        let mut scroll_area = ScrollArea::both()
            .id_salt(id.with("desktop_scroll"))
            .auto_shrink([false, false])
            .animated(false);
        if let Some(max_height) = options.max_height {
            scroll_area = scroll_area.max_height(max_height);
        }
        if let Some(offset) = forced {
            scroll_area = scroll_area.vertical_scroll_offset(offset);
        }

        let output = scroll_area.show_viewport(ui, |ui, viewport| {
            let origin = ui.max_rect().min;
            ui.set_min_size(vec2(content_width, content_height));

            let geometry =
                Geometry::new(origin, viewport, ui.clip_rect(), header_height, content_width);
            let view = geometry.view();

            let placed: Vec<Rangef> = cell_natural
                .iter()
                .enumerate()
                .map(|(index, natural)| place_column(model, index, *natural, view))
                .collect();
            let region = scrolling_region(model, &cell_natural, &placed, view);
            let scroll_clip = Rect::from_x_y_ranges(
                geometry.screen_x(region),
                geometry.body_clip.y_range(),
            )
            .intersect(geometry.body_clip);

            let body = Body {
                columns,
                model,
                style,
                striped,
                geometry,
                placed,
                scroll_clip,
            };
            match surface {
                GridSurface::Ready => body.rows(ui, data, &layout, expansion, expansion_heights),
                GridSurface::Loading => body.skeleton(ui),
                GridSurface::Error | GridSurface::Empty => body.state_band(ui, state_content),
            }

            Header {
                id,
                columns,
                model,
                style,
                geometry,
                natural: &header_natural,
                options,
            }
            .show(ui, sizing);
        });

        let scroll_offset = output.state.offset;
        let mut target = None;
        if snapping {
            let config = &options.snap_config;
            engine.observe(scroll_offset.y, forced, time, config);
            let scroll = ScrollState {
                scroll_top: scroll_offset.y,
                container_height: output.inner_rect.height(),
                content_height,
            };
            target = engine.poll(time, config, || {
                snap_target(config, header_height, &layout.row_spans(), &scroll)
            });
            if let Some(wait) = engine.next_wakeup(time) {
                ui.ctx().request_repaint_after(wait);
            }
        }

        DesktopOutput {
            scroll_offset,
            snap_target: target,
        }
    }
}

// ----------------------------------------------------------------------------

struct Body<'g, 'a, T> {
    columns: &'g [GridColumn<'a, T>],
    model: &'g ColumnModel,
    style: ResolvedStyle,
    striped: bool,
    geometry: Geometry,

    /// Where every column is painted this frame, in content coordinates.
    placed: Vec<Rangef>,

    /// Screen clip for the cells of scrolling columns.
    scroll_clip: Rect,
}

impl<T> Body<'_, '_, T> {
    fn rows(
        &self,
        ui: &mut Ui,
        data: &[T],
        layout: &BodyLayout,
        expansion: Option<&ExpansionFn<'_, T>>,
        expansion_heights: &mut ahash::HashMap<usize, f32>,
    ) {
        profiling::function_scope!();

        let geometry = &self.geometry;
        let visible = layout.visible(Rangef::new(
            geometry.viewport.min.y + geometry.header_height,
            geometry.viewport.max.y,
        ));
        log::trace!("Laying out body spans {visible:?}");

        let spans = layout.spans();
        let plan = plan_expansion_row(self.model);

        for index in visible {
            let span = &spans[index];
            let Some(row) = data.get(span.row) else {
                continue;
            };
            match span.kind {
                SpanKind::Main => {
                    let has_expansion = spans
                        .get(index + 1)
                        .is_some_and(|next| next.kind == SpanKind::Expansion);
                    self.main_row(ui, span, row, RowBorders::for_row(has_expansion));
                }
                SpanKind::Expansion => {
                    let Some(content) = expansion.and_then(|render| render(row, span.row)) else {
                        continue;
                    };
                    let measured = self.expansion_row(ui, span, content, &plan);
                    if let Some(measured) = measured {
                        let measured = measured.at_least(1.0);
                        let previous = expansion_heights.insert(span.row, measured);
                        if previous.is_none_or(|height| (height - measured).abs() > 0.5) {
                            ui.ctx().request_repaint();
                        }
                    }
                }
            }
        }
    }

    fn row_tint(&self, ui: &Ui, span: &BodySpan, row_rect: Rect) -> Option<Color32> {
        if ui.rect_contains_pointer(row_rect.intersect(self.geometry.body_clip)) {
            Some(self.style.hovered_bg)
        } else if self.striped && span.row.is_multiple_of(2) {
            Some(self.style.striped_bg)
        } else {
            None
        }
    }

    fn paint_sticky_background(&self, painter: &Painter, rect: Rect, tint: Option<Color32>) {
        painter.rect_filled(rect, 0.0, self.style.sticky_bg);
        if let Some(tint) = tint {
            painter.rect_filled(rect, 0.0, tint);
        }
    }

    /// Right edge of every cell, plus the inner (left) edge of right-frozen cells.
    fn paint_cell_edges(&self, ui: &Ui, index: usize, rect: Rect, clip: Rect) {
        let painter = ui.painter().with_clip_rect(clip);
        painter.vline(rect.right(), rect.y_range(), self.style.vertical);
        if self
            .model
            .sticky(index)
            .is_some_and(|cell| cell.side == StickySide::Right)
        {
            painter.vline(rect.left(), rect.y_range(), self.style.vertical);
        }
    }

    fn main_row(&self, ui: &mut Ui, span: &BodySpan, row: &T, borders: RowBorders) {
        let geometry = &self.geometry;
        let y = Rangef::new(span.top, span.bottom());
        let row_rect = geometry.row_rect(y);
        let tint = self.row_tint(ui, span, row_rect);

        let painter = ui.painter().with_clip_rect(geometry.body_clip);
        if let Some(tint) = tint {
            painter.rect_filled(row_rect, 0.0, tint);
        }

        // Scrolling cells first, so frozen cells are painted over them.
        for sticky_pass in [false, true] {
            for (index, column) in self.columns.iter().enumerate() {
                if self.model.is_sticky(index) != sticky_pass {
                    continue;
                }
                let rect = geometry.to_screen(self.placed[index], y);
                let clip = if sticky_pass {
                    geometry.body_clip
                } else {
                    self.scroll_clip
                };
                if !clip.intersects(rect) {
                    continue;
                }
                if sticky_pass {
                    self.paint_sticky_background(&painter, rect, tint);
                }
                cell_ui(
                    ui,
                    (span.row, span.kind, index),
                    rect,
                    clip,
                    self.style.cell_padding,
                    |ui| column.cell(row, span.row).show(ui),
                );
                self.paint_cell_edges(ui, index, rect, clip);
            }
        }

        if borders.main_bottom {
            painter.hline(row_rect.x_range(), row_rect.bottom(), self.style.horizontal);
        }
    }

    /// Returns the measured height of the content, if there was a cell to put it in.
    fn expansion_row(
        &self,
        ui: &mut Ui,
        span: &BodySpan,
        content: CellContent<'_>,
        plan: &[ExpansionCell],
    ) -> Option<f32> {
        let geometry = &self.geometry;
        let y = Rangef::new(span.top, span.bottom());
        let row_rect = geometry.row_rect(y);
        let tint = self.row_tint(ui, span, row_rect);

        let painter = ui.painter().with_clip_rect(geometry.body_clip);
        if let Some(tint) = tint {
            painter.rect_filled(row_rect, 0.0, tint);
        }

        let mut measured = None;
        let mut content = Some(content);
        for cell in plan {
            if let ExpansionCell::Content { column, span: count } = *cell
                && let Some(content) = content.take()
            {
                let width: f32 = self
                    .model
                    .scrollable_columns()
                    .take(count)
                    .map(|index| self.placed[index].span())
                    .sum();
                let left = self.placed[column].min;
                let rect = geometry.to_screen(Rangef::new(left, left + width), y);
                measured = Some(expansion_ui(
                    ui,
                    (span.row, span.kind),
                    rect,
                    self.scroll_clip,
                    self.style.cell_padding,
                    content,
                ));
            }
        }

        for cell in plan {
            if let ExpansionCell::Placeholder { column, .. } = *cell {
                let rect = geometry.to_screen(self.placed[column], y);
                if !geometry.body_clip.intersects(rect) {
                    continue;
                }
                self.paint_sticky_background(&painter, rect, tint);
                self.paint_cell_edges(ui, column, rect, geometry.body_clip);
            }
        }

        let borders = RowBorders::for_row(true);
        let line = row_rect.intersect(geometry.body_clip);
        if borders.expansion_top_dashed && line.width() > 0.0 {
            painter.extend(Shape::dashed_line(
                &[
                    pos2(line.left(), row_rect.top()),
                    pos2(line.right(), row_rect.top()),
                ],
                self.style.expansion_border,
                4.0,
                3.0,
            ));
        }
        if borders.expansion_bottom {
            painter.hline(row_rect.x_range(), row_rect.bottom(), self.style.horizontal);
        }

        measured
    }

    /// One row of pulsing bars per column.
    fn skeleton(&self, ui: &mut Ui) {
        profiling::function_scope!();

        let geometry = &self.geometry;
        let color = skeleton::bar_color(ui);
        let rows = self.columns.len().max(1);

        for row in 0..rows {
            let top = geometry.header_height + row as f32 * skeleton::ROW_PITCH;
            let y = Rangef::new(top, top + skeleton::ROW_PITCH);
            for sticky_pass in [false, true] {
                for index in 0..self.columns.len() {
                    if self.model.is_sticky(index) != sticky_pass {
                        continue;
                    }
                    let rect = geometry.to_screen(self.placed[index], y);
                    let clip = if sticky_pass {
                        geometry.body_clip
                    } else {
                        self.scroll_clip
                    };
                    let painter = ui.painter().with_clip_rect(clip);
                    if sticky_pass {
                        self.paint_sticky_background(&painter, rect, None);
                    }
                    skeleton::paint_bar(&painter, rect, self.style.cell_padding, color);
                }
            }
        }
    }

    /// The error or empty content, centered in the visible width.
    fn state_band(&self, ui: &mut Ui, content: Option<CellContent<'_>>) {
        let geometry = &self.geometry;
        let y = Rangef::new(
            geometry.header_height,
            geometry.header_height + STATE_BAND_HEIGHT,
        );
        let rect = geometry.to_screen(geometry.viewport.x_range(), y);

        let mut child = ui.new_child(
            UiBuilder::new()
                .id_salt("state_band")
                .max_rect(rect.shrink(self.style.cell_padding))
                .layout(Layout::centered_and_justified(Direction::TopDown)),
        );
        child.set_clip_rect(geometry.body_clip.intersect(rect));
        if let Some(content) = content {
            content.show(&mut child);
        }

        ui.painter()
            .with_clip_rect(geometry.body_clip)
            .hline(rect.x_range(), rect.bottom(), self.style.horizontal);
    }
}

// ----------------------------------------------------------------------------

struct Header<'g, 'a, T> {
    id: Id,
    columns: &'g [GridColumn<'a, T>],
    model: &'g ColumnModel,
    style: ResolvedStyle,
    geometry: Geometry,
    natural: &'g [Rangef],
    options: &'g GridOptions,
}

impl<T> Header<'_, '_, T> {
    /// Painted after the body so it stays on top while rows scroll under it.
    fn show(self, ui: &mut Ui, sizing: &mut SizingState) {
        profiling::function_scope!();

        let Self {
            id,
            columns,
            model,
            style,
            geometry,
            natural,
            options,
        } = self;

        let view = geometry.view();
        let y = Rangef::new(
            geometry.viewport.min.y,
            geometry.viewport.min.y + geometry.header_height,
        );
        let header_rect = geometry.row_rect(y);
        let header_clip = geometry.view_clip.intersect(Rect::from_x_y_ranges(
            geometry.view_clip.x_range(),
            header_rect.y_range(),
        ));

        let placed: Vec<Rangef> = natural
            .iter()
            .enumerate()
            .map(|(index, natural)| place_column(model, index, *natural, view))
            .collect();
        let region = scrolling_region(model, natural, &placed, view);
        let scroll_clip =
            Rect::from_x_y_ranges(geometry.screen_x(region), header_clip.y_range())
                .intersect(header_clip);

        let painter = ui.painter().with_clip_rect(header_clip);
        painter.rect_filled(header_rect, 0.0, style.header_bg);

        for sticky_pass in [false, true] {
            for (index, column) in columns.iter().enumerate() {
                if model.is_sticky(index) != sticky_pass {
                    continue;
                }
                let rect = geometry.to_screen(placed[index], y);
                let clip = if sticky_pass { header_clip } else { scroll_clip };
                if !clip.intersects(rect) {
                    continue;
                }
                if sticky_pass {
                    painter.rect_filled(rect, 0.0, style.header_bg);
                }
                cell_ui(ui, ("header", index), rect, clip, style.cell_padding, |ui| {
                    ui.label(column.header().clone().strong());
                });

                let edges = ui.painter().with_clip_rect(clip);
                edges.vline(rect.right(), rect.y_range(), style.vertical);
                if model
                    .sticky(index)
                    .is_some_and(|cell| cell.side == StickySide::Right)
                {
                    edges.vline(rect.left(), rect.y_range(), style.vertical);
                }
            }
        }

        painter.hline(header_rect.x_range(), header_rect.bottom(), style.horizontal);

        let grab_radius = ui.style().interaction.resize_grab_radius_side;
        for (index, column) in columns.iter().enumerate() {
            if model.is_sticky(index) || !column.is_resizable(options.resizable) {
                continue;
            }

            let x = geometry.origin.x + placed[index].max;
            let handle = Rect::from_x_y_ranges(
                Rangef::new(x - grab_radius, x + grab_radius),
                header_clip.y_range(),
            )
            .intersect(scroll_clip);
            if !handle.is_positive() {
                continue;
            }

            let response = ui.interact(
                handle,
                id.with("resize_column").with(index),
                Sense::click_and_drag(),
            );

            if response.double_clicked() {
                log::debug!("Resetting width of column {:?}", column.id());
                sizing.reset(column.id());
            } else if response.dragged() {
                sizing.drag(column.id(), response.drag_delta().x, options.resize_mode);
            }
            if response.drag_stopped() {
                sizing.commit(column.id());
            }

            let dragging = response.dragged();
            let hovered = response.hovered();
            if hovered || dragging {
                ui.ctx().set_cursor_icon(CursorIcon::ResizeColumn);

                let stroke = if dragging {
                    ui.visuals().widgets.active.bg_stroke
                } else {
                    ui.visuals().widgets.hovered.bg_stroke
                };
                ui.painter().with_clip_rect(geometry.view_clip).vline(
                    x,
                    Rangef::new(header_rect.top(), geometry.view_clip.bottom()),
                    stroke,
                );
            }
        }
    }
}
