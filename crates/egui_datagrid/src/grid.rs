use std::time::Duration;

use egui::{Id, Rect, RichText, Ui, Vec2};

use crate::{
    column::{CellContent, GridColumn, StickyColumnConfig},
    column_model::{ColumnModel, layout_key},
    desktop::DesktopView,
    layout::{DEFAULT_MOBILE_BREAKPOINT, RenderMode, classify_viewport},
    mobile::MobileView,
    scroll_snap::{ScrollSnapConfig, ScrollSnapEngine, SnapPhase},
    sizing::{ColumnResizeMode, SizingState},
    style::GridStyle,
    surface::GridSurface,
};

/// Renders the expansion row of a row, if it has one.
pub(crate) type ExpansionFn<'a, T> = dyn for<'r> Fn(&'r T, usize) -> Option<CellContent<'r>> + 'a;

/// Whether a row has an expansion row, without building its content.
pub(crate) type HasExpansionFn<'a, T> = dyn Fn(&T, usize) -> bool + 'a;

type ReadyFn<'a> = Box<dyn FnOnce(&GridHandle) + 'a>;

/// Presentation settings shared by both layouts.
pub(crate) struct GridOptions {
    pub row_height: f32,
    pub header_height: f32,
    pub expansion_height_hint: f32,
    pub striped: Option<bool>,
    pub style: GridStyle,
    pub max_height: Option<f32>,
    pub resizable: bool,
    pub resize_mode: ColumnResizeMode,
    pub scroll_snap: bool,
    pub snap_config: ScrollSnapConfig,
    pub mobile_breakpoint: f32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_height: 48.0,
            header_height: 40.0,
            expansion_height_hint: 96.0,
            striped: None,
            style: GridStyle::default(),
            max_height: None,
            resizable: true,
            resize_mode: ColumnResizeMode::Live,
            scroll_snap: true,
            snap_config: ScrollSnapConfig::default(),
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
        }
    }
}

/// Everything a grid remembers between frames, apart from its column widths.
#[derive(Clone, Debug, Default)]
pub(crate) struct GridMemory {
    /// Signature of the column ids and sticky configs `model` was built from.
    layout_key: Option<u64>,
    model: ColumnModel,
    engine: ScrollSnapEngine,

    /// Measured height of expansion rows, by row index.
    expansion_heights: ahash::HashMap<usize, f32>,
    mode: Option<RenderMode>,
    last_pass: Option<u64>,
}

// ----------------------------------------------------------------------------

/// A data grid with frozen columns, resizable columns, expandable rows and scroll snapping,
/// which turns into a list of cards on narrow screens.
///
/// ```
/// use egui_datagrid::{CellContent, DataGrid, GridColumn, StickyColumnConfig};
///
/// struct User {
///     id: u32,
///     name: String,
/// }
///
/// fn users_ui(ui: &mut egui::Ui, users: &[User]) {
///     DataGrid::new(
///         users,
///         vec![
///             GridColumn::new("id", "ID", |user: &User, _| user.id.to_string().into()),
///             GridColumn::new("name", "Name", |user: &User, _| user.name.as_str().into()),
///             GridColumn::new("actions", "", |_: &User, _| {
///                 CellContent::actions(|ui| {
///                     let _ = ui.button("Edit");
///                 })
///             }),
///         ],
///     )
///     .right_sticky_columns(vec![StickyColumnConfig::new("actions", 100.0)])
///     .show(ui);
/// }
/// ```
pub struct DataGrid<'a, T> {
    data: &'a [T],
    columns: Vec<GridColumn<'a, T>>,
    loading: bool,
    error: Option<CellContent<'a>>,
    empty_content: Option<CellContent<'a>>,
    left_sticky: Option<Vec<StickyColumnConfig>>,
    right_sticky: Vec<StickyColumnConfig>,
    on_table_ready: Option<ReadyFn<'a>>,
    expanded_row_render: Option<Box<ExpansionFn<'a, T>>>,
    has_expanded_row: Option<Box<HasExpansionFn<'a, T>>>,
    id_salt: Id,
    options: GridOptions,
}

impl<'a, T> DataGrid<'a, T> {
    pub fn new(data: &'a [T], columns: Vec<GridColumn<'a, T>>) -> Self {
        Self {
            data,
            columns,
            loading: false,
            error: None,
            empty_content: None,
            left_sticky: None,
            right_sticky: Vec::new(),
            on_table_ready: None,
            expanded_row_render: None,
            has_expanded_row: None,
            id_salt: Id::new("__data_grid"),
            options: GridOptions::default(),
        }
    }

    /// Give this grid a unique id within the parent [`Ui`].
    ///
    /// This is required if you have multiple grids in the same [`Ui`].
    #[inline]
    pub fn id_salt(mut self, id_salt: impl std::hash::Hash) -> Self {
        self.id_salt = Id::new(id_salt);
        self
    }

    /// Show a loading skeleton instead of the rows. Wins over [`Self::error`].
    #[inline]
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Show this instead of the rows.
    #[inline]
    pub fn error(mut self, error: impl Into<CellContent<'a>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Shown when there are no rows. Default: a weak "No data" label.
    #[inline]
    pub fn empty_content(mut self, content: impl Into<CellContent<'a>>) -> Self {
        self.empty_content = Some(content.into());
        self
    }

    /// Columns frozen against the left edge.
    ///
    /// Default: the first column, 60 points wide.
    #[inline]
    pub fn left_sticky_columns(mut self, configs: Vec<StickyColumnConfig>) -> Self {
        self.left_sticky = Some(configs);
        self
    }

    /// Columns frozen against the right edge. Default: none.
    #[inline]
    pub fn right_sticky_columns(mut self, configs: Vec<StickyColumnConfig>) -> Self {
        self.right_sticky = configs;
        self
    }

    /// Put resize handles on the header separators. Default: `true`.
    ///
    /// [`GridColumn::resizable`] overrides this per column.
    #[inline]
    pub fn enable_column_resizing(mut self, resizable: bool) -> Self {
        self.options.resizable = resizable;
        self
    }

    #[inline]
    pub fn resize_mode(mut self, resize_mode: ColumnResizeMode) -> Self {
        self.options.resize_mode = resize_mode;
        self
    }

    /// Align the first visible row with the header once scrolling stops. Default: `true`.
    #[inline]
    pub fn enable_scroll_snap(mut self, enable: bool) -> Self {
        self.options.scroll_snap = enable;
        self
    }

    /// Shorthand for setting [`ScrollSnapConfig::delay`].
    #[inline]
    pub fn scroll_snap_delay(mut self, delay: Duration) -> Self {
        self.options.snap_config.delay = delay;
        self
    }

    #[inline]
    pub fn scroll_snap_config(mut self, config: ScrollSnapConfig) -> Self {
        self.options.snap_config = config;
        self
    }

    /// Called the first time the column layout of this grid is built, and again every time the
    /// column ids or the sticky configuration change.
    #[inline]
    pub fn on_table_ready(mut self, on_ready: impl FnOnce(&GridHandle) + 'a) -> Self {
        self.on_table_ready = Some(Box::new(on_ready));
        self
    }

    /// Content shown in a full-width row below a row. Return `None` for rows without one.
    ///
    /// Called for every row, every frame, to lay out the body, and once more for every visible
    /// expansion row. With many rows, pair it with [`Self::has_expanded_row`] so the content is
    /// only built for the rows on screen.
    #[inline]
    pub fn expanded_row_render(
        mut self,
        render: impl for<'r> Fn(&'r T, usize) -> Option<CellContent<'r>> + 'a,
    ) -> Self {
        self.expanded_row_render = Some(Box::new(render));
        self
    }

    /// Decides which rows have an expansion row in place of calling
    /// [`Self::expanded_row_render`] for every row.
    ///
    /// Must agree with `expanded_row_render`: a row it accepts but the renderer returns `None`
    /// for is left as an empty band.
    #[inline]
    pub fn has_expanded_row(mut self, has_expansion: impl Fn(&T, usize) -> bool + 'a) -> Self {
        self.has_expanded_row = Some(Box::new(has_expansion));
        self
    }

    /// Height of each row. Default: `48.0`.
    #[inline]
    pub fn row_height(mut self, height: f32) -> Self {
        self.options.row_height = height;
        self
    }

    /// Default: `40.0`.
    #[inline]
    pub fn header_height(mut self, height: f32) -> Self {
        self.options.header_height = height;
        self
    }

    /// Height assumed for an expansion row until it has been measured. Default: `96.0`.
    #[inline]
    pub fn expansion_height_hint(mut self, height: f32) -> Self {
        self.options.expansion_height_hint = height;
        self
    }

    /// Below this available width the grid renders as cards. Default: `768.0`.
    #[inline]
    pub fn mobile_breakpoint(mut self, width: f32) -> Self {
        self.options.mobile_breakpoint = width;
        self
    }

    /// Enable striped row background for improved readability.
    ///
    /// Default is whatever is in [`egui::Visuals::striped`].
    #[inline]
    pub fn striped(mut self, striped: bool) -> Self {
        self.options.striped = Some(striped);
        self
    }

    #[inline]
    pub fn style(mut self, style: GridStyle) -> Self {
        self.options.style = style;
        self
    }

    /// The grid takes at most this much height, and scrolls beyond it.
    #[inline]
    pub fn max_height(mut self, max_height: f32) -> Self {
        self.options.max_height = Some(max_height);
        self
    }

    pub fn show(self, ui: &mut Ui) -> GridResponse {
        profiling::function_scope!();

        let Self {
            data,
            columns,
            loading,
            error,
            empty_content,
            left_sticky,
            right_sticky,
            on_table_ready,
            expanded_row_render,
            has_expanded_row,
            id_salt,
            options,
        } = self;

        let id = ui.id().with(id_salt);
        let rect = Rect::from_min_size(ui.available_rect_before_wrap().min, Vec2::ZERO);
        ui.ctx().check_for_id_clash(id, rect, "DataGrid");

        let mut memory = ui
            .data_mut(|d| d.get_temp::<GridMemory>(id))
            .unwrap_or_default();

        // A snap left pending while the grid was hidden must not fire when it comes back.
        let pass = ui.ctx().cumulative_pass_nr();
        if memory.last_pass.is_some_and(|last| last + 1 < pass) {
            memory.engine.cancel();
        }
        memory.last_pass = Some(pass);

        let left_sticky = left_sticky.unwrap_or_else(|| {
            if columns.is_empty() {
                Vec::new()
            } else {
                vec![StickyColumnConfig::new(0, 60.0)]
            }
        });
        let column_ids: Vec<&str> = columns.iter().map(GridColumn::id).collect();

        let key = layout_key(&column_ids, &left_sticky, &right_sticky);
        let layout_changed = memory.layout_key != Some(key);
        if layout_changed {
            memory.model = match ColumnModel::new(&column_ids, &left_sticky, &right_sticky) {
                Ok(model) => model,
                Err(err) => {
                    crate::log_or_panic!("DataGrid {id:?}: {err}");
                    ColumnModel::without_sticky(&column_ids)
                }
            };
            memory.layout_key = Some(key);
            memory.expansion_heights.clear();

            if expanded_row_render.is_some() && memory.model.first_scrollable().is_none() {
                log::debug!("Every column of DataGrid {id:?} is frozen; expansion content is dropped");
            }
        }
        memory.expansion_heights.retain(|row, _| *row < data.len());

        let mode = classify_viewport(ui.available_width(), options.mobile_breakpoint);
        if memory.mode != Some(mode) {
            if let Some(previous) = memory.mode {
                log::debug!("DataGrid {id:?} switched from {previous:?} to {mode:?} layout");
            }
            memory.mode = Some(mode);
        }

        let surface = GridSurface::resolve(loading, error.is_some(), data.len());
        let state_content = match surface {
            GridSurface::Error => error,
            GridSurface::Empty => Some(empty_content.unwrap_or_else(|| {
                CellContent::Text(RichText::new("No data").weak().into())
            })),
            GridSurface::Loading | GridSurface::Ready => None,
        };

        let (scroll_offset, snap_target) = match mode {
            RenderMode::Mobile => {
                memory.engine.cancel();
                let offset = MobileView {
                    id,
                    data,
                    columns: &columns,
                    surface,
                    state_content,
                    options: &options,
                }
                .show(ui);
                (offset, None)
            }
            RenderMode::Desktop => {
                let sizing_id = sizing_id(id);
                let mut sizing = SizingState::load(ui.ctx(), sizing_id);
                sizing.sync(
                    columns
                        .iter()
                        .enumerate()
                        .filter(|(index, _)| !memory.model.is_sticky(*index))
                        .map(|(_, column)| {
                            (column.id(), column.declared_width(), column.width_range())
                        }),
                );

                let output = DesktopView {
                    id,
                    data,
                    columns: &columns,
                    model: &memory.model,
                    expansion: expanded_row_render.as_deref(),
                    has_expansion: has_expanded_row.as_deref(),
                    surface,
                    state_content,
                    options: &options,
                }
                .show(
                    ui,
                    &mut sizing,
                    &mut memory.engine,
                    &mut memory.expansion_heights,
                );

                sizing.store(ui.ctx(), sizing_id);
                (output.scroll_offset, output.snap_target)
            }
        };

        let handle = GridHandle {
            id,
            column_ids: memory.model.column_ids().to_vec(),
        };
        ui.data_mut(|d| d.insert_temp(id, memory));

        if layout_changed && let Some(on_ready) = on_table_ready {
            log::debug!(
                "DataGrid {id:?} ready with {} columns",
                handle.column_ids.len()
            );
            on_ready(&handle);
        }

        GridResponse {
            mode,
            surface,
            scroll_offset,
            snap_target,
            handle,
        }
    }
}

fn sizing_id(id: Id) -> Id {
    id.with("sizing")
}

// ----------------------------------------------------------------------------

/// What [`DataGrid::show`] did this frame.
#[derive(Clone, Debug)]
pub struct GridResponse {
    pub mode: RenderMode,
    pub surface: GridSurface,

    /// Scroll offset of whichever layout was shown.
    pub scroll_offset: Vec2,

    /// Set on the frame a snap animation starts, to the offset it is heading for.
    pub snap_target: Option<f32>,

    pub handle: GridHandle,
}

/// Access to a grid's state from outside its `show` call.
#[derive(Clone, Debug)]
pub struct GridHandle {
    id: Id,
    column_ids: Vec<String>,
}

impl GridHandle {
    /// The id the grid keeps its state under.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn column_ids(&self) -> &[String] {
        &self.column_ids
    }

    /// The current column widths.
    pub fn sizing(&self, ctx: &egui::Context) -> SizingState {
        SizingState::load(ctx, sizing_id(self.id))
    }

    /// Replace the column widths, e.g. with ones saved from an earlier session.
    ///
    /// Columns the grid no longer has are dropped on its next frame.
    pub fn set_sizing(&self, ctx: &egui::Context, sizing: SizingState) {
        sizing.store(ctx, sizing_id(self.id));
    }

    /// Restore one column to its declared width.
    pub fn reset_column_size(&self, ctx: &egui::Context, column_id: &str) {
        let mut sizing = self.sizing(ctx);
        sizing.reset(column_id);
        sizing.store(ctx, sizing_id(self.id));
    }

    pub fn reset_all_sizes(&self, ctx: &egui::Context) {
        let mut sizing = self.sizing(ctx);
        sizing.reset_all();
        sizing.store(ctx, sizing_id(self.id));
    }

    pub fn scroll_snap_phase(&self, ctx: &egui::Context) -> SnapPhase {
        ctx.data_mut(|d| d.get_temp::<GridMemory>(self.id))
            .map(|memory| memory.engine.phase())
            .unwrap_or_default()
    }
}
