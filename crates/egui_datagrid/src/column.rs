//! Column definitions, sticky-column configuration and the content a cell renders.

use egui::{Rangef, RichText, Ui, WidgetText};

// ----------------------------------------------------------------------------

/// Which edge of the grid a frozen column sticks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, enum_map::Enum)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StickySide {
    Left,
    Right,
}

/// Refers to a column either by its identifier or by its position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ColumnRef {
    /// Matches the column whose [`GridColumn::id`] equals this string.
    Id(String),

    /// Matches the column at this position in the column list.
    Index(usize),
}

impl ColumnRef {
    /// Does this reference point at the column `id` at position `index`?
    pub fn matches(&self, id: &str, index: usize) -> bool {
        match self {
            Self::Id(wanted) => wanted == id,
            Self::Index(wanted) => *wanted == index,
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_owned())
    }
}

impl From<String> for ColumnRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "column {id:?}"),
            Self::Index(index) => write!(f, "column #{index}"),
        }
    }
}

/// A frozen column: which column, and how wide it is.
///
/// The widths are fixed magnitudes in points. `max_width` is both the width the cell is
/// painted with and the amount it contributes to the offsets of the sticky columns after it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StickyColumnConfig {
    pub column: ColumnRef,
    pub min_width: f32,
    pub max_width: f32,
}

impl StickyColumnConfig {
    /// A sticky column that is always exactly `width` wide.
    pub fn new(column: impl Into<ColumnRef>, width: f32) -> Self {
        Self {
            column: column.into(),
            min_width: width,
            max_width: width,
        }
    }

    #[inline]
    pub fn min_width(mut self, min_width: f32) -> Self {
        self.min_width = min_width;
        self
    }

    #[inline]
    pub fn max_width(mut self, max_width: f32) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn width_range(&self) -> Rangef {
        Rangef::new(self.min_width, self.max_width)
    }
}

// ----------------------------------------------------------------------------

/// What a cell shows.
///
/// The variant is the structural marker the narrow card layout looks at:
/// [`CellContent::Actions`] is rendered full width and without a label, everything else
/// becomes a label/value pair.
pub enum CellContent<'a> {
    Empty,
    Text(WidgetText),
    Widget(Box<dyn FnOnce(&mut Ui) + 'a>),

    /// A cluster of buttons (edit, delete, …) for the row.
    Actions(Box<dyn FnOnce(&mut Ui) + 'a>),
}

impl<'a> CellContent<'a> {
    pub fn text(text: impl Into<WidgetText>) -> Self {
        Self::Text(text.into())
    }

    pub fn widget(add_contents: impl FnOnce(&mut Ui) + 'a) -> Self {
        Self::Widget(Box::new(add_contents))
    }

    pub fn actions(add_contents: impl FnOnce(&mut Ui) + 'a) -> Self {
        Self::Actions(Box::new(add_contents))
    }

    #[inline]
    pub fn is_action_cluster(&self) -> bool {
        matches!(self, Self::Actions(_))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Add the content to `ui`. Action clusters are laid out left to right and wrap.
    pub fn show(self, ui: &mut Ui) {
        match self {
            Self::Empty => {}
            Self::Text(text) => {
                ui.label(text);
            }
            Self::Widget(add_contents) => add_contents(ui),
            Self::Actions(add_contents) => {
                ui.horizontal_wrapped(|ui| add_contents(ui));
            }
        }
    }
}

impl std::fmt::Debug for CellContent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Text(text) => f.debug_tuple("Text").field(&text.text()).finish(),
            Self::Widget(_) => f.write_str("Widget(..)"),
            Self::Actions(_) => f.write_str("Actions(..)"),
        }
    }
}

impl From<&str> for CellContent<'_> {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for CellContent<'_> {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<RichText> for CellContent<'_> {
    fn from(text: RichText) -> Self {
        Self::text(text)
    }
}

impl From<WidgetText> for CellContent<'_> {
    fn from(text: WidgetText) -> Self {
        Self::Text(text)
    }
}

// ----------------------------------------------------------------------------

type CellRenderer<'a, T> = Box<dyn for<'r> Fn(&'r T, usize) -> CellContent<'r> + 'a>;

/// One column of a [`crate::DataGrid`]: identifier, header, how to render a cell, and how wide
/// it is.
///
/// The same definition drives both the table layout and the narrow card layout.
pub struct GridColumn<'a, T> {
    id: String,
    header: WidgetText,
    cell: CellRenderer<'a, T>,
    initial_width: f32,
    width_range: Rangef,
    resizable: Option<bool>,
}

impl<'a, T> GridColumn<'a, T> {
    /// `id` must be unique within the grid. `cell` is called with the row and its index.
    pub fn new(
        id: impl Into<String>,
        header: impl Into<WidgetText>,
        cell: impl for<'r> Fn(&'r T, usize) -> CellContent<'r> + 'a,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            cell: Box::new(cell),
            initial_width: 150.0,
            width_range: Rangef::new(40.0, f32::INFINITY),
            resizable: None,
        }
    }

    /// Declared width, in points. This is what a double-click on the resize handle restores.
    ///
    /// Default: `150.0`.
    #[inline]
    pub fn initial(mut self, width: f32) -> Self {
        self.initial_width = width;
        self
    }

    /// Won't shrink below this width (in points).
    ///
    /// Default: `40.0`
    #[inline]
    pub fn at_least(mut self, minimum: f32) -> Self {
        self.width_range.min = minimum;
        self
    }

    /// Won't grow above this width (in points).
    ///
    /// Default: [`f32::INFINITY`]
    #[inline]
    pub fn at_most(mut self, maximum: f32) -> Self {
        self.width_range.max = maximum;
        self
    }

    /// Allowed range of movement (in points), if resizing is enabled.
    #[inline]
    pub fn range(mut self, range: impl Into<Rangef>) -> Self {
        self.width_range = range.into();
        self
    }

    /// Can this column be resized by dragging the header separator?
    ///
    /// If you don't call this, [`crate::DataGrid::enable_column_resizing`] decides.
    /// Sticky columns are never resizable.
    #[inline]
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = Some(resizable);
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn header(&self) -> &WidgetText {
        &self.header
    }

    /// The declared width, clamped into the width range.
    pub fn declared_width(&self) -> f32 {
        self.width_range.clamp(self.initial_width)
    }

    #[inline]
    pub fn width_range(&self) -> Rangef {
        self.width_range
    }

    pub fn is_resizable(&self, fallback: bool) -> bool {
        self.resizable.unwrap_or(fallback)
    }

    /// Render the cell of this column for `row`.
    pub fn cell<'r>(&self, row: &'r T, row_index: usize) -> CellContent<'r> {
        (self.cell)(row, row_index)
    }
}

impl<T> std::fmt::Debug for GridColumn<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridColumn")
            .field("id", &self.id)
            .field("header", &self.header.text())
            .field("initial_width", &self.initial_width)
            .field("width_range", &self.width_range)
            .field("resizable", &self.resizable)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User {
        name: String,
    }

    #[test]
    fn column_ref_matches_by_id_or_position() {
        let by_id = ColumnRef::from("name");
        assert!(by_id.matches("name", 3));
        assert!(!by_id.matches("email", 3));

        let by_index = ColumnRef::from(2);
        assert!(by_index.matches("anything", 2));
        assert!(!by_index.matches("anything", 1));
    }

    #[test]
    fn declared_width_respects_range() {
        let column = GridColumn::new("name", "Name", |row: &User, _| {
            CellContent::text(row.name.as_str())
        })
        .initial(20.0)
        .at_least(50.0);
        assert_eq!(column.declared_width(), 50.0);
    }

    #[test]
    fn cell_renderer_sees_the_row() {
        let column = GridColumn::new("name", "Name", |row: &User, index| {
            CellContent::text(format!("{index}: {}", row.name))
        });
        let user = User {
            name: "ada".to_owned(),
        };
        match column.cell(&user, 4) {
            CellContent::Text(text) => assert_eq!(text.text(), "4: ada"),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn only_actions_are_action_clusters() {
        assert!(CellContent::actions(|_ui| {}).is_action_cluster());
        assert!(!CellContent::widget(|_ui| {}).is_action_cluster());
        assert!(!CellContent::from("x").is_action_cluster());
        assert!(!CellContent::Empty.is_action_cluster());
    }
}
