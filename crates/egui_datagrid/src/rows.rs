//! Vertical layout of the body: main rows, expansion rows beneath them, and which cells an
//! expansion row is made of.

use std::ops::Range;

use egui::Rangef;

use crate::column::StickySide;
use crate::column_model::ColumnModel;
use crate::scroll_snap::RowSpan;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Main,
    Expansion,
}

/// One rendered row of the body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySpan {
    /// Index into the data.
    pub row: usize,
    pub kind: SpanKind,

    /// In content coordinates (below the header).
    pub top: f32,
    pub height: f32,
}

impl BodySpan {
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Where every main and expansion row of the body goes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyLayout {
    spans: Vec<BodySpan>,
    bottom: f32,
}

impl BodyLayout {
    /// `has_expansion[i]` says whether row `i` has an expansion row, and `expansion_height`
    /// how tall it is.
    pub fn new(
        header_height: f32,
        row_height: f32,
        has_expansion: &[bool],
        mut expansion_height: impl FnMut(usize) -> f32,
    ) -> Self {
        profiling::function_scope!();

        let mut spans = Vec::with_capacity(has_expansion.len());
        let mut y = header_height;
        for (row, &expands) in has_expansion.iter().enumerate() {
            spans.push(BodySpan {
                row,
                kind: SpanKind::Main,
                top: y,
                height: row_height,
            });
            y += row_height;

            if expands {
                let height = expansion_height(row);
                spans.push(BodySpan {
                    row,
                    kind: SpanKind::Expansion,
                    top: y,
                    height,
                });
                y += height;
            }
        }

        Self { spans, bottom: y }
    }

    #[inline]
    pub fn spans(&self) -> &[BodySpan] {
        &self.spans
    }

    /// Height of header plus body.
    #[inline]
    pub fn content_height(&self) -> f32 {
        self.bottom
    }

    /// The spans intersecting `y_range` (content coordinates), as an index range into
    /// [`Self::spans`].
    pub fn visible(&self, y_range: Rangef) -> Range<usize> {
        let first = self.spans.partition_point(|span| span.bottom() <= y_range.min);
        let end = self.spans.partition_point(|span| span.top < y_range.max);
        first..end.max(first)
    }

    /// The spans as the scroll-snap engine sees them.
    pub fn row_spans(&self) -> Vec<RowSpan> {
        self.spans
            .iter()
            .map(|span| RowSpan {
                top: span.top,
                height: span.height,
            })
            .collect()
    }
}

// ----------------------------------------------------------------------------

/// A cell of an expansion row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExpansionCell {
    /// Empty cell keeping the border of a frozen column continuous.
    Placeholder {
        column: usize,
        side: StickySide,
        offset: f32,
        width: f32,
    },

    /// The expansion content, starting at `column` and spanning `span` scrolling columns.
    Content { column: usize, span: usize },
}

/// The cells of an expansion row, in column order.
///
/// Every frozen column gets a placeholder at its offset; the first scrolling column holds the
/// content spanning all scrolling columns; the other scrolling positions are omitted.
pub fn plan_expansion_row(model: &ColumnModel) -> Vec<ExpansionCell> {
    let span = model.scrollable_columns().count();
    let first_scrollable = model.first_scrollable();

    let mut cells = Vec::with_capacity(model.sticky_count() + 1);
    for column in 0..model.len() {
        if let Some(sticky) = model.sticky(column) {
            let offset = match sticky.side {
                StickySide::Left => model.left_offset(column),
                StickySide::Right => model.right_offset(column),
            };
            cells.push(ExpansionCell::Placeholder {
                column,
                side: sticky.side,
                offset,
                width: sticky.max_width,
            });
        } else if Some(column) == first_scrollable {
            cells.push(ExpansionCell::Content { column, span });
        }
    }
    cells
}

/// Which horizontal borders a row pair draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowBorders {
    pub main_bottom: bool,
    pub expansion_top_dashed: bool,
    pub expansion_bottom: bool,
}

impl RowBorders {
    /// A row with an expansion hands its bottom border to the expansion row, so the pair
    /// reads as one block.
    pub fn for_row(has_expansion: bool) -> Self {
        Self {
            main_bottom: !has_expansion,
            expansion_top_dashed: has_expansion,
            expansion_bottom: has_expansion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::StickyColumnConfig;

    fn model() -> ColumnModel {
        let ids = ["select", "id", "name", "email", "actions"];
        ColumnModel::new(
            &ids,
            &[
                StickyColumnConfig::new(0, 40.0),
                StickyColumnConfig::new("id", 60.0),
            ],
            &[StickyColumnConfig::new("actions", 100.0)],
        )
        .unwrap()
    }

    #[test]
    fn expansion_row_has_one_placeholder_per_sticky_column() {
        let model = model();
        let cells = plan_expansion_row(&model);

        let placeholders = cells
            .iter()
            .filter(|cell| matches!(cell, ExpansionCell::Placeholder { .. }))
            .count();
        assert_eq!(placeholders, model.sticky_count());
        assert_eq!(
            cells,
            vec![
                ExpansionCell::Placeholder {
                    column: 0,
                    side: StickySide::Left,
                    offset: 0.0,
                    width: 40.0
                },
                ExpansionCell::Placeholder {
                    column: 1,
                    side: StickySide::Left,
                    offset: 40.0,
                    width: 60.0
                },
                ExpansionCell::Content { column: 2, span: 2 },
                ExpansionCell::Placeholder {
                    column: 4,
                    side: StickySide::Right,
                    offset: 0.0,
                    width: 100.0
                },
            ]
        );
    }

    #[test]
    fn all_sticky_columns_leave_no_room_for_content() {
        let model =
            ColumnModel::new(&["a"], &[StickyColumnConfig::new(0, 60.0)], &[]).unwrap();
        assert_eq!(
            plan_expansion_row(&model),
            vec![ExpansionCell::Placeholder {
                column: 0,
                side: StickySide::Left,
                offset: 0.0,
                width: 60.0
            }]
        );
    }

    #[test]
    fn expansion_rows_sit_under_their_row() {
        let layout = BodyLayout::new(40.0, 48.0, &[false, true, false], |_| 100.0);
        let spans = layout.spans();

        assert_eq!(spans.len(), 4);
        assert_eq!((spans[0].row, spans[0].kind, spans[0].top), (0, SpanKind::Main, 40.0));
        assert_eq!((spans[1].row, spans[1].kind, spans[1].top), (1, SpanKind::Main, 88.0));
        assert_eq!(
            (spans[2].row, spans[2].kind, spans[2].top, spans[2].height),
            (1, SpanKind::Expansion, 136.0, 100.0)
        );
        assert_eq!((spans[3].row, spans[3].kind, spans[3].top), (2, SpanKind::Main, 236.0));
        assert_eq!(layout.content_height(), 284.0);
    }

    #[test]
    fn visible_range_covers_intersecting_spans_only() {
        let layout = BodyLayout::new(0.0, 10.0, &[false; 10], |_| 0.0);

        assert_eq!(layout.visible(Rangef::new(0.0, 10.0)), 0..1);
        assert_eq!(layout.visible(Rangef::new(5.0, 25.0)), 0..3);
        assert_eq!(layout.visible(Rangef::new(10.0, 20.0)), 1..2);
        assert_eq!(layout.visible(Rangef::new(95.0, 200.0)), 9..10);
        assert_eq!(layout.visible(Rangef::new(150.0, 200.0)), 10..10);
    }

    #[test]
    fn borders_move_to_the_expansion_row() {
        assert_eq!(
            RowBorders::for_row(false),
            RowBorders {
                main_bottom: true,
                expansion_top_dashed: false,
                expansion_bottom: false
            }
        );
        let expanded = RowBorders::for_row(true);
        assert!(!expanded.main_bottom);
        assert!(expanded.expansion_bottom);
    }
}
