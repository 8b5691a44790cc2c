//! Per-column width state, driven only by resize gestures.

use egui::{Id, Rangef};

/// How a drag on a resize handle is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColumnResizeMode {
    /// Header and body cells follow the drag.
    #[default]
    Live,

    /// Only the header follows the drag; body cells take the new width on release.
    Deferred,
}

/// The size tokens of one column.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ColumnSize {
    /// Width from the column definition. Restored on reset.
    pub declared: f32,

    /// Width of the header cell.
    pub header: f32,

    /// Width of the body cells.
    pub cell: f32,

    pub range: Rangef,
}

impl ColumnSize {
    fn new(declared: f32, range: Rangef) -> Self {
        let declared = range.clamp(declared);
        Self {
            declared,
            header: declared,
            cell: declared,
            range,
        }
    }

    pub fn is_resized(&self) -> bool {
        self.header != self.declared || self.cell != self.declared
    }
}

/// Column identifier → current widths, for one grid.
///
/// Each operation touches exactly one column's tokens, so a resize never relayouts the others.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SizingState {
    sizes: ahash::HashMap<String, ColumnSize>,
}

impl SizingState {
    /// Bring the state in line with the current column definitions.
    ///
    /// New columns start at their declared width and removed ones are forgotten. When a
    /// declaration changes, columns nobody has resized follow it.
    pub fn sync<'s>(&mut self, columns: impl IntoIterator<Item = (&'s str, f32, Rangef)>) {
        let mut seen = ahash::HashSet::default();
        for (id, declared, range) in columns {
            seen.insert(id.to_owned());
            match self.sizes.get_mut(id) {
                Some(size) => {
                    let declared = range.clamp(declared);
                    if size.declared != declared || size.range != range {
                        let was_resized = size.is_resized();
                        size.declared = declared;
                        size.range = range;
                        if was_resized {
                            size.header = range.clamp(size.header);
                            size.cell = range.clamp(size.cell);
                        } else {
                            size.header = declared;
                            size.cell = declared;
                        }
                    }
                }
                None => {
                    self.sizes
                        .insert(id.to_owned(), ColumnSize::new(declared, range));
                }
            }
        }
        self.sizes.retain(|id, _| seen.contains(id));
    }

    pub fn get(&self, id: &str) -> Option<&ColumnSize> {
        self.sizes.get(id)
    }

    pub fn header_size(&self, id: &str) -> Option<f32> {
        self.sizes.get(id).map(|size| size.header)
    }

    pub fn cell_size(&self, id: &str) -> Option<f32> {
        self.sizes.get(id).map(|size| size.cell)
    }

    pub fn declared_size(&self, id: &str) -> Option<f32> {
        self.sizes.get(id).map(|size| size.declared)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Apply a drag of `delta` points to the handle of column `id`.
    ///
    /// Returns the new header width.
    pub fn drag(&mut self, id: &str, delta: f32, mode: ColumnResizeMode) -> Option<f32> {
        let size = self.sizes.get_mut(id)?;
        size.header = size.range.clamp(size.header + delta);
        if mode == ColumnResizeMode::Live {
            size.cell = size.header;
        }
        Some(size.header)
    }

    /// The drag on column `id` ended: body cells take the header width.
    pub fn commit(&mut self, id: &str) {
        if let Some(size) = self.sizes.get_mut(id) {
            size.cell = size.header;
        }
    }

    /// Restore column `id` to its declared width.
    pub fn reset(&mut self, id: &str) {
        if let Some(size) = self.sizes.get_mut(id) {
            size.header = size.declared;
            size.cell = size.declared;
        }
    }

    pub fn reset_all(&mut self) {
        for size in self.sizes.values_mut() {
            size.header = size.declared;
            size.cell = size.declared;
        }
    }

    pub(crate) fn load(ctx: &egui::Context, id: Id) -> Self {
        #[cfg(feature = "serde")]
        {
            ctx.data_mut(|d| d.get_persisted::<Self>(id)).unwrap_or_default()
        }
        #[cfg(not(feature = "serde"))]
        {
            ctx.data_mut(|d| d.get_temp::<Self>(id)).unwrap_or_default()
        }
    }

    pub(crate) fn store(self, ctx: &egui::Context, id: Id) {
        #[cfg(feature = "serde")]
        {
            ctx.data_mut(|d| d.insert_persisted(id, self));
        }
        #[cfg(not(feature = "serde"))]
        {
            ctx.data_mut(|d| d.insert_temp(id, self));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SizingState {
        let mut state = SizingState::default();
        state.sync([
            ("name", 150.0, Rangef::new(40.0, 400.0)),
            ("email", 200.0, Rangef::new(40.0, f32::INFINITY)),
            ("role", 90.0, Rangef::new(40.0, f32::INFINITY)),
        ]);
        state
    }

    #[test]
    fn resizing_one_column_leaves_the_others_alone() {
        let mut state = state();
        let before_email = *state.get("email").unwrap();
        let before_role = *state.get("role").unwrap();

        assert_eq!(state.drag("name", 30.0, ColumnResizeMode::Live), Some(180.0));

        assert_eq!(state.header_size("name"), Some(180.0));
        assert_eq!(state.cell_size("name"), Some(180.0));
        assert_eq!(state.get("email"), Some(&before_email));
        assert_eq!(state.get("role"), Some(&before_role));
    }

    #[test]
    fn drag_is_clamped_to_the_range() {
        let mut state = state();
        state.drag("name", 1000.0, ColumnResizeMode::Live);
        assert_eq!(state.cell_size("name"), Some(400.0));
        state.drag("name", -1000.0, ColumnResizeMode::Live);
        assert_eq!(state.cell_size("name"), Some(40.0));
    }

    #[test]
    fn deferred_drag_commits_on_release() {
        let mut state = state();
        state.drag("email", -50.0, ColumnResizeMode::Deferred);
        assert_eq!(state.header_size("email"), Some(150.0));
        assert_eq!(state.cell_size("email"), Some(200.0));

        state.commit("email");
        assert_eq!(state.cell_size("email"), Some(150.0));
    }

    #[test]
    fn reset_restores_the_declared_width() {
        let mut state = state();
        state.drag("role", 25.0, ColumnResizeMode::Live);
        state.drag("name", 25.0, ColumnResizeMode::Live);
        state.reset("role");

        assert_eq!(state.cell_size("role"), Some(90.0));
        assert!(!state.get("role").unwrap().is_resized());
        assert_eq!(state.cell_size("name"), Some(175.0));

        state.reset_all();
        assert_eq!(state.cell_size("name"), Some(150.0));
    }

    #[test]
    fn sync_keeps_user_widths_and_drops_removed_columns() {
        let mut state = state();
        state.drag("name", 10.0, ColumnResizeMode::Live);

        state.sync([
            ("name", 150.0, Rangef::new(40.0, 400.0)),
            ("role", 120.0, Rangef::new(40.0, f32::INFINITY)),
        ]);

        assert_eq!(state.len(), 2);
        assert_eq!(state.cell_size("name"), Some(160.0));
        assert_eq!(state.cell_size("role"), Some(120.0));
        assert_eq!(state.declared_size("role"), Some(120.0));
        assert_eq!(state.get("email"), None);
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let mut state = state();
        assert_eq!(state.drag("nope", 10.0, ColumnResizeMode::Live), None);
        state.reset("nope");
        state.commit("nope");
        assert_eq!(state, self::state());
    }
}
