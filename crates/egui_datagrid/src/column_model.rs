//! Resolves the sticky-column configuration against the column list and precomputes the
//! offsets every sticky cell is painted at.

use std::hash::{BuildHasher as _, Hash as _, Hasher as _};

use enum_map::EnumMap;

use crate::column::{ColumnRef, StickyColumnConfig, StickySide};

// ----------------------------------------------------------------------------

/// A malformed grid configuration.
///
/// These would otherwise paint sticky borders at the wrong place, so they are detected when the
/// [`ColumnModel`] is built.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Two columns share an identifier.
    DuplicateColumnId { id: String, first: usize, second: usize },

    /// A sticky config refers to a column that does not exist.
    UnresolvedSticky { side: StickySide, column: ColumnRef },

    /// A column is matched by position in one sticky config and by identifier in another,
    /// or by both the left and the right list.
    ConflictingSticky { column_id: String, index: usize },

    /// `min_width > max_width`, or a negative or non-finite width.
    InvalidStickyWidth {
        column: ColumnRef,
        min_width: f32,
        max_width: f32,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateColumnId { id, first, second } => {
                write!(f, "duplicate column id {id:?} at positions {first} and {second}")
            }
            Self::UnresolvedSticky { side, column } => {
                write!(f, "{side:?} sticky config refers to {column}, which does not exist")
            }
            Self::ConflictingSticky { column_id, index } => write!(
                f,
                "column {column_id:?} (#{index}) is matched by more than one sticky config"
            ),
            Self::InvalidStickyWidth {
                column,
                min_width,
                max_width,
            } => write!(
                f,
                "sticky config for {column} has invalid widths (min {min_width}, max {max_width})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ----------------------------------------------------------------------------

/// How a column is frozen, once resolved against its config.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StickyCell {
    pub side: StickySide,

    /// Index of the matching config within its side's list.
    pub config_index: usize,
    pub min_width: f32,
    pub max_width: f32,
}

/// The sticky layout of one column list.
///
/// Built once per structural change (column ids or sticky configs) and then shared by the
/// header, every body row and every expansion row of a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnModel {
    ids: Vec<String>,
    configs: EnumMap<StickySide, Vec<StickyColumnConfig>>,
    sticky: Vec<Option<StickyCell>>,

    /// `left_offsets[i]`: summed `max_width` of the left-sticky columns before `i`.
    left_offsets: Vec<f32>,

    /// `right_offsets[i]`: summed `max_width` of the right-sticky columns after `i`.
    right_offsets: Vec<f32>,
}

impl ColumnModel {
    /// Validate the configuration and precompute the offsets.
    pub fn new<S: AsRef<str>>(
        column_ids: &[S],
        left: &[StickyColumnConfig],
        right: &[StickyColumnConfig],
    ) -> Result<Self, ConfigError> {
        profiling::function_scope!();

        let ids: Vec<String> = column_ids.iter().map(|id| id.as_ref().to_owned()).collect();

        for (second, id) in ids.iter().enumerate() {
            if let Some(first) = ids[..second].iter().position(|other| other == id) {
                return Err(ConfigError::DuplicateColumnId {
                    id: id.clone(),
                    first,
                    second,
                });
            }
        }

        let mut configs = EnumMap::default();
        configs[StickySide::Left] = left.to_vec();
        configs[StickySide::Right] = right.to_vec();

        for (side, list) in &configs {
            for config in list {
                validate_config(side, config, &ids)?;
            }
        }

        let mut sticky = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            sticky.push(resolve_column(&configs, id, index)?);
        }

        let mut model = Self {
            ids,
            configs,
            sticky,
            left_offsets: Vec::new(),
            right_offsets: Vec::new(),
        };
        model.compute_offsets();
        Ok(model)
    }

    /// A model with no frozen columns. Used as the fallback for a bad configuration.
    pub fn without_sticky<S: AsRef<str>>(column_ids: &[S]) -> Self {
        let ids: Vec<String> = column_ids.iter().map(|id| id.as_ref().to_owned()).collect();
        let n = ids.len();
        Self {
            ids,
            configs: EnumMap::default(),
            sticky: vec![None; n],
            left_offsets: vec![0.0; n],
            right_offsets: vec![0.0; n],
        }
    }

    fn compute_offsets(&mut self) {
        let n = self.sticky.len();

        self.left_offsets = Vec::with_capacity(n);
        let mut offset = 0.0;
        for cell in &self.sticky {
            self.left_offsets.push(offset);
            if let Some(cell) = cell
                && cell.side == StickySide::Left
            {
                offset += cell.max_width;
            }
        }

        self.right_offsets = vec![0.0; n];
        let mut offset = 0.0;
        for (index, cell) in self.sticky.iter().enumerate().rev() {
            self.right_offsets[index] = offset;
            if let Some(cell) = cell
                && cell.side == StickySide::Right
            {
                offset += cell.max_width;
            }
        }
    }

    /// First config (left list, then right list, in list order) matching the column `id` at
    /// position `index`.
    pub fn resolve_sticky_config(
        &self,
        id: &str,
        index: usize,
    ) -> Option<(StickySide, &StickyColumnConfig)> {
        self.configs.iter().find_map(|(side, list)| {
            list.iter()
                .find(|config| config.column.matches(id, index))
                .map(|config| (side, config))
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn column_ids(&self) -> &[String] {
        &self.ids
    }

    pub fn configs(&self, side: StickySide) -> &[StickyColumnConfig] {
        &self.configs[side]
    }

    /// How the column at `index` is frozen, if it is.
    #[inline]
    pub fn sticky(&self, index: usize) -> Option<StickyCell> {
        self.sticky.get(index).copied().flatten()
    }

    #[inline]
    pub fn is_sticky(&self, index: usize) -> bool {
        self.sticky(index).is_some()
    }

    /// Left offset of the column at `index`. Meaningful only for left-sticky columns, but
    /// defined for every position.
    #[inline]
    pub fn left_offset(&self, index: usize) -> f32 {
        self.left_offsets.get(index).copied().unwrap_or(0.0)
    }

    /// Right offset of the column at `index`. Meaningful only for right-sticky columns, but
    /// defined for every position.
    #[inline]
    pub fn right_offset(&self, index: usize) -> f32 {
        self.right_offsets.get(index).copied().unwrap_or(0.0)
    }

    /// Total width frozen against `side`.
    pub fn sticky_width(&self, side: StickySide) -> f32 {
        self.sticky
            .iter()
            .flatten()
            .filter(|cell| cell.side == side)
            .map(|cell| cell.max_width)
            .sum()
    }

    /// Number of frozen columns, both sides.
    pub fn sticky_count(&self) -> usize {
        self.sticky.iter().flatten().count()
    }

    /// Positions of the columns that scroll horizontally.
    pub fn scrollable_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.sticky
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(index, _)| index)
    }

    pub fn first_scrollable(&self) -> Option<usize> {
        self.scrollable_columns().next()
    }
}

fn validate_config(
    side: StickySide,
    config: &StickyColumnConfig,
    ids: &[String],
) -> Result<(), ConfigError> {
    let widths_ok = config.min_width.is_finite()
        && config.max_width.is_finite()
        && 0.0 <= config.min_width
        && config.min_width <= config.max_width;
    if !widths_ok {
        return Err(ConfigError::InvalidStickyWidth {
            column: config.column.clone(),
            min_width: config.min_width,
            max_width: config.max_width,
        });
    }

    let resolves = match &config.column {
        ColumnRef::Id(id) => ids.iter().any(|other| other == id),
        ColumnRef::Index(index) => *index < ids.len(),
    };
    if resolves {
        Ok(())
    } else {
        Err(ConfigError::UnresolvedSticky {
            side,
            column: config.column.clone(),
        })
    }
}

/// First match wins, but a column may not be claimed by both sides, nor by position in one
/// config and by identifier in another.
fn resolve_column(
    configs: &EnumMap<StickySide, Vec<StickyColumnConfig>>,
    id: &str,
    index: usize,
) -> Result<Option<StickyCell>, ConfigError> {
    let mut first: Option<(StickyCell, bool)> = None;

    for (side, list) in configs {
        for (config_index, config) in list.iter().enumerate() {
            if !config.column.matches(id, index) {
                continue;
            }
            let by_index = matches!(config.column, ColumnRef::Index(_));
            match first {
                None => {
                    first = Some((
                        StickyCell {
                            side,
                            config_index,
                            min_width: config.min_width,
                            max_width: config.max_width,
                        },
                        by_index,
                    ));
                }
                Some((cell, first_by_index)) => {
                    if cell.side != side || first_by_index != by_index {
                        return Err(ConfigError::ConflictingSticky {
                            column_id: id.to_owned(),
                            index,
                        });
                    }
                }
            }
        }
    }

    Ok(first.map(|(cell, _)| cell))
}

/// Identifies the structure a [`ColumnModel`] was built from, so it is only rebuilt when that
/// structure changes.
pub(crate) fn layout_key<S: AsRef<str>>(
    column_ids: &[S],
    left: &[StickyColumnConfig],
    right: &[StickyColumnConfig],
) -> u64 {
    let mut hasher = ahash::RandomState::with_seeds(1, 2, 3, 4).build_hasher();
    column_ids.len().hash(&mut hasher);
    for id in column_ids {
        id.as_ref().hash(&mut hasher);
    }
    for list in [left, right] {
        list.len().hash(&mut hasher);
        for config in list {
            config.column.hash(&mut hasher);
            config.min_width.to_bits().hash(&mut hasher);
            config.max_width.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn id_name_actions_scenario() {
        let model = ColumnModel::new(
            &ids(&["id", "name", "actions"]),
            &[StickyColumnConfig::new("id", 60.0)],
            &[StickyColumnConfig::new("actions", 100.0)],
        )
        .unwrap();

        assert_eq!(model.left_offset(0), 0.0);
        assert_eq!(model.left_offset(2), 60.0);
        assert_eq!(model.right_offset(1), 100.0);
        assert_eq!(model.right_offset(2), 0.0);
        assert_eq!(model.sticky_count(), 2);
        assert_eq!(model.first_scrollable(), Some(1));
    }

    #[test]
    fn left_offsets_ignore_interleaved_scrollable_columns() {
        let columns = ids(&["a", "b", "c", "d", "e"]);
        let left = [
            StickyColumnConfig::new(0, 30.0),
            StickyColumnConfig::new("c", 45.0).min_width(20.0),
        ];
        let model = ColumnModel::new(&columns, &left, &[]).unwrap();

        assert_eq!(model.left_offset(0), 0.0);
        assert_eq!(model.left_offset(1), 30.0);
        assert_eq!(model.left_offset(2), 30.0);
        assert_eq!(model.left_offset(3), 75.0);
        assert_eq!(model.left_offset(4), 75.0);
        assert_eq!(model.sticky_width(StickySide::Left), 75.0);
        assert_eq!(model.scrollable_columns().collect::<Vec<_>>(), vec![1, 3, 4]);
    }

    #[test]
    fn right_offsets_sum_later_right_columns() {
        let columns = ids(&["a", "b", "c", "d"]);
        let right = [
            StickyColumnConfig::new("c", 50.0),
            StickyColumnConfig::new(3, 70.0),
        ];
        let model = ColumnModel::new(&columns, &[], &right).unwrap();

        assert_eq!(model.right_offset(3), 0.0);
        assert_eq!(model.right_offset(2), 70.0);
        assert_eq!(model.right_offset(1), 120.0);
        assert_eq!(model.right_offset(0), 120.0);
    }

    #[test]
    fn first_match_in_list_order_wins() {
        let columns = ids(&["a", "b"]);
        let left = [
            StickyColumnConfig::new("a", 60.0),
            StickyColumnConfig::new("a", 90.0),
        ];
        let model = ColumnModel::new(&columns, &left, &[]).unwrap();

        let (side, config) = model.resolve_sticky_config("a", 0).unwrap();
        assert_eq!(side, StickySide::Left);
        assert_eq!(config.max_width, 60.0);
        assert_eq!(model.left_offset(1), 60.0);
        assert!(model.resolve_sticky_config("b", 1).is_none());
    }

    #[test]
    fn position_and_identifier_in_different_configs_conflict() {
        let columns = ids(&["a", "b"]);
        let left = [
            StickyColumnConfig::new(0, 60.0),
            StickyColumnConfig::new("a", 60.0),
        ];
        assert_eq!(
            ColumnModel::new(&columns, &left, &[]),
            Err(ConfigError::ConflictingSticky {
                column_id: "a".to_owned(),
                index: 0
            })
        );
    }

    #[test]
    fn a_column_cannot_stick_to_both_sides() {
        let columns = ids(&["a", "b"]);
        let result = ColumnModel::new(
            &columns,
            &[StickyColumnConfig::new("b", 60.0)],
            &[StickyColumnConfig::new("b", 60.0)],
        );
        assert!(matches!(result, Err(ConfigError::ConflictingSticky { index: 1, .. })));
    }

    #[test]
    fn unresolved_references_are_errors() {
        let columns = ids(&["a", "b"]);
        assert_eq!(
            ColumnModel::new(&columns, &[StickyColumnConfig::new("zzz", 60.0)], &[]),
            Err(ConfigError::UnresolvedSticky {
                side: StickySide::Left,
                column: ColumnRef::Id("zzz".to_owned()),
            })
        );
        assert!(matches!(
            ColumnModel::new(&columns, &[], &[StickyColumnConfig::new(2, 60.0)]),
            Err(ConfigError::UnresolvedSticky {
                side: StickySide::Right,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_ids_and_bad_widths_are_errors() {
        assert!(matches!(
            ColumnModel::new(&ids(&["a", "b", "a"]), &[], &[]),
            Err(ConfigError::DuplicateColumnId {
                first: 0,
                second: 2,
                ..
            })
        ));
        assert!(matches!(
            ColumnModel::new(
                &ids(&["a"]),
                &[StickyColumnConfig::new("a", 60.0).min_width(80.0)],
                &[]
            ),
            Err(ConfigError::InvalidStickyWidth { .. })
        ));
    }

    #[test]
    fn fallback_model_has_no_sticky_columns() {
        let model = ColumnModel::without_sticky(&ids(&["a", "a"]));
        assert_eq!(model.len(), 2);
        assert_eq!(model.sticky_count(), 0);
        assert_eq!(model.left_offset(1), 0.0);
    }

    #[test]
    fn layout_key_tracks_structure() {
        let columns = ids(&["a", "b"]);
        let left = [StickyColumnConfig::new(0, 60.0)];
        let key = layout_key(&columns, &left, &[]);
        assert_eq!(key, layout_key(&columns, &left, &[]));
        assert_ne!(key, layout_key(&ids(&["b", "a"]), &left, &[]));
        assert_ne!(key, layout_key(&columns, &[StickyColumnConfig::new(0, 61.0)], &[]));
        assert_ne!(key, layout_key(&columns, &[], &left));
    }
}
