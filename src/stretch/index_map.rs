use tracing::trace;

use super::column::Columns;
use super::error::GridError;

/// Maps every logical column to its rendered position, `None` while hidden.
///
/// Hiding a column shifts every later visible column one rendered position
/// to the left, showing one shifts them back to the right. The present
/// entries, read in logical order, always form `0..k` with `k` the number of
/// visible columns. Values are never mutated in place, each transition
/// returns a new map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    positions: Vec<Option<usize>>,
}

impl IndexMap {
    /// All `len` columns visible, rendered in logical order.
    pub fn identity(len: usize) -> Self {
        Self {
            positions: (0..len).map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, col_idx: usize) -> Option<usize> {
        self.positions.get(col_idx).copied().flatten()
    }

    pub fn is_hidden(&self, col_idx: usize) -> bool {
        self.get(col_idx).is_none()
    }

    pub fn visible_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }

    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.positions
    }

    /// Logical indices of the visible columns, in rendered order.
    pub fn visible(&self) -> impl Iterator<Item = usize> + '_ {
        self.positions
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| p.map(|_| idx))
    }

    fn check_range(&self, col_idx: usize) -> Result<(), GridError> {
        if col_idx >= self.positions.len() {
            return Err(GridError::ColumnOutOfRange {
                index: col_idx,
                len: self.positions.len(),
            });
        }
        Ok(())
    }

    pub fn hide(&self, col_idx: usize) -> Result<Self, GridError> {
        self.check_range(col_idx)?;
        if self.is_hidden(col_idx) {
            return Err(GridError::AlreadyHidden(col_idx));
        }

        let mut positions = self.positions.clone();
        positions[col_idx] = None;
        for p in positions[col_idx + 1..].iter_mut().flatten() {
            *p -= 1;
        }
        Ok(Self { positions })
    }

    pub fn show(&self, col_idx: usize) -> Result<Self, GridError> {
        self.check_range(col_idx)?;
        if !self.is_hidden(col_idx) {
            return Err(GridError::AlreadyVisible(col_idx));
        }

        let mut positions = self.positions.clone();
        // Right behind the nearest visible column to the left, or first.
        positions[col_idx] = Some(
            positions[..col_idx]
                .iter()
                .rev()
                .find_map(|p| *p)
                .map_or(0, |p| p + 1),
        );
        for p in positions[col_idx + 1..].iter_mut().flatten() {
            *p += 1;
        }
        Ok(Self { positions })
    }

    /// Applies the single visibility flip a notification carries.
    ///
    /// The changed column is the first field of `model` whose hidden flag
    /// disagrees with this map. A model that agrees everywhere is an error:
    /// continuing with a stale map would measure the wrong cells later on.
    pub fn apply(&self, columns: &Columns, model: &VisibilityModel) -> Result<Self, GridError> {
        let (col_idx, hidden) = self.detect_change(columns, model)?;
        trace!("Visibility of column {col_idx} changed, hidden: {hidden}");
        if hidden {
            self.hide(col_idx)
        } else {
            self.show(col_idx)
        }
    }

    fn detect_change(
        &self,
        columns: &Columns,
        model: &VisibilityModel,
    ) -> Result<(usize, bool), GridError> {
        for (field, hidden) in model.iter() {
            let col_idx = columns.index_of(field)?;
            self.check_range(col_idx)?;
            if hidden != self.is_hidden(col_idx) {
                return Ok((col_idx, hidden));
            }
        }
        Err(GridError::NoVisibilityChange)
    }
}

/// Hidden flag per column field, in the order the fields were first toggled.
///
/// Only fields that were toggled at least once are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityModel {
    entries: Vec<(String, bool)>,
}

impl VisibilityModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, hidden: bool) {
        match self.entries.iter_mut().find(|(f, _)| f == field) {
            Some(entry) => entry.1 = hidden,
            None => self.entries.push((field.to_string(), hidden)),
        }
    }

    pub fn is_hidden(&self, field: &str) -> bool {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .is_some_and(|(_, hidden)| *hidden)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(f, h)| (f.as_str(), *h))
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for VisibilityModel {
    fn from_iter<T: IntoIterator<Item = (S, bool)>>(iter: T) -> Self {
        let mut model = VisibilityModel::new();
        for (field, hidden) in iter {
            let field: String = field.into();
            model.set(&field, hidden);
        }
        model
    }
}
