use std::collections::HashMap;

use super::error::GridError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    LEFT,
    RIGHT,
}

/// Display configuration of one column.
///
/// The host owns the original configuration, the grid works on a copy and
/// only ever changes `width` on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: String,
    pub header: String,
    pub width: usize,
    pub stretch: bool,
    pub align: Align,
}

impl ColumnSpec {
    pub fn new(field: impl Into<String>, width: usize) -> Self {
        let field = field.into();
        Self {
            header: field.clone(),
            field,
            width,
            stretch: false,
            align: Align::LEFT,
        }
    }

    pub fn stretch(mut self, stretch: bool) -> Self {
        self.stretch = stretch;
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Raises the configured width to at least `min_width`; measured widths
    /// set later by the stretch pass are taken as they are.
    pub fn min_width(mut self, min_width: usize) -> Self {
        self.width = self.width.max(min_width);
        self
    }
}

/// The columns in their configured (logical) order.
///
/// Positions never change for the lifetime of a grid, only widths do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    specs: Vec<ColumnSpec>,
    by_field: HashMap<String, usize>,
}

impl Columns {
    pub fn new(specs: Vec<ColumnSpec>) -> Self {
        let by_field = specs
            .iter()
            .enumerate()
            .map(|(idx, spec)| (spec.field.clone(), idx))
            .collect();
        Self { specs, by_field }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&ColumnSpec> {
        self.specs.get(idx)
    }

    pub fn specs(&self) -> &[ColumnSpec] {
        &self.specs
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.specs.iter()
    }

    pub fn index_of(&self, field: &str) -> Result<usize, GridError> {
        self.by_field
            .get(field)
            .copied()
            .ok_or_else(|| GridError::UnknownColumn(field.to_string()))
    }

    /// Same fields and order, new widths. Used to commit a stretch pass.
    pub(crate) fn with_specs(&self, specs: Vec<ColumnSpec>) -> Self {
        debug_assert_eq!(specs.len(), self.specs.len());
        Self {
            specs,
            by_field: self.by_field.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_field() {
        let columns = Columns::new(vec![ColumnSpec::new("a", 5), ColumnSpec::new("b", 7)]);
        assert_eq!(columns.index_of("b"), Ok(1));
        assert_eq!(
            columns.index_of("zz"),
            Err(GridError::UnknownColumn("zz".into()))
        );
    }

    #[test]
    fn min_width_raises_configured_width() {
        let spec = ColumnSpec::new("name", 4).min_width(8);
        assert_eq!(spec.width, 8);
        let spec = ColumnSpec::new("name", 12).min_width(8);
        assert_eq!(spec.width, 12);
    }
}
