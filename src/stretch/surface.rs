/// Measured footprint of one rendered cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderedCell {
    /// Width the cell occupies, including padding and overflowing content.
    pub width: usize,
    /// Width of the single element holding the value, `None` if the cell is
    /// empty.
    pub content_width: Option<usize>,
}

impl RenderedCell {
    pub fn new(width: usize, content_width: usize) -> Self {
        Self {
            width,
            content_width: Some(content_width),
        }
    }
}

/// Read access to whatever was rendered last.
///
/// Rows are the rendered data rows only (no header), cells are addressed by
/// rendered position, i.e. hidden columns do not occupy a slot.
pub trait RenderSurface {
    fn row_count(&self) -> usize;

    fn cell(&self, row: usize, position: usize) -> Option<RenderedCell>;
}

/// Snapshot of a drawn table frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedGrid {
    rows: Vec<Vec<RenderedCell>>,
}

impl RenderedGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_row(&mut self, cells: Vec<RenderedCell>) {
        self.rows.push(cells);
    }

    /// Builds a snapshot from `(cell width, content width)` pairs.
    pub fn from_widths(rows: &[&[(usize, usize)]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|&(w, c)| RenderedCell::new(w, c)).collect())
                .collect(),
        }
    }
}

impl RenderSurface for RenderedGrid {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, row: usize, position: usize) -> Option<RenderedCell> {
        self.rows.get(row).and_then(|cells| cells.get(position)).copied()
    }
}
