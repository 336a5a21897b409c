use tracing::{debug, trace, warn};

use super::column::Columns;
use super::content_widths::ContentWidths;
use super::index_map::IndexMap;
use super::surface::RenderSurface;

/// Widest cell and widest content found at one rendered position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    pub cell_width: usize,
    pub content_width: usize,
}

/// What a fresh measurement means for a column's width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    /// Content width did not change.
    Unchanged,
    /// Content outgrew the cell, take the observed cell footprint.
    Grow(usize),
    /// Content shrank, keep the padding that was around the old content.
    Shrink(usize),
    /// Content grew but the cell footprint did not follow.
    Anomalous,
}

/// Columns with changed widths, plus the content widths they were fitted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StretchUpdate {
    pub columns: Columns,
    pub content_widths: ContentWidths,
    /// Logical indices of the resized columns.
    pub resized: Vec<usize>,
}

pub fn measure(surface: &dyn RenderSurface, position: usize) -> Measurement {
    (0..surface.row_count())
        .filter_map(|row| surface.cell(row, position))
        .fold(Measurement::default(), |acc, cell| Measurement {
            cell_width: acc.cell_width.max(cell.width),
            content_width: acc.content_width.max(cell.content_width.unwrap_or(0)),
        })
}

pub fn reconcile(prev_cell_width: usize, prev_content_width: usize, current: Measurement) -> Resize {
    if current.content_width == prev_content_width {
        Resize::Unchanged
    } else if current.cell_width > prev_cell_width {
        Resize::Grow(current.cell_width)
    } else if current.content_width < prev_content_width {
        Resize::Shrink((current.content_width + prev_cell_width).saturating_sub(prev_content_width))
    } else {
        Resize::Anomalous
    }
}

/// Fits stretchable columns to their rendered content.
///
/// Owns the content widths seen by the previous passes; a pass compares
/// against them and always records what it observed.
#[derive(Debug, Clone)]
pub struct StretchEngine {
    content_widths: ContentWidths,
    anomalies: Vec<usize>,
    passes: u64,
}

impl StretchEngine {
    pub fn new(columns: usize) -> Self {
        Self {
            content_widths: ContentWidths::new(columns),
            anomalies: Vec::new(),
            passes: 0,
        }
    }

    pub fn content_widths(&self) -> &ContentWidths {
        &self.content_widths
    }

    /// Logical indices whose content grew in the last pass while their cell
    /// did not. Their width was kept.
    pub fn anomalies(&self) -> &[usize] {
        &self.anomalies
    }

    /// Re-measures every stretchable visible column against `surface`.
    ///
    /// Returns the updated columns only when at least one width changed.
    pub fn run(
        &mut self,
        columns: &Columns,
        index_map: &IndexMap,
        surface: &dyn RenderSurface,
    ) -> Option<StretchUpdate> {
        self.passes += 1;
        let mut specs = columns.specs().to_vec();
        let mut content_widths = self.content_widths.clone();
        let mut resized = Vec::new();
        self.anomalies.clear();

        for (col_idx, spec) in specs.iter_mut().enumerate() {
            if !spec.stretch {
                continue;
            }
            let Some(position) = index_map.get(col_idx) else {
                continue;
            };

            let current = measure(surface, position);
            let prev_content_width = content_widths.get(col_idx);
            let resize = reconcile(spec.width, prev_content_width, current);
            trace!(
                "Column {} \"{}\" at {}: cell {}->{}, content {}->{} => {:?}",
                col_idx,
                spec.field,
                position,
                spec.width,
                current.cell_width,
                prev_content_width,
                current.content_width,
                resize
            );

            match resize {
                Resize::Unchanged => continue,
                Resize::Anomalous => {
                    warn!(
                        "Content of column \"{}\" grew {}->{} but its cell stayed at {} (allocated {}), keeping width",
                        spec.field,
                        prev_content_width,
                        current.content_width,
                        current.cell_width,
                        spec.width
                    );
                    self.anomalies.push(col_idx);
                }
                Resize::Grow(width) | Resize::Shrink(width) => {
                    if width != spec.width {
                        spec.width = width;
                        resized.push(col_idx);
                    }
                }
            }
            content_widths = content_widths.with(col_idx, current.content_width);
        }

        self.content_widths = content_widths;
        if resized.is_empty() {
            return None;
        }

        debug!("Stretch pass {} resized columns {:?}", self.passes, resized);
        Some(StretchUpdate {
            columns: columns.with_specs(specs),
            content_widths: self.content_widths.clone(),
            resized,
        })
    }
}
