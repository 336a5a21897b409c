//! Column bookkeeping for a rendered table.
//!
//! Two things a plain table widget does not do: keep track of where a
//! logical column is rendered while columns get hidden and shown again, and
//! fit "stretchable" columns to the content that was actually rendered. The
//! host feeds notifications in and calls [`StretchyGrid::tick`] after every
//! draw; measurement always happens against a finished frame.

pub mod column;
pub mod content_widths;
pub mod engine;
pub mod error;
pub mod index_map;
pub mod scheduler;
pub mod surface;

use derive_setters::Setters;
use tracing::{debug, info, warn};

pub use column::{Align, ColumnSpec, Columns};
pub use content_widths::ContentWidths;
pub use engine::{Measurement, Resize, StretchEngine, StretchUpdate};
pub use error::GridError;
pub use index_map::{IndexMap, VisibilityModel};
pub use scheduler::{Readiness, TickQueue, Trigger};
pub use surface::{RenderSurface, RenderedCell, RenderedGrid};

pub const DEFAULT_POLL_LIMIT: usize = 100;

#[derive(Debug, Clone, Setters)]
pub struct GridOptions {
    /// Ticks a pass waits for rendered rows before it is dropped. Raised to 1
    /// when the grid is built.
    pub poll_limit: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            poll_limit: DEFAULT_POLL_LIMIT,
        }
    }
}

pub struct StretchyGrid {
    columns: Columns,
    index_map: IndexMap,
    engine: StretchEngine,
    queue: TickQueue,
    row_count: Option<usize>,
    anomalies: Vec<usize>,
    options: GridOptions,
}

impl StretchyGrid {
    pub fn new(specs: Vec<ColumnSpec>, mut options: GridOptions) -> Self {
        options.poll_limit = options.poll_limit.max(1);
        let columns = Columns::new(specs);
        let len = columns.len();
        Self {
            columns,
            index_map: IndexMap::identity(len),
            engine: StretchEngine::new(len),
            queue: TickQueue::new(),
            row_count: None,
            anomalies: Vec::new(),
            options,
        }
    }

    /// The augmented column configuration, in logical order.
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Visible columns in rendered order, with their logical index.
    pub fn visible_columns(&self) -> impl Iterator<Item = (usize, &ColumnSpec)> + '_ {
        self.index_map
            .visible()
            .filter_map(|idx| self.columns.get(idx).map(|spec| (idx, spec)))
    }

    pub fn index_map(&self) -> &IndexMap {
        &self.index_map
    }

    pub fn content_widths(&self) -> &ContentWidths {
        self.engine.content_widths()
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Columns the last tick found with grown content but an unchanged cell.
    pub fn anomalies(&self) -> &[usize] {
        &self.anomalies
    }

    pub fn pending_passes(&self) -> usize {
        self.queue.len()
    }

    /// Declares how many rows the data source holds. With 0 rows a pass does
    /// not wait for rendered rows.
    pub fn set_row_count(&mut self, rows: usize) {
        self.row_count = Some(rows);
    }

    pub fn on_mount(&mut self) {
        self.queue.defer(Trigger::MOUNT);
    }

    /// The map is updated before the pass is queued, so the pass measures
    /// the cells at their new positions.
    pub fn on_visibility_changed(&mut self, model: &VisibilityModel) -> Result<(), GridError> {
        self.index_map = self.index_map.apply(&self.columns, model)?;
        debug!("Index map now {:?}", self.index_map.as_slice());
        self.queue.defer(Trigger::VISIBILITY);
        Ok(())
    }

    pub fn on_sort_changed(&mut self) {
        self.queue.defer(Trigger::SORT);
    }

    pub fn on_filter_changed(&mut self) {
        self.queue.defer(Trigger::FILTER);
    }

    pub fn on_page_changed(&mut self) {
        self.queue.defer(Trigger::PAGE);
    }

    /// Runs the passes that were queued before this tick against the frame
    /// that was just drawn.
    ///
    /// Returns the update if any pass changed a width; the grid has already
    /// committed it.
    pub fn tick(&mut self, surface: &dyn RenderSurface) -> Option<StretchUpdate> {
        let mut result: Option<StretchUpdate> = None;
        self.anomalies.clear();

        for pass in self.queue.take_due() {
            match scheduler::readiness(
                surface.row_count(),
                self.row_count,
                pass.attempts,
                self.options.poll_limit,
            ) {
                Readiness::WAIT => self.queue.requeue(pass),
                Readiness::EXHAUSTED => warn!(
                    "Stretch pass {} ({:?}) gave up after {} ticks without rendered rows",
                    pass.id,
                    pass.trigger,
                    pass.attempts + 1
                ),
                Readiness::READY => {
                    let update = self.engine.run(&self.columns, &self.index_map, surface);
                    for &col_idx in self.engine.anomalies() {
                        if !self.anomalies.contains(&col_idx) {
                            self.anomalies.push(col_idx);
                        }
                    }
                    let Some(update) = update else {
                        continue;
                    };
                    info!(
                        "Stretch pass {} ({:?}) resized columns {:?}",
                        pass.id, pass.trigger, update.resized
                    );
                    self.columns = update.columns.clone();
                    result = Some(match result {
                        Some(mut previous) => {
                            previous.resized.extend(update.resized);
                            previous.resized.sort_unstable();
                            previous.resized.dedup();
                            StretchUpdate {
                                resized: previous.resized,
                                ..update
                            }
                        }
                        None => update,
                    });
                }
            }
        }
        result
    }

    /// Stops every outstanding pass; the grid does not measure anymore.
    pub fn teardown(&mut self) {
        self.queue.cancel_all();
    }
}
