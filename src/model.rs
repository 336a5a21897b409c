use ratatui::crossterm::event::KeyEvent;
use ratatui::text::Line;
use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::data::{Column, DataSet};
use crate::domain::{HELP_TEXT, Message, StvConfig, StvError};
use crate::inputter::{InputResult, Inputter};
use crate::stretch::{
    Align, ColumnSpec, GridOptions, RenderSurface, StretchUpdate, StretchyGrid, VisibilityModel,
};
use crate::ui::{CELL_PADDING, CMDLINE_HEIGHT, TABLE_HEADER_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

/// Row selection and paging of the loaded data.
#[derive(Debug, Default)]
struct TableView {
    rows: Vec<usize>, // View row index -> data row index, after filter and sort
    sort: Option<(usize, bool)>,
    filter: Option<(usize, String)>,
    page: usize,
    cursor_row: usize,    // Within the page
    offset_row: usize,    // First page row on screen
    cursor_column: usize, // Rendered position
}

/// Everything the UI needs to draw one frame.
pub struct UIData {
    pub name: String,
    pub headers: Vec<String>,
    pub widths: Vec<usize>,
    pub aligns: Vec<Align>,
    pub rows: Vec<Vec<String>>,
    pub selected_row: usize,
    pub selected_column: usize,
    pub status_message: String,
    pub page_info: String,
    pub popup_message: Option<String>,
    pub cmdinput: Option<InputResult>,
}

pub struct Model {
    config: StvConfig,
    pub status: Status,
    modus: Modus,
    data: DataSet,
    table: TableView,
    grid: StretchyGrid,
    visibility: VisibilityModel,
    hidden: Vec<usize>, // Hidden logical columns, most recent last
    input: Inputter,
    last_input: InputResult,
    status_message: String,
    height: usize,
}

impl Model {
    pub fn init(config: &StvConfig, ui_height: usize) -> Self {
        Self {
            config: config.clone(),
            status: Status::LOADING,
            modus: Modus::TABLE,
            data: DataSet::default(),
            table: TableView::default(),
            grid: StretchyGrid::new(Vec::new(), GridOptions::default()),
            visibility: VisibilityModel::new(),
            hidden: Vec::new(),
            input: Inputter::default(),
            last_input: InputResult::default(),
            status_message: "Loading ...".to_string(),
            height: ui_height,
        }
    }

    pub fn load_data_file(&mut self, path: PathBuf) -> Result<(), StvError> {
        let start_time = Instant::now();
        let data = DataSet::load(path)?;
        self.set_data(data);
        self.set_status_message(format!(
            "Loaded data in {}ms ...",
            start_time.elapsed().as_millis()
        ));
        Ok(())
    }

    /// Replaces the data and mounts a fresh column grid for it.
    pub fn set_data(&mut self, data: DataSet) {
        let specs = data
            .columns
            .iter()
            .map(|c| self.column_spec(c))
            .collect::<Vec<_>>();
        info!(
            "Mounting grid with {} columns, {} stretchable",
            specs.len(),
            specs.iter().filter(|s| s.stretch).count()
        );

        let options = GridOptions::default().poll_limit(self.config.poll_limit);
        self.grid = StretchyGrid::new(specs, options);
        self.visibility = VisibilityModel::new();
        self.hidden.clear();
        self.table = TableView {
            rows: (0..data.nrows()).collect(),
            ..TableView::default()
        };
        self.grid.set_row_count(data.nrows());
        self.data = data;
        self.grid.on_mount();
        self.status = Status::READY;
    }

    fn column_spec(&self, column: &Column) -> ColumnSpec {
        let header_width = Line::from(column.name.as_str()).width() + 2 * CELL_PADDING;
        ColumnSpec::new(column.name.clone(), self.config.column_width)
            .stretch(self.config.stretch.contains(&column.name))
            .align(if column.numeric {
                Align::RIGHT
            } else {
                Align::LEFT
            })
            .min_width(header_width)
    }

    pub fn grid(&self) -> &StretchyGrid {
        &self.grid
    }

    /// Runs the deferred column work against the frame that was just drawn.
    pub fn tick(&mut self, surface: &dyn RenderSurface) -> Option<StretchUpdate> {
        let update = self.grid.tick(surface);
        if !self.grid.anomalies().is_empty() {
            debug!("Columns {:?} kept their width", self.grid.anomalies());
        }
        let update = update?;
        let names = update
            .resized
            .iter()
            .filter_map(|&idx| update.columns.get(idx).map(|c| c.field.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        debug!(
            "Fitted {names}, column widths now {:?}",
            self.widths_in_logical_order()
        );
        Some(update)
    }

    fn widths_in_logical_order(&self) -> Vec<usize> {
        self.grid.columns().iter().map(|c| c.width).collect()
    }

    pub fn quit(&mut self) {
        self.grid.teardown();
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::CMDINPUT
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), StvError> {
        let Some(msg) = message else {
            return Ok(());
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);

        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_row(-1),
                Message::MoveDown => self.move_row(1),
                Message::MoveLeft => self.move_column(-1),
                Message::MoveRight => self.move_column(1),
                Message::NextPage => self.change_page(1),
                Message::PrevPage => self.change_page(-1),
                Message::SortAscending => self.sort_current_column(true),
                Message::SortDescending => self.sort_current_column(false),
                Message::Filter => self.enter_cmd_mode(),
                Message::ClearFilter | Message::Exit => self.clear_filter(),
                Message::HideColumn => self.hide_current_column()?,
                Message::ShowLastHidden => self.show_last_hidden()?,
                Message::Help => self.modus = Modus::POPUP,
                Message::Resize(_, height) => self.ui_resize(height),
                Message::RawKey(_) => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.modus = Modus::TABLE,
                Message::Resize(_, height) => self.ui_resize(height),
                _ => (),
            },
            Modus::CMDINPUT => match msg {
                Message::RawKey(key) => self.raw_input(key),
                Message::Resize(_, height) => self.ui_resize(height),
                _ => (),
            },
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn ui_resize(&mut self, height: usize) {
        trace!("UI was resized! h:{}->{}", self.height, height);
        self.height = height;
        self.clamp_cursor();
    }

    fn table_height(&self) -> usize {
        self.height
            .saturating_sub(TABLE_HEADER_HEIGHT + CMDLINE_HEIGHT + 2)
            .max(1)
    }

    fn page_rows(&self) -> &[usize] {
        let begin = (self.table.page * self.config.page_size).min(self.table.rows.len());
        let end = (begin + self.config.page_size).min(self.table.rows.len());
        &self.table.rows[begin..end]
    }

    fn page_count(&self) -> usize {
        self.table.rows.len().div_ceil(self.config.page_size.max(1)).max(1)
    }

    fn move_row(&mut self, step: isize) {
        let nrows = self.page_rows().len();
        if nrows == 0 {
            return;
        }
        let row = self.table.cursor_row.saturating_add_signed(step).min(nrows - 1);
        self.table.cursor_row = row;
        let height = self.table_height();
        if row < self.table.offset_row {
            self.table.offset_row = row;
        } else if row >= self.table.offset_row + height {
            self.table.offset_row = row + 1 - height;
        }
    }

    fn move_column(&mut self, step: isize) {
        let visible = self.grid.index_map().visible_count();
        if visible == 0 {
            return;
        }
        self.table.cursor_column = self
            .table
            .cursor_column
            .saturating_add_signed(step)
            .min(visible - 1);
    }

    fn clamp_cursor(&mut self) {
        self.move_row(0);
        self.move_column(0);
    }

    fn current_column(&self) -> Option<usize> {
        self.grid.index_map().visible().nth(self.table.cursor_column)
    }

    fn change_page(&mut self, step: isize) {
        let page = self
            .table
            .page
            .saturating_add_signed(step)
            .min(self.page_count() - 1);
        if page == self.table.page {
            return;
        }
        trace!("Page {} -> {}", self.table.page, page);
        self.table.page = page;
        self.table.cursor_row = 0;
        self.table.offset_row = 0;
        self.grid.on_page_changed();
    }

    fn sort_current_column(&mut self, ascending: bool) {
        let Some(col_idx) = self.current_column() else {
            return;
        };
        self.table.sort = Some((col_idx, ascending));
        self.rebuild_rows();
        self.grid.on_sort_changed();
    }

    fn enter_cmd_mode(&mut self) {
        trace!("Entering filter input ...");
        self.modus = Modus::CMDINPUT;
        self.input.clear();
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if !self.last_input.finished {
            return;
        }
        self.modus = Modus::TABLE;
        if self.last_input.canceled {
            return;
        }
        let term = self.last_input.input.clone();
        self.filter(term);
    }

    fn filter(&mut self, term: String) {
        let Some(col_idx) = self.current_column() else {
            return;
        };
        trace!("Starting filter for {term} ...");
        self.table.filter = Some((col_idx, term));
        self.rebuild_rows();
        self.set_status_message(format!("{} matching rows", self.table.rows.len()));
        self.grid.set_row_count(self.table.rows.len());
        self.grid.on_filter_changed();
    }

    fn clear_filter(&mut self) {
        if self.table.filter.take().is_none() {
            return;
        }
        self.rebuild_rows();
        self.grid.set_row_count(self.table.rows.len());
        self.grid.on_filter_changed();
    }

    fn hide_current_column(&mut self) -> Result<(), StvError> {
        if self.grid.index_map().visible_count() <= 1 {
            self.set_status_message("Can not hide the last column");
            return Ok(());
        }
        let Some(col_idx) = self.current_column() else {
            return Ok(());
        };
        self.set_visibility(col_idx, true)?;
        self.hidden.push(col_idx);
        self.move_column(0);
        Ok(())
    }

    fn show_last_hidden(&mut self) -> Result<(), StvError> {
        let Some(col_idx) = self.hidden.pop() else {
            self.set_status_message("No hidden columns");
            return Ok(());
        };
        self.set_visibility(col_idx, false)
    }

    fn set_visibility(&mut self, col_idx: usize, hidden: bool) -> Result<(), StvError> {
        let field = match self.grid.columns().get(col_idx) {
            Some(spec) => spec.field.clone(),
            None => return Ok(()),
        };
        self.visibility.set(&field, hidden);
        self.grid.on_visibility_changed(&self.visibility)?;
        self.set_status_message(format!(
            "{} column {field}",
            if hidden { "Hid" } else { "Showing" }
        ));
        Ok(())
    }

    /// Recomputes the view rows from scratch: filter first, then sort.
    fn rebuild_rows(&mut self) {
        let start_time = Instant::now();
        let mut rows: Vec<usize> = (0..self.data.nrows()).collect();

        if let Some((col_idx, term)) = &self.table.filter {
            let column = &self.data.columns[*col_idx];
            rows.retain(|&r| column.data[r].contains(term.as_str()));
        }
        if let Some((col_idx, ascending)) = self.table.sort {
            let column = &self.data.columns[col_idx];
            rows.sort_by(|&a, &b| {
                let ordering = compare_values(&column.data[a], &column.data[b], column.numeric);
                if ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        trace!(
            "Rebuilt {} rows in {}ms",
            rows.len(),
            start_time.elapsed().as_millis()
        );
        self.table.rows = rows;
        self.table.page = 0;
        self.table.cursor_row = 0;
        self.table.offset_row = 0;
    }

    // -------------------- UI data ---------------------- //

    pub fn get_uidata(&self) -> UIData {
        let visible: Vec<(usize, &ColumnSpec)> = self.grid.visible_columns().collect();
        let page_rows = self.page_rows();
        let end = (self.table.offset_row + self.table_height()).min(page_rows.len());
        let begin = self.table.offset_row.min(end);

        let rows = page_rows[begin..end]
            .iter()
            .map(|&r| {
                visible
                    .iter()
                    .map(|(idx, _)| self.data.columns[*idx].data[r].clone())
                    .collect()
            })
            .collect();

        let mut name = self.data.name.clone();
        if let Some((col_idx, term)) = &self.table.filter
            && let Some(spec) = self.grid.columns().get(*col_idx)
        {
            name = format!("F[{}: {}~\"{}\"]", name, spec.field, term);
        }

        UIData {
            name,
            headers: visible.iter().map(|(_, c)| c.header.clone()).collect(),
            widths: visible.iter().map(|(_, c)| c.width).collect(),
            aligns: visible.iter().map(|(_, c)| c.align).collect(),
            rows,
            selected_row: self.table.cursor_row.saturating_sub(self.table.offset_row),
            selected_column: self.table.cursor_column,
            status_message: self.status_message.clone(),
            page_info: format!(
                "page {}/{}, {} rows, {} hidden",
                self.table.page + 1,
                self.page_count(),
                self.table.rows.len(),
                self.hidden.len()
            ),
            popup_message: (self.modus == Modus::POPUP).then(|| HELP_TEXT.to_string()),
            cmdinput: (self.modus == Modus::CMDINPUT).then(|| self.last_input.clone()),
        }
    }
}

/// Numeric columns compare as floats, unparsable values sort last.
fn compare_values(a: &str, b: &str, numeric: bool) -> Ordering {
    if !numeric {
        return a.cmp(b);
    }
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
