use std::io::Error;

use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

use crate::stretch::GridError;

#[derive(Debug, Error)]
pub enum StvError {
    #[error("io error: {0}")]
    IoError(#[from] Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("column layout error: {0}")]
    GridError(#[from] GridError),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type")]
    UnknownFileType,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("logging setup failed: {0}")]
    LoggingFailed(String),
}

#[derive(Debug, Clone)]
pub struct StvConfig {
    pub event_poll_time: u64,
    pub page_size: usize,
    pub column_width: usize,
    pub stretch: StretchSelection,
    pub poll_limit: usize,
}

impl Default for StvConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            page_size: 100,
            column_width: 10,
            stretch: StretchSelection::ALL,
            poll_limit: crate::stretch::DEFAULT_POLL_LIMIT,
        }
    }
}

/// Which columns fit their width to the rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StretchSelection {
    ALL,
    NONE,
    FIELDS(Vec<String>),
}

impl StretchSelection {
    pub fn contains(&self, field: &str) -> bool {
        match self {
            StretchSelection::ALL => true,
            StretchSelection::NONE => false,
            StretchSelection::FIELDS(fields) => fields.iter().any(|f| f == field),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    SortAscending,
    SortDescending,
    Filter,
    ClearFilter,
    HideColumn,
    ShowLastHidden,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
q        quit
←/→ ↑/↓  move the cursor
n / p    next / previous page
s / S    sort column ascending / descending
/        filter column
Esc      drop the filter, close popups
x        hide column
u        show the last hidden column
?        this help";
