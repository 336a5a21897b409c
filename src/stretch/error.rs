use thiserror::Error;

/// Failures of the column layout bookkeeping.
///
/// All of these are contract violations by the caller: the index map is left
/// untouched when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("visibility notification did not change any column")]
    NoVisibilityChange,
    #[error("unknown column field \"{0}\"")]
    UnknownColumn(String),
    #[error("column index {index} out of range for {len} columns")]
    ColumnOutOfRange { index: usize, len: usize },
    #[error("column {0} is already hidden")]
    AlreadyHidden(usize),
    #[error("column {0} is already visible")]
    AlreadyVisible(usize),
}
