use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::StvError;

#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// A loaded column, every value already rendered to its display string.
#[derive(Debug)]
pub struct Column {
    pub name: String,
    pub data: Vec<String>,
    pub numeric: bool,
}

impl Column {
    pub fn as_string(&self) -> String {
        format!(
            "\"{}\", numeric: {}, # rows {}",
            self.name,
            self.numeric,
            self.data.len(),
        )
    }
}

#[derive(Debug, Default)]
pub struct DataSet {
    pub name: String,
    pub columns: Vec<Column>,
}

impl DataSet {
    pub fn nrows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn load(path: PathBuf) -> Result<Self, StvError> {
        let file_info = get_file_info(path)?;
        debug!("Loading {:?} ({} bytes)", file_info.path, file_info.file_size);
        let frame = match file_info.file_type {
            FileType::CSV => load_csv(&file_info.path)?,
            FileType::PARQUET => load_parquet(&file_info.path)?,
            FileType::ARROW => load_arrow(&file_info.path)?,
        };

        // Each column is converted to strings in its own rayon task.
        let start_time = Instant::now();
        let df = frame.collect()?;
        let columns = df
            .get_column_names()
            .par_iter()
            .map(|name| load_column(&df, name))
            .collect::<Result<Vec<Column>, _>>()?;

        info!(
            "Loading data took {}ms ...",
            start_time.elapsed().as_millis()
        );
        for c in columns.iter() {
            debug!("Column: {}", c.as_string());
        }

        let name = file_info
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();
        Ok(Self { name, columns })
    }
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<Column, PolarsError> {
    let numeric = is_numeric_type(df.column(col_name)?.dtype());

    let col = df.column(col_name)?.cast(&DataType::String)?;
    let series = col.str()?;
    let data = series
        .into_iter()
        .map(|value| match value {
            Some(s) => s.replace("\r\n", " ↵ ").replace('\n', " ↵ "),
            None => String::from("∅"),
        })
        .collect();

    Ok(Column {
        name: col_name.to_string(),
        data,
        numeric,
    })
}

fn detect_file_type(path: &Path) -> Result<FileType, StvError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(StvError::UnknownFileType),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, StvError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StvError::FileNotFound,
        ErrorKind::PermissionDenied => StvError::PermissionDenied,
        _ => StvError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(StvError::LoadingFailed("Not a file!".into()));
    }

    let file_type = detect_file_type(&path)?;
    Ok(FileInfo {
        path,
        file_size: metadata.len(),
        file_type,
    })
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}
