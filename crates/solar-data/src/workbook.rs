//! Spreadsheet access for the normalisation pipeline.
//!
//! The pipeline only needs two things from a workbook: the names of its
//! sheets and a raw cell grid per sheet. [`Workbook`] captures that seam;
//! [`XlsxWorkbook`] implements it over `calamine` and [`MemoryWorkbook`]
//! over grids built in memory.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use solar_core::cells::{Cell, CellParser, RawSheet};
use solar_core::{Result, SolarError};
use tracing::{debug, warn};

/// File extensions calamine can open.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

// ── Workbook trait ────────────────────────────────────────────────────────────

/// A source of named raw sheets.
pub trait Workbook {
    /// Names of all sheets present, in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Read one sheet into a grid anchored at A1.
    fn read_sheet(&mut self, name: &str) -> Result<RawSheet>;
}

// ── XlsxWorkbook ──────────────────────────────────────────────────────────────

/// A workbook file opened with `calamine` (xlsx, xlsm, xls or ods).
///
/// The file handle is held for the lifetime of the value and released when
/// it is dropped.
pub struct XlsxWorkbook {
    path: PathBuf,
    inner: Sheets<BufReader<File>>,
}

impl XlsxWorkbook {
    /// Open `path`, detecting the format from its extension.
    pub fn open(path: &Path) -> Result<Self> {
        let inner = open_workbook_auto(path).map_err(|e| match e {
            calamine::Error::Io(source) => SolarError::FileRead {
                path: path.to_path_buf(),
                source,
            },
            other => SolarError::Workbook {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;
        debug!("Opened workbook {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Workbook for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    fn read_sheet(&mut self, name: &str) -> Result<RawSheet> {
        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|e| SolarError::SheetRead {
                sheet: name.to_string(),
                message: e.to_string(),
            })?;
        Ok(range_to_sheet(&range))
    }
}

/// Copy a calamine range into an A1-anchored grid.
///
/// calamine ranges start at the first used cell, so a sheet whose banner
/// row or first column is empty would otherwise shift every physical index.
fn range_to_sheet(range: &Range<Data>) -> RawSheet {
    let Some((end_row, end_col)) = range.end() else {
        return RawSheet::default();
    };

    let rows = (0..=end_row)
        .map(|r| {
            (0..=end_col)
                .map(|c| range.get_value((r, c)).map(convert_cell).unwrap_or_default())
                .collect()
        })
        .collect();
    RawSheet::new(rows)
}

/// Map a calamine cell onto the reader-independent [`Cell`].
fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Bool(b) => Cell::Bool(*b),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) => Cell::String(s.clone()),
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(naive) => Cell::DateTime(naive),
            None => Cell::Float(dt.as_f64()),
        },
        // Durations carry no calendar date.
        Data::DateTime(dt) => Cell::Float(dt.as_f64()),
        Data::DateTimeIso(s) => {
            let text = Cell::String(s.clone());
            match CellParser::parse_date(&text) {
                Some(naive) => Cell::DateTime(naive),
                None => text,
            }
        }
        Data::DurationIso(s) => Cell::String(s.clone()),
    }
}

// ── MemoryWorkbook ────────────────────────────────────────────────────────────

/// A workbook held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, RawSheet)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet; a later sheet with the same name shadows nothing,
    /// reads always return the first one.
    pub fn with_sheet(mut self, name: impl Into<String>, sheet: RawSheet) -> Self {
        self.sheets.push((name.into(), sheet));
        self
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<RawSheet> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, sheet)| sheet.clone())
            .ok_or_else(|| SolarError::SheetRead {
                sheet: name.to_string(),
                message: "no such sheet".to_string(),
            })
    }
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Find spreadsheet files directly inside `dir`, sorted by path.
///
/// Office lock files (`~$name.xlsx`) are ignored.
pub fn find_workbooks(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let is_lock_file = entry.file_name().to_string_lossy().starts_with("~$");
            entry.file_type().is_file() && !is_lock_file && has_workbook_extension(entry.path())
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

fn has_workbook_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
