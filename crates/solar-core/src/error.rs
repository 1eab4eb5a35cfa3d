use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the solar monitoring pipeline.
#[derive(Error, Debug)]
pub enum SolarError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet reader could not open or decode the workbook.
    #[error("Failed to open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// A sheet listed in the workbook could not be read into a grid.
    #[error("Failed to read sheet '{sheet}': {message}")]
    SheetRead { sheet: String, message: String },

    /// A sheet is narrower than the configured column slices require.
    #[error("Sheet '{sheet}' has {available} columns but the layout requires {required}")]
    Layout {
        sheet: String,
        required: usize,
        available: usize,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A layout override file could not be parsed.
    #[error("Failed to parse layout file: {0}")]
    LayoutFile(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the solar crates.
pub type Result<T> = std::result::Result<T, SolarError>;
