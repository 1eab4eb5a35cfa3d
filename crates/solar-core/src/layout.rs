//! Static description of the monitoring workbook.
//!
//! The sheets to read, the installation group each one belongs to, the
//! header row and the fixed column positions of the daily and monthly
//! regions are hand-maintained here. A structural change to the source
//! spreadsheet means editing this layout (or passing a JSON override),
//! never auto-detection.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolarError};

/// Number of columns in the daily region.
pub const DAILY_FIELD_COUNT: usize = 6;

/// Number of columns in the monthly region.
pub const MONTHLY_FIELD_COUNT: usize = 7;

// ── SheetSpec ─────────────────────────────────────────────────────────────────

/// One sheet to process and the group label attached to its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSpec {
    pub sheet_name: String,
    pub cad: String,
}

impl SheetSpec {
    pub fn new(sheet_name: impl Into<String>, cad: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            cad: cad.into(),
        }
    }
}

// ── SheetLayout ───────────────────────────────────────────────────────────────

/// Physical positions shared by every configured sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Zero-based physical row holding the column headers. Rows above it
    /// are banner rows; data starts on the next row.
    pub header_row: usize,
    /// Tempo, Energia_kWh, Pot_Inv_kW, Pot_kWp, Energia_Especifica_kWh_kWp, FC.
    pub daily_columns: [usize; DAILY_FIELD_COUNT],
    /// Mes_Ref, Media_Energia_Mensal, Soma_Energia_Mensal, Energia_Esp_Mensal,
    /// PR_Mensal, FC_Mensal, Irradiacao_Mensal.
    pub monthly_columns: [usize; MONTHLY_FIELD_COUNT],
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: 1,
            daily_columns: [0, 1, 2, 3, 4, 5],
            // Columns 14-16 are not read; one of them holds the city name.
            monthly_columns: [8, 9, 10, 11, 12, 13, 17],
        }
    }
}

impl SheetLayout {
    /// Minimum sheet width needed to read every configured column.
    pub fn required_width(&self) -> usize {
        self.daily_columns
            .iter()
            .chain(self.monthly_columns.iter())
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Fail when `available` columns cannot cover the configured slices.
    pub fn check_width(&self, sheet: &str, available: usize) -> Result<()> {
        let required = self.required_width();
        if available < required {
            return Err(SolarError::Layout {
                sheet: sheet.to_string(),
                required,
                available,
            });
        }
        Ok(())
    }
}

// ── WorkbookLayout ────────────────────────────────────────────────────────────

/// Full workbook configuration: which sheets, in which order, and where
/// their data lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbookLayout {
    pub sheets: Vec<SheetSpec>,
    #[serde(default)]
    pub sheet_layout: SheetLayout,
}

impl Default for WorkbookLayout {
    fn default() -> Self {
        Self {
            sheets: vec![
                SheetSpec::new("CAD 3 2023", "CAD 3"),
                SheetSpec::new("CAD 3 2024", "CAD 3"),
                SheetSpec::new("CAD 3 2025", "CAD 3"),
                SheetSpec::new("CAD 1 2024-2025", "CAD 1"),
            ],
            sheet_layout: SheetLayout::default(),
        }
    }
}

impl WorkbookLayout {
    /// Load a layout override from a JSON file and validate it.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SolarError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let layout: WorkbookLayout = serde_json::from_str(&content)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Check the layout for mistakes that would silently misalign data.
    pub fn validate(&self) -> Result<()> {
        if self.sheets.is_empty() {
            return Err(SolarError::Config(
                "layout lists no sheets to process".to_string(),
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for spec in &self.sheets {
            if spec.sheet_name.trim().is_empty() {
                return Err(SolarError::Config("empty sheet name in layout".to_string()));
            }
            if spec.cad.trim().is_empty() {
                return Err(SolarError::Config(format!(
                    "sheet '{}' has an empty CAD label",
                    spec.sheet_name
                )));
            }
            if !seen.insert(spec.sheet_name.as_str()) {
                return Err(SolarError::Config(format!(
                    "sheet '{}' is listed more than once",
                    spec.sheet_name
                )));
            }
        }

        let layout = &self.sheet_layout;
        if let Some(col) = layout
            .daily_columns
            .iter()
            .find(|c| layout.monthly_columns.contains(*c))
        {
            return Err(SolarError::Config(format!(
                "column {} is used by both the daily and the monthly region",
                col
            )));
        }

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
