use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ── Cell ──────────────────────────────────────────────────────────────────────

/// A single raw spreadsheet cell, independent of the reader that produced it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// `true` for empty cells and strings containing only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::String(s) => f.write_str(s),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

// ── RawSheet ──────────────────────────────────────────────────────────────────

/// An untyped grid of cells anchored at A1: `rows[r][c]` is the cell at
/// physical row `r`, column `c`. Rows may be ragged; missing cells read as
/// [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Number of physical rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of physical columns (the widest row).
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at `(row, col)`, or `Empty` when outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }

    /// Iterate over `(row_index, row)` pairs strictly after `header_row`.
    pub fn rows_after(&self, header_row: usize) -> impl Iterator<Item = (usize, &[Cell])> {
        self.rows
            .iter()
            .enumerate()
            .skip(header_row + 1)
            .map(|(idx, row)| (idx, row.as_slice()))
    }
}

// ── CellParser ────────────────────────────────────────────────────────────────

/// Converts raw cells into the typed values the extractors need.
pub struct CellParser;

impl CellParser {
    /// Interpret a cell as a timestamp.
    ///
    /// Handles:
    /// * `DateTime` cells → used as-is.
    /// * strings → ISO 8601 date / date-time, or day-first `dd/mm/yyyy`
    ///   forms.
    /// * everything else (numbers, booleans, empty) → `None`.
    pub fn parse_date(cell: &Cell) -> Option<NaiveDateTime> {
        match cell {
            Cell::DateTime(dt) => Some(*dt),
            Cell::String(s) => Self::parse_date_str(s.trim()),
            _ => None,
        }
    }

    fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
        if s.is_empty() {
            return None;
        }

        const DATETIME_FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%d/%m/%Y %H:%M:%S",
            "%d/%m/%Y %H:%M",
        ];
        const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        debug!("CellParser: \"{}\" is not a date", s);
        None
    }

    /// Interpret a cell as a real number; `None` when absent or non-numeric.
    ///
    /// Numeric strings are accepted, including a single decimal comma
    /// (`"0,85"`).
    pub fn parse_real(cell: &Cell) -> Option<f64> {
        match cell {
            Cell::Float(x) if x.is_finite() => Some(*x),
            Cell::Int(i) => Some(*i as f64),
            Cell::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .or_else(|| {
                        if trimmed.matches(',').count() == 1 && !trimmed.contains('.') {
                            trimmed.replace(',', ".").parse::<f64>().ok()
                        } else {
                            None
                        }
                    })
                    .filter(|x| x.is_finite())
            }
            _ => None,
        }
    }

    /// Render a cell as trimmed text, `None` when blank.
    pub fn parse_text(cell: &Cell) -> Option<String> {
        if cell.is_blank() {
            return None;
        }
        Some(cell.to_string().trim().to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    // ── RawSheet ──────────────────────────────────────────────────────────────

    #[test]
    fn test_raw_sheet_dimensions_ragged_rows() {
        let sheet = RawSheet::new(vec![
            vec![Cell::String("banner".into())],
            vec![Cell::Empty, Cell::Empty, Cell::Int(3)],
        ]);
        assert_eq!(sheet.height(), 2);
        assert_eq!(sheet.width(), 3);
        assert_eq!(sheet.cell(0, 2), &Cell::Empty);
        assert_eq!(sheet.cell(1, 2), &Cell::Int(3));
        assert_eq!(sheet.cell(9, 9), &Cell::Empty);
    }

    #[test]
    fn test_raw_sheet_rows_after_header() {
        let sheet = RawSheet::new(vec![
            vec![Cell::String("banner".into())],
            vec![Cell::String("Tempo".into())],
            vec![Cell::Int(1)],
            vec![Cell::Int(2)],
        ]);
        let indices: Vec<usize> = sheet.rows_after(1).map(|(i, _)| i).collect();
        assert_eq!(indices, vec![2, 3]);
    }

    #[test]
    fn test_raw_sheet_empty() {
        let sheet = RawSheet::default();
        assert_eq!(sheet.height(), 0);
        assert_eq!(sheet.width(), 0);
        assert_eq!(sheet.rows_after(1).count(), 0);
    }

    // ── parse_date ────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_date_datetime_cell() {
        let dt = ymd(2023, 1, 15);
        assert_eq!(CellParser::parse_date(&Cell::DateTime(dt)), Some(dt));
    }

    #[test]
    fn test_parse_date_iso_string() {
        let cell = Cell::String("2023-02-10".into());
        assert_eq!(CellParser::parse_date(&cell), Some(ymd(2023, 2, 10)));
    }

    #[test]
    fn test_parse_date_iso_datetime_string() {
        let cell = Cell::String("2023-02-10 13:30:00".into());
        let expected = NaiveDate::from_ymd_opt(2023, 2, 10)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        assert_eq!(CellParser::parse_date(&cell), Some(expected));
    }

    #[test]
    fn test_parse_date_day_first_string() {
        let cell = Cell::String(" 05/03/2024 ".into());
        assert_eq!(CellParser::parse_date(&cell), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_parse_date_rejects_non_dates() {
        assert_eq!(CellParser::parse_date(&Cell::Empty), None);
        assert_eq!(CellParser::parse_date(&Cell::String(String::new())), None);
        assert_eq!(CellParser::parse_date(&Cell::String("Total".into())), None);
        assert_eq!(CellParser::parse_date(&Cell::Float(45000.0)), None);
        assert_eq!(CellParser::parse_date(&Cell::Bool(true)), None);
        assert_eq!(CellParser::parse_date(&Cell::String("2023-13-40".into())), None);
    }

    // ── parse_real ────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_real_numeric_cells() {
        assert_eq!(CellParser::parse_real(&Cell::Float(12.5)), Some(12.5));
        assert_eq!(CellParser::parse_real(&Cell::Int(7)), Some(7.0));
        assert_eq!(CellParser::parse_real(&Cell::Float(f64::NAN)), None);
    }

    #[test]
    fn test_parse_real_strings() {
        assert_eq!(CellParser::parse_real(&Cell::String(" 0.85 ".into())), Some(0.85));
        assert_eq!(CellParser::parse_real(&Cell::String("0,85".into())), Some(0.85));
        assert_eq!(CellParser::parse_real(&Cell::String("1,234.5".into())), None);
        assert_eq!(CellParser::parse_real(&Cell::String("n/a".into())), None);
        assert_eq!(CellParser::parse_real(&Cell::String("  ".into())), None);
    }

    #[test]
    fn test_parse_real_zero_is_present() {
        assert_eq!(CellParser::parse_real(&Cell::Float(0.0)), Some(0.0));
    }

    #[test]
    fn test_parse_real_other_cells_absent() {
        assert_eq!(CellParser::parse_real(&Cell::Empty), None);
        assert_eq!(CellParser::parse_real(&Cell::Bool(false)), None);
        assert_eq!(CellParser::parse_real(&Cell::DateTime(ymd(2023, 1, 1))), None);
    }

    // ── parse_text ────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_text() {
        assert_eq!(
            CellParser::parse_text(&Cell::String("  Janeiro ".into())),
            Some("Janeiro".to_string())
        );
        assert_eq!(CellParser::parse_text(&Cell::Int(3)), Some("3".to_string()));
        assert_eq!(CellParser::parse_text(&Cell::Empty), None);
        assert_eq!(CellParser::parse_text(&Cell::String(" ".into())), None);
    }
}
