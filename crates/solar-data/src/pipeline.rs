//! Workbook-to-dataset pipeline.
//!
//! Locates the configured sheets, extracts and merges each one in
//! configuration order, then combines everything into a single
//! [`UnifiedDataset`] sorted by Tempo. Failures never escape
//! [`analyze_workbook`]: they are logged and turned into an empty dataset.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use solar_core::layout::WorkbookLayout;
use solar_core::models::MergedRecord;
use solar_core::Result;
use tracing::{debug, error, info, warn};

use crate::dataset::UnifiedDataset;
use crate::extractor::{extract_daily, extract_monthly};
use crate::locator::locate_sheets;
use crate::merger::merge_sheet;
use crate::workbook::{Workbook, XlsxWorkbook};

// ── Public types ──────────────────────────────────────────────────────────────

/// Counters and diagnostics collected while building a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Configured sheets found and processed, in processing order.
    pub sheets_processed: Vec<String>,
    /// Configured sheets absent from the workbook.
    pub sheets_skipped: Vec<String>,
    pub daily_rows: usize,
    /// Daily rows dropped for lack of a valid date.
    pub daily_rows_dropped: usize,
    pub monthly_rows: usize,
    /// Monthly rows dropped for lack of a month reference.
    pub monthly_rows_dropped: usize,
    /// Distinct month references that matched no month name.
    pub unmapped_month_refs: Vec<String>,
    /// Records in the final dataset.
    pub merged_rows: usize,
    /// Wall-clock seconds spent reading and transforming the workbook.
    pub load_time_seconds: f64,
    /// Set when the pipeline failed and the dataset is empty because of it.
    pub error: Option<String>,
}

/// The complete output of [`analyze_workbook`].
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub dataset: UnifiedDataset,
    pub metadata: LoadMetadata,
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Run the pipeline over the workbook file at `path`.
///
/// Never fails: an unreadable file, a sheet that cannot be read or a sheet
/// narrower than the layout requires is logged with full detail and yields
/// an empty dataset with `metadata.error` set.
pub fn analyze_workbook(path: &Path, layout: &WorkbookLayout) -> LoadOutcome {
    let start = Instant::now();
    info!("Loading workbook {}", path.display());

    let result =
        XlsxWorkbook::open(path).and_then(|mut workbook| build_dataset(&mut workbook, layout));

    match result {
        Ok(mut outcome) => {
            outcome.metadata.load_time_seconds = start.elapsed().as_secs_f64();
            info!(
                "Loaded {} records from {} sheet(s) in {:.3}s",
                outcome.metadata.merged_rows,
                outcome.metadata.sheets_processed.len(),
                outcome.metadata.load_time_seconds
            );
            outcome
        }
        Err(e) => {
            error!("Failed to process workbook {}: {}", path.display(), e);
            LoadOutcome {
                dataset: UnifiedDataset::empty(),
                metadata: LoadMetadata {
                    generated_at: Utc::now().to_rfc3339(),
                    load_time_seconds: start.elapsed().as_secs_f64(),
                    error: Some(e.to_string()),
                    ..Default::default()
                },
            }
        }
    }
}

/// Run the pipeline and keep only the dataset.
pub fn load_dataset(path: &Path, layout: &WorkbookLayout) -> UnifiedDataset {
    analyze_workbook(path, layout).dataset
}

/// Build the dataset from an already opened workbook.
///
/// Unlike [`analyze_workbook`] this propagates the first error; no partial
/// dataset is ever returned.
pub fn build_dataset<W: Workbook>(
    workbook: &mut W,
    layout: &WorkbookLayout,
) -> Result<LoadOutcome> {
    let available = workbook.sheet_names();
    let selection = locate_sheets(&layout.sheets, &available);
    let sheet_layout = &layout.sheet_layout;

    let mut metadata = LoadMetadata {
        generated_at: Utc::now().to_rfc3339(),
        sheets_skipped: selection.missing.clone(),
        ..Default::default()
    };
    let mut unmapped: BTreeSet<String> = BTreeSet::new();
    let mut per_sheet: Vec<Vec<MergedRecord>> = Vec::with_capacity(selection.present.len());

    for spec in &selection.present {
        let sheet = workbook.read_sheet(&spec.sheet_name)?;
        sheet_layout.check_width(&spec.sheet_name, sheet.width())?;

        let daily = extract_daily(&sheet, sheet_layout);
        let monthly = extract_monthly(&sheet, sheet_layout);
        let merged = merge_sheet(&daily.records, &monthly.records, &spec.cad);

        debug!(
            "Sheet '{}': {} daily, {} monthly, {} merged",
            spec.sheet_name,
            daily.records.len(),
            monthly.records.len(),
            merged.len()
        );

        metadata.sheets_processed.push(spec.sheet_name.clone());
        metadata.daily_rows += daily.records.len();
        metadata.daily_rows_dropped += daily.rows_without_date;
        metadata.monthly_rows += monthly.records.len();
        metadata.monthly_rows_dropped += monthly.rows_without_reference;
        unmapped.extend(monthly.unmapped_references);
        per_sheet.push(merged);
    }

    for reference in &unmapped {
        warn!("Month reference '{}' matches no month name", reference);
    }
    metadata.unmapped_month_refs = unmapped.into_iter().collect();

    let dataset = combine(per_sheet);
    metadata.merged_rows = dataset.len();
    if dataset.is_empty() {
        info!("No records produced; dataset is empty");
    }

    Ok(LoadOutcome { dataset, metadata })
}

/// Concatenate per-sheet records in the given order and stably sort by Tempo.
pub fn combine(per_sheet: Vec<Vec<MergedRecord>>) -> UnifiedDataset {
    UnifiedDataset::from_records(per_sheet.into_iter().flatten().collect())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_xlsxwriter::{ExcelDateTime, Format};
    use solar_core::cells::{Cell, RawSheet};
    use solar_core::layout::SheetSpec;
    use solar_core::SolarError;
    use tempfile::TempDir;

    use crate::workbook::MemoryWorkbook;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn empty_row() -> Vec<Cell> {
        vec![Cell::Empty; 18]
    }

    /// Banner + header followed by `data` rows, 18 columns wide.
    fn sheet(data: Vec<Vec<Cell>>) -> RawSheet {
        let mut banner = empty_row();
        banner[0] = Cell::String("Monitoramento".into());
        let mut header = empty_row();
        header[0] = Cell::String("Tempo".into());
        header[8] = Cell::String("Mês".into());

        let mut rows = vec![banner, header];
        rows.extend(data);
        RawSheet::new(rows)
    }

    fn daily_row(tempo: Cell, energia: f64) -> Vec<Cell> {
        let mut row = empty_row();
        row[0] = tempo;
        row[1] = Cell::Float(energia);
        row[3] = Cell::Float(100.0);
        row
    }

    fn with_month(mut row: Vec<Cell>, name: &str, pr: f64) -> Vec<Cell> {
        row[8] = Cell::String(name.into());
        row[12] = Cell::Float(pr);
        row[17] = Cell::Float(160.0);
        row
    }

    fn cad3_2023() -> RawSheet {
        sheet(vec![
            with_month(daily_row(Cell::DateTime(day(2023, 1, 15)), 400.0), "Janeiro", 0.85),
            daily_row(Cell::DateTime(day(2023, 2, 10)), 380.0),
        ])
    }

    // ── build_dataset ─────────────────────────────────────────────────────────

    #[test]
    fn test_single_sheet_scenario() {
        let mut workbook = MemoryWorkbook::new().with_sheet("CAD 3 2023", cad3_2023());
        let outcome = build_dataset(&mut workbook, &WorkbookLayout::default()).unwrap();
        let records = outcome.dataset.records();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.cad == "CAD 3"));
        assert_eq!(records[0].daily.tempo, day(2023, 1, 15));
        assert_eq!(records[0].monthly.pr_mensal, Some(0.85));
        assert_eq!(records[1].daily.tempo, day(2023, 2, 10));
        assert_eq!(records[1].monthly.pr_mensal, None);

        let meta = &outcome.metadata;
        assert_eq!(meta.sheets_processed, vec!["CAD 3 2023"]);
        assert_eq!(meta.sheets_skipped, vec!["CAD 3 2024", "CAD 3 2025", "CAD 1 2024-2025"]);
        assert_eq!(meta.daily_rows, 2);
        assert_eq!(meta.monthly_rows, 1);
        assert_eq!(meta.monthly_rows_dropped, 1);
        assert_eq!(meta.merged_rows, 2);
        assert_eq!(meta.error, None);
    }

    #[test]
    fn test_all_sheets_missing_gives_empty_dataset() {
        let mut workbook = MemoryWorkbook::new()
            .with_sheet("Plan1", cad3_2023())
            .with_sheet("Resumo", RawSheet::default());
        let outcome = build_dataset(&mut workbook, &WorkbookLayout::default()).unwrap();
        assert!(outcome.dataset.is_empty());
        assert!(outcome.metadata.sheets_processed.is_empty());
        assert_eq!(outcome.metadata.sheets_skipped.len(), 4);
    }

    #[test]
    fn test_empty_tempo_drops_exactly_one_row() {
        let build = |tempo: Cell| {
            let data = sheet(vec![
                daily_row(Cell::DateTime(day(2023, 1, 1)), 1.0),
                daily_row(tempo, 2.0),
                daily_row(Cell::DateTime(day(2023, 1, 3)), 3.0),
            ]);
            let mut workbook = MemoryWorkbook::new().with_sheet("CAD 3 2023", data);
            build_dataset(&mut workbook, &WorkbookLayout::default()).unwrap()
        };

        let valid = build(Cell::DateTime(day(2023, 1, 2)));
        let invalid = build(Cell::String(String::new()));
        assert_eq!(valid.dataset.len(), 3);
        assert_eq!(invalid.dataset.len(), 2);
        assert_eq!(invalid.metadata.daily_rows_dropped, 1);
        assert!(invalid
            .dataset
            .records()
            .iter()
            .all(|r| r.daily.energia_kwh != Some(2.0)));
    }

    #[test]
    fn test_equal_tempo_keeps_sheet_processing_order() {
        let cad1 = sheet(vec![daily_row(Cell::DateTime(day(2024, 6, 1)), 10.0)]);
        let cad3 = sheet(vec![
            daily_row(Cell::DateTime(day(2024, 6, 2)), 20.0),
            daily_row(Cell::DateTime(day(2024, 6, 1)), 30.0),
        ]);
        // Workbook order differs from configuration order on purpose.
        let mut workbook = MemoryWorkbook::new()
            .with_sheet("CAD 1 2024-2025", cad1)
            .with_sheet("CAD 3 2024", cad3);

        let outcome = build_dataset(&mut workbook, &WorkbookLayout::default()).unwrap();
        let order: Vec<(&str, Option<f64>)> = outcome
            .dataset
            .records()
            .iter()
            .map(|r| (r.cad.as_str(), r.daily.energia_kwh))
            .collect();
        assert_eq!(
            order,
            vec![("CAD 3", Some(30.0)), ("CAD 1", Some(10.0)), ("CAD 3", Some(20.0))]
        );
        assert_eq!(outcome.metadata.sheets_processed, vec!["CAD 3 2024", "CAD 1 2024-2025"]);
    }

    #[test]
    fn test_time_fields_consistent_with_tempo() {
        let mut workbook = MemoryWorkbook::new().with_sheet(
            "CAD 3 2025",
            sheet(vec![
                daily_row(Cell::String("31/12/2024".into()), 1.0),
                daily_row(Cell::String("2025-03-01 06:00:00".into()), 2.0),
            ]),
        );
        let outcome = build_dataset(&mut workbook, &WorkbookLayout::default()).unwrap();
        for r in outcome.dataset.records() {
            use chrono::Datelike;
            assert_eq!(r.daily.ano, r.daily.tempo.year());
            assert_eq!(r.daily.mes, r.daily.tempo.month());
        }
    }

    #[test]
    fn test_left_join_totality_with_duplicate_month_reference() {
        let data = sheet(vec![
            with_month(daily_row(Cell::DateTime(day(2023, 1, 1)), 1.0), "Janeiro", 0.85),
            with_month(daily_row(Cell::DateTime(day(2023, 2, 1)), 2.0), "Mar√ßo", 0.80),
            daily_row(Cell::DateTime(day(2023, 3, 1)), 3.0),
        ]);
        let mut workbook = MemoryWorkbook::new().with_sheet("CAD 3 2023", data);
        let outcome = build_dataset(&mut workbook, &WorkbookLayout::default()).unwrap();

        assert_eq!(outcome.dataset.len(), 3);
        assert_eq!(outcome.metadata.unmapped_month_refs, vec!["Mar√ßo"]);
        assert!(!outcome.dataset.records()[2].has_monthly());
    }

    #[test]
    fn test_narrow_sheet_is_layout_error() {
        let narrow = RawSheet::new(vec![
            vec![Cell::Empty; 10],
            vec![Cell::Empty; 10],
            vec![Cell::DateTime(day(2023, 1, 1))],
        ]);
        let mut workbook = MemoryWorkbook::new().with_sheet("CAD 3 2023", narrow);
        let err = build_dataset(&mut workbook, &WorkbookLayout::default()).unwrap_err();
        assert!(matches!(
            err,
            SolarError::Layout {
                required: 18,
                available: 10,
                ..
            }
        ));
    }

    #[test]
    fn test_custom_layout_cad_label() {
        let layout = WorkbookLayout {
            sheets: vec![SheetSpec::new("Usina Norte", "CAD 7")],
            ..Default::default()
        };
        let mut workbook = MemoryWorkbook::new().with_sheet("Usina Norte", cad3_2023());
        let outcome = build_dataset(&mut workbook, &layout).unwrap();
        assert_eq!(outcome.dataset.cads(), vec!["CAD 7"]);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut workbook = MemoryWorkbook::new()
            .with_sheet("CAD 3 2023", cad3_2023())
            .with_sheet("CAD 1 2024-2025", cad3_2023());
        let first = build_dataset(&mut workbook, &WorkbookLayout::default()).unwrap();
        let second = build_dataset(&mut workbook, &WorkbookLayout::default()).unwrap();
        assert_eq!(first.dataset, second.dataset);
    }

    // ── combine ───────────────────────────────────────────────────────────────

    #[test]
    fn test_combine_nothing_is_empty() {
        assert!(combine(Vec::new()).is_empty());
        assert!(combine(vec![Vec::new(), Vec::new()]).is_empty());
    }

    // ── analyze_workbook ──────────────────────────────────────────────────────

    fn write_workbook(path: &Path) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        let ws = workbook.add_worksheet();
        ws.set_name("CAD 3 2023").unwrap();
        ws.write_string(0, 0, "Monitoramento CAD 3").unwrap();
        ws.write_string(1, 0, "Tempo").unwrap();
        ws.write_string(1, 17, "Irradiação").unwrap();

        let days = [(1, 15, 400.0), (2, 10, 380.0)];
        for (i, (m, d, energia)) in days.into_iter().enumerate() {
            let row = 2 + i as u32;
            let tempo = ExcelDateTime::from_ymd(2023, m, d).unwrap();
            ws.write_datetime_with_format(row, 0, &tempo, &date_format).unwrap();
            ws.write_number(row, 1, energia).unwrap();
        }
        ws.write_string(2, 8, "Janeiro").unwrap();
        ws.write_number(2, 12, 0.85).unwrap();
        ws.write_number(2, 17, 165.0).unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_analyze_real_workbook_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Monitoramento.xlsx");
        write_workbook(&path);

        let outcome = analyze_workbook(&path, &WorkbookLayout::default());
        assert_eq!(outcome.metadata.error, None);
        let records = outcome.dataset.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].daily.tempo, day(2023, 1, 15));
        assert_eq!(records[0].monthly.pr_mensal, Some(0.85));
        assert_eq!(records[0].monthly.irradiacao_mensal, Some(165.0));
        assert_eq!(records[1].monthly.pr_mensal, None);
        assert!(outcome.metadata.load_time_seconds >= 0.0);

        // Unchanged file, identical result.
        assert_eq!(load_dataset(&path, &WorkbookLayout::default()), outcome.dataset);
    }

    #[test]
    fn test_analyze_missing_file_is_empty_with_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.xlsx");
        let outcome = analyze_workbook(&missing, &WorkbookLayout::default());
        assert!(outcome.dataset.is_empty());
        assert!(outcome.metadata.error.is_some());
    }

    #[test]
    fn test_analyze_corrupt_file_is_empty_with_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"PK\x03\x04 truncated").unwrap();
        let outcome = analyze_workbook(&path, &WorkbookLayout::default());
        assert!(outcome.dataset.is_empty());
        assert!(outcome.metadata.error.is_some());
    }
}
