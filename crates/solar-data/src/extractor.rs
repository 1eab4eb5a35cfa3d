//! Row extraction from the two fixed-position regions of a sheet.
//!
//! Both extractors are infallible: cells that cannot be parsed become
//! absent values, and rows without their key (a date for the daily region,
//! a month reference for the monthly one) are dropped and counted. The
//! caller is expected to have checked the sheet width against the layout.

use std::collections::BTreeSet;

use solar_core::cells::{CellParser, RawSheet};
use solar_core::layout::SheetLayout;
use solar_core::models::{DailyMeasures, DailyRecord, MonthlyRecord};
use solar_core::months::month_number;
use tracing::debug;

// ── Daily region ──────────────────────────────────────────────────────────────

/// Records read from the daily region of one sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyExtraction {
    pub records: Vec<DailyRecord>,
    /// Data rows whose Tempo cell was empty or not a date.
    pub rows_without_date: usize,
}

/// Read every data row of the daily region, in sheet order.
pub fn extract_daily(sheet: &RawSheet, layout: &SheetLayout) -> DailyExtraction {
    let [tempo_col, energia_col, pot_inv_col, pot_kwp_col, especifica_col, fc_col] =
        layout.daily_columns;
    let mut extraction = DailyExtraction::default();

    for (row, _) in sheet.rows_after(layout.header_row) {
        let Some(tempo) = CellParser::parse_date(sheet.cell(row, tempo_col)) else {
            extraction.rows_without_date += 1;
            continue;
        };

        let real = |col: usize| CellParser::parse_real(sheet.cell(row, col));
        let measures = DailyMeasures {
            energia_kwh: real(energia_col),
            pot_inv_kw: real(pot_inv_col),
            pot_kwp: real(pot_kwp_col),
            energia_especifica: real(especifica_col),
            fc: real(fc_col),
        };
        extraction.records.push(DailyRecord::new(tempo, measures));
    }

    debug!(
        "Daily region: {} records, {} rows without a date",
        extraction.records.len(),
        extraction.rows_without_date
    );
    extraction
}

// ── Monthly region ────────────────────────────────────────────────────────────

/// Records read from the monthly region of one sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyExtraction {
    pub records: Vec<MonthlyRecord>,
    /// Data rows with no month reference text.
    pub rows_without_reference: usize,
    /// Month references kept but not recognised as a Portuguese month name.
    pub unmapped_references: BTreeSet<String>,
}

/// Read every data row of the monthly region, in sheet order.
///
/// The region is usually only twelve rows tall while the daily region runs
/// for a whole year, so most rows end up counted as having no reference.
pub fn extract_monthly(sheet: &RawSheet, layout: &SheetLayout) -> MonthlyExtraction {
    let [ref_col, media_col, soma_col, esp_col, pr_col, fc_col, irradiacao_col] =
        layout.monthly_columns;
    let mut extraction = MonthlyExtraction::default();

    for (row, _) in sheet.rows_after(layout.header_row) {
        let Some(mes_ref) = CellParser::parse_text(sheet.cell(row, ref_col)) else {
            extraction.rows_without_reference += 1;
            continue;
        };

        let mes_num = month_number(&mes_ref);
        if mes_num.is_none() {
            extraction.unmapped_references.insert(mes_ref.clone());
        }

        let real = |col: usize| CellParser::parse_real(sheet.cell(row, col));
        extraction.records.push(MonthlyRecord {
            media_energia_mensal: real(media_col),
            soma_energia_mensal: real(soma_col),
            energia_esp_mensal: real(esp_col),
            pr_mensal: real(pr_col),
            fc_mensal: real(fc_col),
            irradiacao_mensal: real(irradiacao_col),
            mes_ref,
            mes_num,
        });
    }

    debug!(
        "Monthly region: {} records, {} unmapped references",
        extraction.records.len(),
        extraction.unmapped_references.len()
    );
    extraction
}

// ── Tests ─────────────────────────────────────────────────────────────────────
