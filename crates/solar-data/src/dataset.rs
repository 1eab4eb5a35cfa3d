//! The Unified Dataset and its query interface.
//!
//! A [`UnifiedDataset`] is always sorted by Tempo (stable). Filtering keeps
//! that order; other orderings are returned as borrowed views so the
//! dataset itself never loses the invariant.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use solar_core::models::MergedRecord;

use crate::aggregator::{Aggregation, DatasetAggregator, GroupKey, GroupRow};

// ── Measure ───────────────────────────────────────────────────────────────────

/// A numeric column of the Unified Dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    EnergiaKwh,
    PotInvKw,
    PotKwp,
    EnergiaEspecifica,
    Fc,
    MediaEnergiaMensal,
    SomaEnergiaMensal,
    EnergiaEspMensal,
    PrMensal,
    FcMensal,
    IrradiacaoMensal,
}

impl Measure {
    /// Read this measure from a record.
    pub fn value(self, record: &MergedRecord) -> Option<f64> {
        let d = &record.daily;
        let m = &record.monthly;
        match self {
            Measure::EnergiaKwh => d.energia_kwh,
            Measure::PotInvKw => d.pot_inv_kw,
            Measure::PotKwp => d.pot_kwp,
            Measure::EnergiaEspecifica => d.energia_especifica,
            Measure::Fc => d.fc,
            Measure::MediaEnergiaMensal => m.media_energia_mensal,
            Measure::SomaEnergiaMensal => m.soma_energia_mensal,
            Measure::EnergiaEspMensal => m.energia_esp_mensal,
            Measure::PrMensal => m.pr_mensal,
            Measure::FcMensal => m.fc_mensal,
            Measure::IrradiacaoMensal => m.irradiacao_mensal,
        }
    }

    /// Column name as it appears in serialised records.
    pub fn column_name(self) -> &'static str {
        match self {
            Measure::EnergiaKwh => "Energia_kWh",
            Measure::PotInvKw => "Pot_Inv_kW",
            Measure::PotKwp => "Pot_kWp",
            Measure::EnergiaEspecifica => "Energia_Especifica_kWh_kWp",
            Measure::Fc => "FC",
            Measure::MediaEnergiaMensal => "Media_Energia_Mensal",
            Measure::SomaEnergiaMensal => "Soma_Energia_Mensal",
            Measure::EnergiaEspMensal => "Energia_Esp_Mensal",
            Measure::PrMensal => "PR_Mensal",
            Measure::FcMensal => "FC_Mensal",
            Measure::IrradiacaoMensal => "Irradiacao_Mensal",
        }
    }
}

// ── Sorting ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Tempo,
    Ano,
    Mes,
    Cad,
    Measure(Measure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

fn compare_by(key: SortKey, order: SortOrder, a: &MergedRecord, b: &MergedRecord) -> Ordering {
    let directed = |ord: Ordering| match order {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    };

    match key {
        SortKey::Tempo => directed(a.daily.tempo.cmp(&b.daily.tempo)),
        SortKey::Ano => directed(a.daily.ano.cmp(&b.daily.ano)),
        SortKey::Mes => directed(a.daily.mes.cmp(&b.daily.mes)),
        SortKey::Cad => directed(a.cad.cmp(&b.cad)),
        // Absent values go last regardless of direction.
        SortKey::Measure(m) => match (m.value(a), m.value(b)) {
            (Some(x), Some(y)) => directed(x.total_cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

// ── RecordFilter ──────────────────────────────────────────────────────────────

/// Conjunction of optional criteria over Tempo, Ano, Mes and CAD.
///
/// Unset criteria accept everything. A set criterion given an empty
/// collection accepts nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    years: Option<BTreeSet<i32>>,
    months: Option<BTreeSet<u32>>,
    cads: Option<BTreeSet<String>>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep records on or after `date`.
    pub fn from(mut self, date: NaiveDate) -> Self {
        self.from = Some(date);
        self
    }

    /// Keep records on or before `date` (the whole day is included).
    pub fn to(mut self, date: NaiveDate) -> Self {
        self.to = Some(date);
        self
    }

    pub fn years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = Some(years.into_iter().collect());
        self
    }

    pub fn months(mut self, months: impl IntoIterator<Item = u32>) -> Self {
        self.months = Some(months.into_iter().collect());
        self
    }

    pub fn cads<S: Into<String>>(mut self, cads: impl IntoIterator<Item = S>) -> Self {
        self.cads = Some(cads.into_iter().map(Into::into).collect());
        self
    }

    /// Whether any criterion is set.
    pub fn is_active(&self) -> bool {
        self.from.is_some()
            || self.to.is_some()
            || self.years.is_some()
            || self.months.is_some()
            || self.cads.is_some()
    }

    pub fn matches(&self, record: &MergedRecord) -> bool {
        let day = record.daily.tempo.date();
        if self.from.is_some_and(|from| day < from) {
            return false;
        }
        if self.to.is_some_and(|to| day > to) {
            return false;
        }
        if let Some(years) = &self.years {
            if !years.contains(&record.daily.ano) {
                return false;
            }
        }
        if let Some(months) = &self.months {
            if !months.contains(&record.daily.mes) {
                return false;
            }
        }
        if let Some(cads) = &self.cads {
            if !cads.contains(&record.cad) {
                return false;
            }
        }
        true
    }
}

// ── UnifiedDataset ────────────────────────────────────────────────────────────

/// All merged records of a workbook, sorted by Tempo.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UnifiedDataset {
    records: Vec<MergedRecord>,
}

impl UnifiedDataset {
    /// An explicitly empty dataset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a dataset, stably sorting `records` by Tempo.
    pub fn from_records(mut records: Vec<MergedRecord>) -> Self {
        records.sort_by(|a, b| a.daily.tempo.cmp(&b.daily.tempo));
        Self { records }
    }

    pub fn records(&self) -> &[MergedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest Tempo, or `None` when empty.
    pub fn time_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.records.first()?.daily.tempo;
        let last = self.records.last()?.daily.tempo;
        Some((first, last))
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.records.iter().map(|r| r.daily.ano).collect();
        set.into_iter().collect()
    }

    /// Distinct month numbers, ascending.
    pub fn months(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self.records.iter().map(|r| r.daily.mes).collect();
        set.into_iter().collect()
    }

    /// Distinct CAD labels, ascending.
    pub fn cads(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.cad.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Records accepted by `filter`, in dataset order.
    pub fn filter(&self, filter: &RecordFilter) -> UnifiedDataset {
        UnifiedDataset {
            records: self
                .records
                .iter()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect(),
        }
    }

    /// Records stably reordered by `key`.
    pub fn sorted_by(&self, key: SortKey, order: SortOrder) -> Vec<&MergedRecord> {
        let mut view: Vec<&MergedRecord> = self.records.iter().collect();
        view.sort_by(|a, b| compare_by(key, order, a, b));
        view
    }

    /// One measure for every record, in dataset order.
    pub fn column(&self, measure: Measure) -> Vec<Option<f64>> {
        self.records.iter().map(|r| measure.value(r)).collect()
    }

    pub fn tempo_column(&self) -> Vec<NaiveDateTime> {
        self.records.iter().map(|r| r.daily.tempo).collect()
    }

    /// Group by `keys` and compute `aggregations` per group.
    pub fn group_by(&self, keys: &[GroupKey], aggregations: &[Aggregation]) -> Vec<GroupRow> {
        DatasetAggregator::group_by(&self.records, keys, aggregations)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
