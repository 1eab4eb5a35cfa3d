//! Group-by aggregation over merged records.

use std::collections::BTreeMap;

use serde::Serialize;
use solar_core::models::MergedRecord;

use crate::dataset::Measure;

// ── Keys and functions ────────────────────────────────────────────────────────

/// Column a group-by may key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Ano,
    Mes,
    Cad,
}

/// The value of one [`GroupKey`] for a group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupValue {
    Ano(i32),
    Mes(u32),
    Cad(String),
}

impl GroupKey {
    fn value_of(self, record: &MergedRecord) -> GroupValue {
        match self {
            GroupKey::Ano => GroupValue::Ano(record.daily.ano),
            GroupKey::Mes => GroupValue::Mes(record.daily.mes),
            GroupKey::Cad => GroupValue::Cad(record.cad.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFn {
    Sum,
    Mean,
}

/// One aggregate column: a function applied to a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregation {
    pub measure: Measure,
    pub func: AggFn,
}

impl Aggregation {
    pub fn sum(measure: Measure) -> Self {
        Self {
            measure,
            func: AggFn::Sum,
        }
    }

    pub fn mean(measure: Measure) -> Self {
        Self {
            measure,
            func: AggFn::Mean,
        }
    }
}

// ── MeasureStats ──────────────────────────────────────────────────────────────

/// Running sum and count of the present values of one measure.
#[derive(Debug, Clone, Copy, Default)]
struct MeasureStats {
    sum: f64,
    present: usize,
}

impl MeasureStats {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.present += 1;
        }
    }

    /// `Sum` of nothing is `0.0`; `Mean` of nothing is absent.
    fn finish(&self, func: AggFn) -> Option<f64> {
        match func {
            AggFn::Sum => Some(self.sum),
            AggFn::Mean if self.present == 0 => None,
            AggFn::Mean => Some(self.sum / self.present as f64),
        }
    }
}

// ── GroupRow ──────────────────────────────────────────────────────────────────

/// One group: its key values (in the requested key order), the number of
/// records in it and one value per requested aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub keys: Vec<GroupValue>,
    pub count: usize,
    pub values: Vec<Option<f64>>,
}

impl GroupRow {
    /// Key value for `key`, when `key` was part of the grouping.
    pub fn key(&self, key: GroupKey, keys: &[GroupKey]) -> Option<&GroupValue> {
        keys.iter()
            .position(|k| *k == key)
            .and_then(|i| self.keys.get(i))
    }
}

// ── DatasetAggregator ─────────────────────────────────────────────────────────

/// Stateless group-by over record slices.
pub struct DatasetAggregator;

impl DatasetAggregator {
    /// Group `records` by `keys` and evaluate `aggregations` per group.
    ///
    /// Groups are returned in ascending key order. Absent values are
    /// skipped. With no keys the whole input forms a single group (none
    /// when the input is empty).
    pub fn group_by(
        records: &[MergedRecord],
        keys: &[GroupKey],
        aggregations: &[Aggregation],
    ) -> Vec<GroupRow> {
        let mut groups: BTreeMap<Vec<GroupValue>, (usize, Vec<MeasureStats>)> = BTreeMap::new();

        for record in records {
            let key: Vec<GroupValue> = keys.iter().map(|k| k.value_of(record)).collect();
            let (count, stats) = groups
                .entry(key)
                .or_insert_with(|| (0, vec![MeasureStats::default(); aggregations.len()]));
            *count += 1;
            for (agg, stat) in aggregations.iter().zip(stats.iter_mut()) {
                stat.add(agg.measure.value(record));
            }
        }

        groups
            .into_iter()
            .map(|(keys, (count, stats))| GroupRow {
                keys,
                count,
                values: aggregations
                    .iter()
                    .zip(stats.iter())
                    .map(|(agg, stat)| stat.finish(agg.func))
                    .collect(),
            })
            .collect()
    }

    /// Evaluate `aggregations` over all of `records`.
    pub fn totals(records: &[MergedRecord], aggregations: &[Aggregation]) -> Vec<Option<f64>> {
        let mut stats = vec![MeasureStats::default(); aggregations.len()];
        for record in records {
            for (agg, stat) in aggregations.iter().zip(stats.iter_mut()) {
                stat.add(agg.measure.value(record));
            }
        }
        aggregations
            .iter()
            .zip(stats.iter())
            .map(|(agg, stat)| stat.finish(agg.func))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
