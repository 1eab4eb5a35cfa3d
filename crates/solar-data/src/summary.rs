//! Dashboard figures computed from a (possibly filtered) dataset.

use chrono::NaiveDateTime;
use serde::Serialize;
use solar_core::months::month_name;

use crate::aggregator::{Aggregation, DatasetAggregator, GroupKey, GroupValue};
use crate::dataset::{Measure, UnifiedDataset};

// ── Kpis ──────────────────────────────────────────────────────────────────────

/// Headline indicators over a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    /// Sum of daily energy, MWh.
    pub total_energy_mwh: f64,
    pub mean_pr: Option<f64>,
    pub mean_pot_kwp: Option<f64>,
    pub mean_specific_energy: Option<f64>,
    pub records: usize,
}

impl Kpis {
    /// `None` for an empty dataset.
    pub fn compute(dataset: &UnifiedDataset) -> Option<Kpis> {
        if dataset.is_empty() {
            return None;
        }

        let totals = DatasetAggregator::totals(
            dataset.records(),
            &[
                Aggregation::sum(Measure::EnergiaKwh),
                Aggregation::mean(Measure::PrMensal),
                Aggregation::mean(Measure::PotKwp),
                Aggregation::mean(Measure::EnergiaEspecifica),
            ],
        );

        Some(Kpis {
            total_energy_mwh: totals[0].unwrap_or(0.0) / 1000.0,
            mean_pr: totals[1],
            mean_pot_kwp: totals[2],
            mean_specific_energy: totals[3],
            records: dataset.len(),
        })
    }
}

// ── Annual summary ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualSummaryRow {
    #[serde(rename = "Ano")]
    pub ano: i32,
    #[serde(rename = "CAD")]
    pub cad: String,
    #[serde(rename = "Energia_kWh")]
    pub energia_kwh: f64,
    #[serde(rename = "PR_Mensal")]
    pub pr_mensal: Option<f64>,
    #[serde(rename = "Pot_kWp")]
    pub pot_kwp: Option<f64>,
    #[serde(rename = "Energia_Especifica_kWh_kWp")]
    pub energia_especifica: Option<f64>,
}

/// Energy summed and ratios averaged per (year, CAD).
pub fn annual_summary(dataset: &UnifiedDataset) -> Vec<AnnualSummaryRow> {
    dataset
        .group_by(
            &[GroupKey::Ano, GroupKey::Cad],
            &[
                Aggregation::sum(Measure::EnergiaKwh),
                Aggregation::mean(Measure::PrMensal),
                Aggregation::mean(Measure::PotKwp),
                Aggregation::mean(Measure::EnergiaEspecifica),
            ],
        )
        .into_iter()
        .filter_map(|row| match row.keys.as_slice() {
            [GroupValue::Ano(ano), GroupValue::Cad(cad)] => Some(AnnualSummaryRow {
                ano: *ano,
                cad: cad.clone(),
                energia_kwh: row.values[0].unwrap_or(0.0),
                pr_mensal: row.values[1],
                pot_kwp: row.values[2],
                energia_especifica: row.values[3],
            }),
            _ => None,
        })
        .collect()
}

// ── Monthly summary ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummaryRow {
    #[serde(rename = "Ano")]
    pub ano: i32,
    #[serde(rename = "Mes")]
    pub mes: u32,
    #[serde(rename = "Mes_Nome")]
    pub mes_nome: String,
    #[serde(rename = "CAD")]
    pub cad: String,
    #[serde(rename = "Energia_kWh")]
    pub energia_kwh: f64,
    #[serde(rename = "PR_Mensal")]
    pub pr_mensal: Option<f64>,
    #[serde(rename = "Energia_Especifica_kWh_kWp")]
    pub energia_especifica: Option<f64>,
}

/// Energy summed and ratios averaged per (year, month, CAD).
pub fn monthly_summary(dataset: &UnifiedDataset) -> Vec<MonthlySummaryRow> {
    dataset
        .group_by(
            &[GroupKey::Ano, GroupKey::Mes, GroupKey::Cad],
            &[
                Aggregation::sum(Measure::EnergiaKwh),
                Aggregation::mean(Measure::PrMensal),
                Aggregation::mean(Measure::EnergiaEspecifica),
            ],
        )
        .into_iter()
        .filter_map(|row| match row.keys.as_slice() {
            [GroupValue::Ano(ano), GroupValue::Mes(mes), GroupValue::Cad(cad)] => {
                Some(MonthlySummaryRow {
                    ano: *ano,
                    mes: *mes,
                    mes_nome: month_name(*mes).unwrap_or_default().to_string(),
                    cad: cad.clone(),
                    energia_kwh: row.values[0].unwrap_or(0.0),
                    pr_mensal: row.values[1],
                    energia_especifica: row.values[2],
                })
            }
            _ => None,
        })
        .collect()
}

// ── Scatter points ────────────────────────────────────────────────────────────

/// One point of the irradiation-versus-energy scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    #[serde(rename = "Irradiacao_Mensal")]
    pub irradiacao_mensal: f64,
    #[serde(rename = "Energia_kWh")]
    pub energia_kwh: f64,
    #[serde(rename = "Ano")]
    pub ano: i32,
    #[serde(rename = "Tempo")]
    pub tempo: NaiveDateTime,
    #[serde(rename = "PR_Mensal")]
    pub pr_mensal: Option<f64>,
}

/// Records carrying both a monthly irradiation and a daily energy value.
pub fn scatter_points(dataset: &UnifiedDataset) -> Vec<ScatterPoint> {
    dataset
        .records()
        .iter()
        .filter_map(|r| {
            Some(ScatterPoint {
                irradiacao_mensal: r.monthly.irradiacao_mensal?,
                energia_kwh: r.daily.energia_kwh?,
                ano: r.daily.ano,
                tempo: r.daily.tempo,
                pr_mensal: r.monthly.pr_mensal,
            })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
