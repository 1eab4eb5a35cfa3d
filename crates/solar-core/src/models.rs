use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::months::month_name;

/// One day of plant output read from the daily region of a sheet.
///
/// `ano`, `mes` and `mes_nome` are always derived from `tempo` through
/// [`DailyRecord::new`]; they are never read from the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Day (and optional time) of the measurement.
    #[serde(rename = "Tempo")]
    pub tempo: NaiveDateTime,
    /// Energy generated, kWh.
    #[serde(rename = "Energia_kWh")]
    pub energia_kwh: Option<f64>,
    /// Inverter power, kW.
    #[serde(rename = "Pot_Inv_kW")]
    pub pot_inv_kw: Option<f64>,
    /// Installed peak power, kWp.
    #[serde(rename = "Pot_kWp")]
    pub pot_kwp: Option<f64>,
    /// Specific energy, kWh/kWp.
    #[serde(rename = "Energia_Especifica_kWh_kWp")]
    pub energia_especifica: Option<f64>,
    /// Capacity factor.
    #[serde(rename = "FC")]
    pub fc: Option<f64>,
    /// Calendar year of `tempo`.
    #[serde(rename = "Ano")]
    pub ano: i32,
    /// Calendar month of `tempo` (1–12).
    #[serde(rename = "Mes")]
    pub mes: u32,
    /// Portuguese month name of `tempo`.
    #[serde(rename = "Mes_Nome")]
    pub mes_nome: String,
}

/// The five measured values of a daily row, in sheet column order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyMeasures {
    pub energia_kwh: Option<f64>,
    pub pot_inv_kw: Option<f64>,
    pub pot_kwp: Option<f64>,
    pub energia_especifica: Option<f64>,
    pub fc: Option<f64>,
}

impl DailyRecord {
    /// Build a record, deriving the time attributes from `tempo`.
    pub fn new(tempo: NaiveDateTime, measures: DailyMeasures) -> Self {
        let mes = tempo.month();
        Self {
            tempo,
            energia_kwh: measures.energia_kwh,
            pot_inv_kw: measures.pot_inv_kw,
            pot_kwp: measures.pot_kwp,
            energia_especifica: measures.energia_especifica,
            fc: measures.fc,
            ano: tempo.year(),
            mes,
            mes_nome: month_name(mes).unwrap_or_default().to_string(),
        }
    }
}

/// One month of aggregates read from the monthly region of a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// Month reference text as written in the sheet (never empty).
    pub mes_ref: String,
    pub media_energia_mensal: Option<f64>,
    pub soma_energia_mensal: Option<f64>,
    pub energia_esp_mensal: Option<f64>,
    /// Performance ratio for the month, as a fraction.
    pub pr_mensal: Option<f64>,
    pub fc_mensal: Option<f64>,
    /// Mean daily irradiation for the month.
    pub irradiacao_mensal: Option<f64>,
    /// Month number resolved from `mes_ref`; `None` when unmapped.
    pub mes_num: Option<u32>,
}

/// Monthly columns as attached to a merged row. Every field is `None` when
/// the daily row's month had no monthly counterpart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFields {
    #[serde(rename = "Mes_Ref")]
    pub mes_ref: Option<String>,
    #[serde(rename = "Media_Energia_Mensal")]
    pub media_energia_mensal: Option<f64>,
    #[serde(rename = "Soma_Energia_Mensal")]
    pub soma_energia_mensal: Option<f64>,
    #[serde(rename = "Energia_Esp_Mensal")]
    pub energia_esp_mensal: Option<f64>,
    #[serde(rename = "PR_Mensal")]
    pub pr_mensal: Option<f64>,
    #[serde(rename = "FC_Mensal")]
    pub fc_mensal: Option<f64>,
    #[serde(rename = "Irradiacao_Mensal")]
    pub irradiacao_mensal: Option<f64>,
    #[serde(rename = "Mes_Num")]
    pub mes_num: Option<u32>,
}

impl From<&MonthlyRecord> for MonthlyFields {
    fn from(m: &MonthlyRecord) -> Self {
        MonthlyFields {
            mes_ref: Some(m.mes_ref.clone()),
            media_energia_mensal: m.media_energia_mensal,
            soma_energia_mensal: m.soma_energia_mensal,
            energia_esp_mensal: m.energia_esp_mensal,
            pr_mensal: m.pr_mensal,
            fc_mensal: m.fc_mensal,
            irradiacao_mensal: m.irradiacao_mensal,
            mes_num: m.mes_num,
        }
    }
}

/// A daily row joined with its month's aggregates and tagged with the
/// installation group it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    #[serde(flatten)]
    pub daily: DailyRecord,
    #[serde(flatten)]
    pub monthly: MonthlyFields,
    /// Installation group label, e.g. `"CAD 3"`.
    #[serde(rename = "CAD")]
    pub cad: String,
}

impl MergedRecord {
    /// Whether a monthly row was found for this record's month.
    pub fn has_monthly(&self) -> bool {
        self.monthly.mes_ref.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn monthly(name: &str, num: Option<u32>, pr: Option<f64>) -> MonthlyRecord {
        MonthlyRecord {
            mes_ref: name.to_string(),
            media_energia_mensal: Some(100.0),
            soma_energia_mensal: Some(3100.0),
            energia_esp_mensal: Some(120.0),
            pr_mensal: pr,
            fc_mensal: Some(0.18),
            irradiacao_mensal: Some(5.4),
            mes_num: num,
        }
    }

    // ── DailyRecord ────────────────────────────────────────────────────────

    #[test]
    fn test_daily_record_derives_time_fields() {
        let rec = DailyRecord::new(at(2024, 3, 31), DailyMeasures::default());
        assert_eq!(rec.ano, 2024);
        assert_eq!(rec.mes, 3);
        assert_eq!(rec.mes_nome, "Março");
    }

    #[test]
    fn test_daily_record_keeps_measures() {
        let measures = DailyMeasures {
            energia_kwh: Some(512.3),
            pot_inv_kw: Some(75.0),
            pot_kwp: Some(90.0),
            energia_especifica: Some(5.69),
            fc: None,
        };
        let rec = DailyRecord::new(at(2023, 12, 1), measures);
        assert_eq!(rec.energia_kwh, Some(512.3));
        assert_eq!(rec.pot_kwp, Some(90.0));
        assert_eq!(rec.fc, None);
        assert_eq!(rec.mes_nome, "Dezembro");
    }

    // ── MonthlyFields ──────────────────────────────────────────────────────

    #[test]
    fn test_monthly_fields_from_record() {
        let fields = MonthlyFields::from(&monthly("Janeiro", Some(1), Some(0.85)));
        assert_eq!(fields.mes_ref.as_deref(), Some("Janeiro"));
        assert_eq!(fields.pr_mensal, Some(0.85));
        assert_eq!(fields.mes_num, Some(1));
    }

    #[test]
    fn test_monthly_fields_default_all_absent() {
        let fields = MonthlyFields::default();
        assert!(fields.mes_ref.is_none());
        assert!(fields.pr_mensal.is_none());
        assert!(fields.irradiacao_mensal.is_none());
    }

    // ── MergedRecord serde ─────────────────────────────────────────────────

    #[test]
    fn test_merged_record_serializes_with_column_names() {
        let rec = MergedRecord {
            daily: DailyRecord::new(
                at(2023, 1, 15),
                DailyMeasures {
                    energia_kwh: Some(400.0),
                    ..Default::default()
                },
            ),
            monthly: MonthlyFields::from(&monthly("Janeiro", Some(1), Some(0.85))),
            cad: "CAD 3".to_string(),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["Tempo"], "2023-01-15T00:00:00");
        assert_eq!(json["Energia_kWh"], 400.0);
        assert_eq!(json["Ano"], 2023);
        assert_eq!(json["Mes"], 1);
        assert_eq!(json["PR_Mensal"], 0.85);
        assert_eq!(json["CAD"], "CAD 3");
        assert!(rec.has_monthly());
    }

    #[test]
    fn test_merged_record_unmatched_month_serializes_nulls() {
        let rec = MergedRecord {
            daily: DailyRecord::new(at(2023, 2, 10), DailyMeasures::default()),
            monthly: MonthlyFields::default(),
            cad: "CAD 3".to_string(),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json["PR_Mensal"].is_null());
        assert!(json["Mes_Ref"].is_null());
        assert!(!rec.has_monthly());
    }
}
