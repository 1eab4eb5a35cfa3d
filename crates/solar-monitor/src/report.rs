//! Text and JSON rendering of the CLI views.

use anyhow::{bail, Result};
use serde::Serialize;
use solar_core::formatting::{
    display_width, format_mwh, format_number, format_optional, format_percent, pad, Align,
};
use solar_data::summary::{annual_summary, monthly_summary, scatter_points, Kpis};
use solar_data::{LoadMetadata, UnifiedDataset};

pub const NO_DATA_MESSAGE: &str = "No data available for the selected workbook and filters.";

// ── View / format selection ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Summary,
    Annual,
    Monthly,
    Records,
    Scatter,
}

impl View {
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "summary" => View::Summary,
            "annual" => View::Annual,
            "monthly" => View::Monthly,
            "records" => View::Records,
            "scatter" => View::Scatter,
            other => bail!("unknown view '{}'", other),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "table" => OutputFormat::Table,
            "json" => OutputFormat::Json,
            other => bail!("unknown output format '{}'", other),
        })
    }
}

/// Render `view` of `dataset` in `format`.
///
/// An empty dataset renders as [`NO_DATA_MESSAGE`] in table form and as
/// empty arrays (or null KPIs) in JSON.
pub fn render(
    view: View,
    format: OutputFormat,
    dataset: &UnifiedDataset,
    metadata: &LoadMetadata,
) -> Result<String> {
    match format {
        OutputFormat::Json => render_json(view, dataset, metadata),
        OutputFormat::Table if dataset.is_empty() => Ok(NO_DATA_MESSAGE.to_string()),
        OutputFormat::Table => Ok(match view {
            View::Summary => summary_table(dataset, metadata),
            View::Annual => annual_table(dataset),
            View::Monthly => monthly_table(dataset),
            View::Records => records_table(dataset),
            View::Scatter => scatter_table(dataset),
        }),
    }
}

// ── JSON ──────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SummaryJson<'a> {
    kpis: Option<Kpis>,
    records: usize,
    first: Option<String>,
    last: Option<String>,
    cads: Vec<String>,
    metadata: &'a LoadMetadata,
}

fn render_json(view: View, dataset: &UnifiedDataset, metadata: &LoadMetadata) -> Result<String> {
    let text = match view {
        View::Summary => {
            let span = dataset.time_span();
            serde_json::to_string_pretty(&SummaryJson {
                kpis: Kpis::compute(dataset),
                records: dataset.len(),
                first: span.map(|(first, _)| first.to_string()),
                last: span.map(|(_, last)| last.to_string()),
                cads: dataset.cads(),
                metadata,
            })?
        }
        View::Annual => serde_json::to_string_pretty(&annual_summary(dataset))?,
        View::Monthly => serde_json::to_string_pretty(&monthly_summary(dataset))?,
        View::Records => serde_json::to_string_pretty(dataset)?,
        View::Scatter => serde_json::to_string_pretty(&scatter_points(dataset))?,
    };
    Ok(text)
}

// ── Tables ────────────────────────────────────────────────────────────────────

/// Column-aligned text table.
struct Table {
    headers: Vec<&'static str>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(columns: &[(&'static str, Align)]) -> Self {
        Self {
            headers: columns.iter().map(|(h, _)| *h).collect(),
            aligns: columns.iter().map(|(_, a)| *a).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| display_width(c))
                    .chain(std::iter::once(display_width(h)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(widths.iter().zip(self.aligns.iter()))
                .map(|(c, (w, a))| pad(c, *w, *a))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = Vec::with_capacity(self.rows.len() + 2);
        out.push(line(self.headers.clone()));
        out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
        for row in &self.rows {
            out.push(line(row.iter().map(String::as_str).collect()));
        }
        out.join("\n")
    }
}

fn summary_table(dataset: &UnifiedDataset, metadata: &LoadMetadata) -> String {
    let mut table = Table::new(&[("Indicator", Align::Left), ("Value", Align::Right)]);
    let mut add = |label: &'static str, value: String| table.push(vec![label.to_string(), value]);

    add("Records", format_number(dataset.len() as f64, 0));
    if let Some((first, last)) = dataset.time_span() {
        add("First day", first.format("%Y-%m-%d").to_string());
        add("Last day", last.format("%Y-%m-%d").to_string());
    }
    add("CADs", dataset.cads().join(", "));

    if let Some(kpis) = Kpis::compute(dataset) {
        add("Total energy", format_mwh(kpis.total_energy_mwh));
        add("Mean PR", format_percent(kpis.mean_pr, 2));
        add("Mean installed power (kWp)", format_optional(kpis.mean_pot_kwp, 2));
        add("Mean specific energy (kWh/kWp)", format_optional(kpis.mean_specific_energy, 2));
    }

    let mut text = table.render();
    if !metadata.sheets_skipped.is_empty() {
        text.push_str(&format!("\n\nSheets not found: {}", metadata.sheets_skipped.join(", ")));
    }
    if !metadata.unmapped_month_refs.is_empty() {
        text.push_str(&format!(
            "\nUnrecognised month references: {}",
            metadata.unmapped_month_refs.join(", ")
        ));
    }
    text
}

fn annual_table(dataset: &UnifiedDataset) -> String {
    let mut table = Table::new(&[
        ("Ano", Align::Left),
        ("CAD", Align::Left),
        ("Energia (kWh)", Align::Right),
        ("PR médio", Align::Right),
        ("kWp médio", Align::Right),
        ("kWh/kWp médio", Align::Right),
    ]);
    for row in annual_summary(dataset) {
        table.push(vec![
            row.ano.to_string(),
            row.cad,
            format_number(row.energia_kwh, 2),
            format_percent(row.pr_mensal, 2),
            format_optional(row.pot_kwp, 2),
            format_optional(row.energia_especifica, 2),
        ]);
    }
    table.render()
}

fn monthly_table(dataset: &UnifiedDataset) -> String {
    let mut table = Table::new(&[
        ("Ano", Align::Left),
        ("Mês", Align::Left),
        ("CAD", Align::Left),
        ("Energia (kWh)", Align::Right),
        ("PR médio", Align::Right),
        ("kWh/kWp médio", Align::Right),
    ]);
    for row in monthly_summary(dataset) {
        table.push(vec![
            row.ano.to_string(),
            row.mes_nome,
            row.cad,
            format_number(row.energia_kwh, 2),
            format_percent(row.pr_mensal, 2),
            format_optional(row.energia_especifica, 2),
        ]);
    }
    table.render()
}

fn records_table(dataset: &UnifiedDataset) -> String {
    let mut table = Table::new(&[
        ("Tempo", Align::Left),
        ("CAD", Align::Left),
        ("Energia_kWh", Align::Right),
        ("Pot_kWp", Align::Right),
        ("kWh/kWp", Align::Right),
        ("FC", Align::Right),
        ("Mes_Ref", Align::Left),
        ("PR_Mensal", Align::Right),
        ("Irradiacao_Mensal", Align::Right),
    ]);
    for r in dataset.records() {
        table.push(vec![
            r.daily.tempo.format("%Y-%m-%d").to_string(),
            r.cad.clone(),
            format_optional(r.daily.energia_kwh, 2),
            format_optional(r.daily.pot_kwp, 2),
            format_optional(r.daily.energia_especifica, 2),
            format_optional(r.daily.fc, 3),
            r.monthly.mes_ref.clone().unwrap_or_default(),
            format_percent(r.monthly.pr_mensal, 2),
            format_optional(r.monthly.irradiacao_mensal, 2),
        ]);
    }
    table.render()
}

/// Irradiation against energy, one line per record carrying both.
fn scatter_table(dataset: &UnifiedDataset) -> String {
    let mut table = Table::new(&[
        ("Tempo", Align::Left),
        ("Ano", Align::Left),
        ("Irradiacao_Mensal", Align::Right),
        ("Energia_kWh", Align::Right),
        ("PR_Mensal", Align::Right),
    ]);
    for point in scatter_points(dataset) {
        table.push(vec![
            point.tempo.format("%Y-%m-%d").to_string(),
            point.ano.to_string(),
            format_number(point.irradiacao_mensal, 2),
            format_number(point.energia_kwh, 2),
            format_percent(point.pr_mensal, 2),
        ]);
    }
    table.render()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
