mod bootstrap;
mod report;

use anyhow::{Context, Result};
use solar_core::layout::WorkbookLayout;
use solar_core::settings::{LastUsedParams, Settings};
use solar_data::{analyze_workbook, RecordFilter};

use report::{OutputFormat, View};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Solar Monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("View: {}, Format: {}", settings.view, settings.format);

    let view = View::parse(&settings.view)?;
    let format = OutputFormat::parse(&settings.format)?;

    let layout = match &settings.layout {
        Some(path) => WorkbookLayout::load_from(path)
            .with_context(|| format!("loading workbook layout from {}", path.display()))?,
        None => WorkbookLayout::default(),
    };
    layout.validate().context("invalid workbook layout")?;

    let cwd = std::env::current_dir().context("reading working directory")?;
    let workbook = bootstrap::resolve_workbook(settings.file.as_deref(), &cwd)?;

    let outcome = analyze_workbook(&workbook, &layout);
    if outcome.metadata.error.is_none() && !settings.clear {
        settings.remember_file(workbook, &LastUsedParams::config_path());
    }

    let filter = build_filter(&settings);
    let dataset = if filter.is_active() {
        let filtered = outcome.dataset.filter(&filter);
        tracing::info!("Filter kept {} of {} records", filtered.len(), outcome.dataset.len());
        filtered
    } else {
        outcome.dataset
    };

    println!("{}", report::render(view, format, &dataset, &outcome.metadata)?);
    Ok(())
}

/// Translate the CLI filter flags into a [`RecordFilter`]; flags left out
/// stay inactive.
fn build_filter(settings: &Settings) -> RecordFilter {
    let mut filter = RecordFilter::new();
    if let Some(from) = settings.from {
        filter = filter.from(from);
    }
    if let Some(to) = settings.to {
        filter = filter.to(to);
    }
    if !settings.years.is_empty() {
        filter = filter.years(settings.years.iter().copied());
    }
    if !settings.months.is_empty() {
        filter = filter.months(settings.months.iter().copied());
    }
    if !settings.cads.is_empty() {
        filter = filter.cads(settings.cads.iter().cloned());
    }
    filter
}
