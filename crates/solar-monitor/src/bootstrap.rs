use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context};
use solar_data::workbook::find_workbooks;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Workbook name looked for in the working directory before falling back to
/// any spreadsheet found there.
pub const DEFAULT_WORKBOOK_NAME: &str = "Monitoramento (1).xlsx";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.solar-monitor/` and `~/.solar-monitor/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    ensure_directories_in(&home)
}

fn ensure_directories_in(base: &Path) -> anyhow::Result<()> {
    let monitor_dir = base.join(".solar-monitor");
    std::fs::create_dir_all(monitor_dir.join("logs"))
        .with_context(|| format!("creating {}", monitor_dir.display()))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map the CLI level names onto an `EnvFilter` directive.
fn level_directive(log_level: &str) -> &'static str {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug",
        "WARNING" | "WARN" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "info",
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Events go to stderr so stdout only carries the rendered report. With
/// `log_file` set, a second ANSI-free layer appends to that file.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}

// ── Workbook discovery ─────────────────────────────────────────────────────────

/// Look for a workbook in `dir`.
///
/// Checks, in order:
/// 1. `Monitoramento (1).xlsx`
/// 2. the first spreadsheet file directly inside `dir`, by name
pub fn discover_workbook(dir: &Path) -> Option<PathBuf> {
    let default = dir.join(DEFAULT_WORKBOOK_NAME);
    if default.is_file() {
        return Some(default);
    }
    find_workbooks(dir).into_iter().next()
}

/// Pick the workbook to load: the explicit (or remembered) path when given,
/// otherwise whatever [`discover_workbook`] finds in `dir`.
///
/// An explicit path is returned even if it does not exist; the pipeline
/// reports that as an empty dataset.
pub fn resolve_workbook(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match discover_workbook(dir) {
        Some(path) => {
            tracing::info!("Using workbook {}", path.display());
            Ok(path)
        }
        None => bail!(
            "no workbook found: looked for '{}' and any .xlsx/.xlsm/.xls/.ods file in {}; \
             pass --file",
            DEFAULT_WORKBOOK_NAME,
            dir.display()
        ),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
