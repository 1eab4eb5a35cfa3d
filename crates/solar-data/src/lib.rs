//! Data layer for Solar Monitor.
//!
//! Reads the monitoring workbook, extracts the daily and monthly regions of
//! every configured sheet, joins them, and exposes the combined result as a
//! queryable [`UnifiedDataset`] together with the dashboard summaries.

pub mod aggregator;
pub mod dataset;
pub mod extractor;
pub mod locator;
pub mod merger;
pub mod pipeline;
pub mod summary;
pub mod workbook;

pub use dataset::{Measure, RecordFilter, SortKey, SortOrder, UnifiedDataset};
pub use pipeline::{analyze_workbook, load_dataset, LoadMetadata, LoadOutcome};
pub use solar_core as core;
