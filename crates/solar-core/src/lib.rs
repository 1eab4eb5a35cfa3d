//! Core types for the solar monitoring pipeline.
//!
//! Holds the record models, the month-name table, raw cell parsing, the
//! static workbook layout, the error taxonomy, CLI settings and the
//! formatting helpers shared by the data and binary crates.

pub mod cells;
pub mod error;
pub mod formatting;
pub mod layout;
pub mod models;
pub mod months;
pub mod settings;

pub use error::{Result, SolarError};
