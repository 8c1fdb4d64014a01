//! Minute-level railway booking analytics.
//!
//! Raw spreadsheet rows go through three steps:
//! - [`normalizer`] turns untyped cells into [`types::BookingRecord`]s,
//! - [`aggregator`] builds the summary totals and category breakdowns,
//! - [`anomaly`] flags minutes whose z-score stands out.
//!
//! [`pipeline::process_booking_data`] runs all three in one call.

pub mod aggregator;
pub mod anomaly;
pub mod config;
pub mod error;
pub mod insights;
pub mod loader;
pub mod normalizer;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod util;

pub use config::{AnalysisConfig, CategorySet, PgFloorRule};
pub use error::{DashboardError, Result};
pub use pipeline::{process_booking_data, process_with_config};
pub use types::{
    AnomalyMetric, AnomalyRecord, BookingRecord, ProcessedData, RawCell, RawTable, Severity,
    SummaryReport,
};
