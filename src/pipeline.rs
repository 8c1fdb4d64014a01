use crate::aggregator::summarize;
use crate::anomaly::detect_anomalies;
use crate::config::AnalysisConfig;
use crate::normalizer::normalize;
use crate::types::{ProcessedData, RawTable};
use tracing::info;

/// Normalize, aggregate and scan a raw table with the default settings.
pub fn process_booking_data(table: &RawTable) -> ProcessedData {
    process_with_config(table, &AnalysisConfig::default())
}

/// The whole pipeline as one pure call: the same table and config always give
/// the same result, and nothing is cached between calls.
pub fn process_with_config(table: &RawTable, config: &AnalysisConfig) -> ProcessedData {
    let time_series_data = normalize(table);
    let summary = summarize(&time_series_data, &config.categories);
    let anomalies = detect_anomalies(&time_series_data, config);

    info!(
        records = time_series_data.len(),
        anomalies = anomalies.len(),
        "Processed booking data"
    );

    ProcessedData {
        time_series_data,
        summary,
        anomalies,
    }
}
