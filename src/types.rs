use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One untyped cell as produced by spreadsheet parsing.
///
/// `null` in a JSON table deserializes to `Empty`; the variant order matters
/// for the untagged representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        RawCell::Number(n)
    }
}

impl From<i64> for RawCell {
    fn from(n: i64) -> Self {
        RawCell::Number(n as f64)
    }
}

pub type RawRow = Vec<RawCell>;

/// Row 0 is the header, row 1 a pre-computed total row, rows 2.. are data.
pub type RawTable = Vec<RawRow>;

/// A single minute bucket of booking activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub minute: String,
    pub attempts: i64,
    pub settled: i64,
    pub total_booking: i64,
    pub website_booking: i64,
    pub app_booking: i64,
    pub agents_booking: i64,
    pub swa_rail_app_booking: i64,
    pub i_tkts: i64,
    pub e_tkts: i64,
    pub tatkal: i64,
    pub pg_success_rate: f64,
    pub booking_vs_attempt: f64,
    pub delhi: i64,
    pub chennai: i64,
    pub kolkata: i64,
    pub mumbai: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub value: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEntry {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub total_attempts: i64,
    pub total_settled: i64,
    pub total_bookings: i64,
    pub overall_success_rate: f64,
    pub booking_conversion: f64,
    pub channel_breakdown: Vec<BreakdownEntry>,
    pub ticket_breakdown: Vec<BreakdownEntry>,
    pub city_breakdown: Vec<CityEntry>,
}

/// Metrics the anomaly scanner watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnomalyMetric {
    Attempts,
    PgSuccessRate,
    BookingVsAttempt,
}

impl AnomalyMetric {
    pub const ALL: [AnomalyMetric; 3] = [
        AnomalyMetric::Attempts,
        AnomalyMetric::PgSuccessRate,
        AnomalyMetric::BookingVsAttempt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyMetric::Attempts => "attempts",
            AnomalyMetric::PgSuccessRate => "pgSuccessRate",
            AnomalyMetric::BookingVsAttempt => "bookingVsAttempt",
        }
    }

    pub fn value_of(&self, record: &BookingRecord) -> f64 {
        match self {
            AnomalyMetric::Attempts => record.attempts as f64,
            AnomalyMetric::PgSuccessRate => record.pg_success_rate,
            AnomalyMetric::BookingVsAttempt => record.booking_vs_attempt,
        }
    }
}

impl fmt::Display for AnomalyMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered so that `High` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub minute: String,
    #[serde(rename = "type")]
    pub metric: AnomalyMetric,
    pub value: f64,
    pub threshold: f64,
    pub severity: Severity,
}

/// Everything derived from one loaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedData {
    pub time_series_data: Vec<BookingRecord>,
    pub summary: SummaryReport,
    pub anomalies: Vec<AnomalyRecord>,
}

// Rows below are the on-disk / on-screen shapes of the report data.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ExportRow {
    #[serde(rename = "Minute")]
    #[tabled(rename = "Minute")]
    pub minute: String,
    #[serde(rename = "Attempts")]
    #[tabled(rename = "Attempts")]
    pub attempts: i64,
    #[serde(rename = "Settled")]
    #[tabled(rename = "Settled")]
    pub settled: i64,
    #[serde(rename = "Total Booking")]
    #[tabled(rename = "Total Booking")]
    pub total_booking: i64,
    #[serde(rename = "Website Booking")]
    #[tabled(rename = "Website Booking")]
    pub website_booking: i64,
    #[serde(rename = "App Booking")]
    #[tabled(rename = "App Booking")]
    pub app_booking: i64,
    #[serde(rename = "Agents Booking")]
    #[tabled(rename = "Agents Booking")]
    pub agents_booking: i64,
    #[serde(rename = "SwaRail App Booking")]
    #[tabled(rename = "SwaRail App Booking")]
    pub swa_rail_app_booking: i64,
    #[serde(rename = "I-Tkts")]
    #[tabled(rename = "I-Tkts")]
    pub i_tkts: i64,
    #[serde(rename = "E-Tkts")]
    #[tabled(rename = "E-Tkts")]
    pub e_tkts: i64,
    #[serde(rename = "Tatkal")]
    #[tabled(rename = "Tatkal")]
    pub tatkal: i64,
    #[serde(rename = "PG Success Rate %")]
    #[tabled(rename = "PG Success Rate %")]
    pub pg_success_rate: f64,
    #[serde(rename = "Booking Vs Attempt %")]
    #[tabled(rename = "Booking Vs Attempt %")]
    pub booking_vs_attempt: f64,
    #[serde(rename = "Delhi")]
    #[tabled(rename = "Delhi")]
    pub delhi: i64,
    #[serde(rename = "Chennai")]
    #[tabled(rename = "Chennai")]
    pub chennai: i64,
    #[serde(rename = "Kolkata")]
    #[tabled(rename = "Kolkata")]
    pub kolkata: i64,
    #[serde(rename = "Mumbai")]
    #[tabled(rename = "Mumbai")]
    pub mumbai: i64,
}

impl From<&BookingRecord> for ExportRow {
    fn from(r: &BookingRecord) -> Self {
        ExportRow {
            minute: r.minute.clone(),
            attempts: r.attempts,
            settled: r.settled,
            total_booking: r.total_booking,
            website_booking: r.website_booking,
            app_booking: r.app_booking,
            agents_booking: r.agents_booking,
            swa_rail_app_booking: r.swa_rail_app_booking,
            i_tkts: r.i_tkts,
            e_tkts: r.e_tkts,
            tatkal: r.tatkal,
            pg_success_rate: r.pg_success_rate,
            booking_vs_attempt: r.booking_vs_attempt,
            delhi: r.delhi,
            chennai: r.chennai,
            kolkata: r.kolkata,
            mumbai: r.mumbai,
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MetricRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BreakdownRow {
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AnomalyRow {
    #[serde(rename = "Minute")]
    #[tabled(rename = "Minute")]
    pub minute: String,
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Threshold")]
    #[tabled(rename = "Threshold")]
    pub threshold: String,
    #[serde(rename = "Severity")]
    #[tabled(rename = "Severity")]
    pub severity: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct InsightRow {
    #[serde(rename = "Level")]
    #[tabled(rename = "Level")]
    pub level: String,
    #[serde(rename = "Title")]
    #[tabled(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    #[tabled(rename = "Description")]
    pub description: String,
}
