use crate::error::Result;
use crate::insights::Insight;
use crate::types::{
    AnomalyRecord, AnomalyRow, BookingRecord, BreakdownEntry, BreakdownRow, CityEntry, ExportRow,
    InsightRow, MetricRow, ProcessedData, SummaryReport,
};
use crate::util::{format_int, format_number, percent_of};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = rows.len(), "Wrote CSV");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    debug!(path = %path.display(), "Wrote JSON");
    Ok(())
}

pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)?;
    debug!(path = %path.display(), bytes = contents.len(), "Wrote text report");
    Ok(())
}

/// Render the first `max_rows` rows as a markdown table, or `(no rows)`.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}

/// Case-insensitive substring match on the minute label; an empty term keeps
/// every record.
pub fn filter_by_minute<'a>(records: &'a [BookingRecord], term: &str) -> Vec<&'a BookingRecord> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|r| r.minute.to_lowercase().contains(&needle))
        .collect()
}

pub fn export_rows(records: &[BookingRecord], minute_filter: Option<&str>) -> Vec<ExportRow> {
    match minute_filter {
        Some(term) => filter_by_minute(records, term)
            .into_iter()
            .map(ExportRow::from)
            .collect(),
        None => records.iter().map(ExportRow::from).collect(),
    }
}

pub fn summary_rows(summary: &SummaryReport) -> Vec<MetricRow> {
    let row = |metric: &str, value: String| MetricRow {
        metric: metric.to_string(),
        value,
    };
    vec![
        row("Total Attempts", format_int(summary.total_attempts)),
        row("Total Settled", format_int(summary.total_settled)),
        row("Total Bookings", format_int(summary.total_bookings)),
        row(
            "Overall Success Rate",
            format!("{}%", format_number(summary.overall_success_rate, 2)),
        ),
        row(
            "Booking Conversion",
            format!("{}%", format_number(summary.booking_conversion, 2)),
        ),
    ]
}

pub fn breakdown_rows(entries: &[BreakdownEntry]) -> Vec<BreakdownRow> {
    entries
        .iter()
        .map(|e| BreakdownRow {
            name: e.name.clone(),
            value: format_int(e.value),
            share: format!("{}%", format_number(e.percentage, 1)),
        })
        .collect()
}

pub fn city_rows(entries: &[CityEntry], total_bookings: i64) -> Vec<BreakdownRow> {
    entries
        .iter()
        .map(|e| BreakdownRow {
            name: e.name.clone(),
            value: format_int(e.value),
            share: format!(
                "{}%",
                format_number(percent_of(e.value as f64, total_bookings as f64), 1)
            ),
        })
        .collect()
}

pub fn anomaly_rows(anomalies: &[AnomalyRecord]) -> Vec<AnomalyRow> {
    anomalies
        .iter()
        .map(|a| AnomalyRow {
            minute: a.minute.clone(),
            metric: a.metric.to_string(),
            value: format_number(a.value, 2),
            threshold: format_number(a.threshold, 2),
            severity: a.severity.to_string(),
        })
        .collect()
}

pub fn insight_rows(insights: &[Insight]) -> Vec<InsightRow> {
    insights
        .iter()
        .map(|i| InsightRow {
            level: i.level.to_string(),
            title: i.title.to_string(),
            description: i.description.clone(),
        })
        .collect()
}

fn share_line(entry: &BreakdownEntry) -> String {
    format!(
        "- {}: {} ({:.1}%)",
        entry.name,
        format_int(entry.value),
        entry.percentage
    )
}

/// The plain-text report offered for download after a run.
pub fn render_text_report(
    file_name: &str,
    data: &ProcessedData,
    generated_at: &DateTime<Local>,
) -> String {
    let s = &data.summary;
    let mut lines: Vec<String> = vec![
        format!("Booking Analytics Report - {}", file_name),
        format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
        "Summary Statistics:".to_string(),
        format!("- Total Attempts: {}", format_int(s.total_attempts)),
        format!("- Total Settled: {}", format_int(s.total_settled)),
        format!("- Total Bookings: {}", format_int(s.total_bookings)),
        format!("- Overall Success Rate: {:.2}%", s.overall_success_rate),
        format!("- Booking Conversion: {:.2}%", s.booking_conversion),
        String::new(),
        "Top Performing Channels:".to_string(),
    ];
    lines.extend(s.channel_breakdown.iter().map(share_line));
    lines.push(String::new());
    lines.push("Ticket Mix:".to_string());
    lines.extend(s.ticket_breakdown.iter().map(share_line));
    lines.push(String::new());
    lines.push("Geographic Distribution:".to_string());
    lines.extend(
        s.city_breakdown
            .iter()
            .map(|c| format!("- {}: {} bookings", c.name, format_int(c.value))),
    );
    lines.push(String::new());
    lines.push(format!("Anomalies Detected: {}", data.anomalies.len()));
    lines.join("\n")
}

pub fn text_report_file_name(generated_at: &DateTime<Local>) -> String {
    format!("booking-insights-{}.txt", generated_at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::process_booking_data;
    use crate::types::{AnomalyMetric, RawTable, Severity};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn scenario() -> ProcessedData {
        let table: RawTable = vec![
            vec!["h".into()],
            vec!["total".into(), 999i64.into(), 999i64.into(), 999i64.into()],
            vec![
                "00:01".into(),
                100i64.into(),
                80i64.into(),
                70i64.into(),
                40i64.into(),
                20i64.into(),
                5i64.into(),
                5i64.into(),
                50i64.into(),
                15i64.into(),
                5i64.into(),
                "80.0".into(),
                "70.0".into(),
                10i64.into(),
                20i64.into(),
                15i64.into(),
                25i64.into(),
            ],
        ];
        process_booking_data(&table)
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_text_report_lines() {
        let report = render_text_report("bookings.xlsx", &scenario(), &fixed_time());
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Booking Analytics Report - bookings.xlsx");
        assert_eq!(lines[1], "Generated on: 2024-03-01 09:30:00");
        assert!(lines.contains(&"- Total Attempts: 100"));
        assert!(lines.contains(&"- Overall Success Rate: 80.00%"));
        assert!(lines.contains(&"- Booking Conversion: 87.50%"));
        assert!(lines.contains(&"- Website: 40 (57.1%)"));
        assert!(lines.contains(&"- I-Tickets: 50 (71.4%)"));
        assert!(lines.contains(&"- Mumbai: 25 bookings"));
        assert_eq!(*lines.last().unwrap(), "Anomalies Detected: 0");
    }

    #[test]
    fn test_text_report_thousands_separators() {
        let mut data = scenario();
        data.summary.total_attempts = 1_234_567;
        let report = render_text_report("x.csv", &data, &fixed_time());
        assert!(report.contains("- Total Attempts: 1,234,567"));
    }

    #[test]
    fn test_export_csv_header_and_order() {
        let data = scenario();
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.csv");
        write_csv(&path, &export_rows(&data.time_series_data, None)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Minute,Attempts,Settled,Total Booking,Website Booking,App Booking,Agents Booking,\
SwaRail App Booking,I-Tkts,E-Tkts,Tatkal,PG Success Rate %,Booking Vs Attempt %,Delhi,Chennai,Kolkata,Mumbai"
        );
        assert_eq!(
            lines.next().unwrap(),
            "00:01,100,80,70,40,20,5,5,50,15,5,80.0,70.0,10,20,15,25"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_minute_filter_is_case_insensitive() {
        let records = vec![
            BookingRecord {
                minute: "10:01 AM".to_string(),
                ..Default::default()
            },
            BookingRecord {
                minute: "10:02 PM".to_string(),
                ..Default::default()
            },
        ];
        assert_eq!(filter_by_minute(&records, "am").len(), 1);
        assert_eq!(filter_by_minute(&records, "").len(), 2);
        assert_eq!(export_rows(&records, Some("pm"))[0].minute, "10:02 PM");
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &scenario()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["totalAttempts"], 100);
        assert_eq!(value["summary"]["bookingConversion"], 87.5);
        assert_eq!(value["timeSeriesData"][0]["swaRailAppBooking"], 5);
        assert_eq!(value["summary"]["cityBreakdown"][0]["name"], "Mumbai");
        assert!(value["summary"]["cityBreakdown"][0].get("percentage").is_none());
    }

    #[test]
    fn test_anomaly_rows_format() {
        let rows = anomaly_rows(&[AnomalyRecord {
            minute: "00:07".to_string(),
            metric: AnomalyMetric::PgSuccessRate,
            value: 12.5,
            threshold: 1234.567,
            severity: Severity::High,
        }]);
        assert_eq!(rows[0].metric, "pgSuccessRate");
        assert_eq!(rows[0].value, "12.50");
        assert_eq!(rows[0].threshold, "1,234.57");
        assert_eq!(rows[0].severity, "high");
    }

    #[test]
    fn test_render_table_empty() {
        let rows: Vec<MetricRow> = Vec::new();
        assert_eq!(render_table(&rows, 5), "(no rows)");
        let summary = summary_rows(&scenario().summary);
        let rendered = render_table(&summary, 2);
        assert!(rendered.contains("Total Attempts"));
        assert!(!rendered.contains("Total Bookings"));
    }

    #[test]
    fn test_city_rows_share() {
        let data = scenario();
        let rows = city_rows(&data.summary.city_breakdown, data.summary.total_bookings);
        assert_eq!(rows[0].name, "Mumbai");
        assert_eq!(rows[0].share, "35.7%");
        let empty = city_rows(&data.summary.city_breakdown, 0);
        assert!(empty.iter().all(|r| r.share == "0.0%"));
    }

    #[test]
    fn test_report_file_name_is_stamped() {
        let name = text_report_file_name(&fixed_time());
        assert!(name.starts_with("booking-insights-"));
        assert!(name.ends_with(".txt"));
    }
}
