// Derived views over ProcessedData: success metrics, the booking funnel and
// the narrative insight list shown after a report run.
use crate::types::{BookingRecord, ProcessedData, SummaryReport};
use crate::util::{average, format_int, percent_of};
use serde::Serialize;
use std::fmt;

/// Minutes below this PG success rate count as degraded.
pub const LOW_PG_SUCCESS: f64 = 50.0;
/// Minutes below this PG success rate count as critical.
pub const CRITICAL_PG_SUCCESS: f64 = 30.0;
/// Conversion below this percentage is called out as an opportunity.
pub const CONVERSION_TARGET: f64 = 80.0;
/// SwaRail growth is only reported once its share passes this percentage.
pub const SWARAIL_SHARE_FLOOR: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessMetrics {
    pub avg_pg_success: f64,
    pub avg_booking_rate: f64,
    pub low_pg_minutes: usize,
    pub critical_pg_minutes: usize,
}

pub fn success_metrics(records: &[BookingRecord]) -> SuccessMetrics {
    let pg: Vec<f64> = records.iter().map(|r| r.pg_success_rate).collect();
    let booking: Vec<f64> = records.iter().map(|r| r.booking_vs_attempt).collect();
    SuccessMetrics {
        avg_pg_success: average(&pg),
        avg_booking_rate: average(&booking),
        low_pg_minutes: pg.iter().filter(|v| **v < LOW_PG_SUCCESS).count(),
        critical_pg_minutes: pg.iter().filter(|v| **v < CRITICAL_PG_SUCCESS).count(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStage {
    pub label: &'static str,
    pub value: i64,
    /// Share of the previous stage that made it to this one.
    pub conversion: f64,
    pub drop_off: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingFunnel {
    pub stages: Vec<FunnelStage>,
    /// Bookings as a share of attempts.
    pub overall_conversion: f64,
}

pub fn booking_funnel(summary: &SummaryReport) -> BookingFunnel {
    let attempts = summary.total_attempts as f64;
    let settled = summary.total_settled as f64;
    let bookings = summary.total_bookings as f64;

    let stage = |label: &'static str, value: i64, conversion: f64| FunnelStage {
        label,
        value,
        conversion,
        drop_off: 100.0 - conversion,
    };

    BookingFunnel {
        stages: vec![
            stage("Attempts", summary.total_attempts, 100.0),
            stage("Settled", summary.total_settled, percent_of(settled, attempts)),
            stage("Bookings", summary.total_bookings, percent_of(bookings, settled)),
        ],
        overall_conversion: percent_of(bookings, attempts),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for InsightLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InsightLevel::Info => "info",
            InsightLevel::Success => "success",
            InsightLevel::Warning => "warning",
            InsightLevel::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: &'static str,
    pub title: &'static str,
    pub description: String,
    pub level: InsightLevel,
}

// First record wins on ties.
fn first_max_by<F>(records: &[BookingRecord], key: F) -> Option<&BookingRecord>
where
    F: Fn(&BookingRecord) -> f64,
{
    let mut best: Option<&BookingRecord> = None;
    for r in records {
        if best.map_or(true, |b| key(r) > key(b)) {
            best = Some(r);
        }
    }
    best
}

/// Percentage change of SwaRail bookings between the first and last minute.
pub fn swarail_growth(records: &[BookingRecord]) -> f64 {
    match (records.first(), records.last()) {
        (Some(first), Some(last)) if records.len() > 1 => percent_of(
            last.swa_rail_app_booking
                .saturating_sub(first.swa_rail_app_booking) as f64,
            first.swa_rail_app_booking as f64,
        ),
        _ => 0.0,
    }
}

/// Build the insight list in display order. Insights that need a record or
/// a category are skipped when there is none.
pub fn generate_insights(data: &ProcessedData) -> Vec<Insight> {
    let records = &data.time_series_data;
    let summary = &data.summary;
    let mut insights = Vec::new();

    if let Some(peak) = first_max_by(records, |r| r.tatkal as f64) {
        if peak.tatkal > 0 {
            insights.push(Insight {
                kind: "peak",
                title: "Peak Tatkal Activity",
                description: format!(
                    "Tatkal bookings peaked at {} with {} tickets.",
                    peak.minute,
                    format_int(peak.tatkal)
                ),
                level: InsightLevel::Info,
            });
        }
    }

    if let Some(top) = summary.channel_breakdown.first() {
        insights.push(Insight {
            kind: "channel",
            title: "Channel Leadership",
            description: format!(
                "{} leads with {:.1}% market share ({} bookings).",
                top.name,
                top.percentage,
                format_int(top.value)
            ),
            level: InsightLevel::Success,
        });
    }

    let swarail = summary
        .channel_breakdown
        .iter()
        .find(|c| c.name == "SwaRail");
    if let Some(channel) = swarail {
        if channel.percentage > SWARAIL_SHARE_FLOOR {
            let growth = swarail_growth(records);
            insights.push(Insight {
                kind: "growth",
                title: "SwaRail App Growth",
                description: format!(
                    "SwaRail usage {} {:.1}% over the observed period.",
                    if growth > 0.0 { "rose" } else { "declined" },
                    growth.abs()
                ),
                level: if growth > 0.0 {
                    InsightLevel::Success
                } else {
                    InsightLevel::Warning
                },
            });
        }
    }

    if let Some(city) = summary.city_breakdown.first() {
        let share = percent_of(city.value as f64, summary.total_bookings as f64);
        insights.push(Insight {
            kind: "geography",
            title: "Geographic Concentration",
            description: format!(
                "{} had the highest share of bookings ({:.1}%) with {} total bookings.",
                city.name,
                share,
                format_int(city.value)
            ),
            level: InsightLevel::Info,
        });
    }

    let low: Vec<&BookingRecord> = records
        .iter()
        .filter(|r| r.pg_success_rate < LOW_PG_SUCCESS)
        .collect();
    let lowest = low
        .iter()
        .copied()
        .reduce(|min, r| if r.pg_success_rate < min.pg_success_rate { r } else { min });
    if let Some(critical) = lowest {
        insights.push(Insight {
            kind: "performance",
            title: "Performance Alert",
            description: format!(
                "Booking success rate dropped below 50% for {} minutes. Lowest was {:.1}% at {}.",
                low.len(),
                critical.pg_success_rate,
                critical.minute
            ),
            level: InsightLevel::Error,
        });
    }

    if summary.booking_conversion < CONVERSION_TARGET {
        insights.push(Insight {
            kind: "conversion",
            title: "Conversion Opportunity",
            description: format!(
                "Overall booking conversion rate is {:.1}%. There's room for improvement in converting settled transactions to bookings.",
                summary.booking_conversion
            ),
            level: InsightLevel::Warning,
        });
    }

    if let Some(peak) = first_max_by(records, |r| r.attempts as f64) {
        insights.push(Insight {
            kind: "volume",
            title: "Peak Traffic",
            description: format!(
                "Highest traffic occurred at {} with {} booking attempts.",
                peak.minute,
                format_int(peak.attempts)
            ),
            level: InsightLevel::Info,
        });
    }

    if let Some(ticket) = summary.ticket_breakdown.first() {
        insights.push(Insight {
            kind: "tickets",
            title: "Ticket Preference",
            description: format!(
                "{} dominated with {:.1}% of all bookings ({} tickets).",
                ticket.name,
                ticket.percentage,
                format_int(ticket.value)
            ),
            level: InsightLevel::Info,
        });
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::summarize;
    use crate::config::CategorySet;

    fn processed(records: Vec<BookingRecord>) -> ProcessedData {
        let summary = summarize(&records, &CategorySet::default());
        ProcessedData {
            time_series_data: records,
            summary,
            anomalies: Vec::new(),
        }
    }

    fn minute(label: &str) -> BookingRecord {
        BookingRecord {
            minute: label.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_success_metrics() {
        let mut a = minute("00:01");
        a.pg_success_rate = 20.0;
        a.booking_vs_attempt = 10.0;
        let mut b = minute("00:02");
        b.pg_success_rate = 45.0;
        b.booking_vs_attempt = 30.0;
        let mut c = minute("00:03");
        c.pg_success_rate = 95.0;
        c.booking_vs_attempt = 80.0;
        let m = success_metrics(&[a, b, c]);
        assert!((m.avg_pg_success - 160.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.avg_booking_rate, 40.0);
        assert_eq!(m.low_pg_minutes, 2);
        assert_eq!(m.critical_pg_minutes, 1);
    }

    #[test]
    fn test_success_metrics_empty() {
        let m = success_metrics(&[]);
        assert_eq!(m.avg_pg_success, 0.0);
        assert_eq!(m.low_pg_minutes, 0);
    }

    #[test]
    fn test_funnel() {
        let summary = SummaryReport {
            total_attempts: 200,
            total_settled: 150,
            total_bookings: 120,
            ..Default::default()
        };
        let funnel = booking_funnel(&summary);
        assert_eq!(funnel.stages.len(), 3);
        assert_eq!(funnel.stages[1].conversion, 75.0);
        assert_eq!(funnel.stages[1].drop_off, 25.0);
        assert_eq!(funnel.stages[2].conversion, 80.0);
        assert_eq!(funnel.overall_conversion, 60.0);
    }

    #[test]
    fn test_funnel_zero_guards() {
        let funnel = booking_funnel(&SummaryReport::default());
        assert!(funnel.stages.iter().all(|s| s.conversion.is_finite()));
        assert_eq!(funnel.overall_conversion, 0.0);
    }

    #[test]
    fn test_swarail_growth() {
        let mut first = minute("00:01");
        first.swa_rail_app_booking = 10;
        let mut last = minute("00:02");
        last.swa_rail_app_booking = 15;
        assert_eq!(swarail_growth(&[first.clone(), last]), 50.0);
        assert_eq!(swarail_growth(&[first]), 0.0);

        let zero = minute("00:01");
        let mut some = minute("00:02");
        some.swa_rail_app_booking = 4;
        assert_eq!(swarail_growth(&[zero, some]), 0.0);
    }

    #[test]
    fn test_swarail_growth_with_extreme_counts() {
        let mut first = minute("00:01");
        first.swa_rail_app_booking = -10;
        let mut last = minute("00:02");
        last.swa_rail_app_booking = i64::MAX;
        let growth = swarail_growth(&[first, last]);
        assert!(growth.is_finite());
        assert!(growth < 0.0);
    }

    #[test]
    fn test_insights_for_typical_data() {
        let mut a = minute("00:01");
        a.attempts = 100;
        a.settled = 90;
        a.total_booking = 60;
        a.website_booking = 30;
        a.swa_rail_app_booking = 10;
        a.tatkal = 4;
        a.i_tkts = 50;
        a.delhi = 40;
        a.pg_success_rate = 40.0;
        let mut b = minute("00:02");
        b.attempts = 300;
        b.settled = 200;
        b.total_booking = 140;
        b.website_booking = 100;
        b.swa_rail_app_booking = 20;
        b.tatkal = 9;
        b.i_tkts = 100;
        b.mumbai = 70;
        b.pg_success_rate = 88.0;
        let insights = generate_insights(&processed(vec![a, b]));
        let kinds: Vec<&str> = insights.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                "peak",
                "channel",
                "growth",
                "geography",
                "performance",
                "conversion",
                "volume",
                "tickets"
            ]
        );
        assert_eq!(
            insights[0].description,
            "Tatkal bookings peaked at 00:02 with 9 tickets."
        );
        assert_eq!(
            insights[1].description,
            "Website leads with 65.0% market share (130 bookings)."
        );
        assert_eq!(
            insights[2].description,
            "SwaRail usage rose 100.0% over the observed period."
        );
        assert_eq!(insights[2].level, InsightLevel::Success);
        assert_eq!(
            insights[3].description,
            "Mumbai had the highest share of bookings (35.0%) with 70 total bookings."
        );
        assert_eq!(
            insights[4].description,
            "Booking success rate dropped below 50% for 1 minutes. Lowest was 40.0% at 00:01."
        );
        assert_eq!(
            insights[6].description,
            "Highest traffic occurred at 00:02 with 300 booking attempts."
        );
    }

    #[test]
    fn test_insights_for_empty_data() {
        let insights = generate_insights(&processed(Vec::new()));
        // Category-based insights still render with zero values; record-based ones do not.
        let kinds: Vec<&str> = insights.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec!["channel", "geography", "conversion", "tickets"]);
    }

    #[test]
    fn test_peak_prefers_first_on_tie() {
        let mut a = minute("00:01");
        a.attempts = 50;
        let mut b = minute("00:02");
        b.attempts = 50;
        let records = [a, b];
        let peak = first_max_by(&records, |r| r.attempts as f64).unwrap();
        assert_eq!(peak.minute, "00:01");
    }
}
