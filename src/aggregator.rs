use crate::config::{Category, CategorySet};
use crate::types::{BookingRecord, BreakdownEntry, CityEntry, SummaryReport};
use crate::util::{percent_of, sum_counts};
use std::cmp::Ordering;

/// Build the summary projection for a set of records.
///
/// Every ratio is guarded: an empty or all-zero input produces zeros, never
/// NaN or infinity.
pub fn summarize(records: &[BookingRecord], categories: &CategorySet) -> SummaryReport {
    let total_attempts = sum_counts(records.iter().map(|r| r.attempts));
    let total_settled = sum_counts(records.iter().map(|r| r.settled));
    let total_bookings = sum_counts(records.iter().map(|r| r.total_booking));

    let overall_success_rate = percent_of(total_settled as f64, total_attempts as f64);
    let booking_conversion = percent_of(total_bookings as f64, total_settled as f64);

    SummaryReport {
        total_attempts,
        total_settled,
        total_bookings,
        overall_success_rate,
        booking_conversion,
        channel_breakdown: share_breakdown(records, &categories.channels, total_bookings),
        ticket_breakdown: share_breakdown(records, &categories.tickets, total_bookings),
        city_breakdown: city_breakdown(records, &categories.cities),
    }
}

/// Category totals with their share of `total_bookings`, largest first.
pub fn share_breakdown(
    records: &[BookingRecord],
    categories: &[Category],
    total_bookings: i64,
) -> Vec<BreakdownEntry> {
    let mut rows: Vec<BreakdownEntry> = categories
        .iter()
        .map(|c| {
            let value = c.total(records);
            BreakdownEntry {
                name: c.name.clone(),
                value,
                percentage: percent_of(value as f64, total_bookings as f64),
            }
        })
        .collect();
    rows.sort_by(|a, b| by_value_desc(a.value, &a.name, b.value, &b.name));
    rows
}

pub fn city_breakdown(records: &[BookingRecord], categories: &[Category]) -> Vec<CityEntry> {
    let mut rows: Vec<CityEntry> = categories
        .iter()
        .map(|c| CityEntry {
            name: c.name.clone(),
            value: c.total(records),
        })
        .collect();
    rows.sort_by(|a, b| by_value_desc(a.value, &a.name, b.value, &b.name));
    rows
}

// Ties fall back to the category name so repeated runs print the same order.
fn by_value_desc(a_value: i64, a_name: &str, b_value: i64, b_name: &str) -> Ordering {
    b_value.cmp(&a_value).then_with(|| a_name.cmp(b_name))
}
