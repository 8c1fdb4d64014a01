// Row normalization: untyped spreadsheet rows into per-minute booking records.
//
// Columns are positional, not matched by header name.
use crate::types::{BookingRecord, RawRow, RawTable};
use crate::util::{coerce_count, coerce_label, coerce_percentage};

/// Index of the first data row; row 0 is the header, row 1 the total row.
pub const DATA_START_ROW: usize = 2;

pub const COL_MINUTE: usize = 0;
pub const COL_ATTEMPTS: usize = 1;
pub const COL_SETTLED: usize = 2;
pub const COL_TOTAL_BOOKING: usize = 3;
pub const COL_WEBSITE_BOOKING: usize = 4;
pub const COL_APP_BOOKING: usize = 5;
pub const COL_AGENTS_BOOKING: usize = 6;
pub const COL_SWARAIL_APP_BOOKING: usize = 7;
pub const COL_I_TKTS: usize = 8;
pub const COL_E_TKTS: usize = 9;
pub const COL_TATKAL: usize = 10;
pub const COL_PG_SUCCESS_RATE: usize = 11;
pub const COL_BOOKING_VS_ATTEMPT: usize = 12;
pub const COL_DELHI: usize = 13;
pub const COL_CHENNAI: usize = 14;
pub const COL_KOLKATA: usize = 15;
pub const COL_MUMBAI: usize = 16;

pub const COLUMN_COUNT: usize = 17;

/// Turn a raw table into booking records, one per data row, in row order.
///
/// Tables with fewer than two rows yield no records. A row is never dropped:
/// malformed or missing cells fall back to `0` (or `""` for the minute).
pub fn normalize(table: &RawTable) -> Vec<BookingRecord> {
    table
        .get(DATA_START_ROW..)
        .unwrap_or(&[])
        .iter()
        .map(normalize_row)
        .collect()
}

pub fn normalize_row(row: &RawRow) -> BookingRecord {
    let count = |idx: usize| coerce_count(row.get(idx));
    let pct = |idx: usize| coerce_percentage(row.get(idx));

    BookingRecord {
        minute: coerce_label(row.get(COL_MINUTE)),
        attempts: count(COL_ATTEMPTS),
        settled: count(COL_SETTLED),
        total_booking: count(COL_TOTAL_BOOKING),
        website_booking: count(COL_WEBSITE_BOOKING),
        app_booking: count(COL_APP_BOOKING),
        agents_booking: count(COL_AGENTS_BOOKING),
        swa_rail_app_booking: count(COL_SWARAIL_APP_BOOKING),
        i_tkts: count(COL_I_TKTS),
        e_tkts: count(COL_E_TKTS),
        tatkal: count(COL_TATKAL),
        pg_success_rate: pct(COL_PG_SUCCESS_RATE),
        booking_vs_attempt: pct(COL_BOOKING_VS_ATTEMPT),
        delhi: count(COL_DELHI),
        chennai: count(COL_CHENNAI),
        kolkata: count(COL_KOLKATA),
        mumbai: count(COL_MUMBAI),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawCell;

    fn header_and_total() -> RawTable {
        vec![
            vec![RawCell::from("Minute")],
            vec![RawCell::from("Total"), RawCell::from(999i64)],
        ]
    }

    #[test]
    fn test_scenario_row() {
        let mut table = header_and_total();
        table.push(vec![
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
        ]);
        let records = normalize(&table);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.minute, "00:01");
        assert_eq!(r.attempts, 100);
        assert_eq!(r.settled, 80);
        assert_eq!(r.total_booking, 70);
        assert_eq!(r.website_booking, 40);
        assert_eq!(r.app_booking, 20);
        assert_eq!(r.agents_booking, 5);
        assert_eq!(r.swa_rail_app_booking, 5);
        assert_eq!(r.i_tkts, 50);
        assert_eq!(r.e_tkts, 15);
        assert_eq!(r.tatkal, 5);
        assert_eq!(r.pg_success_rate, 80.0);
        assert_eq!(r.booking_vs_attempt, 70.0);
        assert_eq!(r.delhi, 10);
        assert_eq!(r.chennai, 20);
        assert_eq!(r.kolkata, 15);
        assert_eq!(r.mumbai, 25);
    }

    #[test]
    fn test_row_count_and_order_preserved() {
        let mut table = header_and_total();
        for i in 0..5 {
            table.push(vec![format!("00:0{}", i).as_str().into(), (i as i64).into()]);
        }
        let records = normalize(&table);
        assert_eq!(records.len(), 5);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.minute, format!("00:0{}", i));
            assert_eq!(r.attempts, i as i64);
        }
    }

    #[test]
    fn test_malformed_cells_default_to_zero() {
        let mut table = header_and_total();
        table.push(vec![
            RawCell::Empty,
            "n/a".into(),
            RawCell::Empty,
            "".into(),
            "12abc".into(),
        ]);
        let records = normalize(&table);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.minute, "");
        assert_eq!(r.attempts, 0);
        assert_eq!(r.settled, 0);
        assert_eq!(r.total_booking, 0);
        assert_eq!(r.website_booking, 0);
        assert_eq!(r.mumbai, 0);
        assert_eq!(r.pg_success_rate, 0.0);
    }

    #[test]
    fn test_empty_row_becomes_zero_record() {
        let mut table = header_and_total();
        table.push(vec![]);
        let records = normalize(&table);
        assert_eq!(records, vec![BookingRecord::default()]);
    }

    #[test]
    fn test_percentage_suffix_is_ignored() {
        let mut row: RawRow = vec![RawCell::Empty; COLUMN_COUNT];
        row[COL_PG_SUCCESS_RATE] = "72.5%".into();
        row[COL_BOOKING_VS_ATTEMPT] = RawCell::Number(64.25);
        let r = normalize_row(&row);
        assert_eq!(r.pg_success_rate, 72.5);
        assert_eq!(r.booking_vs_attempt, 64.25);
    }

    #[test]
    fn test_undersized_tables_yield_nothing() {
        assert!(normalize(&Vec::new()).is_empty());
        assert!(normalize(&vec![vec![RawCell::from("h")]]).is_empty());
        assert!(normalize(&header_and_total()).is_empty());
    }
}
