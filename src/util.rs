// Utility helpers for cell coercion, basic statistics and number formatting.
//
// This module centralizes all the "dirty" spreadsheet handling so the rest of
// the code can assume clean, typed values.
use crate::types::RawCell;
use num_format::{Locale, ToFormattedString};

/// Coerce a cell the way a spreadsheet front end coerces with `Number(x) || 0`.
///
/// - Missing and empty cells are `0`.
/// - Text is trimmed and must parse as a whole; `"12abc"` is `0`.
/// - `0x`, `0o` and `0b` prefixes read as hex, octal and binary integers.
/// - Booleans count as `1` / `0`.
/// - Anything non-finite collapses to `0`, including `"Infinity"`: counters
///   are integers and a non-finite rate has no meaningful share.
pub fn coerce_number(cell: Option<&RawCell>) -> f64 {
    let n = match cell {
        None | Some(RawCell::Empty) => 0.0,
        Some(RawCell::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(RawCell::Number(n)) => *n,
        Some(RawCell::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                parse_radix_literal(s)
                    .or_else(|| s.parse::<f64>().ok())
                    .unwrap_or(0.0)
            }
        }
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

// Unsigned `0x1A` / `0o17` / `0b101` literals. Signs and empty digit runs are
// rejected, so `"-0x1A"` and `"0x"` fall through to 0.
fn parse_radix_literal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    s[2..].chars().try_fold(0.0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// Integer counters truncate toward zero; `as` saturates on overflow.
pub fn coerce_count(cell: Option<&RawCell>) -> i64 {
    coerce_number(cell).trunc() as i64
}

/// Sum counters, pinning at `i64::MAX` / `i64::MIN` instead of overflowing.
pub fn sum_counts<I>(values: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    values.into_iter().fold(0i64, i64::saturating_add)
}

/// Coerce a cell with `parseFloat` semantics: the longest numeric prefix wins,
/// so `"72.5%"` reads as `72.5` and `"abc"` as `0`.
pub fn coerce_percentage(cell: Option<&RawCell>) -> f64 {
    let n = match cell {
        Some(RawCell::Number(n)) => *n,
        Some(RawCell::Text(s)) => parse_float_prefix(s).unwrap_or(0.0),
        // parseFloat stringifies booleans, which never parse.
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Parse the leading decimal number of `s`, ignoring leading whitespace and
/// any trailing characters. Returns `None` when no digits are found.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0usize;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    // Exponent is only consumed when at least one digit follows it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}

/// Label cells keep text as-is; falsy values (empty, zero, `false`) become `""`.
pub fn coerce_label(cell: Option<&RawCell>) -> String {
    match cell {
        None | Some(RawCell::Empty) | Some(RawCell::Bool(false)) => String::new(),
        Some(RawCell::Bool(true)) => "true".to_string(),
        Some(RawCell::Text(s)) => s.clone(),
        Some(RawCell::Number(n)) => {
            if *n == 0.0 || n.is_nan() {
                String::new()
            } else if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn population_std_dev(v: &[f64], mean: f64) -> f64 {
    // Divides by N, not N - 1.
    if v.is_empty() {
        return 0.0;
    }
    let sq: f64 = v.iter().map(|x| (x - mean).powi(2)).sum();
    (sq / v.len() as f64).sqrt()
}

/// `part / whole * 100`, or `0` when `whole` is zero.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let pct = part / whole * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages and the text report (`9,855`).
    n.to_formatted_string(&Locale::en)
}
