// SPDX-License-Identifier: MIT

//!
//! Number formatting for display
//!

/// Format a count with thousands separators, e.g. `31470367` becomes
/// `31,470,367`.  Fractional counts are rounded.
pub fn format_count(count: f64) -> String {
    if !count.is_finite() {
        return String::from("0");
    }
    let rounded = count.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        formatted.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}
