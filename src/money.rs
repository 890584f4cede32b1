//! Rounding policy and currency formatting
//!
//! One place decides how every reported figure is rounded:
//! - schedule line amounts: whole currency units
//! - totals and forecast figures: 2 decimals
//!
//! Ties go to the even neighbour in both cases.

/// Round a line-item amount to whole currency units.
///
/// Negative inputs report as zero; a line item never asks the buyer for a
/// negative payment.
pub fn round_to_units(amount: f64) -> u64 {
    let rounded = amount.round_ties_even();
    if rounded <= 0.0 || !rounded.is_finite() {
        0
    } else {
        rounded as u64
    }
}

/// Round a monetary figure to 2 decimals
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round_ties_even() / 100.0
}

/// Format a percentage the way notes show it: `35`, `7.5`, `0.99`
pub fn format_percent(pct: f64) -> String {
    format!("{}", pct)
}

/// Format an amount with two decimals, space-grouped thousands and the
/// rouble sign: `10 102 330.00 ₽`
pub fn format_rub(amount: f64) -> String {
    format!("{} ₽", group_thousands(amount))
}

/// Two decimals, thousands separated by a space
pub fn group_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
