// src/utils/format.rs
use rust_decimal::{Decimal, RoundingStrategy};

/// Fraction to a two-decimal percentage: 0.4567 -> "45.67%".
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Inverse of [`format_percent`]: "45.67%" -> 0.4567. The trailing `%` is optional.
pub fn parse_percent(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    number.parse::<f64>().ok().map(|v| v / 100.0)
}

/// Money rounded half-away-from-zero to cents, with thousands separators.
/// Example: (1234.565, "USD") -> "$1,234.57"; other currencies get a code suffix.
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let body = group_thousands(&format!("{:.2}", rounded.abs()));
    match currency {
        "USD" => format!("{}${}", sign, body),
        code => format!("{}{} {}", sign, body, code),
    }
}

/// Quantity without trailing zeros: 50.000 -> "50", 0.0150 -> "0.015".
pub fn format_qty(qty: Decimal) -> String {
    qty.normalize().to_string()
}

fn group_thousands(fixed: &str) -> String {
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed, ""));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if frac_part.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}
