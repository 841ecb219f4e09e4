//! Display helpers for reports. Values are only rounded here; the calculators keep full precision.

use super::types::YearMonth;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Whole dollars with grouped thousands, e.g. `$54,321` or `-$1,200`.
pub fn format_usd(amount: f64) -> String {
    let whole = amount.abs().round() as u64;
    with_sign(amount, whole > 0, format!("${}", group_thousands(whole)))
}

/// Dollars and cents, e.g. `$1,199.10`.
pub fn format_usd_cents(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let body = format!("${}.{:02}", group_thousands(cents / 100), cents % 100);
    with_sign(amount, cents > 0, body)
}

/// `value` is already in percent units: `format_percent(6.5, 1)` is `6.5%`.
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

pub fn format_years_months(months: u32) -> String {
    let years = months / 12;
    let rest = months % 12;
    match (years, rest) {
        (0, m) => plural(m, "month"),
        (y, 0) => plural(y, "year"),
        (y, m) => format!("{}, {}", plural(y, "year"), plural(m, "month")),
    }
}

/// `Mar 2051`.
pub fn format_month_year(date: YearMonth) -> String {
    let name = date
        .month
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index as usize));
    match name {
        Some(name) => format!("{name} {}", date.year),
        None => format!("{}-{:02}", date.year, date.month),
    }
}

/// Short form for axis labels and summaries: `12K`, `1.5M`, `2.0B`.
pub fn format_compact(value: f64) -> String {
    if value >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.0}K", value / 1e3)
    } else {
        value.to_string()
    }
}

fn with_sign(amount: f64, nonzero: bool, body: String) -> String {
    if amount < 0.0 && nonzero {
        format!("-{body}")
    } else {
        body
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
