//! Display formatting for money, quantities and dates.

use crate::model::DateValue;

/// Format an amount in the given ISO currency, en-US style: `$1,234.50`.
///
/// Unknown codes are written as a prefix (`CHF 100.00`); an empty code means USD.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let code = currency.trim().to_ascii_uppercase();
    let (prefix, decimals) = match code.as_str() {
        "" | "USD" => ("$".to_string(), 2),
        "EUR" => ("€".to_string(), 2),
        "GBP" => ("£".to_string(), 2),
        "JPY" => ("¥".to_string(), 0),
        "KRW" => ("₩".to_string(), 0),
        "INR" => ("₹".to_string(), 2),
        "CNY" => ("CN¥".to_string(), 2),
        "CAD" => ("CA$".to_string(), 2),
        "AUD" => ("A$".to_string(), 2),
        "MXN" => ("MX$".to_string(), 2),
        "BRL" => ("R$".to_string(), 2),
        other => (format!("{} ", other), 2),
    };

    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };
    // -0.001 rounds to zero and must not print as "-$0.00"
    let negative = amount < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');

    let mut out = String::with_capacity(fixed.len() + prefix.len() + 4);
    if negative {
        out.push('-');
    }
    out.push_str(&prefix);
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Plain number with at most four decimals and no trailing zeros: `2`, `1.5`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.4}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Tax rate as shown on the invoice: `10%`, `8.875%`.
pub fn format_percent(rate: f64) -> String {
    format!("{}%", format_number(rate))
}

/// Invoice date for display (`Sep 15, 2025`). Text that does not parse is shown as-is.
pub fn format_date(value: &DateValue) -> String {
    match (value.to_naive_date(), value) {
        (Some(date), _) => date.format("%b %-d, %Y").to_string(),
        (None, DateValue::Text(raw)) => raw.trim().to_string(),
        (None, _) => String::new(),
    }
}

pub fn format_optional_date(value: Option<&DateValue>) -> String {
    value.map(format_date).unwrap_or_default()
}
