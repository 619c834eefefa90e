//! `{{TOKEN}}` substitution for recurring invoice text.
//!
//! Tokens resolve against a billing period that always ends on the reference
//! date and starts one calendar month earlier, whatever the schedule frequency.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{Datelike, Months, NaiveDate};
use regex::{Captures, Regex};

use crate::model::Invoice;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z_]+)\}\}").expect("placeholder pattern is valid"));

/// Every token the engine knows, in the order they are documented.
pub const TOKENS: &[&str] = &[
    "PERIOD_START",
    "PERIOD_END",
    "MONTH_NAME",
    "MONTH_SHORT",
    "YEAR",
    "WEEK_NUMBER",
    "QUARTER",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// The month leading up to `reference`. Month ends clamp (Mar 31 → Feb 28).
    pub fn ending(reference: NaiveDate) -> Self {
        let start = reference
            .checked_sub_months(Months::new(1))
            .unwrap_or(reference);
        Self { start, end: reference }
    }

    /// Value for a token name, case-insensitive. `None` for unknown tokens.
    pub fn resolve(&self, token: &str) -> Option<String> {
        let value = match token.to_ascii_uppercase().as_str() {
            "PERIOD_START" => self.start.format("%b %-d").to_string(),
            "PERIOD_END" => self.end.format("%b %-d").to_string(),
            "MONTH_NAME" => self.start.format("%B").to_string(),
            "MONTH_SHORT" => self.start.format("%b").to_string(),
            "YEAR" => self.start.format("%Y").to_string(),
            "WEEK_NUMBER" => self.end.iso_week().week().to_string(),
            "QUARTER" => (self.start.month0() / 3 + 1).to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// Replace every known `{{TOKEN}}` in `text`. Unknown tokens are left untouched.
pub fn substitute(text: &str, reference: NaiveDate) -> Cow<'_, str> {
    if !text.contains("{{") {
        return Cow::Borrowed(text);
    }
    let period = Period::ending(reference);
    TOKEN.replace_all(text, |caps: &Captures<'_>| {
        period
            .resolve(&caps[1])
            .unwrap_or_else(|| caps[0].to_string())
    })
}

/// Copy of `invoice` with line descriptions, notes and payment terms substituted.
pub fn substitute_invoice(invoice: &Invoice, reference: NaiveDate) -> Invoice {
    let mut out = invoice.clone();
    for item in &mut out.line_items {
        if let Some(description) = &item.description {
            item.description = Some(substitute(description, reference).into_owned());
        }
    }
    out.notes = substitute(&invoice.notes, reference).into_owned();
    out.payment_terms = substitute(&invoice.payment_terms, reference).into_owned();
    out
}
