//! Recurring billing schedules: when the next invoice is due and how a
//! recurring template invoice becomes a concrete one.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{DateValue, Invoice, RenderRequest};
use crate::placeholder::substitute_invoice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// The `n`th generation date counted from `start` (the 0th is `start` itself).
    ///
    /// Month-based frequencies are anchored on `start` so a schedule starting on
    /// the 31st returns to the 31st after shorter months.
    pub fn nth_after(self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => start.checked_add_days(Days::new(7 * u64::from(n))),
            Frequency::Biweekly => start.checked_add_days(Days::new(14 * u64::from(n))),
            Frequency::Monthly => start.checked_add_months(Months::new(n)),
            Frequency::Quarterly => start.checked_add_months(Months::new(n.checked_mul(3)?)),
            Frequency::Yearly => start.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSchedule {
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_generation_date: Option<NaiveDate>,
    #[serde(default)]
    pub paused_until: Option<NaiveDate>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

impl RecurringSchedule {
    pub fn new(frequency: Frequency, start_date: NaiveDate) -> Self {
        Self {
            frequency,
            start_date,
            end_date: None,
            next_generation_date: Some(start_date),
            paused_until: None,
            is_active: true,
        }
    }

    /// Next generation date; a fresh schedule generates on its start date.
    pub fn next_date(&self) -> NaiveDate {
        self.next_generation_date.unwrap_or(self.start_date)
    }

    pub fn is_paused(&self, today: NaiveDate) -> bool {
        self.paused_until.is_some_and(|until| today < until)
    }

    fn within_end(&self, date: NaiveDate) -> bool {
        self.end_date.is_none_or(|end| date <= end)
    }

    /// Whether an invoice should be generated on `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        let next = self.next_date();
        self.is_active && !self.is_paused(today) && next <= today && self.within_end(next)
    }

    /// First generation date strictly after `after`.
    fn following(&self, after: NaiveDate) -> Option<NaiveDate> {
        let mut n = 0u32;
        loop {
            let candidate = self.frequency.nth_after(self.start_date, n)?;
            if candidate > after {
                return Some(candidate);
            }
            n = n.checked_add(1)?;
        }
    }

    /// Move to the next period. Returns the new generation date, or `None`
    /// (and deactivates the schedule) once the end date has passed.
    pub fn advance(&mut self) -> Option<NaiveDate> {
        match self.following(self.next_date()) {
            Some(next) if self.within_end(next) => {
                self.next_generation_date = Some(next);
                Some(next)
            }
            _ => {
                self.is_active = false;
                None
            }
        }
    }

    /// Up to `count` upcoming generation dates, starting with the current one.
    pub fn upcoming(&self, count: usize) -> Vec<NaiveDate> {
        let first = self.next_date();
        if !self.is_active || count == 0 || !self.within_end(first) {
            return Vec::new();
        }
        let mut dates = vec![first];
        let mut n = 0u32;
        while dates.len() < count {
            let Some(date) = self.frequency.nth_after(self.start_date, n) else {
                break;
            };
            if date > first {
                if !self.within_end(date) {
                    break;
                }
                dates.push(date);
            }
            let Some(next) = n.checked_add(1) else {
                break;
            };
            n = next;
        }
        dates
    }

    /// Like [`upcoming`](Self::upcoming), flagging dates a pause holds back.
    pub fn upcoming_runs(&self, count: usize) -> Vec<UpcomingRun> {
        self.upcoming(count)
            .into_iter()
            .map(|date| UpcomingRun { date, paused: self.is_paused(date) })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingRun {
    pub date: NaiveDate,
    /// Falls before `pausedUntil`; it is issued once the pause ends.
    pub paused: bool,
}

/// A recurring template request together with its schedule, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringInvoice {
    pub schedule: RecurringSchedule,
    pub request: RenderRequest,
}

/// Next invoice number for `prefix` on `date`, e.g. `INV20251214-03` when
/// `INV20251214-01` and `-02` already exist.
pub fn next_invoice_number<'a>(
    prefix: &str,
    date: NaiveDate,
    existing: impl IntoIterator<Item = &'a str>,
) -> String {
    let stem = format!("{}{}", prefix, date.format("%Y%m%d"));
    let mut next_idx = 1;

    for number in existing {
        let Some(rest) = number.strip_prefix(&stem) else {
            continue;
        };
        let Some(rest) = rest.strip_prefix('-') else {
            continue;
        };
        let num_part: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(idx) = num_part.parse::<u32>() {
            if idx >= next_idx {
                next_idx = idx + 1;
            }
        }
    }

    format!("{}-{:02}", stem, next_idx)
}

/// Turn a recurring template invoice into the invoice issued on `run_date`.
///
/// Placeholders are resolved against `run_date`, the invoice is dated
/// `run_date`, and the template's date-to-due-date gap is preserved.
pub fn materialize(template: &Invoice, run_date: NaiveDate, invoice_number: String) -> Invoice {
    let due_offset = match (
        template.date.as_ref().and_then(DateValue::to_naive_date),
        template.due_date.as_ref().and_then(DateValue::to_naive_date),
    ) {
        (Some(date), Some(due)) => Some(due - date),
        _ => None,
    };

    let mut invoice = substitute_invoice(template, run_date);
    invoice.invoice_number = invoice_number;
    invoice.date = Some(DateValue::from(run_date));
    invoice.due_date = due_offset
        .and_then(|offset| run_date.checked_add_signed(offset))
        .map(DateValue::from);
    invoice.status = "pending".to_string();
    invoice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_frequency_steps() {
        let start = date(2025, 1, 31);
        assert_eq!(Frequency::Weekly.nth_after(start, 1), Some(date(2025, 2, 7)));
        assert_eq!(Frequency::Biweekly.nth_after(start, 1), Some(date(2025, 2, 14)));
        assert_eq!(Frequency::Monthly.nth_after(start, 1), Some(date(2025, 2, 28)));
        assert_eq!(Frequency::Monthly.nth_after(start, 2), Some(date(2025, 3, 31)));
        assert_eq!(Frequency::Quarterly.nth_after(start, 1), Some(date(2025, 4, 30)));
        assert_eq!(Frequency::Yearly.nth_after(start, 1), Some(date(2026, 1, 31)));
    }

    #[test]
    fn test_frequency_from_json() {
        let schedule: RecurringSchedule = serde_json::from_str(
            r#"{ "frequency": "biweekly", "startDate": "2025-01-01" }"#,
        )
        .unwrap();
        assert_eq!(schedule.frequency, Frequency::Biweekly);
        assert!(schedule.is_active);
        assert_eq!(schedule.next_date(), date(2025, 1, 1));
    }

    #[test]
    fn test_is_due() {
        let mut schedule = RecurringSchedule::new(Frequency::Monthly, date(2025, 1, 15));
        assert!(!schedule.is_due(date(2025, 1, 14)));
        assert!(schedule.is_due(date(2025, 1, 15)));
        assert!(schedule.is_due(date(2025, 2, 1)));

        schedule.paused_until = Some(date(2025, 2, 1));
        assert!(!schedule.is_due(date(2025, 1, 20)));
        assert!(schedule.is_due(date(2025, 2, 1)));

        schedule.is_active = false;
        assert!(!schedule.is_due(date(2025, 3, 1)));
    }

    #[test]
    fn test_advance_keeps_month_anchor_and_stops_at_end() {
        let mut schedule = RecurringSchedule::new(Frequency::Monthly, date(2025, 1, 31));
        schedule.end_date = Some(date(2025, 3, 31));

        assert_eq!(schedule.advance(), Some(date(2025, 2, 28)));
        assert_eq!(schedule.advance(), Some(date(2025, 3, 31)));
        assert_eq!(schedule.advance(), None);
        assert!(!schedule.is_active);
    }

    #[test]
    fn test_upcoming() {
        let mut schedule = RecurringSchedule::new(Frequency::Weekly, date(2025, 9, 1));
        schedule.next_generation_date = Some(date(2025, 9, 15));
        schedule.end_date = Some(date(2025, 10, 1));

        assert_eq!(
            schedule.upcoming(10),
            vec![date(2025, 9, 15), date(2025, 9, 22), date(2025, 9, 29)]
        );
        assert_eq!(schedule.upcoming(1), vec![date(2025, 9, 15)]);

        schedule.is_active = false;
        assert!(schedule.upcoming(3).is_empty());
    }

    #[test]
    fn test_upcoming_huge_count_stops_at_end_date() {
        let mut schedule = RecurringSchedule::new(Frequency::Monthly, date(2025, 1, 1));
        schedule.end_date = Some(date(2025, 4, 1));

        assert_eq!(
            schedule.upcoming(usize::MAX),
            vec![date(2025, 1, 1), date(2025, 2, 1), date(2025, 3, 1), date(2025, 4, 1)]
        );
        assert!(schedule.upcoming(0).is_empty());
    }

    #[test]
    fn test_upcoming_runs_flag_paused_dates() {
        let mut schedule = RecurringSchedule::new(Frequency::Weekly, date(2025, 9, 1));
        schedule.paused_until = Some(date(2025, 9, 10));

        let runs = schedule.upcoming_runs(3);
        assert_eq!(
            runs,
            vec![
                UpcomingRun { date: date(2025, 9, 1), paused: true },
                UpcomingRun { date: date(2025, 9, 8), paused: true },
                UpcomingRun { date: date(2025, 9, 15), paused: false },
            ]
        );
        assert!(runs.iter().filter(|r| r.paused).all(|r| !schedule.is_due(r.date)));
    }

    #[test]
    fn test_next_invoice_number() {
        let day = date(2025, 12, 14);
        assert_eq!(next_invoice_number("INV", day, Vec::<&str>::new()), "INV20251214-01");

        let existing = [
            "INV20251214-01_acme",
            "INV20251214-07",
            "INV20251213-09",
            "HI20251214-12",
        ];
        assert_eq!(next_invoice_number("INV", day, existing), "INV20251214-08");
    }

    #[test]
    fn test_materialize() {
        let template = Invoice {
            invoice_number: "TEMPLATE".into(),
            date: Some(DateValue::Text("2025-01-01".into())),
            due_date: Some(DateValue::Text("2025-01-31".into())),
            line_items: vec![LineItem::new("Retainer for {{MONTH_NAME}} {{YEAR}}", 1.0, 500.0)],
            status: "draft".into(),
            ..Invoice::default()
        };

        let invoice = materialize(&template, date(2025, 9, 15), "INV20250915-01".into());

        assert_eq!(invoice.invoice_number, "INV20250915-01");
        assert_eq!(invoice.date, Some(DateValue::Text("2025-09-15".into())));
        assert_eq!(invoice.due_date, Some(DateValue::Text("2025-10-15".into())));
        assert_eq!(invoice.status, "pending");
        assert_eq!(
            invoice.line_items[0].description.as_deref(),
            Some("Retainer for August 2025")
        );
    }
}
