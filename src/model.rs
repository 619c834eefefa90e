use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    #[serde(deserialize_with = "text")]
    pub street: String,
    #[serde(deserialize_with = "text")]
    pub city: String,
    #[serde(deserialize_with = "text")]
    pub state: String,
    #[serde(alias = "zip", deserialize_with = "text")]
    pub zip_code: String,
    #[serde(deserialize_with = "text")]
    pub country: String,
}

impl Address {
    /// Street, "city, state zip" and country, skipping whatever is blank.
    pub fn lines(&self) -> Vec<String> {
        let locality = join_present(&[self.city.as_str(), self.state.as_str()], ", ");
        let locality = join_present(&[locality.as_str(), self.zip_code.as_str()], " ");

        [self.street.trim(), locality.as_str(), self.country.trim()]
            .into_iter()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn join_present(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// The issuing business or the billed customer.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Party {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "text")]
    pub display_name: String,
    #[serde(deserialize_with = "text")]
    pub company: String,
    #[serde(deserialize_with = "text")]
    pub email: String,
    #[serde(deserialize_with = "text")]
    pub phone: String,
    #[serde(deserialize_with = "lenient")]
    pub address: Option<Address>,
}

impl Party {
    /// `name`, falling back to `displayName` (user profiles only carry the latter).
    pub fn label(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() { self.display_name.trim() } else { name }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    #[serde(deserialize_with = "optional_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "number")]
    pub quantity: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub rate: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub amount: Option<f64>,
}

impl LineItem {
    pub fn new(description: &str, quantity: f64, rate: f64) -> Self {
        Self {
            description: Some(description.to_string()),
            quantity: Some(quantity),
            rate: Some(rate),
            amount: Some(quantity * rate),
        }
    }

    /// True when description, quantity or rate had to be defaulted.
    pub fn is_malformed(&self) -> bool {
        self.description.is_none() || self.quantity.is_none() || self.rate.is_none()
    }

    /// The stored amount; quantity times rate only when none was stored.
    pub fn amount_or_computed(&self) -> f64 {
        self.amount
            .unwrap_or_else(|| self.quantity.unwrap_or(0.0) * self.rate.unwrap_or(0.0))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    #[serde(deserialize_with = "text")]
    pub invoice_number: String,
    #[serde(deserialize_with = "lenient")]
    pub date: Option<DateValue>,
    #[serde(deserialize_with = "lenient")]
    pub due_date: Option<DateValue>,
    #[serde(deserialize_with = "line_items")]
    pub line_items: Vec<LineItem>,
    #[serde(deserialize_with = "number")]
    pub subtotal: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub tax_rate: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub tax_amount: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub total: Option<f64>,
    #[serde(deserialize_with = "text")]
    pub notes: String,
    #[serde(deserialize_with = "text")]
    pub payment_terms: String,
    #[serde(deserialize_with = "text")]
    pub status: String,
    #[serde(deserialize_with = "text")]
    pub currency: String,
}

impl Invoice {
    /// Non-zero tax rate, if any. A zero, missing or non-numeric rate means no tax line.
    pub fn effective_tax_rate(&self) -> Option<f64> {
        self.tax_rate.filter(|rate| rate.is_finite() && *rate != 0.0)
    }

    /// The invoice date, when it can be read as a calendar date.
    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.date.as_ref().and_then(DateValue::to_naive_date)
    }
}

/// Input contract of a render request.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderRequest {
    #[serde(deserialize_with = "or_default")]
    pub invoice: Invoice,
    #[serde(alias = "userData", deserialize_with = "or_default")]
    pub company: Party,
    #[serde(deserialize_with = "or_default")]
    pub customer: Party,
    #[serde(deserialize_with = "optional_text")]
    pub template_id: Option<String>,
}

/// Borrowed bundle of the data a single render works from.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceRenderContext<'a> {
    pub invoice: &'a Invoice,
    pub company: &'a Party,
    pub customer: &'a Party,
}

impl<'a> From<&'a RenderRequest> for InvoiceRenderContext<'a> {
    fn from(request: &'a RenderRequest) -> Self {
        Self {
            invoice: &request.invoice,
            company: &request.company,
            customer: &request.customer,
        }
    }
}

/// A date as it arrives from the API: ISO text, epoch millis or a Firestore timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Timestamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    Millis(f64),
    Text(String),
}

impl DateValue {
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Timestamp { seconds, nanoseconds } => {
                DateTime::from_timestamp(*seconds, *nanoseconds).map(|dt| dt.date_naive())
            }
            DateValue::Millis(ms) if ms.is_finite() => {
                DateTime::from_timestamp_millis(*ms as i64).map(|dt| dt.date_naive())
            }
            DateValue::Millis(_) => None,
            DateValue::Text(s) => parse_date_text(s),
        }
    }
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        DateValue::Text(date.format("%Y-%m-%d").to_string())
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    // "2025-09-15T10:00:00" without an offset
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

// ------------------------------------------------------------------
// Lenient field readers: a render never fails because of field shape.
// ------------------------------------------------------------------

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// An unreadable entry becomes an empty row rather than disappearing.
fn line_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<LineItem>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
