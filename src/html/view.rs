use serde::Serialize;
use slug::slugify;

use crate::format::{format_currency, format_number, format_optional_date, format_percent};
use crate::model::{InvoiceRenderContext, Party};
use crate::template::{FooterLayout, InvoiceNumberPosition, TemplateDescriptor};

/// A party with every field ready for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartyView {
    pub name: String,
    pub company: String,
    pub address_lines: Vec<String>,
    pub email: String,
    pub phone: String,
}

impl From<&Party> for PartyView {
    fn from(party: &Party) -> Self {
        Self {
            name: party.label().to_string(),
            company: party.company.trim().to_string(),
            address_lines: party.address.as_ref().map(|a| a.lines()).unwrap_or_default(),
            email: party.email.trim().to_string(),
            phone: party.phone.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaView {
    pub number: String,
    pub date: String,
    pub due_date: String,
    /// Uppercased status; empty means no badge.
    pub status_label: String,
    pub status_class: String,
    pub number_badge: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemView {
    pub description: String,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxView {
    pub rate: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TotalsView {
    pub subtotal: String,
    pub tax: Option<TaxView>,
    pub total: String,
}

/// Everything the section templates read, already formatted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionView {
    pub company: PartyView,
    pub customer: PartyView,
    pub invoice: MetaView,
    pub items: Vec<ItemView>,
    pub totals: TotalsView,
    pub primary_color: String,
    pub notes: String,
    pub payment_terms: String,
    pub signature: bool,
}

impl SectionView {
    pub fn build(ctx: &InvoiceRenderContext<'_>, template: &TemplateDescriptor) -> Self {
        let invoice = ctx.invoice;
        let currency = invoice.currency.as_str();

        let items = invoice
            .line_items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                if item.is_malformed() {
                    log::debug!(
                        "invoice {}: line item {} is missing fields, rendering defaults",
                        invoice.invoice_number,
                        index + 1
                    );
                }
                ItemView {
                    description: item.description.clone().unwrap_or_default(),
                    quantity: format_number(item.quantity.unwrap_or(0.0)),
                    rate: format_currency(item.rate.unwrap_or(0.0), currency),
                    amount: format_currency(item.amount_or_computed(), currency),
                }
            })
            .collect();

        let subtotal = invoice
            .subtotal
            .unwrap_or_else(|| invoice.line_items.iter().map(|i| i.amount_or_computed()).sum());
        let tax_amount = invoice
            .effective_tax_rate()
            .map(|rate| invoice.tax_amount.unwrap_or(subtotal * rate / 100.0));
        let total = invoice.total.unwrap_or(subtotal + tax_amount.unwrap_or(0.0));

        let tax = invoice
            .effective_tax_rate()
            .zip(tax_amount)
            .map(|(rate, amount)| TaxView {
                rate: format_percent(rate),
                amount: format_currency(amount, currency),
            });

        let status = invoice.status.trim();

        Self {
            company: PartyView::from(ctx.company),
            customer: PartyView::from(ctx.customer),
            invoice: MetaView {
                number: invoice.invoice_number.trim().to_string(),
                date: format_optional_date(invoice.date.as_ref()),
                due_date: format_optional_date(invoice.due_date.as_ref()),
                status_label: status.to_uppercase(),
                status_class: if status.is_empty() {
                    String::new()
                } else {
                    format!("badge-{}", slugify(status))
                },
                number_badge: template.layout.invoice_number_position == InvoiceNumberPosition::Badge,
            },
            items,
            totals: TotalsView {
                subtotal: format_currency(subtotal, currency),
                tax,
                total: format_currency(total, currency),
            },
            primary_color: template.colors.primary.clone(),
            notes: invoice.notes.trim().to_string(),
            payment_terms: invoice.payment_terms.trim().to_string(),
            signature: template.layout.footer_layout == FooterLayout::SignatureReady,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Invoice, LineItem};

    fn view_of(invoice: &Invoice) -> SectionView {
        let party = Party::default();
        let ctx = InvoiceRenderContext { invoice, company: &party, customer: &party };
        SectionView::build(&ctx, &TemplateDescriptor::new("t"))
    }

    #[test]
    fn test_totals_computed_when_missing() {
        let invoice = Invoice {
            line_items: vec![LineItem::new("A", 2.0, 50.0), LineItem::new("B", 1.0, 25.5)],
            tax_rate: Some(10.0),
            ..Default::default()
        };
        let totals = view_of(&invoice).totals;

        assert_eq!(totals.subtotal, "$125.50");
        assert_eq!(totals.tax.unwrap().amount, "$12.55");
        assert_eq!(totals.total, "$138.05");
    }

    #[test]
    fn test_stored_totals_win() {
        let invoice = Invoice {
            line_items: vec![LineItem::new("A", 1.0, 10.0)],
            subtotal: Some(99.0),
            tax_rate: Some(5.0),
            tax_amount: Some(1.0),
            total: Some(100.0),
            currency: "EUR".into(),
            ..Default::default()
        };
        let totals = view_of(&invoice).totals;

        assert_eq!(totals.subtotal, "€99.00");
        assert_eq!(totals.tax.unwrap(), TaxView { rate: "5%".into(), amount: "€1.00".into() });
        assert_eq!(totals.total, "€100.00");
    }

    #[test]
    fn test_zero_tax_rate_has_no_tax() {
        let invoice = Invoice { tax_rate: Some(0.0), tax_amount: Some(3.0), ..Default::default() };
        assert_eq!(view_of(&invoice).totals.tax, None);
    }

    #[test]
    fn test_status_badge_class() {
        let invoice = Invoice { status: "Overdue".into(), ..Default::default() };
        let meta = view_of(&invoice).invoice;
        assert_eq!(meta.status_label, "OVERDUE");
        assert_eq!(meta.status_class, "badge-overdue");

        let meta = view_of(&Invoice::default()).invoice;
        assert_eq!(meta.status_label, "");
        assert_eq!(meta.status_class, "");
    }

    #[test]
    fn test_malformed_item_defaults() {
        let invoice = Invoice { line_items: vec![LineItem::default()], ..Default::default() };
        let items = view_of(&invoice).items;
        assert_eq!(
            items,
            vec![ItemView {
                description: String::new(),
                quantity: "0".into(),
                rate: "$0.00".into(),
                amount: "$0.00".into(),
            }]
        );
    }
}
