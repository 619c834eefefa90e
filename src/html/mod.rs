//! Header, line-item and footer fragments.
//!
//! Each fragment is a Tera template picked by the descriptor's layout tags.
//! Templates are registered under `.html` names, so every interpolated value
//! is HTML-escaped; only the markup in the template files is emitted raw.

mod view;

use tera::{Context, Tera};

pub use view::{ItemView, MetaView, PartyView, SectionView, TaxView, TotalsView};

use crate::error::Result;
use crate::model::InvoiceRenderContext;
use crate::template::{HeaderPosition, ItemsLayout, TemplateDescriptor};

// Embed the section templates so the renderer never depends on the working directory
const SECTION_TEMPLATES: &[(&str, &str)] = &[
    ("header/standard.html", include_str!("../../templates/header/standard.html")),
    ("header/centered.html", include_str!("../../templates/header/centered.html")),
    ("header/sidebar.html", include_str!("../../templates/header/sidebar.html")),
    ("header/split.html", include_str!("../../templates/header/split.html")),
    ("header/diagonal.html", include_str!("../../templates/header/diagonal.html")),
    ("header/inline.html", include_str!("../../templates/header/inline.html")),
    ("items/table.html", include_str!("../../templates/items/table.html")),
    ("items/table_rounded.html", include_str!("../../templates/items/table_rounded.html")),
    ("items/cards.html", include_str!("../../templates/items/cards.html")),
    ("items/simple_lines.html", include_str!("../../templates/items/simple_lines.html")),
    ("footer.html", include_str!("../../templates/footer.html")),
    ("partials/company.html", include_str!("../../templates/partials/company.html")),
    ("partials/company_details.html", include_str!("../../templates/partials/company_details.html")),
    ("partials/bill_to.html", include_str!("../../templates/partials/bill_to.html")),
    ("partials/meta.html", include_str!("../../templates/partials/meta.html")),
    ("partials/invoice_number.html", include_str!("../../templates/partials/invoice_number.html")),
    ("partials/status_badge.html", include_str!("../../templates/partials/status_badge.html")),
    ("partials/totals.html", include_str!("../../templates/partials/totals.html")),
];

/// The three body fragments of one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    pub header: String,
    pub items: String,
    pub footer: String,
}

/// Header template for a position. `top`, `floating` and `minimal` share the
/// standard markup and differ only in CSS.
pub fn header_template(position: HeaderPosition) -> &'static str {
    match position {
        HeaderPosition::Centered => "header/centered.html",
        HeaderPosition::Sidebar => "header/sidebar.html",
        HeaderPosition::Split => "header/split.html",
        HeaderPosition::Diagonal => "header/diagonal.html",
        HeaderPosition::Inline => "header/inline.html",
        HeaderPosition::Standard
        | HeaderPosition::Top
        | HeaderPosition::Floating
        | HeaderPosition::Minimal
        | HeaderPosition::Unknown => "header/standard.html",
    }
}

pub fn items_template(layout: ItemsLayout) -> &'static str {
    match layout {
        ItemsLayout::Cards => "items/cards.html",
        ItemsLayout::SimpleLines => "items/simple_lines.html",
        ItemsLayout::TableRounded => "items/table_rounded.html",
        ItemsLayout::Table | ItemsLayout::Unknown => "items/table.html",
    }
}

/// Compiled section templates. Immutable once built, so one instance can
/// serve any number of renders.
#[derive(Debug)]
pub struct SectionRenderer {
    tera: Tera,
}

impl SectionRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(SECTION_TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    pub fn header(&self, ctx: &InvoiceRenderContext<'_>, template: &TemplateDescriptor) -> Result<String> {
        let view = SectionView::build(ctx, template);
        self.fragment(header_template(template.layout.header_position), &view)
    }

    pub fn line_items(&self, ctx: &InvoiceRenderContext<'_>, template: &TemplateDescriptor) -> Result<String> {
        let view = SectionView::build(ctx, template);
        self.fragment(items_template(template.layout.items_layout), &view)
    }

    pub fn footer(&self, ctx: &InvoiceRenderContext<'_>, template: &TemplateDescriptor) -> Result<String> {
        let view = SectionView::build(ctx, template);
        self.fragment("footer.html", &view)
    }

    /// All three fragments from a single view.
    pub fn render(&self, ctx: &InvoiceRenderContext<'_>, template: &TemplateDescriptor) -> Result<Sections> {
        let view = SectionView::build(ctx, template);
        Ok(Sections {
            header: self.fragment(header_template(template.layout.header_position), &view)?,
            items: self.fragment(items_template(template.layout.items_layout), &view)?,
            footer: self.fragment("footer.html", &view)?,
        })
    }

    fn fragment(&self, name: &str, view: &SectionView) -> Result<String> {
        let context = Context::from_serialize(view)?;
        Ok(self.tera.render(name, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Address, Invoice, LineItem, Party};
    use crate::template::{FooterLayout, InvoiceNumberPosition, TemplateStyle};

    struct Fixture {
        invoice: Invoice,
        company: Party,
        customer: Party,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                invoice: Invoice {
                    invoice_number: "INV-7".into(),
                    line_items: vec![LineItem::new("Design", 2.0, 100.0)],
                    subtotal: Some(200.0),
                    tax_rate: Some(10.0),
                    tax_amount: Some(20.0),
                    total: Some(220.0),
                    notes: "Thanks!".into(),
                    payment_terms: "Net 30".into(),
                    status: "paid".into(),
                    currency: "USD".into(),
                    ..Default::default()
                },
                company: Party { name: "Acme Studio".into(), email: "hi@acme.test".into(), ..Default::default() },
                customer: Party {
                    name: "Globex".into(),
                    address: Some(Address { city: "Springfield".into(), ..Default::default() }),
                    ..Default::default()
                },
            }
        }

        fn ctx(&self) -> InvoiceRenderContext<'_> {
            InvoiceRenderContext { invoice: &self.invoice, company: &self.company, customer: &self.customer }
        }
    }

    #[test]
    fn test_all_templates_compile() {
        let renderer = SectionRenderer::new().unwrap();
        let names: Vec<_> = renderer.tera.get_template_names().collect();
        assert_eq!(names.len(), SECTION_TEMPLATES.len());
    }

    #[test]
    fn test_header_dispatch_defaults_to_standard() {
        for position in [HeaderPosition::Top, HeaderPosition::Floating, HeaderPosition::Minimal, HeaderPosition::Unknown] {
            assert_eq!(header_template(position), "header/standard.html");
        }
        assert_eq!(items_template(ItemsLayout::Unknown), "items/table.html");
    }

    #[test]
    fn test_header_variants_differ() {
        let renderer = SectionRenderer::new().unwrap();
        let fixture = Fixture::new();
        let mut template = TemplateDescriptor::new("t");

        let mut seen = Vec::new();
        for position in [
            HeaderPosition::Standard,
            HeaderPosition::Centered,
            HeaderPosition::Sidebar,
            HeaderPosition::Split,
            HeaderPosition::Diagonal,
            HeaderPosition::Inline,
        ] {
            template.layout.header_position = position;
            let html = renderer.header(&fixture.ctx(), &template).unwrap();
            assert!(html.contains("Acme Studio"), "{position:?} lost the company name");
            assert!(html.contains("Globex"), "{position:?} lost the customer");
            assert!(html.contains("INV-7"), "{position:?} lost the invoice number");
            assert!(!seen.contains(&html), "{position:?} duplicates another header");
            seen.push(html);
        }
    }

    #[test]
    fn test_invoice_number_badge_is_independent_of_position() {
        let renderer = SectionRenderer::new().unwrap();
        let fixture = Fixture::new();
        let mut template = TemplateDescriptor::new("t");
        template.layout.header_position = HeaderPosition::Sidebar;

        let plain = renderer.header(&fixture.ctx(), &template).unwrap();
        assert!(plain.contains(r#"<p class="invoice-number">#INV-7</p>"#));
        assert!(!plain.contains("invoice-number-badge"));

        template.layout.invoice_number_position = InvoiceNumberPosition::Badge;
        let badge = renderer.header(&fixture.ctx(), &template).unwrap();
        assert!(badge.contains(r#"<span class="invoice-number-badge">#INV-7</span>"#));
    }

    #[test]
    fn test_status_badge() {
        let renderer = SectionRenderer::new().unwrap();
        let fixture = Fixture::new();
        let html = renderer.header(&fixture.ctx(), &TemplateDescriptor::new("t")).unwrap();
        assert!(html.contains(r#"<span class="status-badge badge-paid">PAID</span>"#));
    }

    #[test]
    fn test_header_ignores_style() {
        let renderer = SectionRenderer::new().unwrap();
        let fixture = Fixture::new();
        let mut template = TemplateDescriptor::new("t");
        template.layout.header_position = HeaderPosition::Centered;

        template.layout.style = TemplateStyle::Modern;
        let modern = renderer.header(&fixture.ctx(), &template).unwrap();
        template.layout.style = TemplateStyle::Elegant;
        let elegant = renderer.header(&fixture.ctx(), &template).unwrap();

        assert_eq!(modern, elegant);
    }

    #[test]
    fn test_items_variants_render_every_field() {
        let renderer = SectionRenderer::new().unwrap();
        let fixture = Fixture::new();
        let mut template = TemplateDescriptor::new("t");
        template.colors.primary = "#0a0b0c".into();

        for layout in [ItemsLayout::Table, ItemsLayout::Cards, ItemsLayout::SimpleLines, ItemsLayout::TableRounded] {
            template.layout.items_layout = layout;
            let html = renderer.line_items(&fixture.ctx(), &template).unwrap();
            for expected in ["Design", ">2<", "$100.00", "$200.00", "Tax (10%):", "$20.00", "$220.00"] {
                assert!(html.contains(expected), "{layout:?} is missing {expected}");
            }
            assert!(html.contains("border-top: 2px solid #0a0b0c;"), "{layout:?} totals border");
        }
    }

    #[test]
    fn test_footer_signature_only_when_ready() {
        let renderer = SectionRenderer::new().unwrap();
        let fixture = Fixture::new();
        let mut template = TemplateDescriptor::new("t");

        let standard = renderer.footer(&fixture.ctx(), &template).unwrap();
        assert!(standard.contains("Thanks!"));
        assert!(standard.contains("Net 30"));
        assert!(!standard.contains("signature-block"));

        template.layout.footer_layout = FooterLayout::SignatureReady;
        let signed = renderer.footer(&fixture.ctx(), &template).unwrap();
        assert_eq!(signed.matches(r#"<div class="signature-line"></div>"#).count(), 2);
    }

    #[test]
    fn test_empty_footer_fields_are_omitted() {
        let renderer = SectionRenderer::new().unwrap();
        let mut fixture = Fixture::new();
        fixture.invoice.notes.clear();
        fixture.invoice.payment_terms.clear();

        let html = renderer.footer(&fixture.ctx(), &TemplateDescriptor::new("t")).unwrap();
        assert!(!html.contains("footer-block"));
    }

    #[test]
    fn test_render_matches_individual_builders() {
        let renderer = SectionRenderer::new().unwrap();
        let fixture = Fixture::new();
        let template = TemplateDescriptor::new("t");

        let sections = renderer.render(&fixture.ctx(), &template).unwrap();
        assert_eq!(sections.header, renderer.header(&fixture.ctx(), &template).unwrap());
        assert_eq!(sections.items, renderer.line_items(&fixture.ctx(), &template).unwrap());
        assert_eq!(sections.footer, renderer.footer(&fixture.ctx(), &template).unwrap());
    }
}
