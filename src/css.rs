//! Descriptor → stylesheet.
//!
//! Output is a pure function of the descriptor: the same descriptor always
//! yields byte-identical CSS. Header position and template style are resolved
//! independently; the two boolean layout flags gate whole blocks.

use crate::format::format_number;
use crate::template::{FooterLayout, HeaderPosition, ItemsLayout, TemplateDescriptor, TemplateStyle};

fn px(value: f64) -> String {
    format!("{}px", format_number(value))
}

fn pt(value: f64) -> String {
    format!("{}pt", format_number(value))
}

fn rule(css: &mut String, selector: &str, declarations: &str) {
    css.push_str(selector);
    css.push_str(" { ");
    css.push_str(declarations);
    css.push_str(" }\n");
}

/// Full stylesheet for `template`.
pub fn compose_css(template: &TemplateDescriptor) -> String {
    let mut css = String::with_capacity(8 * 1024);

    base(&mut css, template);
    typography(&mut css, template);
    header(&mut css, template);
    if template.layout.show_header_background {
        header_background(&mut css, template);
    }
    css.push_str(&header_position_css(template));

    items(&mut css, template);
    if template.layout.show_item_border {
        item_borders(&mut css, template);
    }
    css.push_str(&items_layout_css(template));
    totals(&mut css, template);

    footer(&mut css, template);
    if template.layout.footer_layout == FooterLayout::SignatureReady {
        signature(&mut css, template);
    }
    badges(&mut css, template);

    css.push_str(&style_css(template));
    css
}

fn base(css: &mut String, t: &TemplateDescriptor) {
    let page = &t.spacing.page;
    rule(css, "@page", "size: A4; margin: 0;");
    rule(css, "*, *::before, *::after", "box-sizing: border-box; margin: 0; padding: 0;");
    rule(css, "html, body", &format!("background: {};", t.colors.background));
    rule(
        css,
        "body",
        &format!(
            "font-family: {}; font-size: {}; color: {}; line-height: 1.45; \
             -webkit-print-color-adjust: exact; print-color-adjust: exact;",
            t.fonts.primary,
            pt(t.fonts.size.base),
            t.colors.text
        ),
    );
    rule(
        css,
        ".invoice-container",
        &format!(
            "width: 794px; min-height: 1123px; margin: 0 auto; padding: {} {} {} {}; background: {};",
            px(page.top),
            px(page.right),
            px(page.bottom),
            px(page.left),
            t.colors.background
        ),
    );
}

fn typography(css: &mut String, t: &TemplateDescriptor) {
    let (colors, sizes) = (&t.colors, &t.fonts.size);
    rule(
        css,
        "h1, h2, h3",
        &format!("font-family: {}; color: {}; font-weight: 700;", t.fonts.secondary, colors.primary),
    );
    rule(
        css,
        ".invoice-title",
        &format!("font-size: {}; letter-spacing: 0.04em; color: {};", pt(sizes.header), colors.primary),
    );
    rule(
        css,
        ".company-name",
        &format!("font-size: {}; font-weight: 700; color: {};", pt(sizes.subheader), colors.primary),
    );
    rule(
        css,
        ".party-label, .footer-label, .meta-label",
        &format!(
            "font-size: {}; text-transform: uppercase; letter-spacing: 0.08em; color: {};",
            pt(sizes.small),
            colors.muted
        ),
    );
    rule(css, ".party-name", "font-weight: 600;");
    rule(css, ".party-line", &format!("color: {};", colors.secondary));
}

fn header(css: &mut String, t: &TemplateDescriptor) {
    let (colors, sizes) = (&t.colors, &t.fonts.size);
    rule(
        css,
        ".invoice-header",
        &format!(
            "display: flex; justify-content: space-between; align-items: flex-start; gap: 24px; \
             margin-bottom: {}; color: {};",
            px(t.spacing.section),
            colors.header_text
        ),
    );
    rule(css, ".header-right", "text-align: right;");
    rule(css, ".invoice-meta", "margin-top: 8px;");
    rule(css, ".meta-row", "display: flex; justify-content: flex-end; gap: 12px;");
    rule(css, ".bill-to-section", &format!("margin-bottom: {};", px(t.spacing.section)));
    rule(
        css,
        ".invoice-number",
        &format!("font-size: {}; color: {};", pt(sizes.subheader), colors.secondary),
    );
    rule(
        css,
        ".invoice-number-badge",
        &format!(
            "display: inline-block; padding: 4px 12px; border-radius: 999px; background: {}; \
             color: #ffffff; font-weight: 600; font-size: {};",
            colors.accent,
            pt(sizes.small)
        ),
    );
    rule(css, ".parties-grid", "display: grid; grid-template-columns: 1fr 1fr; gap: 24px;");
    rule(css, ".header-diagonal", "position: relative; overflow: hidden; padding: 32px 0;");
    rule(
        css,
        ".diagonal-band",
        &format!(
            "position: absolute; top: 0; right: 0; bottom: 0; left: 0; background: {}; \
             transform: skewY(-4deg); transform-origin: top left; z-index: 0;",
            colors.header_bg
        ),
    );
    rule(
        css,
        ".diagonal-content",
        &format!(
            "position: relative; z-index: 1; display: flex; justify-content: space-between; \
             width: 100%; padding: 0 24px; color: {};",
            colors.header_text
        ),
    );
}

fn header_background(css: &mut String, t: &TemplateDescriptor) {
    let colors = &t.colors;
    rule(
        css,
        ".invoice-header",
        &format!("background: {}; color: {}; padding: 24px;", colors.header_bg, colors.header_text),
    );
    rule(
        css,
        ".invoice-header h1, .invoice-header h2, .invoice-header .invoice-title, .invoice-header .company-name",
        &format!("color: {};", colors.header_text),
    );
    rule(
        css,
        ".invoice-header .party-line, .invoice-header .meta-label, .invoice-header .invoice-number",
        &format!("color: {}; opacity: 0.85;", colors.header_text),
    );
}

/// Positioning rules for `layout.headerPosition`. Positions without their own
/// rules produce an empty fragment.
pub fn header_position_css(t: &TemplateDescriptor) -> String {
    let mut css = String::new();
    let (colors, page) = (&t.colors, &t.spacing.page);

    match t.layout.header_position {
        HeaderPosition::Top => {
            rule(
                &mut css,
                ".invoice-header",
                &format!(
                    "margin-left: -{}; margin-right: -{}; padding: 32px {} 32px {};",
                    px(page.left),
                    px(page.right),
                    px(page.right),
                    px(page.left)
                ),
            );
        }
        HeaderPosition::Centered => {
            rule(&mut css, ".header-centered", "flex-direction: column; align-items: center; text-align: center;");
            rule(&mut css, ".header-centered .company-name", &format!("font-size: {};", pt(t.fonts.size.header)));
            rule(&mut css, ".header-centered .meta-row", "justify-content: center;");
            rule(&mut css, ".header-centered .parties-grid", "width: 100%; margin-top: 16px; text-align: left;");
        }
        HeaderPosition::Sidebar => {
            rule(&mut css, ".header-sidebar", "align-items: stretch; gap: 0; padding: 0;");
            rule(
                &mut css,
                ".header-sidebar-panel",
                &format!("width: 240px; padding: 24px; background: {}; color: {};", colors.header_bg, colors.header_text),
            );
            rule(
                &mut css,
                ".header-sidebar-panel .company-name, .header-sidebar-panel .party-line, .header-sidebar-panel .meta-label",
                &format!("color: {};", colors.header_text),
            );
            rule(&mut css, ".header-main", "flex: 1; padding: 24px; text-align: right;");
            rule(&mut css, ".header-main .bill-to", "margin-top: 16px;");
        }
        HeaderPosition::Inline => {
            rule(&mut css, ".header-inline", "flex-direction: column; gap: 8px;");
            rule(&mut css, ".inline-row", "display: flex; align-items: baseline; gap: 12px; flex-wrap: wrap;");
            rule(&mut css, ".inline-separator", &format!("color: {};", colors.muted));
            rule(&mut css, ".inline-details", "display: flex; justify-content: space-between; gap: 32px; width: 100%;");
        }
        HeaderPosition::Split => {
            rule(&mut css, ".header-split", "gap: 0; padding: 0; align-items: stretch;");
            rule(&mut css, ".split-half", "flex: 1; padding: 24px;");
            rule(&mut css, ".split-brand", &format!("background: {}; color: #ffffff;", colors.primary));
            rule(&mut css, ".split-brand .company-name, .split-brand .party-line", "color: #ffffff;");
            rule(&mut css, ".split-meta", "text-align: right;");
        }
        HeaderPosition::Floating => {
            rule(
                &mut css,
                ".invoice-header",
                &format!(
                    "background: {}; border-radius: 12px; padding: 24px; margin-top: 8px; \
                     box-shadow: 0 8px 24px rgba(15, 23, 42, 0.12);",
                    colors.header_bg
                ),
            );
        }
        HeaderPosition::Standard
        | HeaderPosition::Diagonal
        | HeaderPosition::Minimal
        | HeaderPosition::Unknown => {}
    }
    css
}

fn items(css: &mut String, t: &TemplateDescriptor) {
    let (colors, line) = (&t.colors, px(t.spacing.line));
    rule(css, ".items-section", &format!("margin-bottom: {};", px(t.spacing.section)));
    rule(css, "table.items", "width: 100%; border-collapse: collapse;");
    rule(
        css,
        ".items th",
        &format!(
            "text-align: left; padding: {} 12px; background: {}; color: {}; font-size: {}; font-weight: 700;",
            line,
            colors.table_header_bg,
            colors.primary,
            pt(t.fonts.size.small)
        ),
    );
    rule(css, ".items td", &format!("padding: {} 12px; vertical-align: top;", line));
    rule(css, ".items tbody tr:nth-child(even)", &format!("background: {};", colors.table_row_alt_bg));
    rule(
        css,
        ".col-quantity, .col-rate, .col-amount, .item-quantity, .item-rate, .item-amount",
        "text-align: right;",
    );
    rule(css, ".item-description", "white-space: pre-line;");
}

fn item_borders(css: &mut String, t: &TemplateDescriptor) {
    let border = &t.colors.border;
    rule(css, ".items th", &format!("border-bottom: 2px solid {};", border));
    rule(css, ".items td", &format!("border-bottom: 1px solid {};", border));
    rule(css, ".line-item", &format!("border-bottom: 1px solid {};", border));
    rule(css, ".item-card", &format!("border: 1px solid {};", border));
}

/// Rules for the active `layout.itemsLayout`; the plain table needs none.
pub fn items_layout_css(t: &TemplateDescriptor) -> String {
    let mut css = String::new();
    let (colors, line) = (&t.colors, px(t.spacing.line));

    match t.layout.items_layout {
        ItemsLayout::TableRounded => {
            rule(
                &mut css,
                ".items-rounded",
                &format!("border: 1px solid {}; border-radius: 10px; overflow: hidden;", colors.border),
            );
        }
        ItemsLayout::Cards => {
            rule(
                &mut css,
                ".item-card",
                &format!("padding: {} 14px; margin-bottom: 8px; border-radius: 8px; background: {};", line, colors.table_row_alt_bg),
            );
            rule(&mut css, ".item-card-main", "display: flex; justify-content: space-between; font-weight: 600;");
            rule(
                &mut css,
                ".item-card-detail",
                &format!("color: {}; font-size: {};", colors.muted, pt(t.fonts.size.small)),
            );
        }
        ItemsLayout::SimpleLines => {
            rule(
                &mut css,
                ".line-header, .line-item",
                &format!("display: grid; grid-template-columns: 1fr 70px 100px 110px; gap: 12px; padding: {} 0;", line),
            );
            rule(
                &mut css,
                ".line-header",
                &format!(
                    "font-size: {}; color: {}; text-transform: uppercase; border-bottom: 1px solid {};",
                    pt(t.fonts.size.small),
                    colors.muted,
                    colors.primary
                ),
            );
        }
        ItemsLayout::Table | ItemsLayout::Unknown => {}
    }
    css
}

fn totals(css: &mut String, t: &TemplateDescriptor) {
    rule(css, ".totals", "margin-left: auto; margin-top: 16px; width: 280px;");
    rule(css, ".totals-row", "display: flex; justify-content: space-between; padding: 4px 0;");
    rule(
        css,
        ".totals-row.total",
        &format!("margin-top: 6px; padding-top: 8px; font-size: {}; font-weight: 700;", pt(t.fonts.size.subheader)),
    );
}

fn footer(css: &mut String, t: &TemplateDescriptor) {
    let colors = &t.colors;
    rule(
        css,
        ".invoice-footer",
        &format!(
            "margin-top: {}; padding-top: 16px; border-top: 1px solid {}; font-size: {}; color: {};",
            px(t.spacing.section),
            colors.border,
            pt(t.fonts.size.small),
            colors.secondary
        ),
    );
    rule(css, ".footer-block", "margin-bottom: 12px;");
    rule(css, ".footer-text", "white-space: pre-line;");
}

fn signature(css: &mut String, t: &TemplateDescriptor) {
    rule(css, ".signature-block", "display: grid; grid-template-columns: 1fr 1fr; gap: 48px; margin-top: 48px;");
    rule(css, ".signature-line", &format!("height: 40px; border-bottom: 1px solid {};", t.colors.text));
    rule(
        css,
        ".signature-caption",
        &format!("margin-top: 6px; font-size: {}; color: {};", pt(t.fonts.size.small), t.colors.muted),
    );
}

fn badges(css: &mut String, t: &TemplateDescriptor) {
    rule(
        css,
        ".status-badge",
        &format!(
            "display: inline-block; margin-top: 8px; padding: 3px 10px; border-radius: 4px; \
             font-size: {}; font-weight: 700; letter-spacing: 0.06em;",
            pt(t.fonts.size.small)
        ),
    );
    rule(css, ".badge-paid", "background: #dcfce7; color: #166534;");
    rule(css, ".badge-pending", "background: #fef9c3; color: #854d0e;");
    rule(css, ".badge-overdue", "background: #fee2e2; color: #991b1b;");
    rule(css, ".badge-draft", "background: #f3f4f6; color: #374151;");
}

/// Decorative rules for `layout.type`. Styles without their own rules produce
/// an empty fragment.
pub fn style_css(t: &TemplateDescriptor) -> String {
    let mut css = String::new();
    let (colors, fonts) = (&t.colors, &t.fonts);

    match t.layout.style {
        TemplateStyle::Modern => {
            rule(&mut css, ".invoice-title", "text-transform: uppercase; font-weight: 800;");
            rule(
                &mut css,
                ".items th, .line-header",
                &format!("text-transform: uppercase; letter-spacing: 0.06em; font-size: {};", pt(fonts.size.small)),
            );
            rule(&mut css, ".totals-row.total", &format!("color: {};", colors.primary));
        }
        TemplateStyle::Minimal => {
            rule(&mut css, "h1, h2, h3", "font-weight: 400;");
            rule(&mut css, ".invoice-title", "font-weight: 300; letter-spacing: 0.2em;");
            rule(&mut css, ".status-badge", "background: transparent; border: 1px solid currentColor;");
        }
        TemplateStyle::Corporate => {
            rule(&mut css, ".invoice-container", &format!("border-top: 6px solid {};", colors.primary));
            rule(&mut css, ".items th", &format!("background: {}; color: #ffffff;", colors.table_header_bg));
            rule(&mut css, ".totals", &format!("background: {}; padding: 12px;", colors.table_row_alt_bg));
        }
        TemplateStyle::Creative => {
            rule(&mut css, ".invoice-container", &format!("border-left: 8px solid {};", colors.accent));
            rule(&mut css, ".invoice-title", &format!("color: {};", colors.secondary));
            rule(&mut css, ".item-card", &format!("border-left: 4px solid {};", colors.accent));
        }
        TemplateStyle::Elegant => {
            rule(
                &mut css,
                ".invoice-title, .company-name",
                &format!("font-family: {}; font-style: italic;", fonts.primary),
            );
            rule(
                &mut css,
                ".invoice-header",
                &format!("border-bottom: 3px double {}; padding-bottom: 16px;", colors.accent),
            );
            rule(&mut css, ".totals-row.total", &format!("font-family: {};", fonts.primary));
        }
        TemplateStyle::Classic | TemplateStyle::Unknown => {}
    }
    css
}
