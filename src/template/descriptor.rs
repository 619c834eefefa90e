//! Template descriptors: the declarative description of one invoice style.
//!
//! Every layout axis is a closed enum with an `Unknown` catch-all so authored
//! data naming a variant this build does not know still deserializes.

use serde::{Deserialize, Serialize};

/// Decorative family (`layout.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateStyle {
    #[default]
    Classic,
    Modern,
    Minimal,
    Corporate,
    Creative,
    Elegant,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderPosition {
    #[default]
    Standard,
    Top,
    Centered,
    Sidebar,
    Inline,
    Split,
    Floating,
    Diagonal,
    Minimal,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemsLayout {
    #[default]
    Table,
    Cards,
    SimpleLines,
    TableRounded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FooterLayout {
    #[default]
    Standard,
    SignatureReady,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceNumberPosition {
    #[default]
    Header,
    Badge,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Layout {
    #[serde(rename = "type")]
    pub style: TemplateStyle,
    pub header_position: HeaderPosition,
    pub items_layout: ItemsLayout,
    pub footer_layout: FooterLayout,
    pub invoice_number_position: InvoiceNumberPosition,
    pub show_header_background: bool,
    pub show_item_border: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            style: TemplateStyle::default(),
            header_position: HeaderPosition::default(),
            items_layout: ItemsLayout::default(),
            footer_layout: FooterLayout::default(),
            invoice_number_position: InvoiceNumberPosition::default(),
            show_header_background: false,
            show_item_border: true,
        }
    }
}

impl Layout {
    /// Names of the axes whose tag was not recognized and will render with the default branch.
    pub fn unrecognized(&self) -> Vec<&'static str> {
        let mut axes = Vec::new();
        if self.style == TemplateStyle::Unknown {
            axes.push("type");
        }
        if self.header_position == HeaderPosition::Unknown {
            axes.push("headerPosition");
        }
        if self.items_layout == ItemsLayout::Unknown {
            axes.push("itemsLayout");
        }
        if self.footer_layout == FooterLayout::Unknown {
            axes.push("footerLayout");
        }
        if self.invoice_number_position == InvoiceNumberPosition::Unknown {
            axes.push("invoiceNumberPosition");
        }
        axes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Colors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub text: String,
    pub background: String,
    pub header_bg: String,
    pub header_text: String,
    pub table_header_bg: String,
    pub table_row_alt_bg: String,
    pub border: String,
    pub muted: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            primary: "#1f2937".into(),
            secondary: "#4b5563".into(),
            accent: "#2563eb".into(),
            text: "#111827".into(),
            background: "#ffffff".into(),
            header_bg: "#f3f4f6".into(),
            header_text: "#111827".into(),
            table_header_bg: "#f3f4f6".into(),
            table_row_alt_bg: "#f9fafb".into(),
            border: "#e5e7eb".into(),
            muted: "#6b7280".into(),
        }
    }
}

/// Font sizes in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub base: f64,
    pub header: f64,
    pub subheader: f64,
    pub small: f64,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self { base: 10.0, header: 24.0, subheader: 12.0, small: 8.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fonts {
    pub primary: String,
    pub secondary: String,
    pub size: FontSizes,
}

impl Default for Fonts {
    fn default() -> Self {
        Self {
            primary: "Helvetica, Arial, sans-serif".into(),
            secondary: "Helvetica, Arial, sans-serif".into(),
            size: FontSizes::default(),
        }
    }
}

/// Page padding in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpacing {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for PageSpacing {
    fn default() -> Self {
        Self { top: 40.0, right: 40.0, bottom: 40.0, left: 40.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    pub page: PageSpacing,
    /// Gap between sections, px.
    pub section: f64,
    /// Vertical padding of a line item, px.
    pub line: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self { page: PageSpacing::default(), section: 24.0, line: 8.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub colors: Colors,
    #[serde(default)]
    pub fonts: Fonts,
    #[serde(default)]
    pub spacing: Spacing,
}

impl TemplateDescriptor {
    /// A descriptor with every group at its default.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            description: String::new(),
            layout: Layout::default(),
            colors: Colors::default(),
            fonts: Fonts::default(),
            spacing: Spacing::default(),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_tags_from_json() {
        let layout: Layout = serde_json::from_str(
            r#"{
                "type": "creative",
                "headerPosition": "sidebar",
                "itemsLayout": "simple-lines",
                "footerLayout": "signature-ready",
                "invoiceNumberPosition": "badge",
                "showHeaderBackground": true
            }"#,
        )
        .unwrap();

        assert_eq!(layout.style, TemplateStyle::Creative);
        assert_eq!(layout.header_position, HeaderPosition::Sidebar);
        assert_eq!(layout.items_layout, ItemsLayout::SimpleLines);
        assert_eq!(layout.footer_layout, FooterLayout::SignatureReady);
        assert_eq!(layout.invoice_number_position, InvoiceNumberPosition::Badge);
        assert!(layout.show_header_background);
        assert!(layout.show_item_border);
        assert!(layout.unrecognized().is_empty());
    }

    #[test]
    fn test_unknown_tags_fall_back() {
        let layout: Layout = serde_json::from_str(
            r#"{ "type": "vaporwave", "headerPosition": "upside-down", "itemsLayout": "grid" }"#,
        )
        .unwrap();

        assert_eq!(layout.style, TemplateStyle::Unknown);
        assert_eq!(layout.header_position, HeaderPosition::Unknown);
        assert_eq!(layout.items_layout, ItemsLayout::Unknown);
        assert_eq!(layout.footer_layout, FooterLayout::Standard);
        assert_eq!(layout.unrecognized(), vec!["type", "headerPosition", "itemsLayout"]);
    }

    #[test]
    fn test_partial_descriptor_gets_defaults() {
        let descriptor: TemplateDescriptor =
            serde_json::from_str(r##"{ "id": "bare", "colors": { "primary": "#ff0000" } }"##).unwrap();

        assert_eq!(descriptor.colors.primary, "#ff0000");
        assert_eq!(descriptor.colors.border, Colors::default().border);
        assert_eq!(descriptor.fonts.size.base, 10.0);
        assert_eq!(descriptor.spacing.page.left, 40.0);
        assert_eq!(descriptor.display_name(), "bare");
    }
}
