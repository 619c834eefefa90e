//! Final HTML document handed to the rasterizer.

/// Browser viewport a document is laid out for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_scale: f64,
}

/// A4 at 96 DPI, rendered at 2x for crisp previews.
pub const A4_VIEWPORT: Viewport = Viewport { width: 794, height: 1123, device_scale: 2.0 };

/// Wrap the stylesheet and body fragments into a self-contained HTML5 document.
///
/// The fragments are inserted as-is; they are expected to be escaped already.
pub fn assemble(css: &str, header: &str, items: &str, footer: &str) -> String {
    let mut html = String::with_capacity(css.len() + header.len() + items.len() + footer.len() + 160);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>");
    html.push_str(css);
    html.push_str("</style></head><body><div class=\"invoice-container\">");
    html.push_str(header);
    html.push_str(items);
    html.push_str(footer);
    html.push_str("</div></body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_layout() {
        insta::assert_snapshot!(
            assemble("p{}", "<h>", "<i>", "<f>"),
            @r#"<!DOCTYPE html><html><head><meta charset="utf-8"><style>p{}</style></head><body><div class="invoice-container"><h><i><f></div></body></html>"#
        );
    }

    #[test]
    fn test_no_external_resources() {
        let html = assemble("body { color: red; }", "", "", "");
        assert!(!html.contains("<link"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("http"));
    }
}
