use crate::css::compose_css;
use crate::document::assemble;
use crate::error::Result;
use crate::html::SectionRenderer;
use crate::model::{InvoiceRenderContext, RenderRequest};
use crate::template::TemplateRegistry;

/// Result of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedInvoice {
    pub html: String,
    /// Id of the descriptor actually used.
    pub template_id: String,
    /// The requested template id was unknown and the default was used instead.
    pub used_fallback: bool,
}

/// Turns render requests into complete HTML documents.
///
/// Holds the template registry and the compiled section templates; both are
/// read-only after construction, so `render` takes `&self`.
#[derive(Debug)]
pub struct InvoiceRenderer {
    registry: TemplateRegistry,
    sections: SectionRenderer,
}

impl InvoiceRenderer {
    pub fn new(registry: TemplateRegistry) -> Result<Self> {
        Ok(Self { registry, sections: SectionRenderer::new()? })
    }

    pub fn with_builtin_templates() -> Result<Self> {
        Self::new(TemplateRegistry::builtin()?)
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn render(&self, request: &RenderRequest) -> Result<RenderedInvoice> {
        let resolved = self.registry.resolve(request.template_id.as_deref());
        let template = resolved.descriptor;
        if resolved.fell_back {
            log::warn!(
                "Unknown template '{}', rendering with '{}'",
                request.template_id.as_deref().unwrap_or_default(),
                template.id
            );
        }
        let unrecognized = template.layout.unrecognized();
        if !unrecognized.is_empty() {
            log::debug!("Template '{}' has unrecognized {:?}, using defaults", template.id, unrecognized);
        }

        let ctx = InvoiceRenderContext::from(request);
        let sections = self.sections.render(&ctx, template)?;
        let css = compose_css(template);

        Ok(RenderedInvoice {
            html: assemble(&css, &sections.header, &sections.items, &sections.footer),
            template_id: template.id.clone(),
            used_fallback: resolved.fell_back,
        })
    }

    /// Parse the JSON input contract and render it.
    pub fn render_json(&self, json: &str) -> Result<RenderedInvoice> {
        let request: RenderRequest = serde_json::from_str(json)?;
        self.render(&request)
    }
}
