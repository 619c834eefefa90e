//! Invoice rendering: template descriptors in, self-contained HTML out.
//!
//! A [`TemplateRegistry`] holds the declarative invoice styles. For each
//! request an [`InvoiceRenderer`] resolves the descriptor, composes its CSS,
//! renders the header, line-item and footer fragments, and assembles them
//! into one HTML document sized for an A4 viewport. Turning that document
//! into PDF or PNG is left to a [`Rasterizer`].
//!
//! Recurring invoices are supported through [`substitute`] (date tokens such
//! as `{{MONTH_NAME}}`) and [`RecurringSchedule`]; an [`InvoiceArchive`] numbers
//! and files each issued invoice.

pub mod archive;
pub mod css;
pub mod document;
pub mod error;
pub mod format;
pub mod html;
pub mod model;
pub mod placeholder;
pub mod rasterize;
pub mod recurring;
pub mod render;
pub mod template;

pub use archive::{normalize_prefix, InvoiceArchive, Issued};
pub use css::compose_css;
pub use document::{assemble, Viewport, A4_VIEWPORT};
pub use error::{RenderError, Result};
pub use html::{SectionRenderer, Sections};
pub use model::{Address, DateValue, Invoice, InvoiceRenderContext, LineItem, Party, RenderRequest};
pub use placeholder::{substitute, substitute_invoice, Period};
pub use rasterize::{HeadlessBrowser, OutputFormat, Rasterizer};
pub use recurring::{
    materialize, next_invoice_number, Frequency, RecurringInvoice, RecurringSchedule, UpcomingRun,
};
pub use render::{InvoiceRenderer, RenderedInvoice};
pub use template::{TemplateDescriptor, TemplateRegistry};
