pub mod descriptor;
pub mod registry;

pub use descriptor::{
    Colors, FontSizes, Fonts, FooterLayout, HeaderPosition, InvoiceNumberPosition, ItemsLayout,
    Layout, PageSpacing, Spacing, TemplateDescriptor, TemplateStyle,
};
pub use registry::{Resolved, TemplateRegistry, DEFAULT_TEMPLATE_ID};
