use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a render. Data-shape problems in the invoice
/// itself are defaulted around and never show up here.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render request: {0}")]
    Request(#[from] serde_json::Error),

    #[error("Template catalog error: {0}")]
    Catalog(#[from] toml::de::Error),

    #[error("Template catalog has no descriptor for default id '{0}'")]
    MissingDefault(String),

    #[error("Section template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Refusing to overwrite {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Rasterizer failed: {0}")]
    Rasterize(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
