use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::descriptor::TemplateDescriptor;
use crate::error::{RenderError, Result};

// Embed the catalog at compile time so the built-in templates are always available
const BUILTIN_CATALOG: &str = include_str!("../../templates/catalog.toml");

pub const DEFAULT_TEMPLATE_ID: &str = "classic";

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    default: Option<String>,
    #[serde(default, rename = "template")]
    templates: Vec<TemplateDescriptor>,
}

/// Outcome of a lookup: the descriptor to render with, and whether the
/// requested id was unknown and the default stood in for it.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub descriptor: &'a TemplateDescriptor,
    pub fell_back: bool,
}

/// Named template descriptors plus the default used for unknown ids.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, TemplateDescriptor>,
    default: TemplateDescriptor,
}

impl TemplateRegistry {
    pub fn new(default: TemplateDescriptor) -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(default.id.clone(), default.clone());
        Self { templates, default }
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    /// Parse a catalog. Its `default` id (or `classic`) must name one of its templates.
    pub fn from_toml(source: &str) -> Result<Self> {
        let catalog: CatalogFile = toml::from_str(source)?;
        let default_id = catalog
            .default
            .unwrap_or_else(|| DEFAULT_TEMPLATE_ID.to_string());
        let default = catalog
            .templates
            .iter()
            .find(|t| t.id == default_id)
            .cloned()
            .ok_or(RenderError::MissingDefault(default_id))?;

        let mut registry = Self::new(default);
        for template in catalog.templates {
            registry.insert(template);
        }
        Ok(registry)
    }

    /// Overlay another catalog: same ids replace, new ids are added. A `default`
    /// in the overlay takes effect if it names a known template.
    /// Returns the number of descriptors read.
    pub fn merge_toml(&mut self, source: &str) -> Result<usize> {
        let catalog: CatalogFile = toml::from_str(source)?;
        // Validate before touching anything
        if let Some(default_id) = &catalog.default {
            let known = self.templates.contains_key(default_id)
                || catalog.templates.iter().any(|t| &t.id == default_id);
            if !known {
                return Err(RenderError::MissingDefault(default_id.clone()));
            }
        }

        let count = catalog.templates.len();
        for template in catalog.templates {
            self.insert(template);
        }
        if let Some(descriptor) = catalog.default.and_then(|id| self.templates.get(&id).cloned()) {
            self.default = descriptor;
        }
        Ok(count)
    }

    pub fn merge_file(&mut self, path: &Path) -> Result<usize> {
        let content = fs::read_to_string(path)?;
        self.merge_toml(&content)
    }

    /// Add or replace a descriptor, returning the one it replaced.
    pub fn insert(&mut self, descriptor: TemplateDescriptor) -> Option<TemplateDescriptor> {
        if descriptor.id == self.default.id {
            self.default = descriptor.clone();
        }
        self.templates.insert(descriptor.id.clone(), descriptor)
    }

    pub fn get(&self, id: &str) -> Option<&TemplateDescriptor> {
        self.templates.get(id)
    }

    /// Look up `id`, standing in the default for a missing or unknown id. Never fails.
    pub fn resolve(&self, id: Option<&str>) -> Resolved<'_> {
        match id.map(str::trim).filter(|id| !id.is_empty()) {
            None => Resolved { descriptor: &self.default, fell_back: false },
            Some(id) => match self.templates.get(id) {
                Some(descriptor) => Resolved { descriptor, fell_back: false },
                None => Resolved { descriptor: &self.default, fell_back: true },
            },
        }
    }

    pub fn default_descriptor(&self) -> &TemplateDescriptor {
        &self.default
    }

    /// Descriptors ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &TemplateDescriptor> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
