//! Issued invoices on disk, filed as `<root>/<year>/<slugified number>.<ext>`.
//!
//! Invoice numbers are recovered from file names, so every number this module
//! hands out is built from characters that survive `slugify` unchanged (apart
//! from case).

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use slug::slugify;

use crate::error::{RenderError, Result};
use crate::model::RenderRequest;
use crate::rasterize::{OutputFormat, Rasterizer};
use crate::recurring::{materialize, next_invoice_number, RecurringInvoice};
use crate::render::InvoiceRenderer;

/// `INV_` → `INV`, `acme.co` → `ACME-CO`.
pub fn normalize_prefix(prefix: &str) -> String {
    slugify(prefix).to_uppercase()
}

/// What one [`InvoiceArchive::issue`] call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issued {
    pub number: String,
    pub path: PathBuf,
    pub template_id: String,
    pub used_fallback: bool,
    /// The schedule's next generation date, `None` once it has finished.
    pub next_run: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct InvoiceArchive {
    root: PathBuf,
}

impl InvoiceArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn year_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.year().to_string())
    }

    pub fn path_for(&self, number: &str, date: NaiveDate, extension: &str) -> PathBuf {
        let stem = slugify(number.trim());
        let stem = if stem.is_empty() { "invoice".to_string() } else { stem };
        self.year_dir(date).join(format!("{}.{}", stem, extension))
    }

    /// Numbers already filed in the year of `date`, read back from file stems.
    pub fn existing_numbers(&self, date: NaiveDate) -> Vec<String> {
        let mut numbers = Vec::new();
        let mut stack = vec![self.year_dir(date)];
        while let Some(dir) = stack.pop() {
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_dir() {
                        stack.push(path);
                    } else if let Some(stem) = path.file_stem() {
                        numbers.push(stem.to_string_lossy().to_uppercase());
                    }
                }
            }
        }
        numbers
    }

    /// One past the highest `{PREFIX}{YYYYMMDD}-NN` already filed.
    pub fn next_number(&self, prefix: &str, date: NaiveDate) -> String {
        let existing = self.existing_numbers(date);
        next_invoice_number(&normalize_prefix(prefix), date, existing.iter().map(String::as_str))
    }

    /// Create `path` with `contents`; an existing file is never replaced.
    pub fn write_new(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(RenderError::OutputExists(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(contents)?;
        Ok(())
    }

    /// Issue the invoice for `run_date` and advance the schedule.
    ///
    /// Written as PDF through `rasterizer` when one is given, HTML otherwise.
    /// The schedule is only advanced once the file is on disk.
    pub fn issue(
        &self,
        renderer: &InvoiceRenderer,
        recurring: &mut RecurringInvoice,
        prefix: &str,
        run_date: NaiveDate,
        rasterizer: Option<&dyn Rasterizer>,
    ) -> Result<Issued> {
        let number = self.next_number(prefix, run_date);
        let extension = if rasterizer.is_some() { OutputFormat::Pdf.extension() } else { "html" };
        let path = self.path_for(&number, run_date, extension);

        let request = RenderRequest {
            invoice: materialize(&recurring.request.invoice, run_date, number.clone()),
            ..recurring.request.clone()
        };
        let rendered = renderer.render(&request)?;
        let bytes = match rasterizer {
            Some(rasterizer) => rasterizer.rasterize(&rendered.html, OutputFormat::Pdf)?,
            None => rendered.html.into_bytes(),
        };
        self.write_new(&path, &bytes)?;
        log::info!("Issued {} to {}", number, path.display());

        Ok(Issued {
            number,
            path,
            template_id: rendered.template_id,
            used_fallback: rendered.used_fallback,
            next_run: recurring.schedule.advance(),
        })
    }
}
