//! HTML → PDF/PNG through an external headless browser.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::document::{Viewport, A4_VIEWPORT};
use crate::error::{RenderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Png => "png",
        }
    }
}

/// Converts a finished HTML document into bytes. Failures are opaque: the
/// collaborator's message is passed through, nothing is retried.
pub trait Rasterizer {
    fn rasterize(&self, html: &str, format: OutputFormat) -> Result<Vec<u8>>;
}

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// Removes its files when dropped, whatever happened in between.
struct Scratch {
    html: PathBuf,
    output: PathBuf,
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.html);
        let _ = fs::remove_file(&self.output);
    }
}

/// Chromium (or Chrome/Edge) run in headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessBrowser {
    binary: PathBuf,
    viewport: Viewport,
    scratch_dir: PathBuf,
}

impl HeadlessBrowser {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            viewport: A4_VIEWPORT,
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn scratch(&self, format: OutputFormat) -> Scratch {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let stem = format!("invoice-render-{}-{}", std::process::id(), seq);
        Scratch {
            html: self.scratch_dir.join(format!("{stem}.html")),
            output: self.scratch_dir.join(format!("{stem}.{}", format.extension())),
        }
    }

    /// Command-line arguments for one conversion.
    pub fn args(&self, input: &Path, output: &Path, format: OutputFormat) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--headless".into(),
            "--disable-gpu".into(),
            "--hide-scrollbars".into(),
            format!("--window-size={},{}", self.viewport.width, self.viewport.height).into(),
            format!("--force-device-scale-factor={}", self.viewport.device_scale).into(),
        ];
        let mut target = OsString::from(match format {
            OutputFormat::Pdf => "--print-to-pdf=",
            OutputFormat::Png => "--screenshot=",
        });
        target.push(output);
        args.push(target);
        if format == OutputFormat::Pdf {
            args.push("--no-pdf-header-footer".into());
        }
        let mut url = OsString::from("file://");
        url.push(input);
        args.push(url);
        args
    }
}

impl Rasterizer for HeadlessBrowser {
    fn rasterize(&self, html: &str, format: OutputFormat) -> Result<Vec<u8>> {
        let scratch = self.scratch(format);
        fs::write(&scratch.html, html)?;

        log::info!("Rasterizing {} with {}", format.extension(), self.binary.display());
        let output = Command::new(&self.binary)
            .args(self.args(&scratch.html, &scratch.output, format))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| RenderError::Rasterize(format!("cannot launch {}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Rasterize(stderr.trim().to_string()));
        }

        let bytes = fs::read(&scratch.output)
            .map_err(|e| RenderError::Rasterize(format!("browser produced no {} output: {}", format.extension(), e)))?;
        log::info!("Rasterized {} bytes", bytes.len());
        Ok(bytes)
    }
}
