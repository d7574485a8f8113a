use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use askama::Template;

use super::templates::HeaderTemplateData;
use crate::error::GenerateError;
use crate::rollback::CreationLog;

/// Formats a generated file in place.
pub trait SourceFormatter: Send + Sync {
    fn format(&self, path: &Path) -> Result<(), GenerateError>;
}

/// Runs `rustfmt` on each generated file.
///
/// The binary can be overridden with `BOOTGEN_RUSTFMT_BIN`.
#[derive(Debug, Clone)]
pub struct Rustfmt {
    bin: String,
}

impl Rustfmt {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("BOOTGEN_RUSTFMT_BIN").unwrap_or_else(|_| "rustfmt".to_string()))
    }
}

impl Default for Rustfmt {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SourceFormatter for Rustfmt {
    fn format(&self, path: &Path) -> Result<(), GenerateError> {
        let output = Command::new(&self.bin)
            .args(["--edition", "2021"])
            .arg(path)
            .output()
            .map_err(|e| GenerateError::Format {
                path: path.to_path_buf(),
                message: format!("cannot run {}: {e}", self.bin),
            })?;
        if !output.status.success() {
            return Err(GenerateError::Format {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Leaves generated files as rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFormat;

impl SourceFormatter for NoFormat {
    fn format(&self, _path: &Path) -> Result<(), GenerateError> {
        Ok(())
    }
}

/// A generated file being written.
///
/// The file is created through the creation log, so a rollback triggered at
/// any point afterwards removes it.
pub struct SourceFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl SourceFile {
    pub fn create(path: &Path, log: &CreationLog) -> Result<Self, GenerateError> {
        let file = log.create(path).map_err(|e| GenerateError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn write_str(&mut self, text: &str) -> Result<(), GenerateError> {
        self.writer
            .write_all(text.as_bytes())
            .map_err(|e| GenerateError::io(&self.path, e))
    }

    /// Marker comment naming the design the file was bootstrapped from.
    pub fn write_directive(&mut self, design_pkg: &str) -> Result<(), GenerateError> {
        self.write_str(&format!("// bootgen:generate bootstrap -d {design_pkg}\n\n"))
    }

    pub fn write_header(&mut self, imports: &[String]) -> Result<(), GenerateError> {
        let header = HeaderTemplateData {
            imports: imports.to_vec(),
        };
        self.render("header", &header)
    }

    pub fn render<T: Template>(
        &mut self,
        name: &'static str,
        template: &T,
    ) -> Result<(), GenerateError> {
        let rendered = template.render().map_err(|source| GenerateError::Render {
            template: name,
            source,
        })?;
        self.write_str(&rendered)
    }

    /// Flush, close and format the file.
    pub fn finish(self, formatter: &dyn SourceFormatter) -> Result<PathBuf, GenerateError> {
        let Self { path, writer } = self;
        writer
            .into_inner()
            .map_err(|e| GenerateError::io(&path, e.into_error()))?
            .sync_all()
            .map_err(|e| GenerateError::io(&path, e))?;
        formatter.format(&path)?;
        Ok(path)
    }
}
