//! Line-preserving rewriter for NAMD-style simulation configuration templates.
//!
//! A template is an ordered list of lines. A fixed set of directives is
//! recognized and rewritten with job-specific paths and periodic cell
//! geometry; every other line, including comments, blank lines and line
//! terminators, is copied through untouched.

use super::staging;
use crate::core::models::bounding_box::BoundingBox;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read configuration template '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write configuration '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A template directive that receives a job-specific value.
///
/// Variants are listed in matching priority: a line is classified as the
/// first directive it satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Structure,
    Coordinates,
    OutputName,
    CellBasisVector1,
    CellBasisVector2,
    CellBasisVector3,
    CellOrigin,
}

impl Directive {
    const PRIORITY: [Directive; 7] = [
        Directive::Structure,
        Directive::Coordinates,
        Directive::OutputName,
        Directive::CellBasisVector1,
        Directive::CellBasisVector2,
        Directive::CellBasisVector3,
        Directive::CellOrigin,
    ];

    fn matches(self, line: &str) -> bool {
        match self {
            Directive::Structure => line.trim().starts_with("structure"),
            Directive::Coordinates => line.trim().starts_with("coordinates"),
            Directive::OutputName => line.contains("set outputname"),
            Directive::CellBasisVector1 => line.contains("cellBasisVector1"),
            Directive::CellBasisVector2 => line.contains("cellBasisVector2"),
            Directive::CellBasisVector3 => line.contains("cellBasisVector3"),
            Directive::CellOrigin => line.contains("cellOrigin"),
        }
    }

    /// Returns the directive a template line belongs to, if any.
    pub fn classify(line: &str) -> Option<Directive> {
        Self::PRIORITY.into_iter().find(|d| d.matches(line))
    }

    fn render(self, params: &ConfParams) -> String {
        let dim = &params.cell.dimensions;
        let cen = &params.cell.center;
        match self {
            Directive::Structure => {
                format!("structure          {}\n", params.psf_path.display())
            }
            Directive::Coordinates => {
                format!("coordinates        {}\n", params.pdb_path.display())
            }
            Directive::OutputName => {
                format!("set outputname     {}\n", params.output_name().display())
            }
            Directive::CellBasisVector1 => format!("cellBasisVector1 {:.3} 0 0\n", dim.x),
            Directive::CellBasisVector2 => format!("cellBasisVector2 0 {:.3} 0\n", dim.y),
            Directive::CellBasisVector3 => format!("cellBasisVector3 0 0 {:.3}\n", dim.z),
            Directive::CellOrigin => {
                format!("cellOrigin {:.3} {:.3} {:.3}\n", cen.x, cen.y, cen.z)
            }
        }
    }
}

/// Job-specific values substituted into a template.
#[derive(Debug, Clone)]
pub struct ConfParams<'a> {
    pub job_id: &'a str,
    pub output_dir: &'a Path,
    pub pdb_path: &'a Path,
    pub psf_path: &'a Path,
    pub cell: BoundingBox,
}

impl ConfParams<'_> {
    /// Basename the simulation engine uses for its own output files.
    pub fn output_name(&self) -> PathBuf {
        self.output_dir
            .join("output")
            .join(format!("{}_min", self.job_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfTemplate {
    lines: Vec<String>,
}

impl ConfTemplate {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// Splits template text into lines, each keeping its terminator.
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.split_inclusive('\n').map(str::to_owned).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Produces the configuration lines for one job, in template order.
    pub fn render(&self, params: &ConfParams) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| match Directive::classify(line) {
                Some(directive) => directive.render(params),
                None => line.clone(),
            })
            .collect()
    }

    pub fn write_to(&self, params: &ConfParams, writer: &mut impl Write) -> io::Result<()> {
        for line in self.render(params) {
            writer.write_all(line.as_bytes())?;
        }
        writer.flush()
    }

    /// Writes the rendered configuration to `path`.
    ///
    /// The file is staged in the destination directory and renamed into
    /// place, so `path` is either absent or complete.
    pub fn write_to_path<P: AsRef<Path>>(
        &self,
        params: &ConfParams,
        path: P,
    ) -> Result<(), TemplateError> {
        let path = path.as_ref();
        let write_err = |source: io::Error| TemplateError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut staged = staging::staged_file_in(dir, ".conf").map_err(write_err)?;
        self.write_to(params, &mut staged).map_err(write_err)?;
        staged.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}
