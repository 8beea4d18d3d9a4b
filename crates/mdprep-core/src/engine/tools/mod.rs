//! # External Collaborators
//!
//! The pipeline delegates the chemistry to three external programs and
//! libraries. Each is reached through a trait so that the per-job pipeline
//! only sequences calls and handles their results:
//!
//! - [`StructureConverter`] turns the predicted mmCIF model into PDB
//!   ([`convert::PdbtbxConverter`]).
//! - [`Protonator`] assigns titration states at a fixed pH
//!   ([`protonate::Pdb2PqrProtonator`]).
//! - [`SystemBuilder`] builds the topology, solvates and ionizes the system
//!   ([`vmd::VmdSystemBuilder`]).
//!
//! Every subprocess goes through [`runner`], which blocks until the tool
//! exits and captures its output.

pub mod convert;
pub mod preflight;
pub mod protonate;
pub mod runner;
pub mod vmd;

use super::config::PipelineConfig;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}: {diagnostic}")]
    Failed {
        program: String,
        status: ExitStatus,
        diagnostic: String,
    },

    #[error("'{program}' did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Structure conversion of '{path}' failed: {message}", path = path.display())]
    Conversion { path: PathBuf, message: String },

    #[error("{tool} did not produce expected file '{path}'", path = path.display())]
    MissingOutput { tool: &'static str, path: PathBuf },

    #[error("Failed to write '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub trait StructureConverter: Send + Sync {
    /// Converts `input` to PDB and returns the path of the PDB file.
    fn convert(&self, input: &Path) -> Result<PathBuf, ToolError>;
}

pub trait Protonator: Send + Sync {
    /// Protonates the PDB at `input` and returns the path of the result.
    fn protonate(&self, input: &Path) -> Result<PathBuf, ToolError>;
}

/// Input of the system-building step for one job.
#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    pub job_id: &'a str,
    /// Working directory owned by the job; all outputs land here.
    pub job_dir: &'a Path,
    /// Protonated structure already copied into `job_dir`.
    pub structure: &'a Path,
}

/// Final solvated and ionized system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltSystem {
    pub pdb: PathBuf,
    pub psf: PathBuf,
}

impl BuiltSystem {
    /// Paths of the `<job_id>_final.{pdb,psf}` pair inside `job_dir`.
    pub fn expected(job_dir: &Path, job_id: &str) -> Self {
        Self {
            pdb: job_dir.join(format!("{}_final.pdb", job_id)),
            psf: job_dir.join(format!("{}_final.psf", job_id)),
        }
    }
}

pub trait SystemBuilder: Send + Sync {
    fn build(&self, request: &BuildRequest) -> Result<BuiltSystem, ToolError>;
}

/// The set of collaborators a pipeline runs with.
pub struct Collaborators {
    pub converter: Box<dyn StructureConverter>,
    pub protonator: Box<dyn Protonator>,
    pub system_builder: Box<dyn SystemBuilder>,
}

impl Collaborators {
    /// The production tool chain: pdbtbx, pdb2pqr and VMD.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            converter: Box::new(convert::PdbtbxConverter::new()),
            protonator: Box::new(protonate::Pdb2PqrProtonator::new(
                &config.tools,
                &config.protonation,
            )),
            system_builder: Box::new(vmd::VmdSystemBuilder::new(
                &config.tools,
                &config.system_builder,
            )),
        }
    }
}
