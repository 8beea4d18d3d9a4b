use super::error::JobError;
use crate::core::models::bounding_box::BoundingBox;
use std::fmt;
use std::path::PathBuf;

/// Progress of a job through the preparation pipeline.
///
/// States are ordered; a job only ever moves to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobState {
    Discovered,
    StructureLocated,
    Converted,
    Protonated,
    SystemBuilt,
    ConfigWritten,
}

impl JobState {
    /// The stage that moves a job out of this state, or `None` if terminal.
    pub fn next_stage(self) -> Option<JobStage> {
        match self {
            JobState::Discovered => Some(JobStage::Discovery),
            JobState::StructureLocated => Some(JobStage::Conversion),
            JobState::Converted => Some(JobStage::Protonation),
            JobState::Protonated => Some(JobStage::SystemBuild),
            JobState::SystemBuilt => Some(JobStage::ConfigGeneration),
            JobState::ConfigWritten => None,
        }
    }
}

/// A unit of work a job can fail in.
///
/// `Setup` covers preparing the job's destination directory before the
/// pipeline starts; it has no [`JobState`] of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Setup,
    Discovery,
    Conversion,
    Protonation,
    SystemBuild,
    ConfigGeneration,
}

impl JobStage {
    pub fn name(self) -> &'static str {
        match self {
            JobStage::Setup => "output setup",
            JobStage::Discovery => "discovery",
            JobStage::Conversion => "conversion",
            JobStage::Protonation => "protonation",
            JobStage::SystemBuild => "system build",
            JobStage::ConfigGeneration => "config generation",
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Files produced for a job, filled in as stages complete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobArtifacts {
    pub structure: Option<PathBuf>,
    pub converted: Option<PathBuf>,
    pub protonated: Option<PathBuf>,
    pub staged: Option<PathBuf>,
    pub final_pdb: Option<PathBuf>,
    pub final_psf: Option<PathBuf>,
    pub cell: Option<BoundingBox>,
    pub config: Option<PathBuf>,
}

#[derive(Debug)]
pub struct JobFailure {
    pub stage: JobStage,
    pub error: JobError,
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

/// Result of running one job through the pipeline.
#[derive(Debug)]
pub struct JobReport {
    pub job_id: String,
    pub state: JobState,
    pub artifacts: JobArtifacts,
    pub failure: Option<JobFailure>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.state == JobState::ConfigWritten
    }

    pub(crate) fn failed(job_id: &str, stage: JobStage, error: JobError) -> Self {
        Self {
            job_id: job_id.to_string(),
            state: JobState::Discovered,
            artifacts: JobArtifacts::default(),
            failure: Some(JobFailure { stage, error }),
        }
    }
}
