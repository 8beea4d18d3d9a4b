use crate::core::io::conf::{ConfParams, ConfTemplate};
use crate::core::io::pdb::{self, PdbError};
use crate::core::models::job::Job;
use crate::engine::config::PipelineConfig;
use crate::engine::error::JobError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{JobArtifacts, JobFailure, JobReport, JobState};
use crate::engine::tools::{BuildRequest, Collaborators};
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Runs one job from discovery to its simulation configuration.
///
/// The pipeline holds only shared, read-only inputs, so one instance can
/// serve every job of a batch.
pub struct JobPipeline<'a> {
    config: &'a PipelineConfig,
    tools: &'a Collaborators,
    reporter: &'a ProgressReporter<'a>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

fn artifact<'p>(path: &'p Option<PathBuf>, name: &str) -> Result<&'p Path, JobError> {
    path.as_deref()
        .ok_or_else(|| JobError::Internal(format!("{} missing from a previous stage", name)))
}

impl<'a> JobPipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        tools: &'a Collaborators,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            config,
            tools,
            reporter,
        }
    }

    /// Drives `job` through every stage. Failures, including panics inside a
    /// stage, are captured in the returned report.
    #[instrument(skip_all, name = "job", fields(id = %job.id))]
    pub fn run(&self, job: &Job) -> JobReport {
        let mut state = JobState::Discovered;
        let mut artifacts = JobArtifacts::default();

        while let Some(stage) = state.next_stage() {
            self.reporter.report(Progress::StageStart { stage });
            let step = panic::catch_unwind(AssertUnwindSafe(|| {
                self.advance(job, state, &mut artifacts)
            }));
            let step = step.unwrap_or_else(|payload| {
                Err(JobError::Internal(panic_message(payload.as_ref())))
            });
            match step {
                Ok(next) => state = next,
                Err(error) => {
                    warn!("Job '{}' failed during {}: {}", job.id, stage, error);
                    return JobReport {
                        job_id: job.id.clone(),
                        state,
                        artifacts,
                        failure: Some(JobFailure { stage, error }),
                    };
                }
            }
        }

        info!("Job '{}' ready for simulation.", job.id);
        JobReport {
            job_id: job.id.clone(),
            state,
            artifacts,
            failure: None,
        }
    }

    fn advance(
        &self,
        job: &Job,
        state: JobState,
        artifacts: &mut JobArtifacts,
    ) -> Result<JobState, JobError> {
        match state {
            JobState::Discovered => {
                let extension = &self.config.structure_extension;
                let structure = job
                    .locate_structure(extension)
                    .map_err(|e| JobError::Internal(e.to_string()))?
                    .ok_or_else(|| JobError::Discovery {
                        dir: job.input_dir.clone(),
                        extension: extension.clone(),
                    })?;
                info!("Found structure {:?}", structure);
                artifacts.structure = Some(structure);
                Ok(JobState::StructureLocated)
            }
            JobState::StructureLocated => {
                let structure = artifact(&artifacts.structure, "structure")?;
                let converted = self.tools.converter.convert(structure)?;
                artifacts.converted = Some(converted);
                Ok(JobState::Converted)
            }
            JobState::Converted => {
                let converted = artifact(&artifacts.converted, "converted structure")?;
                let protonated = self.tools.protonator.protonate(converted)?;
                artifacts.protonated = Some(protonated);
                Ok(JobState::Protonated)
            }
            JobState::Protonated => {
                let protonated = artifact(&artifacts.protonated, "protonated structure")?;
                let file_name = protonated.file_name().ok_or_else(|| {
                    JobError::Internal(format!("{:?} has no file name", protonated))
                })?;
                let staged = job.output_dir.join(file_name);
                fs::copy(protonated, &staged).map_err(|e| JobError::io(&staged, e))?;
                artifacts.staged = Some(staged.clone());

                let built = self.tools.system_builder.build(&BuildRequest {
                    job_id: &job.id,
                    job_dir: &job.output_dir,
                    structure: &staged,
                })?;
                artifacts.final_pdb = Some(built.pdb);
                artifacts.final_psf = Some(built.psf);
                Ok(JobState::SystemBuilt)
            }
            JobState::SystemBuilt => {
                let pdb_path = artifact(&artifacts.final_pdb, "final PDB")?;
                let psf_path = artifact(&artifacts.final_psf, "final PSF")?;

                let cell = pdb::bounding_box_from_path(pdb_path).map_err(|e| match e {
                    PdbError::Io(source) => JobError::io(pdb_path, source),
                    PdbError::Parse { line, kind } => JobError::Parse {
                        path: pdb_path.to_path_buf(),
                        line,
                        kind,
                    },
                })?;
                info!(
                    "Periodic cell {:.3} x {:.3} x {:.3} centered at ({:.3}, {:.3}, {:.3})",
                    cell.dimensions.x,
                    cell.dimensions.y,
                    cell.dimensions.z,
                    cell.center.x,
                    cell.center.y,
                    cell.center.z
                );

                let template = ConfTemplate::load(&self.config.template_path)?;
                let config_path = job.config_path();
                template.write_to_path(
                    &ConfParams {
                        job_id: &job.id,
                        output_dir: &job.output_dir,
                        pdb_path,
                        psf_path,
                        cell,
                    },
                    &config_path,
                )?;

                artifacts.cell = Some(cell);
                artifacts.config = Some(config_path);
                Ok(JobState::ConfigWritten)
            }
            JobState::ConfigWritten => Ok(JobState::ConfigWritten),
        }
    }
}
