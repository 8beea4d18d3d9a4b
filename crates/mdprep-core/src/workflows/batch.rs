use crate::core::models::job::Job;
use crate::core::utils::ordering::sort_naturally;
use crate::engine::config::PipelineConfig;
use crate::engine::error::{EngineError, JobError};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{JobReport, JobStage};
use crate::engine::tools::Collaborators;
use crate::workflows::prepare::JobPipeline;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument, warn};

/// Outcome of a batch: one report per job that ran, plus the jobs never
/// started because the batch was cancelled.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<JobReport>,
    pub skipped: Vec<String>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }

    pub fn total(&self) -> usize {
        self.reports.len() + self.skipped.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0 && self.skipped.is_empty()
    }
}

/// Lists the immediate subdirectories of `input_root` in natural order.
pub fn discover_job_ids(input_root: &Path) -> Result<Vec<String>, EngineError> {
    let root_err = |source| EngineError::InputRoot {
        path: input_root.to_path_buf(),
        source,
    };

    let mut ids = Vec::new();
    for entry in fs::read_dir(input_root).map_err(root_err)? {
        let entry = entry.map_err(root_err)?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => ids.push(name),
            Err(name) => warn!("Skipping job directory with non-UTF-8 name {:?}", name),
        }
    }
    sort_naturally(&mut ids);
    Ok(ids)
}

/// Runs the preparation pipeline over every job under an input root, one
/// job at a time.
pub struct BatchDriver<'a> {
    config: &'a PipelineConfig,
    tools: &'a Collaborators,
    reporter: &'a ProgressReporter<'a>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> BatchDriver<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        tools: &'a Collaborators,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            config,
            tools,
            reporter,
            cancel: None,
        }
    }

    /// Stops the batch before the next job once `flag` is set.
    pub fn with_cancellation(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    #[instrument(skip_all, name = "batch", fields(root = %input_root.display()))]
    pub fn run(&self, input_root: &Path) -> Result<BatchSummary, EngineError> {
        let job_ids = discover_job_ids(input_root)?;
        info!("Discovered {} job(s) under {:?}", job_ids.len(), input_root);

        let destination = &self.config.destination_root;
        fs::create_dir_all(destination).map_err(|source| EngineError::Io {
            path: destination.clone(),
            source,
        })?;

        self.reporter.report(Progress::BatchStart {
            total_jobs: job_ids.len() as u64,
        });

        let pipeline = JobPipeline::new(self.config, self.tools, self.reporter);
        let mut summary = BatchSummary::default();

        for (index, job_id) in job_ids.iter().enumerate() {
            if self.cancelled() {
                let message = format!("Batch cancelled; {} job(s) not started.", job_ids.len() - index);
                warn!("{}", message);
                self.reporter.report(Progress::Message(message));
                summary.skipped.extend(job_ids[index..].iter().cloned());
                break;
            }

            let job = Job::new(job_id.as_str(), input_root, destination);
            self.reporter.report(Progress::JobStart {
                job_id: job.id.clone(),
            });

            let report = self.run_job(&pipeline, &job);
            self.reporter.report(Progress::JobFinish {
                job_id: job.id.clone(),
                failure: report.failure.as_ref().map(ToString::to_string),
            });
            summary.reports.push(report);
        }

        self.reporter.report(Progress::BatchFinish);
        info!(
            "Batch finished: {} succeeded, {} failed, {} skipped.",
            summary.succeeded(),
            summary.failed(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    fn run_job(&self, pipeline: &JobPipeline, job: &Job) -> JobReport {
        let output_dir = job.simulation_output_dir();
        if let Err(e) = fs::create_dir_all(&output_dir) {
            return JobReport::failed(&job.id, JobStage::Setup, JobError::io(output_dir, e));
        }

        pipeline.run(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::JobState;
    use crate::engine::tools::{Protonator, ToolError};
    use crate::workflows::prepare::tests::{add_job, fake_tools, test_config};
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[test]
    fn discovers_only_directories_in_natural_order() {
        let temp = tempfile::tempdir().unwrap();
        for id in ["job10", "job2", "Job1"] {
            fs::create_dir_all(temp.path().join(id)).unwrap();
        }
        fs::write(temp.path().join("job3"), "not a directory").unwrap();

        let ids = discover_job_ids(temp.path()).unwrap();

        assert_eq!(ids, vec!["Job1", "job2", "job10"]);
    }

    #[test]
    fn unreadable_input_root_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = discover_job_ids(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, EngineError::InputRoot { .. }));
    }

    #[test]
    fn one_failing_job_does_not_stop_its_neighbours() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let input_root = temp.path().join("in");
        for id in ["jobA", "jobB", "jobC"] {
            add_job(&input_root, id, true);
        }
        let tools = fake_tools(&["jobB"]);
        let reporter = ProgressReporter::new();

        let summary = BatchDriver::new(&config, &tools, &reporter)
            .run(&input_root)
            .unwrap();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);

        let states: Vec<_> = summary
            .reports
            .iter()
            .map(|r| (r.job_id.as_str(), r.state))
            .collect();
        assert_eq!(
            states,
            vec![
                ("jobA", JobState::ConfigWritten),
                ("jobB", JobState::Converted),
                ("jobC", JobState::ConfigWritten),
            ]
        );
        let failure = summary.reports[1].failure.as_ref().unwrap();
        assert_eq!(failure.stage, JobStage::Protonation);
        assert!(config.destination_root.join("jobA/jobA_min.conf").is_file());
        assert!(config.destination_root.join("jobC/jobC_min.conf").is_file());
        assert!(!config.destination_root.join("jobB/jobB_min.conf").exists());
    }

    #[test]
    fn unwritable_destination_is_an_output_setup_failure() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let input_root = temp.path().join("in");
        add_job(&input_root, "blocked", true);
        add_job(&input_root, "open", true);
        fs::create_dir_all(&config.destination_root).unwrap();
        fs::write(config.destination_root.join("blocked"), "not a directory").unwrap();
        let tools = fake_tools(&[]);
        let reporter = ProgressReporter::new();

        let summary = BatchDriver::new(&config, &tools, &reporter)
            .run(&input_root)
            .unwrap();

        assert_eq!(summary.succeeded(), 1);
        let failure = summary.reports[0].failure.as_ref().unwrap();
        assert_eq!(failure.stage, JobStage::Setup);
        assert!(failure.to_string().starts_with("output setup failed: "));
        assert!(config.destination_root.join("open/open_min.conf").is_file());
    }

    #[test]
    fn job_without_structure_is_reported_and_batch_completes() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let input_root = temp.path().join("in");
        add_job(&input_root, "with_model", true);
        add_job(&input_root, "without_model", false);
        let tools = fake_tools(&[]);
        let reporter = ProgressReporter::new();

        let summary = BatchDriver::new(&config, &tools, &reporter)
            .run(&input_root)
            .unwrap();

        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        let missing = summary
            .reports
            .iter()
            .find(|r| r.job_id == "without_model")
            .unwrap();
        assert!(matches!(
            missing.failure.as_ref().unwrap().error,
            JobError::Discovery { .. }
        ));

        let dest = &config.destination_root;
        assert!(dest.join("with_model/with_model_min.conf").is_file());
        assert!(dest.join("without_model/output").is_dir());
        assert!(!dest.join("without_model/without_model_min.conf").exists());
    }

    struct PanickingProtonator;

    impl Protonator for PanickingProtonator {
        fn protonate(&self, _input: &Path) -> Result<PathBuf, ToolError> {
            panic!("unexpected residue table state");
        }
    }

    #[test]
    fn panicking_job_is_reported_as_internal_failure() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let input_root = temp.path().join("in");
        add_job(&input_root, "job1", true);
        add_job(&input_root, "job2", true);
        let mut tools = fake_tools(&[]);
        tools.protonator = Box::new(PanickingProtonator);
        let reporter = ProgressReporter::new();

        let summary = BatchDriver::new(&config, &tools, &reporter)
            .run(&input_root)
            .unwrap();

        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.failed(), 2);
        let failure = summary.reports[0].failure.as_ref().unwrap();
        assert_eq!(failure.stage, JobStage::Protonation);
        match &failure.error {
            JobError::Internal(message) => assert!(message.contains("residue table")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cancellation_skips_remaining_jobs() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let input_root = temp.path().join("in");
        add_job(&input_root, "job1", true);
        add_job(&input_root, "job2", true);
        let tools = fake_tools(&[]);
        let cancel = AtomicBool::new(true);
        let reporter = ProgressReporter::new();

        let summary = BatchDriver::new(&config, &tools, &reporter)
            .with_cancellation(&cancel)
            .run(&input_root)
            .unwrap();

        assert!(summary.reports.is_empty());
        assert_eq!(summary.skipped, vec!["job1", "job2"]);
        assert!(!summary.all_succeeded());
    }

    #[test]
    fn progress_events_follow_job_order() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let input_root = temp.path().join("in");
        add_job(&input_root, "job10", true);
        add_job(&input_root, "job9", false);
        let tools = fake_tools(&[]);
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            let label = match event {
                Progress::BatchStart { total_jobs } => format!("start {}", total_jobs),
                Progress::JobStart { job_id } => format!("begin {}", job_id),
                Progress::JobFinish { job_id, failure } => {
                    format!("end {} {}", job_id, failure.is_none())
                }
                Progress::BatchFinish => "finish".to_string(),
                Progress::StageStart { .. } | Progress::Message(_) => return,
            };
            events.lock().unwrap().push(label);
        }));

        BatchDriver::new(&config, &tools, &reporter)
            .run(&input_root)
            .unwrap();
        drop(reporter);

        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                "start 2",
                "begin job9",
                "end job9 false",
                "begin job10",
                "end job10 true",
                "finish",
            ]
        );
    }

    #[test]
    fn empty_input_root_yields_empty_summary() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let input_root = temp.path().join("in");
        fs::create_dir_all(&input_root).unwrap();
        let tools = fake_tools(&[]);
        let reporter = ProgressReporter::new();

        let summary = BatchDriver::new(&config, &tools, &reporter)
            .run(&input_root)
            .unwrap();

        assert_eq!(summary.total(), 0);
        assert!(summary.all_succeeded());
        assert!(config.destination_root.is_dir());
    }
}
