use super::state::JobStage;

#[derive(Debug, Clone)]
pub enum Progress {
    BatchStart { total_jobs: u64 },
    BatchFinish,

    JobStart { job_id: String },
    StageStart { stage: JobStage },
    /// `failure` carries the rendered reason when the job did not complete.
    JobFinish {
        job_id: String,
        failure: Option<String>,
    },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
