use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use mdprep::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use tracing::warn;

struct BatchBar {
    pb: ProgressBar,
    current_job: String,
}

/// Renders batch progress as one bar tick per job and prints the
/// operator-facing status line for every job as it starts and finishes.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<BatchBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::bar_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            state: Arc::new(Mutex::new(BatchBar {
                pb,
                current_job: String::new(),
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = self.state.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut guard) = state.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };
            let bar = &mut *guard;

            match progress {
                Progress::BatchStart { total_jobs } => {
                    bar.pb.reset();
                    bar.pb.set_length(total_jobs);
                    bar.pb.set_position(0);
                    bar.pb.set_style(Self::bar_style());
                    bar.pb.set_message("Preparing jobs");
                    bar.pb
                        .suspend(|| println!("\nProcessing {} jobs\n", total_jobs));
                }
                Progress::JobStart { job_id } => {
                    bar.pb.set_message(job_id.clone());
                    bar.pb
                        .suspend(|| println!("[+] {}: pipeline started", job_id));
                    bar.current_job = job_id;
                }
                Progress::StageStart { stage } => {
                    bar.pb.set_message(format!("{}: {}", bar.current_job, stage));
                }
                Progress::JobFinish { job_id, failure } => {
                    bar.pb.inc(1);
                    bar.pb.suspend(|| match &failure {
                        None => println!("    ✓ {} ready", job_id),
                        Some(reason) => println!("    ✗ ERROR in {}: {}", job_id, reason),
                    });
                }
                Progress::BatchFinish => {
                    bar.pb.finish_with_message("✓ Done");
                }
                Progress::Message(msg) => {
                    bar.pb.suspend(|| println!("  {}", msg));
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<32} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")
            .expect("Failed to create bar style template")
            .with_key(
                "elapsed",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.0}s", state.elapsed().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdprep::engine::state::JobStage;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::new();
        let bar = handler.state.lock().unwrap();
        assert_eq!(bar.pb.length(), Some(0));
        assert!(bar.pb.is_finished());
    }

    #[test]
    fn callback_tracks_jobs_and_stages() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::BatchStart { total_jobs: 2 });
        {
            let bar = handler.state.lock().unwrap();
            assert_eq!(bar.pb.length(), Some(2));
            assert_eq!(bar.pb.position(), 0);
            assert!(!bar.pb.is_finished());
        }

        callback(Progress::JobStart {
            job_id: "job1".to_string(),
        });
        callback(Progress::StageStart {
            stage: JobStage::Protonation,
        });
        {
            let bar = handler.state.lock().unwrap();
            assert_eq!(bar.pb.message(), "job1: protonation");
        }

        callback(Progress::JobFinish {
            job_id: "job1".to_string(),
            failure: Some("protonation failed: pdb2pqr exited".to_string()),
        });
        {
            let bar = handler.state.lock().unwrap();
            assert_eq!(bar.pb.position(), 1);
        }

        callback(Progress::JobStart {
            job_id: "job2".to_string(),
        });
        callback(Progress::JobFinish {
            job_id: "job2".to_string(),
            failure: None,
        });
        callback(Progress::BatchFinish);
        {
            let bar = handler.state.lock().unwrap();
            assert_eq!(bar.pb.position(), 2);
            assert!(bar.pb.is_finished());
            assert_eq!(bar.pb.message(), "✓ Done");
        }
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::BatchStart { total_jobs: 1 });
            callback(Progress::Message("Batch cancelled".to_string()));
            callback(Progress::BatchFinish);
        })
        .join()
        .unwrap();

        let bar = handler.state.lock().unwrap();
        assert!(bar.pb.is_finished());
        assert_eq!(bar.pb.message(), "✓ Done");
    }
}
