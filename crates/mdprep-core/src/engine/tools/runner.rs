use super::ToolError;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Exit status and captured streams of a finished tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// The text most likely to explain a failure: stderr, else stdout.
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

impl From<Output> for ToolOutput {
    fn from(output: Output) -> Self {
        Self {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}

fn drain(pipe: Option<impl Read + Send + 'static>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                warn!("Failed to read tool output: {}", e);
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Starts the tool in a process group of its own so a timeout can take
/// down everything it spawned.
#[cfg(unix)]
fn isolate(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate(_command: &mut Command) {}

/// Kills `child` and, on unix, every process left in its group.
fn kill_tree(child: &mut Child, program: &str) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let killed = Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match killed {
            Ok(status) if status.success() => return,
            Ok(status) => debug!("Killing process group of '{}' failed: {}", program, status),
            Err(e) => debug!("Could not run kill for '{}': {}", program, e),
        }
    }
    if let Err(e) = child.kill() {
        warn!("Failed to kill '{}': {}", program, e);
    }
}

/// Runs `command` to completion with stdin closed and both output streams
/// captured. With a `timeout`, the process and everything it started are
/// killed once it is exceeded.
pub fn run(command: &mut Command, timeout: Option<Duration>) -> Result<ToolOutput, ToolError> {
    let program = program_name(command);
    debug!("Running {:?}", command);

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let Some(limit) = timeout else {
        let output = command
            .output()
            .map_err(|source| ToolError::Spawn { program, source })?;
        return Ok(output.into());
    };

    isolate(command);
    let mut child = command.spawn().map_err(|source| ToolError::Spawn {
        program: program.clone(),
        source,
    })?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= limit => {
                warn!("'{}' exceeded {:?}, killing it.", program, limit);
                kill_tree(&mut child, &program);
                let _ = child.wait();
                return Err(ToolError::TimedOut {
                    program,
                    timeout: limit,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => return Err(ToolError::Io { program, source }),
        }
    };

    Ok(ToolOutput {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

/// Like [`run`], but a non-zero exit becomes [`ToolError::Failed`].
pub fn run_checked(
    command: &mut Command,
    timeout: Option<Duration>,
) -> Result<ToolOutput, ToolError> {
    let output = run(command, timeout)?;
    if output.success() {
        Ok(output)
    } else {
        Err(ToolError::Failed {
            program: program_name(command),
            status: output.status,
            diagnostic: output.diagnostic().to_string(),
        })
    }
}
