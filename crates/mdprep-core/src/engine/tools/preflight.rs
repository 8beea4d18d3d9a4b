use super::runner;
use crate::engine::config::PipelineConfig;
use crate::engine::error::EngineError;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Resolves `program` the way a shell would: paths with a separator are used
/// as given, bare names are searched on `PATH`.
pub fn find_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }
    let search_path = env::var_os("PATH")?;
    env::split_paths(&search_path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

fn missing(dependency: impl Into<String>, reason: impl Into<String>) -> EngineError {
    EngineError::DependencyMissing {
        dependency: dependency.into(),
        reason: reason.into(),
    }
}

fn require_file(name: &str, path: &Path) -> Result<(), EngineError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(missing(name, format!("file not found: {}", path.display())))
    }
}

/// Verifies that every data file and external tool the pipeline needs is
/// present before any job starts. The data files are checked first.
pub fn check_dependencies(config: &PipelineConfig) -> Result<(), EngineError> {
    info!("Checking external dependencies...");

    require_file("topology", &config.system_builder.topology_path)?;
    require_file("template", &config.template_path)?;

    let vmd = find_executable(&config.tools.vmd).ok_or_else(|| {
        missing(
            "vmd",
            format!("'{}' is not an executable on PATH", config.tools.vmd.display()),
        )
    })?;
    debug!("Found VMD at {:?}", vmd);

    let python = find_executable(&config.tools.python).ok_or_else(|| {
        missing(
            "python",
            format!("'{}' is not an executable on PATH", config.tools.python.display()),
        )
    })?;
    debug!("Found Python at {:?}", python);

    let mut import_check = Command::new(&python);
    import_check.arg("-c").arg("import pdb2pqr, propka");
    let output = runner::run(&mut import_check, config.tools.timeout)
        .map_err(|e| missing("pdb2pqr", e.to_string()))?;
    if !output.success() {
        return Err(missing(
            "pdb2pqr",
            format!(
                "'{}' cannot import pdb2pqr/propka; install them into that interpreter ({})",
                python.display(),
                output.diagnostic()
            ),
        ));
    }

    info!("All dependencies available.");
    Ok(())
}
