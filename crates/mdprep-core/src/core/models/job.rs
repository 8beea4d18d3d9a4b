use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A prediction job: one directory under the input root, prepared into a
/// directory of the same name under the destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Job {
    pub fn new(id: impl Into<String>, input_root: &Path, destination_root: &Path) -> Self {
        let id = id.into();
        Self {
            input_dir: input_root.join(&id),
            output_dir: destination_root.join(&id),
            id,
        }
    }

    /// Directory the simulation engine writes its own output into.
    pub fn simulation_output_dir(&self) -> PathBuf {
        self.output_dir.join("output")
    }

    pub fn config_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_min.conf", self.id))
    }

    /// Finds the first file with `extension` anywhere below the input
    /// directory, in sorted path order.
    pub fn locate_structure(&self, extension: &str) -> Result<Option<PathBuf>, glob::PatternError> {
        let pattern = format!(
            "{}/**/*.{}",
            Pattern::escape(&self.input_dir.to_string_lossy()),
            Pattern::escape(extension)
        );

        let found = glob::glob(&pattern)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Skipping unreadable path while searching '{}': {}", self.id, e);
                    None
                }
            })
            .find(|path| path.is_file());
        Ok(found)
    }
}
