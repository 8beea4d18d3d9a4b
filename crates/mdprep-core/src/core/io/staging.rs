use std::io;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Creates a hidden temporary file in `dir` for a write that is later
/// persisted over its final path.
///
/// On unix the file is created with mode 0666 filtered by the process umask,
/// the same as a plain `fs::write`, so persisted outputs stay readable by
/// the other accounts that share the job directories.
pub(crate) fn staged_file_in(dir: &Path, suffix: &str) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".mdprep-").suffix(suffix);
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
