//! Atomic file replacement

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{PblogError, Result};

/// Directory `path` lives in, `.` for a bare file name
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn write_failed(path: &Path, reason: impl ToString) -> PblogError {
    PblogError::FileWriteFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Temporary file next to `destination`, to be persisted over it.
///
/// The file takes the permissions of an existing `destination`; otherwise it
/// gets the mode a plain `File::create` would (0o666 less the umask) rather
/// than the private mode of a temporary file.
pub fn temp_file_for(destination: &Path) -> Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".pblog-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    let temp = builder
        .tempfile_in(parent_dir(destination))
        .map_err(|e| write_failed(destination, e))?;

    if let Ok(existing) = fs::metadata(destination) {
        temp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| write_failed(destination, e))?;
    }
    Ok(temp)
}

/// Move a finished temporary file over `destination`
pub fn persist(temp: NamedTempFile, destination: &Path) -> Result<()> {
    temp.persist(destination)
        .map_err(|e| write_failed(destination, e.error))?;
    Ok(())
}

/// Replace `destination` with `bytes` in one step
pub fn write_atomic(destination: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp = temp_file_for(destination)?;
    temp.write_all(bytes)
        .map_err(|e| write_failed(destination, e))?;
    persist(temp, destination)
}
