//! Locate the files a post references on the local disk

use std::path::{Path, PathBuf};

use crate::error::{PblogError, Result};

/// A referenced file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    /// Canonical absolute path of the file
    pub source: PathBuf,
    /// Reference as written in the post
    pub relative: PathBuf,
}

/// Resolve every reference against `base_dir`.
///
/// A reference that does not exist, is not a regular file or resolves outside
/// `base_dir` is not found. All references are checked before failing with
/// [`PblogError::ResourcesNotFound`] listing every miss.
pub fn resolve_resources<I, S>(base_dir: &Path, references: I) -> Result<Vec<ResolvedResource>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let base = dunce::canonicalize(base_dir).map_err(|e| PblogError::FileReadFailed {
        path: base_dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut resolved = Vec::new();
    let mut not_found = Vec::new();

    for reference in references {
        let reference = reference.as_ref();
        match dunce::canonicalize(base.join(reference)) {
            Ok(source) if source.is_file() && source.starts_with(&base) => {
                resolved.push(ResolvedResource {
                    source,
                    relative: PathBuf::from(reference),
                });
            }
            _ => {
                tracing::debug!(reference, base = %base.display(), "resource not found");
                not_found.push(reference.to_string());
            }
        }
    }

    if not_found.is_empty() {
        Ok(resolved)
    } else {
        Err(PblogError::ResourcesNotFound {
            resources: not_found,
        })
    }
}
