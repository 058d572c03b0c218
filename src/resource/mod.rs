//! Resources bundled with a post
//!
//! A **resource** is a file (image, attachment, ...) referenced from a post and
//! shipped inside its package under `resources/<relative path>`.
//!
//! [`ResourceHandler`] holds one resource in memory and writes it back to disk
//! below a root directory; [`resolver`] finds the files a post references.

pub mod resolver;

pub use resolver::{ResolvedResource, resolve_resources};

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{PblogError, Result, package_error};
use crate::hash;

/// A resource file with its path relative to the post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandler {
    content: Vec<u8>,
    path: PathBuf,
}

impl ResourceHandler {
    /// Create a resource; `path` must be relative.
    pub fn new(content: impl Into<Vec<u8>>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.is_absolute() || path.has_root() {
            return Err(PblogError::AbsoluteResourcePath {
                path: path.display().to_string(),
            });
        }
        Ok(Self {
            content: content.into(),
            path,
        })
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// BLAKE3 digest of the content
    pub fn content_hash(&self) -> String {
        hash::hash_bytes(&self.content)
    }

    /// Write the resource below `root`, optionally inside `subdirectory`.
    ///
    /// The target is resolved against the canonical root, following symlinks
    /// of existing directories, and must stay strictly inside it. Missing
    /// parent directories are created and an existing file is overwritten.
    /// Returns the path written.
    pub fn save(&self, root: &Path, subdirectory: Option<&Path>) -> Result<PathBuf> {
        if !root.is_dir() {
            return Err(PblogError::NotADirectory {
                path: root.display().to_string(),
            });
        }
        let root = dunce::canonicalize(root)?;

        let relative = match subdirectory {
            Some(sub) => sub.join(&self.path),
            None => self.path.clone(),
        };
        let target = resolve_below(&root, &relative).ok_or_else(|| {
            package_error(format!(
                "resource path {} is not within given root directory {}",
                relative.display(),
                root.display()
            ))
        })?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| PblogError::FileWriteFailed {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        fs::write(&target, &self.content).map_err(|e| PblogError::FileWriteFailed {
            path: target.display().to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %target.display(), bytes = self.content.len(), "resource written");
        Ok(target)
    }
}

/// Resolve `relative` against the canonical `root`.
///
/// Components are applied one at a time. Every symlink met on the way is
/// canonicalized so `..` and the containment check apply to its target; a
/// symlink that cannot be resolved (dangling, looping) is refused. Returns
/// `None` if the result is not strictly below `root`.
fn resolve_below(root: &Path, relative: &Path) -> Option<PathBuf> {
    let mut current = root.to_path_buf();

    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !current.pop() {
                    return None;
                }
            }
            Component::Normal(name) => {
                current.push(name);
                // symlink_metadata also sees dangling links, which fail to canonicalize
                if fs::symlink_metadata(&current).is_ok() {
                    current = dunce::canonicalize(&current).ok()?;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
        if !current.starts_with(root) {
            return None;
        }
    }

    (current.starts_with(root) && current != root).then_some(current)
}
