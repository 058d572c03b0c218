//! Path and identifier utilities for pblog
//!
//! Slugs for post URLs and forward-slash member names for package archives.

use std::path::{Component, Path, PathBuf};

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Make a post title safe for use in a URL.
///
/// Accents are stripped by decomposing characters and dropping combining
/// marks, ASCII letters and digits are lowercased and every other run of
/// characters becomes a single hyphen. Leading and trailing hyphens are
/// removed. Returns "unknown" if the result is empty.
///
/// # Examples
///
/// ```
/// use pblog::path_utils::slugify;
///
/// assert_eq!(slugify("A title"), "a-title");
/// assert_eq!(slugify("Éçà & co."), "eca-co");
/// assert_eq!(slugify(":::"), "unknown");
/// ```
pub fn slugify(title: &str) -> String {
    let key: String = title
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    let key = key
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if key.is_empty() {
        "unknown".to_string()
    } else {
        key
    }
}

/// Render a relative path as an archive member name using forward slashes.
///
/// `.` segments are dropped.
pub fn to_member_name(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::CurDir => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Lexically normalize a relative reference.
///
/// Backslashes become separators, `.` segments are dropped and `name/..`
/// pairs cancel out. Leading `..` segments that cannot be cancelled are kept.
pub fn normalize_reference(reference: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in reference.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Join a member name under a directory prefix inside an archive
pub fn member_under(prefix: &str, relative: &Path) -> PathBuf {
    PathBuf::from(prefix).join(relative)
}
