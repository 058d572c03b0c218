//! pblog - markdown blog post packages
//!
//! Turns a markdown post with a YAML metadata block into a self-contained
//! package (a tar archive holding the post, a `package.yml` manifest and every
//! local file the post references) and reads packages back into a validated
//! [`Package`].
//!
//! ```no_run
//! use std::path::Path;
//!
//! let package = pblog::build_package(Path::new("post.md"), Path::new("post.tar"), "utf-8")?;
//! let read = pblog::read_package(Path::new("post.tar"))?;
//! assert_eq!(package.post_title, read.post_title);
//! # Ok::<(), pblog::PblogError>(())
//! ```

pub mod encoding;
pub mod error;
pub mod frontmatter;
pub mod fs_utils;
pub mod hash;
pub mod package;
pub mod path_utils;
pub mod render;
pub mod resource;
pub mod validate;

pub use error::{FieldErrors, PblogError, Result};
pub use package::{
    Compression, Package, PackageCodec, build_package, read_package, read_package_from,
};
pub use render::{MarkdownRenderer, Rendered, Renderer};
pub use resource::ResourceHandler;
