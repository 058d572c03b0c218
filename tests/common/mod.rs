//! Common test utilities for pblog integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Post with metadata, an explicit summary and one image
pub const POST_WITH_IMAGE: &str = "---\ntitle: Hello\ncategory: Misc\n---\n\n[summary]\nA short summary\n\n![logo](img/logo.png)\n\nSome text with special chars: éçà.\n";

/// A scratch directory holding posts, resources and packages
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a text file, creating parent directories
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        self.write_bytes(path, content.as_bytes())
    }

    /// Write a binary file, creating parent directories
    pub fn write_bytes(&self, path: &str, content: &[u8]) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    pub fn read_bytes(&self, path: &str) -> Vec<u8> {
        std::fs::read(self.path.join(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    pub fn join(&self, path: &str) -> PathBuf {
        self.path.join(path)
    }

    /// Write `post/post.md` from [`POST_WITH_IMAGE`] and its image
    pub fn post_with_image(&self) -> PathBuf {
        self.write_bytes("post/img/logo.png", b"\x89PNG fake image");
        self.write_file("post/post.md", POST_WITH_IMAGE)
    }

    /// Build a raw tar package from `(member, content)` pairs
    pub fn write_tar(&self, path: &str, members: &[(&str, &[u8])]) -> PathBuf {
        let file_path = self.path.join(path);
        let file = std::fs::File::create(&file_path).expect("Failed to create tar");
        let mut builder = tar::Builder::new(file);
        for (name, content) in members {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, name, *content)
                .expect("Failed to append tar member");
        }
        builder.finish().expect("Failed to finish tar");
        file_path
    }
}

/// Path as a `&str` for command arguments
#[allow(dead_code)]
pub fn arg(path: &Path) -> &str {
    path.to_str().expect("Non UTF-8 test path")
}
