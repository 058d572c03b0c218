//! Build packages from markdown posts and read them back.
//!
//! Both directions run the same pipeline over the markdown text: decode with
//! the declared encoding, render, validate the metadata block, then collect
//! the referenced resources (from disk when building, from the archive when
//! reading). Every renderer call goes through the codec's own renderer so no
//! parsing state is shared between calls.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_yaml::Value;

use super::archive::{ArchiveEntries, ArchiveWriter, Compression, MANIFEST_NAME, RESOURCES_DIR};
use super::Package;
use crate::encoding;
use crate::fs_utils;
use crate::error::{PblogError, Result, package_error};
use crate::path_utils::{member_under, to_member_name};
use crate::render::{MarkdownRenderer, Renderer};
use crate::resource::{ResourceHandler, resolve_resources};
use crate::validate::{PackageMeta, PostMeta, normalize_post_meta, validate_package_meta};

/// Builds and reads packages with a given renderer
#[derive(Debug, Clone, Default)]
pub struct PackageCodec<R: Renderer = MarkdownRenderer> {
    renderer: R,
}

impl PackageCodec<MarkdownRenderer> {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A post parsed from its markdown source
struct ParsedPost {
    markdown: String,
    summary: String,
    meta: PostMeta,
    references: Vec<String>,
}

/// Everything needed to write a package, gathered before any byte is written
struct PreparedBuild {
    package: Package,
    manifest: String,
    post_bytes: Vec<u8>,
    post_mtime: u64,
}

impl<R: Renderer> PackageCodec<R> {
    pub fn with_renderer(renderer: R) -> Self {
        Self { renderer }
    }

    fn parse_post(&self, bytes: &[u8], encoding: &str) -> Result<ParsedPost> {
        let markdown = encoding::decode(bytes, encoding)?;
        let rendered = self.renderer.render(&markdown)?;
        let meta = normalize_post_meta(rendered.meta.as_ref())?;

        Ok(ParsedPost {
            markdown,
            summary: rendered.summary.unwrap_or_default(),
            meta,
            references: rendered.resources,
        })
    }

    fn assemble(
        parsed: ParsedPost,
        post_name: String,
        encoding: &str,
        resources: Vec<ResourceHandler>,
    ) -> Package {
        let ParsedPost {
            markdown,
            summary,
            meta,
            ..
        } = parsed;

        let mut package = Package::new(meta.title, meta.category, markdown, summary);
        package.post_encoding = encoding.to_string();
        package.post_name = post_name;
        package.post_id = meta.id;
        package.post_slug = meta.slug;
        package.published_date = meta.published_date;
        package.resources = resources;
        package
    }

    /// Decode, render and validate a markdown post without packaging it.
    ///
    /// Referenced resources are neither resolved nor loaded.
    pub fn load_post(&self, post_path: &Path, encoding: &str) -> Result<Package> {
        let bytes = read_file(post_path)?;
        let parsed = self.parse_post(&bytes, encoding)?;
        Ok(Self::assemble(parsed, post_name(post_path)?, encoding, Vec::new()))
    }

    fn prepare(&self, post_path: &Path, encoding: &str) -> Result<PreparedBuild> {
        let post_name = post_name(post_path)?;
        let post_bytes = read_file(post_path)?;
        let parsed = self.parse_post(&post_bytes, encoding)?;

        let manifest = PackageMeta::new(post_name.clone(), encoding).to_yaml()?;

        let base_dir = match post_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut resources = Vec::new();
        for resolved in resolve_resources(&base_dir, &parsed.references)? {
            let content = read_file(&resolved.source)?;
            resources.push(ResourceHandler::new(content, resolved.relative)?);
        }

        Ok(PreparedBuild {
            package: Self::assemble(parsed, post_name, encoding, resources),
            manifest,
            post_bytes,
            post_mtime: mtime_of(post_path),
        })
    }

    fn write_archive<W: Write>(
        prepared: &PreparedBuild,
        writer: W,
        compression: Compression,
    ) -> Result<W> {
        let mut archive = ArchiveWriter::new(writer, compression);

        archive.append(MANIFEST_NAME, prepared.manifest.as_bytes(), now())?;
        archive.append(
            &prepared.package.post_name,
            &prepared.post_bytes,
            prepared.post_mtime,
        )?;
        for resource in &prepared.package.resources {
            let member = to_member_name(&member_under(RESOURCES_DIR, resource.path()));
            archive.append(&member, resource.content(), prepared.post_mtime)?;
        }

        archive.finish()
    }

    /// Build a package for `post_path` into any writer
    pub fn build_to_writer<W: Write>(
        &self,
        post_path: &Path,
        writer: W,
        encoding: &str,
        compression: Compression,
    ) -> Result<Package> {
        let prepared = self.prepare(post_path, encoding)?;
        Self::write_archive(&prepared, writer, compression)?;
        Ok(prepared.package)
    }

    /// Build a package file, compressed when `destination` ends in `.gz`/`.tgz`
    pub fn build(&self, post_path: &Path, destination: &Path, encoding: &str) -> Result<Package> {
        self.build_with(post_path, destination, encoding, Compression::from_path(destination))
    }

    /// Build a package file with explicit compression.
    ///
    /// The archive is written to a temporary file next to `destination` and
    /// moved into place once complete, so a failed build leaves no partial
    /// package behind.
    pub fn build_with(
        &self,
        post_path: &Path,
        destination: &Path,
        encoding: &str,
        compression: Compression,
    ) -> Result<Package> {
        let prepared = self.prepare(post_path, encoding)?;

        let mut temp = fs_utils::temp_file_for(destination)?;
        Self::write_archive(&prepared, temp.as_file_mut(), compression)?;
        fs_utils::persist(temp, destination)?;

        tracing::info!(
            post = %post_path.display(),
            package = %destination.display(),
            resources = prepared.package.resources.len(),
            "package built"
        );
        Ok(prepared.package)
    }

    /// Read a package file
    pub fn read(&self, package_path: &Path) -> Result<Package> {
        let file = File::open(package_path).map_err(|e| PblogError::FileReadFailed {
            path: package_path.display().to_string(),
            reason: e.to_string(),
        })?;
        let package = self.read_from(BufReader::new(file))?;

        tracing::info!(package = %package_path.display(), title = %package.post_title, "package read");
        Ok(package)
    }

    /// Read a package from any reader
    pub fn read_from<Rd: Read>(&self, reader: Rd) -> Result<Package> {
        let entries = ArchiveEntries::read(reader)?;
        let package_meta = extract_package_meta(&entries)?;

        let post_member = to_member_name(Path::new(&package_meta.post));
        let post_bytes = entries.get(&post_member).ok_or_else(|| {
            package_error(format!(
                "The package does not contain the post file {}",
                package_meta.post
            ))
        })?;

        let parsed = self.parse_post(post_bytes, &package_meta.encoding)?;
        let resources = extract_package_resources(&entries, &parsed.references)?;

        Ok(Self::assemble(
            parsed,
            post_member,
            &package_meta.encoding,
            resources,
        ))
    }
}

/// Read and validate the `package.yml` manifest of a package.
pub fn extract_package_meta(entries: &ArchiveEntries) -> Result<PackageMeta> {
    let bytes = entries
        .get(MANIFEST_NAME)
        .ok_or_else(|| package_error("The package does not contain a package.yml file"))?;
    let text = encoding::decode(bytes, encoding::DEFAULT_ENCODING)?;

    let doc: Value = serde_yaml::from_str(&text)
        .map_err(|_| package_error("The package.yml file does not contain valid YAML"))?;

    validate_package_meta(Some(&doc))
}

/// Load every referenced resource from `resources/` inside a package.
///
/// All references are looked up before failing with
/// [`PblogError::ResourcesNotFound`].
pub fn extract_package_resources<S: AsRef<str>>(
    entries: &ArchiveEntries,
    references: &[S],
) -> Result<Vec<ResourceHandler>> {
    let mut resources = Vec::new();
    let mut not_found = Vec::new();

    for reference in references {
        let reference = reference.as_ref();
        let member = to_member_name(&member_under(RESOURCES_DIR, Path::new(reference)));
        match entries.get(&member) {
            Some(content) => resources.push(ResourceHandler::new(content, reference)?),
            None => not_found.push(reference.to_string()),
        }
    }

    if not_found.is_empty() {
        Ok(resources)
    } else {
        Err(PblogError::ResourcesNotFound {
            resources: not_found,
        })
    }
}

/// Build a package file for a markdown post with the default renderer
pub fn build_package(post_path: &Path, destination: &Path, encoding: &str) -> Result<Package> {
    PackageCodec::new().build(post_path, destination, encoding)
}

/// Read a package file with the default renderer
pub fn read_package(package_path: &Path) -> Result<Package> {
    PackageCodec::new().read(package_path)
}

/// Read a package from an open stream with the default renderer
pub fn read_package_from<Rd: Read>(reader: Rd) -> Result<Package> {
    PackageCodec::new().read_from(reader)
}

fn post_name(post_path: &Path) -> Result<String> {
    post_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| PblogError::FileNotFound {
            path: post_path.display().to_string(),
        })
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| PblogError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn mtime_of(path: &Path) -> u64 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs())
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE_MARKDOWN: &str = "---\ntitle: This is a title\ncategory: A category\n---\n\n[summary]\nLet's have a summary\n\nAnd at least a paragraph with special chars: éçà.\n";

    fn build_tar(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ArchiveWriter::new(Vec::new(), Compression::None);
        for (name, content) in members {
            writer.append(name, content, 0).unwrap();
        }
        writer.finish().unwrap()
    }

    fn entries(members: &[(&str, &[u8])]) -> ArchiveEntries {
        ArchiveEntries::read(build_tar(members).as_slice()).unwrap()
    }

    #[test]
    fn test_extracts_package_meta() {
        let meta = extract_package_meta(&entries(&[(
            "package.yml",
            &b"encoding: utf-8\npost: post.md\n"[..],
        )]))
        .unwrap();
        assert_eq!(meta, PackageMeta::new("post.md", "utf-8"));
    }

    #[test]
    fn test_empty_package_meta() {
        let err = extract_package_meta(&entries(&[("package.yml", &b""[..])])).unwrap_err();
        assert!(matches!(err, PblogError::Package { .. }));
        assert_eq!(err.to_string(), "package.yml file is empty");
    }

    #[test]
    fn test_wrong_yaml_package_meta() {
        let err = extract_package_meta(&entries(&[("package.yml", &b"'"[..])])).unwrap_err();
        assert!(matches!(err, PblogError::Package { .. }));
    }

    #[test]
    fn test_no_package_meta() {
        let err =
            extract_package_meta(&entries(&[("not-package.yml", &b"some content'"[..])])).unwrap_err();
        assert!(matches!(err, PblogError::Package { .. }));
    }

    #[test]
    fn test_package_meta_does_not_validate() {
        let err = extract_package_meta(&entries(&[("package.yml", &b"foo: bar\n"[..])])).unwrap_err();
        let PblogError::Validation { errors, .. } = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("encoding"));
        assert!(errors.contains("post"));
    }

    #[test]
    fn test_read_package_from_stream() {
        let latin1 = encoding::encode(SAMPLE_MARKDOWN, "iso-8859-1").unwrap();
        let tar = build_tar(&[
            ("package.yml", &b"encoding: iso-8859-1\npost: post.md"[..]),
            ("post.md", latin1.as_slice()),
        ]);

        let package = read_package_from(tar.as_slice()).unwrap();

        assert_eq!(package.post_encoding, "iso-8859-1");
        assert!(package.post_id.is_empty());
        assert_eq!(package.post_title, "This is a title");
        assert_eq!(package.post_slug, None);
        assert_eq!(package.category_name, "A category");
        assert_eq!(package.published_date, None);
        assert_eq!(package.summary, "Let's have a summary");
        assert_eq!(package.markdown_content, SAMPLE_MARKDOWN);
        assert!(package.html_content().is_err());
    }

    #[test]
    fn test_read_package_wrong_encoding() {
        let latin1 = encoding::encode(SAMPLE_MARKDOWN, "iso-8859-1").unwrap();
        let tar = build_tar(&[
            ("package.yml", &b"encoding: utf-8\npost: post.md"[..]),
            ("post.md", latin1.as_slice()),
        ]);

        let err = read_package_from(tar.as_slice()).unwrap_err();
        assert!(matches!(err, PblogError::Decode { .. }));
    }

    #[test]
    fn test_read_package_missing_post_member() {
        let tar = build_tar(&[("package.yml", &b"encoding: utf-8\npost: post.md"[..])]);
        let err = read_package_from(tar.as_slice()).unwrap_err();
        assert!(matches!(err, PblogError::Package { .. }));
    }

    #[test]
    fn test_read_package_extracts_resources() {
        let tar = build_tar(&[
            ("package.yml", &b"encoding: utf-8\npost: post.md"[..]),
            ("post.md", &b"---\ntitle: T\ncategory: C\n---\n![a](img/a.png)\n"[..]),
            ("resources/img/a.png", &b"png"[..]),
            ("resources/unused.bin", &b"ignored"[..]),
        ]);

        let package = read_package_from(tar.as_slice()).unwrap();

        assert_eq!(package.resources.len(), 1);
        assert_eq!(package.resources[0].path(), Path::new("img/a.png"));
        assert_eq!(package.resources[0].content(), b"png");
    }

    #[test]
    fn test_build_package_into_writer() {
        let temp = TempDir::new().unwrap();
        let post_path = temp.path().join("post.md");
        fs::write(&post_path, encoding::encode(SAMPLE_MARKDOWN, "iso-8859-1").unwrap()).unwrap();

        let mut out = Vec::new();
        let package = PackageCodec::new()
            .build_to_writer(&post_path, &mut out, "iso-8859-1", Compression::None)
            .unwrap();

        let entries = ArchiveEntries::read(out.as_slice()).unwrap();
        assert_eq!(
            extract_package_meta(&entries).unwrap(),
            PackageMeta::new("post.md", "iso-8859-1")
        );
        assert_eq!(
            encoding::decode(entries.get("post.md").unwrap(), "iso-8859-1").unwrap(),
            SAMPLE_MARKDOWN
        );

        assert!(package.post_id.is_empty());
        assert_eq!(package.post_title, "This is a title");
        assert_eq!(package.post_slug, None);
        assert_eq!(package.published_date, None);
        assert_eq!(package.category_name, "A category");
        assert_eq!(package.markdown_content, SAMPLE_MARKDOWN);
    }

    #[test]
    fn test_build_writes_members_in_order() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("img")).unwrap();
        fs::write(temp.path().join("img/b.png"), b"b").unwrap();
        fs::write(temp.path().join("img/a.png"), b"a").unwrap();
        let post_path = temp.path().join("post.md");
        fs::write(
            &post_path,
            "---\ntitle: T\ncategory: C\n---\n![b](img/b.png) ![a](img/a.png)\n",
        )
        .unwrap();

        let mut out = Vec::new();
        PackageCodec::new()
            .build_to_writer(&post_path, &mut out, "utf-8", Compression::None)
            .unwrap();

        let mut archive = tar::Archive::new(out.as_slice());
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|entry| entry.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names[..2], ["package.yml", "post.md"]);
        assert_eq!(names.len(), 4);
        assert!(names[2..].iter().all(|name| name.starts_with("resources/")));
    }

    #[cfg(unix)]
    #[test]
    fn test_built_package_has_plain_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let post_path = temp.path().join("post.md");
        fs::write(&post_path, SAMPLE_MARKDOWN).unwrap();
        let plain = temp.path().join("plain");
        fs::write(&plain, "x").unwrap();
        let destination = temp.path().join("post.tar");

        PackageCodec::new().build(&post_path, &destination, "utf-8").unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&destination), mode(&plain));
    }

    #[test]
    fn test_invalid_post_meta_will_not_package() {
        let temp = TempDir::new().unwrap();
        let post_path = temp.path().join("post.md");
        fs::write(&post_path, "---\nfoo: bar\n").unwrap();
        let destination = temp.path().join("package.tar");

        let err = build_package(&post_path, &destination, "utf-8").unwrap_err();

        let errors = err.field_errors().unwrap();
        assert!(errors.contains("title"));
        assert!(errors.contains("category"));
        assert!(!destination.exists());
    }

    #[test]
    fn test_post_without_metadata_will_not_package() {
        let temp = TempDir::new().unwrap();
        let post_path = temp.path().join("post.md");
        fs::write(&post_path, "Just text\n").unwrap();

        let err = PackageCodec::new()
            .build_to_writer(&post_path, Vec::new(), "utf-8", Compression::None)
            .unwrap_err();
        assert_eq!(err.to_string(), "no metadata");
    }

    #[test]
    fn test_missing_resources_will_not_package() {
        let temp = TempDir::new().unwrap();
        let post_path = temp.path().join("post.md");
        fs::write(
            &post_path,
            "---\ntitle: T\ncategory: C\n---\n![a](a.png) ![b](b/c.png)\n",
        )
        .unwrap();

        let err = PackageCodec::new()
            .build_to_writer(&post_path, Vec::new(), "utf-8", Compression::None)
            .unwrap_err();
        let PblogError::ResourcesNotFound { resources } = err else {
            panic!("expected missing resources");
        };
        assert_eq!(resources, vec!["a.png", "b/c.png"]);
    }

    #[test]
    fn test_load_post() {
        let temp = TempDir::new().unwrap();
        let post_path = temp.path().join("hello.md");
        fs::write(&post_path, "---\ntitle: T\ncategory: C\n---\n![a](missing.png)\n").unwrap();

        let package = PackageCodec::new().load_post(&post_path, "utf-8").unwrap();
        assert_eq!(package.post_name, "hello.md");
        assert_eq!(package.post_title, "T");
        assert!(package.resources.is_empty());
    }
}
