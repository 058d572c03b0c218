//! Tar container used for packages, optionally gzip compressed

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::Compression as GzLevel;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::{PblogError, Result, package_error};
use crate::path_utils::to_member_name;

/// Name of the manifest member at the root of a package
pub const MANIFEST_NAME: &str = "package.yml";

/// Directory holding resources inside a package
pub const RESOURCES_DIR: &str = "resources";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression applied around the tar stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl Compression {
    /// Gzip for `.gz` and `.tgz` file names, none otherwise
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("tgz") => {
                Compression::Gzip
            }
            _ => Compression::None,
        }
    }
}

enum Sink<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> Write for Sink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Plain(w) => w.write(buf),
            Sink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Plain(w) => w.flush(),
            Sink::Gzip(w) => w.flush(),
        }
    }
}

/// Writes package members in order
pub struct ArchiveWriter<W: Write> {
    builder: tar::Builder<Sink<W>>,
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(writer: W, compression: Compression) -> Self {
        let sink = match compression {
            Compression::None => Sink::Plain(writer),
            Compression::Gzip => Sink::Gzip(GzEncoder::new(writer, GzLevel::default())),
        };
        Self {
            builder: tar::Builder::new(sink),
        }
    }

    /// Append a regular file member
    pub fn append(&mut self, name: &str, content: &[u8], mtime: u64) -> Result<()> {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);

        self.builder
            .append_data(&mut header, name, content)
            .map_err(|e| PblogError::FileWriteFailed {
                path: name.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(member = name, bytes = content.len(), "archive member written");
        Ok(())
    }

    /// Write the end-of-archive marker and return the underlying writer
    pub fn finish(self) -> Result<W> {
        let sink = self.builder.into_inner()?;
        let writer = match sink {
            Sink::Plain(w) => w,
            Sink::Gzip(encoder) => encoder.finish()?,
        };
        Ok(writer)
    }
}

/// Regular file members of a package, read fully into memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveEntries {
    members: BTreeMap<String, Vec<u8>>,
}

impl ArchiveEntries {
    /// Read a tar stream, gzip compressed or not
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        if bytes.starts_with(&GZIP_MAGIC) {
            Self::collect(tar::Archive::new(GzDecoder::new(bytes.as_slice())))
        } else {
            Self::collect(tar::Archive::new(bytes.as_slice()))
        }
    }

    fn collect<R: Read>(mut archive: tar::Archive<R>) -> Result<Self> {
        let invalid = |e: io::Error| package_error(format!("invalid package archive: {}", e));
        let mut members = BTreeMap::new();

        for entry in archive.entries().map_err(invalid)? {
            let mut entry = entry.map_err(invalid)?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = to_member_name(&entry.path().map_err(invalid)?);
            let mut content = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry.read_to_end(&mut content).map_err(invalid)?;

            tracing::trace!(member = %name, bytes = content.len(), "archive member read");
            members.insert(name, content);
        }

        Ok(Self { members })
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.members.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
