use clap::Parser;
use std::path::{Path, PathBuf};

use pblog::Compression;

/// Arguments for the build command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Package a post next to its source:\n    pblog build posts/hello.md\n\n\
                  Write a gzip compressed package:\n    pblog build posts/hello.md -o hello.tar.gz\n\n\
                  Package a latin-1 post:\n    pblog build old.md --encoding iso-8859-1")]
pub struct BuildArgs {
    /// Markdown post to package
    pub post: PathBuf,

    /// Package file to write (defaults to the post path with a .tar extension)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Encoding of the markdown post
    #[arg(long, short = 'e', env = "PBLOG_ENCODING", default_value = pblog::encoding::DEFAULT_ENCODING)]
    pub encoding: String,

    /// Compress the package with gzip
    #[arg(long, conflicts_with = "no_gzip")]
    pub gzip: bool,

    /// Never compress the package, even for .gz output names
    #[arg(long)]
    pub no_gzip: bool,
}

impl BuildArgs {
    /// Package path to write
    pub fn destination(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.post.with_extension("tar"))
    }

    /// Compression to apply to `destination`
    pub fn compression(&self, destination: &Path) -> Compression {
        if self.gzip {
            Compression::Gzip
        } else if self.no_gzip {
            Compression::None
        } else {
            Compression::from_path(destination)
        }
    }
}
