use clap::Parser;
use std::path::PathBuf;

/// Arguments for the extract command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Unpack a package:\n    pblog extract hello.tar out/\n\n\
                  Put resources in their own directory:\n    pblog extract hello.tar out/ --resources-dir media")]
pub struct ExtractArgs {
    /// Package file to unpack
    pub package: PathBuf,

    /// Directory to write the post and its resources into (created if missing)
    pub directory: PathBuf,

    /// Subdirectory of DIRECTORY for resources
    #[arg(long)]
    pub resources_dir: Option<PathBuf>,
}
