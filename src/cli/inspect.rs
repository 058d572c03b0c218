use clap::Parser;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show a package:\n    pblog inspect hello.tar\n\n\
                  Machine readable output:\n    pblog inspect hello.tar --json")]
pub struct InspectArgs {
    /// Package file to inspect
    pub package: PathBuf,

    /// Print the package as JSON
    #[arg(long)]
    pub json: bool,
}
