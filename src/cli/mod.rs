//! CLI definitions using clap derive API
//!
//! Each command's argument type lives in its own submodule.

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Args, Parser, Subcommand};

pub mod build;
pub mod completions;
pub mod extract;
pub mod inspect;
pub mod update;

pub use build::BuildArgs;
pub use completions::CompletionsArgs;
pub use extract::ExtractArgs;
pub use inspect::InspectArgs;
pub use update::UpdateArgs;

/// pblog - markdown blog post packages
#[derive(Parser, Debug)]
#[command(
    name = "pblog",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Build and read self-contained markdown blog post packages",
    long_about = "pblog packages a markdown post, its YAML metadata block and every local \
                  file it references into a single archive, and reads such archives back.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  pblog build post.md                     \x1b[90m# Write post.tar\x1b[0m\n   \
                  pblog inspect post.tar                  \x1b[90m# Show package contents\x1b[0m\n   \
                  pblog extract post.tar out/             \x1b[90m# Unpack post and resources\x1b[0m\n   \
                  pblog update post.md --env prod --id 4  \x1b[90m# Record a publication\x1b[0m\n"
)]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Verbosity flags
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct LogArgs {
    /// More log output (-v debug, -vv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less log output (-q warnings only, -qq errors only)
    #[arg(long, short = 'q', action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Package a markdown post and its resources
    Build(BuildArgs),

    /// Show the contents of a package
    Inspect(InspectArgs),

    /// Unpack a package into a directory
    Extract(ExtractArgs),

    /// Record the result of a publication in a markdown post
    Update(UpdateArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pblog::Compression;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_cli_parsing_build() {
        let cli = Cli::try_parse_from(["pblog", "build", "post.md"]).unwrap();
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.post, PathBuf::from("post.md"));
                assert_eq!(args.destination(), PathBuf::from("post.tar"));
                assert_eq!(args.compression(&args.destination()), Compression::None);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_build_compression_flags() {
        let cli = Cli::try_parse_from(["pblog", "build", "post.md", "-o", "out.tar.gz"]).unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("Expected Build command");
        };
        assert_eq!(args.compression(Path::new("out.tar.gz")), Compression::Gzip);

        let cli =
            Cli::try_parse_from(["pblog", "build", "post.md", "-o", "out.tar.gz", "--no-gzip"])
                .unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("Expected Build command");
        };
        assert_eq!(args.compression(Path::new("out.tar.gz")), Compression::None);

        let cli = Cli::try_parse_from(["pblog", "build", "post.md", "--gzip"]).unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("Expected Build command");
        };
        assert_eq!(args.compression(Path::new("post.tar")), Compression::Gzip);
    }

    #[test]
    fn test_cli_gzip_flags_conflict() {
        assert!(Cli::try_parse_from(["pblog", "build", "post.md", "--gzip", "--no-gzip"]).is_err());
    }

    #[test]
    fn test_cli_parsing_inspect() {
        let cli = Cli::try_parse_from(["pblog", "inspect", "post.tar", "--json"]).unwrap();
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.package, PathBuf::from("post.tar"));
                assert!(args.json);
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_cli_parsing_update() {
        let cli = Cli::try_parse_from([
            "pblog", "update", "post.md", "--env", "prod", "--id", "12", "--date", "2017-03-30",
        ])
        .unwrap();
        match cli.command {
            Commands::Update(args) => {
                assert_eq!(args.env, "prod");
                assert_eq!(args.id, Some(12));
                assert_eq!(args.slug, None);
                assert_eq!(
                    args.date,
                    chrono::NaiveDate::from_ymd_opt(2017, 3, 30)
                );
            }
            _ => panic!("Expected Update command"),
        }
    }

    #[test]
    fn test_cli_update_rejects_bad_date() {
        assert!(
            Cli::try_parse_from(["pblog", "update", "post.md", "--env", "prod", "--date", "30/03/2017"])
                .is_err()
        );
    }

    #[test]
    fn test_cli_update_requires_env() {
        assert!(Cli::try_parse_from(["pblog", "update", "post.md"]).is_err());
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["pblog", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_verbosity() {
        let cli = Cli::try_parse_from(["pblog", "-vv", "version"]).unwrap();
        assert_eq!(cli.log.verbose, 2);
        assert_eq!(cli.log.quiet, 0);

        let cli = Cli::try_parse_from(["pblog", "version", "-q"]).unwrap();
        assert_eq!(cli.log.quiet, 1);

        assert!(Cli::try_parse_from(["pblog", "-v", "-q", "version"]).is_err());
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::try_parse_from(["pblog", "completions", "bash"]).unwrap();
        match cli.command {
            Commands::Completions(args) => {
                assert_eq!(args.shell, "bash");
            }
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
