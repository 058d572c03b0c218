//! pblog - markdown blog post packages
//!
//! Command line front end over the `pblog` library: build packages from
//! markdown posts, inspect and unpack them, and record publications back into
//! the source posts.

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod logging;

use cli::{Cli, Commands};
use pblog::PblogError;

fn report(error: &PblogError) {
    eprintln!("Error: {}", error);
    if let Some(errors) = error.field_errors() {
        for (field, messages) in errors.iter() {
            for message in messages {
                eprintln!("  {}: {}", field, message);
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_global_subscriber(cli.log);

    let result = match cli.command {
        Commands::Build(args) => commands::build::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Extract(args) => commands::extract::run(args),
        Commands::Update(args) => commands::update::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            report(&e);
            ExitCode::FAILURE
        }
    }
}
