//! Extract command implementation

use std::fs;

use console::Style;

use crate::cli::ExtractArgs;
use pblog::{PblogError, ResourceHandler, Result, encoding};

/// Unpack a package into a directory
pub fn run(args: ExtractArgs) -> Result<()> {
    let package = pblog::read_package(&args.package)?;

    fs::create_dir_all(&args.directory).map_err(|e| PblogError::FileWriteFailed {
        path: args.directory.display().to_string(),
        reason: e.to_string(),
    })?;

    let post_bytes = encoding::encode(&package.markdown_content, &package.post_encoding)?;
    let post_path = ResourceHandler::new(post_bytes, &package.post_name)?.save(&args.directory, None)?;
    println!(
        "{} {}",
        Style::new().green().bold().apply_to("Wrote"),
        post_path.display()
    );

    for resource in &package.resources {
        let written = resource.save(&args.directory, args.resources_dir.as_deref())?;
        println!(
            "{} {}",
            Style::new().green().bold().apply_to("Wrote"),
            written.display()
        );
    }

    Ok(())
}
