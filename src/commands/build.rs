//! Build command implementation

use console::Style;

use crate::cli::BuildArgs;
use pblog::{PackageCodec, Result};

/// Package a markdown post
pub fn run(args: BuildArgs) -> Result<()> {
    let destination = args.destination();
    let compression = args.compression(&destination);

    let package =
        PackageCodec::new().build_with(&args.post, &destination, &args.encoding, compression)?;

    println!(
        "{} {} {}",
        Style::new().green().bold().apply_to("Built"),
        destination.display(),
        Style::new().dim().apply_to(format!(
            "({}, {} resource{})",
            package.post_title,
            package.resources.len(),
            if package.resources.len() == 1 { "" } else { "s" }
        )),
    );

    Ok(())
}
