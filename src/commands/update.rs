//! Update command implementation
//!
//! Records the outcome of a publication (remote id, slug, date) in the
//! metadata block of the source post.

use chrono::Local;
use console::Style;

use crate::cli::UpdateArgs;
use pblog::validate::{PostIds, normalize_post_meta};
use pblog::{PackageCodec, Result, encoding, frontmatter, fs_utils};

/// Merge a publication result into a markdown post
pub fn run(args: UpdateArgs) -> Result<()> {
    let mut package = PackageCodec::new().load_post(&args.post, &args.encoding)?;

    let slug = args
        .slug
        .or_else(|| package.post_slug.clone())
        .unwrap_or_else(|| pblog::path_utils::slugify(&package.post_title));
    let date = args
        .date
        .or(package.published_date)
        .unwrap_or_else(|| Local::now().date_naive());
    let post_id = PostIds::from([(args.env.clone(), args.id)]);

    if !package.update_post_meta(&post_id, &slug, date)? {
        println!(
            "{} {} is up to date",
            Style::new().dim().apply_to("Unchanged"),
            args.post.display()
        );
        return Ok(());
    }

    // The updated block must still be valid post metadata.
    normalize_post_meta(frontmatter::extract(&package.markdown_content)?.meta.as_ref())?;

    let bytes = encoding::encode(&package.markdown_content, &args.encoding)?;
    fs_utils::write_atomic(&args.post, &bytes)?;

    tracing::info!(post = %args.post.display(), env = %args.env, "post metadata written");
    println!(
        "{} {} ({} = {})",
        Style::new().green().bold().apply_to("Updated"),
        args.post.display(),
        args.env,
        args.id.map_or_else(|| "none".to_string(), |id| id.to_string())
    );
    Ok(())
}
