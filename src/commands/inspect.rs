//! Inspect command implementation

use console::Style;
use serde::Serialize;

use crate::cli::InspectArgs;
use pblog::validate::{DATE_FORMAT, PostIds};
use pblog::{Package, PblogError, Result};

/// Serializable view of a package
#[derive(Debug, Serialize)]
struct PackageReport<'a> {
    post: &'a str,
    encoding: &'a str,
    title: &'a str,
    category: &'a str,
    slug: Option<&'a str>,
    published_date: Option<String>,
    id: &'a PostIds,
    summary: &'a str,
    resources: Vec<ResourceReport>,
}

#[derive(Debug, Serialize)]
struct ResourceReport {
    path: String,
    size: usize,
    hash: String,
}

impl<'a> PackageReport<'a> {
    fn new(package: &'a Package) -> Self {
        Self {
            post: &package.post_name,
            encoding: &package.post_encoding,
            title: &package.post_title,
            category: &package.category_name,
            slug: package.post_slug.as_deref(),
            published_date: package
                .published_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
            id: &package.post_id,
            summary: &package.summary,
            resources: package
                .resources
                .iter()
                .map(|r| ResourceReport {
                    path: pblog::path_utils::to_member_name(r.path()),
                    size: r.content().len(),
                    hash: r.content_hash(),
                })
                .collect(),
        }
    }
}

/// Show a package
pub fn run(args: InspectArgs) -> Result<()> {
    let package = pblog::read_package(&args.package)?;
    let report = PackageReport::new(&package);

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| PblogError::IoError {
            message: e.to_string(),
        })?;
        println!("{}", json);
    } else {
        display(&report);
    }

    Ok(())
}

fn display(report: &PackageReport<'_>) {
    let label = Style::new().bold();
    let none = Style::new().dim().apply_to("-").to_string();

    println!("{}", Style::new().bold().yellow().apply_to(report.title));
    println!("  {} {}", label.apply_to("Category:"), report.category);
    println!("  {} {}", label.apply_to("Slug:"), report.slug.unwrap_or(&none));
    println!(
        "  {} {}",
        label.apply_to("Published:"),
        report.published_date.as_deref().unwrap_or(&none)
    );
    println!(
        "  {} {} ({})",
        label.apply_to("Post:"),
        report.post,
        report.encoding
    );

    if !report.id.is_empty() {
        println!("  {}", label.apply_to("Ids:"));
        for (env, id) in report.id {
            match id {
                Some(id) => println!("    {} {}", Style::new().cyan().apply_to(env), id),
                None => println!("    {} {}", Style::new().cyan().apply_to(env), none),
            }
        }
    }

    if !report.summary.is_empty() {
        println!("  {} {}", label.apply_to("Summary:"), report.summary);
    }

    if !report.resources.is_empty() {
        println!("  {}", label.apply_to("Resources:"));
        for resource in &report.resources {
            println!(
                "    {} {}",
                Style::new().green().apply_to(&resource.path),
                Style::new()
                    .dim()
                    .apply_to(format!("{} bytes, {}", resource.size, resource.hash))
            );
        }
    }
}
