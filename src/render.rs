//! Markdown rendering boundary.
//!
//! The codec needs four things from a renderer: the HTML output, the metadata
//! block, the summary and the local files the post references. They are all
//! returned together in [`Rendered`] so nothing is read back from renderer
//! state after conversion.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};
use serde_yaml::Value;

use crate::error::Result;
use crate::frontmatter;
use crate::path_utils::normalize_reference;

/// Everything a renderer produces for one post
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub html: String,
    /// Metadata block, `None` if the post has none
    pub meta: Option<Value>,
    /// Explicit `[summary]` paragraph, or the text of the first paragraph
    pub summary: Option<String>,
    /// Relative paths of local files referenced by the post, in document order
    pub resources: Vec<String>,
}

/// Converts markdown posts
pub trait Renderer {
    fn render(&self, markdown: &str) -> Result<Rendered>;
}

/// Default renderer built on pulldown-cmark
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_options(
            Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES | Options::ENABLE_STRIKETHROUGH,
        )
    }

    pub fn with_options(options: Options) -> Self {
        Self { options }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<Rendered> {
        let extracted = frontmatter::extract(markdown)?;
        let (explicit_summary, body) = frontmatter::extract_summary(extracted.body);
        let body = body.join("\n");

        let events: Vec<Event<'_>> = Parser::new_ext(&body, self.options).collect();

        let resources = collect_resources(&events);
        let summary = explicit_summary.or_else(|| first_paragraph_text(&events));

        let mut html_out = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut html_out, events.into_iter());

        Ok(Rendered {
            html: html_out,
            meta: extracted.meta,
            summary,
            resources,
        })
    }
}

fn collect_resources(events: &[Event<'_>]) -> Vec<String> {
    let mut resources: Vec<String> = Vec::new();

    for event in events {
        let destination = match event {
            Event::Start(Tag::Image { dest_url, .. } | Tag::Link { dest_url, .. }) => dest_url,
            _ => continue,
        };

        if let Some(reference) = local_reference(destination) {
            if !resources.contains(&reference) {
                resources.push(reference);
            }
        }
    }

    resources
}

/// Local relative path named by a link destination, if any.
///
/// URLs with a scheme, absolute paths and fragment-only links are not local
/// files. Query strings and fragments are dropped.
fn local_reference(destination: &str) -> Option<String> {
    let destination = destination.trim();
    if destination.is_empty()
        || destination.starts_with(['#', '/', '\\', '?'])
        || has_scheme(destination)
    {
        return None;
    }

    let path = destination
        .split(['?', '#'])
        .next()
        .unwrap_or(destination);
    let reference = normalize_reference(path);
    if reference.is_empty() {
        None
    } else {
        Some(reference)
    }
}

fn has_scheme(destination: &str) -> bool {
    match destination.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Text of the first top-level paragraph
fn first_paragraph_text(events: &[Event<'_>]) -> Option<String> {
    let mut depth = 0usize;
    let mut inside = false;
    let mut image_depth = 0usize;
    let mut text = String::new();

    for event in events {
        match event {
            Event::Start(tag) => {
                if depth == 0 && matches!(tag, Tag::Paragraph) {
                    inside = true;
                }
                if inside && matches!(tag, Tag::Image { .. }) {
                    image_depth += 1;
                }
                depth += 1;
            }
            Event::End(tag) => {
                depth = depth.saturating_sub(1);
                if inside && matches!(tag, TagEnd::Image) {
                    image_depth = image_depth.saturating_sub(1);
                }
                if inside && depth == 0 && matches!(tag, TagEnd::Paragraph) {
                    return Some(text);
                }
            }
            Event::Text(s) | Event::Code(s) if inside && image_depth == 0 => text.push_str(s),
            Event::SoftBreak | Event::HardBreak if inside => text.push('\n'),
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> Rendered {
        MarkdownRenderer::new().render(markdown).unwrap()
    }

    #[test]
    fn test_render_with_explicit_summary() {
        let rendered = render(
            "---\ntitle: T\ncategory: C\n---\n\n[summary]\nLet's have a summary\n\nAnd a paragraph: éçà.\n",
        );
        assert_eq!(rendered.summary.as_deref(), Some("Let's have a summary"));
        assert_eq!(rendered.html.trim(), "<p>And a paragraph: éçà.</p>");
        assert!(rendered.meta.is_some());
    }

    #[test]
    fn test_summary_falls_back_to_first_paragraph() {
        let rendered = render("# Heading\n\nFirst *para* `code`.\n\nSecond.");
        assert_eq!(rendered.summary.as_deref(), Some("First para code."));
    }

    #[test]
    fn test_summary_skips_nested_paragraphs() {
        let rendered = render("> quoted\n\n- item\n\nTop level");
        assert_eq!(rendered.summary.as_deref(), Some("Top level"));
    }

    #[test]
    fn test_no_paragraph_no_summary() {
        assert!(render("# Only a heading").summary.is_none());
    }

    #[test]
    fn test_collects_local_resources() {
        let rendered = render(
            "![x](img.png) [doc](files/a.pdf?dl=1#p2) ![again](./img.png)\n\
             [web](https://example.com/a.png) [mail](mailto:a@b.c) [top](#top) ![abs](/abs.png)",
        );
        assert_eq!(rendered.resources, vec!["img.png", "files/a.pdf"]);
    }

    #[test]
    fn test_no_metadata_block() {
        let rendered = render("World");
        assert!(rendered.meta.is_none());
        assert_eq!(rendered.summary.as_deref(), Some("World"));
        assert!(rendered.resources.is_empty());
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("http://x"));
        assert!(has_scheme("data:image/png;base64,xx"));
        assert!(!has_scheme("img.png"));
        assert!(!has_scheme("dir/a:b.png"));
    }
}
