//! Post packages
//!
//! A package is a tar archive (optionally gzip compressed) holding everything
//! needed to publish one post:
//!
//! ```text
//! package.yml          # {post: <markdown member>, encoding: <label>}
//! post.md              # the markdown source, verbatim
//! resources/img/a.png  # every local file the post references
//! ```
//!
//! [`Package`] is the in-memory form of a post; [`codec`] builds packages from
//! markdown files and reads them back.

pub mod archive;
pub mod codec;

pub use archive::{ArchiveEntries, Compression, MANIFEST_NAME, RESOURCES_DIR};
pub use codec::{
    PackageCodec, build_package, extract_package_meta, extract_package_resources, read_package,
    read_package_from,
};

use chrono::{Local, NaiveDate};
use serde_yaml::{Mapping, Value};

use crate::encoding::DEFAULT_ENCODING;
use crate::error::{Result, package_error};
use crate::frontmatter;
use crate::path_utils::slugify;
use crate::render::Renderer;
use crate::resource::ResourceHandler;
use crate::validate::post_meta::{PostIds, date_key};
use crate::validate::{DATE_FORMAT, ids_to_mapping};

/// Member name used for posts built in memory
pub const DEFAULT_POST_NAME: &str = "post.md";

/// Publishable state of one post
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Encoding label of the markdown source
    pub post_encoding: String,
    /// Name of the markdown member inside the package
    pub post_name: String,
    /// Remote ids keyed by environment name
    pub post_id: PostIds,
    pub post_title: String,
    /// Derived from the title by [`Package::set_default_values`] when absent
    pub post_slug: Option<String>,
    pub category_name: String,
    /// Set to the current date by [`Package::set_default_values`] when absent
    pub published_date: Option<NaiveDate>,
    pub summary: String,
    /// Full markdown source, metadata block included
    pub markdown_content: String,
    pub resources: Vec<ResourceHandler>,
    html_content: Option<String>,
}

impl Package {
    pub fn new(
        post_title: impl Into<String>,
        category_name: impl Into<String>,
        markdown_content: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            post_encoding: DEFAULT_ENCODING.to_string(),
            post_name: DEFAULT_POST_NAME.to_string(),
            post_id: PostIds::new(),
            post_title: post_title.into(),
            post_slug: None,
            category_name: category_name.into(),
            published_date: None,
            summary: summary.into(),
            markdown_content: markdown_content.into(),
            resources: Vec::new(),
            html_content: None,
        }
    }

    /// Rendered HTML; an error until [`Package::render_html`] has run
    pub fn html_content(&self) -> Result<&str> {
        self.html_content
            .as_deref()
            .ok_or_else(|| package_error("html_content has not been generated"))
    }

    /// Render the markdown source to HTML with `renderer`
    pub fn render_html<R: Renderer + ?Sized>(&mut self, renderer: &R) -> Result<()> {
        let rendered = renderer.render(&self.markdown_content)?;
        self.html_content = Some(rendered.html);
        Ok(())
    }

    /// Fill in a missing slug and publication date, using today's date
    pub fn set_default_values(&mut self) {
        self.set_default_values_at(Local::now().date_naive());
    }

    /// Fill in a missing slug from the title and a missing date with `today`.
    ///
    /// Values already set are never replaced.
    pub fn set_default_values_at(&mut self, today: NaiveDate) {
        if self.post_slug.is_none() {
            self.post_slug = Some(slugify(&self.post_title));
        }
        if self.published_date.is_none() {
            self.published_date = Some(today);
        }
    }

    /// Record the result of a publish step and write it into the markdown.
    ///
    /// `post_id` is merged key by key into the known ids. Returns `false`
    /// without touching anything when every value is already up to date;
    /// otherwise updates the fields, rewrites the metadata block of
    /// `markdown_content` and returns `true`. Persisting the new text is up to
    /// the caller.
    pub fn update_post_meta(
        &mut self,
        post_id: &PostIds,
        post_slug: &str,
        published_date: NaiveDate,
    ) -> Result<bool> {
        let ids_changed = post_id
            .iter()
            .any(|(env, id)| self.post_id.get(env) != Some(id));
        let slug_changed = self.post_slug.as_deref() != Some(post_slug);
        let date_changed = self.published_date != Some(published_date);

        if !(ids_changed || slug_changed || date_changed) {
            return Ok(false);
        }

        let current_meta = frontmatter::extract(&self.markdown_content)?.meta;

        let mut merged = self.post_id.clone();
        merged.extend(post_id.iter().map(|(env, id)| (env.clone(), *id)));

        let mut fields = Mapping::new();
        fields.insert("id".into(), Value::Mapping(ids_to_mapping(&merged)));
        fields.insert("slug".into(), post_slug.into());
        fields.insert(
            date_key(current_meta.as_ref()).into(),
            published_date.format(DATE_FORMAT).to_string().into(),
        );
        let markdown_content = frontmatter::inject(&self.markdown_content, &fields, true)?;

        self.post_id = merged;
        self.post_slug = Some(post_slug.to_string());
        self.published_date = Some(published_date);
        self.markdown_content = markdown_content;

        tracing::debug!(title = %self.post_title, "post metadata updated");
        Ok(true)
    }
}
