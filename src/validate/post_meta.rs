//! Schema of the metadata block of a post

use std::collections::BTreeMap;

use chrono::NaiveDate;
use lazy_regex::{Lazy, Regex};
use serde_yaml::{Mapping, Value};

use super::{DATE_FORMAT, FieldDefault, FieldRule, FieldType, Schema, ids_to_mapping};
use crate::error::{Result, package_error, validation_failed};

/// Remote post ids keyed by environment name.
///
/// A key with a `None` value names an environment the post is known to but
/// that has not assigned an id yet; an environment without a key is unknown.
pub type PostIds = BTreeMap<String, Option<i64>>;

/// Pattern a post slug must match
pub static SLUG_REGEX: Lazy<Regex> = lazy_regex::lazy_regex!(r"^[A-Za-z0-9_-]+$");

/// Metadata block keys for the publication date, preferred spelling first
pub const DATE_KEYS: [&str; 2] = ["published_date", "date"];

pub static POST_SCHEMA: Schema = Schema {
    fields: &[
        FieldRule {
            name: "id",
            aliases: &[],
            kind: FieldType::IdMap,
            required: false,
            nullable: false,
            default: FieldDefault::EmptyMap,
            pattern: None,
        },
        FieldRule {
            name: "title",
            aliases: &[],
            kind: FieldType::String,
            required: true,
            nullable: false,
            default: FieldDefault::Absent,
            pattern: None,
        },
        FieldRule {
            name: "slug",
            aliases: &[],
            kind: FieldType::String,
            required: false,
            nullable: true,
            default: FieldDefault::Null,
            pattern: Some(&SLUG_REGEX),
        },
        FieldRule {
            name: "category",
            aliases: &["topic"],
            kind: FieldType::String,
            required: true,
            nullable: false,
            default: FieldDefault::Absent,
            pattern: None,
        },
        FieldRule {
            name: "published_date",
            aliases: &["date"],
            kind: FieldType::Date,
            required: false,
            nullable: true,
            default: FieldDefault::Null,
            pattern: None,
        },
    ],
};

/// Normalized post metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMeta {
    pub id: PostIds,
    pub title: String,
    pub slug: Option<String>,
    pub category: String,
    pub published_date: Option<NaiveDate>,
}

impl PostMeta {
    /// Normalized metadata as a YAML mapping using canonical key names
    pub fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::new();
        mapping.insert("id".into(), Value::Mapping(ids_to_mapping(&self.id)));
        mapping.insert("title".into(), self.title.clone().into());
        mapping.insert(
            "slug".into(),
            self.slug.clone().map_or(Value::Null, Value::String),
        );
        mapping.insert("category".into(), self.category.clone().into());
        mapping.insert(
            "published_date".into(),
            self.published_date.map_or(Value::Null, |d| {
                Value::String(d.format(DATE_FORMAT).to_string())
            }),
        );
        mapping
    }
}

/// Validate a post metadata block and apply defaults.
///
/// A missing block, or one that is not a mapping, has nothing to validate and
/// is reported as a package error rather than a validation error.
pub fn normalize_post_meta(meta: Option<&Value>) -> Result<PostMeta> {
    let Some(Value::Mapping(mapping)) = meta else {
        return Err(package_error("no metadata"));
    };

    let normalized = POST_SCHEMA
        .normalize(mapping)
        .map_err(|errors| validation_failed("Post metadata did not validate", errors))?;

    Ok(PostMeta {
        id: normalized.ids("id"),
        title: normalized.string("title").unwrap_or_default(),
        slug: normalized.string("slug"),
        category: normalized.string("category").unwrap_or_default(),
        published_date: normalized.date("published_date"),
    })
}

/// Key the publication date should be written under for this metadata block
pub fn date_key(meta: Option<&Value>) -> &'static str {
    let uses_alias = meta.is_some_and(|m| m.get(DATE_KEYS[1]).is_some() && m.get(DATE_KEYS[0]).is_none());
    if uses_alias { DATE_KEYS[1] } else { DATE_KEYS[0] }
}
