//! Schema of the `package.yml` manifest

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::{FieldDefault, FieldRule, FieldType, Schema};
use crate::error::{Result, package_error, validation_failed};

/// The manifest declares exactly these two fields
pub static PACKAGE_SCHEMA: Schema = Schema {
    fields: &[
        FieldRule {
            name: "post",
            aliases: &[],
            kind: FieldType::String,
            required: true,
            nullable: false,
            default: FieldDefault::Absent,
            pattern: None,
        },
        FieldRule {
            name: "encoding",
            aliases: &[],
            kind: FieldType::String,
            required: true,
            nullable: false,
            default: FieldDefault::Absent,
            pattern: None,
        },
    ],
};

/// Layout information stored at the root of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMeta {
    /// Archive member holding the markdown post
    pub post: String,
    /// Encoding label of the markdown post
    pub encoding: String,
}

impl PackageMeta {
    pub fn new(post: impl Into<String>, encoding: impl Into<String>) -> Self {
        Self {
            post: post.into(),
            encoding: encoding.into(),
        }
    }

    /// YAML text of the manifest
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Validate a parsed manifest document.
///
/// An absent or null document is reported as an empty manifest.
pub fn validate_package_meta(doc: Option<&Value>) -> Result<PackageMeta> {
    let mapping = match doc {
        None | Some(Value::Null) => return Err(package_error("package.yml file is empty")),
        Some(Value::Mapping(mapping)) => mapping,
        Some(_) => return Err(package_error("package.yml does not contain a mapping")),
    };

    let normalized = PACKAGE_SCHEMA
        .normalize(mapping)
        .map_err(|errors| validation_failed("Package metadata is not valid", errors))?;

    Ok(PackageMeta {
        post: normalized.string("post").unwrap_or_default(),
        encoding: normalized.string("encoding").unwrap_or_default(),
    })
}
