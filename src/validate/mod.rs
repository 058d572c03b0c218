//! Declarative metadata schemas with defaulting.
//!
//! A [`Schema`] is a static table of [`FieldRule`]s. [`Schema::normalize`]
//! checks a YAML mapping against it and either returns the [`Normalized`]
//! fields, with defaults applied for absent optional fields, or every
//! problem found keyed by field name. It never stops at the first error.
//!
//! Two schemas are defined on top of this:
//! - [`package_meta`]: the `package.yml` manifest of a package
//! - [`post_meta`]: the metadata block of a markdown post

pub mod package_meta;
pub mod post_meta;

pub use package_meta::{PACKAGE_SCHEMA, PackageMeta, validate_package_meta};
pub use post_meta::{POST_SCHEMA, PostIds, PostMeta, normalize_post_meta};

use std::collections::BTreeMap;

use chrono::NaiveDate;
use lazy_regex::{Lazy, Regex};
use serde_yaml::{Mapping, Value};

use crate::error::FieldErrors;

/// Date format accepted for date fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Expected type of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Date,
    /// Mapping of string keys to nullable integers
    IdMap,
}

impl FieldType {
    fn type_error(self) -> &'static str {
        match self {
            FieldType::String => "must be of string type",
            FieldType::Date => "must be of date type",
            FieldType::IdMap => "must be of dict type",
        }
    }
}

/// Value given to an optional field when it is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Leave the field out of the normalized result
    Absent,
    Null,
    EmptyMap,
}

/// Rules for one field of a schema
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    /// Alternative spellings accepted in input, normalized to `name`
    pub aliases: &'static [&'static str],
    pub kind: FieldType,
    pub required: bool,
    pub nullable: bool,
    pub default: FieldDefault,
    /// Regular expression a string value must match
    pub pattern: Option<&'static Lazy<Regex>>,
}

/// A set of field rules; fields not listed are rejected
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldRule],
}

/// A field value after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    String(String),
    Date(NaiveDate),
    IdMap(BTreeMap<String, Option<i64>>),
}

/// Convert an id map to YAML, absent ids written as `null`
pub fn ids_to_mapping(ids: &BTreeMap<String, Option<i64>>) -> Mapping {
    ids.iter()
        .map(|(env, id)| {
            let value = match id {
                Some(n) => Value::Number((*n).into()),
                None => Value::Null,
            };
            (Value::String(env.clone()), value)
        })
        .collect()
}

/// Validated fields in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    fields: Vec<(&'static str, FieldValue)>,
}

impl Normalized {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn string(&self, name: &str) -> Option<String> {
        match self.get(name) {
            Some(FieldValue::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.get(name) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn ids(&self, name: &str) -> BTreeMap<String, Option<i64>> {
        match self.get(name) {
            Some(FieldValue::IdMap(ids)) => ids.clone(),
            _ => BTreeMap::new(),
        }
    }
}

impl Schema {
    /// Validate `doc` and apply defaults.
    ///
    /// Unknown keys, missing required fields, type and pattern mismatches are
    /// all collected before returning.
    pub fn normalize(&self, doc: &Mapping) -> Result<Normalized, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut normalized = Normalized::default();

        for key in doc.keys() {
            let known = key.as_str().is_some_and(|k| self.rule_for(k).is_some());
            if !known {
                errors.push(describe_key(key), "unknown field");
            }
        }

        for rule in self.fields {
            let mut spellings = std::iter::once(rule.name)
                .chain(rule.aliases.iter().copied())
                .filter_map(|spelling| doc.get(spelling).map(|value| (spelling, value)));

            let Some((spelling, value)) = spellings.next() else {
                if rule.required {
                    errors.push(rule.name, "required field");
                } else {
                    match rule.default {
                        FieldDefault::Absent => {}
                        FieldDefault::Null => normalized.fields.push((rule.name, FieldValue::Null)),
                        FieldDefault::EmptyMap => normalized
                            .fields
                            .push((rule.name, FieldValue::IdMap(BTreeMap::new()))),
                    }
                }
                continue;
            };

            if let Some((other, _)) = spellings.next() {
                errors.push(
                    rule.name,
                    format!("'{}' conflicts with '{}'", spelling, other),
                );
                continue;
            }

            match check_value(rule, value) {
                Ok(field_value) => normalized.fields.push((rule.name, field_value)),
                Err(messages) => {
                    for message in messages {
                        errors.push(rule.name, message);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }

    fn rule_for(&self, key: &str) -> Option<&FieldRule> {
        self.fields
            .iter()
            .find(|rule| rule.name == key || rule.aliases.contains(&key))
    }
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| "<key>".to_string()),
    }
}

fn check_value(rule: &FieldRule, value: &Value) -> Result<FieldValue, Vec<String>> {
    if value.is_null() {
        return if rule.nullable {
            Ok(FieldValue::Null)
        } else {
            Err(vec!["null value not allowed".to_string()])
        };
    }

    match (rule.kind, value) {
        (FieldType::String, Value::String(s)) => {
            if rule.required && s.trim().is_empty() {
                return Err(vec!["empty values not allowed".to_string()]);
            }
            if let Some(pattern) = rule.pattern {
                if !pattern.is_match(s) {
                    return Err(vec![format!(
                        "value does not match regex '{}'",
                        pattern.as_str()
                    )]);
                }
            }
            Ok(FieldValue::String(s.clone()))
        }
        (FieldType::Date, Value::String(s)) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(FieldValue::Date)
            .map_err(|_| vec![rule.kind.type_error().to_string()]),
        (FieldType::IdMap, Value::Mapping(mapping)) => check_id_map(mapping).map(FieldValue::IdMap),
        (kind, _) => Err(vec![kind.type_error().to_string()]),
    }
}

fn check_id_map(mapping: &Mapping) -> Result<BTreeMap<String, Option<i64>>, Vec<String>> {
    let mut ids = BTreeMap::new();
    let mut messages = Vec::new();

    for (key, value) in mapping {
        let Some(env) = key.as_str() else {
            messages.push(format!(
                "key {} must be of string type",
                describe_key(key)
            ));
            continue;
        };

        match value {
            Value::Null => {
                ids.insert(env.to_string(), None);
            }
            Value::Number(n) if n.as_i64().is_some() => {
                ids.insert(env.to_string(), n.as_i64());
            }
            _ => messages.push(format!("value of '{}' must be of integer type", env)),
        }
    }

    if messages.is_empty() {
        Ok(ids)
    } else {
        Err(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static LOWER_REGEX: Lazy<Regex> = lazy_regex::lazy_regex!("^[a-z]+$");

    static TEST_SCHEMA: Schema = Schema {
        fields: &[
            FieldRule {
                name: "name",
                aliases: &["label"],
                kind: FieldType::String,
                required: true,
                nullable: false,
                default: FieldDefault::Absent,
                pattern: Some(&LOWER_REGEX),
            },
            FieldRule {
                name: "when",
                aliases: &[],
                kind: FieldType::Date,
                required: false,
                nullable: true,
                default: FieldDefault::Null,
                pattern: None,
            },
        ],
    };

    fn doc(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let normalized = TEST_SCHEMA.normalize(&doc("name: abc")).unwrap();
        assert_eq!(normalized.string("name").as_deref(), Some("abc"));
        assert_eq!(normalized.get("when"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_alias_normalized_to_name() {
        let normalized = TEST_SCHEMA.normalize(&doc("label: abc")).unwrap();
        assert_eq!(normalized.string("name").as_deref(), Some("abc"));
    }

    #[test]
    fn test_alias_conflict() {
        let errors = TEST_SCHEMA.normalize(&doc("name: abc\nlabel: def")).unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            &["'name' conflicts with 'label'".to_string()]
        );
    }

    #[test]
    fn test_all_errors_collected() {
        let errors = TEST_SCHEMA
            .normalize(&doc("when: someday\nextra: 1"))
            .unwrap_err();
        assert_eq!(errors.get("name").unwrap(), &["required field".to_string()]);
        assert_eq!(
            errors.get("when").unwrap(),
            &["must be of date type".to_string()]
        );
        assert_eq!(errors.get("extra").unwrap(), &["unknown field".to_string()]);
    }

    #[test]
    fn test_pattern_mismatch() {
        let errors = TEST_SCHEMA.normalize(&doc("name: ABC")).unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            &["value does not match regex '^[a-z]+$'".to_string()]
        );
    }

    #[test]
    fn test_null_not_allowed() {
        let errors = TEST_SCHEMA.normalize(&doc("name: null")).unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            &["null value not allowed".to_string()]
        );
    }

    #[test]
    fn test_empty_required_string() {
        let errors = TEST_SCHEMA.normalize(&doc("name: ''")).unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            &["empty values not allowed".to_string()]
        );
    }

    #[test]
    fn test_fields_kept_in_schema_order() {
        let normalized = TEST_SCHEMA
            .normalize(&doc("when: 2020-01-02\nname: abc"))
            .unwrap();
        assert_eq!(
            normalized.fields,
            vec![
                ("name", FieldValue::String("abc".to_string())),
                ("when", FieldValue::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())),
            ]
        );
    }
}
