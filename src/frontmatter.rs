//! Split and rewrite the YAML metadata block at the top of a markdown post.
//!
//! A post may start with a metadata block delimited by two `---` lines:
//!
//! ```markdown
//! ---
//! title: Hello
//! category: Misc
//! ---
//!
//! [summary]
//! The summary paragraph.
//!
//! The rest of the post.
//! ```
//!
//! [`extract`] separates the block from the body, [`extract_summary`] pulls the
//! `[summary]` paragraph out of the body and [`inject`] writes new metadata back
//! while keeping the body byte for byte.

use serde_yaml::{Mapping, Value};

use crate::error::{PblogError, Result};

/// Line opening and closing the metadata block
pub const DELIMITER: &str = "---";

/// Line announcing an explicit summary paragraph
pub const SUMMARY_TAG: &str = "[summary]";

/// Metadata and body lines split out of a raw post
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    /// Parsed metadata block, `None` when there is no block or it is empty
    pub meta: Option<Value>,
    /// Lines following the block
    pub body: Vec<String>,
}

/// Parse content into optional YAML metadata and body lines.
///
/// Without a leading `---` line the whole text is body. A block missing its
/// closing delimiter runs to the end of the text. Blank lines directly after
/// the closing delimiter are not part of the body.
pub fn extract(raw: &str) -> Result<Extracted> {
    let mut lines = raw.lines();

    if lines.next() != Some(DELIMITER) {
        return Ok(Extracted {
            meta: None,
            body: raw.lines().map(str::to_string).collect(),
        });
    }

    let mut meta_lines = Vec::new();
    let mut body = Vec::new();
    let mut inside_meta = true;

    for line in lines {
        if inside_meta {
            if line == DELIMITER {
                inside_meta = false;
            } else {
                meta_lines.push(line);
            }
        } else if !body.is_empty() || !line.trim().is_empty() {
            body.push(line.to_string());
        }
    }

    let meta = parse_block(&meta_lines.join("\n"))?;

    Ok(Extracted { meta, body })
}

fn parse_block(text: &str) -> Result<Option<Value>> {
    let value: Value = serde_yaml::from_str(text).map_err(|e| PblogError::MetadataParse {
        reason: e.to_string(),
    })?;

    Ok(if value.is_null() { None } else { Some(value) })
}

/// Pull the `[summary]` paragraph out of body lines.
///
/// Every non-blank line after the tag up to the next blank line is summary
/// text; the tag, those lines and the terminating blank line are removed from
/// the body. Returns `None` when no tag is present so the caller can fall back
/// to the first rendered paragraph.
pub fn extract_summary(body: Vec<String>) -> (Option<String>, Vec<String>) {
    let mut inside_summary = false;
    let mut summary = Vec::new();
    let mut remaining = Vec::with_capacity(body.len());

    for line in body {
        if line.trim() == SUMMARY_TAG {
            inside_summary = true;
            continue;
        }
        if inside_summary && line.trim().is_empty() {
            inside_summary = false;
            continue;
        }

        if inside_summary {
            summary.push(line);
        } else {
            remaining.push(line);
        }
    }

    if summary.is_empty() {
        (None, remaining)
    } else {
        (Some(summary.join("\n")), remaining)
    }
}

/// Merge `fields` into the metadata block of `raw` and return the new text.
///
/// With `update` set, existing keys not named in `fields` are kept and keys in
/// both are overwritten; otherwise the block is replaced by `fields`. A block
/// is created when the text has none. The body is preserved verbatim.
pub fn inject(raw: &str, fields: &Mapping, update: bool) -> Result<String> {
    let split = split_block(raw);
    let has_block = split.is_some();
    let (existing, body) = match split {
        Some((block, body)) => (block_mapping(&block)?, body),
        None => (None, raw),
    };

    let mut meta = if update {
        existing.unwrap_or_default()
    } else {
        Mapping::new()
    };
    for (key, value) in fields {
        meta.insert(key.clone(), value.clone());
    }

    let eol = line_ending(raw);
    let mut yaml = serde_yaml::to_string(&Value::Mapping(meta))?;
    if eol != "\n" {
        yaml = yaml.replace('\n', eol);
    }

    let mut out = String::with_capacity(raw.len() + yaml.len() + 8);
    out.push_str(DELIMITER);
    out.push_str(eol);
    out.push_str(&yaml);
    out.push_str(DELIMITER);
    out.push_str(eol);
    if !has_block && !body.is_empty() {
        out.push_str(eol);
    }
    out.push_str(body);

    Ok(out)
}

fn block_mapping(block: &str) -> Result<Option<Mapping>> {
    match parse_block(block)? {
        None => Ok(None),
        Some(Value::Mapping(mapping)) => Ok(Some(mapping)),
        Some(_) => Err(PblogError::MetadataParse {
            reason: "metadata block is not a mapping".to_string(),
        }),
    }
}

/// Split raw text into the metadata block contents and the untouched rest.
fn split_block(raw: &str) -> Option<(String, &str)> {
    let mut segments = raw.split_inclusive('\n');
    let first = segments.next()?;
    if strip_eol(first) != DELIMITER {
        return None;
    }

    let mut offset = first.len();
    let mut block = Vec::new();
    for segment in segments {
        offset += segment.len();
        let line = strip_eol(segment);
        if line == DELIMITER {
            return Some((block.join("\n"), &raw[offset..]));
        }
        block.push(line);
    }

    Some((block.join("\n"), ""))
}

/// Line ending of the first line of `raw`, `\n` when it has none
fn line_ending(raw: &str) -> &'static str {
    match raw.split_once('\n') {
        Some((first, _)) if first.ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

fn strip_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
