//! Text decoding and encoding by WHATWG encoding label.
//!
//! The codec never guesses an encoding: the label given by the caller or the
//! package manifest is used as-is and malformed input is an error.

use encoding_rs::Encoding;

use crate::error::{PblogError, Result};

/// Encoding used when none is given
pub const DEFAULT_ENCODING: &str = "utf-8";

fn lookup(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| PblogError::UnknownEncoding {
        encoding: label.to_string(),
    })
}

/// Decode `bytes` as text in the encoding named by `label`.
pub fn decode(bytes: &[u8], label: &str) -> Result<String> {
    let encoding = lookup(label)?;
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| PblogError::Decode {
            encoding: label.to_string(),
        })
}

/// Encode `text` in the encoding named by `label`.
///
/// Characters the encoding cannot represent are an error. Encodings that
/// cannot be written (UTF-16 and replacement) are written as UTF-8 by the
/// underlying library, so they are refused here.
pub fn encode(text: &str, label: &str) -> Result<Vec<u8>> {
    let encoding = lookup(label)?;
    if encoding.output_encoding() != encoding {
        return Err(PblogError::Encode {
            encoding: label.to_string(),
        });
    }

    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(PblogError::Encode {
            encoding: label.to_string(),
        });
    }
    Ok(bytes.into_owned())
}
