//! Error types and handling for pblog
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Errors fall into two groups:
//! - the package family ([`PblogError::is_package_error`]): container, metadata
//!   and resource problems found while building or reading a package
//! - plain I/O and encoding failures
//!
//! Validation and resource errors are accumulated before being raised, so a
//! caller always receives the complete list of problems at once.

pub mod fields;

pub use fields::FieldErrors;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for pblog operations
#[derive(Error, Diagnostic, Debug)]
pub enum PblogError {
    // Package errors
    #[error("{message}")]
    #[diagnostic(code(pblog::package::invalid))]
    Package { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(pblog::package::validation_failed),
        help("Fix the listed fields in the metadata block and try again")
    )]
    Validation {
        message: String,
        errors: FieldErrors,
    },

    #[error("Some resources could not be found: {}", .resources.join(", "))]
    #[diagnostic(
        code(pblog::package::resources_not_found),
        help("Resource paths are resolved relative to the markdown file")
    )]
    ResourcesNotFound { resources: Vec<String> },

    #[error("Metadata block is not valid YAML: {reason}")]
    #[diagnostic(
        code(pblog::metadata::parse_failed),
        help("The block between the two `---` lines must be a YAML mapping")
    )]
    MetadataParse { reason: String },

    // Encoding errors
    #[error("Document could not be interpreted with {encoding}")]
    #[diagnostic(code(pblog::encoding::decode_failed))]
    Decode { encoding: String },

    #[error("Unknown encoding {encoding}")]
    #[diagnostic(
        code(pblog::encoding::unknown),
        help("Use a WHATWG encoding label such as utf-8 or iso-8859-1")
    )]
    UnknownEncoding { encoding: String },

    #[error("Text cannot be represented in {encoding}")]
    #[diagnostic(code(pblog::encoding::encode_failed))]
    Encode { encoding: String },

    // Resource errors
    #[error("Resource path {path} must be relative")]
    #[diagnostic(code(pblog::resource::absolute_path))]
    AbsoluteResourcePath { path: String },

    #[error("Root resource path {path} is not a directory")]
    #[diagnostic(code(pblog::resource::not_a_directory))]
    NotADirectory { path: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(pblog::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(pblog::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(pblog::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(pblog::fs::io_error))]
    IoError { message: String },

    // CLI errors
    #[error("{message}")]
    #[diagnostic(code(pblog::cli::invalid_argument))]
    InvalidArgument { message: String },
}

impl PblogError {
    /// Whether this error belongs to the package family of failures.
    pub fn is_package_error(&self) -> bool {
        matches!(
            self,
            PblogError::Package { .. }
                | PblogError::Validation { .. }
                | PblogError::ResourcesNotFound { .. }
                | PblogError::MetadataParse { .. }
        )
    }

    /// Structured `field -> messages` payload for errors tied to named fields.
    ///
    /// Encoding failures are reported against the `encoding` field.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            PblogError::Validation { errors, .. } => Some(errors.clone()),
            PblogError::Decode { encoding } => Some(FieldErrors::single(
                "encoding",
                format!("document could not be interpreted with {}", encoding),
            )),
            PblogError::UnknownEncoding { encoding } => Some(FieldErrors::single(
                "encoding",
                format!("unknown encoding {}", encoding),
            )),
            PblogError::Encode { encoding } => Some(FieldErrors::single(
                "encoding",
                format!("text cannot be represented in {}", encoding),
            )),
            _ => None,
        }
    }
}

/// Creates a generic package error
pub fn package_error(message: impl Into<String>) -> PblogError {
    PblogError::Package {
        message: message.into(),
    }
}

/// Creates a validation error carrying every field error found
pub fn validation_failed(message: impl Into<String>, errors: FieldErrors) -> PblogError {
    PblogError::Validation {
        message: message.into(),
        errors,
    }
}

impl From<std::io::Error> for PblogError {
    fn from(err: std::io::Error) -> Self {
        PblogError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for PblogError {
    fn from(err: serde_yaml::Error) -> Self {
        PblogError::MetadataParse {
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, PblogError>;
