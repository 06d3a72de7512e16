use std::path::PathBuf;

use thiserror::Error;

use crate::flatten::FlattenError;
use crate::options::TagError;

/// Boxed error returned by self-decoding values and built-in coercions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ConfError {
    #[error("configuration target must be a settings record, not a self-decoding value")]
    InvalidTarget,

    #[error("error parsing tags for field {field}: {source}")]
    InvalidTag { field: String, source: TagError },

    #[error("field '{field}' derives an empty key")]
    EmptyKey { field: String },

    #[error("no settable fields found in configuration")]
    NoFieldsFound,

    #[error("bad flag syntax: {0}")]
    FlagSyntax(String),

    #[error("flag provided but not defined: -{0}")]
    UndefinedFlag(String),

    #[error("flag needs an argument: -{0}")]
    MissingArgument(String),

    #[error("argument is not valid Unicode: {0}")]
    NonUnicodeArgument(String),

    #[error("help requested")]
    HelpRequested,

    #[error("required field {field} is missing value")]
    RequiredFieldMissing { field: String },

    #[error(
        "error assigning to field {field}: converting '{value}' to type {type_name}. details: {source}"
    )]
    Coerce {
        field: String,
        type_name: &'static str,
        value: String,
        source: BoxError,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Flatten(#[from] FlattenError),

    #[error("unknown configuration key '{key}'")]
    UnknownKey { key: String },
}

impl ConfError {
    /// True for the `-h`/`--help` control signal, which callers should answer
    /// with usage text rather than report as a failure.
    pub fn is_help(&self) -> bool {
        matches!(self, ConfError::HelpRequested)
    }
}
