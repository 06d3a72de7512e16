//! Per-field annotation parsing.
//!
//! An annotation is a comma-separated list of tokens. Bare tokens are flags
//! (`required`, `noprint`); `key:value` tokens carry a value (`short:p`,
//! `default:8080`, `help:text`). Unknown tokens are ignored. The literal `-`
//! excludes a member entirely and is handled by the schema walker, not here.

use thiserror::Error;

/// Marker annotation that removes a member from the schema.
pub const EXCLUDE: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("tag {tag:?} missing a value")]
    MissingValue { tag: String },

    #[error("short value must be a single character, got {value:?}")]
    InvalidShort { value: String },

    #[error("cannot set both `required` and `default`")]
    MutuallyExclusive,
}

/// Parsed options for one field.
///
/// `required` and a default value never coexist: the only way to build a
/// populated `FieldOptions` is [`FieldOptions::parse`], which rejects the
/// combination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    short: Option<char>,
    help: Option<String>,
    default: Option<String>,
    no_print: bool,
    required: bool,
}

impl FieldOptions {
    /// Parse an annotation string. Tokens are processed left to right and the
    /// first error wins.
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let mut opts = FieldOptions::default();
        if tag.is_empty() {
            return Ok(opts);
        }

        for token in tag.split(',') {
            match token.split_once(':') {
                None => match token {
                    "noprint" => opts.no_print = true,
                    "required" => opts.required = true,
                    _ => {}
                },
                Some((name, value)) => {
                    let value = value.trim();
                    if value.is_empty() {
                        return Err(TagError::MissingValue { tag: name.into() });
                    }
                    match name {
                        "short" => {
                            let mut chars = value.chars();
                            match (chars.next(), chars.next()) {
                                (Some(c), None) => opts.short = Some(c),
                                _ => {
                                    return Err(TagError::InvalidShort {
                                        value: value.into(),
                                    });
                                }
                            }
                        }
                        "default" => opts.default = Some(value.into()),
                        "help" => opts.help = Some(value.into()),
                        _ => {}
                    }
                }
            }
        }

        if opts.required && opts.default.is_some() {
            return Err(TagError::MutuallyExclusive);
        }
        Ok(opts)
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The declared default, still as text.
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn no_print(&self) -> bool {
        self.no_print
    }

    pub fn required(&self) -> bool {
        self.required
    }
}
