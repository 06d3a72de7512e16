//! Rendering a resolved record as `ENV_NAME=value` pairs.

use crate::error::ConfError;
use crate::fields::{Field, Settings, extract_fields};

/// Placeholder for an optional value that is unset.
pub const NOT_SET: &str = "<not set>";

/// `ENV_NAME=value` for every printable field, in field order, separated by
/// single spaces. Fields marked `noprint` are left out.
pub fn stringify(fields: &[Field<'_>]) -> String {
    fields
        .iter()
        .filter(|f| !f.options().no_print())
        .map(|f| {
            let value = f.display().unwrap_or_else(|| NOT_SET.to_string());
            format!("{}={}", f.env_name(), value)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract `target`'s fields and [`stringify`] them.
pub fn to_string<S: Settings + ?Sized>(target: &mut S) -> Result<String, ConfError> {
    let fields = extract_fields(target)?;
    Ok(stringify(&fields))
}
