//! Resolution: pick one raw value per field from an ordered list of sources
//! and write it into the field's slot.
//!
//! For each field, in order:
//!
//! 1. Query the sources in priority order (first = highest). The first one
//!    that has the key wins and later sources are not asked.
//! 2. With no hit, a `required` field fails; any other field takes its
//!    declared default (possibly none).
//! 3. A non-empty value is coerced into the slot. An empty value leaves the
//!    field as it is.
//!
//! Operates on already-extracted fields and already-built sources, so the
//! whole pass is testable with synthetic inputs and no I/O.

use tracing::{debug, trace};

use crate::error::ConfError;
use crate::fields::Field;
use crate::source::Source;

/// Resolve every field against `sources`, stopping at the first failure.
pub fn resolve_fields(fields: &mut [Field<'_>], sources: &[&dyn Source]) -> Result<(), ConfError> {
    for field in fields.iter_mut() {
        let found = sources
            .iter()
            .find_map(|source| source.get(field.key()).map(|value| (source.name(), value)));

        let value = match found {
            Some((origin, value)) => {
                debug!(field = field.flag_name(), source = origin, "resolved");
                value
            }
            None if field.options().required() => {
                return Err(ConfError::RequiredFieldMissing {
                    field: field.name().to_string(),
                });
            }
            None => match field.options().default_value() {
                Some(default) => {
                    debug!(field = field.flag_name(), source = "default", "resolved");
                    default.to_string()
                }
                None => continue,
            },
        };

        if field.options().no_print() {
            trace!(field = field.flag_name(), "assigning <hidden>");
        } else {
            trace!(field = field.flag_name(), value = %value, "assigning");
        }

        if !value.is_empty() {
            field.assign(&value)?;
        }
    }
    Ok(())
}
