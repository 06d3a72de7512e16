//! Schema extraction: walking a settings record into an ordered list of
//! addressable leaf fields.
//!
//! A record describes its members to a [`Schema`] in declaration order. The
//! schema derives each member's key from the current prefix plus the member's
//! name, parses its annotation, and either recurses (nested records) or
//! records a [`Field`] holding a mutable borrow of the leaf. The resulting
//! list is depth-first with children in their parent's position, and is
//! rebuilt on every call.

use std::fmt;

use crate::coerce;
use crate::error::ConfError;
use crate::names;
use crate::options::{EXCLUDE, FieldOptions};
use crate::value::{Kind, Value};

/// A configuration record.
///
/// ```ignore
/// impl Settings for ServerConfig {
///     fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
///         schema.field("host", "default:localhost", &mut self.host)?;
///         schema.field("port", "short:p,default:8080", &mut self.port)?;
///         schema.nested("tls", "", &mut self.tls)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Settings {
    /// Describe every settable member, in declaration order.
    fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError>;

    /// A record that decodes itself from a single string returns its leaf
    /// view here. It is then treated as one field and never recursed into.
    fn as_value(&mut self) -> Option<&mut dyn Value> {
        None
    }
}

impl<S: Settings + ?Sized> Settings for Box<S> {
    fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
        (**self).describe(schema)
    }

    fn as_value(&mut self) -> Option<&mut dyn Value> {
        (**self).as_value()
    }
}

/// One leaf configuration slot.
pub struct Field<'a> {
    name: String,
    key: Vec<String>,
    flag_name: String,
    env_name: String,
    is_bool: bool,
    options: FieldOptions,
    slot: &'a mut dyn Value,
}

impl<'a> Field<'a> {
    /// The member's declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hierarchical key, root to leaf. Never empty.
    pub fn key(&self) -> &[String] {
        &self.key
    }

    pub fn flag_name(&self) -> &str {
        &self.flag_name
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn is_bool(&self) -> bool {
        self.is_bool
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn kind(&self) -> Kind {
        self.slot.kind()
    }

    pub fn element_kind(&self) -> Option<Kind> {
        self.slot.element_kind()
    }

    pub fn type_name(&self) -> &'static str {
        self.slot.type_name()
    }

    /// The slot's current value, `None` when unset.
    pub fn display(&self) -> Option<String> {
        self.slot.display()
    }

    /// Coerce `raw` into the slot, wrapping failures with field context.
    pub fn assign(&mut self, raw: &str) -> Result<(), ConfError> {
        coerce::assign(self.slot, raw).map_err(|source| ConfError::Coerce {
            field: self.name.clone(),
            type_name: self.slot.type_name(),
            value: raw.to_string(),
            source,
        })
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("flag_name", &self.flag_name)
            .field("env_name", &self.env_name)
            .field("is_bool", &self.is_bool)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Visitor a [`Settings`] record describes its members to.
pub struct Schema<'a> {
    prefix: Vec<String>,
    fields: Vec<Field<'a>>,
}

impl<'a> Schema<'a> {
    fn new() -> Self {
        Self {
            prefix: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// A leaf member.
    pub fn field<V: Value>(
        &mut self,
        name: &str,
        tag: &str,
        slot: &'a mut V,
    ) -> Result<(), ConfError> {
        let Some((key, options)) = self.member(name, tag)? else {
            return Ok(());
        };
        self.push(name, key, options, slot)
    }

    /// A named nested record; its members are keyed under this member's name.
    pub fn nested<S: Settings + ?Sized>(
        &mut self,
        name: &str,
        tag: &str,
        record: &'a mut S,
    ) -> Result<(), ConfError> {
        self.record(name, tag, record, false)
    }

    /// An embedded record; its members merge into the enclosing namespace.
    pub fn embedded<S: Settings + ?Sized>(
        &mut self,
        name: &str,
        tag: &str,
        record: &'a mut S,
    ) -> Result<(), ConfError> {
        self.record(name, tag, record, true)
    }

    /// An optional nested record. An unset record is allocated with its
    /// default so its members can be resolved.
    pub fn optional<S: Settings + Default>(
        &mut self,
        name: &str,
        tag: &str,
        record: &'a mut Option<S>,
    ) -> Result<(), ConfError> {
        if tag == EXCLUDE {
            return Ok(());
        }
        let record = record.get_or_insert_with(S::default);
        self.record(name, tag, record, false)
    }

    /// Derive the key and parse options, or `None` for an excluded member.
    fn member(
        &self,
        name: &str,
        tag: &str,
    ) -> Result<Option<(Vec<String>, FieldOptions)>, ConfError> {
        if tag == EXCLUDE {
            return Ok(None);
        }
        let mut key = self.prefix.clone();
        key.extend(names::split_words(name));
        let options = FieldOptions::parse(tag).map_err(|source| ConfError::InvalidTag {
            field: name.to_string(),
            source,
        })?;
        Ok(Some((key, options)))
    }

    fn record<S: Settings + ?Sized>(
        &mut self,
        name: &str,
        tag: &str,
        record: &'a mut S,
        embedded: bool,
    ) -> Result<(), ConfError> {
        let Some((key, options)) = self.member(name, tag)? else {
            return Ok(());
        };

        if record.as_value().is_some() {
            if let Some(value) = record.as_value() {
                self.push(name, key, options, value)?;
            }
            return Ok(());
        }

        let inner = if embedded { self.prefix.clone() } else { key };
        let outer = std::mem::replace(&mut self.prefix, inner);
        let result = record.describe(self);
        self.prefix = outer;
        result
    }

    fn push(
        &mut self,
        name: &str,
        key: Vec<String>,
        options: FieldOptions,
        slot: &'a mut dyn Value,
    ) -> Result<(), ConfError> {
        if key.is_empty() {
            return Err(ConfError::EmptyKey { field: name.into() });
        }
        self.fields.push(Field {
            name: name.to_string(),
            flag_name: names::flag_name(&key),
            env_name: names::env_name(&key),
            is_bool: slot.kind() == Kind::Bool,
            key,
            options,
            slot,
        });
        Ok(())
    }
}

/// Walk `target` into its ordered leaf fields.
///
/// Fails with [`ConfError::InvalidTarget`] when the root decodes itself from a
/// single string, and with the first annotation error encountered otherwise.
pub fn extract_fields<S: Settings + ?Sized>(target: &mut S) -> Result<Vec<Field<'_>>, ConfError> {
    if target.as_value().is_some() {
        return Err(ConfError::InvalidTarget);
    }
    let mut schema = Schema::new();
    target.describe(&mut schema)?;
    Ok(schema.fields)
}
