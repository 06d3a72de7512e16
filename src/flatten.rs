//! Custom serde Serializer that flattens any `Serialize` value into keyed
//! string values, and [`SerdeSource`], which serves them as a [`Source`].
//!
//! Structs and maps are recursed into, building a member path; scalars are
//! rendered to the text the coercion layer parses back. `Option::None` is
//! reported as absent without requiring `#[serde(skip_serializing_if)]`, so a
//! clap-derived struct can be handed over whole and unset flags fall through
//! to the next source.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::ser::{self, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::coerce::SEQ_DELIMITER;
use crate::error::ConfError;
use crate::names;
use crate::source::Source;

/// Flatten a `Serialize` value into `(member path, rendered value)` pairs.
///
/// `None` values are represented as `(path, None)`. Sequences of scalars are
/// rendered comma-joined:
/// `Outer { database: Inner { hosts: ["a", "b"] } }` → `[(["database", "hosts"], Some("a,b"))]`
pub fn flatten<S: Serialize + ?Sized>(
    source: &S,
) -> Result<Vec<(Vec<String>, Option<String>)>, FlattenError> {
    let mut out = Vec::new();
    let serializer = FlattenSerializer {
        path: Vec::new(),
        out: &mut out,
    };
    source.serialize(serializer)?;
    Ok(out)
}

/// A value that has no flat `path = text` form, such as a sequence of tables.
#[derive(Debug, Error)]
#[error("cannot flatten value: {0}")]
pub struct FlattenError(String);

impl ser::Error for FlattenError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        FlattenError(msg.to_string())
    }
}

/// Any serializable value as a [`Source`], keyed by normalized member path.
///
/// `server.max_connections` in the value answers the field keyed
/// `["server", "max", "connections"]`. Used for `.toml` config files and for
/// programmatic overrides taken from a struct.
#[derive(Debug, Clone)]
pub struct SerdeSource {
    label: String,
    entries: HashMap<String, String>,
}

impl SerdeSource {
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, ConfError> {
        Self::labelled("serde", value)
    }

    /// Parse TOML text as read from `path`.
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfError> {
        let table: toml::Table = toml::from_str(content).map_err(|e| ConfError::TomlParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::labelled("toml", &table)
    }

    fn labelled<T: Serialize + ?Sized>(label: &str, value: &T) -> Result<Self, ConfError> {
        let entries: HashMap<String, String> = flatten(value)?
            .into_iter()
            .filter_map(|(path, value)| Some((names::normalize_path(&path), value?)))
            .collect();
        debug!(source = label, count = entries.len(), "flattened structured source");
        Ok(Self {
            label: label.to_string(),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Source for SerdeSource {
    fn get(&self, key: &[String]) -> Option<String> {
        self.entries.get(&names::flag_name(key)).cloned()
    }

    fn name(&self) -> &str {
        &self.label
    }
}

struct FlattenSerializer<'a> {
    path: Vec<String>,
    out: &'a mut Vec<(Vec<String>, Option<String>)>,
}

impl FlattenSerializer<'_> {
    fn emit(self, value: String) -> Result<(), FlattenError> {
        self.out.push((self.path, Some(value)));
        Ok(())
    }
}

fn child(path: &[String], key: &str) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(key.to_string());
    path
}

macro_rules! emit_display {
    ($($method:ident: $t:ty),*) => {
        $(
            fn $method(self, v: $t) -> Result<(), Self::Error> {
                self.emit(v.to_string())
            }
        )*
    };
}

impl<'a> ser::Serializer for FlattenSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;
    type SerializeSeq = FlattenSeqSerializer<'a>;
    type SerializeTuple = FlattenSeqSerializer<'a>;
    type SerializeTupleStruct = FlattenSeqSerializer<'a>;
    type SerializeTupleVariant = FlattenSeqSerializer<'a>;
    type SerializeMap = FlattenMapSerializer<'a>;
    type SerializeStruct = FlattenStructSerializer<'a>;
    type SerializeStructVariant = FlattenStructSerializer<'a>;

    emit_display!(
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
        serialize_str: &str
    );

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Self::Error> {
        Err(FlattenError("bytes not supported".into()))
    }

    fn serialize_none(self) -> Result<(), Self::Error> {
        self.out.push((self.path, None));
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), Self::Error> {
        self.emit(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(FlattenSeqSerializer {
            path: self.path,
            out: self.out,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(FlattenMapSerializer {
            path: self.path,
            out: self.out,
            current_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(FlattenStructSerializer {
            path: self.path,
            out: self.out,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(FlattenStructSerializer {
            path: self.path,
            out: self.out,
        })
    }
}

// --- SerializeStruct ---

struct FlattenStructSerializer<'a> {
    path: Vec<String>,
    out: &'a mut Vec<(Vec<String>, Option<String>)>,
}

impl ser::SerializeStruct for FlattenStructSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        // private wrapper fields (e.g. TOML datetimes) stand for the value itself
        let path = if key.starts_with("$__") {
            self.path.clone()
        } else {
            child(&self.path, key)
        };
        value.serialize(FlattenSerializer {
            path,
            out: self.out,
        })
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FlattenStructSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// --- SerializeMap ---

struct FlattenMapSerializer<'a> {
    path: Vec<String>,
    out: &'a mut Vec<(Vec<String>, Option<String>)>,
    current_key: Option<String>,
}

impl ser::SerializeMap for FlattenMapSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
        self.current_key = Some(key.serialize(ScalarSerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| FlattenError("map value without a key".into()))?;
        value.serialize(FlattenSerializer {
            path: child(&self.path, &key),
            out: self.out,
        })
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// --- SerializeSeq (for Vec/array fields) ---

struct FlattenSeqSerializer<'a> {
    path: Vec<String>,
    out: &'a mut Vec<(Vec<String>, Option<String>)>,
    items: Vec<String>,
}

impl ser::SerializeSeq for FlattenSeqSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        let item = value.serialize(ScalarSerializer).map_err(|e| {
            FlattenError(format!("sequence element at {}: {}", self.path.join("."), e.0))
        })?;
        self.items.push(item);
        Ok(())
    }

    fn end(self) -> Result<(), Self::Error> {
        let joined = self.items.join(SEQ_DELIMITER.to_string().as_str());
        self.out.push((self.path, Some(joined)));
        Ok(())
    }
}

impl ser::SerializeTuple for FlattenSeqSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for FlattenSeqSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for FlattenSeqSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

// --- Scalar serializer (map keys and sequence elements) ---

struct ScalarSerializer;

fn not_scalar() -> FlattenError {
    FlattenError("expected a scalar value".into())
}

macro_rules! scalar_display {
    ($($method:ident: $t:ty),*) => {
        $(
            fn $method(self, v: $t) -> Result<String, Self::Error> {
                Ok(v.to_string())
            }
        )*
    };
}

impl ser::Serializer for ScalarSerializer {
    type Ok = String;
    type Error = FlattenError;
    type SerializeSeq = ser::Impossible<String, FlattenError>;
    type SerializeTuple = ser::Impossible<String, FlattenError>;
    type SerializeTupleStruct = ser::Impossible<String, FlattenError>;
    type SerializeTupleVariant = ser::Impossible<String, FlattenError>;
    type SerializeMap = ser::Impossible<String, FlattenError>;
    type SerializeStruct = ser::Impossible<String, FlattenError>;
    type SerializeStructVariant = ser::Impossible<String, FlattenError>;

    scalar_display!(
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
        serialize_str: &str
    );

    fn serialize_bytes(self, _: &[u8]) -> Result<String, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_none(self) -> Result<String, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_some<T: Serialize + ?Sized>(self, v: &T) -> Result<String, Self::Error> {
        v.serialize(self)
    }
    fn serialize_unit(self) -> Result<String, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<String, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        v: &'static str,
    ) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        v: &T,
    ) -> Result<String, Self::Error> {
        v.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<String, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(not_scalar())
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(not_scalar())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn path(dotted: &str) -> Vec<String> {
        dotted.split('.').map(String::from).collect()
    }

    fn some(path_str: &str, value: &str) -> (Vec<String>, Option<String>) {
        (path(path_str), Some(value.to_string()))
    }

    #[test]
    fn flat_struct() {
        #[derive(Serialize)]
        struct Args {
            host: String,
            port: u16,
        }
        let args = Args {
            host: "0.0.0.0".into(),
            port: 3000,
        };
        let pairs = flatten(&args).unwrap();
        assert_eq!(pairs, vec![some("host", "0.0.0.0"), some("port", "3000")]);
    }

    #[test]
    fn option_none_emits_none() {
        #[derive(Serialize)]
        struct Args {
            host: Option<String>,
        }
        let pairs = flatten(&Args { host: None }).unwrap();
        assert_eq!(pairs, vec![(path("host"), None)]);
    }

    #[test]
    fn nested_struct_and_map() {
        #[derive(Serialize)]
        struct Inner {
            url: String,
        }
        #[derive(Serialize)]
        struct Outer {
            database: Inner,
            labels: BTreeMap<String, bool>,
        }
        let mut labels = BTreeMap::new();
        labels.insert("fast".to_string(), true);
        let s = Outer {
            database: Inner {
                url: "pg://".into(),
            },
            labels,
        };
        let pairs = flatten(&s).unwrap();
        assert_eq!(
            pairs,
            vec![some("database.url", "pg://"), some("labels.fast", "true")]
        );
    }

    #[test]
    fn sequence_is_comma_joined() {
        #[derive(Serialize)]
        struct Args {
            ports: Vec<u16>,
        }
        let pairs = flatten(&Args {
            ports: vec![80, 443],
        })
        .unwrap();
        assert_eq!(pairs, vec![some("ports", "80,443")]);
    }

    #[test]
    fn sequence_of_tables_is_rejected() {
        #[derive(Serialize)]
        struct Item {
            name: String,
        }
        #[derive(Serialize)]
        struct Args {
            items: Vec<Item>,
        }
        let err = flatten(&Args {
            items: vec![Item { name: "a".into() }],
        })
        .unwrap_err();
        assert!(err.to_string().contains("items"));
    }

    #[test]
    fn unit_variant_serializes_as_string() {
        #[derive(Serialize)]
        enum Mode {
            Fast,
        }
        #[derive(Serialize)]
        struct Args {
            mode: Mode,
        }
        let pairs = flatten(&Args { mode: Mode::Fast }).unwrap();
        assert_eq!(pairs, vec![some("mode", "Fast")]);
    }

    #[test]
    fn source_matches_normalized_keys() {
        #[derive(Serialize)]
        struct Server {
            max_connections: u32,
        }
        #[derive(Serialize)]
        struct Args {
            server: Server,
            verbose: Option<bool>,
        }
        let source = SerdeSource::from_serialize(&Args {
            server: Server {
                max_connections: 64,
            },
            verbose: None,
        })
        .unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(
            source.get(&path("server.max.connections")).as_deref(),
            Some("64")
        );
        assert_eq!(source.get(&path("verbose")), None);
    }

    #[test]
    fn toml_source() {
        let content = "port = 9000\nrate = 1.5\n\n[database]\npool_size = 3\nhosts = [\"a\", \"b\"]\n";
        let source = SerdeSource::from_toml(Path::new("app.toml"), content).unwrap();
        assert_eq!(source.name(), "toml");
        assert_eq!(source.get(&path("port")).as_deref(), Some("9000"));
        assert_eq!(source.get(&path("rate")).as_deref(), Some("1.5"));
        assert_eq!(source.get(&path("database.pool.size")).as_deref(), Some("3"));
        assert_eq!(source.get(&path("database.hosts")).as_deref(), Some("a,b"));
    }

    #[test]
    fn toml_datetime_is_a_leaf() {
        let source =
            SerdeSource::from_toml(Path::new("app.toml"), "started = 1979-05-27T07:32:00Z\n")
                .unwrap();
        assert_eq!(
            source.get(&path("started")).as_deref(),
            Some("1979-05-27T07:32:00Z")
        );
    }

    #[test]
    fn toml_parse_error_names_path() {
        let err = SerdeSource::from_toml(Path::new("bad.toml"), "port = ").unwrap_err();
        assert!(matches!(err, ConfError::TomlParse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }
}
