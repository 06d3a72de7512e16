//! Leaf values: the typed slots a resolved string is written into.
//!
//! Every leaf implements [`Value`]. Built-in kinds (booleans, numbers,
//! strings, sequences) are coerced by the library; any other type opts in by
//! exposing one of the self-decode capabilities ([`SetFromStr`],
//! [`TextDecode`], [`BinaryDecode`]). The [`text_value!`](crate::text_value)
//! macro covers the common case of a `FromStr + Display` type.

use std::path::PathBuf;

use crate::coerce;
use crate::error::BoxError;

/// The primitive kind of a leaf, used by coercion, the tokenizer (booleans),
/// and usage rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Str,
    Seq,
    Custom,
}

/// Capability: update in place from a raw string.
pub trait SetFromStr {
    fn set_from_str(&mut self, raw: &str) -> Result<(), BoxError>;
}

/// Capability: decode from text.
pub trait TextDecode {
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError>;
}

/// Capability: decode from raw bytes.
pub trait BinaryDecode {
    fn decode_binary(&mut self, bytes: &[u8]) -> Result<(), BoxError>;
}

/// A typed leaf slot.
pub trait Value {
    fn kind(&self) -> Kind;

    /// Element kind for sequences.
    fn element_kind(&self) -> Option<Kind> {
        None
    }

    fn type_name(&self) -> &'static str;

    /// Built-in coercion for the slot's kind. Only reached when the value
    /// exposes no self-decode capability.
    fn coerce(&mut self, raw: &str) -> Result<(), BoxError>;

    /// Current value for rendering; `None` when unset.
    fn display(&self) -> Option<String>;

    fn as_setter(&mut self) -> Option<&mut dyn SetFromStr> {
        None
    }

    fn as_text_decoder(&mut self) -> Option<&mut dyn TextDecode> {
        None
    }

    fn as_binary_decoder(&mut self) -> Option<&mut dyn BinaryDecode> {
        None
    }
}

macro_rules! int_value {
    ($kind:ident: $($t:ty),*) => {
        $(
            impl coerce::FromRadix for $t {
                fn from_radix(digits: &str, radix: u32) -> Result<Self, std::num::ParseIntError> {
                    <$t>::from_str_radix(digits, radix)
                }
            }

            impl Value for $t {
                fn kind(&self) -> Kind {
                    Kind::$kind
                }

                fn type_name(&self) -> &'static str {
                    stringify!($t)
                }

                fn coerce(&mut self, raw: &str) -> Result<(), BoxError> {
                    *self = coerce::parse_int(raw)?;
                    Ok(())
                }

                fn display(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

int_value!(Int: i8, i16, i32, i64, i128, isize);
int_value!(Uint: u8, u16, u32, u64, u128, usize);

macro_rules! float_value {
    ($($t:ty),*) => {
        $(
            impl Value for $t {
                fn kind(&self) -> Kind {
                    Kind::Float
                }

                fn type_name(&self) -> &'static str {
                    stringify!($t)
                }

                fn coerce(&mut self, raw: &str) -> Result<(), BoxError> {
                    *self = coerce::parse_float::<$t>(raw)?;
                    Ok(())
                }

                fn display(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

float_value!(f32, f64);

impl Value for bool {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn coerce(&mut self, raw: &str) -> Result<(), BoxError> {
        *self = coerce::parse_bool(raw)?;
        Ok(())
    }

    fn display(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl Value for String {
    fn kind(&self) -> Kind {
        Kind::Str
    }

    fn type_name(&self) -> &'static str {
        "String"
    }

    fn coerce(&mut self, raw: &str) -> Result<(), BoxError> {
        *self = raw.to_string();
        Ok(())
    }

    fn display(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl Value for char {
    fn kind(&self) -> Kind {
        Kind::Str
    }

    fn type_name(&self) -> &'static str {
        "char"
    }

    fn coerce(&mut self, raw: &str) -> Result<(), BoxError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                *self = c;
                Ok(())
            }
            _ => Err(format!("expected a single character, got {raw:?}").into()),
        }
    }

    fn display(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl Value for PathBuf {
    fn kind(&self) -> Kind {
        Kind::Str
    }

    fn type_name(&self) -> &'static str {
        "PathBuf"
    }

    fn coerce(&mut self, raw: &str) -> Result<(), BoxError> {
        *self = PathBuf::from(raw);
        Ok(())
    }

    fn display(&self) -> Option<String> {
        Some(self.as_path().display().to_string())
    }
}

/// An optional leaf. Assigning a value always yields `Some`.
impl<T: Value + Default> Value for Option<T> {
    fn kind(&self) -> Kind {
        match self {
            Some(inner) => inner.kind(),
            None => T::default().kind(),
        }
    }

    fn element_kind(&self) -> Option<Kind> {
        match self {
            Some(inner) => inner.element_kind(),
            None => T::default().element_kind(),
        }
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn coerce(&mut self, raw: &str) -> Result<(), BoxError> {
        let mut inner = T::default();
        coerce::assign(&mut inner, raw)?;
        *self = Some(inner);
        Ok(())
    }

    fn display(&self) -> Option<String> {
        self.as_ref().and_then(Value::display)
    }
}

/// A comma-separated sequence. Assignment replaces the whole sequence.
impl<T: Value + Default> Value for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::Seq
    }

    fn element_kind(&self) -> Option<Kind> {
        Some(T::default().kind())
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn coerce(&mut self, raw: &str) -> Result<(), BoxError> {
        let mut items = Vec::new();
        for part in raw.split(coerce::SEQ_DELIMITER) {
            let mut item = T::default();
            coerce::assign(&mut item, part)?;
            items.push(item);
        }
        *self = items;
        Ok(())
    }

    fn display(&self) -> Option<String> {
        let parts: Vec<String> = self
            .iter()
            .map(|item| item.display().unwrap_or_default())
            .collect();
        Some(parts.join(","))
    }
}

/// Implement [`Value`] and [`TextDecode`] for a type that parses itself with
/// `FromStr` and renders with `Display`.
///
/// ```ignore
/// #[derive(Debug, Default, PartialEq)]
/// enum Level { #[default] Info, Debug }
/// impl std::str::FromStr for Level { /* ... */ }
/// impl std::fmt::Display for Level { /* ... */ }
///
/// layerconf::text_value!(Level);
/// ```
#[macro_export]
macro_rules! text_value {
    ($t:ty) => {
        impl $crate::Value for $t {
            fn kind(&self) -> $crate::Kind {
                $crate::Kind::Custom
            }

            fn type_name(&self) -> &'static str {
                stringify!($t)
            }

            fn coerce(&mut self, raw: &str) -> Result<(), $crate::BoxError> {
                $crate::TextDecode::decode_text(self, raw)
            }

            fn display(&self) -> Option<String> {
                Some(self.to_string())
            }

            fn as_text_decoder(&mut self) -> Option<&mut dyn $crate::TextDecode> {
                Some(self)
            }
        }

        impl $crate::TextDecode for $t {
            fn decode_text(&mut self, text: &str) -> Result<(), $crate::BoxError> {
                *self = text.parse::<$t>()?;
                Ok(())
            }
        }
    };
}
