//! Type coercion: writing a resolved string into a typed slot.
//!
//! Self-decode capabilities take precedence, in order: [`SetFromStr`],
//! [`TextDecode`], [`BinaryDecode`]. Without one, the slot's own built-in
//! coercion runs. Parse failures are returned as-is; the resolver wraps them
//! with field context.
//!
//! [`SetFromStr`]: crate::SetFromStr
//! [`TextDecode`]: crate::TextDecode
//! [`BinaryDecode`]: crate::BinaryDecode

use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;

use crate::error::BoxError;
use crate::value::Value;

/// Separator between elements of a sequence value.
pub const SEQ_DELIMITER: char = ',';

/// Assign `raw` to `value`, delegating to a self-decode capability if present.
pub fn assign(value: &mut dyn Value, raw: &str) -> Result<(), BoxError> {
    if let Some(setter) = value.as_setter() {
        return setter.set_from_str(raw);
    }
    if let Some(decoder) = value.as_text_decoder() {
        return decoder.decode_text(raw);
    }
    if let Some(decoder) = value.as_binary_decoder() {
        return decoder.decode_binary(raw.as_bytes());
    }
    value.coerce(raw)
}

/// Parse a boolean from the conventional lexical set.
pub fn parse_bool(raw: &str) -> Result<bool, BoxError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean {raw:?}").into()),
    }
}

/// Integer types parseable from digits in a given radix.
pub trait FromRadix: Sized {
    fn from_radix(digits: &str, radix: u32) -> Result<Self, ParseIntError>;
}

/// Parse an integer literal sized to `T`.
///
/// Accepts an optional sign and a base prefix: `0x`, `0o`, `0b`, or a bare
/// leading `0` for octal. `_` may separate digits or follow a prefix. Values
/// outside `T`'s range are errors.
pub fn parse_int<T: FromRadix>(raw: &str) -> Result<T, BoxError> {
    let (sign, body) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.strip_prefix('+').unwrap_or(raw)),
    };

    let (radix, digits, prefixed) = match body.get(..2) {
        Some("0x" | "0X") => (16, &body[2..], true),
        Some("0o" | "0O") => (8, &body[2..], true),
        Some("0b" | "0B") => (2, &body[2..], true),
        Some(_) if body.starts_with('0') => (8, &body[1..], true),
        _ => (10, body, false),
    };

    let misplaced_underscore = digits.ends_with('_')
        || digits.contains("__")
        || (!prefixed && digits.starts_with('_'));
    if misplaced_underscore || digits.starts_with(['+', '-']) {
        return Err(format!("invalid integer {raw:?}").into());
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    Ok(T::from_radix(&format!("{sign}{cleaned}"), radix)?)
}

/// Parse a float literal sized to `T`.
///
/// A finite literal too large for `T` is an error rather than infinity;
/// `inf` and `infinity` (any case, optionally signed) are still accepted.
pub fn parse_float<T>(raw: &str) -> Result<T, BoxError>
where
    T: FromStr<Err = ParseFloatError> + Into<f64> + Copy,
{
    let value: T = raw.parse()?;
    if value.into().is_infinite() && !is_infinity_literal(raw) {
        return Err(format!("value {raw:?} out of range").into());
    }
    Ok(value)
}

fn is_infinity_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{BinaryDecode, Kind, SetFromStr, TextDecode};

    #[test]
    fn bool_lexical_set() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(parse_bool(raw).unwrap(), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!parse_bool(raw).unwrap(), "{raw}");
        }
        assert!(parse_bool("yes").is_err());
        assert!(parse_bool("tRUE").is_err());
    }

    #[test]
    fn int_literals() {
        assert_eq!(parse_int::<i32>("42").unwrap(), 42);
        assert_eq!(parse_int::<i32>("-42").unwrap(), -42);
        assert_eq!(parse_int::<i32>("+7").unwrap(), 7);
        assert_eq!(parse_int::<u32>("0xff").unwrap(), 255);
        assert_eq!(parse_int::<u32>("0o17").unwrap(), 15);
        assert_eq!(parse_int::<u8>("0b101").unwrap(), 5);
        assert_eq!(parse_int::<i64>("-0x10").unwrap(), -16);
        assert_eq!(parse_int::<u64>("1_000_000").unwrap(), 1_000_000);
        assert_eq!(parse_int::<u32>("0x_ff").unwrap(), 255);
        assert_eq!(parse_int::<i32>("0").unwrap(), 0);
    }

    #[test]
    fn leading_zero_means_octal() {
        assert_eq!(parse_int::<i32>("017").unwrap(), 15);
        assert_eq!(parse_int::<i32>("-017").unwrap(), -15);
        assert_eq!(parse_int::<i32>("0_17").unwrap(), 15);
        assert_eq!(parse_int::<i32>("00").unwrap(), 0);
        assert!(parse_int::<i32>("08").is_err());
    }

    #[test]
    fn int_rejects_out_of_range() {
        assert!(parse_int::<u8>("256").is_err());
        assert!(parse_int::<i8>("-129").is_err());
        assert!(parse_int::<u16>("-1").is_err());
    }

    #[test]
    fn int_rejects_malformed() {
        assert!(parse_int::<i32>("").is_err());
        assert!(parse_int::<i32>("-").is_err());
        assert!(parse_int::<i32>("+-5").is_err());
        assert!(parse_int::<i32>("_5").is_err());
        assert!(parse_int::<i32>("5_").is_err());
        assert!(parse_int::<i32>("0x").is_err());
        assert!(parse_int::<i32>("1.5").is_err());
        assert!(parse_int::<i32>("1__0").is_err());
        assert!(parse_int::<i32>("0x__f").is_err());
    }

    #[test]
    fn float_overflow_is_an_error() {
        let mut narrow: f32 = 0.0;
        assert!(assign(&mut narrow, "1e39").is_err());
        assert_eq!(narrow, 0.0);

        let mut wide: f64 = 0.0;
        assert!(assign(&mut wide, "1e400").is_err());
        assign(&mut wide, "1e39").unwrap();
        assert_eq!(wide, 1e39);
    }

    #[test]
    fn float_infinity_literals_accepted() {
        let mut narrow: f32 = 0.0;
        assign(&mut narrow, "inf").unwrap();
        assert_eq!(narrow, f32::INFINITY);

        let mut wide: f64 = 0.0;
        assign(&mut wide, "-Infinity").unwrap();
        assert_eq!(wide, f64::NEG_INFINITY);
        assert!(assign(&mut wide, "infin").is_err());
    }

    #[test]
    fn builtin_coercion_by_kind() {
        let mut port: u16 = 0;
        assign(&mut port, "8080").unwrap();
        assert_eq!(port, 8080);

        let mut rate: f64 = 0.0;
        assign(&mut rate, "1.5").unwrap();
        assert_eq!(rate, 1.5);

        let mut name = String::new();
        assign(&mut name, "hello world").unwrap();
        assert_eq!(name, "hello world");
    }

    /// Implements every capability so the precedence order is observable.
    #[derive(Default)]
    struct Probe {
        used: &'static str,
        with_setter: bool,
        with_text: bool,
    }

    impl SetFromStr for Probe {
        fn set_from_str(&mut self, _raw: &str) -> Result<(), BoxError> {
            self.used = "setter";
            Ok(())
        }
    }

    impl TextDecode for Probe {
        fn decode_text(&mut self, _text: &str) -> Result<(), BoxError> {
            self.used = "text";
            Ok(())
        }
    }

    impl BinaryDecode for Probe {
        fn decode_binary(&mut self, bytes: &[u8]) -> Result<(), BoxError> {
            if bytes.is_empty() {
                return Err("empty".into());
            }
            self.used = "binary";
            Ok(())
        }
    }

    impl Value for Probe {
        fn kind(&self) -> Kind {
            Kind::Custom
        }

        fn type_name(&self) -> &'static str {
            "Probe"
        }

        fn coerce(&mut self, _raw: &str) -> Result<(), BoxError> {
            self.used = "builtin";
            Ok(())
        }

        fn display(&self) -> Option<String> {
            Some(self.used.to_string())
        }

        fn as_setter(&mut self) -> Option<&mut dyn SetFromStr> {
            if self.with_setter { Some(self) } else { None }
        }

        fn as_text_decoder(&mut self) -> Option<&mut dyn TextDecode> {
            if self.with_text { Some(self) } else { None }
        }

        fn as_binary_decoder(&mut self) -> Option<&mut dyn BinaryDecode> {
            Some(self)
        }
    }

    #[test]
    fn capability_preference_order() {
        let mut probe = Probe {
            with_setter: true,
            with_text: true,
            ..Probe::default()
        };
        assign(&mut probe, "x").unwrap();
        assert_eq!(probe.used, "setter");

        let mut probe = Probe {
            with_text: true,
            ..Probe::default()
        };
        assign(&mut probe, "x").unwrap();
        assert_eq!(probe.used, "text");

        let mut probe = Probe::default();
        assign(&mut probe, "x").unwrap();
        assert_eq!(probe.used, "binary");
    }

    #[test]
    fn capability_error_propagates_verbatim() {
        let mut probe = Probe::default();
        let err = assign(&mut probe, "").unwrap_err();
        assert_eq!(err.to_string(), "empty");
    }
}
