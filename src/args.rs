//! Command-line tokenizer.
//!
//! Turns an argument vector (without the program name) into a flag-name to
//! value table plus the leftover positional arguments. Only the set of known
//! flags, their short aliases and which of them are boolean is needed; the
//! values stay raw strings until resolution.
//!
//! Grammar: `--name`, `-name`, `--name=value`, `-n value`. A bare boolean
//! flag means `true`. `--` ends the flags and is consumed. `-h`, `--help`
//! and `-?` abort with [`ConfError::HelpRequested`].

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::ConfError;
use crate::fields::Field;
use crate::names;
use crate::source::Source;

/// The flags the tokenizer accepts.
#[derive(Debug, Clone, Default)]
pub struct FlagSpec {
    /// Long name to "is boolean".
    expected: HashMap<String, bool>,
    shorts: HashMap<String, String>,
    exempt: HashSet<String>,
}

impl FlagSpec {
    /// Build the spec from extracted fields. `exempt` names are accepted
    /// without belonging to a field (e.g. the config-file flag).
    pub fn new(fields: &[Field<'_>], exempt: &[&str]) -> Self {
        let mut spec = Self::default();
        for field in fields {
            spec = spec.flag(field.flag_name(), field.is_bool());
            if let Some(short) = field.options().short() {
                spec = spec.short(short, field.flag_name());
            }
        }
        for name in exempt {
            spec = spec.exempt(name);
        }
        spec
    }

    pub fn flag(mut self, name: &str, is_bool: bool) -> Self {
        self.expected.insert(name.to_string(), is_bool);
        self
    }

    pub fn short(mut self, alias: char, long: &str) -> Self {
        self.shorts.insert(alias.to_string(), long.to_string());
        self
    }

    pub fn exempt(mut self, name: &str) -> Self {
        if !name.is_empty() {
            self.exempt.insert(name.to_lowercase());
        }
        self
    }

    fn is_bool(&self, name: &str) -> bool {
        self.expected.get(name).copied().unwrap_or(false)
    }
}

/// Flag values found on the command line, keyed by long flag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSource {
    found: HashMap<String, String>,
}

impl FlagSource {
    /// Raw value of a flag by its long name.
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.found.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }
}

impl Source for FlagSource {
    fn get(&self, key: &[String]) -> Option<String> {
        self.found.get(&names::flag_name(key)).cloned()
    }

    fn name(&self) -> &str {
        "flags"
    }
}

/// Tokenize `args` against `spec`.
///
/// Returns the flag table and the positional arguments left after the last
/// flag. The last occurrence of a repeated flag wins.
pub fn parse_args(args: &[String], spec: &FlagSpec) -> Result<(FlagSource, Vec<String>), ConfError> {
    let mut found = HashMap::new();
    let mut rest = args;

    while let Some((token, tail)) = rest.split_first() {
        if token.len() < 2 || !token.starts_with('-') {
            break;
        }

        let name = match token.strip_prefix("--") {
            Some("") => {
                rest = tail;
                break;
            }
            Some(name) => name,
            None => &token[1..],
        };
        if name.is_empty() || name.starts_with(['-', '=']) {
            return Err(ConfError::FlagSyntax(token.clone()));
        }
        rest = tail;

        // '=' in first position is part of the name, not a separator
        let (name, inline) = match name.char_indices().skip(1).find(|&(_, c)| c == '=') {
            Some((i, _)) => (&name[..i], Some(&name[i + 1..])),
            None => (name, None),
        };

        if matches!(name, "help" | "h" | "?") {
            return Err(ConfError::HelpRequested);
        }

        let name = spec.shorts.get(name).map_or(name, String::as_str);
        if !spec.expected.contains_key(name) && !spec.exempt.contains(name) {
            return Err(ConfError::UndefinedFlag(name.to_string()));
        }

        let value = match inline {
            Some(value) => value.to_string(),
            None => match rest.split_first() {
                Some((next, tail)) if !next.starts_with('-') => {
                    rest = tail;
                    next.clone()
                }
                _ if spec.is_bool(name) => "true".to_string(),
                _ => return Err(ConfError::MissingArgument(name.to_string())),
            },
        };
        found.insert(name.to_string(), value);
    }

    debug!(
        flags = found.len(),
        positional = rest.len(),
        "parsed command line"
    );
    Ok((FlagSource { found }, rest.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::extract_fields;
    use crate::fixtures::test::TestConfig;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn spec() -> FlagSpec {
        FlagSpec::default()
            .flag("an-int", false)
            .flag("a-string", false)
            .flag("bool", true)
            .short('s', "a-string")
    }

    fn key(flag: &str) -> Vec<String> {
        flag.split('-').map(String::from).collect()
    }

    #[test]
    fn long_short_and_bare_boolean() {
        let (flags, rest) =
            parse_args(&argv(&["--an-int", "1", "-s", "s", "--bool"]), &spec()).unwrap();
        assert_eq!(flags.flag("an-int"), Some("1"));
        assert_eq!(flags.flag("a-string"), Some("s"));
        assert_eq!(flags.flag("bool"), Some("true"));
        assert!(rest.is_empty());
    }

    #[test]
    fn source_lookup_by_key() {
        let (flags, _) = parse_args(&argv(&["--an-int=7"]), &spec()).unwrap();
        assert_eq!(flags.get(&key("an-int")).as_deref(), Some("7"));
        assert_eq!(flags.get(&key("bool")), None);
    }

    #[test]
    fn inline_values() {
        let (flags, _) =
            parse_args(&argv(&["-an-int=3", "--a-string=x=y", "--bool=false"]), &spec()).unwrap();
        assert_eq!(flags.flag("an-int"), Some("3"));
        assert_eq!(flags.flag("a-string"), Some("x=y"));
        assert_eq!(flags.flag("bool"), Some("false"));
    }

    #[test]
    fn inline_empty_value() {
        let (flags, _) = parse_args(&argv(&["--a-string="]), &spec()).unwrap();
        assert_eq!(flags.flag("a-string"), Some(""));
    }

    #[test]
    fn positional_args_stop_parsing() {
        let (flags, rest) =
            parse_args(&argv(&["--bool", "false", "input", "--an-int", "1"]), &spec()).unwrap();
        assert_eq!(flags.flag("bool"), Some("false"));
        assert_eq!(flags.flag("an-int"), None);
        assert_eq!(rest, argv(&["input", "--an-int", "1"]));

        let (flags, rest) = parse_args(&argv(&["input", "--bool"]), &spec()).unwrap();
        assert!(flags.is_empty());
        assert_eq!(rest, argv(&["input", "--bool"]));
    }

    #[test]
    fn single_dash_is_positional() {
        let (_, rest) = parse_args(&argv(&["-", "x"]), &spec()).unwrap();
        assert_eq!(rest, argv(&["-", "x"]));
    }

    #[test]
    fn double_dash_terminates_and_is_consumed() {
        let (flags, rest) = parse_args(&argv(&["--bool", "--", "--an-int", "1"]), &spec()).unwrap();
        assert_eq!(flags.flag("bool"), Some("true"));
        assert_eq!(rest, argv(&["--an-int", "1"]));
    }

    #[test]
    fn last_occurrence_wins() {
        let (flags, _) = parse_args(&argv(&["--an-int", "1", "--an-int", "2"]), &spec()).unwrap();
        assert_eq!(flags.flag("an-int"), Some("2"));
    }

    #[test]
    fn help_sentinels() {
        for token in ["-h", "--h", "-help", "--help", "-?", "--?", "--help=x"] {
            let err = parse_args(&argv(&[token]), &spec()).unwrap_err();
            assert!(err.is_help(), "{token}");
        }
    }

    #[test]
    fn help_wins_over_alias() {
        let spec = spec().short('h', "an-int");
        assert!(parse_args(&argv(&["-h", "1"]), &spec).unwrap_err().is_help());
    }

    #[test]
    fn bad_syntax() {
        for token in ["---x", "--=x", "-=x"] {
            let err = parse_args(&argv(&[token]), &spec()).unwrap_err();
            assert!(matches!(&err, ConfError::FlagSyntax(t) if t == token), "{token}");
        }
    }

    #[test]
    fn undefined_flag() {
        let err = parse_args(&argv(&["--nope", "1"]), &spec()).unwrap_err();
        assert_eq!(err.to_string(), "flag provided but not defined: -nope");
    }

    #[test]
    fn missing_argument() {
        let err = parse_args(&argv(&["--an-int"]), &spec()).unwrap_err();
        assert!(matches!(&err, ConfError::MissingArgument(n) if n == "an-int"));

        let err = parse_args(&argv(&["--an-int", "--bool"]), &spec()).unwrap_err();
        assert!(matches!(err, ConfError::MissingArgument(_)));
    }

    #[test]
    fn exempt_flag_accepted() {
        let spec = spec().exempt("config-file");
        let (flags, _) = parse_args(&argv(&["--config-file", "app.conf"]), &spec).unwrap();
        assert_eq!(flags.flag("config-file"), Some("app.conf"));

        let err = parse_args(&argv(&["--config-file"]), &spec).unwrap_err();
        assert!(matches!(err, ConfError::MissingArgument(_)));
    }

    #[test]
    fn exempt_name_is_lower_cased() {
        let spec = spec().exempt("Config");
        let (flags, _) = parse_args(&argv(&["--config", "app.conf"]), &spec).unwrap();
        assert_eq!(flags.get(&["Config".to_string()]).as_deref(), Some("app.conf"));
    }

    #[test]
    fn empty_next_token_is_a_value() {
        let (flags, _) = parse_args(&argv(&["--a-string", ""]), &spec()).unwrap();
        assert_eq!(flags.flag("a-string"), Some(""));
    }

    #[test]
    fn spec_from_fields() {
        let mut config = TestConfig::default();
        let fields = extract_fields(&mut config).unwrap();
        let spec = FlagSpec::new(&fields, &["config"]);
        let (flags, rest) = parse_args(
            &argv(&["-p", "9000", "-d", "--database-pool-size=2", "--config", "x", "serve"]),
            &spec,
        )
        .unwrap();
        assert_eq!(flags.flag("port"), Some("9000"));
        assert_eq!(flags.flag("debug"), Some("true"));
        assert_eq!(flags.flag("database-pool-size"), Some("2"));
        assert_eq!(flags.flag("config"), Some("x"));
        assert_eq!(rest, argv(&["serve"]));
    }
}
