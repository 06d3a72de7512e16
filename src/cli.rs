//! Clap adapter for layerconf.
//!
//! Compiled only with the `clap` Cargo feature (on by default). The core never
//! depends on clap: its own tokenizer handles `--flag value` directly. Apps
//! that already parse their command line with clap use this module instead:
//!
//! 1. [`args_for`] turns extracted [`Field`]s into `clap::Arg`s, one long flag
//!    per field (plus the short alias and help text from its options), so the
//!    app's `Command` accepts the same flags the tokenizer would.
//! 2. [`ClapSource::from_matches`] reads the parsed values back, keyed by flag
//!    name, and is handed to [`ConfBuilder::cli_source`](crate::ConfBuilder::cli_source).
//!
//! ```ignore
//! let mut config = AppConfig::default();
//! let fields = layerconf::extract_fields(&mut config)?;
//! let matches = Command::new("myapp").args(args_for(&fields)).get_matches();
//! drop(fields);
//!
//! Conf::builder()
//!     .cli_source(ClapSource::from_matches(&matches))
//!     .parse(&mut config)?;
//! ```

use std::collections::HashMap;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches};
use tracing::debug;

use crate::coerce::SEQ_DELIMITER;
use crate::fields::Field;
use crate::source::Source;

/// One `clap::Arg` per field, in field order.
///
/// Defaults are not registered with clap: they stay a resolution concern so
/// that files and the environment can still override them.
pub fn args_for(fields: &[Field<'_>]) -> Vec<Arg> {
    fields.iter().map(arg_for).collect()
}

fn arg_for(field: &Field<'_>) -> Arg {
    let name = field.flag_name().to_string();
    let options = field.options();

    let mut arg = Arg::new(name.clone()).long(name).action(ArgAction::Set);
    if let Some(short) = options.short() {
        arg = arg.short(short);
    }
    if field.is_bool() {
        arg = arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true");
    }

    let mut help = options.help().unwrap_or_default().replace('\'', "");
    let mut notes = vec![format!("env: {}", field.env_name())];
    if let Some(default) = options.default_value() {
        notes.push(format!("default: {default}"));
    }
    if options.required() {
        notes.push("required".to_string());
    }
    if !help.is_empty() {
        help.push(' ');
    }
    help.push_str(&format!("[{}]", notes.join(", ")));
    arg.help(help)
}

/// Flag values parsed by clap, keyed by flag name.
///
/// Only values given on the command line are kept; anything clap filled in
/// itself (defaults from the app's own args) is left to the lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClapSource {
    values: HashMap<String, String>,
}

impl ClapSource {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let mut values = HashMap::new();
        for id in matches.ids() {
            let name = id.as_str();
            if matches.value_source(name) != Some(ValueSource::CommandLine) {
                continue;
            }
            // Args of other value types belong to the app, not to a field.
            let Ok(Some(raw)) = matches.try_get_many::<String>(name) else {
                continue;
            };
            let joined = raw
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(SEQ_DELIMITER.to_string().as_str());
            values.insert(name.to_string(), joined);
        }
        debug!(count = values.len(), "captured clap matches");
        Self { values }
    }
}

impl Source for ClapSource {
    fn get(&self, key: &[String]) -> Option<String> {
        self.values.get(&crate::names::flag_name(key)).cloned()
    }

    fn name(&self) -> &str {
        "clap"
    }
}
