use std::collections::HashMap;
use std::ffi::OsString;

use tracing::debug;

use crate::names;
use crate::source::Source;

/// Environment variables as a [`Source`], keyed by env name (`SERVER_PORT`).
///
/// With a prefix `MYAPP`, only `MYAPP_*` variables are kept and the field
/// `server.port` is read from `MYAPP_SERVER_PORT`.
///
/// The variables are snapshotted at construction; resolution never reads the
/// process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Snapshot the process environment. Variables whose name or value is
    /// not valid Unicode are skipped.
    pub fn from_env(prefix: Option<&str>) -> Self {
        Self::from_vars(prefix, unicode_vars(std::env::vars_os()))
    }

    /// Build from explicit `(name, value)` pairs so tests can pass synthetic
    /// data instead of `std::env::vars()`.
    pub fn from_vars(prefix: Option<&str>, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let needle = prefix
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}_", p.to_uppercase()));

        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter_map(|(name, value)| match &needle {
                None => Some((name, value)),
                Some(needle) => name
                    .strip_prefix(needle.as_str())
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_uppercase(), value)),
            })
            .collect();

        debug!(count = vars.len(), prefix = ?prefix, "captured environment");
        Self { vars }
    }
}

fn unicode_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> impl Iterator<Item = (String, String)> {
    vars.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (name, _) => {
                debug!(name = ?name, "skipping non-Unicode environment variable");
                None
            }
        })
}

impl Source for EnvSource {
    fn get(&self, key: &[String]) -> Option<String> {
        self.vars.get(&names::env_name(key)).cloned()
    }

    fn name(&self) -> &str {
        "env"
    }
}
