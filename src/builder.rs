use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::args::{FlagSource, FlagSpec, parse_args};
use crate::env::EnvSource;
use crate::error::ConfError;
use crate::fields::{Field, Settings, extract_fields};
use crate::file::{self, FileSource, SearchPath};
use crate::flatten::SerdeSource;
use crate::overrides::MapSource;
use crate::resolve::resolve_fields;
use crate::source::Source;
use crate::usage;

/// Entry point for building a layerconf configuration.
pub struct Conf;

impl Conf {
    pub fn builder() -> ConfBuilder {
        ConfBuilder::new()
    }
}

/// Builder wiring the sources a record is resolved from.
///
/// Layer precedence, highest first:
///
/// ```text
/// Overrides          .override_value(), then .overrides_from() (later calls win)
/// Flags              --server-port 8080, or the .cli_source() that replaces them
/// Config file        SERVER_PORT 8080, or [server] port = 8080 in .toml
/// Environment        SERVER_PORT=8080 (or PREFIX_SERVER_PORT)
/// Custom sources     .source(), in insertion order
/// Declared default   "default:8080"
/// ```
///
/// Nothing is read until [`parse`](Self::parse) or [`load`](Self::load), so a
/// builder can be reused.
pub struct ConfBuilder {
    app_name: Option<String>,
    args: Option<Vec<String>>,
    env_vars: Option<Vec<(String, String)>>,
    env_prefix: Option<String>,
    env_enabled: bool,
    config_file: Option<PathBuf>,
    config_file_flag: Option<String>,
    search_paths: Vec<SearchPath>,
    cli: Option<Box<dyn Source>>,
    overrides: MapSource,
    serde_overrides: Vec<SerdeSource>,
    sources: Vec<Box<dyn Source>>,
}

impl ConfBuilder {
    fn new() -> Self {
        Self {
            app_name: None,
            args: None,
            env_vars: None,
            env_prefix: None,
            env_enabled: true,
            config_file: None,
            config_file_flag: None,
            search_paths: Vec::new(),
            cli: None,
            overrides: MapSource::new(),
            serde_overrides: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Program name shown in usage text. Also names the platform config
    /// directory for [`SearchPath::Platform`].
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Command-line arguments, without the program name. Defaults to the
    /// process arguments.
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Environment to resolve against. Defaults to a snapshot of the process
    /// environment taken when parsing starts.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Only read `{PREFIX}_{ENV_NAME}` variables.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Config file to read if it exists. A relative name is looked up in the
    /// [`search_paths`](Self::search_paths).
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Accept `--{name} <path>` naming a config file. The named file must
    /// exist and replaces [`config_file`](Self::config_file).
    pub fn config_file_flag(mut self, name: &str) -> Self {
        self.config_file_flag = Some(name.to_string());
        self
    }

    /// Directories searched for a relative config file, priority-ascending:
    /// the last entry holding the file wins.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Force a value by dotted key (`"database.pool_size"`). The key must
    /// name a field, or parsing fails with [`ConfError::UnknownKey`].
    pub fn override_value(mut self, key: &str, value: impl ToString) -> Self {
        self.overrides.insert(key, value.to_string());
        self
    }

    /// Overrides taken from any `Serialize` value, typically a clap-derived
    /// args struct. `None` fields are skipped and keys that match no field
    /// are ignored.
    pub fn overrides_from<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ConfError> {
        self.serde_overrides.push(SerdeSource::from_serialize(value)?);
        Ok(self)
    }

    /// Take flag values from an external parser (e.g. a `ClapSource`)
    /// instead of tokenizing [`args`](Self::args). The config file flag is
    /// then looked up in this source, and [`parse`](Self::parse) returns no
    /// positional arguments.
    pub fn cli_source(mut self, source: impl Source + 'static) -> Self {
        self.cli = Some(Box::new(source));
        self
    }

    /// Add a lower-priority source, consulted after the environment.
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    fn effective_app_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or("")
    }

    fn program_name(&self) -> String {
        if let Some(name) = &self.app_name {
            return name.clone();
        }
        std::env::args_os()
            .next()
            .and_then(|argv0| {
                Path::new(&argv0)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "app".to_string())
    }

    /// Resolve `target` in place and return the positional arguments left
    /// after the flags.
    ///
    /// On failure `target` is reset to `S::default()`.
    pub fn parse<S: Settings + Default>(&self, target: &mut S) -> Result<Vec<String>, ConfError> {
        let result = self.resolve_into(target);
        if let Err(e) = &result {
            debug!(error = %e, "resetting configuration after failure");
            *target = S::default();
        }
        result
    }

    /// Resolve a fresh `S::default()`.
    pub fn load<S: Settings + Default>(&self) -> Result<S, ConfError> {
        let mut target = S::default();
        self.parse(&mut target)?;
        Ok(target)
    }

    /// Usage text for `target`'s fields.
    pub fn usage<S: Settings + ?Sized>(&self, target: &mut S) -> Result<String, ConfError> {
        let fields = extract_fields(target)?;
        Ok(usage::render(&self.program_name(), &fields))
    }

    /// [`parse`](Self::parse) for binaries: prints usage and exits 0 on
    /// `--help`, prints the error and exits 1 on any other failure.
    pub fn parse_or_exit<S: Settings + Default>(&self, target: &mut S) -> Vec<String> {
        match self.parse(target) {
            Ok(rest) => rest,
            Err(e) if e.is_help() => {
                match self.usage(target) {
                    Ok(text) => eprint!("{text}"),
                    Err(e) => eprintln!("{e}"),
                }
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }

    fn resolve_into<S: Settings + ?Sized>(&self, target: &mut S) -> Result<Vec<String>, ConfError> {
        let mut fields = extract_fields(target)?;
        if fields.is_empty() {
            return Err(ConfError::NoFieldsFound);
        }

        if let Some(key) = self.overrides.unknown_keys(&fields).into_iter().next() {
            return Err(ConfError::UnknownKey { key });
        }

        let (parsed, rest) = match &self.cli {
            Some(_) => (FlagSource::default(), Vec::new()),
            None => self.parse_flags(&fields)?,
        };
        let flags: &dyn Source = match &self.cli {
            Some(cli) => &**cli,
            None => &parsed,
        };
        let file = self.config_source(flags)?;
        let env = self.env_source();

        let mut sources: Vec<&dyn Source> = vec![&self.overrides];
        sources.extend(self.serde_overrides.iter().rev().map(|s| s as &dyn Source));
        sources.push(flags);
        if let Some(file) = &file {
            sources.push(&**file);
        }
        if let Some(env) = &env {
            sources.push(env);
        }
        sources.extend(self.sources.iter().map(|s| &**s));

        debug!(
            fields = fields.len(),
            sources = ?sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            "resolving configuration"
        );
        resolve_fields(&mut fields, &sources)?;
        Ok(rest)
    }

    fn parse_flags(&self, fields: &[Field<'_>]) -> Result<(FlagSource, Vec<String>), ConfError> {
        let exempt: Vec<&str> = self.config_file_flag.iter().map(String::as_str).collect();
        let spec = FlagSpec::new(fields, &exempt);
        match &self.args {
            Some(args) => parse_args(args, &spec),
            None => parse_args(&unicode_args(std::env::args_os().skip(1))?, &spec),
        }
    }

    /// The config file layer, if any. A file named by the flag must exist;
    /// the configured file is optional.
    fn config_source(&self, flags: &dyn Source) -> Result<Option<Box<dyn Source>>, ConfError> {
        let named = self
            .config_file_flag
            .as_ref()
            .and_then(|name| flags.get(std::slice::from_ref(name)));

        if let Some(path) = named {
            let path = PathBuf::from(path);
            debug!(path = ?path, "reading config file named on the command line");
            let content = std::fs::read_to_string(&path).map_err(|e| ConfError::Io {
                path: path.clone(),
                source: e,
            })?;
            return config_from_content(&path, &content).map(Some);
        }

        let Some(config_file) = &self.config_file else {
            return Ok(None);
        };
        match file::load_config_file(config_file, &self.search_paths, self.effective_app_name())? {
            Some((path, content)) => config_from_content(&path, &content).map(Some),
            None => Ok(None),
        }
    }

    fn env_source(&self) -> Option<EnvSource> {
        if !self.env_enabled {
            return None;
        }
        let prefix = self.env_prefix.as_deref();
        Some(match &self.env_vars {
            Some(vars) => EnvSource::from_vars(prefix, vars.iter().cloned()),
            None => EnvSource::from_env(prefix),
        })
    }
}

fn unicode_args(args: impl IntoIterator<Item = OsString>) -> Result<Vec<String>, ConfError> {
    args.into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| ConfError::NonUnicodeArgument(raw.to_string_lossy().into_owned()))
        })
        .collect()
}

fn config_from_content(path: &Path, content: &str) -> Result<Box<dyn Source>, ConfError> {
    if path.extension().is_some_and(|ext| ext == "toml") {
        Ok(Box::new(SerdeSource::from_toml(path, content)?))
    } else {
        Ok(Box::new(FileSource::parse(content)))
    }
}
