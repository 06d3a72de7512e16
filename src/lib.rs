//! Typed configuration for Rust programs, resolved from command-line flags,
//! a config file, environment variables, and declared defaults.
//!
//! A configuration record describes its settable fields once. layerconf walks
//! that description, derives a flag name and an environment variable name for
//! every field, and fills each one from the highest-priority source that has
//! a value for it.
//!
//! ```ignore
//! #[derive(Default)]
//! struct ServerConfig {
//!     host: String,
//!     port: u16,
//!     verbose: bool,
//! }
//!
//! impl Settings for ServerConfig {
//!     fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfError> {
//!         schema.field("host", "default:localhost", &mut self.host)?;
//!         schema.field("port", "short:p,default:8080,help:port to listen on", &mut self.port)?;
//!         schema.field("verbose", "short:v", &mut self.verbose)
//!     }
//! }
//!
//! let mut config = ServerConfig::default();
//! let args = Conf::builder()
//!     .app_name("server")
//!     .config_file("server.conf")
//!     .config_file_flag("config")
//!     .parse_or_exit(&mut config);
//! ```
//!
//! That call accepts `--port 9000`, `-p 9000`, `PORT=9000` in the environment
//! or `PORT 9000` in `server.conf`, and falls back to `8080`.
//!
//! # Fields and keys
//!
//! [`Settings::describe`] lists a record's members in declaration order
//! through the [`Schema`] visitor:
//!
//! - **`field`** registers a leaf: anything implementing [`Value`].
//! - **`nested`** recurses into a named sub-record. Its fields are prefixed
//!   with the member's key: `database.pool_size` becomes `--database-pool-size`
//!   and `DATABASE_POOL_SIZE`.
//! - **`embedded`** recurses without adding a prefix, promoting the
//!   sub-record's fields to the outer level.
//! - **`optional`** recurses into an `Option<R>`, allocating `R::default()`
//!   first if it is `None`.
//!
//! Member names are split into lower-case words at `_`, `-` and case
//! boundaries (`MaxConnections`, `max_connections` and `maxConnections` all
//! give `max connections`). Flags join the words with `-`, environment names
//! upper-case them and join with `_`. Members that are not described are not
//! settable.
//!
//! # Field options
//!
//! The tag string passed with each member holds comma-separated options:
//!
//! | Option | Meaning |
//! |--------|---------|
//! | `short:p` | one-character flag alias (`-p`) |
//! | `default:8080` | value used when no source has one |
//! | `help:text` | usage text; a `'quoted'` word names the value type |
//! | `required` | fail if no source has a value (exclusive with `default`) |
//! | `noprint` | hide the value from [`to_string`] and trace logs |
//!
//! A tag of exactly `-` excludes the member. Option values cannot contain
//! commas; unknown options are ignored.
//!
//! # Layer precedence
//!
//! ```text
//! Declared default      "default:8080"
//!        ↑ overridden by
//! Custom sources        .source(), first added wins
//!        ↑ overridden by
//! Environment vars      PORT=9000, or PREFIX_PORT with .env_prefix()
//!        ↑ overridden by
//! Config file           PORT 9000, or port = 9000 in a .toml file
//!        ↑ overridden by
//! Flags                 --port 9000 / -p 9000
//!        ↑ overridden by
//! Overrides             .override_value(), .overrides_from()
//! ```
//!
//! Sources are consulted per field, highest first, and the first one that
//! has the key wins; lower sources are never asked. A source that reports an
//! empty string still wins but leaves the field's current value in place.
//!
//! Any closure `Fn(&[String]) -> Option<String>` is a [`Source`], so
//! secrets stores or remote settings plug in with [`ConfBuilder::source`].
//!
//! # Config files
//!
//! [`config_file()`](ConfBuilder::config_file) names a file that is read if
//! it exists. A relative name is looked up in the
//! [`search_paths()`](ConfBuilder::search_paths), a list of [`SearchPath`]
//! variants in **priority-ascending** order (last = highest):
//!
//! - **`Platform`**: the OS config directory for the app name.
//! - **`Home(".myapp")`**: a dotfile directory under `$HOME`.
//! - **`Cwd`**: the working directory.
//! - **`Path(path)`**: an explicit directory.
//!
//! With [`config_file_flag("config")`](ConfBuilder::config_file_flag) the
//! user can name a different file with `--config path`. That file must
//! exist.
//!
//! Files ending in `.toml` are parsed as TOML, with tables mapping onto
//! nested records. Anything else uses the line format:
//!
//! ```text
//! # comment
//! DATABASE_POOL_SIZE 10
//! VERBOSE
//! HOST example.com  # trailing comment
//! ```
//!
//! # Values
//!
//! Built-in [`Value`] impls cover `bool`, every integer width, `f32`/`f64`,
//! `String`, `char`, `PathBuf`, `Option<T>` and `Vec<T>` (comma-separated).
//! Integers take `0x`/`0o`/`0b` prefixes, a leading `0` for octal and `_`
//! separators, and are range checked. Floats too large for their width are
//! errors, not infinity. Booleans accept `1 t T TRUE true True` and their false
//! counterparts.
//!
//! Custom types decode themselves through [`SetFromStr`], [`TextDecode`] or
//! [`BinaryDecode`]; the [`text_value!`] macro covers any
//! `FromStr + Display` type.
//!
//! # Clap adapter
//!
//! The core has no dependency on any CLI framework. For apps built on
//! [clap](https://docs.rs/clap), the `cli` module (behind the `clap` feature,
//! on by default) turns fields into `clap::Arg`s with [`args_for`] and feeds
//! the parsed matches back through [`ClapSource`] and
//! [`cli_source()`](ConfBuilder::cli_source). A clap-derived struct can also
//! be passed whole to [`overrides_from()`](ConfBuilder::overrides_from):
//! it is serialized, `None` fields are skipped and keys that match no field
//! are ignored.
//!
//! # Error handling
//!
//! All fallible operations return [`ConfError`]. A `--help`/`-h` on the
//! command line surfaces as [`ConfError::HelpRequested`]; check it with
//! [`ConfError::is_help`] and print [`ConfBuilder::usage`].
//! [`parse_or_exit()`](ConfBuilder::parse_or_exit) does both for binaries.
//! When resolution fails, the record is reset to its `Default`.
//!
//! # Logging
//!
//! Source construction and per-field resolution are reported through
//! [`tracing`] at `debug` level, raw values at `trace` level (hidden for
//! `noprint` fields). No subscriber is installed.

pub mod error;
pub mod names;

mod args;
mod builder;
#[cfg(feature = "clap")]
mod cli;
mod coerce;
mod env;
mod fields;
mod file;
mod flatten;
mod ops;
mod options;
mod overrides;
mod resolve;
mod source;
mod usage;
mod value;

#[cfg(test)]
mod fixtures;

pub use args::{FlagSource, FlagSpec, parse_args};
pub use builder::{Conf, ConfBuilder};
#[cfg(feature = "clap")]
pub use cli::{ClapSource, args_for};
pub use coerce::SEQ_DELIMITER;
pub use env::EnvSource;
pub use error::{BoxError, ConfError};
pub use fields::{Field, Schema, Settings, extract_fields};
pub use file::{FileSource, SearchPath};
pub use flatten::{FlattenError, SerdeSource};
pub use ops::{NOT_SET, stringify, to_string};
pub use options::{FieldOptions, TagError};
pub use overrides::MapSource;
pub use resolve::resolve_fields;
pub use source::Source;
pub use usage::render as render_usage;
pub use value::{BinaryDecode, Kind, SetFromStr, TextDecode, Value};
