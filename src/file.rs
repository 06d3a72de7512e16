//! Config files: discovery across search paths and the line-based file format.
//!
//! # Discovery
//!
//! A relative config file name is looked up in each [`SearchPath`] directory.
//! The list is priority-ascending, so it is scanned from the end and the first
//! directory holding the file wins. Absolute names, or names given without any
//! search paths, are read as-is. Missing files are skipped; other I/O errors
//! are propagated.
//!
//! # Format
//!
//! One setting per line, keyed by environment-style name:
//!
//! ```text
//! # comment
//! SERVER_PORT 8080
//! VERBOSE
//! SERVER_HOST example.com  # trailing comment
//! ```
//!
//! The first space separates name from value. A name alone means `true`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfError;
use crate::names;
use crate::source::Source;

/// A directory a relative config file name is looked up in.
///
/// Lists of search paths are ordered lowest priority first.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// The OS config directory for the app name, e.g. `~/.config/{app}` on Linux.
    Platform,
    /// A directory under `$HOME`, such as `Home(".myapp")`.
    Home(&'static str),
    /// The working directory at parse time.
    Cwd,
    Path(PathBuf),
}

/// The directory a [`SearchPath`] stands for, or `None` when it has none here
/// (no home directory, or `Platform` without an app name).
pub fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            if app_name.is_empty() {
                return None;
            }
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Candidate file locations, highest priority first.
pub fn candidates(file: &Path, search_paths: &[SearchPath], app_name: &str) -> Vec<PathBuf> {
    if file.is_absolute() || search_paths.is_empty() {
        return vec![file.to_path_buf()];
    }
    search_paths
        .iter()
        .rev()
        .filter_map(|sp| resolve_search_path(sp, app_name))
        .map(|dir| dir.join(file))
        .collect()
}

/// Read the highest-priority existing candidate for `file`.
///
/// Returns `Ok(None)` when no candidate exists.
pub fn load_config_file(
    file: &Path,
    search_paths: &[SearchPath],
    app_name: &str,
) -> Result<Option<(PathBuf, String)>, ConfError> {
    for path in candidates(file, search_paths, app_name) {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = ?path, "loaded config file");
                return Ok(Some((path, content)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?path, "config file not found, skipping");
                continue;
            }
            Err(e) => return Err(ConfError::Io { path, source: e }),
        }
    }
    Ok(None)
}

/// Settings read from a line-format config file, keyed by env name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSource {
    entries: HashMap<String, String>,
}

impl FileSource {
    /// Parse file content. Later lines override earlier ones.
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (name, mut value) = match line.split_once(' ') {
                Some((name, value)) => (name, value.trim()),
                None => (line, "true"),
            };
            if let Some((before, _)) = value.split_once(" #") {
                value = before.trim();
            }
            entries.insert(name.to_string(), value.to_string());
        }
        Self { entries }
    }

    /// Read and parse a file.
    pub fn open(path: &Path) -> Result<Self, ConfError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::parse(&content))
    }
}

impl Source for FileSource {
    fn get(&self, key: &[String]) -> Option<String> {
        self.entries.get(&names::env_name(key)).cloned()
    }

    fn name(&self) -> &str {
        "file"
    }
}
