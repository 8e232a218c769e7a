//! TOML configuration file
//!
//! ```toml
//! [credentials]
//! username = "student"
//! password = "secret"
//! domain = "eclass.example.org"
//!
//! [options]
//! excluded_assignments = ["A1"]
//! excluded_courses = ["CS404"]
//! include_expired = false
//! demo = false
//!
//! [keys]
//! quit = ["q", "esc"]
//! ```
//!
//! [`TomlConfigStore`] only ever writes the filter fields of `[options]`;
//! everything else in the file is left as the user wrote it.

use std::fs;
use std::path::{Path, PathBuf};

use assignments_core::{ConfigStore, FilterState, Keybindings, PersistError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const APP_DIR: &str = "eclass-utils";
pub const CONFIG_FILE: &str = "assignments.toml";

/// `<config dir>/eclass-utils/assignments.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub credentials: Credentials,
    pub options: Options,
    pub keys: Keybindings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub excluded_assignments: Vec<String>,
    pub excluded_courses: Vec<String>,
    pub include_expired: bool,
    /// Assignment endpoint; derived from the domain when absent
    pub source_url: Option<String>,
    /// Also load the built-in sample assignments
    pub demo: bool,
}

impl Options {
    /// The persisted part of the filter. Review mode always starts off.
    pub fn filter(&self) -> FilterState {
        FilterState {
            excluded_assignments: self.excluded_assignments.iter().cloned().collect(),
            excluded_courses: self.excluded_courses.iter().cloned().collect(),
            include_expired: self.include_expired,
            show_hidden: false,
        }
    }
}

impl ConfigFile {
    /// Read the file at `path`. A missing file yields the defaults.
    pub fn read(path: &Path) -> Result<Self, PersistError> {
        match read_optional(path)? {
            Some(raw) => toml::from_str(&raw).map_err(|e| PersistError::Read(e.to_string())),
            None => Ok(Self::default()),
        }
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, PersistError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistError::Read(format!("{}: {e}", path.display()))),
    }
}

/// [`ConfigStore`] backed by the TOML file
#[derive(Debug, Clone)]
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

}

/// Rewrite the filter fields of `[options]` in the file at `path`.
///
/// The new document goes to a sibling temp file first and is renamed over
/// the original, so a failed write leaves the old file whole.
fn write_filter(path: &Path, filter: &FilterState) -> Result<(), PersistError> {
    let mut document = match read_optional(path)? {
        Some(raw) => raw
            .parse::<toml::Table>()
            .map_err(|e| PersistError::Read(e.to_string()))?,
        None => toml::Table::new(),
    };

    let options = document
        .entry("options")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    let toml::Value::Table(options) = options else {
        return Err(PersistError::Encode("[options] is not a table".into()));
    };
    options.insert(
        "excluded_assignments".into(),
        string_array(&filter.excluded_assignments),
    );
    options.insert("excluded_courses".into(), string_array(&filter.excluded_courses));
    options.insert(
        "include_expired".into(),
        toml::Value::Boolean(filter.include_expired),
    );

    let encoded =
        toml::to_string_pretty(&document).map_err(|e| PersistError::Encode(e.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PersistError::Write(e.to_string()))?;
    }
    let temp = temp_path(path);
    let written = fs::write(&temp, encoded).and_then(|()| fs::rename(&temp, path));
    written.map_err(|e| {
        let _ = fs::remove_file(&temp);
        PersistError::Write(format!("{}: {e}", path.display()))
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn string_array<'a>(values: impl IntoIterator<Item = &'a String>) -> toml::Value {
    toml::Value::Array(values.into_iter().cloned().map(toml::Value::String).collect())
}

#[async_trait]
impl ConfigStore for TomlConfigStore {
    async fn load(&self) -> Result<FilterState, PersistError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || ConfigFile::read(&path))
            .await
            .map_err(|e| PersistError::Read(e.to_string()))?
            .map(|file| file.options.filter())
    }

    async fn save(&self, filter: FilterState) -> Result<(), PersistError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_filter(&path, &filter))
            .await
            .map_err(|e| PersistError::Write(e.to_string()))??;
        tracing::debug!(path = %self.path.display(), "filter configuration written");
        Ok(())
    }
}
