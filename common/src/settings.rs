//! # Persisted Settings
//!
//! The two target lists (hostnames and literal addresses) plus the address of the
//! interface routes are bound to.
//!
//! Settings live in a pretty-printed JSON file:
//!
//! ```json
//! {
//!   "DefaultInterface": "192.168.200.1",
//!   "Urls": ["example.com"],
//!   "IPs": ["10.0.0.5"]
//! }
//! ```
//!
//! Loading is permissive. A missing or unreadable file yields the built-in defaults, and
//! the built-in lists are always merged back into whatever was persisted.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::SettingsError;

pub const DEFAULT_INTERFACE: &str = "192.168.200.1";
pub const DEFAULT_HOSTNAMES: &[&str] = &[];
pub const DEFAULT_ADDRESSES: &[&str] = &[];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(
        rename = "DefaultInterface",
        default = "default_interface",
        deserialize_with = "nullable_interface"
    )]
    pub default_interface: String,
    #[serde(rename = "Urls", default, deserialize_with = "nullable_list")]
    pub hostnames: Vec<String>,
    #[serde(rename = "IPs", default, deserialize_with = "nullable_list")]
    pub addresses: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Defaults::builtin().settings()
    }
}

impl Settings {
    /// Appends a hostname unless it is blank or already present.
    pub fn add_hostname(&mut self, hostname: &str) -> bool {
        add_unique(&mut self.hostnames, hostname)
    }

    /// Appends a literal address unless it is blank or already present.
    pub fn add_address(&mut self, address: &str) -> bool {
        add_unique(&mut self.addresses, address)
    }

    pub fn remove_hostname(&mut self, hostname: &str) -> bool {
        remove_entry(&mut self.hostnames, hostname)
    }

    pub fn remove_address(&mut self, address: &str) -> bool {
        remove_entry(&mut self.addresses, address)
    }

    /// Replaces the hostname list with the lines of `text`. Blank lines and repeats are dropped.
    pub fn replace_hostnames_from_text(&mut self, text: &str) {
        self.hostnames = lines_to_list(text);
    }

    /// Replaces the address list with the lines of `text`. Blank lines and repeats are dropped.
    pub fn replace_addresses_from_text(&mut self, text: &str) {
        self.addresses = lines_to_list(text);
    }

    pub fn set_default_interface(&mut self, address: impl Into<String>) {
        self.default_interface = address.into();
    }

    /// Appends `defaults` to both lists and removes repeated entries.
    ///
    /// Hostnames and addresses are merged independently and never mixed.
    pub fn merge_defaults(&mut self, defaults: &Defaults) {
        self.hostnames.extend(defaults.hostnames.iter().cloned());
        self.addresses.extend(defaults.addresses.iter().cloned());
        self.hostnames = dedup_preserving_order(std::mem::take(&mut self.hostnames));
        self.addresses = dedup_preserving_order(std::mem::take(&mut self.addresses));
    }
}

/// Built-in values a fresh [`Settings`] starts from and that every load merges back in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub interface: String,
    pub hostnames: Vec<String>,
    pub addresses: Vec<String>,
}

impl Defaults {
    pub fn builtin() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            hostnames: DEFAULT_HOSTNAMES.iter().map(|s| s.to_string()).collect(),
            addresses: DEFAULT_ADDRESSES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            default_interface: self.interface.clone(),
            hostnames: dedup_preserving_order(self.hostnames.clone()),
            addresses: dedup_preserving_order(self.addresses.clone()),
        }
    }
}

/// Reads and writes [`Settings`] at a fixed location.
pub struct SettingsStore {
    path: PathBuf,
    defaults: Defaults,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            defaults: Defaults::builtin(),
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted settings, merged with the defaults.
    ///
    /// Never fails: a missing, unreadable or malformed file gives fresh defaults.
    pub fn load(&self) -> Settings {
        match self.read() {
            Ok(Some(mut settings)) => {
                settings.merge_defaults(&self.defaults);
                settings
            }
            Ok(None) => {
                debug!("no settings stored at {}, using defaults", self.path.display());
                self.defaults.settings()
            }
            Err(e) => {
                warn!("ignoring settings file {}: {e:#}", self.path.display());
                self.defaults.settings()
            }
        }
    }

    fn read(&self) -> anyhow::Result<Option<Settings>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json: String = fs::read_to_string(&self.path)?;
        let settings: Option<Settings> = serde_json::from_str(&json)?;
        Ok(settings)
    }

    /// Writes the whole settings object, creating the parent directory if needed.
    ///
    /// The file is written next to its destination first and then renamed over it, so an
    /// interrupted write leaves the previous file intact.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json: String = serde_json::to_string_pretty(settings)?;
        let tmp_path: PathBuf = self.path.with_extension("json.tmp");

        let write_err = |source: std::io::Error| SettingsError::Write {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp_path, json).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(write_err)?;

        debug!("settings written to {}", self.path.display());
        Ok(())
    }
}

fn default_interface() -> String {
    DEFAULT_INTERFACE.to_string()
}

fn nullable_interface<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_interface))
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn dedup_preserving_order(list: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    list.into_iter()
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}

fn add_unique(list: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || list.iter().any(|entry| entry == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_entry(list: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    let before = list.len();
    list.retain(|entry| entry != value);
    list.len() != before
}

fn lines_to_list(text: &str) -> Vec<String> {
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    dedup_preserving_order(lines)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
