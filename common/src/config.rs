use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(4);
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Config {
    /// Location of the persisted settings file.
    ///
    /// Relative paths are resolved against the working directory.
    pub settings_path: PathBuf,
    /// How long to wait for an echo reply before a hostname counts as unresolved.
    pub probe_timeout: Duration,
    /// Upper bound for a single route command. The command is killed when it elapses.
    pub install_timeout: Duration,
    /// Disables the keyboard reader used to stop a run early.
    pub no_input: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from(DEFAULT_SETTINGS_FILE),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
            no_input: false,
        }
    }
}
