pub mod interfaces;
pub mod run;
pub mod settings;

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use netroute_common::config::{DEFAULT_INSTALL_TIMEOUT, DEFAULT_PROBE_TIMEOUT, DEFAULT_SETTINGS_FILE};

#[derive(Parser)]
#[command(name = "netroute")]
#[command(about = "Pins host routes for a list of hostnames and addresses to one interface.")]
pub struct CommandLine {
    /// Settings file holding the target lists and the selected interface
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every target and add a host route for it
    #[command(alias = "r")]
    Run {
        /// Address of the interface to route through, overrides the saved one
        #[arg(long)]
        interface: Option<Ipv4Addr>,
        /// How long to wait for an echo reply per hostname
        #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT.as_millis() as u64)]
        probe_timeout_ms: u64,
        /// Upper bound for a single route command
        #[arg(long, default_value_t = DEFAULT_INSTALL_TIMEOUT.as_secs())]
        install_timeout_secs: u64,
        /// Do not read the keyboard, stop with Ctrl-C only
        #[arg(long)]
        no_input: bool,
    },
    /// List the interfaces routes can be bound to
    #[command(alias = "i")]
    Interfaces,
    /// Show or edit the saved settings
    #[command(alias = "s")]
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the saved settings
    Show,
    /// Add one or more hostnames
    AddHost { hostnames: Vec<String> },
    /// Add one or more literal addresses
    AddAddress { addresses: Vec<String> },
    /// Remove one or more hostnames
    RemoveHost { hostnames: Vec<String> },
    /// Remove one or more literal addresses
    RemoveAddress { addresses: Vec<String> },
    /// Replace the hostname list with the lines of a file
    ImportHosts { file: PathBuf },
    /// Replace the address list with the lines of a file
    ImportAddresses { file: PathBuf },
    /// Save the address of the interface routes are bound to
    SetInterface { address: Ipv4Addr },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
