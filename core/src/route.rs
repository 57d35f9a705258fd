//! Host route installation through the platform route command.
//!
//! Each route is one spawned process. The command's output is captured and handed back as the
//! outcome message, its exit status decides success.

use std::fmt;
use std::net::Ipv4Addr;
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use netroute_common::config::DEFAULT_INSTALL_TIMEOUT;
use netroute_common::routing::{HOST_MASK, HOST_PREFIX, RouteInstallOutcome, RouteInstaller};
use netroute_common::system::InterfaceCatalog;

use crate::system::SystemInterfaces;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(Self::Windows)
        } else if cfg!(target_os = "linux") {
            Some(Self::Linux)
        } else if cfg!(target_os = "macos") {
            Some(Self::MacOs)
        } else {
            None
        }
    }

    /// Linux and macOS bind routes by interface name, Windows by interface address.
    pub fn needs_interface_name(self) -> bool {
        !matches!(self, Self::Windows)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RouteCommand {
    /// Builds the command adding a host route for `destination` out of the interface `via`.
    ///
    /// `via_name` is required where [`Platform::needs_interface_name`] holds.
    pub fn add_host_route(
        platform: Platform,
        destination: Ipv4Addr,
        via: Ipv4Addr,
        via_name: Option<&str>,
    ) -> anyhow::Result<Self> {
        let name = || via_name.ok_or_else(|| anyhow::anyhow!("no interface owns {via}"));

        let (program, args): (&str, Vec<String>) = match platform {
            Platform::Windows => (
                "route",
                vec![
                    "ADD".into(),
                    destination.to_string(),
                    "MASK".into(),
                    HOST_MASK.to_string(),
                    via.to_string(),
                ],
            ),
            Platform::Linux => (
                "ip",
                vec![
                    "route".into(),
                    "add".into(),
                    format!("{destination}/{HOST_PREFIX}"),
                    "dev".into(),
                    name()?.to_string(),
                    "src".into(),
                    via.to_string(),
                ],
            ),
            Platform::MacOs => (
                "route",
                vec![
                    "-n".into(),
                    "add".into(),
                    "-host".into(),
                    destination.to_string(),
                    "-interface".into(),
                    name()?.to_string(),
                ],
            ),
        };

        Ok(Self {
            program: program.to_string(),
            args,
        })
    }
}

impl fmt::Display for RouteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Installs routes by spawning the platform route command.
///
/// Requires root or Administrator rights. Missing rights show up as a failed outcome.
pub struct SystemRouteInstaller {
    catalog: Box<dyn InterfaceCatalog>,
    timeout: Duration,
}

impl SystemRouteInstaller {
    pub fn new(timeout: Duration) -> Self {
        Self {
            catalog: Box::new(SystemInterfaces),
            timeout,
        }
    }

    pub fn with_catalog(mut self, catalog: Box<dyn InterfaceCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    fn command_for(&self, destination: Ipv4Addr, via: Ipv4Addr) -> anyhow::Result<RouteCommand> {
        let platform = Platform::current()
            .ok_or_else(|| anyhow::anyhow!("host routes are not supported on this platform"))?;

        let via_name: Option<String> = if platform.needs_interface_name() {
            self.catalog
                .list_usable_interfaces()
                .into_iter()
                .find(|interface| interface.address == via)
                .map(|interface| interface.name)
        } else {
            None
        };

        RouteCommand::add_host_route(platform, destination, via, via_name.as_deref())
    }
}

impl Default for SystemRouteInstaller {
    fn default() -> Self {
        Self::new(DEFAULT_INSTALL_TIMEOUT)
    }
}

#[async_trait]
impl RouteInstaller for SystemRouteInstaller {
    async fn install_host_route(
        &self,
        destination: Ipv4Addr,
        via: Ipv4Addr,
    ) -> anyhow::Result<RouteInstallOutcome> {
        let target: String = destination.to_string();
        let command: RouteCommand = match self.command_for(destination, via) {
            Ok(command) => command,
            Err(e) => return Ok(RouteInstallOutcome::failed(target, format!("{e:#}"))),
        };

        debug!("running: {command}");
        Ok(run_route_command(&command, self.timeout, target).await)
    }
}

async fn run_route_command(
    command: &RouteCommand,
    timeout: Duration,
    target: String,
) -> RouteInstallOutcome {
    let mut child = Command::new(&command.program);
    child.args(&command.args).kill_on_drop(true);

    match tokio::time::timeout(timeout, child.output()).await {
        Err(_elapsed) => RouteInstallOutcome::failed(
            target,
            format!("`{command}` did not finish within {}s", timeout.as_secs()),
        ),
        Ok(Err(e)) => RouteInstallOutcome::failed(target, format!("cannot run `{command}`: {e}")),
        Ok(Ok(output)) if output.status.success() => {
            RouteInstallOutcome::installed(target, String::from_utf8_lossy(&output.stdout).trim())
        }
        Ok(Ok(output)) => RouteInstallOutcome::failed(target, describe_failure(&output)),
    }
}

/// Windows `route` reports errors on stdout, so fall back to it when stderr is empty.
fn describe_failure(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    [stderr.trim(), stdout.trim()]
        .into_iter()
        .find(|text| !text.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("route command exited with {}", output.status))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
