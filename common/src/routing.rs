use std::net::Ipv4Addr;

use async_trait::async_trait;

/// Mask of a route that matches exactly one destination.
pub const HOST_MASK: Ipv4Addr = Ipv4Addr::BROADCAST;
pub const HOST_PREFIX: u8 = 32;

/// Result of one route installation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInstallOutcome {
    pub target: String,
    pub success: bool,
    /// Diagnostic output of the routing primitive, possibly empty.
    pub message: String,
}

impl RouteInstallOutcome {
    pub fn installed(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            success: false,
            message: message.into(),
        }
    }
}

/// Adds host routes to the system routing table.
#[async_trait]
pub trait RouteInstaller: Send + Sync {
    /// Adds a `/32` route for `destination` leaving through the interface that owns `via`.
    ///
    /// OS and privilege errors come back as an unsuccessful outcome. `Err` is reserved for
    /// failures the installer cannot attribute to the single target.
    async fn install_host_route(
        &self,
        destination: Ipv4Addr,
        via: Ipv4Addr,
    ) -> anyhow::Result<RouteInstallOutcome>;
}
