//! Hostname resolution through an active reachability probe.
//!
//! A name is looked up, then a single ICMP echo is sent to it. The address that answers is
//! the one routes are added for, which is not always what the name service returned first.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

#[cfg(not(windows))]
use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use netroute_common::config::DEFAULT_PROBE_TIMEOUT;
use netroute_common::error::{ResolutionFailure, ResolveError};
use netroute_common::resolving::HostResolver;

#[cfg(windows)]
use crate::network::ping;
#[cfg(not(windows))]
use crate::network::transport::IcmpHandle;

#[cfg(not(windows))]
const ECHO_SEQUENCE: u16 = 1;

pub struct IcmpResolver {
    timeout: Duration,
}

impl IcmpResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for IcmpResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl HostResolver for IcmpResolver {
    async fn resolve(&self, hostname: &str) -> Result<Ipv4Addr, ResolveError> {
        let destination: Ipv4Addr = lookup_ipv4(hostname).await?;
        let timeout: Duration = self.timeout;
        debug!("probing {hostname} at {destination}");

        match echo_probe(destination, timeout).await? {
            Ok(Some(address)) => Ok(address),
            Ok(None) => Err(ResolutionFailure::new(
                hostname,
                format!("no reply within {}ms", timeout.as_millis()),
            )
            .into()),
            Err(e) => Err(ResolutionFailure::new(hostname, format!("{e:#}")).into()),
        }
    }
}

/// The outer error means the probe could not be run at all, the inner one that it failed.
type ProbeResult = anyhow::Result<Option<Ipv4Addr>>;

#[cfg(not(windows))]
async fn echo_probe(destination: Ipv4Addr, timeout: Duration) -> Result<ProbeResult, ResolveError> {
    let identifier: u16 = rand::random();
    let probe = tokio::task::spawn_blocking(move || -> ProbeResult {
        let mut handle = IcmpHandle::open()?;
        handle.echo(destination, identifier, ECHO_SEQUENCE, timeout)
    })
    .await
    .context("echo probe task did not finish")?;
    Ok(probe)
}

// Raw ICMP receive is unix-only in pnet, so Windows asks the system ping.
#[cfg(windows)]
async fn echo_probe(destination: Ipv4Addr, timeout: Duration) -> Result<ProbeResult, ResolveError> {
    Ok(ping::ping_once(destination, timeout).await)
}

/// Literal IPv4 addresses pass through, anything else goes to the system resolver.
async fn lookup_ipv4(hostname: &str) -> Result<Ipv4Addr, ResolutionFailure> {
    if let Ok(address) = hostname.parse::<Ipv4Addr>() {
        return Ok(address);
    }

    let addresses = tokio::net::lookup_host((hostname, 0))
        .await
        .map_err(|e| ResolutionFailure::new(hostname, format!("name not found: {e}")))?;

    addresses
        .filter_map(|socket_addr| match socket_addr.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| ResolutionFailure::new(hostname, "name has no IPv4 address"))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
