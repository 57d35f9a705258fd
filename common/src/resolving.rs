use std::net::Ipv4Addr;

use async_trait::async_trait;

use crate::error::ResolveError;

/// Maps a hostname to the address that answers a reachability probe.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Probes `hostname` once and returns the address of the first reply.
    ///
    /// Timeouts, missing replies and unknown names are [`ResolveError::Failure`]. No retry is
    /// attempted.
    async fn resolve(&self, hostname: &str) -> Result<Ipv4Addr, ResolveError>;
}
