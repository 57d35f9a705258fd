use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pnet::datalink::{MacAddr, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};

use netroute_common::error::{ResolutionFailure, ResolveError};
use netroute_common::events::RunEvent;
use netroute_common::network::interface::InterfaceDescriptor;
use netroute_common::resolving::HostResolver;
use netroute_common::routing::{RouteInstallOutcome, RouteInstaller};
use netroute_common::system::InterfaceCatalog;
use tokio::sync::mpsc::UnboundedReceiver;

pub const IFF_UP: u32 = 1;
pub const IFF_LOOPBACK: u32 = 1 << 3;

pub fn ni(name: &str, index: u32, ips: &[IpNetwork], flags: u32) -> NetworkInterface {
    NetworkInterface {
        name: name.into(),
        description: "".into(),
        index,
        mac: Some(MacAddr(0x00, 0x1a, 0x2b, 0x3c, 0x4d, index as u8)),
        ips: ips.to_vec(),
        flags,
    }
}

pub fn v4(a: u8, b: u8, c: u8, d: u8, p: u8) -> IpNetwork {
    IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), p).unwrap())
}

pub fn v6(s: &str, p: u8) -> IpNetwork {
    IpNetwork::V6(Ipv6Network::new(s.parse::<Ipv6Addr>().unwrap(), p).unwrap())
}

/// Resolver answering from a fixed table. Unknown names time out.
#[derive(Clone, Default)]
pub struct TableResolver {
    table: HashMap<String, Ipv4Addr>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl TableResolver {
    pub fn with(mut self, hostname: &str, address: Ipv4Addr) -> Self {
        self.table.insert(hostname.to_string(), address);
        self
    }
}

#[async_trait]
impl HostResolver for TableResolver {
    async fn resolve(&self, hostname: &str) -> Result<Ipv4Addr, ResolveError> {
        self.calls.lock().unwrap().push(hostname.to_string());
        self.table
            .get(hostname)
            .copied()
            .ok_or_else(|| ResolutionFailure::new(hostname, "request timed out").into())
    }
}

/// Installer that accepts every route and remembers it.
#[derive(Clone, Default)]
pub struct RecordingInstaller {
    pub routes: Arc<Mutex<Vec<(Ipv4Addr, Ipv4Addr)>>>,
}

#[async_trait]
impl RouteInstaller for RecordingInstaller {
    async fn install_host_route(
        &self,
        destination: Ipv4Addr,
        via: Ipv4Addr,
    ) -> anyhow::Result<RouteInstallOutcome> {
        self.routes.lock().unwrap().push((destination, via));
        Ok(RouteInstallOutcome::installed(destination.to_string(), ""))
    }
}

pub struct StaticCatalog(pub Vec<InterfaceDescriptor>);

impl InterfaceCatalog for StaticCatalog {
    fn list_usable_interfaces(&self) -> Vec<InterfaceDescriptor> {
        self.0.clone()
    }
}

/// Everything the channel still holds once the run dropped its sender.
pub fn drain(rx: &mut UnboundedReceiver<RunEvent>) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
