use std::fmt;
use std::net::Ipv4Addr;

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::IpNetwork;

/// An interface routes can be bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub description: String,
    pub address: Ipv4Addr,
}

impl InterfaceDescriptor {
    /// Human readable label. Falls back to the name where the platform has no description.
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            &self.name
        } else {
            &self.description
        }
    }
}

impl fmt::Display for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.address)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UsabilityError {
    /// The interface is operationally down.
    IsDown,
    /// Loopback interfaces never carry host routes.
    IsLoopback,
    /// The interface has no IPv4 address to bind routes to.
    NoIpv4Address,
}

/// Keeps the interfaces that are up, not loopback, and own an IPv4 address.
///
/// Enumeration order is preserved. An empty result is not an error.
pub fn usable_interfaces(interfaces: Vec<NetworkInterface>) -> Vec<InterfaceDescriptor> {
    interfaces
        .into_iter()
        .filter_map(|interface| to_descriptor(&interface).ok())
        .collect()
}

fn to_descriptor(interface: &NetworkInterface) -> Result<InterfaceDescriptor, UsabilityError> {
    check_usable(interface)?;
    let address: Ipv4Addr = first_ipv4(interface).ok_or(UsabilityError::NoIpv4Address)?;
    Ok(InterfaceDescriptor {
        name: interface.name.clone(),
        description: interface.description.clone(),
        address,
    })
}

fn check_usable(interface: &NetworkInterface) -> Result<(), UsabilityError> {
    if !interface.is_up() {
        return Err(UsabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(UsabilityError::IsLoopback);
    }
    Ok(())
}

fn first_ipv4(interface: &NetworkInterface) -> Option<Ipv4Addr> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) => Some(v4.ip()),
        IpNetwork::V6(_) => None,
    })
}

/// Picks the interface a run should use.
///
/// The one whose address matches `saved` wins, otherwise the first usable interface.
pub fn select_interface<'a>(
    interfaces: &'a [InterfaceDescriptor],
    saved: &str,
) -> Option<&'a InterfaceDescriptor> {
    find_by_address(interfaces, saved).or_else(|| interfaces.first())
}

pub fn find_by_address<'a>(
    interfaces: &'a [InterfaceDescriptor],
    address: &str,
) -> Option<&'a InterfaceDescriptor> {
    let address: Ipv4Addr = address.trim().parse().ok()?;
    interfaces.iter().find(|interface| interface.address == address)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
