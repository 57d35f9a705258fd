use is_root::is_root;
use pnet::datalink;
use tracing::debug;

use netroute_common::network::interface::{self, InterfaceDescriptor};
use netroute_common::system::InterfaceCatalog;

/// Interfaces as reported by the operating system.
pub struct SystemInterfaces;

impl InterfaceCatalog for SystemInterfaces {
    fn list_usable_interfaces(&self) -> Vec<InterfaceDescriptor> {
        let all = datalink::interfaces();
        debug!("enumerated {} network interface(s)", all.len());
        interface::usable_interfaces(all)
    }
}

/// Whether this process may modify the routing table (root, or Administrator on Windows).
pub fn has_route_privileges() -> bool {
    is_root()
}
