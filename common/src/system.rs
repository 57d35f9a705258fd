use crate::network::interface::InterfaceDescriptor;

/// Source of the interfaces a user can bind routes to.
pub trait InterfaceCatalog: Send + Sync {
    /// Interfaces that are up, not loopback and have an IPv4 address, in platform order.
    fn list_usable_interfaces(&self) -> Vec<InterfaceDescriptor>;
}
