use std::net::Ipv4Addr;

use pnet::datalink::NetworkInterface;

use crate::support::{IFF_LOOPBACK, IFF_UP, StaticCatalog, ni, v4, v6};
use netroute_common::network::interface::{InterfaceDescriptor, select_interface, usable_interfaces};

/*************************************************************
                   Tests for interface choice
**************************************************************/

#[test]
fn saved_address_selects_wlan0() {
    let usable = usable_interfaces(iface_all());
    let selected = select_interface(&usable, "192.168.1.42").unwrap();
    assert_eq!(selected.name, "wlan0");
}

#[test]
fn unknown_saved_address_selects_first_usable() {
    let usable = usable_interfaces(iface_all());
    let selected = select_interface(&usable, "192.168.200.1").unwrap();
    assert_eq!(selected.name, "enp9s0");
}

#[test]
fn nothing_selected_without_ipv4_interfaces() {
    let usable = usable_interfaces(vec![lo(), tun0(), down0()]);
    assert!(usable.is_empty());
    assert!(select_interface(&usable, "127.0.0.1").is_none());
}

#[test]
fn usable_interfaces_keep_enumeration_order() {
    let names: Vec<String> = usable_interfaces(iface_all())
        .into_iter()
        .map(|interface| interface.name)
        .collect();
    assert_eq!(names, vec!["enp9s0", "wlan0"]);
}

/*************************************************************
               Route installer interface lookup
**************************************************************/

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[tokio::test]
async fn route_via_unknown_interface_fails_without_running_a_command() {
    use netroute_common::routing::RouteInstaller;
    use netroute_core::route::SystemRouteInstaller;
    use std::time::Duration;

    let catalog = StaticCatalog(usable_interfaces(iface_all()));
    let installer = SystemRouteInstaller::new(Duration::from_secs(1)).with_catalog(Box::new(catalog));

    let outcome = installer
        .install_host_route(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(172, 16, 0, 1))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.target, "10.0.0.5");
    assert!(outcome.message.contains("172.16.0.1"), "{}", outcome.message);
}

#[test]
fn catalog_returns_descriptors_verbatim() {
    use netroute_common::system::InterfaceCatalog;

    let descriptor = InterfaceDescriptor {
        name: "eth0".to_string(),
        description: String::new(),
        address: Ipv4Addr::new(10, 0, 0, 1),
    };
    let catalog = StaticCatalog(vec![descriptor.clone()]);
    assert_eq!(catalog.list_usable_interfaces(), vec![descriptor]);
}

/*************************************************************
                  Mock interfaces for testing
**************************************************************/

fn iface_all() -> Vec<NetworkInterface> {
    vec![lo(), enp9s0(), tun0(), down0(), wlan0()]
}

fn lo() -> NetworkInterface {
    ni("lo", 1, &[v4(127, 0, 0, 1, 8), v6("::1", 128)], IFF_UP | IFF_LOOPBACK)
}

fn enp9s0() -> NetworkInterface {
    ni(
        "enp9s0",
        2,
        &[v6("fe80::b3dd:5c39:7c29:48b6", 64), v4(192, 168, 0, 32, 24)],
        IFF_UP,
    )
}

fn tun0() -> NetworkInterface {
    ni("tun0", 3, &[v6("fd00::2", 64)], IFF_UP)
}

fn down0() -> NetworkInterface {
    ni("down0", 4, &[v4(10, 9, 9, 9, 24)], 0)
}

fn wlan0() -> NetworkInterface {
    ni("wlan0", 5, &[v4(192, 168, 1, 42, 24)], IFF_UP)
}
