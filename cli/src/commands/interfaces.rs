use std::net::Ipv4Addr;
use std::path::Path;

use colored::*;
use tracing::warn;

use crate::terminal::print;
use netroute_common::network::interface::{InterfaceDescriptor, select_interface};
use netroute_common::settings::SettingsStore;
use netroute_common::system::InterfaceCatalog;
use netroute_core::system::SystemInterfaces;

pub fn interfaces(settings_path: &Path) -> anyhow::Result<()> {
    let settings = SettingsStore::new(settings_path).load();
    let interfaces: Vec<InterfaceDescriptor> = SystemInterfaces.list_usable_interfaces();

    if interfaces.is_empty() {
        warn!("no usable network interfaces found");
        return Ok(());
    }

    let selected: Option<Ipv4Addr> =
        select_interface(&interfaces, &settings.default_interface).map(|interface| interface.address);

    for (idx, interface) in interfaces.iter().enumerate() {
        print_interface_tree(idx, interface, selected == Some(interface.address));
        if idx + 1 != interfaces.len() {
            print::blank();
        }
    }
    Ok(())
}

fn print_interface_tree(idx: usize, interface: &InterfaceDescriptor, selected: bool) {
    print::tree_head(idx, interface.label());
    let marker: ColoredString = if selected { "yes".green().bold() } else { "no".bright_black() };
    print::as_tree_one_level(&[
        ("name", interface.name.normal()),
        ("ipv4", interface.address.to_string().cyan()),
        ("selected", marker),
    ]);
}
