use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::*;
use tracing::info;

use crate::commands::SettingsAction;
use crate::terminal::print;
use netroute_common::settings::{Settings, SettingsStore};

pub fn settings(action: SettingsAction, settings_path: &Path) -> anyhow::Result<()> {
    let store = SettingsStore::new(settings_path);
    let mut settings: Settings = store.load();

    if let SettingsAction::Show = action {
        show(&store, &settings);
        return Ok(());
    }

    if !apply(&mut settings, action)? {
        info!("nothing to change");
        return Ok(());
    }

    store
        .save(&settings)
        .with_context(|| format!("could not save {}", store.path().display()))?;
    info!("settings saved");
    Ok(())
}

/// Applies one edit and reports whether anything changed.
fn apply(settings: &mut Settings, action: SettingsAction) -> anyhow::Result<bool> {
    let changed: bool = match action {
        SettingsAction::Show => false,
        SettingsAction::AddHost { hostnames } => each(&hostnames, |h| settings.add_hostname(h)),
        SettingsAction::AddAddress { addresses } => each(&addresses, |a| settings.add_address(a)),
        SettingsAction::RemoveHost { hostnames } => {
            each(&hostnames, |h| settings.remove_hostname(h))
        }
        SettingsAction::RemoveAddress { addresses } => {
            each(&addresses, |a| settings.remove_address(a))
        }
        SettingsAction::ImportHosts { file } => {
            let text = read_list(&file)?;
            let before: Vec<String> = settings.hostnames.clone();
            settings.replace_hostnames_from_text(&text);
            before != settings.hostnames
        }
        SettingsAction::ImportAddresses { file } => {
            let text = read_list(&file)?;
            let before: Vec<String> = settings.addresses.clone();
            settings.replace_addresses_from_text(&text);
            before != settings.addresses
        }
        SettingsAction::SetInterface { address } => {
            let address: String = address.to_string();
            let changed: bool = settings.default_interface != address;
            settings.set_default_interface(address);
            changed
        }
    };
    Ok(changed)
}

fn each(values: &[String], mut edit: impl FnMut(&str) -> bool) -> bool {
    let mut changed: bool = false;
    for value in values {
        changed |= edit(value);
    }
    changed
}

fn read_list(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}

fn show(store: &SettingsStore, settings: &Settings) {
    print::aligned_line("File", store.path().display());
    print::aligned_line("Interface", settings.default_interface.green());
    print_list("Hostnames", &settings.hostnames);
    print_list("Addresses", &settings.addresses);
}

fn print_list(title: &str, entries: &[String]) {
    print::aligned_line(title, entries.len().to_string().bold());
    for entry in entries {
        print::print(&format!("    {}", entry.cyan()));
    }
}
