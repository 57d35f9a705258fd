use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail};
use colored::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::terminal::input::StopWatcher;
use crate::terminal::{print, progress};
use netroute_common::config::Config;
use netroute_common::events::RunEvent;
use netroute_common::network::interface::{InterfaceDescriptor, find_by_address, select_interface};
use netroute_common::network::target::{ConfigurationRun, TargetKind};
use netroute_common::settings::{Settings, SettingsStore};
use netroute_common::system::InterfaceCatalog;
use netroute_core::orchestrator::{ConfigurationOrchestrator, RunState, RunSummary};
use netroute_core::resolver::IcmpResolver;
use netroute_core::route::SystemRouteInstaller;
use netroute_core::system::{SystemInterfaces, has_route_privileges};

pub async fn run(requested: Option<Ipv4Addr>, cfg: &Config) -> anyhow::Result<()> {
    let store = SettingsStore::new(&cfg.settings_path);
    let mut settings: Settings = store.load();

    let interfaces: Vec<InterfaceDescriptor> = SystemInterfaces.list_usable_interfaces();
    let via: Ipv4Addr = choose_interface(requested, &interfaces, &settings.default_interface)?;
    settings.set_default_interface(via.to_string());

    let plan = ConfigurationRun::from_settings(&settings);
    let total: usize = plan.total();
    print_plan(&plan, &interfaces, via);

    if !has_route_privileges() {
        warn!("not running as root or Administrator, route commands will most likely fail");
    }

    let orchestrator = ConfigurationOrchestrator::new(
        Box::new(IcmpResolver::new(cfg.probe_timeout)),
        Box::new(SystemRouteInstaller::new(cfg.install_timeout)),
    );

    let token = CancellationToken::new();
    let watcher = StopWatcher::start(&token, cfg.no_input);
    info!("{}", watcher.hint());

    let (tx, rx) = mpsc::unbounded_channel::<RunEvent>();
    let start_time: Instant = Instant::now();

    let (result, ()) = tokio::join!(
        async {
            let sink = tx;
            orchestrator.start(&settings, token.clone(), &sink).await
        },
        progress::render(rx, total),
    );

    drop(watcher);

    let summary: RunSummary = result?;
    print_summary(&summary, start_time.elapsed());

    if summary.state == RunState::Failed {
        bail!("route configuration failed");
    }
    Ok(())
}

/// An explicit address wins, then the saved one, then the first usable interface.
fn choose_interface(
    requested: Option<Ipv4Addr>,
    interfaces: &[InterfaceDescriptor],
    saved: &str,
) -> anyhow::Result<Ipv4Addr> {
    if let Some(address) = requested {
        if !interfaces.iter().any(|interface| interface.address == address) {
            warn!("{address} does not belong to a usable interface on this host");
        }
        return Ok(address);
    }

    select_interface(interfaces, saved)
        .map(|interface| interface.address)
        .ok_or_else(|| anyhow!("no usable network interface found"))
}

fn print_plan(plan: &ConfigurationRun, interfaces: &[InterfaceDescriptor], via: Ipv4Addr) {
    let label: String = match find_by_address(interfaces, &via.to_string()) {
        Some(interface) => interface.to_string(),
        None => via.to_string(),
    };
    let (hostnames, addresses) = count_by_kind(plan);

    print::aligned_line("Interface", label.green());
    print::aligned_line("Hostnames", hostnames);
    print::aligned_line("Addresses", addresses);
    print::aligned_line("Targets", plan.total().to_string().bold());
}

/// Counts only what the run will process, blank entries are not part of the plan.
fn count_by_kind(plan: &ConfigurationRun) -> (usize, usize) {
    let hostnames: usize = plan
        .targets()
        .iter()
        .filter(|target| target.kind == TargetKind::Hostname)
        .count();
    (hostnames, plan.total() - hostnames)
}

fn print_summary(summary: &RunSummary, elapsed: Duration) {
    let outcome: ColoredString = match summary.state {
        RunState::Completed => "Configuration Complete".green().bold(),
        RunState::Cancelled => "Configuration Stopped".yellow().bold(),
        RunState::Failed => "Configuration Failed".red().bold(),
        RunState::Idle | RunState::Running => "Configuration Ended".bold(),
    };
    let installed: ColoredString = format!("{} added", summary.installed).green();
    let failed: ColoredString = format!("{} failed", summary.failed).red();
    let time: ColoredString = format!("{:.2}s", elapsed.as_secs_f64()).bold().yellow();

    print::fat_separator();
    print::centerln(&format!(
        "{outcome}: {}/{} targets in {time}",
        summary.completed, summary.total
    ));
    print::centerln(&format!("{installed}, {failed}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, address: Ipv4Addr) -> InterfaceDescriptor {
        InterfaceDescriptor {
            name: name.to_string(),
            description: String::new(),
            address,
        }
    }

    #[test]
    fn requested_address_wins() {
        let interfaces = vec![descriptor("eth0", Ipv4Addr::new(10, 0, 0, 1))];
        let requested = Ipv4Addr::new(192, 168, 1, 10);
        let result = choose_interface(Some(requested), &interfaces, "10.0.0.1").unwrap();
        assert_eq!(result, requested);
    }

    #[test]
    fn saved_address_is_used_when_present() {
        let interfaces = vec![
            descriptor("eth0", Ipv4Addr::new(10, 0, 0, 1)),
            descriptor("wlan0", Ipv4Addr::new(192, 168, 1, 10)),
        ];
        let result = choose_interface(None, &interfaces, "192.168.1.10").unwrap();
        assert_eq!(result, Ipv4Addr::new(192, 168, 1, 10));
    }

    #[test]
    fn first_interface_is_the_fallback() {
        let interfaces = vec![descriptor("eth0", Ipv4Addr::new(10, 0, 0, 1))];
        let result = choose_interface(None, &interfaces, "192.168.200.1").unwrap();
        assert_eq!(result, Ipv4Addr::new(10, 0, 0, 1));
    }

    #[test]
    fn plan_counts_skip_blank_entries() {
        let settings = Settings {
            default_interface: "10.0.0.1".to_string(),
            hostnames: vec!["a.example".to_string(), "  ".to_string()],
            addresses: vec![String::new(), "10.0.0.5".to_string(), "10.0.0.6".to_string()],
        };
        let plan = ConfigurationRun::from_settings(&settings);
        assert_eq!(count_by_kind(&plan), (1, 2));
        assert_eq!(plan.total(), 3);
    }

    #[test]
    fn no_interfaces_is_an_error() {
        assert!(choose_interface(None, &[], "192.168.200.1").is_err());
    }
}
