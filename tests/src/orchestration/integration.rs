use std::net::Ipv4Addr;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::support::{RecordingInstaller, TableResolver, drain};
use netroute_common::events::{LogLevel, LogLine, RunEvent};
use netroute_common::settings::{Settings, SettingsStore};
use netroute_core::orchestrator::{ConfigurationOrchestrator, RunState};

const VIA: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);

fn settings(hostnames: &[&str], addresses: &[&str]) -> Settings {
    Settings {
        default_interface: VIA.to_string(),
        hostnames: hostnames.iter().map(|s| s.to_string()).collect(),
        addresses: addresses.iter().map(|s| s.to_string()).collect(),
    }
}

fn progress(events: &[RunEvent]) -> Vec<(usize, usize)> {
    events
        .iter()
        .filter_map(|event| match event {
            RunEvent::Progress { completed, total } => Some((*completed, *total)),
            RunEvent::Log(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn channel_sink_receives_full_run() {
    let resolver = TableResolver::default()
        .with("a.example", Ipv4Addr::new(93, 184, 216, 34))
        .with("b.example", Ipv4Addr::new(93, 184, 216, 35));
    let installer = RecordingInstaller::default();
    let orchestrator =
        ConfigurationOrchestrator::new(Box::new(resolver.clone()), Box::new(installer.clone()));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let summary = orchestrator
        .start(
            &settings(&["a.example", "b.example"], &["10.0.0.5"]),
            CancellationToken::new(),
            &tx,
        )
        .await
        .unwrap();
    drop(tx);
    let events = drain(&mut rx);

    assert_eq!(summary.state, RunState::Completed);
    assert_eq!(progress(&events), vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(
        *installer.routes.lock().unwrap(),
        vec![
            (Ipv4Addr::new(93, 184, 216, 34), VIA),
            (Ipv4Addr::new(93, 184, 216, 35), VIA),
            (Ipv4Addr::new(10, 0, 0, 5), VIA),
        ]
    );
    assert_eq!(
        events.last(),
        Some(&RunEvent::Log(LogLine::info("route configuration completed")))
    );
}

#[tokio::test]
async fn unresolved_hostname_is_reported_and_skipped() {
    let resolver = TableResolver::default();
    let installer = RecordingInstaller::default();
    let orchestrator =
        ConfigurationOrchestrator::new(Box::new(resolver.clone()), Box::new(installer.clone()));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let summary = orchestrator
        .start(&settings(&["gone.example"], &[]), CancellationToken::new(), &tx)
        .await
        .unwrap();
    drop(tx);
    let events = drain(&mut rx);

    assert!(installer.routes.lock().unwrap().is_empty());
    assert_eq!(progress(&events), vec![(1, 1)]);
    assert!(events.iter().any(|event| matches!(
        event,
        RunEvent::Log(line) if line.level == LogLevel::Warn && line.message.contains("gone.example")
    )));
    assert_eq!((summary.installed, summary.failed), (0, 1));
}

#[tokio::test]
async fn cancelled_run_leaves_later_targets_untouched() {
    let installer = RecordingInstaller::default();
    let orchestrator = ConfigurationOrchestrator::new(
        Box::new(TableResolver::default()),
        Box::new(installer.clone()),
    );
    let token = CancellationToken::new();
    token.cancel();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let summary = orchestrator
        .start(&settings(&[], &["10.0.0.1", "10.0.0.2"]), token, &tx)
        .await
        .unwrap();
    drop(tx);
    let events = drain(&mut rx);

    assert_eq!(summary.state, RunState::Cancelled);
    assert!(installer.routes.lock().unwrap().is_empty());
    assert_eq!(
        events,
        vec![RunEvent::Log(LogLine::warn("route configuration stopped"))]
    );
}

#[tokio::test]
async fn orchestrator_can_run_again_after_finishing() {
    let installer = RecordingInstaller::default();
    let orchestrator = ConfigurationOrchestrator::new(
        Box::new(TableResolver::default()),
        Box::new(installer.clone()),
    );
    let snapshot = settings(&[], &["10.0.0.1"]);
    let (tx, _rx) = mpsc::unbounded_channel();

    for _ in 0..2 {
        let summary = orchestrator
            .start(&snapshot, CancellationToken::new(), &tx)
            .await
            .unwrap();
        assert_eq!(summary.state, RunState::Completed);
    }
    assert_eq!(installer.routes.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn persisted_settings_drive_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{ "DefaultInterface": "192.168.1.10", "Urls": ["a.example"], "IPs": ["10.0.0.9"] }"#,
    )
    .unwrap();
    let loaded = SettingsStore::new(&path).load();

    let resolver = TableResolver::default().with("a.example", Ipv4Addr::new(1, 2, 3, 4));
    let installer = RecordingInstaller::default();
    let orchestrator =
        ConfigurationOrchestrator::new(Box::new(resolver.clone()), Box::new(installer.clone()));
    let (tx, _rx) = mpsc::unbounded_channel();

    let summary = orchestrator
        .start(&loaded, CancellationToken::new(), &tx)
        .await
        .unwrap();

    assert_eq!(summary.installed, 2);
    assert_eq!(*resolver.calls.lock().unwrap(), vec!["a.example"]);
    assert_eq!(
        *installer.routes.lock().unwrap(),
        vec![(Ipv4Addr::new(1, 2, 3, 4), VIA), (Ipv4Addr::new(10, 0, 0, 9), VIA)]
    );
    assert_eq!(SettingsStore::new(&path).load(), loaded);
}
