//! # Route Configuration Orchestrator
//!
//! Drives one run over a [`Settings`] snapshot: every hostname is resolved and routed, then
//! every literal address is routed directly, strictly one target at a time.
//!
//! ## Outcomes
//! * Per-target failures (resolution, installation, malformed address) are logged and counted,
//!   the run carries on.
//! * A stop request is honoured at the next target boundary and ends the run as
//!   [`RunState::Cancelled`]. Routes added so far stay in place.
//! * An error a collaborator cannot attribute to one target ends the run as
//!   [`RunState::Failed`].
//!
//! Every processed target produces its log lines first and then exactly one progress event.

use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span, warn};

use netroute_common::error::{ResolveError, RunError};
use netroute_common::events::{LogLine, RunSink};
use netroute_common::network::target::{ConfigurationRun, TargetKind};
use netroute_common::resolving::HostResolver;
use netroute_common::routing::{HOST_MASK, RouteInstallOutcome, RouteInstaller};
use netroute_common::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub state: RunState,
    pub completed: usize,
    pub total: usize,
    /// Routes the installer reported as added.
    pub installed: usize,
    /// Targets that failed to resolve or install.
    pub failed: usize,
}

#[derive(Default)]
struct Tally {
    installed: usize,
    failed: usize,
}

pub struct ConfigurationOrchestrator {
    resolver: Box<dyn HostResolver>,
    installer: Box<dyn RouteInstaller>,
    running: AtomicBool,
    active: Mutex<Option<CancellationToken>>,
}

impl ConfigurationOrchestrator {
    pub fn new(resolver: Box<dyn HostResolver>, installer: Box<dyn RouteInstaller>) -> Self {
        Self {
            resolver,
            installer,
            running: AtomicBool::new(false),
            active: Mutex::new(None),
        }
    }

    pub fn state(&self) -> RunState {
        if self.running.load(Ordering::Acquire) {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    /// Asks the active run to stop before its next target. No-op when idle.
    ///
    /// A resolution or installation already in flight is allowed to finish.
    pub fn request_stop(&self) {
        if let Ok(active) = self.active.lock() {
            if let Some(token) = active.as_ref() {
                token.cancel();
            }
        }
    }

    /// Runs resolution and installation over every target in `settings`.
    ///
    /// `settings` is only read. The run observes `cancellation` between targets and reports
    /// through `sink`. Only a concurrent second start is returned as an error, every other
    /// outcome is described by the [`RunSummary`].
    pub async fn start(
        &self,
        settings: &Settings,
        cancellation: CancellationToken,
        sink: &dyn RunSink,
    ) -> Result<RunSummary, RunError> {
        let _guard = RunGuard::acquire(self, &cancellation)?;

        let mut run = ConfigurationRun::from_settings(settings);
        let mut tally = Tally::default();
        let span = info_span!("configuration", total = run.total());

        let result = self
            .execute(settings, &mut run, &cancellation, sink, &mut tally)
            .instrument(span)
            .await;

        let state: RunState = match result {
            Ok(RunState::Cancelled) => {
                sink.log(LogLine::warn("route configuration stopped"));
                RunState::Cancelled
            }
            Ok(state) => {
                sink.log(LogLine::info("route configuration completed"));
                state
            }
            Err(e) => {
                warn!("configuration run failed: {e:#}");
                sink.log(LogLine::error(format!("error: {e:#}")));
                RunState::Failed
            }
        };

        Ok(RunSummary {
            state,
            completed: run.completed(),
            total: run.total(),
            installed: tally.installed,
            failed: tally.failed,
        })
    }

    async fn execute(
        &self,
        settings: &Settings,
        run: &mut ConfigurationRun,
        cancellation: &CancellationToken,
        sink: &dyn RunSink,
        tally: &mut Tally,
    ) -> Result<RunState, RunError> {
        let via: Ipv4Addr = parse_interface(&settings.default_interface)?;
        let total: usize = run.total();
        debug!("configuring {total} target(s) via {via}");

        while !run.is_finished() {
            if cancellation.is_cancelled() {
                debug!("stop requested after {} of {total} target(s)", run.completed());
                return Ok(RunState::Cancelled);
            }

            let Some(target) = run.targets().get(run.completed()).cloned() else {
                break;
            };
            match target.kind {
                TargetKind::Hostname => self.process_hostname(&target.value, via, sink, tally).await?,
                TargetKind::Address => self.process_address(&target.value, via, sink, tally).await?,
            }

            let completed: usize = run.advance();
            sink.progress(completed, total);
        }

        Ok(RunState::Completed)
    }

    async fn process_hostname(
        &self,
        hostname: &str,
        via: Ipv4Addr,
        sink: &dyn RunSink,
        tally: &mut Tally,
    ) -> Result<(), RunError> {
        sink.log(LogLine::info(format!("processing hostname {hostname}")));

        match self.resolver.resolve(hostname).await {
            Ok(address) => {
                sink.log(LogLine::info(format!("resolved {hostname} => {address}")));
                self.install(address, via, sink, tally).await
            }
            Err(ResolveError::Failure(failure)) => {
                sink.log(LogLine::warn(format!("resolving {hostname} failed: {failure}")));
                tally.failed += 1;
                Ok(())
            }
            Err(ResolveError::Unexpected(e)) => Err(RunError::Collaborator(e)),
        }
    }

    async fn process_address(
        &self,
        address: &str,
        via: Ipv4Addr,
        sink: &dyn RunSink,
        tally: &mut Tally,
    ) -> Result<(), RunError> {
        match address.parse::<Ipv4Addr>() {
            Ok(destination) => self.install(destination, via, sink, tally).await,
            Err(_) => {
                sink.log(LogLine::warn(format!(
                    "adding route for {address} failed: not an IPv4 address"
                )));
                tally.failed += 1;
                Ok(())
            }
        }
    }

    async fn install(
        &self,
        destination: Ipv4Addr,
        via: Ipv4Addr,
        sink: &dyn RunSink,
        tally: &mut Tally,
    ) -> Result<(), RunError> {
        sink.log(LogLine::info(format!(
            "adding route {destination} mask {HOST_MASK} via {via}"
        )));
        let outcome: RouteInstallOutcome = self.installer.install_host_route(destination, via).await?;
        report_outcome(&outcome, sink, tally);
        Ok(())
    }
}

fn report_outcome(outcome: &RouteInstallOutcome, sink: &dyn RunSink, tally: &mut Tally) {
    if outcome.success {
        tally.installed += 1;
        if !outcome.message.is_empty() {
            sink.log(LogLine::info(outcome.message.clone()));
        }
        sink.log(LogLine::info(format!("route added for {}", outcome.target)));
    } else {
        tally.failed += 1;
        sink.log(LogLine::warn(format!(
            "adding route for {} failed: {}",
            outcome.target, outcome.message
        )));
    }
}

fn parse_interface(address: &str) -> Result<Ipv4Addr, RunError> {
    address
        .trim()
        .parse()
        .map_err(|_| RunError::InvalidInterface(address.to_string()))
}

/// Marks the orchestrator busy for the lifetime of one run.
struct RunGuard<'a> {
    orchestrator: &'a ConfigurationOrchestrator,
}

impl<'a> RunGuard<'a> {
    fn acquire(
        orchestrator: &'a ConfigurationOrchestrator,
        cancellation: &CancellationToken,
    ) -> Result<Self, RunError> {
        if orchestrator
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RunError::AlreadyRunning);
        }
        if let Ok(mut active) = orchestrator.active.lock() {
            *active = Some(cancellation.clone());
        }
        Ok(Self { orchestrator })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut active) = self.orchestrator.active.lock() {
            *active = None;
        }
        self.orchestrator.running.store(false, Ordering::Release);
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
